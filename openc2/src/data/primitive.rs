use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned, ser::SerializeMap,
};

use crate::Value;

/// A map containing a single key-value pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Choice<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Choice<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

impl<K, V: Value> Choice<K, V> {
    pub fn new_value(key: K, value: impl Serialize) -> Result<Self, V::Error> {
        Ok(Self {
            key,
            value: V::from_typed(&value)?,
        })
    }
}

impl<K, V: Value + Clone> Choice<K, V> {
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, V::Error> {
        self.value.clone().to_typed()
    }
}

impl<K: Serialize, V: Serialize> Serialize for Choice<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

impl<'de, K: Deserialize<'de>, V: Deserialize<'de>> Deserialize<'de> for Choice<K, V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ChoiceVisitor<K, V>(std::marker::PhantomData<(K, V)>);

        impl<'de, K: Deserialize<'de>, V: Deserialize<'de>> serde::de::Visitor<'de>
            for ChoiceVisitor<K, V>
        {
            type Value = Choice<K, V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map with a single key-value pair")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: serde::de::MapAccess<'de>,
            {
                let Some((key, value)) = access.next_entry()? else {
                    return Err(serde::de::Error::custom("expected a single key-value pair"));
                };
                if access.next_key::<serde::de::IgnoredAny>()?.is_some() {
                    return Err(serde::de::Error::custom("expected a single key-value pair"));
                }
                Ok(Choice { key, value })
            }
        }

        deserializer.deserialize_map(ChoiceVisitor(std::marker::PhantomData))
    }
}

/// A plain value that can be coerced into a registered value kind with [`crate::convert_to`].
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Bool(v) => v.fmt(f),
            Primitive::Int(v) => v.fmt(f),
            Primitive::UInt(v) => v.fmt(f),
            Primitive::Float(v) => v.fmt(f),
            Primitive::Str(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Primitive::Int(value)
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Primitive::Int(value.into())
    }
}

impl From<u64> for Primitive {
    fn from(value: u64) -> Self {
        Primitive::UInt(value)
    }
}

impl From<u32> for Primitive {
    fn from(value: u32) -> Self {
        Primitive::UInt(value.into())
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Float(value)
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::Str(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::Str(value.to_string())
    }
}
