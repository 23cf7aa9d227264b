//! Coercion of plain primitives into validated value kinds.

use serde::de::{
    DeserializeOwned,
    value::{
        BoolDeserializer, Error as DeError, F64Deserializer, I64Deserializer, StrDeserializer,
        U64Deserializer,
    },
};

use crate::{ConversionError, primitive::Primitive};

/// A type that can be produced from a [`Primitive`] by [`convert_to`].
///
/// Every validated value implements this, as do the closed enumerations of the language.
/// Implementors must reject invalid input in their `Deserialize` impl.
pub trait ValueKind: DeserializeOwned {
    /// The wire name of the kind, used in error messages.
    const KIND: &'static str;
}

/// Coerce a primitive into a value kind, applying the kind's own validation.
///
/// ```
/// use openc2::{Action, RuleId, convert_to};
///
/// assert_eq!(convert_to::<Action>("deny").unwrap(), Action::Deny);
/// assert!(convert_to::<RuleId>(-1).is_err());
/// ```
pub fn convert_to<T: ValueKind>(value: impl Into<Primitive>) -> Result<T, ConversionError> {
    let value = value.into();
    let result = match &value {
        Primitive::Bool(v) => T::deserialize(BoolDeserializer::<DeError>::new(*v)),
        Primitive::Int(v) => T::deserialize(I64Deserializer::<DeError>::new(*v)),
        Primitive::UInt(v) => T::deserialize(U64Deserializer::<DeError>::new(*v)),
        Primitive::Float(v) => T::deserialize(F64Deserializer::<DeError>::new(*v)),
        Primitive::Str(v) => T::deserialize(StrDeserializer::<DeError>::new(v)),
    };

    result.map_err(|e| ConversionError::new(T::KIND, &value, e))
}
