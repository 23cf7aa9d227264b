use std::{fmt, net::Ipv6Addr, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use url::Url;

use crate::{FormatError, ValueKind};

/// A URI-reference as defined by RFC 3986, either absolute or relative.
///
/// The text is kept exactly as given; no normalization is applied.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub struct Uri(String);

impl Uri {
    pub fn new(text: impl Into<String>) -> Result<Self, FormatError> {
        let text = text.into();
        match check_reference(&text) {
            Ok(()) => Ok(Self(text)),
            Err(rule) => Err(FormatError::new(
                Self::KIND,
                &text,
                format!("not RFC 3986 compliant: {rule}"),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if the reference has a scheme.
    pub fn is_absolute(&self) -> bool {
        split_scheme(&self.0).is_some()
    }

    /// Parse the URI as a WHATWG URL. Relative references have no URL form.
    pub fn to_url(&self) -> Result<Url, FormatError> {
        Url::parse(&self.0).map_err(|e| FormatError::new("url", &self.0, e.to_string()))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Uri {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Uri {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A parsed URL is always serialized in RFC 3986 form.
impl From<Url> for Uri {
    fn from(value: Url) -> Self {
        Self(value.into())
    }
}

impl ValueKind for Uri {
    const KIND: &'static str = "uri";
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn is_sub_delim(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

/// Checks that `text` only contains unreserved characters, sub-delims, percent-encodings and
/// the bytes in `extra`.
fn check_chars(text: &str, extra: &[u8], part: &'static str) -> Result<(), String> {
    let bytes = text.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        let b = bytes[idx];
        if b == b'%' {
            let hex = bytes.get(idx + 1..idx + 3);
            if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                return Err(format!("malformed percent-encoding in {part}"));
            }
            idx += 3;
            continue;
        }

        if !(is_unreserved(b) || is_sub_delim(b) || extra.contains(&b)) {
            return Err(match text[idx..].chars().next() {
                Some(c) => format!("character {c:?} is not allowed in {part}"),
                None => format!("invalid byte in {part}"),
            });
        }
        idx += 1;
    }

    Ok(())
}

/// Splits `scheme ":" rest` if the text starts with a syntactically valid scheme.
fn split_scheme(text: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = text.split_once(':')?;
    let mut bytes = scheme.bytes();
    let first_ok = bytes.next().is_some_and(|b| b.is_ascii_alphabetic());
    let rest_ok = bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'));
    (first_ok && rest_ok).then_some((scheme, rest))
}

fn check_reference(text: &str) -> Result<(), String> {
    let (rest, fragment) = match text.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (text, None),
    };
    if let Some(fragment) = fragment {
        check_chars(fragment, b":@/?", "fragment")?;
    }

    let (rest, query) = match rest.split_once('?') {
        Some((rest, query)) => (rest, Some(query)),
        None => (rest, None),
    };
    if let Some(query) = query {
        check_chars(query, b":@/?", "query")?;
    }

    let hier = match split_scheme(rest) {
        Some((_, hier)) => hier,
        None => {
            let first_segment = rest.split('/').next().unwrap_or_default();
            if first_segment.contains(':') {
                return Err(
                    "scheme is malformed, or the first segment of a relative path contains ':'"
                        .into(),
                );
            }
            rest
        }
    };

    match hier.strip_prefix("//") {
        Some(after) => {
            let (authority, path) = match after.find('/') {
                Some(idx) => after.split_at(idx),
                None => (after, ""),
            };
            check_authority(authority)?;
            check_chars(path, b":@/", "path")
        }
        None => check_chars(hier, b":@/", "path"),
    }
}

fn check_authority(authority: &str) -> Result<(), String> {
    let host_port = match authority.split_once('@') {
        Some((userinfo, host_port)) => {
            check_chars(userinfo, b":", "userinfo")?;
            host_port
        }
        None => authority,
    };

    let port = if let Some(literal) = host_port.strip_prefix('[') {
        let (inner, after) = literal
            .split_once(']')
            .ok_or_else(|| "unterminated IP literal".to_string())?;
        check_ip_literal(inner)?;
        match after {
            "" => None,
            _ => Some(
                after
                    .strip_prefix(':')
                    .ok_or_else(|| "unexpected text after IP literal".to_string())?,
            ),
        }
    } else {
        let (host, port) = match host_port.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        };
        check_chars(host, b"", "host")?;
        port
    };

    match port {
        Some(port) if !port.bytes().all(|b| b.is_ascii_digit()) => {
            Err(format!("port {port:?} is not numeric"))
        }
        _ => Ok(()),
    }
}

fn check_ip_literal(inner: &str) -> Result<(), String> {
    if let Some(future) = inner.strip_prefix(['v', 'V']) {
        let (version, body) = future
            .split_once('.')
            .ok_or_else(|| "malformed IPvFuture literal".to_string())?;
        if version.is_empty() || !version.bytes().all(|b| b.is_ascii_hexdigit()) || body.is_empty()
        {
            return Err("malformed IPvFuture literal".into());
        }
        return check_chars(body, b":", "IP literal");
    }

    inner
        .parse::<Ipv6Addr>()
        .map(|_| ())
        .map_err(|_| format!("{inner:?} is not an IPv6 address"))
}
