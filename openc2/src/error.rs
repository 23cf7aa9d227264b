use std::{
    borrow::Cow,
    collections::VecDeque,
    fmt::{self, Display},
};

use from_variants::FromVariants;

use crate::{Response, StatusCode, registry::RegistryError};

/// Trait for prepending location information to errors.
pub trait ErrorAt: Sized {
    /// Add a new path segment to the front of an error's path.
    fn at<P: Into<PathSegment>>(self, segment: P) -> Self;
}

impl<T, E: ErrorAt> ErrorAt for Result<T, E> {
    fn at<P: Into<PathSegment>>(self, segment: P) -> Self {
        self.map_err(|e| e.at(segment))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    pub fn custom(message: impl Display) -> Self {
        ErrorKind::Custom(message.to_string()).into()
    }

    pub fn validation(message: impl Display) -> Self {
        ValidationError::new(message.to_string()).into()
    }

    pub fn not_implemented(message: impl Display) -> Self {
        NotImplementedError::new(message).into()
    }

    pub fn invalid_target(target: impl Display) -> Self {
        ErrorKind::InvalidTarget {
            target: target.to_string(),
        }
        .into()
    }

    pub fn invalid_args(profile: impl Display, reason: impl Display) -> Self {
        ErrorKind::InvalidArgs {
            profile: profile.to_string(),
            reason: reason.to_string(),
        }
        .into()
    }

    pub fn encoding(message: impl Display) -> Self {
        ErrorKind::Encoding(message.to_string()).into()
    }

    pub fn decoding(message: impl Display) -> Self {
        ErrorKind::Decoding(message.to_string()).into()
    }

    pub fn at(mut self, segment: impl Into<PathSegment>) -> Self {
        let segment = segment.into();
        match &mut self.kind {
            ErrorKind::Validation(ve) => {
                ve.path.push_front(segment);
            }
            ErrorKind::NotImplemented(ne) => {
                *ne = ne.clone().at(segment);
            }
            ErrorKind::Multiple(errors) => {
                for err in errors {
                    *err = err.clone().at(segment.clone());
                }
            }
            _ => {}
        };

        self
    }

    pub fn accumulator() -> Accumulator {
        Accumulator::default()
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match &self.kind {
            ErrorKind::Validation(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_registry(&self) -> Option<&RegistryError> {
        match &self.kind {
            ErrorKind::Registry(err) => Some(err),
            _ => None,
        }
    }

    /// Wrap a serialization failure that happened while producing wire bytes.
    pub(crate) fn into_encoding(self) -> Self {
        match self.kind {
            ErrorKind::Encoding(_) => self,
            other => ErrorKind::Encoding(other.to_string()).into(),
        }
    }
}

impl ErrorAt for Error {
    fn at<P: Into<PathSegment>>(self, segment: P) -> Self {
        self.at(segment)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        ErrorKind::Validation(err).into()
    }
}

impl From<NotImplementedError> for Error {
    fn from(err: NotImplementedError) -> Self {
        ErrorKind::NotImplemented(err).into()
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        ErrorKind::Format(err).into()
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        ErrorKind::Registry(err).into()
    }
}

impl From<ConversionError> for Error {
    fn from(err: ConversionError) -> Self {
        ErrorKind::Conversion(err).into()
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        ErrorKind::Custom(format!("JSON error: {err}")).into()
    }
}

#[cfg(feature = "cbor")]
impl From<serde_cbor::Error> for Error {
    fn from(err: serde_cbor::Error) -> Self {
        ErrorKind::Custom(format!("CBOR error: {err}")).into()
    }
}

/// What went wrong, in enough detail for a caller to report the offending value.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum ErrorKind {
    #[error("{0}")]
    Validation(ValidationError),
    #[error("{0}")]
    Format(FormatError),
    #[error("{0}")]
    Registry(RegistryError),
    #[error("target type '{target}' is not registered")]
    InvalidTarget { target: String },
    #[error("invalid args for profile '{profile}': {reason}")]
    InvalidArgs { profile: String, reason: String },
    #[error("{0}")]
    Conversion(ConversionError),
    #[error("encoding failed: {0}")]
    Encoding(String),
    #[error("decoding failed: {0}")]
    Decoding(String),
    #[error("{0}")]
    NotImplemented(NotImplementedError),
    #[error("{0}")]
    Custom(String),
    #[error("multiple errors")]
    Multiple(Vec<Error>),
}

/// Collects several errors so a caller sees every violation at once.
#[derive(Debug)]
pub struct Accumulator {
    errors: Option<Vec<Error>>,
}

impl Accumulator {
    pub fn push(&mut self, error: impl Into<Error>) {
        self.errors
            .as_mut()
            .expect("Accumulator already finalized")
            .push(error.into());
    }

    pub fn finish(mut self) -> Result<(), Error> {
        let mut errors = self.errors.take().expect("Accumulator already finalized");
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ErrorKind::Multiple(errors).into()),
        }
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            errors: Some(Vec::new()),
        }
    }
}

impl Drop for Accumulator {
    fn drop(&mut self) {
        if self.errors.is_some() && !std::thread::panicking() {
            panic!("dropped Accumulator without finalizing");
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: VecDeque<PathSegment>,
}

impl Path {
    pub fn push_front(&mut self, segment: impl Into<PathSegment>) {
        self.segments.push_front(segment.into());
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx == 0 {
                write!(f, "{segment}")?;
            } else {
                write!(f, "{segment:#}")?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, FromVariants)]
pub enum PathSegment {
    Key(Cow<'static, str>),
    Number(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, f.alternate()) {
            (PathSegment::Key(key), true) => write!(f, ".{key}"),
            (PathSegment::Number(index), true) => write!(f, "[{index}]"),
            (PathSegment::Key(key), false) => write!(f, "{key}"),
            (PathSegment::Number(index), false) => write!(f, "{index}"),
        }
    }
}

impl From<&'static str> for PathSegment {
    fn from(value: &'static str) -> Self {
        PathSegment::Key(Cow::Borrowed(value))
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Key(Cow::Owned(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {message}")]
pub struct ValidationError {
    path: Path,
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: Path::default(),
            message: message.into(),
        }
    }

    pub fn missing_required_field(field_name: impl Into<PathSegment>) -> Self {
        let field_name = field_name.into();
        Self {
            message: format!("missing required field '{field_name}'"),
            path: Path {
                segments: vec![field_name].into(),
            },
        }
    }

    pub fn at(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path.push_front(segment);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ErrorAt for ValidationError {
    fn at<P: Into<PathSegment>>(self, segment: P) -> Self {
        self.at(segment)
    }
}

/// A primitive did not satisfy the format rule of the value kind it was meant to become.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} {value:?}: {rule}")]
pub struct FormatError {
    kind: &'static str,
    value: String,
    rule: Cow<'static, str>,
}

impl FormatError {
    pub fn new(
        kind: &'static str,
        value: impl Display,
        rule: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            value: value.to_string(),
            rule: rule.into(),
        }
    }

    /// The name of the value kind whose rule was violated, e.g. `uri`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The rejected input.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The violated rule, e.g. `does not start with http:// or https://`.
    pub fn rule(&self) -> &str {
        &self.rule
    }
}

/// A primitive could not be coerced into the requested value kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert {value} to {kind}: {reason}")]
pub struct ConversionError {
    kind: &'static str,
    value: String,
    reason: String,
}

impl ConversionError {
    pub fn new(kind: &'static str, value: impl Display, reason: impl Display) -> Self {
        Self {
            kind,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

/// Error indicating that a consumer does not implement a requested feature.
#[derive(Debug, Clone, thiserror::Error)]
pub struct NotImplementedError {
    message: String,
    path: Option<Path>,
}

impl NotImplementedError {
    pub fn new(message: impl Display) -> Self {
        Self {
            message: message.to_string(),
            path: None,
        }
    }
}

impl ErrorAt for NotImplementedError {
    fn at<P: Into<PathSegment>>(mut self, segment: P) -> Self {
        self.path.get_or_insert_with(Path::default).push_front(segment);
        self
    }
}

impl fmt::Display for NotImplementedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{} (at {path})", self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl<V> From<Error> for Response<V> {
    fn from(value: Error) -> Self {
        let status = match &value.kind {
            ErrorKind::Validation(_)
            | ErrorKind::Format(_)
            | ErrorKind::Registry(_)
            | ErrorKind::InvalidTarget { .. }
            | ErrorKind::InvalidArgs { .. }
            | ErrorKind::Conversion(_)
            | ErrorKind::Decoding(_) => StatusCode::BadRequest,
            ErrorKind::NotImplemented(_) => StatusCode::NotImplemented,
            ErrorKind::Encoding(_) | ErrorKind::Custom(_) => StatusCode::InternalError,
            ErrorKind::Multiple(errors) => {
                return errors
                    .first()
                    .cloned()
                    .map(Response::from)
                    .unwrap_or_else(|| Response::new(StatusCode::InternalError));
            }
        };

        Response::new(status).with_status_text(value.to_string())
    }
}
