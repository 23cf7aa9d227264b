//! The OpenC2 Language Specification defines a language used to compose messages that instruct
//! and coordinate the command and control of cyber defenses between and within networks and systems.
//!
//! This crate provides types for OpenC2 commands and responses, the [`Registry`] through which
//! actuator profiles add their own targets and arguments, and the [`Encoder`] boundary between
//! a message and its wire form.
//!
//! # Crate Purpose
//! This crate helps actuator implementers and other cybersecurity vendors interact with OpenC2 messages.
//!
//! # Extension
//! Nothing about a profile is known to this crate ahead of time. A profile describes itself
//! with a [`ProfileSpec`], is registered with [`Registry::register_profile`], and from then on
//! commands naming its targets or carrying its arguments pass validation.

mod codec;
mod command;
mod convert;
mod data;
mod error;
mod message;
mod profile;
pub mod registry;
mod response;
pub mod target;
mod traits;

pub use error::{
    ConversionError, Error, ErrorAt, ErrorKind, FormatError, NotImplementedError,
    ValidationError,
};

#[doc(inline)]
pub use codec::Encoder;

#[cfg(feature = "json")]
pub use codec::JsonEncoder;

#[cfg(feature = "cbor")]
pub use codec::CborEncoder;

#[doc(inline)]
pub use convert::{ValueKind, convert_to};

#[doc(inline)]
pub use profile::{Profile, ProfileSpec};

#[doc(inline)]
pub use registry::{Actuator, Implementation, Namespace, Registry, RegistryError};

#[doc(inline)]
pub use command::{Action, Args, Command, CommandBuilder};

#[doc(inline)]
pub use data::*;

#[doc(inline)]
pub use message::Content;

#[doc(inline)]
pub use target::{Target, TargetType};

#[doc(inline)]
pub use response::{Response, Results, StatusCode};

pub use traits::{Check, IsEmpty};

/// Type aliases for JSON-based OpenC2 messages.
#[cfg(feature = "json")]
pub mod json {
    use serde_json::Value;

    pub type Args = super::Args<Value>;
    pub type Content = super::Content<Value>;
    pub type Command = super::Command<Value>;
    pub type Response = super::Response<Value>;
    pub type Extensions = super::Extensions<Value>;
    pub type Results = super::Results<Value>;
    pub type Target = super::Target<Value>;
}

/// Type aliases for CBOR-based OpenC2 messages.
#[cfg(feature = "cbor")]
pub mod cbor {
    use serde_cbor::Value;

    pub type Args = super::Args<Value>;
    pub type Content = super::Content<Value>;
    pub type Command = super::Command<Value>;
    pub type Response = super::Response<Value>;
    pub type Extensions = super::Extensions<Value>;
    pub type Results = super::Results<Value>;
    pub type Target = super::Target<Value>;
}
