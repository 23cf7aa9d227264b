//! Moving OpenC2 content between a producer and a consumer.
//!
//! A transfer only moves bytes: [`Transmit`] sends them, and [`Receive`] or [`Subscribe`]
//! delivers them. The [`Producer`] and [`Consumer`] roles sit on either side of a transfer,
//! using an [`openc2::Encoder`] to turn content into bytes and back.
//!
//! The [`memory`] module provides in-process transfers; network bindings live elsewhere.

mod config;
mod consumer;
mod error;
pub mod memory;
mod outstanding;
mod producer;
mod transfer;

pub use config::Config;
pub use consumer::Consumer;
pub use error::{Error, Role};
pub use outstanding::Outstanding;
pub use producer::Producer;
pub use transfer::{Handler, Receive, Subscribe, TransferError, Transmit};
