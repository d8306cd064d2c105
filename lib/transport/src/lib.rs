//! Telegram transport layer for the gemini-relay bot.
//!
//! This crate provides:
//!
//! - **Chat transport**: The [`ChatTransport`] seam and its
//!   [`TelegramApi`] implementation over the Bot API
//! - **Updates**: Wire payload types and normalization into
//!   [`InboundUpdate`]
//! - **Dispatcher**: Command routing, reply delivery, and chunking
//! - **Transport controller**: The polling/webhook delivery-mode state
//!   machine; at most one delivery path is ever active

pub mod api;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod update;

pub use api::{ChatTransport, TelegramApi, MAX_MESSAGE_LEN};
pub use controller::{ControllerState, TransportController, TransportMode};
pub use dispatch::Dispatcher;
pub use error::{ControllerError, TransportError};
pub use update::{InboundUpdate, TelegramChat, TelegramMessage, TelegramUpdate, TelegramUser};
