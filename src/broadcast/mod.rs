//! Broadcast Module
//!
//! Fire-and-forget fan-out of events to live listeners.
//!
//! # Components
//! - `Broadcaster`: contract the book service publishes through
//! - `BroadcastHub`: in-process fan-out over a tokio broadcast channel
//! - `socket_handler`: WebSocket endpoint attaching listeners to the hub

mod hub;
mod socket;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use hub::{BroadcastHub, ClientId, Envelope};
pub use socket::socket_handler;

/// Event emitted whenever a book is created.
pub const NEW_BOOK_EVENT: &str = "newBook";

/// Wire frame exchanged with listeners: `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastEvent {
    pub event: String,
    pub data: Value,
}

impl BroadcastEvent {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Failures raised while broadcasting. Never fatal to the triggering request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    #[error("broadcast channel unavailable: {0}")]
    Unavailable(String),

    #[error("broadcast timed out after {0}ms")]
    Timeout(u64),

    #[error("broadcast payload serialization failed: {0}")]
    Serialization(String),
}

/// Publishes events to every currently connected listener.
///
/// No delivery guarantee, no persistence, no replay for late joiners.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, event: &str, payload: Value) -> Result<(), BroadcastError>;
}
