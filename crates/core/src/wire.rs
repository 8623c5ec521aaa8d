// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON encode/decode for `Message` frames.
//!
//! Transport framing (length prefixes, WebSocket text/binary framing) is the
//! HTTP/WebSocket façade's concern and out of scope here (§1) — this module
//! only defines the canonical JSON shape and its round-trip guarantee (§8).

use crate::message::Message;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
}

pub fn encode(message: &Message) -> Result<Vec<u8>, WireError> {
    serde_json::to_vec(message).map_err(WireError::Encode)
}

pub fn decode(bytes: &[u8]) -> Result<Message, WireError> {
    serde_json::from_slice(bytes).map_err(WireError::Decode)
}
