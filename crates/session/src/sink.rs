// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam where the out-of-scope HTTP/WebSocket-upgrade façade plugs in a
//! real transport. Session and pool logic never touch a socket directly —
//! they write encoded frames to a [`FrameSink`].

use crate::error::SessionError;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn send(&mut self, frame: Bytes) -> Result<(), SessionError>;
}

/// Default/test transport: frames are written to an `mpsc` channel instead
/// of a real socket. Production wires in a `tokio-tungstenite` (or axum)
/// stream in the façade that is out of scope here.
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx }
    }

    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send(&mut self, frame: Bytes) -> Result<(), SessionError> {
        self.tx.send(frame).await.map_err(|_| SessionError::Sink("receiver dropped".into()))
    }
}
