// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! etlmon-core: shared data model, clock abstraction, and observer seam for
//! the ETL monitoring backbone.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod ids;
pub mod message;
pub mod observer;
pub mod timestamp;
pub mod wire;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use ids::{validate_job_id, JobId, SessionId};
pub use message::{ConnectionFilters, FilterUpdate, LogLevel, Message, MessageKind};
pub use observer::{default_observer, NoopObserver, ObservedEvent, Observer, TracingObserver};
pub use timestamp::Timestamp;
