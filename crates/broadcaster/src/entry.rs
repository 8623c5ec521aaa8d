// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Priority-queue entry, ported from `QueuedMessage::operator<` in
//! `message_broadcaster.hpp`, with an explicit FIFO tiebreak the original's
//! bare `priority <` comparison omits.

use etlmon_core::Message;
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub message: Message,
    pub enqueue_seq: u64,
}

impl QueueEntry {
    pub fn priority(&self) -> i32 {
        self.message.priority
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority() == other.priority() && self.enqueue_seq == other.enqueue_seq
    }
}

impl Eq for QueueEntry {}

/// `BinaryHeap` is a max-heap: higher priority sorts first, and within a
/// priority class the lower (earlier) `enqueue_seq` sorts first — achieved
/// by reversing the sequence comparison, since the heap pops the greatest.
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority()).then_with(|| other.enqueue_seq.cmp(&self.enqueue_seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
