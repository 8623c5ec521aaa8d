// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn push_drops_oldest_once_at_capacity() {
    let queue = SendQueue::new(2);
    queue.push(Bytes::from_static(b"a"));
    queue.push(Bytes::from_static(b"b"));
    let dropped = queue.push(Bytes::from_static(b"c"));
    assert!(dropped);
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.dropped_count(), 1);
}

#[tokio::test]
async fn pop_returns_frames_in_fifo_order() {
    let queue = SendQueue::new(4);
    queue.push(Bytes::from_static(b"a"));
    queue.push(Bytes::from_static(b"b"));
    assert_eq!(queue.pop().await, Some(Bytes::from_static(b"a")));
    assert_eq!(queue.pop().await, Some(Bytes::from_static(b"b")));
}

#[tokio::test]
async fn pop_returns_none_after_close_once_drained() {
    let queue = SendQueue::new(4);
    queue.push(Bytes::from_static(b"a"));
    queue.close();
    assert_eq!(queue.pop().await, Some(Bytes::from_static(b"a")));
    assert_eq!(queue.pop().await, None);
}

#[tokio::test]
async fn pop_waits_until_a_frame_is_pushed() {
    let queue = std::sync::Arc::new(SendQueue::new(4));
    let q2 = queue.clone();
    let handle = tokio::spawn(async move { q2.pop().await });
    tokio::task::yield_now().await;
    queue.push(Bytes::from_static(b"late"));
    assert_eq!(handle.await.unwrap(), Some(Bytes::from_static(b"late")));
}
