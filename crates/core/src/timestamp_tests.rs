// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn formats_with_millisecond_precision_and_z_suffix() {
    let ts = Timestamp::from_epoch_ms(1_700_000_000_123);
    let s = ts.to_string();
    assert!(s.ends_with('Z'), "{s}");
    assert!(s.contains('.'), "{s}");
}

#[test]
fn round_trips_through_parse() {
    let ts = Timestamp::from_epoch_ms(1_700_000_000_123);
    let s = ts.to_string();
    let parsed = Timestamp::parse(&s).expect("should parse");
    assert_eq!(ts, parsed);
}

#[test]
fn accepts_non_utc_offset_and_normalizes() {
    let parsed = Timestamp::parse("2023-11-14T23:13:20.123+05:00").expect("should parse");
    let utc_equivalent = Timestamp::parse("2023-11-14T18:13:20.123Z").expect("should parse");
    assert_eq!(parsed, utc_equivalent);
}

#[test]
fn rejects_garbage() {
    assert!(Timestamp::parse("not-a-timestamp").is_err());
}
