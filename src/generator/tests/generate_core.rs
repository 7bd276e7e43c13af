use super::{SandIdGenerator, Seed, SEED};
use crate::MAX_TIMESTAMP;

/// Generates increasing IDs even with decreasing or constant timestamp
#[test]
fn generates_increasing_ids_even_with_decreasing_or_constant_timestamp() {
    let ts = 0x0123_4567_89ab_cdefu64;
    let mut g = SandIdGenerator::for_testing();

    let mut prev = g.generate_core(ts);
    assert_eq!(prev.timestamp(), ts);

    for i in 0..300_000u64 {
        let curr = g.generate_core(ts - i.min(9_999));
        assert!(prev < curr);
        prev = curr;
    }
    assert!(prev.timestamp() > ts);
}

/// Keeps increasing after a clock regression from far in the future
#[test]
fn keeps_increasing_after_a_clock_regression_from_far_in_the_future() {
    let ts = 0x01f0_0000_0000_0000u64;
    let future = MAX_TIMESTAMP - 1;
    let mut g = SandIdGenerator::for_testing();

    let before = g.generate_core(ts);
    let prev = g.generate_core(future);
    assert!(before < prev);
    assert_eq!(prev.sequence(), before.sequence());

    let curr = g.generate_core(ts + 1);
    assert!(prev < curr);
    assert_eq!(curr.timestamp(), future);
    assert_eq!(curr.sequence(), prev.sequence().wrapping_add(1));
}

/// Leaves the sequence unchanged while the clock moves forward
#[test]
fn leaves_the_sequence_unchanged_while_the_clock_moves_forward() {
    let ts = 0x01f0_0000_0000_0000u64;
    let mut g = SandIdGenerator::for_testing();

    let first = g.generate_core(ts);
    let second = g.generate_core(ts);
    assert_eq!(second.sequence(), first.sequence() + 1);

    for i in 1..1_000u64 {
        let e = g.generate_core(ts + i);
        assert_eq!(e.timestamp(), ts + i);
        assert_eq!(e.sequence(), second.sequence());
    }
}

/// Advances timestamp by one tick when sequence wraps around
#[test]
fn advances_timestamp_by_one_tick_when_sequence_wraps_around() {
    let ts = 0x01f0_0000_0000_0000u64;
    let mut g = SandIdGenerator::with_time_source(Seed::new(SEED.node(), 0, 0xfffe), || 0);

    let a = g.generate_core(ts);
    assert_eq!((a.timestamp(), a.sequence()), (ts, 0xfffe));

    let b = g.generate_core(ts);
    assert_eq!((b.timestamp(), b.sequence()), (ts, 0xffff));

    let c = g.generate_core(ts);
    assert_eq!((c.timestamp(), c.sequence()), (ts + 1, 0));

    let d = g.generate_core(ts);
    assert_eq!((d.timestamp(), d.sequence()), (ts + 1, 1));

    let e = g.generate_core(ts + 5);
    assert_eq!((e.timestamp(), e.sequence()), (ts + 5, 1));

    assert!(a < b && b < c && c < d && d < e);
}

/// Wraps sequence without advancing timestamp at the maximum timestamp
#[test]
fn wraps_sequence_without_advancing_timestamp_at_the_maximum_timestamp() {
    let mut g = SandIdGenerator::with_time_source(Seed::new(SEED.node(), 0, 0xffff), || 0);

    let prev = g.generate_core(MAX_TIMESTAMP);
    assert_eq!(prev.sequence(), 0xffff);

    let curr = g.generate_core(MAX_TIMESTAMP);
    assert_eq!((curr.timestamp(), curr.sequence()), (MAX_TIMESTAMP, 0));
    assert!(curr < prev);
}

/// Panics if timestamp exceeds 60 bits
#[test]
#[should_panic(expected = "`timestamp` must be a 60-bit unsigned integer")]
fn panics_if_timestamp_exceeds_60_bits() {
    SandIdGenerator::for_testing().generate_core(MAX_TIMESTAMP + 1);
}
