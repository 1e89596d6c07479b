use time::OffsetDateTime;

const USEC_PER_SEC: i64 = 1_000_000;

/// Wall-clock instant split into whole seconds and microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub secs: i64,
    pub usecs: i64,
}

impl Timestamp {
    pub fn new(secs: i64, usecs: i64) -> Timestamp {
        debug_assert!(usecs >= 0 && usecs < USEC_PER_SEC);
        Timestamp { secs, usecs }
    }

    pub fn now() -> Timestamp {
        let now = OffsetDateTime::now_utc();
        Timestamp {
            secs: now.unix_timestamp(),
            usecs: now.microsecond() as i64,
        }
    }
}

/// Seconds elapsed from `start` to `end`.
///
/// Borrows a second whenever the microsecond field did not advance, so both
/// fields stay non-negative along the way.
pub fn timedelta(start: &Timestamp, end: &Timestamp) -> f64 {
    let usec = USEC_PER_SEC as f64;
    if end.usecs > start.usecs {
        (end.secs - start.secs) as f64 + (end.usecs - start.usecs) as f64 / usec
    } else {
        ((end.secs - 1) - start.secs) as f64
            + (end.usecs as f64 + usec - start.usecs as f64) / usec
    }
}

#[cfg(test)]
mod tests {
    use super::{
        timedelta,
        Timestamp,
    };

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_timedelta_same_instant() {
        let t = Timestamp::new(1_700_000_000, 250_000);
        assert_eq!(timedelta(&t, &t), 0.0);
    }

    #[test]
    fn test_timedelta_no_wrap() {
        let start = Timestamp::new(10, 100);
        let end = Timestamp::new(12, 600);
        assert!(close(timedelta(&start, &end), 2.0005));
    }

    #[test]
    fn test_timedelta_wrap_matches_flat_counter() {
        let pairs = [
            ((5, 900_000), (6, 100_000)),
            ((5, 999_999), (6, 0)),
            ((0, 500_000), (3, 499_999)),
            ((7, 42), (7, 42)),
            ((7, 42), (8, 42)),
        ];
        for &((ss, su), (es, eu)) in pairs.iter() {
            let start = Timestamp::new(ss, su);
            let end = Timestamp::new(es, eu);
            let flat = ((es * 1_000_000 + eu) - (ss * 1_000_000 + su)) as f64 / 1e6;
            let got = timedelta(&start, &end);
            assert!(got >= 0.0);
            assert!(close(got, flat), "{:?} -> {:?}: {} != {}", start, end, got, flat);
        }
    }

    #[test]
    fn test_now_is_monotone_enough() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(a.usecs < 1_000_000);
        // Wall clock can step, but not within two back-to-back reads in practice.
        assert!(timedelta(&a, &b) >= 0.0);
    }
}
