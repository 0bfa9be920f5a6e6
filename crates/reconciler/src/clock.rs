//! The priority clock: wall-clock milliseconds bucketed into discrete
//! expiration values.
//!
//! Contract:
//! - Smaller is more urgent. `SYNC` (1) is the reserved immediate value,
//!   `NONE` (0) the reserved "no outstanding work" sentinel.
//! - One unit of expiration time represents 10 ms; derived values carry a
//!   fixed offset so they never collide with the sentinels.
//! - Derivation ceils to a bucket, so updates issued within one bucket
//!   window collapse to the same expiration value. That collapse is what
//!   makes batching possible.

const UNIT_SIZE_MS: u64 = 10;
const MAGIC_OFFSET: u32 = 2;

/// Async (default-priority) updates: long horizon, coarse bucket.
pub const ASYNC_EXPIRATION_MS: u64 = 5000;
pub const ASYNC_BUCKET_MS: u64 = 250;

/// Interactive updates: short horizon, fine bucket.
pub const INTERACTIVE_EXPIRATION_MS: u64 = 500;
pub const INTERACTIVE_BUCKET_MS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExpirationTime(pub u32);

impl ExpirationTime {
    /// No outstanding work.
    pub const NONE: ExpirationTime = ExpirationTime(0);
    /// Synchronous, most urgent.
    pub const SYNC: ExpirationTime = ExpirationTime(1);

    pub fn from_ms(ms: u64) -> ExpirationTime {
        ExpirationTime((ms / UNIT_SIZE_MS) as u32 + MAGIC_OFFSET)
    }

    pub fn to_ms(self) -> u64 {
        u64::from(self.0.saturating_sub(MAGIC_OFFSET)) * UNIT_SIZE_MS
    }

    pub fn is_none(self) -> bool {
        self == ExpirationTime::NONE
    }

    /// Urgency comparison; `NONE` counts as absent, not as most urgent.
    pub fn is_more_urgent_than(self, other: ExpirationTime) -> bool {
        !self.is_none() && (other.is_none() || self.0 < other.0)
    }

    /// Lower `self` to `min(self, candidate)` in urgency terms.
    pub fn bump(&mut self, candidate: ExpirationTime) {
        if candidate.is_more_urgent_than(*self) {
            *self = candidate;
        }
    }

    /// Whether a deadline at `self` has passed at renderer time `now`.
    pub fn has_expired_at(self, now: ExpirationTime) -> bool {
        !self.is_none() && now.0 >= self.0
    }
}

fn ceiling(value: u32, precision: u32) -> u32 {
    (value / precision + 1) * precision
}

fn compute_expiration_bucket(
    current: ExpirationTime,
    expiration_ms: u64,
    bucket_size_ms: u64,
) -> ExpirationTime {
    let horizon_units = (expiration_ms / UNIT_SIZE_MS) as u32;
    let bucket_units = (bucket_size_ms / UNIT_SIZE_MS) as u32;
    ExpirationTime(
        MAGIC_OFFSET + ceiling(current.0.saturating_sub(MAGIC_OFFSET) + horizon_units, bucket_units),
    )
}

pub fn compute_async_expiration(current: ExpirationTime) -> ExpirationTime {
    compute_expiration_bucket(current, ASYNC_EXPIRATION_MS, ASYNC_BUCKET_MS)
}

pub fn compute_interactive_expiration(current: ExpirationTime) -> ExpirationTime {
    compute_expiration_bucket(current, INTERACTIVE_EXPIRATION_MS, INTERACTIVE_BUCKET_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ms_conversion_round_trips_at_unit_granularity() {
        let t = ExpirationTime::from_ms(1234);
        assert_eq!(t.to_ms(), 1230);
        assert_eq!(ExpirationTime::from_ms(0), ExpirationTime(MAGIC_OFFSET));
    }

    #[test]
    fn derived_values_clear_the_sentinels() {
        let t = compute_interactive_expiration(ExpirationTime::from_ms(0));
        assert!(t.0 > ExpirationTime::SYNC.0);
    }

    #[test]
    fn updates_in_one_bucket_window_collapse() {
        let a = compute_async_expiration(ExpirationTime::from_ms(1000));
        let b = compute_async_expiration(ExpirationTime::from_ms(1040));
        assert_eq!(a, b);
        let c = compute_async_expiration(ExpirationTime::from_ms(1400));
        assert_ne!(a, c);
    }

    #[test]
    fn interactive_buckets_are_finer_and_sooner() {
        let now = ExpirationTime::from_ms(1000);
        let interactive = compute_interactive_expiration(now);
        let default = compute_async_expiration(now);
        assert!(interactive.is_more_urgent_than(default));
    }

    #[test]
    fn urgency_ordering_treats_none_as_absent() {
        assert!(ExpirationTime::SYNC.is_more_urgent_than(ExpirationTime::from_ms(100)));
        assert!(!ExpirationTime::NONE.is_more_urgent_than(ExpirationTime::SYNC));
        assert!(ExpirationTime::SYNC.is_more_urgent_than(ExpirationTime::NONE));
        let mut slot = ExpirationTime::NONE;
        slot.bump(ExpirationTime::from_ms(50));
        assert_eq!(slot, ExpirationTime::from_ms(50));
        slot.bump(ExpirationTime::SYNC);
        assert_eq!(slot, ExpirationTime::SYNC);
        slot.bump(ExpirationTime::from_ms(50));
        assert_eq!(slot, ExpirationTime::SYNC);
    }
}
