//! Bucketing hash for percentage rollout.
//!
//! A 32-bit rolling polynomial hash (`h = h * 31 + unit` over UTF-16 code
//! units, wrapping) reduced to `[0, 99]`. It depends on nothing but its
//! input, so a flag/identifier pair lands in the same bucket on every run.

/// Number of rollout buckets.
pub const BUCKETS: u32 = 100;

/// Map `input` to a bucket in `0..100`.
///
/// ```
/// use flagstaff_features::hash::bucket;
///
/// assert_eq!(bucket("a"), 97);
/// assert!(bucket("newDashboard:user-42") < 100);
/// ```
pub fn bucket(input: &str) -> u8 {
    let hash = input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));

    // `unsigned_abs` keeps i32::MIN in range
    (hash.unsigned_abs() % BUCKETS) as u8
}

/// Hash input for a flag/identifier pair: `"<flag>:<identifier>"`.
pub fn rollout_key(flag_name: &str, identifier: &str) -> String {
    format!("{}:{}", flag_name, identifier)
}

/// Bucket of `identifier` for `flag_name`.
pub fn rollout_bucket(flag_name: &str, identifier: &str) -> u8 {
    bucket(&rollout_key(flag_name, identifier))
}
