//! Limits for record-level decoding.

/// Record-level limits enforced while decoding.
///
/// Key and extension record counts are read off the wire and used to size
/// allocations, so they are bounded here before anything is reserved.
/// Lengths of individual values are bounded by the [`storage::Limits`] of the
/// reader doing the decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshalLimits {
    /// Maximum number of key records in one principal entry.
    pub max_keys: usize,
    /// Maximum number of extension records in one principal entry.
    pub max_tl_data: usize,
}

impl Default for MarshalLimits {
    fn default() -> Self {
        Self {
            max_keys: 256,
            max_tl_data: 256,
        }
    }
}

impl MarshalLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_keys: 8,
            max_tl_data: 8,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_keys: usize::MAX,
            max_tl_data: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_are_reasonable() {
        let limits = MarshalLimits::default();
        assert!(limits.max_keys >= 32);
        assert!(limits.max_tl_data >= 32);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = MarshalLimits::for_testing();
        let default_limits = MarshalLimits::default();
        assert!(test_limits.max_keys < default_limits.max_keys);
        assert!(test_limits.max_tl_data < default_limits.max_tl_data);
    }

    #[test]
    fn unlimited_limits() {
        let limits = MarshalLimits::unlimited();
        assert_eq!(limits.max_keys, usize::MAX);
        assert_eq!(limits.max_tl_data, usize::MAX);
    }
}
