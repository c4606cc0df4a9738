//! Configurable limits for bounded retrieval.

/// Storage-level limits applied while reading primitives.
///
/// Length prefixes come straight off the wire, so they are checked against
/// these limits before any buffer is allocated. Record-level counts (keys,
/// extension records) belong to the marshal layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum length in bytes of a single opaque data or string value.
    pub max_data_len: usize,

    /// Maximum number of name components in a principal.
    pub max_principal_components: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Large enough for any realistic key or extension blob
            max_data_len: 1024 * 1024,
            max_principal_components: 16,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_data_len: 4096,
            max_principal_components: 4,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_data_len: usize::MAX,
            max_principal_components: usize::MAX,
        }
    }
}
