//! Configuration errors.

/// Rejected [`BodyConfig`](crate::BodyConfig) values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Row height must be positive; every index and spacer divides by it.
    #[error("row height must be greater than zero")]
    ZeroRowHeight,

    /// The minimum number of mounted rows must be positive.
    #[error("minimum visible rows must be greater than zero")]
    ZeroMinVisibleRows,

    /// Minimum visible rows exceeds the maximum.
    #[error("minimum visible rows ({min}) exceeds maximum ({max})")]
    InvertedRowBounds {
        /// Configured minimum.
        min: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Near-bottom threshold must lie in (0, 1].
    #[error("load-more threshold {0} is outside (0, 1]")]
    InvalidThreshold(f64),

    /// An explicit container height of zero leaves nothing to render into.
    #[error("fixed container height must be greater than zero")]
    ZeroContainerHeight,
}
