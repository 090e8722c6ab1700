//! Virtual body configuration.

use std::time::Duration;

use crate::error::ConfigError;
use crate::window::WindowParams;

/// Configuration for a [`VirtualBody`](crate::VirtualBody).
///
/// Fixed for the lifetime of a body. Only `row_height` has no sensible
/// default; everything else starts at the values the list view uses.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use scrollwin::BodyConfig;
///
/// let config = BodyConfig::new(40)
///     .with_overscan(5)
///     .with_load_more_cooldown(Duration::from_millis(500));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BodyConfig {
    /// Uniform height of every row, in pixels.
    pub row_height: u32,

    /// Extra rows rendered beyond each visible edge.
    ///
    /// Default: 3
    pub overscan: u32,

    /// Explicit viewport height. When set, measurements never override it.
    pub container_height: Option<u32>,

    /// Lower bound on mounted rows (when the collection has that many).
    ///
    /// Default: 20
    pub min_visible_rows: usize,

    /// Upper bound on mounted rows.
    ///
    /// Default: 60
    pub max_visible_rows: usize,

    /// Fraction of the scroll range past which more data is requested.
    ///
    /// Default: 0.9
    pub load_more_threshold: f64,

    /// How long the load-more latch stays set after a trigger.
    ///
    /// Default: 1 second
    pub load_more_cooldown: Duration,

    /// Header height assumed when the table has no header element.
    ///
    /// Default: 48
    pub default_header_height: u32,

    /// Floor applied to measured viewport heights.
    ///
    /// Default: 100
    pub min_container_size: u32,

    /// Viewport height used before the first measurement lands.
    ///
    /// Default: 400
    pub initial_container_size: u32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            row_height: 40,
            overscan: 3,
            container_height: None,
            min_visible_rows: 20,
            max_visible_rows: 60,
            load_more_threshold: 0.9,
            load_more_cooldown: Duration::from_millis(1000),
            default_header_height: 48,
            min_container_size: 100,
            initial_container_size: 400,
        }
    }
}

impl BodyConfig {
    /// Creates a config for rows of the given height.
    pub fn new(row_height: u32) -> Self {
        Self {
            row_height,
            ..Default::default()
        }
    }

    /// Sets the overscan row count.
    pub fn with_overscan(mut self, overscan: u32) -> Self {
        self.overscan = overscan;
        self
    }

    /// Pins the viewport height instead of measuring the container.
    pub fn with_container_height(mut self, height: u32) -> Self {
        self.container_height = Some(height);
        self
    }

    /// Sets the mounted-row bounds.
    pub fn with_visible_rows(mut self, min: usize, max: usize) -> Self {
        self.min_visible_rows = min;
        self.max_visible_rows = max;
        self
    }

    /// Sets the near-bottom threshold.
    pub fn with_load_more_threshold(mut self, threshold: f64) -> Self {
        self.load_more_threshold = threshold;
        self
    }

    /// Sets the load-more cooldown.
    pub fn with_load_more_cooldown(mut self, cooldown: Duration) -> Self {
        self.load_more_cooldown = cooldown;
        self
    }

    /// Sets the fallback header height.
    pub fn with_default_header_height(mut self, height: u32) -> Self {
        self.default_header_height = height;
        self
    }

    /// Checks every field, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.row_height == 0 {
            return Err(ConfigError::ZeroRowHeight);
        }
        if self.min_visible_rows == 0 {
            return Err(ConfigError::ZeroMinVisibleRows);
        }
        if self.min_visible_rows > self.max_visible_rows {
            return Err(ConfigError::InvertedRowBounds {
                min: self.min_visible_rows,
                max: self.max_visible_rows,
            });
        }
        if !(self.load_more_threshold > 0.0 && self.load_more_threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(self.load_more_threshold));
        }
        if self.container_height == Some(0) {
            return Err(ConfigError::ZeroContainerHeight);
        }
        Ok(())
    }

    /// The subset of fields the window calculator needs.
    pub fn window_params(&self) -> WindowParams {
        WindowParams {
            row_height: self.row_height,
            overscan: self.overscan,
            min_visible_rows: self.min_visible_rows,
            max_visible_rows: self.max_visible_rows,
        }
    }
}
