//! Scroll window calculation.
//!
//! Maps a scroll position onto the contiguous range of rows that should be
//! mounted. The range always honours the configured min/max row bounds, so a
//! tiny viewport still mounts a usable block of rows and a huge one never
//! mounts an unbounded number.

use std::ops::RangeInclusive;

/// Inputs to [`compute`] that stay fixed for a body's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    /// Uniform row height in pixels. Must be non-zero.
    pub row_height: u32,
    /// Extra rows beyond each visible edge.
    pub overscan: u32,
    /// Lower bound on mounted rows.
    pub min_visible_rows: usize,
    /// Upper bound on mounted rows.
    pub max_visible_rows: usize,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            row_height: 40,
            overscan: 3,
            min_visible_rows: 20,
            max_visible_rows: 60,
        }
    }
}

/// Inclusive index range of mounted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibleWindow {
    /// First mounted index.
    pub start: usize,
    /// Last mounted index (inclusive).
    pub end: usize,
}

impl VisibleWindow {
    /// Creates a window. `start` must not exceed `end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "window start {start} past end {end}");
        Self { start, end }
    }

    /// Window covering every row of a non-empty collection.
    pub fn full(item_count: usize) -> Option<Self> {
        item_count.checked_sub(1).map(|end| Self::new(0, end))
    }

    /// Number of mounted rows.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a window holds at least one row.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `index` is mounted.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    /// The mounted indices.
    pub fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Computes the mounted window for a scroll position.
///
/// `scroll_top` is measured from the top of the first row (header already
/// subtracted). Returns `None` for an empty collection.
///
/// Collections smaller than `min_visible_rows` are mounted whole. Otherwise
/// the overscanned viewport range is grown symmetrically up to the minimum
/// (spilling onto the other side when an edge blocks growth) or trimmed
/// symmetrically down to the maximum.
pub fn compute(
    scroll_top: u32,
    container_size: u32,
    params: &WindowParams,
    item_count: usize,
) -> Option<VisibleWindow> {
    if item_count == 0 {
        return None;
    }

    let n = item_count as i64;
    let row_height = i64::from(params.row_height.max(1));
    let overscan = i64::from(params.overscan);
    let min_rows = params.min_visible_rows as i64;
    let max_rows = params.max_visible_rows as i64;
    let top = i64::from(scroll_top);
    let bottom = top + i64::from(container_size);

    let mut start = (top / row_height - overscan).max(0);
    let mut end = (div_ceil(bottom, row_height) + overscan).min(n - 1);
    let mut count = end - start + 1;

    if n < min_rows {
        start = 0;
        end = n - 1;
        count = n;
    } else if count < min_rows {
        let needed = min_rows - count;
        let before = needed / 2;
        let after = needed - before;

        start = (start - before).max(0);
        end = (end + after).min(n - 1);

        // Spill whatever an edge swallowed onto the other side.
        if start == 0 && end < n - 1 {
            end = (end + (min_rows - (end - start + 1))).min(n - 1);
        } else if end == n - 1 && start > 0 {
            start = (start - (min_rows - (end - start + 1))).max(0);
        }

        count = end - start + 1;
    }

    if count > max_rows {
        let excess = count - max_rows;
        let trim_start = excess / 2;
        start += trim_start;
        end -= excess - trim_start;
    }

    let start = start.clamp(0, n - 1);
    let end = end.min(n - 1).max(start);

    Some(VisibleWindow::new(start as usize, end as usize))
}

fn div_ceil(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_ceil() {
        assert_eq!(div_ceil(0, 40), 0);
        assert_eq!(div_ceil(1, 40), 1);
        assert_eq!(div_ceil(40, 40), 1);
        assert_eq!(div_ceil(4600, 40), 115);
    }

    #[test]
    fn test_window_accessors() {
        let window = VisibleWindow::new(5, 9);
        assert_eq!(window.len(), 5);
        assert!(window.contains(5));
        assert!(window.contains(9));
        assert!(!window.contains(10));
        assert_eq!(window.range().count(), 5);
        assert_eq!(VisibleWindow::full(0), None);
        assert_eq!(VisibleWindow::full(3), Some(VisibleWindow::new(0, 2)));
    }
}
