//! Render adapter: window + items -> spacer / rows / spacer.

use crate::window::VisibleWindow;

/// Placeholder standing in for unmounted rows.
///
/// Spacers carry no content and take no input; they exist only so the scroll
/// range matches the full collection. Renderers should mark them hidden from
/// assistive technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spacer {
    /// Height in pixels.
    pub height: u64,
}

impl Spacer {
    fn for_rows(rows: usize, row_height: u32) -> Option<Self> {
        let height = rows as u64 * u64::from(row_height);
        (height > 0).then_some(Self { height })
    }
}

/// A mounted row, tagged with its index in the full collection.
#[derive(Debug, PartialEq, Eq)]
pub struct RenderedRow<'a, T> {
    /// Index in the full collection, stable across window shifts.
    pub index: usize,
    pub item: &'a T,
    /// Row height in pixels.
    pub height: u32,
}

impl<T> Clone for RenderedRow<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RenderedRow<'_, T> {}

/// One piece of the rendered body, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a, T> {
    Spacer(Spacer),
    Row(RenderedRow<'a, T>),
}

/// The output of the render adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody<'a, T> {
    /// Stands in for rows above the window; absent when the window starts at 0.
    pub lead: Option<Spacer>,
    /// Mounted rows in index order.
    pub rows: Vec<RenderedRow<'a, T>>,
    /// Stands in for rows below the window; absent when the window reaches
    /// the last row.
    pub trail: Option<Spacer>,
}

impl<'a, T> RenderedBody<'a, T> {
    fn empty() -> Self {
        Self {
            lead: None,
            rows: Vec::new(),
            trail: None,
        }
    }

    /// Lead spacer, rows, trail spacer.
    pub fn segments(&self) -> impl Iterator<Item = Segment<'a, T>> + '_ {
        self.lead
            .into_iter()
            .map(Segment::Spacer)
            .chain(self.rows.iter().copied().map(Segment::Row))
            .chain(self.trail.into_iter().map(Segment::Spacer))
    }

    /// Combined height of spacers and rows. Equals the height of the full
    /// collection.
    pub fn total_height(&self) -> u64 {
        let spacers = self.lead.map_or(0, |s| s.height) + self.trail.map_or(0, |s| s.height);
        let rows: u64 = self.rows.iter().map(|row| u64::from(row.height)).sum();
        spacers + rows
    }

    /// Indices of the mounted rows.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().map(|row| row.index)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Renders the rows of `window`, with spacers for everything else.
///
/// A `None` window (empty collection) renders nothing. A window reaching past
/// the end of `items` is cut short at the last item.
pub fn render_window<T>(
    window: Option<VisibleWindow>,
    items: &[T],
    row_height: u32,
) -> RenderedBody<'_, T> {
    let Some(window) = window else {
        return RenderedBody::empty();
    };
    let Some(last) = items.len().checked_sub(1) else {
        return RenderedBody::empty();
    };

    let start = window.start.min(last);
    let end = window.end.clamp(start, last);

    let rows = items[start..=end]
        .iter()
        .enumerate()
        .map(|(offset, item)| RenderedRow {
            index: start + offset,
            item,
            height: row_height,
        })
        .collect();

    RenderedBody {
        lead: Spacer::for_rows(start, row_height),
        rows,
        trail: Spacer::for_rows(last - end, row_height),
    }
}

/// Renders every row with no spacers.
pub fn render_all<T>(items: &[T], row_height: u32) -> RenderedBody<'_, T> {
    render_window(VisibleWindow::full(items.len()), items, row_height)
}
