//! The virtualized table body.

use std::fmt;

use log::debug;

use crate::config::BodyConfig;
use crate::error::ConfigError;
use crate::host::{Host, HostEvent};
use crate::observer::ScrollObserver;
use crate::render::{render_all, render_window, RenderedBody};
use crate::window::{compute, VisibleWindow, WindowParams};

/// A table body that mounts only the rows near the viewport.
///
/// The body does not own the rows. The caller keeps the collection, reports
/// its length through [`set_item_count`](Self::set_item_count), and passes it
/// to [`render`](Self::render) each frame.
///
/// # Example
///
/// ```
/// use scrollwin::{BodyConfig, ComputedStyle, MemoryHost, NodeKind, Overflow, VirtualBody};
///
/// let mut host = MemoryHost::new();
/// let scroller = host.add_root(NodeKind::Block);
/// host.set_style(scroller, ComputedStyle::scrolling(Overflow::Auto).max_height(600));
/// host.set_height(scroller, 600);
/// let table = host.add_child(scroller, NodeKind::Table);
/// let tbody = host.add_child(table, NodeKind::Body);
///
/// let rows: Vec<u32> = (0..1000).collect();
/// let mut body = VirtualBody::new(BodyConfig::new(40)).unwrap();
/// body.set_item_count(&mut host, rows.len());
/// body.mount(&mut host, tbody);
///
/// let rendered = body.render(&rows);
/// assert_eq!(rendered.rows[0].index, 0);
/// assert_eq!(rendered.total_height(), 1000 * 40);
/// ```
pub struct VirtualBody<N> {
    config: BodyConfig,
    params: WindowParams,
    observer: ScrollObserver<N>,
    item_count: usize,
}

impl<N: fmt::Debug> fmt::Debug for VirtualBody<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualBody")
            .field("config", &self.config)
            .field("observer", &self.observer)
            .field("item_count", &self.item_count)
            .finish()
    }
}

impl<N: Copy + Eq + fmt::Debug> VirtualBody<N> {
    /// Creates a body after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found in `config`.
    pub fn new(config: BodyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            params: config.window_params(),
            observer: ScrollObserver::new(&config),
            config,
            item_count: 0,
        })
    }

    pub fn config(&self) -> &BodyConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Starts observing the scroll container above `anchor`.
    ///
    /// Returns whether virtualization is active. Without a scroll container
    /// the body renders every row.
    pub fn mount<H>(&mut self, host: &mut H, anchor: N) -> bool
    where
        H: Host<Node = N>,
    {
        self.observer.attach(host, anchor)
    }

    /// Feeds a host event to the body. Returns whether the mounted window may
    /// have changed.
    pub fn handle_event<H>(&mut self, host: &H, event: &HostEvent) -> bool
    where
        H: Host<Node = N>,
    {
        self.observer.handle_event(host, event)
    }

    /// Stops observing. Idempotent.
    pub fn unmount<H>(&mut self, host: &mut H)
    where
        H: Host<Node = N>,
    {
        self.observer.detach(host);
    }

    /// Whether only a window of rows is being mounted.
    pub fn is_virtualized(&self) -> bool {
        self.observer.is_attached()
    }

    // -------------------------------------------------------------------------
    // Data and callbacks
    // -------------------------------------------------------------------------

    /// Records the collection length.
    ///
    /// A change releases the load-more latch and, while mounted, requests a
    /// frame on which the near-bottom check runs again. Lay out the new rows
    /// before delivering that frame.
    pub fn set_item_count<H>(&mut self, host: &mut H, count: usize)
    where
        H: Host<Node = N>,
    {
        if count != self.item_count {
            debug!("Item count {} -> {}", self.item_count, count);
            self.item_count = count;
            self.observer.items_changed(host);
        }
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Sets whether the data source has more rows to load. A change is
    /// followed by a near-bottom check on the next frame.
    pub fn set_has_more<H>(&mut self, host: &mut H, has_more: bool)
    where
        H: Host<Node = N>,
    {
        self.observer.set_has_more(host, has_more);
    }

    /// Installs the callback raised when scrolling nears the end. The
    /// near-bottom check runs again on the next frame.
    pub fn on_load_more<H>(&mut self, host: &mut H, callback: impl FnMut() + 'static)
    where
        H: Host<Node = N>,
    {
        self.observer.set_load_more(host, Box::new(callback));
    }

    /// Removes the load-more callback.
    pub fn clear_load_more(&mut self) {
        self.observer.clear_load_more();
    }

    /// Frees the load-more latch, e.g. after a load failed without adding rows.
    pub fn release_load_more(&mut self) {
        self.observer.release_load_more();
    }

    /// Whether a load-more trigger is currently suppressed.
    pub fn is_load_more_latched<H>(&self, host: &H) -> bool
    where
        H: Host<Node = N>,
    {
        self.observer.is_load_more_latched(host)
    }

    /// Pins the viewport height, or returns to measuring it.
    pub fn set_container_height(&mut self, height: Option<u32>) {
        self.config.container_height = height;
        self.observer.set_fixed_height(height);
    }

    // -------------------------------------------------------------------------
    // Window and rendering
    // -------------------------------------------------------------------------

    /// Header-adjusted scroll offset.
    pub fn scroll_top(&self) -> u32 {
        self.observer.scroll_top()
    }

    /// Viewport height used for the window.
    pub fn container_size(&self) -> u32 {
        self.observer.container_size()
    }

    pub fn header_height(&self) -> u32 {
        self.observer.header_height()
    }

    /// The window for a collection of `item_count` rows.
    pub fn window_for(&self, item_count: usize) -> Option<VisibleWindow> {
        if !self.is_virtualized() {
            return VisibleWindow::full(item_count);
        }
        compute(
            self.observer.scroll_top(),
            self.observer.container_size(),
            &self.params,
            item_count,
        )
    }

    /// The window for the recorded item count.
    pub fn window(&self) -> Option<VisibleWindow> {
        self.window_for(self.item_count)
    }

    /// Renders `items` through the current window.
    pub fn render<'a, T>(&self, items: &'a [T]) -> RenderedBody<'a, T> {
        if !self.is_virtualized() {
            return render_all(items, self.params.row_height);
        }
        render_window(self.window_for(items.len()), items, self.params.row_height)
    }
}
