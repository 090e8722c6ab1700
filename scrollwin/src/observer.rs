//! Scroll and resize observation.
//!
//! Tracks the header-adjusted scroll position and viewport height of the
//! located scroll container, and raises the load-more callback when the
//! container is scrolled near its end.

use std::fmt;

use log::{debug, trace, warn};

use crate::config::BodyConfig;
use crate::gate::LoadMoreGate;
use crate::host::{Host, HostEvent, ScrollMetrics, SubscriptionId};

/// Zero-argument load-more callback. Fire-and-forget.
pub type LoadMoreFn = Box<dyn FnMut()>;

#[derive(Debug, Default, Clone, Copy)]
struct Subscriptions {
    scroll: Option<SubscriptionId>,
    resize: Option<SubscriptionId>,
    frame: Option<SubscriptionId>,
}

impl Subscriptions {
    fn take_all(&mut self) -> impl Iterator<Item = SubscriptionId> {
        [self.scroll.take(), self.resize.take(), self.frame.take()]
            .into_iter()
            .flatten()
    }
}

/// Observation state for one mounted body.
pub struct ScrollObserver<N> {
    anchor: Option<N>,
    container: Option<N>,
    subscriptions: Subscriptions,

    header_height: u32,
    /// Scroll offset from the top of the first row.
    scroll_top: u32,
    container_size: u32,
    fixed_height: Option<u32>,

    default_header_height: u32,
    min_container_size: u32,
    threshold: f64,

    gate: LoadMoreGate,
    load_more: Option<LoadMoreFn>,
    has_more: bool,
    /// A data or callback change is waiting for the next frame to re-run the
    /// near-bottom check.
    recheck_pending: bool,
}

impl<N: fmt::Debug> fmt::Debug for ScrollObserver<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollObserver")
            .field("anchor", &self.anchor)
            .field("container", &self.container)
            .field("subscriptions", &self.subscriptions)
            .field("header_height", &self.header_height)
            .field("scroll_top", &self.scroll_top)
            .field("container_size", &self.container_size)
            .field("fixed_height", &self.fixed_height)
            .field("gate", &self.gate)
            .field("has_load_more", &self.load_more.is_some())
            .field("has_more", &self.has_more)
            .field("recheck_pending", &self.recheck_pending)
            .finish_non_exhaustive()
    }
}

impl<N: Copy + Eq + fmt::Debug> ScrollObserver<N> {
    pub fn new(config: &BodyConfig) -> Self {
        Self {
            anchor: None,
            container: None,
            subscriptions: Subscriptions::default(),
            header_height: config.default_header_height,
            scroll_top: 0,
            container_size: config
                .container_height
                .unwrap_or(config.initial_container_size),
            fixed_height: config.container_height,
            default_header_height: config.default_header_height,
            min_container_size: config.min_container_size,
            threshold: config.load_more_threshold,
            gate: LoadMoreGate::new(config.load_more_cooldown),
            load_more: None,
            has_more: false,
            recheck_pending: false,
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Locates the scroll container above `anchor` and starts observing it.
    ///
    /// Returns `false` when no container exists; the observer then stays
    /// detached and the body renders every row. Re-attaching tears down any
    /// previous observation first.
    pub fn attach<H>(&mut self, host: &mut H, anchor: N) -> bool
    where
        H: Host<Node = N>,
    {
        self.detach(host);
        self.anchor = Some(anchor);

        let Some(container) = host.find_scroll_container(anchor) else {
            warn!(
                "No scroll container above {:?}; virtualization disabled",
                anchor
            );
            return false;
        };

        self.container = Some(container);
        self.header_height = self.measure_header(host);
        self.recheck_pending = false;

        // Size measurement waits for the first frame so mounting never
        // forces a synchronous layout.
        self.subscriptions.frame = Some(host.request_frame());

        self.on_scroll(host, container);

        self.subscriptions.scroll = Some(host.observe_scroll(container));
        self.subscriptions.resize = Some(host.observe_resize(container));

        debug!(
            "Observing {:?} (header {}px, viewport {}px)",
            container, self.header_height, self.container_size
        );
        true
    }

    /// Drops every subscription. Safe to call repeatedly or before attaching.
    pub fn detach<H>(&mut self, host: &mut H)
    where
        H: Host<Node = N>,
    {
        for id in self.subscriptions.take_all() {
            host.unsubscribe(id);
        }
        if let Some(container) = self.container.take() {
            debug!("Stopped observing {:?}", container);
        }
        self.anchor = None;
        self.recheck_pending = false;
    }

    /// Applies a host event. Returns whether the scroll position or viewport
    /// height changed. Events for subscriptions this observer does not hold
    /// are ignored.
    pub fn handle_event<H>(&mut self, host: &H, event: &HostEvent) -> bool
    where
        H: Host<Node = N>,
    {
        let Some(container) = self.container else {
            return false;
        };

        match *event {
            HostEvent::Scroll(id) if self.subscriptions.scroll == Some(id) => {
                self.on_scroll(host, container)
            }
            HostEvent::Resize { id, height } if self.subscriptions.resize == Some(id) => {
                self.on_resize(host, height)
            }
            HostEvent::Frame(id) if self.subscriptions.frame == Some(id) => {
                self.subscriptions.frame = None;
                self.on_frame(host, container)
            }
            _ => {
                trace!("Ignoring {:?}: not subscribed", event);
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Event handlers
    // -------------------------------------------------------------------------

    fn on_scroll<H>(&mut self, host: &H, container: N) -> bool
    where
        H: Host<Node = N>,
    {
        let metrics = host.scroll_metrics(container);
        let adjusted = metrics.scroll_top.saturating_sub(self.header_height);
        trace!("Scroll {} (adjusted {})", metrics.scroll_top, adjusted);

        let changed = adjusted != self.scroll_top;
        self.scroll_top = adjusted;

        self.check_near_bottom(host, &metrics);
        changed
    }

    fn on_resize<H>(&mut self, host: &H, height: u32) -> bool
    where
        H: Host<Node = N>,
    {
        if height == 0 || self.fixed_height.is_some() {
            return false;
        }

        // Responsive layouts can change the header between resizes.
        self.header_height = self.measure_header(host);
        let size = self.viewport_for(height);
        debug!("Container resized to {}px, viewport {}px", height, size);

        let changed = size != self.container_size;
        self.container_size = size;
        changed
    }

    fn on_frame<H>(&mut self, host: &H, container: N) -> bool
    where
        H: Host<Node = N>,
    {
        let mut changed = false;
        if self.fixed_height.is_none() {
            let size = self.viewport_for(host.bounding_height(container));
            changed = size != self.container_size;
            self.container_size = size;
        }

        // Runs after the caller has laid out the new rows, so the scroll
        // metrics already include them.
        if std::mem::take(&mut self.recheck_pending) {
            trace!("Re-running near-bottom check");
            changed |= self.on_scroll(host, container);
        }
        changed
    }

    /// Defers a near-bottom check to the next frame. Needed for containers
    /// that cannot scroll and so never emit scroll events.
    fn schedule_recheck<H>(&mut self, host: &mut H)
    where
        H: Host<Node = N>,
    {
        if self.container.is_none() {
            return;
        }
        self.recheck_pending = true;
        if self.subscriptions.frame.is_none() {
            self.subscriptions.frame = Some(host.request_frame());
        }
    }

    fn check_near_bottom<H>(&mut self, host: &H, metrics: &ScrollMetrics)
    where
        H: Host<Node = N>,
    {
        if !self.has_more || self.load_more.is_none() {
            return;
        }

        let Some(fraction) = metrics.scroll_fraction() else {
            return;
        };
        if fraction <= self.threshold {
            return;
        }

        if !self.gate.try_acquire(host.now()) {
            trace!("Near bottom ({:.3}) but load-more is latched", fraction);
            return;
        }

        debug!("Near bottom ({:.3}), requesting more rows", fraction);
        if let Some(load_more) = self.load_more.as_mut() {
            load_more();
        }
    }

    fn measure_header<H>(&self, host: &H) -> u32
    where
        H: Host<Node = N>,
    {
        self.anchor
            .and_then(|anchor| host.header_height(anchor))
            .filter(|height| *height > 0)
            .unwrap_or(self.default_header_height)
    }

    fn viewport_for(&self, height: u32) -> u32 {
        height
            .saturating_sub(self.header_height)
            .max(self.min_container_size)
    }

    // -------------------------------------------------------------------------
    // Configuration and data changes
    // -------------------------------------------------------------------------

    /// Installs the load-more callback and schedules a near-bottom check.
    pub fn set_load_more<H>(&mut self, host: &mut H, callback: LoadMoreFn)
    where
        H: Host<Node = N>,
    {
        self.load_more = Some(callback);
        self.schedule_recheck(host);
    }

    pub fn clear_load_more(&mut self) {
        self.load_more = None;
    }

    /// Records whether more data exists. A change schedules a near-bottom
    /// check.
    pub fn set_has_more<H>(&mut self, host: &mut H, has_more: bool)
    where
        H: Host<Node = N>,
    {
        if has_more != self.has_more {
            self.has_more = has_more;
            self.schedule_recheck(host);
        }
    }

    /// New rows arrived: frees the latch and schedules a near-bottom check.
    pub fn items_changed<H>(&mut self, host: &mut H)
    where
        H: Host<Node = N>,
    {
        self.gate.release();
        self.schedule_recheck(host);
    }

    /// Frees the load-more latch ahead of its cooldown.
    pub fn release_load_more(&mut self) {
        self.gate.release();
    }

    /// Pins or unpins the viewport height.
    ///
    /// Unpinning keeps the current height until the next measurement.
    pub fn set_fixed_height(&mut self, height: Option<u32>) {
        self.fixed_height = height;
        if let Some(height) = height {
            self.container_size = height;
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Header-adjusted scroll offset.
    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    pub fn container_size(&self) -> u32 {
        self.container_size
    }

    pub fn header_height(&self) -> u32 {
        self.header_height
    }

    /// The located scroll container, while attached.
    pub fn container(&self) -> Option<N> {
        self.container
    }

    pub fn is_attached(&self) -> bool {
        self.container.is_some()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a near-bottom check is waiting for the next frame.
    pub fn is_recheck_pending(&self) -> bool {
        self.recheck_pending
    }

    /// Whether a load-more trigger is currently suppressed.
    pub fn is_load_more_latched<H>(&self, host: &H) -> bool
    where
        H: Host<Node = N>,
    {
        self.gate.is_latched(host.now())
    }
}
