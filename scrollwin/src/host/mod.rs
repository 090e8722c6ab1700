//! Environment adapter.
//!
//! Everything the body needs from its rendering environment: ancestor walks,
//! computed style, geometry, a clock, and event subscriptions. Events are
//! pushed back into the body by whoever drives the host, tagged with the
//! [`SubscriptionId`] the body received when it subscribed.

mod memory;

pub use memory::{MemoryHost, NodeId, NodeKind};

use std::fmt;
use std::time::Instant;

use crate::locate::locate;

/// CSS-style overflow behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
}

impl Overflow {
    /// Whether content beyond the box can be scrolled to.
    pub fn scrolls(self) -> bool {
        matches!(self, Overflow::Scroll | Overflow::Auto)
    }
}

/// The computed style properties the locator inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComputedStyle {
    /// Shorthand `overflow`.
    pub overflow: Overflow,
    /// `overflow-y`.
    pub overflow_y: Overflow,
    /// `max-height` in pixels; `None` is CSS `none`.
    pub max_height: Option<u32>,
}

impl ComputedStyle {
    /// Style with both overflow properties set.
    pub fn scrolling(overflow: Overflow) -> Self {
        Self {
            overflow,
            overflow_y: overflow,
            max_height: None,
        }
    }

    /// Sets the max-height.
    pub fn max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Whether either overflow property lets the element scroll.
    pub fn is_scrollable(&self) -> bool {
        self.overflow.scrolls() || self.overflow_y.scrolls()
    }

    /// Whether max-height is anything other than `none`.
    pub fn has_bounded_height(&self) -> bool {
        self.max_height.is_some()
    }
}

/// Scroll geometry of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    /// Pixels scrolled from the top.
    pub scroll_top: u32,
    /// Visible height.
    pub client_height: u32,
    /// Total scrollable height.
    pub scroll_height: u32,
}

impl ScrollMetrics {
    /// Fraction of the content that is above the bottom of the viewport.
    ///
    /// `None` when there is no content to measure against.
    pub fn scroll_fraction(&self) -> Option<f64> {
        if self.scroll_height == 0 {
            return None;
        }
        Some(
            (f64::from(self.scroll_top) + f64::from(self.client_height))
                / f64::from(self.scroll_height),
        )
    }
}

/// Handle for a scroll, resize, or frame subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// An event delivered by the host to a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The observed container scrolled.
    Scroll(SubscriptionId),
    /// The observed container changed size.
    Resize {
        id: SubscriptionId,
        /// New content-box height.
        height: u32,
    },
    /// A requested deferred frame is due.
    Frame(SubscriptionId),
}

impl HostEvent {
    /// The subscription this event belongs to.
    pub fn subscription(&self) -> SubscriptionId {
        match *self {
            HostEvent::Scroll(id) | HostEvent::Resize { id, .. } | HostEvent::Frame(id) => id,
        }
    }
}

/// Capabilities a rendering environment provides to a virtual body.
pub trait Host {
    /// Element handle.
    type Node: Copy + Eq + fmt::Debug;

    /// Parent element, or `None` at the root.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Computed style of an element.
    fn computed_style(&self, node: Self::Node) -> ComputedStyle;

    /// Height of the sticky header in the table containing `anchor`, if any.
    fn header_height(&self, anchor: Self::Node) -> Option<u32>;

    /// Rendered border-box height of an element.
    fn bounding_height(&self, node: Self::Node) -> u32;

    /// Current scroll geometry of a container.
    fn scroll_metrics(&self, node: Self::Node) -> ScrollMetrics;

    /// Current time, used for the load-more cooldown.
    fn now(&self) -> Instant {
        Instant::now()
    }

    /// Nearest scrolling ancestor of `anchor`.
    fn find_scroll_container(&self, anchor: Self::Node) -> Option<Self::Node>
    where
        Self: Sized,
    {
        locate(self, anchor)
    }

    /// Subscribes to passive scroll events on `node`.
    fn observe_scroll(&mut self, node: Self::Node) -> SubscriptionId;

    /// Subscribes to size changes of `node`.
    fn observe_resize(&mut self, node: Self::Node) -> SubscriptionId;

    /// Requests a single deferred frame callback.
    fn request_frame(&mut self) -> SubscriptionId;

    /// Cancels a subscription. Unknown ids are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);
}
