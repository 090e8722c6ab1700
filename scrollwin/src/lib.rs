//! Virtualized row windowing for scrollable tables.
//!
//! Only the rows inside a scroll-derived window are mounted; spacers stand in
//! for the rest so the scrollbar keeps its full range. The host environment
//! (a DOM, a terminal tree, a test double) is reached through [`Host`].

pub mod body;
pub mod config;
pub mod error;
pub mod gate;
pub mod host;
pub mod locate;
pub mod observer;
pub mod render;
pub mod window;

pub use body::VirtualBody;
pub use config::BodyConfig;
pub use error::ConfigError;
pub use gate::LoadMoreGate;
pub use host::{
    ComputedStyle, Host, HostEvent, MemoryHost, NodeId, NodeKind, Overflow, ScrollMetrics,
    SubscriptionId,
};
pub use locate::locate;
pub use observer::{LoadMoreFn, ScrollObserver};
pub use render::{render_all, render_window, RenderedBody, RenderedRow, Segment, Spacer};
pub use window::{compute, VisibleWindow, WindowParams};
