//! In-memory host: a small element tree with geometry and a manual clock.
//!
//! Nothing is laid out automatically. Callers set heights, content heights,
//! and styles directly, then drive scrolling and resizing; each mutation
//! returns the events the subscribed bodies should receive.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::{ComputedStyle, Host, HostEvent, ScrollMetrics, SubscriptionId};

/// Index of a node in a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What an element represents, as far as header lookup is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// Generic block container.
    #[default]
    Block,
    /// A table; header lookup stops here.
    Table,
    /// Sticky table header.
    Header,
    /// Table body (the usual anchor).
    Body,
}

#[derive(Debug, Clone, Default)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    style: ComputedStyle,
    height: u32,
    content_height: u32,
    scroll_top: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Watch {
    Scroll(NodeId),
    Resize(NodeId),
    Frame,
}

/// An element tree that implements [`Host`] without a real renderer.
#[derive(Debug)]
pub struct MemoryHost {
    nodes: Vec<NodeData>,
    subscriptions: BTreeMap<SubscriptionId, Watch>,
    next_subscription: u64,
    origin: Instant,
    elapsed: Duration,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            subscriptions: BTreeMap::new(),
            next_subscription: 0,
            origin: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Adds a parentless node.
    pub fn add_root(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            ..Default::default()
        });
        id
    }

    /// Adds a node under `parent`.
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            ..Default::default()
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.0].kind
    }

    pub fn set_style(&mut self, node: NodeId, style: ComputedStyle) {
        self.nodes[node.0].style = style;
    }

    /// Sets the rendered height without emitting resize events.
    pub fn set_height(&mut self, node: NodeId, height: u32) {
        self.nodes[node.0].height = height;
    }

    /// Sets the total scrollable height of a container.
    pub fn set_content_height(&mut self, node: NodeId, height: u32) {
        let data = &mut self.nodes[node.0];
        data.content_height = height;
        data.scroll_top = data.scroll_top.min(max_scroll(data));
    }

    /// Scrolls a container, clamped to its scroll range.
    ///
    /// Returns one [`HostEvent::Scroll`] per live scroll subscription on the
    /// node, even when the position did not change.
    pub fn scroll_to(&mut self, node: NodeId, top: u32) -> Vec<HostEvent> {
        let data = &mut self.nodes[node.0];
        data.scroll_top = top.min(max_scroll(data));

        self.subscriptions
            .iter()
            .filter(|(_, watch)| **watch == Watch::Scroll(node))
            .map(|(id, _)| HostEvent::Scroll(*id))
            .collect()
    }

    /// Scrolls a container to the end of its range.
    pub fn scroll_to_bottom(&mut self, node: NodeId) -> Vec<HostEvent> {
        self.scroll_to(node, u32::MAX)
    }

    /// Changes a node's height and notifies its resize subscribers.
    pub fn resize(&mut self, node: NodeId, height: u32) -> Vec<HostEvent> {
        let data = &mut self.nodes[node.0];
        data.height = height;
        data.scroll_top = data.scroll_top.min(max_scroll(data));

        self.subscriptions
            .iter()
            .filter(|(_, watch)| **watch == Watch::Resize(node))
            .map(|(id, _)| HostEvent::Resize { id: *id, height })
            .collect()
    }

    /// Fires every pending frame request. Frames are one-shot.
    pub fn take_frames(&mut self) -> Vec<HostEvent> {
        let due: Vec<SubscriptionId> = self
            .subscriptions
            .iter()
            .filter(|(_, watch)| **watch == Watch::Frame)
            .map(|(id, _)| *id)
            .collect();

        for id in &due {
            self.subscriptions.remove(id);
        }

        due.into_iter().map(HostEvent::Frame).collect()
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.elapsed += by;
    }

    /// Number of live subscriptions of any kind.
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    fn subscribe(&mut self, watch: Watch) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(id, watch);
        id
    }

    fn enclosing_table(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.nodes[id.0].kind == NodeKind::Table {
                return Some(id);
            }
            current = self.nodes[id.0].parent;
        }
        None
    }
}

fn max_scroll(data: &NodeData) -> u32 {
    data.content_height.saturating_sub(data.height)
}

impl Host for MemoryHost {
    type Node = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        self.nodes[node.0].style
    }

    fn header_height(&self, anchor: NodeId) -> Option<u32> {
        let table = self.enclosing_table(anchor)?;
        self.nodes[table.0]
            .children
            .iter()
            .find(|child| self.nodes[child.0].kind == NodeKind::Header)
            .map(|header| self.nodes[header.0].height)
    }

    fn bounding_height(&self, node: NodeId) -> u32 {
        self.nodes[node.0].height
    }

    fn scroll_metrics(&self, node: NodeId) -> ScrollMetrics {
        let data = &self.nodes[node.0];
        ScrollMetrics {
            scroll_top: data.scroll_top,
            client_height: data.height,
            scroll_height: data.content_height.max(data.height),
        }
    }

    fn now(&self) -> Instant {
        self.origin + self.elapsed
    }

    fn observe_scroll(&mut self, node: NodeId) -> SubscriptionId {
        self.subscribe(Watch::Scroll(node))
    }

    fn observe_resize(&mut self, node: NodeId) -> SubscriptionId {
        self.subscribe(Watch::Resize(node))
    }

    fn request_frame(&mut self) -> SubscriptionId {
        self.subscribe(Watch::Frame)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.remove(&id);
    }
}
