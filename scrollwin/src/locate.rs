//! Scroll container discovery.

use log::debug;

use crate::host::Host;

/// Finds the element that actually scrolls the rows under `anchor`.
///
/// Walks the ancestors of `anchor` (not `anchor` itself). The first ancestor
/// that scrolls and has a bounded max-height wins outright; failing that, the
/// first ancestor that scrolls at all. Returns `None` when no ancestor
/// scrolls.
pub fn locate<H: Host>(host: &H, anchor: H::Node) -> Option<H::Node> {
    let mut fallback = None;
    let mut current = host.parent(anchor);

    while let Some(node) = current {
        let style = host.computed_style(node);

        if style.is_scrollable() {
            if style.has_bounded_height() {
                debug!("Scroll container {:?}: scrollable with bounded max-height", node);
                return Some(node);
            }
            if fallback.is_none() {
                fallback = Some(node);
            }
        }

        current = host.parent(node);
    }

    if let Some(node) = fallback {
        debug!("Scroll container {:?}: first scrollable ancestor", node);
    }
    fallback
}
