use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use scrollwin::{
    BodyConfig, ComputedStyle, ConfigError, HostEvent, MemoryHost, NodeId, NodeKind, Overflow,
    VirtualBody,
};
use simplelog::{Config, LevelFilter, TestLogger};

const ROW: u32 = 40;
const HEADER: u32 = 48;
const VIEWPORT: u32 = 648;

struct Fixture {
    host: MemoryHost,
    scroller: NodeId,
    header: NodeId,
    anchor: NodeId,
}

/// Bounded scroll container > table > (header, body), sized for `rows` rows.
fn fixture(rows: u32) -> Fixture {
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());

    let mut host = MemoryHost::new();
    let scroller = host.add_root(NodeKind::Block);
    host.set_style(
        scroller,
        ComputedStyle::scrolling(Overflow::Auto).max_height(VIEWPORT),
    );
    host.set_height(scroller, VIEWPORT);
    host.set_content_height(scroller, HEADER + rows * ROW);

    let table = host.add_child(scroller, NodeKind::Table);
    let header = host.add_child(table, NodeKind::Header);
    host.set_height(header, HEADER);
    let anchor = host.add_child(table, NodeKind::Body);

    Fixture {
        host,
        scroller,
        header,
        anchor,
    }
}

fn mounted(fx: &mut Fixture, rows: usize) -> VirtualBody<NodeId> {
    let mut body = VirtualBody::new(BodyConfig::new(ROW)).unwrap();
    body.set_item_count(&mut fx.host, rows);
    assert!(body.mount(&mut fx.host, fx.anchor));
    let frames = fx.host.take_frames();
    deliver(&mut body, fx, frames);
    body
}

fn deliver(body: &mut VirtualBody<NodeId>, fx: &Fixture, events: Vec<HostEvent>) -> bool {
    let mut changed = false;
    for event in &events {
        changed |= body.handle_event(&fx.host, event);
    }
    changed
}

fn scroll(body: &mut VirtualBody<NodeId>, fx: &mut Fixture, top: u32) -> bool {
    let events = fx.host.scroll_to(fx.scroller, top);
    deliver(body, fx, events)
}

fn counter(body: &mut VirtualBody<NodeId>, fx: &mut Fixture) -> Rc<Cell<u32>> {
    let calls = Rc::new(Cell::new(0));
    let handle = Rc::clone(&calls);
    body.on_load_more(&mut fx.host, move || handle.set(handle.get() + 1));
    body.set_has_more(&mut fx.host, true);
    calls
}

fn next_frame(body: &mut VirtualBody<NodeId>, fx: &mut Fixture) -> bool {
    let frames = fx.host.take_frames();
    deliver(body, fx, frames)
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_invalid_config_fails_fast() {
    let result = VirtualBody::<NodeId>::new(BodyConfig::new(0));
    assert_eq!(result.err(), Some(ConfigError::ZeroRowHeight));
}

// =============================================================================
// Mounting and measurement
// =============================================================================

#[test]
fn test_mount_subscribes_and_measures_header() {
    let mut fx = fixture(1000);
    let mut body = VirtualBody::new(BodyConfig::new(ROW)).unwrap();

    assert!(body.mount(&mut fx.host, fx.anchor));
    assert!(body.is_virtualized());
    assert_eq!(body.header_height(), HEADER);
    // scroll + resize + one deferred frame
    assert_eq!(fx.host.active_subscriptions(), 3);
}

#[test]
fn test_container_measured_on_first_frame() {
    let mut fx = fixture(1000);
    let mut body = VirtualBody::new(BodyConfig::new(ROW)).unwrap();
    body.mount(&mut fx.host, fx.anchor);

    assert_eq!(body.container_size(), 400);

    let frames = fx.host.take_frames();
    assert!(deliver(&mut body, &fx, frames));
    assert_eq!(body.container_size(), VIEWPORT - HEADER);
    assert_eq!(fx.host.active_subscriptions(), 2);
}

#[test]
fn test_missing_header_uses_default() {
    let mut host = MemoryHost::new();
    let scroller = host.add_root(NodeKind::Block);
    host.set_style(scroller, ComputedStyle::scrolling(Overflow::Auto));
    host.set_height(scroller, 500);
    let table = host.add_child(scroller, NodeKind::Table);
    let anchor = host.add_child(table, NodeKind::Body);

    let config = BodyConfig::new(ROW).with_default_header_height(30);
    let mut body = VirtualBody::new(config).unwrap();
    body.mount(&mut host, anchor);

    assert_eq!(body.header_height(), 30);
}

#[test]
fn test_initial_scroll_position_applied_on_mount() {
    let mut fx = fixture(1000);
    fx.host.scroll_to(fx.scroller, 2048);

    let mut body = VirtualBody::new(BodyConfig::new(ROW)).unwrap();
    body.mount(&mut fx.host, fx.anchor);

    assert_eq!(body.scroll_top(), 2000);
}

#[test]
fn test_without_scroll_container_renders_everything() {
    let mut host = MemoryHost::new();
    let table = host.add_root(NodeKind::Table);
    let anchor = host.add_child(table, NodeKind::Body);

    let items: Vec<u32> = (0..500).collect();
    let mut body = VirtualBody::new(BodyConfig::new(ROW)).unwrap();
    body.set_item_count(&mut host, items.len());

    assert!(!body.mount(&mut host, anchor));
    assert!(!body.is_virtualized());
    assert_eq!(host.active_subscriptions(), 0);

    let rendered = body.render(&items);
    assert_eq!(rendered.rows.len(), 500);
    assert_eq!(rendered.lead, None);
    assert_eq!(rendered.trail, None);
}

// =============================================================================
// Scrolling
// =============================================================================

#[test]
fn test_scroll_moves_window() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);

    assert!(scroll(&mut body, &mut fx, 4000 + HEADER));
    assert_eq!(body.scroll_top(), 4000);

    let window = body.window().unwrap();
    assert_eq!(window.start, 97);
    assert_eq!(window.end, 118);

    let items: Vec<u32> = (0..1000).collect();
    let rendered = body.render(&items);
    assert_eq!(rendered.lead.map(|s| s.height), Some(97 * 40));
    assert_eq!(rendered.total_height(), 1000 * 40);
}

#[test]
fn test_scroll_within_header_clamps_to_zero() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);

    scroll(&mut body, &mut fx, 30);
    assert_eq!(body.scroll_top(), 0);
    assert_eq!(body.window().unwrap().start, 0);
}

#[test]
fn test_scrolling_up_moves_window_back() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);

    scroll(&mut body, &mut fx, 30_000);
    let low = body.window().unwrap();
    scroll(&mut body, &mut fx, 10_000);
    let high = body.window().unwrap();

    assert!(high.start < low.start);
    assert!(high.end < low.end);
}

// =============================================================================
// Resizing
// =============================================================================

#[test]
fn test_resize_recomputes_viewport() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);

    let events = fx.host.resize(fx.scroller, 348);
    assert!(deliver(&mut body, &fx, events));
    assert_eq!(body.container_size(), 300);

    let events = fx.host.resize(fx.scroller, 120);
    deliver(&mut body, &fx, events);
    assert_eq!(body.container_size(), 100);
}

#[test]
fn test_zero_height_resize_ignored() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);

    let events = fx.host.resize(fx.scroller, 0);
    assert!(!deliver(&mut body, &fx, events));
    assert_eq!(body.container_size(), VIEWPORT - HEADER);
}

#[test]
fn test_resize_remeasures_header() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);

    fx.host.set_height(fx.header, 96);
    let events = fx.host.resize(fx.scroller, 696);
    deliver(&mut body, &fx, events);

    assert_eq!(body.header_height(), 96);
    assert_eq!(body.container_size(), 600);
}

#[test]
fn test_fixed_height_wins_over_measurement() {
    let mut fx = fixture(1000);
    let config = BodyConfig::new(ROW).with_container_height(250);
    let mut body = VirtualBody::new(config).unwrap();
    body.mount(&mut fx.host, fx.anchor);

    let frames = fx.host.take_frames();
    deliver(&mut body, &fx, frames);
    let events = fx.host.resize(fx.scroller, 900);
    deliver(&mut body, &fx, events);

    assert_eq!(body.container_size(), 250);

    body.set_container_height(Some(500));
    assert_eq!(body.container_size(), 500);

    body.set_container_height(None);
    let events = fx.host.resize(fx.scroller, 848);
    deliver(&mut body, &fx, events);
    assert_eq!(body.container_size(), 800);
}

// =============================================================================
// Load more
// =============================================================================

#[test]
fn test_near_bottom_fires_once_under_rapid_scrolling() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    let calls = counter(&mut body, &mut fx);

    for step in 0..8 {
        scroll(&mut body, &mut fx, 36_000 + step * 100);
        fx.host.advance(Duration::from_millis(100));
    }

    assert_eq!(calls.get(), 1);
}

#[test]
fn test_below_threshold_does_not_fire() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    let calls = counter(&mut body, &mut fx);

    // (35_000 + 648) / 40_048 is just under 0.9
    scroll(&mut body, &mut fx, 35_000);
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_cooldown_expiry_allows_retrigger() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    let calls = counter(&mut body, &mut fx);

    scroll(&mut body, &mut fx, 37_000);
    assert_eq!(calls.get(), 1);

    fx.host.advance(Duration::from_millis(999));
    scroll(&mut body, &mut fx, 37_100);
    assert_eq!(calls.get(), 1);

    fx.host.advance(Duration::from_millis(1));
    scroll(&mut body, &mut fx, 37_200);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_item_count_change_releases_latch() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    let calls = counter(&mut body, &mut fx);

    scroll(&mut body, &mut fx, 37_000);
    assert!(body.is_load_more_latched(&fx.host));

    fx.host.set_content_height(fx.scroller, HEADER + 1020 * ROW);
    body.set_item_count(&mut fx.host, 1020);
    assert!(!body.is_load_more_latched(&fx.host));

    fx.host.advance(Duration::from_millis(50));
    scroll(&mut body, &mut fx, 40_000);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_unchanged_item_count_keeps_latch() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    let calls = counter(&mut body, &mut fx);

    scroll(&mut body, &mut fx, 37_000);
    body.set_item_count(&mut fx.host, 1000);
    scroll(&mut body, &mut fx, 37_100);

    assert_eq!(calls.get(), 1);
}

#[test]
fn test_explicit_release_allows_retrigger() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    let calls = counter(&mut body, &mut fx);

    scroll(&mut body, &mut fx, 37_000);
    body.release_load_more();
    scroll(&mut body, &mut fx, 37_100);

    assert_eq!(calls.get(), 2);
}

#[test]
fn test_no_trigger_without_more_data() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    let calls = counter(&mut body, &mut fx);
    body.set_has_more(&mut fx.host, false);

    scroll(&mut body, &mut fx, 39_000);
    assert_eq!(calls.get(), 0);
    assert!(!body.is_load_more_latched(&fx.host));
}

#[test]
fn test_no_trigger_without_callback() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    let calls = counter(&mut body, &mut fx);
    body.clear_load_more();

    scroll(&mut body, &mut fx, 39_000);
    assert_eq!(calls.get(), 0);
    assert!(!body.is_load_more_latched(&fx.host));
}

#[test]
fn test_count_change_rechecks_when_container_cannot_scroll() {
    // Five rows leave the viewport mostly empty: no scroll event will come.
    let mut fx = fixture(5);
    let mut body = mounted(&mut fx, 5);
    let calls = counter(&mut body, &mut fx);

    next_frame(&mut body, &mut fx);
    assert_eq!(calls.get(), 1);

    fx.host.set_content_height(fx.scroller, HEADER + 10 * ROW);
    body.set_item_count(&mut fx.host, 10);
    assert!(!body.is_load_more_latched(&fx.host));

    next_frame(&mut body, &mut fx);
    assert_eq!(calls.get(), 2);
    assert!(body.is_load_more_latched(&fx.host));
}

#[test]
fn test_short_collection_keeps_loading_until_viewport_fills() {
    let mut fx = fixture(5);
    let mut body = mounted(&mut fx, 5);
    let calls = counter(&mut body, &mut fx);
    next_frame(&mut body, &mut fx);

    let mut rows = 5;
    while calls.get() as usize * 5 + 5 > rows {
        rows += 5;
        fx.host.set_content_height(fx.scroller, HEADER + rows as u32 * ROW);
        body.set_item_count(&mut fx.host, rows);
        next_frame(&mut body, &mut fx);
    }

    // 20 rows (848px) overflow the 648px viewport: 648 / 848 < 0.9
    assert_eq!(rows, 20);
    assert_eq!(calls.get(), 3);
    assert!(!body.is_load_more_latched(&fx.host));
}

#[test]
fn test_callback_installed_at_bottom_fires_on_next_frame() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    scroll(&mut body, &mut fx, 39_400);

    let calls = counter(&mut body, &mut fx);
    assert_eq!(calls.get(), 0);
    assert!(body.is_virtualized());

    next_frame(&mut body, &mut fx);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_has_more_turning_true_at_bottom_fires() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    let calls = counter(&mut body, &mut fx);
    body.set_has_more(&mut fx.host, false);
    next_frame(&mut body, &mut fx);

    scroll(&mut body, &mut fx, 39_400);
    assert_eq!(calls.get(), 0);

    body.set_has_more(&mut fx.host, true);
    next_frame(&mut body, &mut fx);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_recheck_waits_for_frame() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    scroll(&mut body, &mut fx, 39_400);
    let calls = counter(&mut body, &mut fx);

    // Unrelated scroll events run the check themselves.
    scroll(&mut body, &mut fx, 39_400);
    assert_eq!(calls.get(), 1);

    // The deferred check still runs but finds the latch set.
    next_frame(&mut body, &mut fx);
    assert_eq!(calls.get(), 1);
}

// =============================================================================
// Teardown
// =============================================================================

#[test]
fn test_unmount_is_idempotent() {
    let mut fx = fixture(1000);
    let mut body = VirtualBody::new(BodyConfig::new(ROW)).unwrap();

    body.unmount(&mut fx.host);

    body.mount(&mut fx.host, fx.anchor);
    body.unmount(&mut fx.host);
    body.unmount(&mut fx.host);

    assert_eq!(fx.host.active_subscriptions(), 0);
    assert!(!body.is_virtualized());
}

#[test]
fn test_remount_does_not_leak_subscriptions() {
    let mut fx = fixture(1000);
    let mut body = VirtualBody::new(BodyConfig::new(ROW)).unwrap();

    body.mount(&mut fx.host, fx.anchor);
    body.mount(&mut fx.host, fx.anchor);

    assert_eq!(fx.host.active_subscriptions(), 3);
}

#[test]
fn test_unmount_during_load_ignores_stale_events() {
    let mut fx = fixture(1000);
    let mut body = mounted(&mut fx, 1000);
    let calls = counter(&mut body, &mut fx);

    scroll(&mut body, &mut fx, 37_000);
    assert_eq!(calls.get(), 1);
    let before = body.scroll_top();

    // Events queued by the host before teardown arrive afterwards.
    let stale = fx.host.scroll_to(fx.scroller, 1000);
    let stale_resize = fx.host.resize(fx.scroller, 300);
    body.unmount(&mut fx.host);

    fx.host.advance(Duration::from_secs(5));
    assert!(!deliver(&mut body, &fx, stale));
    assert!(!deliver(&mut body, &fx, stale_resize));

    assert_eq!(body.scroll_top(), before);
    assert_eq!(body.container_size(), VIEWPORT - HEADER);
    assert_eq!(calls.get(), 1);

    // The load finishing after unmount only grows the count.
    body.set_item_count(&mut fx.host, 1020);
    assert_eq!(calls.get(), 1);
    assert_eq!(fx.host.active_subscriptions(), 0);
}

#[test]
fn test_empty_collection_renders_nothing() {
    let mut fx = fixture(0);
    let body = mounted(&mut fx, 0);
    let items: Vec<u32> = Vec::new();

    assert_eq!(body.window(), None);
    assert!(body.render(&items).is_empty());
}
