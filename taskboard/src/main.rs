mod list_view;
mod seed;

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use log::{error, info, warn};
use scrollwin::{BodyConfig, ComputedStyle, MemoryHost, NodeKind, Overflow};
use simplelog::{Config, LevelFilter, WriteLogger};
use taskboard_lib::TaskStore;
use tokio::runtime::Handle;

use crate::list_view::TaskListView;

const TASK_COUNT: usize = 250;
const ROW_HEIGHT: u32 = 40;
const HEADER_HEIGHT: u32 = 48;
const VIEWPORT_HEIGHT: u32 = 600;
/// Upper bound on scroll passes, in case the source never runs dry.
const MAX_PASSES: usize = 64;
const LOAD_TIMEOUT: Duration = Duration::from_secs(2);

/// `taskboard.log` in the platform cache dir, or the working directory when
/// no home directory is known.
fn log_file() -> PathBuf {
    ProjectDirs::from("dev", "taskboard", "taskboard")
        .map(|dirs| dirs.cache_dir().join("taskboard.log"))
        .unwrap_or_else(|| PathBuf::from("taskboard.log"))
}

fn init_logging() {
    let log_file = log_file();
    if let Some(dir) = log_file.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let file = File::create(&log_file).expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), file)
        .expect("Failed to initialize logger");
    println!("Logging to {}", log_file.display());
}

#[tokio::main]
async fn main() {
    init_logging();

    let source = Arc::new(seed::source(TASK_COUNT).with_latency(Duration::from_millis(25)));
    let store = TaskStore::new(source);
    let mut view = TaskListView::new(store, BodyConfig::new(ROW_HEIGHT), Handle::current())
        .expect("Invalid body configuration");

    // Scroll container (bounded max-height) > table > sticky header + body
    let mut host = MemoryHost::new();
    let scroller = host.add_root(NodeKind::Block);
    host.set_style(
        scroller,
        ComputedStyle::scrolling(Overflow::Auto).max_height(VIEWPORT_HEIGHT),
    );
    host.set_height(scroller, VIEWPORT_HEIGHT);
    let table = host.add_child(scroller, NodeKind::Table);
    let header = host.add_child(table, NodeKind::Header);
    host.set_height(header, HEADER_HEIGHT);
    let anchor = host.add_child(table, NodeKind::Body);

    if let Err(e) = view.refresh(&mut host).await {
        error!("Initial load failed: {}", e);
        eprintln!("Error: {}", e);
        return;
    }

    let content_height =
        |rows: usize| HEADER_HEIGHT.saturating_add((rows as u32).saturating_mul(ROW_HEIGHT));
    host.set_content_height(scroller, content_height(view.store().len()));

    if !view.mount(&mut host, anchor) {
        error!("No scroll container found, rendering every row");
    }
    let frames = host.take_frames();
    view.handle_events(&host, &frames);

    for pass in 1..=MAX_PASSES {
        host.set_content_height(scroller, content_height(view.store().len()));
        let events = host.scroll_to_bottom(scroller);
        view.handle_events(&host, &events);

        let window = view.body().window();
        info!(
            "Pass {}: {} rows loaded, window {:?}",
            pass,
            view.store().len(),
            window.map(|w| w.range())
        );

        if !view.store().has_more() && !view.store().loading() {
            break;
        }
        match tokio::time::timeout(LOAD_TIMEOUT, view.wait_for_load(&mut host)).await {
            Ok(Some(Ok(_))) => {
                host.set_content_height(scroller, content_height(view.store().len()));
                let frames = host.take_frames();
                view.handle_events(&host, &frames);
            }
            Ok(Some(Err(e))) => error!("Load failed: {}", e),
            Ok(None) => break,
            Err(_) => warn!("No load completed within {:?}", LOAD_TIMEOUT),
        }
    }
    view.pump(&mut host);

    let tasks = view.store().tasks();
    for line in view.render_lines(&tasks) {
        println!("{}", line);
    }
    println!(
        "{} of {} tasks loaded, {} rows mounted",
        tasks.len(),
        view.store().pagination().total,
        view.body().window().map_or(0, |w| w.len())
    );

    view.unmount(&mut host);
}
