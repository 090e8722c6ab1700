//! Task list view: a virtual table body fed by the task store.

use log::{debug, info, warn};
use scrollwin::{BodyConfig, ConfigError, Host, HostEvent, NodeId, Segment, VirtualBody};
use taskboard_lib::{SourceError, Task, TaskStore};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Result of a load-more request, reported back to the view.
pub type LoadOutcome = Result<usize, SourceError>;

/// Virtualized list of the tasks held by a [`TaskStore`].
///
/// Scrolling near the end spawns `load_more_tasks` on the runtime. Outcomes
/// are applied on the next [`pump`](Self::pump) or
/// [`wait_for_load`](Self::wait_for_load); a grown list requests a frame,
/// which should be delivered after the new rows are laid out.
pub struct TaskListView {
    body: VirtualBody<NodeId>,
    store: TaskStore,
    runtime: Handle,
    loads: mpsc::UnboundedSender<LoadOutcome>,
    outcomes: mpsc::UnboundedReceiver<LoadOutcome>,
}

impl TaskListView {
    pub fn new(store: TaskStore, config: BodyConfig, runtime: Handle) -> Result<Self, ConfigError> {
        let (loads, outcomes) = mpsc::unbounded_channel();
        Ok(Self {
            body: VirtualBody::new(config)?,
            store,
            runtime,
            loads,
            outcomes,
        })
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn body(&self) -> &VirtualBody<NodeId> {
        &self.body
    }

    fn loader(&self) -> impl FnMut() + 'static {
        let store = self.store.clone();
        let tx = self.loads.clone();
        let runtime = self.runtime.clone();
        move || {
            let store = store.clone();
            let tx = tx.clone();
            debug!("Load more requested");
            runtime.spawn(async move {
                let _ = tx.send(store.load_more_tasks().await);
            });
        }
    }

    /// Mounts the body under `anchor` and starts listening for load-more
    /// triggers. Returns whether virtualization is active.
    pub fn mount<H>(&mut self, host: &mut H, anchor: NodeId) -> bool
    where
        H: Host<Node = NodeId>,
    {
        let virtualized = self.body.mount(host, anchor);
        self.sync(host);
        let loader = self.loader();
        self.body.on_load_more(host, loader);
        virtualized
    }

    pub fn unmount<H>(&mut self, host: &mut H)
    where
        H: Host<Node = NodeId>,
    {
        self.body.clear_load_more();
        self.body.unmount(host);
    }

    /// Feeds host events to the body. Returns whether the window may have
    /// changed.
    pub fn handle_events<H>(&mut self, host: &H, events: &[HostEvent]) -> bool
    where
        H: Host<Node = NodeId>,
    {
        events
            .iter()
            .fold(false, |changed, event| self.body.handle_event(host, event) | changed)
    }

    /// Reloads the first page and resyncs the body.
    pub async fn refresh<H>(&mut self, host: &mut H) -> Result<(), SourceError>
    where
        H: Host<Node = NodeId>,
    {
        let result = self.store.refresh().await;
        self.sync(host);
        result
    }

    /// Applies every load outcome received so far. Returns whether any were
    /// applied.
    pub fn pump<H>(&mut self, host: &mut H) -> bool
    where
        H: Host<Node = NodeId>,
    {
        let mut applied = false;
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.apply(host, outcome);
            applied = true;
        }
        applied
    }

    /// Waits for the next load outcome and applies it.
    pub async fn wait_for_load<H>(&mut self, host: &mut H) -> Option<LoadOutcome>
    where
        H: Host<Node = NodeId>,
    {
        let outcome = self.outcomes.recv().await?;
        self.apply(host, outcome.clone());
        Some(outcome)
    }

    fn apply<H>(&mut self, host: &mut H, outcome: LoadOutcome)
    where
        H: Host<Node = NodeId>,
    {
        match outcome {
            Ok(appended) => {
                info!("Loaded {} more tasks ({} total)", appended, self.store.len());
                self.sync(host);
            }
            Err(e) => {
                warn!("Load more failed: {}", e);
                self.body.release_load_more();
            }
        }
    }

    fn sync<H>(&mut self, host: &mut H)
    where
        H: Host<Node = NodeId>,
    {
        self.body.set_item_count(host, self.store.len());
        self.body.set_has_more(host, self.store.has_more());
    }

    /// One line per rendered segment, for logging and text output.
    pub fn render_lines(&self, tasks: &[Task]) -> Vec<String> {
        self.body
            .render(tasks)
            .segments()
            .map(|segment| match segment {
                Segment::Spacer(spacer) => format!("  ~ {}px ~", spacer.height),
                Segment::Row(row) => format_row(row.index, row.item),
            })
            .collect()
    }
}

fn format_row(index: usize, task: &Task) -> String {
    let priority = task.priority.map_or("-", |p| p.label());
    format!(
        "{:>5}  {:<40} {:<12} {:<6}",
        index + 1,
        task.title,
        task.status.label(),
        priority
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use scrollwin::{ComputedStyle, MemoryHost, NodeKind, Overflow, VisibleWindow};
    use taskboard_lib::{InMemoryTaskSource, PaginationUpdate};

    use super::*;
    use crate::seed;

    const ROW: u32 = 40;
    const HEADER: u32 = 48;
    const VIEWPORT: u32 = 648;

    struct Layout {
        host: MemoryHost,
        scroller: NodeId,
        anchor: NodeId,
    }

    impl Layout {
        fn new() -> Self {
            let mut host = MemoryHost::new();
            let scroller = host.add_root(NodeKind::Block);
            host.set_style(
                scroller,
                ComputedStyle::scrolling(Overflow::Auto).max_height(VIEWPORT),
            );
            host.set_height(scroller, VIEWPORT);
            let table = host.add_child(scroller, NodeKind::Table);
            let header = host.add_child(table, NodeKind::Header);
            host.set_height(header, HEADER);
            let anchor = host.add_child(table, NodeKind::Body);
            Self {
                host,
                scroller,
                anchor,
            }
        }

        /// Sizes the scroll content for `rows` rows and delivers pending
        /// frames, as a render pass would.
        fn lay_out(&mut self, view: &mut TaskListView, rows: usize) {
            self.host
                .set_content_height(self.scroller, HEADER + rows as u32 * ROW);
            let frames = self.host.take_frames();
            view.handle_events(&self.host, &frames);
        }
    }

    async fn mounted_with(store: TaskStore) -> (TaskListView, Layout) {
        let mut ui = Layout::new();
        let mut view = TaskListView::new(store, BodyConfig::new(ROW), Handle::current()).unwrap();
        view.refresh(&mut ui.host).await.unwrap();

        let rows = view.store().len();
        ui.host
            .set_content_height(ui.scroller, HEADER + rows as u32 * ROW);
        assert!(view.mount(&mut ui.host, ui.anchor));
        ui.lay_out(&mut view, rows);
        (view, ui)
    }

    async fn mounted(source: Arc<InMemoryTaskSource>) -> (TaskListView, Layout) {
        mounted_with(TaskStore::new(source)).await
    }

    fn scroll_to_bottom(view: &mut TaskListView, ui: &mut Layout) {
        ui.host
            .set_content_height(ui.scroller, HEADER + view.store().len() as u32 * ROW);
        let events = ui.host.scroll_to_bottom(ui.scroller);
        view.handle_events(&ui.host, &events);
    }

    #[tokio::test]
    async fn test_scroll_to_end_loads_next_page() {
        let (mut view, mut ui) = mounted(Arc::new(seed::source(50))).await;
        assert_eq!(view.body().item_count(), 20);
        assert_eq!(view.body().window(), Some(VisibleWindow::new(0, 19)));

        scroll_to_bottom(&mut view, &mut ui);
        let outcome = view.wait_for_load(&mut ui.host).await.unwrap();

        assert_eq!(outcome, Ok(20));
        assert_eq!(view.body().item_count(), 40);
        assert!(!view.body().is_load_more_latched(&ui.host));
    }

    #[tokio::test]
    async fn test_loads_until_source_exhausted() {
        let (mut view, mut ui) = mounted(Arc::new(seed::source(50))).await;

        for _ in 0..2 {
            scroll_to_bottom(&mut view, &mut ui);
            view.wait_for_load(&mut ui.host).await.unwrap().unwrap();
        }
        assert_eq!(view.store().len(), 50);
        assert!(!view.store().has_more());

        scroll_to_bottom(&mut view, &mut ui);
        assert!(!view.pump(&mut ui.host));
    }

    #[tokio::test]
    async fn test_short_pages_load_until_viewport_fills() {
        let store = TaskStore::new(Arc::new(seed::source(50)));
        store.set_pagination(PaginationUpdate::limit(5));
        // Five rows never fill the viewport, so mounting already asks for more.
        let (mut view, mut ui) = mounted_with(store).await;

        for _ in 0..3 {
            view.wait_for_load(&mut ui.host).await.unwrap().unwrap();
            let rows = view.store().len();
            ui.lay_out(&mut view, rows);
        }

        // 20 rows overflow the viewport: 648 / 848 stays under the threshold.
        assert_eq!(view.store().len(), 20);
        assert!(!view.body().is_load_more_latched(&ui.host));
        assert!(!view.store().loading());
        assert!(!view.pump(&mut ui.host));
    }

    #[tokio::test]
    async fn test_failed_load_releases_latch() {
        let source = Arc::new(seed::source(50));
        let (mut view, mut ui) = mounted(source.clone()).await;

        source
            .fail_next(SourceError::Unavailable("offline".into()))
            .await;
        scroll_to_bottom(&mut view, &mut ui);
        assert!(view.body().is_load_more_latched(&ui.host));

        assert!(view.wait_for_load(&mut ui.host).await.unwrap().is_err());
        assert!(!view.body().is_load_more_latched(&ui.host));
        assert_eq!(view.body().item_count(), 20);

        // The same scroll position may trigger again immediately.
        let events = ui.host.scroll_to(ui.scroller, 0);
        view.handle_events(&ui.host, &events);
        scroll_to_bottom(&mut view, &mut ui);
        assert_eq!(view.wait_for_load(&mut ui.host).await.unwrap(), Ok(20));
    }

    #[tokio::test]
    async fn test_render_lines_include_spacers() {
        let (mut view, mut ui) = mounted(Arc::new(seed::source(50))).await;
        scroll_to_bottom(&mut view, &mut ui);
        view.wait_for_load(&mut ui.host).await.unwrap().unwrap();

        let tasks = view.store().tasks();
        let lines = view.render_lines(&tasks);
        assert!(lines.iter().all(|line| !line.is_empty()));
        assert!(lines.len() <= 61);
        assert!(lines.iter().any(|line| line.contains("Review")));
    }
}
