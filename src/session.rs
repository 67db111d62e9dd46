use crate::error::Result;
use crate::models::{Folder, RecentEntry};
use crate::panel::{Notifier, NotifyKind, Panel, StatusKind};
use crate::recent::RecencyTracker;
use crate::rest::MailService;
use crate::search::FolderIndex;
use crate::select::{Pick, SelectionList};
use crate::store::{FolderStore, KeyValueStore};
use std::time::Duration;
use tracing::warn;

/// Pause between the success status and the close request, so the
/// status is perceivable before the panel goes away.
pub const CLOSE_DELAY: Duration = Duration::from_millis(250);

/// Runs one move end to end: status signaling, the remote call, the
/// best-effort notification, the recency update, and the deferred
/// close request. On failure everything but the status is left alone.
pub struct MoveOrchestrator<'a, M, K, N, P> {
    pub service: &'a M,
    pub recents: &'a RecencyTracker<K>,
    pub notifier: &'a N,
    pub panel: &'a P,
}

impl<M: MailService, K: KeyValueStore, N: Notifier, P: Panel> MoveOrchestrator<'_, M, K, N, P> {
    pub async fn move_message(&self, item_id: &str, folder: &Folder) -> Result<()> {
        self.panel.status(
            StatusKind::Progress,
            &format!("Moving to {}...", folder.display_name),
        );

        match self.service.move_message(item_id, &folder.id).await {
            Ok(()) => {
                let message = format!("Moved to {}", folder.display_name);
                self.panel.status(StatusKind::Success, &message);
                self.notifier.notify(NotifyKind::Success, &message);
                if let Err(err) = self.recents.record(folder) {
                    warn!(%err, "Failed to persist recency list");
                }
                tokio::time::sleep(CLOSE_DELAY).await;
                self.panel.request_close();
                Ok(())
            }
            Err(err) => {
                self.panel.status(StatusKind::Error, &err.to_string());
                self.notifier
                    .notify(NotifyKind::Error, &format!("Failed to move email: {}", err));
                Err(err)
            }
        }
    }
}

/// Session context for one open email: the folder index, recency view,
/// active query, and selection. Every dependency is explicit; there is
/// no ambient state.
pub struct PickerSession<M, K, N, P> {
    service: M,
    store: FolderStore<K>,
    recents: RecencyTracker<K>,
    notifier: N,
    panel: P,
    item_id: String,
    index: FolderIndex,
    recent_view: Vec<RecentEntry>,
    results: Vec<Folder>,
    query: String,
    selection: SelectionList,
}

impl<M, K, N, P> PickerSession<M, K, N, P> {
    fn recents_shown(&self) -> bool {
        self.query.trim().is_empty() && !self.recent_view.is_empty()
    }

    fn rebuild_selection(&mut self) {
        let recent_count = if self.recents_shown() {
            self.recent_view.len()
        } else {
            0
        };
        self.selection = SelectionList::new(recent_count, self.results.len());
    }

    /// Applies a (debounced) query: recomputes results and resets the
    /// selection to the top.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.results = self.index.query(&self.query);
        self.rebuild_selection();
    }

    /// Recency entries currently shown above the results, if any.
    pub fn visible_recents(&self) -> &[RecentEntry] {
        if self.recents_shown() {
            &self.recent_view
        } else {
            &[]
        }
    }

    pub fn results(&self) -> &[Folder] {
        &self.results
    }

    pub fn folders(&self) -> &[Folder] {
        self.index.folders()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.selected()
    }

    pub fn total_items(&self) -> usize {
        self.selection.total()
    }

    pub fn next(&mut self) {
        self.selection.next();
    }

    pub fn previous(&mut self) {
        self.selection.previous();
    }

    pub fn select(&mut self, index: usize) -> bool {
        self.selection.select(index)
    }

    /// The folder the current selection resolves to. A recency entry is
    /// resolved through the live index by id.
    pub fn selected_folder(&self) -> Option<&Folder> {
        match self.selection.pick()? {
            Pick::Recent(i) => {
                let entry = self.recent_view.get(i)?;
                self.index.get(&entry.id)
            }
            Pick::Result(i) => self.results.get(i),
        }
    }
}

impl<M: MailService, K: KeyValueStore, N: Notifier, P: Panel> PickerSession<M, K, N, P> {
    /// Loads the folder set (cache or fetch), the recency list, and
    /// builds the initial browse view with the first item selected.
    pub async fn initialize(
        service: M,
        store: FolderStore<K>,
        recents: RecencyTracker<K>,
        notifier: N,
        panel: P,
        item_id: impl Into<String>,
    ) -> Result<Self> {
        let folders = store.load(&service, false).await?;
        let index = FolderIndex::build(folders);
        let recent_view = recents.load(&index.live_ids());
        let results = index.query("");

        let mut session = Self {
            service,
            store,
            recents,
            notifier,
            panel,
            item_id: item_id.into(),
            index,
            recent_view,
            results,
            query: String::new(),
            selection: SelectionList::empty(),
        };
        session.rebuild_selection();
        Ok(session)
    }

    /// Forced reload: replaces the folder set wholesale, rebuilds the
    /// index, re-filters the recency view, and re-runs the active query.
    pub async fn refresh(&mut self) -> Result<()> {
        let folders = self.store.load(&self.service, true).await?;
        self.index = FolderIndex::build(folders);
        self.recent_view = self.recents.load(&self.index.live_ids());
        self.results = self.index.query(&self.query);
        self.rebuild_selection();
        Ok(())
    }

    /// Moves the open email into the selected folder. With nothing
    /// selected this is a no-op; on failure the selection is untouched
    /// so the user can retry or pick differently.
    pub async fn activate(&mut self) -> Result<()> {
        let Some(folder) = self.selected_folder().cloned() else {
            return Ok(());
        };
        let orchestrator = MoveOrchestrator {
            service: &self.service,
            recents: &self.recents,
            notifier: &self.notifier,
            panel: &self.panel,
        };
        orchestrator.move_message(&self.item_id, &folder).await?;
        self.recent_view = self.recents.load(&self.index.live_ids());
        Ok(())
    }

    /// Pointer activation: select the clicked row, then move.
    pub async fn activate_at(&mut self, index: usize) -> Result<()> {
        if self.selection.select(index) {
            self.activate().await
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::FolderRecord;
    use crate::rest::testutil::FakeService;
    use crate::store::testutil::MemoryStore;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingPanel {
        statuses: Mutex<Vec<(StatusKind, String)>>,
        closed: AtomicBool,
    }

    impl RecordingPanel {
        fn statuses(&self) -> Vec<(StatusKind, String)> {
            self.statuses.lock().unwrap().clone()
        }

        fn close_requested(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    impl Panel for &RecordingPanel {
        fn status(&self, kind: StatusKind, message: &str) {
            self.statuses
                .lock()
                .unwrap()
                .push((kind, message.to_string()));
        }

        fn request_close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notes: Mutex<Vec<(NotifyKind, String)>>,
    }

    impl RecordingNotifier {
        fn notes(&self) -> Vec<(NotifyKind, String)> {
            self.notes.lock().unwrap().clone()
        }
    }

    impl Notifier for &RecordingNotifier {
        fn notify(&self, kind: NotifyKind, message: &str) {
            self.notes.lock().unwrap().push((kind, message.to_string()));
        }
    }

    fn record(id: &str, name: &str, parent: Option<&str>) -> FolderRecord {
        FolderRecord {
            id: id.to_string(),
            display_name: name.to_string(),
            parent_folder_id: parent.map(String::from),
        }
    }

    fn two_folder_service() -> FakeService {
        FakeService::with_tree(vec![
            record("1", "Inbox", None),
            record("2", "Work", Some("1")),
        ])
    }

    async fn session<'a>(
        service: FakeService,
        notifier: &'a RecordingNotifier,
        panel: &'a RecordingPanel,
    ) -> PickerSession<FakeService, MemoryStore, &'a RecordingNotifier, &'a RecordingPanel> {
        PickerSession::initialize(
            service,
            FolderStore::new(MemoryStore::default()),
            RecencyTracker::new(MemoryStore::default()),
            notifier,
            panel,
            "item-1",
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_move_success() {
        let notifier = RecordingNotifier::default();
        let panel = RecordingPanel::default();
        let mut session = session(two_folder_service(), &notifier, &panel).await;

        let paths: Vec<&str> = session.folders().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["Inbox", "Inbox / Work"]);

        session.set_query("work");
        assert_eq!(session.selected_folder().unwrap().id, "2");

        session.activate().await.unwrap();

        assert_eq!(session.service.moves(), vec![("item-1".to_string(), "2".to_string())]);
        assert!(panel.close_requested());

        let statuses = session.panel.statuses();
        assert_eq!(statuses[0].0, StatusKind::Progress);
        assert_eq!(statuses[1], (StatusKind::Success, "Moved to Work".into()));
        assert_eq!(
            notifier.notes(),
            vec![(NotifyKind::Success, "Moved to Work".to_string())]
        );

        // Recency now leads with the destination, full path included.
        session.set_query("");
        let recents = session.visible_recents();
        assert_eq!(recents[0].id, "2");
        assert_eq!(recents[0].path, "Inbox / Work");
    }

    #[tokio::test]
    async fn test_move_failure_leaves_state_alone() {
        let mut service = two_folder_service();
        service.reject_moves("mailbox is full");
        let notifier = RecordingNotifier::default();
        let panel = RecordingPanel::default();
        let mut session = session(service, &notifier, &panel).await;

        session.next();
        let selected_before = session.selected();

        let err = session.activate().await.unwrap_err();
        assert!(matches!(err, Error::Move(_)));

        assert_eq!(session.selected(), selected_before);
        assert!(!panel.close_requested());
        assert!(session.visible_recents().is_empty());

        let statuses = panel.statuses();
        assert_eq!(statuses.last().unwrap().0, StatusKind::Error);
        assert!(statuses.last().unwrap().1.contains("mailbox is full"));
        assert_eq!(notifier.notes().last().unwrap().0, NotifyKind::Error);
    }

    #[tokio::test]
    async fn test_recents_hidden_while_query_active() {
        let notifier = RecordingNotifier::default();
        let panel = RecordingPanel::default();
        let mut session = session(two_folder_service(), &notifier, &panel).await;

        session.set_query("inbox");
        session.activate().await.unwrap();

        // Browse view: recency strip + both folders are navigable.
        session.set_query("");
        assert_eq!(session.visible_recents().len(), 1);
        assert_eq!(session.total_items(), 3);

        // Active query: recents drop out of the range entirely.
        session.set_query("work");
        assert!(session.visible_recents().is_empty());
        assert_eq!(session.total_items(), 1);
    }

    #[tokio::test]
    async fn test_query_change_resets_selection_to_top() {
        let notifier = RecordingNotifier::default();
        let panel = RecordingPanel::default();
        let mut session = session(two_folder_service(), &notifier, &panel).await;

        session.next();
        assert_eq!(session.selected(), Some(1));
        session.set_query("in");
        assert_eq!(session.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_no_results_means_no_selection_and_noop_activate() {
        let notifier = RecordingNotifier::default();
        let panel = RecordingPanel::default();
        let mut session = session(two_folder_service(), &notifier, &panel).await;

        session.set_query("zzz");
        assert_eq!(session.selected(), None);
        session.activate().await.unwrap();
        assert!(session.service.moves().is_empty());
    }

    #[tokio::test]
    async fn test_pointer_activation_moves_clicked_row() {
        let notifier = RecordingNotifier::default();
        let panel = RecordingPanel::default();
        let mut session = session(two_folder_service(), &notifier, &panel).await;

        // Browse view rows: [Inbox, Inbox / Work]; click the second.
        session.activate_at(1).await.unwrap();
        assert_eq!(session.service.moves(), vec![("item-1".to_string(), "2".to_string())]);
    }

    #[tokio::test]
    async fn test_refresh_refetches_and_resets() {
        let notifier = RecordingNotifier::default();
        let panel = RecordingPanel::default();
        let mut session = session(two_folder_service(), &notifier, &panel).await;

        session.next();
        session.refresh().await.unwrap();
        assert_eq!(session.service.root_calls(), 2);
        assert_eq!(session.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_initialize_fails_without_listing_or_cache() {
        let mut service = two_folder_service();
        service.fail_root_listing();
        let notifier = RecordingNotifier::default();
        let panel = RecordingPanel::default();

        let result = PickerSession::initialize(
            service,
            FolderStore::new(MemoryStore::default()),
            RecencyTracker::new(MemoryStore::default()),
            &notifier,
            &panel,
            "item-1",
        )
        .await;
        assert!(matches!(result, Err(Error::Fetch(_))));
    }
}
