use crate::models::Folder;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Keep a candidate iff its normalized score is at or below this.
/// 0.0 admits exact matches only, 1.0 admits any subsequence.
pub const MATCH_THRESHOLD: f64 = 0.3;
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(50);

const MATCH_BONUS: i64 = 10;
const CONTIGUOUS_BONUS: i64 = 8;
const BOUNDARY_BONUS: i64 = 6;

/// Fuzzy-searchable view over the current folder set. Built once per
/// snapshot and rebuilt wholesale whenever the folder set is replaced.
pub struct FolderIndex {
    folders: Vec<Folder>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub folder: Folder,
    pub score: f64,
}

impl FolderIndex {
    pub fn build(folders: Vec<Folder>) -> Self {
        Self { folders }
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn get(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn live_ids(&self) -> HashSet<String> {
        self.folders.iter().map(|f| f.id.clone()).collect()
    }

    /// Empty or whitespace-only text bypasses matching and returns the
    /// full set in stored (path-sorted) order.
    pub fn query(&self, text: &str) -> Vec<Folder> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return self.folders.clone();
        }
        self.matches(trimmed).into_iter().map(|m| m.folder).collect()
    }

    /// Ranked matches, best (lowest score) first. Display name and full
    /// path are scored independently and the better field wins.
    pub fn matches(&self, query: &str) -> Vec<Match> {
        let query = query.to_lowercase();
        let mut scored: Vec<Match> = self
            .folders
            .iter()
            .filter_map(|folder| {
                let name = normalized_score(&query, &folder.display_name.to_lowercase());
                let path = normalized_score(&query, &folder.path.to_lowercase());
                let best = match (name, path) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
                best.filter(|score| *score <= MATCH_THRESHOLD)
                    .map(|score| Match {
                        folder: folder.clone(),
                        score,
                    })
            })
            .collect();

        scored.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.folder.path.cmp(&b.folder.path))
        });
        scored
    }
}

/// Score in 0.0 (exact) ..= 1.0 (barely a subsequence); `None` when the
/// query is not an in-order subsequence of the haystack. Matches count
/// the same anywhere in the string; there is no position penalty.
fn normalized_score(query: &str, haystack: &str) -> Option<f64> {
    if query.is_empty() {
        return Some(0.0);
    }
    let raw = subsequence_score(query, haystack)?;
    let n = query.chars().count() as i64;
    let perfect = n * MATCH_BONUS + (n - 1) * CONTIGUOUS_BONUS + BOUNDARY_BONUS;
    Some((1.0 - raw as f64 / perfect as f64).clamp(0.0, 1.0))
}

fn subsequence_score(query: &str, haystack: &str) -> Option<i64> {
    let qchars: Vec<char> = query.chars().collect();
    let hchars: Vec<char> = haystack.chars().collect();

    let mut score = 0i64;
    let mut qi = 0usize;
    let mut prev_match: Option<usize> = None;

    for (i, hc) in hchars.iter().enumerate() {
        if qi >= qchars.len() {
            break;
        }
        if *hc == qchars[qi] {
            score += MATCH_BONUS;
            if prev_match == Some(i.wrapping_sub(1)) {
                score += CONTIGUOUS_BONUS;
            }
            if i == 0
                || hchars
                    .get(i - 1)
                    .is_some_and(|c| matches!(c, ' ' | '/' | '_' | '-' | '.'))
            {
                score += BOUNDARY_BONUS;
            }
            prev_match = Some(i);
            qi += 1;
        }
    }

    (qi == qchars.len()).then_some(score)
}

/// Collapses rapid query submissions into one delivery: each `submit`
/// aborts the pending task and schedules a fresh one, so only the last
/// text within the window reaches the receiver.
pub struct Debouncer {
    delay: Duration,
    tx: mpsc::UnboundedSender<String>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                tx,
                pending: None,
            },
            rx,
        )
    }

    pub fn submit(&mut self, text: impl Into<String>) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        let tx = self.tx.clone();
        let delay = self.delay;
        let text = text.into();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(text);
        }));
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
