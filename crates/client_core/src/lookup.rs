use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use shared::protocol::VenueSuggestion;
use tokio::{sync::watch, task::JoinHandle};
use tracing::warn;

use crate::{draft::CaseDraft, CaseClient};

/// Quiet period between the last keystroke and the remote venue query.
pub const VENUE_QUERY_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Debounced venue autocomplete.
///
/// Each keystroke bumps a sequence number and aborts the previously pending
/// debounce task, so at most one query leaves per quiet window. A response
/// is applied only while its sequence number is still the newest one
/// issued; superseded responses are discarded rather than allowed to
/// overwrite results for newer input.
pub struct VenueLookup {
    client: Arc<CaseClient>,
    quiet_period: Duration,
    latest_seq: AtomicU64,
    pending: Mutex<Option<JoinHandle<()>>>,
    results_tx: watch::Sender<Vec<VenueSuggestion>>,
}

impl VenueLookup {
    pub fn new(client: Arc<CaseClient>) -> Arc<Self> {
        Self::with_quiet_period(client, VENUE_QUERY_QUIET_PERIOD)
    }

    pub fn with_quiet_period(client: Arc<CaseClient>, quiet_period: Duration) -> Arc<Self> {
        let (results_tx, _) = watch::channel(Vec::new());
        Arc::new(Self {
            client,
            quiet_period,
            latest_seq: AtomicU64::new(0),
            pending: Mutex::new(None),
            results_tx,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<VenueSuggestion>> {
        self.results_tx.subscribe()
    }

    /// Feed the current contents of the venue field. Empty input clears the
    /// suggestion list without issuing a request.
    pub fn input_changed(self: &Arc<Self>, query: &str) {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(task) = self
            .pending
            .lock()
            .expect("venue lookup poisoned")
            .take()
        {
            task.abort();
        }

        let query = query.trim().to_string();
        if query.is_empty() {
            let _ = self.results_tx.send(Vec::new());
            return;
        }

        let lookup = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(lookup.quiet_period).await;
            match lookup.client.search_venues(&query).await {
                Ok(suggestions) => {
                    if lookup.latest_seq.load(Ordering::SeqCst) == seq {
                        let _ = lookup.results_tx.send(suggestions);
                    }
                }
                Err(err) => {
                    warn!("venue lookup failed for query '{query}': {err}");
                    lookup
                        .client
                        .send_event(crate::ClientEvent::Error(format!(
                            "venue lookup failed: {err}"
                        )));
                }
            }
        });
        *self.pending.lock().expect("venue lookup poisoned") = Some(task);
    }

    /// Apply a picked suggestion to the draft and close the dropdown.
    pub fn select(&self, suggestion: &VenueSuggestion, draft: &mut CaseDraft) {
        draft.venue = suggestion.display_name.clone();
        draft.selected_venue = Some(suggestion.clone());
        let _ = self.results_tx.send(Vec::new());
    }
}
