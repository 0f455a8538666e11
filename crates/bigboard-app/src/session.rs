// Scouting session for one player.
//
// Owns the report form and drives a submission: validate, request a summary
// on a spawned task, fall back to the local summary on failure, then persist.
// Closing the session aborts an in-flight summary request and nothing is
// saved. Dropping a pending `submit` future aborts the task too.

use std::sync::Arc;

use chrono::Local;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use bigboard_core::dataset::PlayerId;
use bigboard_core::report::{display_timestamp, mint_report_id, ScoutingReport};
use bigboard_core::store::ReportStore;
use bigboard_llm::client::SummaryService;
use bigboard_nba::form::{ReportForm, ValidationError};
use bigboard_nba::summary::local_summary;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("session closed before the report was saved")]
    Cancelled,

    #[error("failed to save report: {0:#}")]
    Storage(anyhow::Error),
}

/// Where the form is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Editable; the only state a submission starts from.
    Drafting,
    /// Validated and waiting on the summary and the store.
    Submitted,
}

/// Closes a session from outside the task that is awaiting `submit`.
#[derive(Clone)]
pub struct CloseHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.tx.send_replace(true);
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub struct ScoutingSession {
    player_id: PlayerId,
    form: ReportForm,
    state: EngineState,
    store: ReportStore,
    summaries: Arc<dyn SummaryService>,
    closed_tx: Arc<watch::Sender<bool>>,
    closed_rx: watch::Receiver<bool>,
}

impl ScoutingSession {
    pub fn new(player_id: PlayerId, store: ReportStore, summaries: Arc<dyn SummaryService>) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            player_id,
            form: ReportForm::new(),
            state: EngineState::Drafting,
            store,
            summaries,
            closed_tx: Arc::new(tx),
            closed_rx: rx,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn form(&self) -> &ReportForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ReportForm {
        &mut self.form
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            tx: Arc::clone(&self.closed_tx),
        }
    }

    pub fn close(&self) {
        self.closed_tx.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed_rx.borrow()
    }

    /// This player's reports, newest first.
    pub fn reports(&self) -> Vec<ScoutingReport> {
        self.store.list(self.player_id)
    }

    pub fn delete(&self, report_id: &str) -> anyhow::Result<bool> {
        self.store.delete(self.player_id, report_id)
    }

    /// Validate, summarize and persist the current form.
    ///
    /// On validation failure the form is left untouched and nothing is stored.
    /// On success the saved report is returned and the form is reset.
    pub async fn submit(&mut self) -> Result<ScoutingReport, SubmitError> {
        if self.is_closed() {
            return Err(SubmitError::Cancelled);
        }

        let evaluation = self.form.validate().inspect_err(|e| {
            info!(
                "Report for player {} not submitted; missing: {}",
                self.player_id,
                e.missing.join(", ")
            );
        })?;

        self.state = EngineState::Submitted;
        let now = Local::now();
        let mut report =
            evaluation.into_report(self.player_id, mint_report_id(now), display_timestamp(now));

        let Some(summary) = self.request_summary(&report).await else {
            self.state = EngineState::Drafting;
            return Err(SubmitError::Cancelled);
        };
        report.summary = Some(summary);

        let saved = match self.store.append(self.player_id, report) {
            Ok(saved) => saved,
            Err(e) => {
                self.state = EngineState::Drafting;
                return Err(SubmitError::Storage(e));
            }
        };

        self.form.reset();
        self.state = EngineState::Drafting;
        Ok(saved)
    }

    /// Summary for a stored report, generating and attaching one if it has
    /// none yet. `Ok(None)` when the report does not exist.
    pub async fn ensure_summary(&self, report_id: &str) -> Result<Option<String>, SubmitError> {
        let Some(report) = self.find(report_id) else {
            return Ok(None);
        };
        if let Some(summary) = report.summary {
            return Ok(Some(summary));
        }

        let Some(summary) = self.request_summary(&report).await else {
            return Err(SubmitError::Cancelled);
        };

        // Someone else may have attached one while we waited.
        match self.find(report_id) {
            None => Ok(None),
            Some(current) if current.summary.is_some() => Ok(current.summary),
            Some(_) => {
                self.store
                    .attach_summary(self.player_id, report_id, &summary)
                    .map_err(SubmitError::Storage)?;
                Ok(Some(summary))
            }
        }
    }

    fn find(&self, report_id: &str) -> Option<ScoutingReport> {
        self.reports().into_iter().find(|r| r.id == report_id)
    }

    /// Run the summary request on its own task. Returns `None` if the session
    /// is closed first; any request failure yields the local summary.
    async fn request_summary(&self, report: &ScoutingReport) -> Option<String> {
        let client = Arc::clone(&self.summaries);
        let request = report.clone();
        let mut task = AbortOnDrop(tokio::spawn(async move { client.summarize(&request).await }));
        let mut closed = self.closed_rx.clone();

        tokio::select! {
            joined = &mut task.0 => match joined {
                Ok(Ok(summary)) => Some(summary),
                Ok(Err(e)) => {
                    warn!("Summary request for report {} failed ({e}); using local summary", report.id);
                    Some(local_summary(report))
                }
                Err(e) => {
                    warn!("Summary task for report {} failed ({e}); using local summary", report.id);
                    Some(local_summary(report))
                }
            },
            _ = closed.wait_for(|closed| *closed) => {
                info!("Session for player {} closed; discarding summary request", self.player_id);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bigboard_core::report::{Ceiling, DraftRange, ProjectedRole, ReportTag};
    use bigboard_llm::client::{SummaryClient, SummaryError};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedSummary(&'static str);

    #[async_trait]
    impl SummaryService for FixedSummary {
        async fn summarize(&self, _report: &ScoutingReport) -> Result<String, SummaryError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingSummary;

    #[async_trait]
    impl SummaryService for FailingSummary {
        async fn summarize(&self, _report: &ScoutingReport) -> Result<String, SummaryError> {
            Err(SummaryError::Status {
                status: 500,
                message: "boom".into(),
            })
        }
    }

    /// Never finishes on its own; records whether it was dropped mid-flight.
    struct HangingSummary {
        started: Arc<AtomicUsize>,
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SummaryService for HangingSummary {
        async fn summarize(&self, _report: &ScoutingReport) -> Result<String, SummaryError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3600)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok("too late".into())
        }
    }

    fn fill(form: &mut ReportForm) {
        form.report_tag = Some(ReportTag::PreDraft);
        form.strengths = "Shooter with deep range".into();
        form.weaknesses = "Turnover prone".into();
        form.intangibles = "Coachable".into();
        form.comparison = "Tyrese Haliburton".into();
        form.fit = "Pacers".into();
        form.role = Some(ProjectedRole::Starter);
        form.ceiling = Some(Ceiling::AllStar);
        form.range = Some(DraftRange::Lottery);
        form.set_rating("Shooting", 9);
    }

    fn session(summaries: Arc<dyn SummaryService>) -> ScoutingSession {
        ScoutingSession::new(7, ReportStore::in_memory(), summaries)
    }

    #[tokio::test]
    async fn submit_uses_collaborator_summary_and_resets_form() {
        let mut s = session(Arc::new(FixedSummary("Crafty lead guard.")));
        fill(s.form_mut());

        let saved = s.submit().await.unwrap();
        assert_eq!(saved.summary.as_deref(), Some("Crafty lead guard."));
        assert_eq!(saved.player_id, 7);
        assert!(saved.id.starts_with("report_"));

        assert_eq!(s.reports().len(), 1);
        assert_eq!(s.form(), &ReportForm::default());
        assert_eq!(s.state(), EngineState::Drafting);
    }

    #[tokio::test]
    async fn invalid_form_stores_nothing() {
        let mut s = session(Arc::new(FixedSummary("unused")));
        fill(s.form_mut());
        s.form_mut().fit = "  ".into();
        let before = s.form().clone();

        let err = s.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Please complete all fields before submitting.");
        assert!(s.reports().is_empty());
        assert_eq!(s.form(), &before);
        assert_eq!(s.state(), EngineState::Drafting);
    }

    #[tokio::test]
    async fn failed_summary_falls_back_to_local() {
        let mut s = session(Arc::new(FailingSummary));
        fill(s.form_mut());

        let saved = s.submit().await.unwrap();
        let summary = saved.summary.unwrap();
        assert!(summary.starts_with("Strong traits include Shooting."));
        assert!(summary.ends_with("expected to be drafted in the Lottery range."));
    }

    #[tokio::test]
    async fn disabled_client_falls_back_to_local() {
        let mut s = session(Arc::new(SummaryClient::Disabled));
        fill(s.form_mut());
        let saved = s.submit().await.unwrap();
        assert!(saved.summary.unwrap().contains("Compared to Tyrese Haliburton"));
    }

    #[tokio::test]
    async fn reports_are_newest_first_and_deletable() {
        let mut s = session(Arc::new(FixedSummary("x")));
        fill(s.form_mut());
        let first = s.submit().await.unwrap();
        fill(s.form_mut());
        s.form_mut().comparison = "Second".into();
        let second = s.submit().await.unwrap();
        assert_ne!(first.id, second.id);

        let reports = s.reports();
        assert_eq!(reports[0].id, second.id);
        assert_eq!(reports[1].id, first.id);

        assert!(s.delete(&second.id).unwrap());
        let reports = s.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, first.id);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_aborts_pending_summary_and_saves_nothing() {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let mut s = session(Arc::new(HangingSummary {
            started: Arc::clone(&started),
            finished: Arc::clone(&finished),
        }));
        fill(s.form_mut());
        let form_before = s.form().clone();

        let handle = s.close_handle();
        let closer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.close();
        });

        let err = s.submit().await.unwrap_err();
        assert!(matches!(err, SubmitError::Cancelled));
        closer.await.unwrap();

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert!(s.reports().is_empty());
        assert_eq!(s.form(), &form_before);
        assert_eq!(s.state(), EngineState::Drafting);

        // Past the hanging sleep: an aborted task never completes.
        tokio::time::sleep(Duration::from_secs(7200)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn closed_session_refuses_submit() {
        let mut s = session(Arc::new(FixedSummary("x")));
        fill(s.form_mut());
        s.close();
        assert!(s.is_closed());
        assert!(matches!(s.submit().await, Err(SubmitError::Cancelled)));
        assert!(s.reports().is_empty());
    }

    #[tokio::test]
    async fn ensure_summary_backfills_once() {
        let store = ReportStore::in_memory();
        let mut legacy = ReportForm::new();
        fill(&mut legacy);
        let report = legacy
            .validate()
            .unwrap()
            .into_report(7, "old".into(), "1/1/2025, 1:00:00 PM".into());
        store.append(7, report).unwrap();

        let s = ScoutingSession::new(7, store.clone(), Arc::new(FixedSummary("Backfilled.")));
        assert_eq!(
            s.ensure_summary("old").await.unwrap().as_deref(),
            Some("Backfilled.")
        );
        assert_eq!(store.list(7)[0].summary.as_deref(), Some("Backfilled."));

        // Already attached: the stored text wins.
        let s = ScoutingSession::new(7, store.clone(), Arc::new(FixedSummary("Other.")));
        assert_eq!(
            s.ensure_summary("old").await.unwrap().as_deref(),
            Some("Backfilled.")
        );
        assert_eq!(s.ensure_summary("missing").await.unwrap(), None);
    }
}
