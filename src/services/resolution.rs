//! EPG resolution workflow
//!
//! A session moves through `Closed -> Analyzing -> Review -> Closed`:
//!
//! - [`ResolutionWorkflow::open`] clears any previous session and starts the
//!   batch reconciliation on the blocking pool, returning a [`PendingAnalysis`]
//!   the host can await while watching its progress.
//! - [`ResolutionWorkflow::apply_analysis`] moves the workflow to Review, but
//!   only for the analysis of the current session. Outcomes of a session that
//!   was re-opened or closed in the meantime are discarded.
//! - In Review, each needs-review channel takes an `Assign` or `Skip` decision;
//!   the last decision for a channel wins.
//! - [`ResolutionWorkflow::commit`] hands the assignment list to the
//!   [`AssignmentWriter`]; [`ResolutionWorkflow::discard`] drops everything.
//!
//! Decisions live only in the session until commit.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::errors::{WorkflowError, WorkflowResult};
use crate::matching::{NameNormalizer, reconcile_with_progress};
use crate::models::{
    Channel, ChannelId, Decision, EpgAssignment, EpgDataId, EpgMatchResult, EpgSource, MatchStatus,
};
use crate::services::assignment_writer::AssignmentWriter;
use crate::services::progress::{AnalysisProgress, ProgressReporter};
use crate::services::review::{ReconciliationSummary, ReviewItem};
use crate::snapshot::CatalogSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum WorkflowPhase {
    Closed,
    Analyzing,
    Review,
}

/// Result of a finished analysis task, tagged with its session
#[derive(Debug)]
pub enum AnalysisOutcome {
    Completed {
        session_id: Uuid,
        results: Vec<EpgMatchResult>,
    },
    Cancelled {
        session_id: Uuid,
    },
}

impl AnalysisOutcome {
    pub fn session_id(&self) -> Uuid {
        match self {
            AnalysisOutcome::Completed { session_id, .. }
            | AnalysisOutcome::Cancelled { session_id } => *session_id,
        }
    }
}

/// Handle to a running analysis
pub struct PendingAnalysis {
    session_id: Uuid,
    channels: Arc<Vec<Channel>>,
    handle: JoinHandle<Option<Vec<EpgMatchResult>>>,
    progress: watch::Receiver<AnalysisProgress>,
    cancel: CancellationToken,
}

impl PendingAnalysis {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn progress(&self) -> watch::Receiver<AnalysisProgress> {
        self.progress.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the analysis task
    ///
    /// A task that fails outright reports every selected channel as unmatched
    /// instead of losing the batch.
    pub async fn finish(self) -> AnalysisOutcome {
        let session_id = self.session_id;
        match self.handle.await {
            Ok(Some(results)) => AnalysisOutcome::Completed {
                session_id,
                results,
            },
            Ok(None) => AnalysisOutcome::Cancelled { session_id },
            Err(e) if e.is_cancelled() => AnalysisOutcome::Cancelled { session_id },
            Err(e) => {
                warn!(
                    "Analysis for session {} failed: {}; reporting {} channels as unmatched",
                    session_id,
                    e,
                    self.channels.len()
                );
                let results = self
                    .channels
                    .iter()
                    .map(|c| EpgMatchResult::unmatched(c.clone(), None, String::new()))
                    .collect();
                AnalysisOutcome::Completed {
                    session_id,
                    results,
                }
            }
        }
    }
}

/// Returned by a successful commit
#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    pub session_id: Uuid,
    /// When the analysis entered Review
    pub analyzed_at: DateTime<Utc>,
    pub committed_at: DateTime<Utc>,
    pub summary: ReconciliationSummary,
    pub assignments: Vec<EpgAssignment>,
    pub written: usize,
}

/// Volatile state of the Review phase
#[derive(Debug, Clone)]
pub struct ReviewSession {
    session_id: Uuid,
    analyzed_at: DateTime<Utc>,
    results: Vec<EpgMatchResult>,
    positions: HashMap<ChannelId, usize>,
    // Only ever holds needs-review channels with an Assign or Skip decision.
    decisions: HashMap<ChannelId, Decision>,
}

impl ReviewSession {
    pub(crate) fn new(session_id: Uuid, results: Vec<EpgMatchResult>) -> Self {
        let positions = results
            .iter()
            .enumerate()
            .map(|(position, r)| (r.channel.id, position))
            .collect();
        Self {
            session_id,
            analyzed_at: Utc::now(),
            results,
            positions,
            decisions: HashMap::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn analyzed_at(&self) -> DateTime<Utc> {
        self.analyzed_at
    }

    pub fn results(&self) -> &[EpgMatchResult] {
        &self.results
    }

    pub fn result(&self, channel_id: ChannelId) -> Option<&EpgMatchResult> {
        self.positions
            .get(&channel_id)
            .and_then(|&position| self.results.get(position))
    }

    pub fn auto_matched(&self) -> impl Iterator<Item = &EpgMatchResult> {
        self.with_status(MatchStatus::Exact)
    }

    pub fn needs_review(&self) -> impl Iterator<Item = &EpgMatchResult> {
        self.with_status(MatchStatus::Multiple)
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &EpgMatchResult> {
        self.with_status(MatchStatus::NoMatch)
    }

    fn with_status(&self, status: MatchStatus) -> impl Iterator<Item = &EpgMatchResult> {
        self.results.iter().filter(move |r| r.status == status)
    }

    pub fn decision(&self, channel_id: ChannelId) -> Decision {
        self.decisions
            .get(&channel_id)
            .copied()
            .unwrap_or(Decision::Undecided)
    }

    pub fn decisions(&self) -> &HashMap<ChannelId, Decision> {
        &self.decisions
    }

    /// Auto-matched channels plus needs-review channels resolved to an entry
    pub fn assignable_count(&self) -> usize {
        let resolved = self
            .decisions
            .values()
            .filter(|d| matches!(d, Decision::Assign(_)))
            .count();
        self.auto_matched().count() + resolved
    }

    pub fn summary(&self) -> ReconciliationSummary {
        ReconciliationSummary::from_results(&self.results, |r| self.decision(r.channel.id))
    }

    pub fn review_items(&self, sources: &[EpgSource]) -> Vec<ReviewItem> {
        self.needs_review()
            .map(|r| ReviewItem::from_result(r, self.decision(r.channel.id), sources))
            .collect()
    }

    fn record(&mut self, channel_id: ChannelId, decision: Decision) -> WorkflowResult<()> {
        let result = self
            .result(channel_id)
            .ok_or(WorkflowError::UnknownChannel { channel_id })?;

        if result.status != MatchStatus::Multiple {
            return Err(WorkflowError::NotInReview { channel_id });
        }
        match decision {
            Decision::Undecided => return Err(WorkflowError::UndecidedChoice { channel_id }),
            Decision::Assign(epg_data_id) if !result.offers(epg_data_id) => {
                return Err(WorkflowError::CandidateNotOffered {
                    channel_id,
                    epg_data_id,
                });
            }
            Decision::Assign(_) | Decision::Skip => {}
        }

        let previous = self.decisions.insert(channel_id, decision);
        debug!(
            "Session {}: channel {} decision {} (was {})",
            self.session_id,
            channel_id,
            decision,
            previous.unwrap_or_default()
        );
        Ok(())
    }

    /// Assignments in channel order: auto-matched channels with their sole
    /// candidate, resolved channels with their chosen candidate, and, when
    /// `emit_skipped` is set, skipped channels as explicitly unassigned.
    pub fn build_assignments(&self, emit_skipped: bool) -> Vec<EpgAssignment> {
        self.results
            .iter()
            .filter_map(|result| match result.status {
                MatchStatus::Exact => result
                    .sole_match()
                    .map(|epg| EpgAssignment::assign(&result.channel, epg)),
                MatchStatus::Multiple => match self.decision(result.channel.id) {
                    Decision::Assign(epg_data_id) => result
                        .matches
                        .iter()
                        .find(|m| m.id == epg_data_id)
                        .map(|epg| EpgAssignment::assign(&result.channel, epg)),
                    Decision::Skip if emit_skipped => {
                        Some(EpgAssignment::unassigned(&result.channel))
                    }
                    Decision::Skip | Decision::Undecided => None,
                },
                MatchStatus::NoMatch => None,
            })
            .collect()
    }
}

enum SessionState {
    Closed,
    Analyzing {
        session_id: Uuid,
        started: Instant,
        cancel: CancellationToken,
    },
    Review(ReviewSession),
}

/// Single-session resolution workflow
///
/// Independent workflows share nothing but the read-only snapshot they are
/// given.
pub struct ResolutionWorkflow {
    normalizer: Arc<NameNormalizer>,
    config: WorkflowConfig,
    writer: Arc<dyn AssignmentWriter>,
    state: SessionState,
}

impl ResolutionWorkflow {
    pub fn new(
        normalizer: Arc<NameNormalizer>,
        config: WorkflowConfig,
        writer: Arc<dyn AssignmentWriter>,
    ) -> Self {
        Self {
            normalizer,
            config,
            writer,
            state: SessionState::Closed,
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        match self.state {
            SessionState::Closed => WorkflowPhase::Closed,
            SessionState::Analyzing { .. } => WorkflowPhase::Analyzing,
            SessionState::Review(_) => WorkflowPhase::Review,
        }
    }

    /// Id of the session currently analyzing or in review
    pub fn session_id(&self) -> Option<Uuid> {
        match &self.state {
            SessionState::Closed => None,
            SessionState::Analyzing { session_id, .. } => Some(*session_id),
            SessionState::Review(review) => Some(review.session_id()),
        }
    }

    pub fn review(&self) -> Option<&ReviewSession> {
        match &self.state {
            SessionState::Review(review) => Some(review),
            SessionState::Closed | SessionState::Analyzing { .. } => None,
        }
    }

    /// Start a new session for `selection`, discarding any previous one
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(
        &mut self,
        snapshot: Arc<CatalogSnapshot>,
        selection: &[ChannelId],
    ) -> PendingAnalysis {
        self.reset();

        let session_id = Uuid::new_v4();
        let channels = Arc::new(snapshot.select(selection));
        let cancel = CancellationToken::new();
        let (reporter, progress) =
            ProgressReporter::new(session_id, channels.len(), self.config.progress_interval);

        info!(
            "Opened EPG resolution session {} for {} channels ({} EPG entries)",
            session_id,
            channels.len(),
            snapshot.epg_data.len()
        );

        let handle = {
            let normalizer = Arc::clone(&self.normalizer);
            let channels = Arc::clone(&channels);
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || {
                reconcile_with_progress(
                    &normalizer,
                    &channels,
                    &snapshot.streams,
                    &snapshot.epg_data,
                    |processed, total| {
                        reporter.report(processed, total);
                        if cancel.is_cancelled() {
                            ControlFlow::Break(())
                        } else {
                            ControlFlow::Continue(())
                        }
                    },
                )
            })
        };

        self.state = SessionState::Analyzing {
            session_id,
            started: Instant::now(),
            cancel: cancel.clone(),
        };

        PendingAnalysis {
            session_id,
            channels,
            handle,
            progress,
            cancel,
        }
    }

    /// Enter Review with the outcome of the current session's analysis
    pub fn apply_analysis(&mut self, outcome: AnalysisOutcome) -> WorkflowResult<&ReviewSession> {
        let session_id = outcome.session_id();
        let started = match &self.state {
            SessionState::Analyzing {
                session_id: current,
                started,
                ..
            } if *current == session_id => *started,
            _ => {
                warn!("Discarding stale analysis for session {}", session_id);
                return Err(WorkflowError::StaleAnalysis { session_id });
            }
        };

        let results = match outcome {
            AnalysisOutcome::Completed { results, .. } => results,
            AnalysisOutcome::Cancelled { .. } => {
                warn!("Analysis for session {} was cancelled", session_id);
                self.state = SessionState::Closed;
                return Err(WorkflowError::StaleAnalysis { session_id });
            }
        };

        let review = ReviewSession::new(session_id, results);
        info!(
            "Analysis for session {} finished in {:?}: {}",
            session_id,
            started.elapsed(),
            review.summary()
        );
        self.state = SessionState::Review(review);

        self.review()
            .ok_or_else(|| WorkflowError::invalid_state("apply analysis", self.phase()))
    }

    /// Open a session and wait for its analysis
    pub async fn analyze(
        &mut self,
        snapshot: Arc<CatalogSnapshot>,
        selection: &[ChannelId],
    ) -> WorkflowResult<&ReviewSession> {
        let pending = self.open(snapshot, selection);
        let outcome = pending.finish().await;
        self.apply_analysis(outcome)
    }

    /// Record a decision for one needs-review channel; returns the new
    /// assignable count
    pub fn resolve(&mut self, channel_id: ChannelId, decision: Decision) -> WorkflowResult<usize> {
        let review = self.review_mut("resolve a conflict")?;
        review.record(channel_id, decision)?;
        Ok(review.assignable_count())
    }

    pub fn assign(&mut self, channel_id: ChannelId, epg_data_id: EpgDataId) -> WorkflowResult<usize> {
        self.resolve(channel_id, Decision::Assign(epg_data_id))
    }

    pub fn skip(&mut self, channel_id: ChannelId) -> WorkflowResult<usize> {
        self.resolve(channel_id, Decision::Skip)
    }

    /// Hand the assignments to the writer and close the session
    ///
    /// Nothing is emitted when the assignable count is zero. A writer failure
    /// leaves the session in Review with its decisions intact.
    pub async fn commit(&mut self) -> WorkflowResult<CommitReport> {
        let review = self.review_ref("commit")?;
        if review.assignable_count() == 0 {
            return Err(WorkflowError::NothingToAssign);
        }

        let session_id = review.session_id();
        let analyzed_at = review.analyzed_at();
        let summary = review.summary();
        let assignments = review.build_assignments(self.config.emit_skipped_assignments);

        let written = self
            .writer
            .write_assignments(&assignments)
            .await
            .map_err(WorkflowError::Writer)?;

        let committed_at = Utc::now();
        info!(
            "Committed session {}: {} assignments written via {} writer after {}s in review",
            session_id,
            written,
            self.writer.name(),
            (committed_at - analyzed_at).num_seconds()
        );
        self.state = SessionState::Closed;

        Ok(CommitReport {
            session_id,
            analyzed_at,
            committed_at,
            summary,
            assignments,
            written,
        })
    }

    /// Close the review without emitting anything
    pub fn discard(&mut self) -> WorkflowResult<ReconciliationSummary> {
        let review = self.review_ref("discard")?;
        let summary = review.summary();
        info!(
            "Discarded session {} with {} recorded decisions",
            review.session_id(),
            review.decisions().len()
        );
        self.state = SessionState::Closed;
        Ok(summary)
    }

    /// Return to Closed from any phase, cancelling a running analysis
    pub fn close(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Closed => {}
            SessionState::Analyzing {
                session_id, cancel, ..
            } => {
                cancel.cancel();
                info!("Cancelled analysis for session {}", session_id);
            }
            SessionState::Review(review) => {
                info!(
                    "Closed session {} without commit ({} decisions dropped)",
                    review.session_id(),
                    review.decisions().len()
                );
            }
        }
    }

    fn review_ref(&self, operation: &'static str) -> WorkflowResult<&ReviewSession> {
        match &self.state {
            SessionState::Review(review) => Ok(review),
            _ => Err(WorkflowError::invalid_state(operation, self.phase())),
        }
    }

    fn review_mut(&mut self, operation: &'static str) -> WorkflowResult<&mut ReviewSession> {
        let phase = self.phase();
        match &mut self.state {
            SessionState::Review(review) => Ok(review),
            _ => Err(WorkflowError::invalid_state(operation, phase)),
        }
    }
}

impl Drop for ResolutionWorkflow {
    fn drop(&mut self) {
        if let SessionState::Analyzing { cancel, .. } = &self.state {
            cancel.cancel();
        }
    }
}
