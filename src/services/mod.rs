//! Service layer for the resolution workflow
//!
//! Services sit between the pure matching core and the host: they own the
//! session state machine, progress reporting, reviewer-facing views and the
//! hand-off of committed assignments.
//!
//! # Usage
//!
//! ```rust,ignore
//! use epg_reconcile::services::{MemoryAssignmentWriter, ResolutionWorkflow};
//!
//! async fn example(snapshot: Arc<CatalogSnapshot>) -> WorkflowResult<()> {
//!     let mut workflow = ResolutionWorkflow::new(normalizer, config.workflow, writer);
//!     workflow.analyze(snapshot, &[1, 2, 3]).await?;
//!     workflow.assign(2, 42)?;
//!     workflow.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod assignment_writer;
pub mod progress;
pub mod resolution;
pub mod review;

pub use assignment_writer::{AssignmentWriter, JsonFileAssignmentWriter, MemoryAssignmentWriter};
pub use progress::{AnalysisProgress, ProgressReporter};
pub use resolution::{
    AnalysisOutcome, CommitReport, PendingAnalysis, ResolutionWorkflow, ReviewSession,
    WorkflowPhase,
};
pub use review::{
    CandidateView, ReconciliationSummary, ReviewItem, UNKNOWN_SOURCE_LABEL, source_label,
};
