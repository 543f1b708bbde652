//! The two-phase generation workflow.
//!
//! A run stores the user's problem, then asks the generator for a variant
//! of the stored problem:
//!
//! ```text
//! Idle ──submit──▶ Saving ──created──▶ Generating ──generated──▶ Done
//!                    │                     │
//!                    └──────failed─────────┴──────▶ Error
//! ```
//!
//! `Done` and `Error` end the run; the next `submit` starts over at
//! `Saving`. While a run is in `Saving` or `Generating`, `submit` is refused.
//!
//! [`GenerationWorkflow`] is a plain state machine driven by events
//! ([`submit`](GenerationWorkflow::submit),
//! [`on_created`](GenerationWorkflow::on_created),
//! [`on_generated`](GenerationWorkflow::on_generated)). Each event hands
//! back the next remote call to make, if any. [`GenerationWorkflow::run`]
//! drives a whole run against a [`ProblemService`].

use miette::Diagnostic;
use probforge_common::{GeneratedProblem, ProblemId, ProblemInput, ProblemService, ServiceError};
use thiserror::Error;
use tokio::sync::watch;
use tracing::Instrument;

/// Where the workflow currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Waiting for the backend to store the submitted problem.
    Saving,
    /// Waiting for the generator; the stored problem's id is known.
    Generating { problem_id: ProblemId },
    /// A variant was generated.
    Done,
    /// The run failed. The cause has been logged.
    Error,
}

impl WorkflowState {
    /// True while a remote call is outstanding.
    pub const fn is_running(&self) -> bool {
        matches!(self, WorkflowState::Saving | WorkflowState::Generating { .. })
    }

    /// Status key shown to the user; empty when idle.
    pub const fn status_text(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "",
            WorkflowState::Saving => "persisting",
            WorkflowState::Generating { .. } => "generating",
            WorkflowState::Done => "done",
            WorkflowState::Error => "error",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Saving => "saving",
            WorkflowState::Generating { .. } => "generating",
            WorkflowState::Done => "done",
            WorkflowState::Error => "error",
        }
    }
}

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Diagnostic)]
pub enum RejectReason {
    #[error("problem content is empty")]
    #[diagnostic(code(workflow::empty), help("enter a problem statement first"))]
    EmptyContent,

    #[error("a generation is already in progress")]
    #[diagnostic(code(workflow::busy))]
    InProgress,
}

#[derive(Debug, Error, Diagnostic)]
pub enum WorkflowError {
    #[error("submission rejected: {0}")]
    #[diagnostic(transparent)]
    Rejected(#[from] RejectReason),

    #[error("failed to save the problem")]
    #[diagnostic(code(workflow::create))]
    Create(#[source] ServiceError),

    #[error("failed to generate a variant")]
    #[diagnostic(code(workflow::generate))]
    Generate(#[source] ServiceError),

    /// A completion arrived that does not belong to the current state.
    /// Nothing was changed.
    #[error("ignored {event} while {state}")]
    #[diagnostic(code(workflow::out_of_order))]
    OutOfOrder {
        event: &'static str,
        state: &'static str,
    },
}

/// Remote call requested by [`GenerationWorkflow::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProblem {
    input: ProblemInput,
}

impl CreateProblem {
    pub fn input(&self) -> &ProblemInput {
        &self.input
    }
}

/// Remote call requested by [`GenerationWorkflow::on_created`].
///
/// Only a successful create produces one, so a generate call always has a
/// stored problem behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateVariant {
    problem_id: ProblemId,
}

impl GenerateVariant {
    pub fn problem_id(&self) -> &ProblemId {
        &self.problem_id
    }
}

/// Owns the workflow state and the last generated problem.
#[derive(Debug)]
pub struct GenerationWorkflow {
    state: WorkflowState,
    submitted: Option<ProblemInput>,
    generated: Option<GeneratedProblem>,
    runs: u64,
    status: watch::Sender<WorkflowState>,
}

impl Default for GenerationWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationWorkflow {
    pub fn new() -> Self {
        let (status, _) = watch::channel(WorkflowState::Idle);
        Self {
            state: WorkflowState::Idle,
            submitted: None,
            generated: None,
            runs: 0,
            status,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Result of the last successful run; cleared when a new run starts.
    pub fn generated(&self) -> Option<&GeneratedProblem> {
        self.generated.as_ref()
    }

    /// Input of the current or most recent run.
    pub fn submitted(&self) -> Option<&ProblemInput> {
        self.submitted.as_ref()
    }

    /// Number of accepted submissions so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Watch state changes, e.g. to show status text during a run.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.status.subscribe()
    }

    /// Start a run.
    ///
    /// Refused without any state change if the content is empty or a run is
    /// still waiting on the backend.
    pub fn submit(&mut self, input: ProblemInput) -> Result<CreateProblem, RejectReason> {
        if self.state.is_running() {
            tracing::debug!(state = self.state.name(), "submit refused, run in progress");
            return Err(RejectReason::InProgress);
        }
        if input.is_empty() {
            tracing::debug!("submit refused, empty content");
            return Err(RejectReason::EmptyContent);
        }

        self.runs += 1;
        self.generated = None;
        self.submitted = Some(input.clone());
        self.transition(WorkflowState::Saving);
        Ok(CreateProblem { input })
    }

    /// Feed the outcome of the create-problem call.
    pub fn on_created(
        &mut self,
        result: Result<ProblemId, ServiceError>,
    ) -> Result<GenerateVariant, WorkflowError> {
        if self.state != WorkflowState::Saving {
            tracing::warn!(state = self.state.name(), "ignoring create completion");
            return Err(WorkflowError::OutOfOrder {
                event: "create completion",
                state: self.state.name(),
            });
        }

        match result {
            Ok(problem_id) => {
                self.transition(WorkflowState::Generating {
                    problem_id: problem_id.clone(),
                });
                Ok(GenerateVariant { problem_id })
            }
            Err(err) => {
                tracing::error!(run = self.runs, error = ?err, "saving the problem failed");
                self.transition(WorkflowState::Error);
                Err(WorkflowError::Create(err))
            }
        }
    }

    /// Feed the outcome of the generate-variant call.
    pub fn on_generated(
        &mut self,
        result: Result<GeneratedProblem, ServiceError>,
    ) -> Result<&GeneratedProblem, WorkflowError> {
        if !matches!(self.state, WorkflowState::Generating { .. }) {
            tracing::warn!(state = self.state.name(), "ignoring generate completion");
            return Err(WorkflowError::OutOfOrder {
                event: "generate completion",
                state: self.state.name(),
            });
        }

        match result {
            Ok(generated) => {
                self.transition(WorkflowState::Done);
                Ok(self.generated.insert(generated))
            }
            Err(err) => {
                tracing::error!(run = self.runs, error = ?err, "generating a variant failed");
                self.transition(WorkflowState::Error);
                Err(WorkflowError::Generate(err))
            }
        }
    }

    /// Perform one whole run against `service`.
    ///
    /// The two calls are made strictly in order, and the second only after
    /// the first succeeded. There are no retries.
    pub async fn run<S: ProblemService>(
        &mut self,
        input: ProblemInput,
        service: &S,
    ) -> Result<&GeneratedProblem, WorkflowError> {
        let create = self.submit(input)?;
        let span = tracing::info_span!("generation", run = self.runs);

        let created = service
            .create_problem(create.input())
            .instrument(span.clone())
            .await;
        let generate = self.on_created(created)?;

        let generated = service
            .generate_variant(generate.problem_id())
            .instrument(span)
            .await;
        self.on_generated(generated)
    }

    fn transition(&mut self, next: WorkflowState) {
        tracing::debug!(from = self.state.name(), to = next.name(), run = self.runs, "workflow transition");
        self.state = next;
        self.status.send_replace(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probforge_common::{Difficulty, Subject};

    fn input(content: &str) -> ProblemInput {
        ProblemInput::new(content, Subject::Math, Difficulty::default())
    }

    #[test]
    fn starts_idle() {
        let wf = GenerationWorkflow::new();
        assert_eq!(wf.state(), &WorkflowState::Idle);
        assert_eq!(wf.state().status_text(), "");
        assert!(wf.generated().is_none());
    }

    #[test]
    fn empty_content_is_rejected_without_transition() {
        let mut wf = GenerationWorkflow::new();
        assert_eq!(wf.submit(input("")), Err(RejectReason::EmptyContent));
        assert_eq!(wf.state(), &WorkflowState::Idle);
        assert_eq!(wf.runs(), 0);
    }

    #[test]
    fn whitespace_content_is_accepted() {
        let mut wf = GenerationWorkflow::new();
        let create = wf.submit(input("  \n")).unwrap();
        assert_eq!(create.input().content, "  \n");
        assert_eq!(wf.state(), &WorkflowState::Saving);
    }

    #[test]
    fn happy_path_visits_every_state() {
        let mut wf = GenerationWorkflow::new();

        let create = wf.submit(input("$x$")).unwrap();
        assert_eq!(create.input().content, "$x$");
        assert_eq!(wf.state(), &WorkflowState::Saving);
        assert_eq!(wf.state().status_text(), "persisting");

        let generate = wf.on_created(Ok(ProblemId::new("42"))).unwrap();
        assert_eq!(generate.problem_id().as_str(), "42");
        assert_eq!(wf.state().status_text(), "generating");

        let done = wf.on_generated(Ok(GeneratedProblem::new("$y$"))).unwrap();
        assert_eq!(done.content, "$y$");
        assert_eq!(wf.state(), &WorkflowState::Done);
        assert_eq!(wf.state().status_text(), "done");
    }

    #[test]
    fn second_submit_is_refused_while_running() {
        let mut wf = GenerationWorkflow::new();
        wf.submit(input("first")).unwrap();
        assert_eq!(wf.submit(input("second")), Err(RejectReason::InProgress));
        assert_eq!(wf.submitted().unwrap().content, "first");

        wf.on_created(Ok(ProblemId::new("1"))).unwrap();
        assert_eq!(wf.submit(input("third")), Err(RejectReason::InProgress));
        assert!(matches!(wf.state(), WorkflowState::Generating { .. }));
        assert_eq!(wf.runs(), 1);
    }

    #[test]
    fn create_failure_ends_in_error() {
        let mut wf = GenerationWorkflow::new();
        wf.submit(input("p")).unwrap();
        let err = wf
            .on_created(Err(ServiceError::Other("down".into())))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Create(_)));
        assert_eq!(wf.state(), &WorkflowState::Error);
        assert_eq!(wf.state().status_text(), "error");

        // no generate call can be fed into an errored run
        assert!(matches!(
            wf.on_generated(Ok(GeneratedProblem::new("late"))),
            Err(WorkflowError::OutOfOrder { .. })
        ));
        assert!(wf.generated().is_none());
    }

    #[test]
    fn out_of_order_completions_change_nothing() {
        let mut wf = GenerationWorkflow::new();
        assert!(matches!(
            wf.on_created(Ok(ProblemId::new("1"))),
            Err(WorkflowError::OutOfOrder { .. })
        ));
        assert_eq!(wf.state(), &WorkflowState::Idle);

        wf.submit(input("p")).unwrap();
        assert!(matches!(
            wf.on_generated(Ok(GeneratedProblem::new("early"))),
            Err(WorkflowError::OutOfOrder { .. })
        ));
        assert_eq!(wf.state(), &WorkflowState::Saving);
    }

    #[test]
    fn new_run_clears_previous_result() {
        let mut wf = GenerationWorkflow::new();
        wf.submit(input("p")).unwrap();
        wf.on_created(Ok(ProblemId::new("1"))).unwrap();
        wf.on_generated(Ok(GeneratedProblem::new("old"))).unwrap();
        assert!(wf.generated().is_some());

        wf.submit(input("q")).unwrap();
        assert!(wf.generated().is_none());
        assert_eq!(wf.state(), &WorkflowState::Saving);
        assert_eq!(wf.runs(), 2);
    }

    #[test]
    fn error_state_accepts_a_fresh_submit() {
        let mut wf = GenerationWorkflow::new();
        wf.submit(input("p")).unwrap();
        wf.on_created(Ok(ProblemId::new("1"))).unwrap();
        wf.on_generated(Err(ServiceError::Other("quota".into())))
            .unwrap_err();
        assert_eq!(wf.state(), &WorkflowState::Error);

        assert!(wf.submit(input("again")).is_ok());
        assert_eq!(wf.state(), &WorkflowState::Saving);
    }

    #[test]
    fn subscribers_see_the_latest_state() {
        let mut wf = GenerationWorkflow::new();
        let rx = wf.subscribe();
        assert_eq!(*rx.borrow(), WorkflowState::Idle);

        wf.submit(input("p")).unwrap();
        assert_eq!(*rx.borrow(), WorkflowState::Saving);

        wf.on_created(Ok(ProblemId::new("9"))).unwrap();
        assert_eq!(
            *rx.borrow(),
            WorkflowState::Generating {
                problem_id: ProblemId::new("9")
            }
        );
    }
}
