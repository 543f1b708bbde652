//! Composition of the two-pane view from input, workflow state and result.
//!
//! Everything here is a pure function of its arguments. The view never
//! talks to the backend.

use probforge_common::{Difficulty, GeneratedProblem, Locale, ProblemInput, Subject};
use probforge_renderer::{MathTypesetter, PulldownLatex, RenderedContent, SpanRenderer};

use crate::labels::Labels;
use crate::workflow::WorkflowState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    pub labels: &'static Labels,
    pub input: InputPane<'a>,
    pub result: ResultPane<'a>,
}

/// Left pane: the editable problem and the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPane<'a> {
    pub content: &'a str,
    pub subject: Subject,
    pub difficulty: Difficulty,
    /// Rendered preview of `content`.
    pub preview: RenderedContent<'a>,
    pub submit: SubmitControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    /// True while a run is in progress; `label` is then the status text.
    pub busy: bool,
    pub label: &'static str,
}

/// Right pane, by workflow state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPane<'a> {
    /// Nothing generated yet.
    Placeholder { message: &'static str },
    /// A run is waiting on the backend.
    Busy { status: &'static str },
    /// The last run failed. Only a generic message is shown.
    Failed { message: &'static str },
    Generated {
        problem: RenderedContent<'a>,
        solution: Option<RenderedContent<'a>>,
    },
}

/// Compose the view with the default math typesetter.
pub fn compose<'a>(
    input: &'a ProblemInput,
    state: &WorkflowState,
    generated: Option<&'a GeneratedProblem>,
    locale: Locale,
) -> View<'a> {
    compose_with(
        &SpanRenderer::new(PulldownLatex::inline()),
        input,
        state,
        generated,
        locale,
    )
}

pub fn compose_with<'a, T: MathTypesetter>(
    renderer: &SpanRenderer<T>,
    input: &'a ProblemInput,
    state: &WorkflowState,
    generated: Option<&'a GeneratedProblem>,
    locale: Locale,
) -> View<'a> {
    let labels = Labels::for_locale(locale);

    let busy = state.is_running();
    let submit = SubmitControl {
        enabled: !busy && !input.is_empty(),
        busy,
        label: if busy {
            labels.status(state)
        } else {
            labels.submit
        },
    };

    let result = match (state, generated) {
        (WorkflowState::Saving | WorkflowState::Generating { .. }, _) => ResultPane::Busy {
            status: labels.status(state),
        },
        (WorkflowState::Error, _) => ResultPane::Failed {
            message: labels.error,
        },
        (WorkflowState::Done, Some(generated)) => ResultPane::Generated {
            problem: renderer.render_all(&generated.content),
            solution: generated
                .solution
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| renderer.render_all(s)),
        },
        (WorkflowState::Idle | WorkflowState::Done, _) => ResultPane::Placeholder {
            message: labels.result_placeholder,
        },
    };

    View {
        labels,
        input: InputPane {
            content: &input.content,
            subject: input.subject,
            difficulty: input.difficulty,
            preview: renderer.render_all(&input.content),
            submit,
        },
        result,
    }
}
