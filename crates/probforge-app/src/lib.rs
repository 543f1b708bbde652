//! The probforge application core: the generation workflow and the
//! two-pane view built on top of it.

pub mod labels;
pub mod page;
pub mod view;
pub mod workflow;

pub use labels::Labels;
pub use view::{InputPane, ResultPane, SubmitControl, View, compose, compose_with};
pub use workflow::{
    CreateProblem, GenerateVariant, GenerationWorkflow, RejectReason, WorkflowError, WorkflowState,
};
