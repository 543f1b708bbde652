//! Shared pieces of probforge: the problem data model, errors,
//! configuration, telemetry and the problem backend client.

pub mod client;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use crate::client::{HttpProblemService, ProblemService};
pub use crate::config::{Config, FileStore, Loader, Locale};
pub use crate::error::{ConfigError, InputError, ServiceError};
pub use crate::types::{Difficulty, GeneratedProblem, ProblemId, ProblemInput, Subject};
