//! Problem data model shared by the workflow, the renderer and the HTTP client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Subject area of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    #[default]
    Math,
    Physics,
}

impl Subject {
    pub const ALL: [Subject; 2] = [Subject::Math, Subject::Physics];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::Physics => "physics",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "math" => Ok(Subject::Math),
            "physics" => Ok(Subject::Physics),
            other => Err(InputError::UnknownSubject(other.to_owned())),
        }
    }
}

/// Difficulty rating, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> Result<Self, InputError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(InputError::DifficultyOutOfRange(level))
        }
    }

    #[inline]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Every valid level, lowest first.
    pub fn levels() -> impl Iterator<Item = Difficulty> {
        (Self::MIN..=Self::MAX).map(Difficulty)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = InputError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

impl FromStr for Difficulty {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level: u8 = s
            .trim()
            .parse()
            .map_err(|_| InputError::InvalidDifficulty(s.to_owned()))?;
        Self::new(level)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a problem stored by the backend.
///
/// Opaque to the client. The backend hands out UUIDs, but numeric ids are
/// accepted too and kept in their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawProblemId", into = "String")]
pub struct ProblemId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProblemId {
    Text(String),
    Number(u64),
}

impl From<RawProblemId> for ProblemId {
    fn from(raw: RawProblemId) -> Self {
        match raw {
            RawProblemId::Text(s) => Self(s),
            RawProblemId::Number(n) => Self(n.to_string()),
        }
    }
}

impl ProblemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ProblemId> for String {
    fn from(id: ProblemId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProblemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A problem as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProblemInput {
    /// Problem statement, prose with `$`-delimited math.
    pub content: String,
    #[serde(default)]
    pub subject: Subject,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Known solution, if the user has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    /// Problem this one was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ProblemId>,
}

impl ProblemInput {
    pub fn new(content: impl Into<String>, subject: Subject, difficulty: Difficulty) -> Self {
        Self {
            content: content.into(),
            subject,
            difficulty,
            solution: None,
            parent_id: None,
        }
    }

    pub fn with_solution(mut self, solution: impl Into<String>) -> Self {
        self.solution = Some(solution.into());
        self
    }

    pub fn with_parent(mut self, parent: ProblemId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// No content at all; whitespace is content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A generated variant problem together with its worked solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GeneratedProblemWire")]
pub struct GeneratedProblem {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
}

impl GeneratedProblem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            solution: None,
        }
    }

    pub fn with_solution(mut self, solution: impl Into<String>) -> Self {
        let solution = solution.into();
        self.solution = (!solution.is_empty()).then_some(solution);
        self
    }
}

/// Generated problem as it appears on the wire.
///
/// The generator has been seen answering with `content`, with
/// `content_text`/`content_latex` pairs, or with both. The first non-empty
/// field wins.
#[derive(Debug, Default, Deserialize)]
struct GeneratedProblemWire {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    content_text: Option<String>,
    #[serde(default)]
    content_latex: Option<String>,
    #[serde(default)]
    solution: Option<String>,
    #[serde(default)]
    solution_text: Option<String>,
    #[serde(default)]
    solution_latex: Option<String>,
}

fn first_non_empty(candidates: [Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
}

impl TryFrom<GeneratedProblemWire> for GeneratedProblem {
    type Error = InputError;

    fn try_from(wire: GeneratedProblemWire) -> Result<Self, Self::Error> {
        let content = first_non_empty([wire.content, wire.content_text, wire.content_latex])
            .ok_or(InputError::MissingContent)?;
        let solution = first_non_empty([wire.solution, wire.solution_text, wire.solution_latex]);
        Ok(Self { content, solution })
    }
}

/// Response body of the create-problem endpoint. Only the id is used.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedProblem {
    pub id: ProblemId,
}
