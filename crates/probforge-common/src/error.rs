use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Failures talking to the problem backend
#[derive(Debug, Error, Diagnostic)]
pub enum ServiceError {
    #[error("request to {url} failed")]
    #[diagnostic(
        code(service::transport),
        help("is the backend running and reachable?")
    )]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend answered {status} for {url}")]
    #[diagnostic(code(service::status))]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {url}")]
    #[diagnostic(code(service::decode))]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot build request url from {base} and {path}")]
    #[diagnostic(code(service::url))]
    InvalidEndpoint {
        base: String,
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build http client")]
    #[diagnostic(code(service::client))]
    Client(#[source] reqwest::Error),

    /// Failure reported by a non-HTTP service implementation.
    #[error("{0}")]
    #[diagnostic(code(service::other))]
    Other(String),
}

/// Configuration loading errors
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    #[diagnostic(code(config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}", path.display())]
    #[diagnostic(code(config::json))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML in {}", path.display())]
    #[diagnostic(code(config::toml))]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported config format: {}", path.display())]
    #[diagnostic(code(config::format), help("use a .json or .toml file"))]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid endpoint url {url}: {message}")]
    #[diagnostic(code(config::endpoint))]
    InvalidEndpoint { url: String, message: String },

    #[error("invalid value for {var}: {value}")]
    #[diagnostic(code(config::env))]
    InvalidEnv { var: &'static str, value: String },
}

/// Invalid problem data
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum InputError {
    #[error("difficulty must be between 1 and 5, got {0}")]
    #[diagnostic(code(input::difficulty))]
    DifficultyOutOfRange(u8),

    #[error("difficulty must be a number between 1 and 5, got {0:?}")]
    #[diagnostic(code(input::difficulty))]
    InvalidDifficulty(String),

    #[error("unknown subject {0:?}")]
    #[diagnostic(code(input::subject), help("expected `math` or `physics`"))]
    UnknownSubject(String),

    #[error("generated problem has no content")]
    #[diagnostic(code(input::content))]
    MissingContent,
}
