//! The problem backend: the collaborator trait and its HTTP implementation.

use std::future::Future;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::ServiceError;
use crate::types::{CreatedProblem, GeneratedProblem, ProblemId, ProblemInput};

/// Longest error body kept in [`ServiceError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Remote operations the generation workflow depends on.
///
/// Each accepted `create_problem` call stores exactly one new problem;
/// there is no de-duplication on this side.
pub trait ProblemService: Send + Sync {
    /// Persist a problem and return its identifier.
    fn create_problem(
        &self,
        input: &ProblemInput,
    ) -> impl Future<Output = Result<ProblemId, ServiceError>> + Send;

    /// Ask the generator for a variant of a stored problem.
    fn generate_variant(
        &self,
        id: &ProblemId,
    ) -> impl Future<Output = Result<GeneratedProblem, ServiceError>> + Send;
}

impl<T: ProblemService> ProblemService for &T {
    fn create_problem(
        &self,
        input: &ProblemInput,
    ) -> impl Future<Output = Result<ProblemId, ServiceError>> + Send {
        (**self).create_problem(input)
    }

    fn generate_variant(
        &self,
        id: &ProblemId,
    ) -> impl Future<Output = Result<GeneratedProblem, ServiceError>> + Send {
        (**self).generate_variant(id)
    }
}

/// [`ProblemService`] backed by the ProbForge REST API.
///
/// - `POST {endpoint}/problems/` stores a problem
/// - `POST {endpoint}/problems/{id}/generate` generates a variant
#[derive(Debug, Clone)]
pub struct HttpProblemService {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpProblemService {
    /// Build a client using the endpoint and timeout from `config`.
    pub fn new(config: &Config) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ServiceError::Client)?;
        Ok(Self::with_client(client, config.endpoint.clone()))
    }

    pub fn with_client(client: reqwest::Client, mut endpoint: Url) -> Self {
        // Url::join drops the last path segment unless it ends in a slash
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn join(&self, path: &str) -> Result<Url, ServiceError> {
        self.endpoint
            .join(path)
            .map_err(|source| ServiceError::InvalidEndpoint {
                base: self.endpoint.to_string(),
                path: path.to_owned(),
                source,
            })
    }

    fn generate_url(&self, id: &ProblemId) -> Result<Url, ServiceError> {
        let mut url = self.join("problems/")?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidEndpoint {
                base: self.endpoint.to_string(),
                path: format!("problems/{id}/generate"),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .push(id.as_str())
            .push("generate");
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<T, ServiceError> {
        tracing::debug!(%url, "sending request");
        let transport = |source| ServiceError::Transport {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(ServiceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes).map_err(|source| ServiceError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl ProblemService for HttpProblemService {
    async fn create_problem(&self, input: &ProblemInput) -> Result<ProblemId, ServiceError> {
        let url = self.join("problems/")?;
        let request = self.client.post(url.clone()).json(input);
        let created: CreatedProblem = self.send(&url, request).await?;
        tracing::debug!(id = %created.id, "problem stored");
        Ok(created.id)
    }

    async fn generate_variant(&self, id: &ProblemId) -> Result<GeneratedProblem, ServiceError> {
        let url = self.generate_url(id)?;
        let request = self.client.post(url.clone());
        let generated: GeneratedProblem = self.send(&url, request).await?;
        tracing::debug!(
            %id,
            has_solution = generated.solution.is_some(),
            "variant generated"
        );
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(endpoint: &str) -> HttpProblemService {
        HttpProblemService::with_client(reqwest::Client::new(), Url::parse(endpoint).unwrap())
    }

    #[test]
    fn endpoint_gets_trailing_slash() {
        let svc = service("https://api.example.com/v1");
        assert_eq!(svc.endpoint().as_str(), "https://api.example.com/v1/");
        assert_eq!(
            svc.join("problems/").unwrap().as_str(),
            "https://api.example.com/v1/problems/"
        );
    }

    #[test]
    fn generate_url_escapes_id() {
        let svc = service("http://127.0.0.1:8000");
        let url = svc.generate_url(&ProblemId::new("42")).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/problems/42/generate");

        let url = svc.generate_url(&ProblemId::new("a/b")).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/problems/a%2Fb/generate");
    }
}
