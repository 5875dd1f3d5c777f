//! The AI scoring collaborator behind a narrow capability interface.
//!
//! The suggestion engine is branch-free with respect to whether AI is
//! enabled: it always holds a [`Scorer`], and disabling AI means injecting
//! the [`NoopScorer`] null object. Every failure mode recovers to the
//! baseline suggestion at the call site; nothing here can fail the
//! pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while consulting the scoring collaborator.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("scoring disabled")]
    Disabled,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("scoring service unavailable: {0}")]
    Unavailable(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// An enriched suggestion returned by the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub text: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
}

/// Capability interface for scoring a finding summary with surrounding
/// source context.
pub trait Scorer: Send + Sync {
    fn score(&self, summary: &str, context: &[String]) -> Result<Scored, ScoringError>;
}

/// Null object used when AI scoring is disabled or unconfigured.
pub struct NoopScorer;

impl Scorer for NoopScorer {
    fn score(&self, _summary: &str, _context: &[String]) -> Result<Scored, ScoringError> {
        Err(ScoringError::Disabled)
    }
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    summary: &'a str,
    context: &'a [String],
}

#[derive(Deserialize)]
struct ScoreResponse {
    text: String,
    confidence: f64,
}

/// HTTP-backed scorer. Requests run with a bounded timeout; a timeout or
/// any transport error surfaces as a `ScoringError` and degrades to the
/// baseline text upstream.
pub struct RemoteScorer {
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    endpoint: String,
    timeout: Duration,
}

impl RemoteScorer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("trucode/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            http,
            runtime,
            endpoint: endpoint.into(),
            timeout,
        })
    }
}

impl Scorer for RemoteScorer {
    fn score(&self, summary: &str, context: &[String]) -> Result<Scored, ScoringError> {
        self.runtime.block_on(async {
            let response = self
                .http
                .post(&self.endpoint)
                .timeout(self.timeout)
                .json(&ScoreRequest { summary, context })
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        ScoringError::Timeout
                    } else {
                        ScoringError::Network(e)
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ScoringError::Unavailable(format!("HTTP {}", status)));
            }

            let payload: ScoreResponse = response
                .json()
                .await
                .map_err(|e| ScoringError::Malformed(e.to_string()))?;

            if payload.text.trim().is_empty() {
                return Err(ScoringError::Malformed("empty suggestion text".to_string()));
            }
            if !(0.0..=1.0).contains(&payload.confidence) {
                return Err(ScoringError::Malformed(format!(
                    "confidence {} outside [0, 1]",
                    payload.confidence
                )));
            }

            Ok(Scored {
                text: payload.text,
                confidence: payload.confidence,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_scorer_reports_disabled() {
        let result = NoopScorer.score("summary", &[]);
        assert!(matches!(result, Err(ScoringError::Disabled)));
    }

    #[test]
    fn test_score_request_serializes() {
        let context = vec!["line one".to_string(), "line two".to_string()];
        let request = ScoreRequest {
            summary: "unused import",
            context: &context,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["summary"], "unused import");
        assert_eq!(json["context"][1], "line two");
    }

    #[test]
    fn test_score_response_deserializes() {
        let payload: ScoreResponse =
            serde_json::from_str(r#"{"text": "do this", "confidence": 0.8}"#).unwrap();
        assert_eq!(payload.text, "do this");
        assert!((payload.confidence - 0.8).abs() < f64::EPSILON);
    }
}
