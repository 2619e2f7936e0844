mod client;
mod summary;

pub(crate) use client::AdvisoryClient;
use summary::summary_for;

use crate::analytics::AnalyticsSnapshot;

pub(crate) const QUICK_QUESTIONS: [&str; 4] = [
    "Am I overspending?",
    "Where can I cut costs?",
    "How's my savings trend?",
    "Give me a budget plan",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum AdvisoryError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Provider(String),
    #[error("empty response")]
    EmptyResponse,
}

impl AdvisoryError {
    /// Text shown to the user in place of an answer.
    pub(crate) fn user_message(&self) -> String {
        match self {
            AdvisoryError::Network(_) => "Network error. Please try again.".to_string(),
            AdvisoryError::Provider(message) => message.clone(),
            AdvisoryError::EmptyResponse => "Sorry, I couldn't get a response.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Answer(pub(crate) String);

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One outbound question, tagged with the sequence number that must come back
/// with its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AdvisoryRequest {
    pub(crate) seq: u64,
    pub(crate) question: String,
    pub(crate) summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AdvisoryState {
    Idle,
    /// Summary being built from the current analytics.
    Composing { question: String },
    AwaitingResponse { seq: u64, question: String },
    Answered { question: String, answer: Answer },
    Failed { question: String, error: AdvisoryError },
}

/// Request lifecycle for one advisor surface.
///
/// Requests are never cancelled. A newer `begin` supersedes an older one and
/// only the result carrying the latest sequence number is applied.
#[derive(Debug)]
pub(crate) struct AdvisoryPipeline {
    state: AdvisoryState,
    last_seq: u64,
}

impl Default for AdvisoryPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisoryPipeline {
    pub(crate) fn new() -> Self {
        Self {
            state: AdvisoryState::Idle,
            last_seq: 0,
        }
    }

    pub(crate) fn state(&self) -> &AdvisoryState {
        &self.state
    }

    pub(crate) fn is_waiting(&self) -> bool {
        matches!(self.state, AdvisoryState::AwaitingResponse { .. })
    }

    /// Start a request for `question`. Blank questions return None and leave
    /// the state untouched.
    pub(crate) fn begin(
        &mut self,
        question: &str,
        analytics: &AnalyticsSnapshot,
    ) -> Option<AdvisoryRequest> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        self.state = AdvisoryState::Composing {
            question: question.to_string(),
        };
        let summary = summary_for(analytics);

        self.last_seq += 1;
        let seq = self.last_seq;
        self.state = AdvisoryState::AwaitingResponse {
            seq,
            question: question.to_string(),
        };
        Some(AdvisoryRequest {
            seq,
            question: question.to_string(),
            summary,
        })
    }

    /// Apply a finished request. Returns false (and changes nothing) when
    /// `seq` is not the latest issued.
    pub(crate) fn complete(&mut self, seq: u64, result: Result<Answer, AdvisoryError>) -> bool {
        let question = match &self.state {
            AdvisoryState::AwaitingResponse { seq: current, question } if *current == seq => {
                question.clone()
            }
            _ => {
                tracing::debug!(seq, latest = self.last_seq, "dropping stale advisory result");
                return false;
            }
        };

        self.state = match result {
            Ok(answer) => AdvisoryState::Answered { question, answer },
            Err(error) => AdvisoryState::Failed { question, error },
        };
        true
    }

    pub(crate) fn reset(&mut self) {
        self.state = AdvisoryState::Idle;
    }
}

#[cfg(test)]
mod tests;
