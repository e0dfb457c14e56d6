//! Status-code failure classification.
//!
//! # Rules (in order)
//! 1. A transport or cancellation error is returned verbatim
//! 2. No response means nothing to classify: success
//! 3. A response whose status label is marked in the failure set becomes a
//!    [`InvokeError::FailureStatus`]; anything else is success
//!
//! A well-formed 503 is therefore a dispatch success but an invocation
//! failure, which is the signal load balancers and breakers consume.

use std::collections::HashMap;

use crate::client::RestResponse;
use crate::error::InvokeError;

/// Prefix of every failure label.
pub const FAILURE_TYPE_PREFIX: &str = "http_";

/// Status codes that may ever be classified as failures.
pub const CANONICAL_FAILURE_CODES: [u16; 5] = [500, 502, 503, 504, 429];

/// Label for a status code, e.g. `http_503`.
pub fn failure_label(code: u16) -> String {
    format!("{}{}", FAILURE_TYPE_PREFIX, code)
}

fn is_canonical_label(label: &str) -> bool {
    label
        .strip_prefix(FAILURE_TYPE_PREFIX)
        .and_then(|code| code.parse::<u16>().ok())
        .is_some_and(|code| {
            CANONICAL_FAILURE_CODES.contains(&code) && failure_label(code) == label
        })
}

/// Resolved set of status labels treated as failures.
///
/// Keys are always a subset of the canonical labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSet {
    labels: HashMap<String, bool>,
}

impl FailureSet {
    /// Every canonical code marked as failure.
    pub fn canonical() -> Self {
        Self {
            labels: CANONICAL_FAILURE_CODES
                .iter()
                .map(|code| (failure_label(*code), true))
                .collect(),
        }
    }

    /// Nothing is a failure.
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    /// Resolve a caller override.
    ///
    /// An empty override keeps the canonical set. Otherwise the result is the
    /// caller's labels intersected with the canonical set, which may be empty.
    /// Only the keys count; the caller's values are ignored.
    pub fn narrow(overrides: &HashMap<String, bool>) -> Self {
        if overrides.is_empty() {
            return Self::canonical();
        }

        let labels: HashMap<String, bool> = overrides
            .keys()
            .filter(|label| is_canonical_label(label))
            .map(|label| (label.clone(), true))
            .collect();

        if labels.len() < overrides.len() {
            let dropped: Vec<&String> = overrides
                .keys()
                .filter(|label| !labels.contains_key(*label))
                .collect();
            tracing::debug!(?dropped, "Ignoring failure labels outside the canonical set");
        }

        Self { labels }
    }

    /// Is `code` classified as a failure?
    pub fn is_failure(&self, code: u16) -> bool {
        self.labels
            .get(&failure_label(code))
            .copied()
            .unwrap_or(false)
    }

    /// Failure codes in this set, ascending.
    pub fn codes(&self) -> Vec<u16> {
        let mut codes: Vec<u16> = CANONICAL_FAILURE_CODES
            .iter()
            .copied()
            .filter(|code| self.is_failure(*code))
            .collect();
        codes.sort_unstable();
        codes
    }

    /// The label map.
    pub fn as_map(&self) -> &HashMap<String, bool> {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Apply the classification rules to a finished dispatch.
    pub fn classify(
        &self,
        outcome: Result<(), InvokeError>,
        response: Option<&RestResponse>,
    ) -> Result<(), InvokeError> {
        outcome?;

        let Some(response) = response else {
            return Ok(());
        };

        let status = response.status_code();
        if self.is_failure(status) {
            return Err(InvokeError::FailureStatus {
                status,
                body: String::from_utf8_lossy(response.read_body()).into_owned(),
            });
        }

        Ok(())
    }
}

impl Default for FailureSet {
    fn default() -> Self {
        Self::canonical()
    }
}
