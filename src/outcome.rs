//! Tagged scenario outcomes
//!
//! Every scenario ends in one of three states: the assertion held, the
//! assertion failed, or the request never produced a usable response.
//! Scenarios return this instead of `Result` so a failure is data for the
//! report rather than something to propagate.

use std::fmt;

/// Terminal state of a single scenario
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The response matched the scenario's expectation
    Passed(T),
    /// The response arrived but did not match (wrong status or shape)
    Failed(String),
    /// Transport error, timeout, or undecodable body
    Error(String),
}

impl<T> Outcome<T> {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed(_))
    }

    /// The chained value, if the scenario passed
    pub fn value(self) -> Option<T> {
        match self {
            Outcome::Passed(value) => Some(value),
            _ => None,
        }
    }

}

impl<T> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed(_) => write!(f, "passed"),
            Outcome::Failed(detail) => write!(f, "failed: {}", detail),
            Outcome::Error(detail) => write!(f, "error: {}", detail),
        }
    }
}
