//! Payment state machine.

use serde::{Deserialize, Serialize};

/// The state of a payment in its lifecycle.
///
/// State transitions:
/// ```text
/// New ──► Requested ──► Successful
/// ```
/// Transitions only move forward and never skip a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentState {
    /// Built but not yet sent to the processor.
    #[default]
    New,

    /// Handed to the processor, awaiting confirmation.
    Requested,

    /// Confirmed by the processor (terminal state).
    Successful,
}

impl PaymentState {
    /// Returns true if the payment can be requested in this state.
    pub fn can_request(&self) -> bool {
        matches!(self, PaymentState::New)
    }

    /// Returns true if the payment can be marked successful in this state.
    pub fn can_mark_successful(&self) -> bool {
        matches!(self, PaymentState::Requested)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentState::Successful)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::New => "New",
            PaymentState::Requested => "Requested",
            PaymentState::Successful => "Successful",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_new() {
        assert_eq!(PaymentState::default(), PaymentState::New);
    }

    #[test]
    fn only_new_can_be_requested() {
        assert!(PaymentState::New.can_request());
        assert!(!PaymentState::Requested.can_request());
        assert!(!PaymentState::Successful.can_request());
    }

    #[test]
    fn only_requested_can_be_marked_successful() {
        assert!(!PaymentState::New.can_mark_successful());
        assert!(PaymentState::Requested.can_mark_successful());
        assert!(!PaymentState::Successful.can_mark_successful());
    }

    #[test]
    fn successful_is_the_only_terminal_state() {
        assert!(!PaymentState::New.is_terminal());
        assert!(!PaymentState::Requested.is_terminal());
        assert!(PaymentState::Successful.is_terminal());
    }

    #[test]
    fn display() {
        assert_eq!(PaymentState::New.to_string(), "New");
        assert_eq!(PaymentState::Requested.to_string(), "Requested");
        assert_eq!(PaymentState::Successful.to_string(), "Successful");
    }
}
