//! Pipeline state machine
//!
//! ```text
//! INIT -> POLICY_LOADED -> ROWS_FETCHED -> MASKED -> WRITTEN -> DONE
//! ROWS_FETCHED -> DONE    (no rows)
//! MASKED -> DONE          (dry run)
//! any non-terminal state -> FAILED
//! ```

use serde::Serialize;
use std::fmt;

/// State of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Init,
    PolicyLoaded,
    RowsFetched,
    Masked,
    Written,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// Whether `next` directly follows `self`
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Done | Failed, _) => false,
            (_, Failed) => true,
            (Init, PolicyLoaded)
            | (PolicyLoaded, RowsFetched)
            | (RowsFetched, Masked)
            | (RowsFetched, Done)
            | (Masked, Written)
            | (Masked, Done)
            | (Written, Done) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Init => "INIT",
            PipelineState::PolicyLoaded => "POLICY_LOADED",
            PipelineState::RowsFetched => "ROWS_FETCHED",
            PipelineState::Masked => "MASKED",
            PipelineState::Written => "WRITTEN",
            PipelineState::Done => "DONE",
            PipelineState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current state plus every state visited, with each transition logged
#[derive(Debug, Clone)]
pub struct StateTracker {
    current: PipelineState,
    history: Vec<PipelineState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            current: PipelineState::Init,
            history: vec![PipelineState::Init],
        }
    }

    pub fn current(&self) -> PipelineState {
        self.current
    }

    /// States visited so far, starting with `INIT`
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Move to `next`
    ///
    /// Transitions the state machine does not allow are logged and ignored,
    /// so a finished run can never change state again.
    pub fn transition(&mut self, next: PipelineState) -> bool {
        if !self.current.can_transition_to(next) {
            tracing::warn!(from = %self.current, to = %next, "Ignoring invalid state transition");
            return false;
        }

        tracing::info!(from = %self.current, to = %next, "Pipeline state transition");
        self.current = next;
        self.history.push(next);
        true
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(PipelineState::Init, PipelineState::PolicyLoaded, true; "init to policy loaded")]
    #[test_case(PipelineState::RowsFetched, PipelineState::Done, true; "no rows short circuit")]
    #[test_case(PipelineState::Masked, PipelineState::Done, true; "dry run skips write")]
    #[test_case(PipelineState::PolicyLoaded, PipelineState::Done, false; "cannot finish before fetch")]
    #[test_case(PipelineState::Init, PipelineState::Masked, false; "cannot skip fetch")]
    #[test_case(PipelineState::Written, PipelineState::Failed, true; "fail late")]
    #[test_case(PipelineState::Done, PipelineState::Failed, false; "done is terminal")]
    #[test_case(PipelineState::Failed, PipelineState::Init, false; "failed is terminal")]
    fn test_transitions(from: PipelineState, to: PipelineState, allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_tracker_records_history() {
        let mut tracker = StateTracker::new();
        assert!(tracker.transition(PipelineState::PolicyLoaded));
        assert!(tracker.transition(PipelineState::Failed));
        assert!(!tracker.transition(PipelineState::RowsFetched));

        assert_eq!(tracker.current(), PipelineState::Failed);
        assert_eq!(
            tracker.history(),
            &[
                PipelineState::Init,
                PipelineState::PolicyLoaded,
                PipelineState::Failed
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(PipelineState::RowsFetched.to_string(), "ROWS_FETCHED");
        assert_eq!(
            serde_json::to_value(PipelineState::PolicyLoaded).unwrap(),
            "POLICY_LOADED"
        );
    }
}
