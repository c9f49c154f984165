use serde::Serialize;
use tracing::debug;

/// Non-terminal states a single request passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Received,
    Decoding,
    Preprocessing,
    Classifying,
    Ranking,
}

impl Stage {
    /// The stage that follows this one; `None` after `Ranking`.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Received => Some(Stage::Decoding),
            Stage::Decoding => Some(Stage::Preprocessing),
            Stage::Preprocessing => Some(Stage::Classifying),
            Stage::Classifying => Some(Stage::Ranking),
            Stage::Ranking => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Active(Stage),
    Completed,
    Failed { stage: Stage, reason: String },
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestState::Active(_))
    }
}

/// Drives one request through the stage sequence.
///
/// Stages can only be entered in order; once `Completed` or `Failed` the
/// tracker ignores further transitions.
#[derive(Debug)]
pub struct StageTracker {
    label: String,
    state: RequestState,
}

impl StageTracker {
    pub fn new(label: impl Into<String>) -> Self {
        StageTracker { label: label.into(), state: RequestState::Active(Stage::Received) }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Moves to the next stage, or to `Completed` after `Ranking`.
    pub fn advance(&mut self) -> &RequestState {
        if let RequestState::Active(stage) = self.state {
            self.state = match stage.next() {
                Some(next) => RequestState::Active(next),
                None => RequestState::Completed,
            };
            debug!(request = %self.label, state = ?self.state, "stage transition");
        }
        &self.state
    }

    /// Marks the request failed in its current stage.
    pub fn fail(&mut self, reason: impl Into<String>) -> &RequestState {
        if let RequestState::Active(stage) = self.state {
            self.state = RequestState::Failed { stage, reason: reason.into() };
            debug!(request = %self.label, state = ?self.state, "request failed");
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_every_stage_in_order() {
        let mut t = StageTracker::new("r");
        let mut seen = vec![t.state().clone()];
        while !t.state().is_terminal() {
            seen.push(t.advance().clone());
        }
        assert_eq!(seen, vec![
            RequestState::Active(Stage::Received),
            RequestState::Active(Stage::Decoding),
            RequestState::Active(Stage::Preprocessing),
            RequestState::Active(Stage::Classifying),
            RequestState::Active(Stage::Ranking),
            RequestState::Completed,
        ]);
    }

    #[test]
    fn failure_records_the_stage_and_is_terminal() {
        let mut t = StageTracker::new("r");
        t.advance();
        t.fail("corrupt");
        assert_eq!(
            t.state(),
            &RequestState::Failed { stage: Stage::Decoding, reason: "corrupt".into() }
        );
        t.advance();
        assert!(matches!(t.state(), RequestState::Failed { .. }));
    }
}
