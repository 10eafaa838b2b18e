#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Upload,
    Process,
}

impl FlowKind {
    /// Verb used in fallback status messages ("Upload failed (500)").
    pub fn action(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::Process => "Processing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowResult {
    Succeeded,
    Failed,
}

/// `Idle -> Active -> Done -> Active -> ...`
///
/// A flow can only be entered when it is not already active, and only an
/// active flow can be finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Active,
    Done(FlowResult),
}

impl FlowState {
    pub fn is_busy(self) -> bool {
        self == Self::Active
    }

    #[must_use]
    pub fn begin(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        *self = Self::Active;
        true
    }

    pub fn finish(&mut self, result: FlowResult) -> bool {
        if !self.is_busy() {
            return false;
        }
        *self = Self::Done(result);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_is_refused_while_active() {
        let mut state = FlowState::default();
        assert!(state.begin());
        assert!(state.is_busy());
        assert!(!state.begin());
        assert_eq!(state, FlowState::Active);
    }

    #[test]
    fn finish_only_applies_to_active_flow() {
        let mut state = FlowState::Idle;
        assert!(!state.finish(FlowResult::Succeeded));
        assert_eq!(state, FlowState::Idle);

        assert!(state.begin());
        assert!(state.finish(FlowResult::Failed));
        assert_eq!(state, FlowState::Done(FlowResult::Failed));
        assert!(!state.is_busy());

        assert!(!state.finish(FlowResult::Succeeded));
        assert_eq!(state, FlowState::Done(FlowResult::Failed));
    }

    #[test]
    fn done_flow_can_run_again() {
        let mut state = FlowState::Done(FlowResult::Succeeded);
        assert!(state.begin());
        assert!(state.finish(FlowResult::Succeeded));
    }
}
