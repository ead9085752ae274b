use serde::Serialize;

/// Linear desktop lifecycle. Stages only move forward; `ShuttingDown` can be
/// entered from any earlier stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleStage {
    #[default]
    NotStarted,
    ProcessStarting,
    /// Backend launch attempted; window pending.
    ProcessRunning,
    WindowShown,
    ShuttingDown,
    Terminated,
}

impl LifecycleStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::ProcessStarting => "process starting",
            Self::ProcessRunning => "process running, window pending",
            Self::WindowShown => "window shown",
            Self::ShuttingDown => "shutting down",
            Self::Terminated => "terminated",
        }
    }

    fn successor(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::ProcessStarting),
            Self::ProcessStarting => Some(Self::ProcessRunning),
            Self::ProcessRunning => Some(Self::WindowShown),
            Self::WindowShown => Some(Self::ShuttingDown),
            Self::ShuttingDown => Some(Self::Terminated),
            Self::Terminated => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct LifecycleStateMachine {
    stage: LifecycleStage,
}

impl LifecycleStateMachine {
    pub fn stage(&self) -> LifecycleStage {
        self.stage
    }

    pub fn is_shutting_down(&self) -> bool {
        self.stage >= LifecycleStage::ShuttingDown
    }

    /// Moves to the direct successor stage. Shutdown stages go through
    /// [`Self::begin_shutdown`] and [`Self::mark_terminated`].
    pub fn advance(&mut self, next: LifecycleStage) -> Result<(), String> {
        if next >= LifecycleStage::ShuttingDown {
            return Err(format!(
                "Lifecycle stage '{}' is only reachable through shutdown.",
                next.as_str()
            ));
        }
        if self.stage.successor() != Some(next) {
            return Err(format!(
                "Invalid lifecycle transition: '{}' -> '{}'.",
                self.stage.as_str(),
                next.as_str()
            ));
        }
        self.stage = next;
        Ok(())
    }

    /// Returns true only for the call that actually entered shutdown.
    pub fn begin_shutdown(&mut self) -> bool {
        if self.is_shutting_down() {
            return false;
        }
        self.stage = LifecycleStage::ShuttingDown;
        true
    }

    pub fn mark_terminated(&mut self) -> bool {
        if self.stage != LifecycleStage::ShuttingDown {
            return false;
        }
        self.stage = LifecycleStage::Terminated;
        true
    }
}
