use std::fmt;

use crate::event::{RunEvent, RunEventKind};

/// `Created -> InputSetBuilt -> Validated -> Processed -> Saved -> Done`;
/// `Failed` es absorbente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Created,
    InputSetBuilt,
    Validated,
    Processed,
    Saved,
    Done,
    Failed,
}

impl RunState {
    /// Reconstruye el estado a partir de los eventos de una ejecución.
    pub fn replay(events: &[RunEvent]) -> RunState {
        events.iter().fold(RunState::Created, |state, ev| state.apply(&ev.kind))
    }

    pub fn apply(self, kind: &RunEventKind) -> RunState {
        if self == RunState::Failed {
            return self;
        }
        match kind {
            RunEventKind::RunStarted { .. } | RunEventKind::SettingIgnored { .. } => self,
            RunEventKind::InputSetBuilt { .. } => RunState::InputSetBuilt,
            RunEventKind::Validated { .. } => RunState::Validated,
            RunEventKind::Processed { .. } => RunState::Processed,
            RunEventKind::ProductSaved { .. } => RunState::Saved,
            RunEventKind::RunCompleted { .. } => RunState::Done,
            RunEventKind::RunFailed { .. } => RunState::Failed,
        }
    }

    /// Siguiente estado del camino feliz. `Done` y `Failed` no avanzan.
    pub fn advance(&mut self) {
        *self = match *self {
            RunState::Created => RunState::InputSetBuilt,
            RunState::InputSetBuilt => RunState::Validated,
            RunState::Validated => RunState::Processed,
            RunState::Processed => RunState::Saved,
            RunState::Saved | RunState::Done => RunState::Done,
            RunState::Failed => RunState::Failed,
        };
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Created => "CREATED",
            RunState::InputSetBuilt => "INPUTSET-BUILT",
            RunState::Validated => "VALIDATED",
            RunState::Processed => "PROCESSED",
            RunState::Saved => "SAVED",
            RunState::Done => "DONE",
            RunState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}
