use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One step of a verification scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Open the app and wait for its heading
    Load,
    /// Submit a task through the editor input and see it listed
    AddTask,
    /// Move focus off every editable element
    ReleaseFocus,
    /// Send the undo chord and wait for the notification
    Undo,
    /// Confirm the task left the list
    VerifyRemoved,
    /// Send the undo chord while the editor is focused and expect nothing
    GuardedShortcut,
}

impl Phase {
    /// Failure reported when this phase does not complete
    pub fn failure_kind(self) -> FailureKind {
        match self {
            Phase::Load => FailureKind::LoadFailure,
            Phase::AddTask => FailureKind::TaskNotAdded,
            Phase::ReleaseFocus | Phase::Undo => FailureKind::UndoNotAcknowledged,
            Phase::VerifyRemoved => FailureKind::TaskNotRemoved,
            Phase::GuardedShortcut => FailureKind::ShortcutNotGuarded,
        }
    }

    /// File name of the diagnostic screenshot when this phase fails
    pub fn screenshot_name(self) -> &'static str {
        match self {
            Phase::ReleaseFocus => "verification_focus_release_fail.png",
            other => other.failure_kind().screenshot_name(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::AddTask => "add_task",
            Phase::ReleaseFocus => "release_focus",
            Phase::Undo => "undo",
            Phase::VerifyRemoved => "verify_removed",
            Phase::GuardedShortcut => "guarded_shortcut",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    LoadFailure,
    TaskNotAdded,
    UndoNotAcknowledged,
    TaskNotRemoved,
    ShortcutNotGuarded,
}

impl FailureKind {
    /// File name of the diagnostic screenshot for this failure
    pub fn screenshot_name(self) -> &'static str {
        match self {
            FailureKind::LoadFailure => "verification_load_fail.png",
            FailureKind::TaskNotAdded => "verification_task_add_fail.png",
            FailureKind::UndoNotAcknowledged => "verification_toast_fail.png",
            FailureKind::TaskNotRemoved => "verification_task_remove_fail.png",
            FailureKind::ShortcutNotGuarded => "verification_focus_guard_fail.png",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FailureKind::LoadFailure => "initial load failed or auth required",
            FailureKind::TaskNotAdded => "task did not appear after submission",
            FailureKind::UndoNotAcknowledged => "undo notification did not appear",
            FailureKind::TaskNotRemoved => "task still visible after undo",
            FailureKind::ShortcutNotGuarded => "undo shortcut fired while the editor had focus",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::LoadFailure => "LoadFailure",
            FailureKind::TaskNotAdded => "TaskNotAddedFailure",
            FailureKind::UndoNotAcknowledged => "UndoNotAcknowledgedFailure",
            FailureKind::TaskNotRemoved => "TaskNotRemovedFailure",
            FailureKind::ShortcutNotGuarded => "ShortcutNotGuardedFailure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseOutcome {
    Passed,
    Failed { kind: FailureKind, detail: String },
    /// Not attempted because an earlier phase failed
    Skipped,
}

impl PhaseOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, PhaseOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    #[serde(flatten)]
    pub outcome: PhaseOutcome,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl PhaseRecord {
    pub fn skipped(phase: Phase) -> Self {
        Self {
            phase,
            outcome: PhaseOutcome::Skipped,
            duration_ms: 0,
            screenshot: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_per_phase() {
        assert_eq!(Phase::Load.failure_kind(), FailureKind::LoadFailure);
        assert_eq!(Phase::AddTask.failure_kind(), FailureKind::TaskNotAdded);
        assert_eq!(Phase::ReleaseFocus.failure_kind(), FailureKind::UndoNotAcknowledged);
        assert_eq!(Phase::Undo.failure_kind(), FailureKind::UndoNotAcknowledged);
        assert_eq!(Phase::VerifyRemoved.failure_kind(), FailureKind::TaskNotRemoved);
    }

    #[test]
    fn test_screenshot_names_match_failure_modes() {
        assert_eq!(FailureKind::LoadFailure.screenshot_name(), "verification_load_fail.png");
        assert_eq!(
            FailureKind::UndoNotAcknowledged.screenshot_name(),
            "verification_toast_fail.png"
        );
    }

    #[test]
    fn test_focus_precondition_has_its_own_screenshot() {
        assert_eq!(
            Phase::ReleaseFocus.screenshot_name(),
            "verification_focus_release_fail.png"
        );
        assert_eq!(Phase::Undo.screenshot_name(), "verification_toast_fail.png");
        assert_eq!(Phase::Load.screenshot_name(), "verification_load_fail.png");
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = PhaseRecord {
            phase: Phase::Undo,
            outcome: PhaseOutcome::Failed {
                kind: FailureKind::UndoNotAcknowledged,
                detail: "timed out".to_string(),
            },
            duration_ms: 3000,
            screenshot: Some(PathBuf::from("verification_toast_fail.png")),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["phase"], "undo");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "UndoNotAcknowledged");
        assert_eq!(json["screenshot"], "verification_toast_fail.png");

        let skipped = serde_json::to_value(PhaseRecord::skipped(Phase::VerifyRemoved)).unwrap();
        assert_eq!(skipped["status"], "skipped");
        assert!(skipped.get("screenshot").is_none());
    }
}
