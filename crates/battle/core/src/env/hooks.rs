//! Side-effect collaborators: combat log, teardown hooks and presentation.

use crate::action::AbilityId;
use crate::state::{CombatantId, StatusKind, TargetDescriptor};

/// Severity of a combat log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogSeverity {
    Info,
    Warning,
    Error,
}

/// Human-readable combat log owned by the embedding application.
pub trait CombatLog {
    fn add(&mut self, message: &str, severity: LogSeverity);
}

/// Discards every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCombatLog;

impl CombatLog for NullCombatLog {
    fn add(&mut self, _message: &str, _severity: LogSeverity) {}
}

/// Keeps every message in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryCombatLog {
    pub entries: Vec<(LogSeverity, String)>,
}

impl MemoryCombatLog {
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(severity, _)| *severity == LogSeverity::Warning)
            .map(|(_, message)| message.as_str())
    }
}

impl CombatLog for MemoryCombatLog {
    fn add(&mut self, message: &str, severity: LogSeverity) {
        self.entries.push((severity, message.to_owned()));
    }
}

/// Cleanup for status kinds flagged `TEARDOWN_ON_DEATH`.
///
/// Invoked once per flagged record when its holder dies, before the record is
/// dropped. Runs on both peers.
pub trait StatusTeardown {
    fn on_teardown(&mut self, owner: CombatantId, kind: StatusKind);
}

/// Teardown hook that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTeardown;

impl StatusTeardown for NoTeardown {
    fn on_teardown(&mut self, _owner: CombatantId, _kind: StatusKind) {}
}

/// Where a combatant is drawn on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderAnchor {
    pub x: f32,
    pub y: f32,
}

/// Visual request emitted after an outcome lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualCue {
    Cast(AbilityId),
    Hit { amount: u32 },
    Healed { amount: u32 },
    Resisted,
    Redirected,
    Status(StatusKind),
}

/// Rendering layer. Resolution never depends on it; a missing anchor only
/// skips the visual.
pub trait Presentation {
    fn locate(&self, target: &TargetDescriptor) -> Option<RenderAnchor>;

    fn animate(&mut self, _anchor: RenderAnchor, _cue: VisualCue) {}
}

/// Headless presentation with no anchors.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPresentation;

impl Presentation for NoPresentation {
    fn locate(&self, _target: &TargetDescriptor) -> Option<RenderAnchor> {
        None
    }
}
