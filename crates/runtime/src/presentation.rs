//! `tracing`-backed collaborators and outcome presentation.
//!
//! Presentation runs after an outcome has been applied. It only reads the
//! outcome and the presentation layer, so a missing render anchor can never
//! hold back a state change.

use battle_core::{
    ActionOutcome, BattleState, CombatLog, CombatantId, LogSeverity, Mutation, Presentation,
    StatusKind, StatusTeardown, TargetDescriptor, VisualCue,
};
use tracing::{debug, error, info, warn};

/// Forwards combat log lines to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingCombatLog;

impl CombatLog for TracingCombatLog {
    fn add(&mut self, message: &str, severity: LogSeverity) {
        match severity {
            LogSeverity::Info => info!(target: "battle::combat_log", "{message}"),
            LogSeverity::Warning => warn!(target: "battle::combat_log", "{message}"),
            LogSeverity::Error => error!(target: "battle::combat_log", "{message}"),
        }
    }
}

/// Logs every death teardown and remembers it.
#[derive(Clone, Debug, Default)]
pub struct TracingTeardown {
    pub torn_down: Vec<(CombatantId, StatusKind)>,
}

impl StatusTeardown for TracingTeardown {
    fn on_teardown(&mut self, owner: CombatantId, kind: StatusKind) {
        debug!(owner = %owner, kind = kind.as_str(), "status torn down on death");
        self.torn_down.push((owner, kind));
    }
}

fn name_of<'a>(state: &'a BattleState, who: &TargetDescriptor) -> &'a str {
    state
        .combatant(who)
        .map(|combatant| combatant.name.as_str())
        .unwrap_or("unknown")
}

/// Human-readable lines for an outcome framed for `state`'s peer.
pub fn narrate(state: &BattleState, outcome: &ActionOutcome) -> Vec<String> {
    let ability = outcome.event_type();
    let caster = name_of(state, &outcome.caster);
    let mut lines = vec![format!("{caster} casts {ability}")];

    for report in &outcome.reports {
        let target = name_of(state, &report.target);
        if report.resisted {
            lines.push(format!("{target} resists {ability}"));
        }
        if report.redirected {
            lines.push(format!("{target} turns {ability} back on {caster}"));
        }
        if report.heal_blocked {
            lines.push(format!("{target} cannot be healed"));
        }
        if report.damage > 0 {
            lines.push(format!("{target} takes {} damage", report.damage));
        }
        if report.healed > 0 {
            lines.push(format!("{target} recovers {} HP", report.healed));
        }
        if report.shield > 0 {
            lines.push(format!("{target} gains a {} point shield", report.shield));
        }
        if report.stacks > 0 {
            lines.push(format!("{target} gains {} status stacks", report.stacks));
        }
        if report.retaliation > 0 {
            lines.push(format!(
                "{caster} takes {} reactive damage from {target}",
                report.retaliation
            ));
        }
        if report.died {
            lines.push(format!("{target} dies"));
        }
    }
    lines
}

fn cues_for(outcome: &ActionOutcome, target: &TargetDescriptor) -> Vec<VisualCue> {
    let Some(report) = outcome.reports.iter().find(|r| &r.target == target) else {
        return Vec::new();
    };
    let mut cues = Vec::new();
    if report.resisted {
        cues.push(VisualCue::Resisted);
    }
    if report.redirected {
        cues.push(VisualCue::Redirected);
    }
    if report.damage > 0 {
        cues.push(VisualCue::Hit {
            amount: report.damage,
        });
    }
    if report.healed > 0 {
        cues.push(VisualCue::Healed {
            amount: report.healed,
        });
    }
    cues.extend(outcome.mutations.iter().filter_map(|mutation| match mutation {
        Mutation::ApplyStacks { target: t, kind, .. } if t == target => {
            Some(VisualCue::Status(*kind))
        }
        _ => None,
    }));
    cues
}

/// Plays the visuals for an applied outcome.
///
/// Returns how many combatants had no render anchor. Each miss is logged as a
/// warning; the remaining visuals still play.
pub fn present(
    presentation: &mut dyn Presentation,
    log: &mut dyn CombatLog,
    outcome: &ActionOutcome,
) -> usize {
    let mut missing = 0;

    let mut play = |who: &TargetDescriptor, cues: Vec<VisualCue>| {
        if cues.is_empty() {
            return;
        }
        match presentation.locate(who) {
            Some(anchor) => {
                for cue in cues {
                    presentation.animate(anchor, cue);
                }
            }
            None => {
                missing += 1;
                warn!(combatant = %who, ability = outcome.event_type(), "no render anchor");
                log.add(
                    &format!("no render anchor for {who}; skipping visuals"),
                    LogSeverity::Warning,
                );
            }
        }
    };

    play(&outcome.caster, vec![VisualCue::Cast(outcome.ability)]);
    for target in &outcome.targets {
        play(target, cues_for(outcome, target));
    }
    missing
}
