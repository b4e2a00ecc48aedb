use anyhow::{Result, bail};
use tracing::warn;

#[cfg(feature = "json")]
use anyhow::Context;
#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "json")]
use std::path::Path;

use crate::{
    actions::{Cadence, EmitterSpec, PhaseAction},
    phase::{BranchRule, Phase, PhaseId},
    playfield::Playfield,
};

// ============================================================================
// Boss Definition
// ============================================================================

// Skip to `phase` the first time health drops below `below` (a share of max health)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct HealthTrigger {
    pub below: f32,
    pub phase: PhaseId,
}

/// A boss as data: body, phase table and actor-level emitters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct BossDefinition {
    pub name: String,
    #[cfg_attr(feature = "json", serde(default))]
    pub playfield: Playfield,
    pub health: f32,
    pub spawn_x: f32,
    pub spawn_y: f32,
    // Degrees per second on top of any phase spin
    #[cfg_attr(feature = "json", serde(default))]
    pub flair_spin: f32,
    // Where an out-of-range branch target ends up
    #[cfg_attr(feature = "json", serde(default))]
    pub fallback_phase: PhaseId,
    pub phases: Vec<Phase>,
    // Armed for the whole encounter, independent of the phase
    #[cfg_attr(feature = "json", serde(default))]
    pub ambient: Vec<EmitterSpec>,
    #[cfg_attr(feature = "json", serde(default))]
    pub health_triggers: Vec<HealthTrigger>,
}

impl BossDefinition {
    // Reject tables the actor cannot run. Branch targets out of range are only warned about:
    // they are routed to the fallback phase at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("boss has no name");
        }
        if self.phases.is_empty() {
            bail!("boss '{}' has no phases", self.name);
        }
        if self.fallback_phase >= self.phases.len() {
            bail!(
                "boss '{}': fallback phase {} is out of range (only {} phases)",
                self.name,
                self.fallback_phase,
                self.phases.len()
            );
        }
        if !(self.health.is_finite() && self.health > 0.0) {
            bail!("boss '{}': health must be positive, got {}", self.name, self.health);
        }
        if !(self.playfield.width > 0.0 && self.playfield.height > 0.0) {
            bail!(
                "boss '{}': playfield must have a positive size, got {}x{}",
                self.name,
                self.playfield.width,
                self.playfield.height
            );
        }

        for emitter in &self.ambient {
            validate_emitter(emitter).map_err(|e| e.context(format!("boss '{}': ambient emitter", self.name)))?;
        }

        for (id, phase) in self.phases.iter().enumerate() {
            for action in &phase.enter {
                if let PhaseAction::Arm(emitter) = action {
                    validate_emitter(emitter)
                        .map_err(|e| e.context(format!("boss '{}': phase {} ({})", self.name, id, phase.name)))?;
                }
            }
            if phase.exit.iter().any(|action| matches!(action, PhaseAction::Arm(_))) {
                bail!(
                    "boss '{}': phase {} ({}) arms an emitter on exit",
                    self.name,
                    id,
                    phase.name
                );
            }
            for target in branch_targets(phase.branch) {
                if target >= self.phases.len() {
                    warn!(
                        "boss '{}': phase {} ({}) routes to missing phase {}, phase {} will be used instead",
                        self.name, id, phase.name, target, self.fallback_phase
                    );
                }
            }
        }

        for trigger in &self.health_triggers {
            if !(trigger.below > 0.0 && trigger.below < 1.0) {
                bail!(
                    "boss '{}': health trigger threshold {} is not between 0 and 1",
                    self.name,
                    trigger.below
                );
            }
            if trigger.phase >= self.phases.len() {
                bail!("boss '{}': health trigger targets missing phase {}", self.name, trigger.phase);
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn phase_id(&self, name: &str) -> Option<PhaseId> {
        self.phases.iter().position(|phase| phase.name == name)
    }
}

fn validate_emitter(emitter: &EmitterSpec) -> Result<()> {
    match emitter.cadence {
        Cadence::Once { .. } => {}
        Cadence::Every { interval_ms, .. } | Cadence::Times { interval_ms, .. } if interval_ms == 0 => {
            bail!("{} emitter repeats with a zero interval", emitter.pattern.name());
        }
        Cadence::Times { count: 0, .. } => {
            bail!("{} emitter fires zero times", emitter.pattern.name());
        }
        Cadence::Every { .. } | Cadence::Times { .. } => {}
    }
    Ok(())
}

fn branch_targets(branch: BranchRule) -> Vec<PhaseId> {
    match branch {
        BranchRule::Next | BranchRule::Terminal => Vec::new(),
        BranchRule::Goto { phase } => vec![phase],
        BranchRule::AfterVisits { then, otherwise, .. } => vec![then, otherwise],
    }
}

// ============================================================================
// Loading
// ============================================================================

#[cfg(feature = "json")]
impl BossDefinition {
    pub fn from_json(text: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(text).context("Failed to parse boss definition")?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to load boss from {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize boss definition")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bosses,
        patterns::{FanParams, Pattern},
    };

    fn minimal() -> BossDefinition {
        BossDefinition {
            name: "test".into(),
            playfield: Playfield::default(),
            health: 100.0,
            spawn_x: 0.0,
            spawn_y: 0.0,
            flair_spin: 0.0,
            fallback_phase: 0,
            phases: vec![Phase::new("A", 1000)],
            ambient: Vec::new(),
            health_triggers: Vec::new(),
        }
    }

    #[test]
    fn builtins_validate() {
        for name in bosses::BUILTIN_BOSSES {
            let definition = bosses::builtin(name);
            assert!(definition.is_ok(), "{name}: {definition:?}");
        }
        assert!(bosses::builtin("nope").is_err());
    }

    #[test]
    fn zero_interval_emitter_is_rejected() {
        let mut definition = minimal();
        definition.ambient.push(EmitterSpec::every(Pattern::Fan(FanParams::default()), 0));
        assert!(definition.validate().is_err());
    }

    #[test]
    fn arming_on_exit_is_rejected() {
        let mut definition = minimal();
        definition.phases[0]
            .exit
            .push(PhaseAction::Arm(EmitterSpec::once(Pattern::Fan(FanParams::default()), 0)));
        assert!(definition.validate().is_err());
    }

    #[test]
    fn missing_branch_target_is_allowed() {
        let mut definition = minimal();
        definition.phases[0].branch = BranchRule::Goto { phase: 9 };
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn bad_fallback_and_health_are_rejected() {
        let mut definition = minimal();
        definition.fallback_phase = 1;
        assert!(definition.validate().is_err());

        let mut definition = minimal();
        definition.health = 0.0;
        assert!(definition.validate().is_err());

        let mut definition = minimal();
        definition.health_triggers.push(HealthTrigger { below: 1.5, phase: 0 });
        assert!(definition.validate().is_err());
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_round_trip_keeps_the_table() {
        let Ok(star) = bosses::builtin("star") else {
            panic!("star missing");
        };
        let Ok(text) = star.to_json() else {
            panic!("star did not serialize");
        };
        let parsed = BossDefinition::from_json(&text);
        assert!(parsed.as_ref().is_ok_and(|parsed| *parsed == star), "{parsed:?}");
    }

    #[cfg(feature = "json")]
    #[test]
    fn hand_written_json_uses_defaults() {
        let text = r#"{
            "name": "tiny",
            "health": 50,
            "spawn_x": 640,
            "spawn_y": 100,
            "phases": [
                {
                    "name": "only",
                    "duration_ms": 2000,
                    "enter": [
                        { "action": "arm", "pattern": { "type": "fan" }, "cadence": { "type": "every", "interval_ms": 900 } },
                        { "action": "set_motion", "motion": { "type": "bounce", "speed": 80 } }
                    ]
                },
                { "name": "end", "branch": { "rule": "terminal" } }
            ]
        }"#;
        let parsed = BossDefinition::from_json(text);
        let Ok(definition) = parsed else {
            panic!("rejected: {parsed:?}");
        };
        assert_eq!(definition.playfield, Playfield::default());
        assert_eq!(definition.phases.len(), 2);
        assert!(definition.phases[1].is_terminal());
        assert_eq!(
            definition.phases[0].enter[0],
            PhaseAction::Arm(EmitterSpec::every(Pattern::Fan(FanParams::default()), 900))
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn malformed_json_is_an_error() {
        assert!(BossDefinition::from_json("{ \"name\": ").is_err());
        assert!(BossDefinition::from_json(r#"{"name":"x","health":1,"spawn_x":0,"spawn_y":0,"phases":[]}"#).is_err());
    }
}
