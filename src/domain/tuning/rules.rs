/// Match-wide rules shared by every system.
use super::ability::{AbilityKind, AbilityTuning, AoeTuning, DashTuning, DecoyTuning, HomingTuning};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulesTuning {
    /// Seconds an eliminated tank waits before respawning.
    pub respawn_delay: f32,

    /// Score awarded to the last attacker of an eliminated tank.
    pub kill_score: u32,

    /// Visual radius for non-area projectile impacts.
    pub impact_explosion_radius: f32,

    /// Seconds an explosion record stays in the broadcast stream.
    pub explosion_duration: f32,

    /// Indexed by `AbilityKind::index`.
    pub abilities: [AbilityTuning; 5],

    pub dash: DashTuning,
    pub decoy: DecoyTuning,
    pub aoe: AoeTuning,
    pub homing: HomingTuning,
}

impl RulesTuning {
    pub fn ability(&self, kind: AbilityKind) -> &AbilityTuning {
        &self.abilities[kind.index()]
    }

    pub fn ability_mut(&mut self, kind: AbilityKind) -> &mut AbilityTuning {
        &mut self.abilities[kind.index()]
    }
}

impl Default for RulesTuning {
    fn default() -> Self {
        Self {
            respawn_delay: 3.0,
            kill_score: 1,
            impact_explosion_radius: 12.0,
            explosion_duration: 0.5,
            abilities: AbilityKind::ALL.map(AbilityTuning::for_kind),
            dash: DashTuning::default(),
            decoy: DecoyTuning::default(),
            aoe: AoeTuning::default(),
            homing: HomingTuning::default(),
        }
    }
}
