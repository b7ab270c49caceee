/// Specialist ability kinds and their timing/payload tuning.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityKind {
    Dash,
    Shield,
    Homing,
    Decoy,
    Aoe,
}

impl AbilityKind {
    pub const ALL: [AbilityKind; 5] = [
        AbilityKind::Dash,
        AbilityKind::Shield,
        AbilityKind::Homing,
        AbilityKind::Decoy,
        AbilityKind::Aoe,
    ];

    /// Stable slot index for per-kind arrays.
    pub fn index(self) -> usize {
        match self {
            AbilityKind::Dash => 0,
            AbilityKind::Shield => 1,
            AbilityKind::Homing => 2,
            AbilityKind::Decoy => 3,
            AbilityKind::Aoe => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityTuning {
    /// Seconds after activation before the ability can be used again.
    pub cooldown: f32,

    /// Seconds the effect stays active (and visible).
    pub duration: f32,

    /// Allows several simultaneous instances per tank.
    pub stackable: bool,
}

impl AbilityTuning {
    pub fn for_kind(kind: AbilityKind) -> Self {
        match kind {
            AbilityKind::Dash => Self {
                cooldown: 4.0,
                duration: 0.6,
                stackable: false,
            },
            AbilityKind::Shield => Self {
                cooldown: 10.0,
                duration: 3.0,
                stackable: false,
            },
            AbilityKind::Homing => Self {
                cooldown: 8.0,
                duration: 4.0,
                stackable: false,
            },
            AbilityKind::Decoy => Self {
                cooldown: 12.0,
                duration: 5.0,
                stackable: false,
            },
            AbilityKind::Aoe => Self {
                cooldown: 15.0,
                duration: 2.0,
                stackable: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashTuning {
    pub speed_multiplier: f32,

    /// Seconds from activation during which the tank ignores damage.
    pub invulnerable_for: f32,
}

impl Default for DashTuning {
    fn default() -> Self {
        Self {
            speed_multiplier: 2.5,
            invulnerable_for: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecoyTuning {
    pub count: usize,

    /// Max offset from the tank on each axis.
    pub spread: f32,
}

impl Default for DecoyTuning {
    fn default() -> Self {
        Self {
            count: 3,
            spread: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AoeTuning {
    pub radius: f32,
    pub damage: i32,

    /// Seconds between activation and the damage pulse.
    pub delay: f32,
}

impl Default for AoeTuning {
    fn default() -> Self {
        Self {
            radius: 120.0,
            damage: 40,
            delay: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomingTuning {
    /// Max heading change per tick, in degrees.
    pub turn_per_tick: f32,

    /// Targets further away than this are ignored.
    pub range: f32,
}

impl Default for HomingTuning {
    fn default() -> Self {
        Self {
            turn_per_tick: 6.0,
            range: 400.0,
        }
    }
}
