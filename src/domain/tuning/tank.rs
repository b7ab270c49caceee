/// Per-class tuning for tanks and the projectiles they fire.
use super::ability::AbilityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TankClass {
    Sentinel,
    Guardian,
    Juggernaut,
    Shredder,
    Thunderbolt,
}

impl TankClass {
    pub const ALL: [TankClass; 5] = [
        TankClass::Sentinel,
        TankClass::Guardian,
        TankClass::Juggernaut,
        TankClass::Shredder,
        TankClass::Thunderbolt,
    ];

    pub fn tuning(self) -> ClassTuning {
        ClassTuning::for_class(self)
    }

    /// Abilities this class may activate.
    pub fn abilities(self) -> [AbilityKind; 3] {
        [AbilityKind::Dash, AbilityKind::Shield, self.tuning().signature]
    }

    pub fn has_ability(self, kind: AbilityKind) -> bool {
        self.abilities().contains(&kind)
    }
}

/// How a class's projectiles behave in flight and on impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponBehavior {
    Straight,
    /// Detonates on impact or expiry, damaging everything in the blast.
    AreaDamage { blast_radius: f32, splash_damage: i32 },
    /// Passes through targets, damaging at most `max_targets` distinct tanks.
    Piercing { max_targets: u32 },
    /// Always steers towards the nearest opposing tank.
    Homing,
    HighDamageSlow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileTuning {
    /// Travel speed in units per second.
    pub speed: f32,

    pub damage: i32,

    /// World-space collision radius.
    pub radius: f32,

    /// Lifetime in seconds before the projectile is despawned.
    pub lifetime: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassTuning {
    /// Movement speed in units per second.
    pub speed: f32,

    /// World-space collision radius.
    pub radius: f32,

    pub max_health: i32,

    /// Seconds between successful shots.
    pub fire_cooldown: f32,

    pub projectile: ProjectileTuning,
    pub behavior: WeaponBehavior,

    /// Class ability offered on top of dash and shield.
    pub signature: AbilityKind,
}

impl ClassTuning {
    pub fn for_class(class: TankClass) -> Self {
        match class {
            TankClass::Sentinel => Self {
                speed: 180.0,
                radius: 20.0,
                max_health: 100,
                fire_cooldown: 0.4,
                projectile: ProjectileTuning {
                    speed: 420.0,
                    damage: 10,
                    radius: 4.0,
                    lifetime: 1.5,
                },
                behavior: WeaponBehavior::Straight,
                signature: AbilityKind::Homing,
            },
            TankClass::Guardian => Self {
                speed: 160.0,
                radius: 22.0,
                max_health: 120,
                fire_cooldown: 0.5,
                projectile: ProjectileTuning {
                    speed: 320.0,
                    damage: 8,
                    radius: 4.0,
                    lifetime: 2.0,
                },
                behavior: WeaponBehavior::Homing,
                signature: AbilityKind::Decoy,
            },
            TankClass::Juggernaut => Self {
                speed: 120.0,
                radius: 26.0,
                max_health: 160,
                fire_cooldown: 1.2,
                projectile: ProjectileTuning {
                    speed: 240.0,
                    damage: 30,
                    radius: 8.0,
                    lifetime: 2.5,
                },
                behavior: WeaponBehavior::HighDamageSlow,
                signature: AbilityKind::Aoe,
            },
            TankClass::Shredder => Self {
                speed: 200.0,
                radius: 18.0,
                max_health: 90,
                fire_cooldown: 0.2,
                projectile: ProjectileTuning {
                    speed: 520.0,
                    damage: 7,
                    radius: 3.0,
                    lifetime: 1.0,
                },
                behavior: WeaponBehavior::Piercing { max_targets: 3 },
                signature: AbilityKind::Decoy,
            },
            TankClass::Thunderbolt => Self {
                speed: 170.0,
                radius: 20.0,
                max_health: 100,
                fire_cooldown: 0.9,
                projectile: ProjectileTuning {
                    speed: 300.0,
                    damage: 15,
                    radius: 6.0,
                    lifetime: 1.8,
                },
                behavior: WeaponBehavior::AreaDamage {
                    blast_radius: 70.0,
                    splash_damage: 12,
                },
                signature: AbilityKind::Aoe,
            },
        }
    }
}
