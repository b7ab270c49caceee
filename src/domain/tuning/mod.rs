/// Gameplay tuning.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).
pub mod ability;
pub mod rules;
pub mod tank;

pub use ability::{AbilityKind, AbilityTuning, AoeTuning, DashTuning, DecoyTuning, HomingTuning};
pub use rules::RulesTuning;
pub use tank::{ClassTuning, ProjectileTuning, TankClass, WeaponBehavior};
