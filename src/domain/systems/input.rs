// Applies one validated client intent to the owning tank.
//
// Every function returns false (and changes nothing) when the intent is
// rejected: missing or eliminated tank, cooldown pending, ability busy.

use crate::domain::state::{MoveIntent, PlayerIntent, TankId};
use crate::domain::store::EntityStore;
use crate::domain::systems::{abilities, weapons};
use crate::domain::tuning::{AbilityKind, RulesTuning};
use crate::domain::vector::{Vec2, normalize_degrees};

pub fn apply_intent(
    store: &mut EntityStore,
    rules: &RulesTuning,
    tank_id: TankId,
    intent: &PlayerIntent,
) -> bool {
    match *intent {
        PlayerIntent::Move { moving, direction } => apply_move(store, tank_id, moving, direction),
        PlayerIntent::Shoot => apply_fire(store, tank_id),
        PlayerIntent::Activate { ability, target } => {
            apply_activate(store, rules, tank_id, ability, target)
        }
    }
}

/// Sets the movement intent; the heading (aim) follows the direction.
pub fn apply_move(store: &mut EntityStore, tank_id: TankId, moving: bool, direction: f32) -> bool {
    if !direction.is_finite() {
        return false;
    }
    let Some(tank) = store.tank_mut(tank_id).filter(|t| t.alive) else {
        return false;
    };

    let direction = normalize_degrees(direction);
    tank.movement = MoveIntent { moving, direction };
    tank.heading = direction;
    true
}

pub fn apply_fire(store: &mut EntityStore, tank_id: TankId) -> bool {
    weapons::shoot(store, tank_id).is_some()
}

pub fn apply_activate(
    store: &mut EntityStore,
    rules: &RulesTuning,
    tank_id: TankId,
    ability: AbilityKind,
    target: Option<Vec2>,
) -> bool {
    abilities::activate(store, rules, tank_id, ability, target).is_some()
}
