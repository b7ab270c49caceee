// Simulation systems; each runs over the entity store once per tick.

pub mod abilities;
pub mod combat;
pub mod input;
pub mod movement;
pub mod weapons;
