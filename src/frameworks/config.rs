use crate::domain::{Arena, ArenaError};
use std::{env, str::FromStr, time::Duration};

// Runtime/server settings (not gameplay tuning; that lives in `domain::tuning`).

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_TICK_RATE_HZ: u32 = 30;
pub const DEFAULT_ARENA_WIDTH: f32 = 1600.0;
pub const DEFAULT_ARENA_HEIGHT: f32 = 900.0;

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub fn http_port() -> u16 {
    env_or("ARENA_SERVER_PORT", DEFAULT_PORT)
}

pub fn tick_rate_hz() -> u32 {
    // Zero would mean an infinite interval.
    env_or("ARENA_TICK_RATE_HZ", DEFAULT_TICK_RATE_HZ).clamp(1, 240)
}

pub fn tick_interval() -> Duration {
    tick_interval_for(tick_rate_hz())
}

pub fn tick_interval_for(rate_hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(rate_hz.max(1)))
}

pub fn arena() -> Result<Arena, ArenaError> {
    Arena::new(
        env_or("ARENA_WIDTH", DEFAULT_ARENA_WIDTH),
        env_or("ARENA_HEIGHT", DEFAULT_ARENA_HEIGHT),
    )
}

/// Fixed seed for reproducible runs; random when unset.
pub fn seed() -> u64 {
    env::var("ARENA_SEED")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(rand::random)
}
