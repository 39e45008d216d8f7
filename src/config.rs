//! Session configuration, loaded from environment variables.
//!
//! Every knob has a default; a missing or unparseable variable falls back to
//! it. Command-line flags override the environment (see `main`).

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use canvas::consts::{DEFAULT_GRID_SIZE, FOG_EXTENT};

const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_PLAYER_TICK_MS: u64 = 16;
const DEFAULT_FOG_ARTIFACT_SCALE: u32 = 1;
const DEFAULT_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_MAX_PLAYERS: usize = 4;

/// Tuning knobs for one tabletop session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Master loop period: render, ping decay and snapshot publish.
    pub tick_ms: u64,
    /// Player loop redraw period.
    pub player_tick_ms: u64,
    /// Side of the square fog raster, in world units.
    pub fog_extent: u32,
    /// Downsample factor for fog artifacts sent to players. 1 = full size.
    pub fog_artifact_scale: u32,
    /// Per-player sync queue depth. A full queue drops frames for that player.
    pub channel_capacity: usize,
    /// Player views that may be open at once.
    pub max_players: usize,
    /// Initial grid cell size in world units.
    pub grid_size: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            player_tick_ms: DEFAULT_PLAYER_TICK_MS,
            fog_extent: FOG_EXTENT,
            fog_artifact_scale: DEFAULT_FOG_ARTIFACT_SCALE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_players: DEFAULT_MAX_PLAYERS,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tick_ms: env_parse("TICK_MS", defaults.tick_ms).max(1),
            player_tick_ms: env_parse("PLAYER_TICK_MS", defaults.player_tick_ms).max(1),
            fog_extent: env_parse("FOG_EXTENT", defaults.fog_extent).max(1),
            fog_artifact_scale: env_parse("FOG_ARTIFACT_SCALE", defaults.fog_artifact_scale).max(1),
            channel_capacity: env_parse("CHANNEL_CAPACITY", defaults.channel_capacity).max(1),
            max_players: env_parse("MAX_PLAYERS", defaults.max_players),
            grid_size: env_parse("GRID_SIZE", defaults.grid_size).max(1),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
