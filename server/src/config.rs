//! Server settings, loaded once at startup from a JSON file.
//!
//! Every field is individually optional; anything missing (or an unreadable
//! file) falls back to the defaults below, so a bare server still runs.

use log::warn;
use serde::Deserialize;
use shared::{Vec2D, Wall};
use std::path::Path;

/// Scoring and growth policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Mode {
    /// Every powerup is worth one point and a fixed amount of growth.
    #[default]
    Standard,
    /// Powerups carry a value; dead snakes drop their score as a powerup.
    Special,
}

/// One wall entry in the settings file.
#[derive(Debug, Clone, Deserialize)]
pub struct WallConfig {
    pub id: u32,
    pub p1: Vec2D,
    pub p2: Vec2D,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    /// Tick period in milliseconds.
    pub ms_per_frame: u64,
    /// Ticks a snake stays dead before respawning.
    pub respawn_rate: u32,
    /// Edge length of the square world.
    pub world_size: i32,
    /// World units a snake advances per tick.
    pub snake_speed: f64,
    /// Growth ticks granted per powerup in Standard mode.
    pub snake_growth: i32,
    /// Powerup population cap.
    pub max_powerups: usize,
    /// Upper bound for the random powerup respawn countdown, in ticks.
    pub max_powerup_delay: u32,
    pub walls: Vec<WallConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Standard,
            ms_per_frame: 34,
            respawn_rate: 300,
            world_size: 2000,
            snake_speed: 6.0,
            snake_growth: 24,
            max_powerups: 20,
            max_powerup_delay: 75,
            walls: Vec::new(),
        }
    }
}

/// Smallest world the spawn and powerup placement math supports.
const MIN_WORLD_SIZE: i32 = 100;

impl Settings {
    /// Loads settings from `path`, defaulting everything on any failure.
    /// A configured world smaller than [`MIN_WORLD_SIZE`] is clamped.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not read {}: {}. Using defaults.", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str::<Settings>(&text) {
            Ok(mut settings) => {
                if settings.world_size < MIN_WORLD_SIZE {
                    warn!(
                        "world_size {} is below the minimum; clamping to {}.",
                        settings.world_size, MIN_WORLD_SIZE
                    );
                    settings.world_size = MIN_WORLD_SIZE;
                }
                settings
            }
            Err(e) => {
                warn!("Could not parse {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Walls as protocol entities, keyed by their configured ids.
    pub fn walls(&self) -> Vec<Wall> {
        self.walls
            .iter()
            .map(|w| Wall::new(w.id, w.p1, w.p2))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.mode, Mode::Standard);
        assert_eq!(s.ms_per_frame, 34);
        assert_eq!(s.respawn_rate, 300);
        assert_eq!(s.world_size, 2000);
        assert_eq!(s.snake_speed, 6.0);
        assert_eq!(s.snake_growth, 24);
        assert_eq!(s.max_powerups, 20);
        assert_eq!(s.max_powerup_delay, 75);
        assert!(s.walls.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{"mode":"Special","world_size":1500}"#).unwrap();
        assert_eq!(s.mode, Mode::Special);
        assert_eq!(s.world_size, 1500);
        assert_eq!(s.ms_per_frame, 34);
        assert_eq!(s.max_powerups, 20);
    }

    #[test]
    fn test_wall_parsing() {
        let s: Settings = serde_json::from_str(
            r#"{"walls":[{"id":0,"p1":{"x":-575,"y":0},"p2":{"x":575,"y":0}}]}"#,
        )
        .unwrap();
        let walls = s.walls();
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].wall, 0);
        assert_eq!(walls[0].p1.x, -575.0);
    }

    #[test]
    fn test_missing_file_defaults() {
        let s = Settings::load(Path::new("/nonexistent/settings.json"));
        assert_eq!(s.world_size, 2000);
    }

    #[test]
    fn test_tiny_world_size_clamped() {
        let path = std::env::temp_dir().join("snake-settings-tiny-world.json");
        std::fs::write(&path, r#"{"world_size":5}"#).unwrap();
        let s = Settings::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(s.world_size, MIN_WORLD_SIZE);
    }
}
