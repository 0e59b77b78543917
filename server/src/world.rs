//! The canonical world state: walls, powerups, and snakes, plus the staging
//! buffers the simulation drains at the start of each tick.
//!
//! Exactly one `World` exists per server process, owned by an
//! `Arc<tokio::sync::Mutex<_>>`; every reader and writer (tick update,
//! command application, join, disconnect) takes that one lock, so each tick
//! and each snapshot observes a consistent world.

use crate::config::Settings;
use shared::{encode, Powerup, Snake, Wall};
use std::collections::BTreeMap;

pub struct World {
    /// Edge length of the square world; coordinates span `[-size/2, size/2)`.
    pub size: i32,
    pub walls: BTreeMap<u32, Wall>,
    pub powerups: BTreeMap<u32, Powerup>,
    pub players: BTreeMap<u32, Snake>,

    /// Snakes created since the last tick (joins and respawns), merged into
    /// `players` at tick start so nothing mutates a map mid-iteration.
    pub pending_snakes: BTreeMap<u32, Snake>,
    /// Powerups dropped by dead snakes since the last tick.
    pub pending_powerups: BTreeMap<u32, Powerup>,

    /// Monotonic id source for death-drop powerups; ids below
    /// `max_powerups` are reserved for the respawning population.
    next_powerup_id: u32,
    /// Ticks accumulated toward the next powerup repopulation cycle.
    pub powerup_frames: u32,
    /// Countdown target, re-drawn from `[0, max_powerup_delay)` each cycle.
    pub powerup_spawn_target: u32,
    /// The initial powerup population is placed once, when the first
    /// client joins.
    pub powerups_seeded: bool,
}

impl World {
    pub fn new(settings: &Settings) -> Self {
        let walls = settings
            .walls()
            .into_iter()
            .map(|w| (w.wall, w))
            .collect();
        Self {
            size: settings.world_size,
            walls,
            powerups: BTreeMap::new(),
            players: BTreeMap::new(),
            pending_snakes: BTreeMap::new(),
            pending_powerups: BTreeMap::new(),
            next_powerup_id: settings.max_powerups as u32,
            powerup_frames: 0,
            powerup_spawn_target: 0,
            powerups_seeded: false,
        }
    }

    /// Claims a fresh powerup id. Never reused while a slot is occupied.
    pub fn alloc_powerup_id(&mut self) -> u32 {
        let id = self.next_powerup_id;
        self.next_powerup_id += 1;
        id
    }

    /// One wall record per line, sent once at handshake.
    pub fn encode_walls(&self) -> String {
        let mut out = String::new();
        for wall in self.walls.values() {
            out.push_str(&encode(wall));
        }
        out
    }

    /// Packages every powerup followed by every snake, one record per line,
    /// for a joining client's greeting. Read-only: the one-shot flags are
    /// owned by the per-tick broadcast, which goes to everyone.
    pub fn encode_join_snapshot(&self) -> String {
        let mut out = String::new();
        for powerup in self.powerups.values() {
            out.push_str(&encode(powerup));
        }
        for snake in self.players.values() {
            out.push_str(&encode(snake));
        }
        out
    }

    /// Packages every powerup followed by every snake, one record per line,
    /// as a single consistent snapshot for the per-tick broadcast. Each
    /// snake's one-shot `join` flag is cleared once packaged, and a
    /// disconnected snake is remembered as announced so cleanup may drop it
    /// next tick.
    pub fn encode_snapshot(&mut self) -> String {
        let mut out = String::new();
        for powerup in self.powerups.values() {
            out.push_str(&encode(powerup));
        }
        for snake in self.players.values_mut() {
            out.push_str(&encode(snake));
            if snake.join {
                snake.join = false;
            }
            if snake.dc {
                snake.dc_announced = true;
            }
        }
        out
    }
}
