//! Client-side mirror of the server's world.
//!
//! The server is authoritative; the client never simulates. Each decoded
//! record either upserts an entity into the mirror or, when its removal
//! flag is set, deletes it.

use std::collections::HashMap;

use shared::{Powerup, Snake, Wall, WireObject};

/// The most recent picture of the arena as reported by the server.
#[derive(Debug, Default)]
pub struct MirrorWorld {
    pub size: f64,
    pub walls: HashMap<u32, Wall>,
    pub powerups: HashMap<u32, Powerup>,
    pub snakes: HashMap<u32, Snake>,
}

impl MirrorWorld {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            walls: HashMap::new(),
            powerups: HashMap::new(),
            snakes: HashMap::new(),
        }
    }

    /// Applies one decoded wire record. A snake with `dc` set and a
    /// powerup with `died` set are removals; everything else replaces the
    /// stored entity wholesale. Move commands never reach the client and
    /// are ignored.
    pub fn apply(&mut self, object: WireObject) {
        match object {
            WireObject::Wall(wall) => {
                self.walls.insert(wall.wall, wall);
            }
            WireObject::Snake(snake) => {
                if snake.dc {
                    self.snakes.remove(&snake.snake);
                } else {
                    self.snakes.insert(snake.snake, snake);
                }
            }
            WireObject::Powerup(powerup) => {
                if powerup.died {
                    self.powerups.remove(&powerup.power);
                } else {
                    self.powerups.insert(powerup.power, powerup);
                }
            }
            WireObject::Move(_) => {}
        }
    }

    /// One-line summary for logging, e.g. `2 snakes, 20 powerups [Bob=9, Ann=2]`.
    pub fn summary(&self) -> String {
        let mut scores: Vec<(&str, i32, bool)> = self
            .snakes
            .values()
            .map(|s| (s.name.as_str(), s.score, s.alive))
            .collect();
        scores.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        let board: Vec<String> = scores
            .iter()
            .map(|(name, score, alive)| {
                if *alive {
                    format!("{}={}", name, score)
                } else {
                    format!("{}={} (dead)", name, score)
                }
            })
            .collect();
        format!(
            "{} snakes, {} powerups [{}]",
            self.snakes.len(),
            self.powerups.len(),
            board.join(", ")
        )
    }
}
