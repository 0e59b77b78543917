//! Wire protocol records.
//!
//! Every record travels as a single line of JSON. The three world entities
//! are told apart by their distinguishing id field (`wall`, `snake`,
//! `power`), the client command by its `moving` field; [`WireObject`]
//! captures that as an explicit sum type tried in priority order.

use crate::geometry::{Rect, Vec2D};
use crate::{HEAD_HALF, MAX_SEGMENT_EXTENT, POWERUP_HALF, WALL_PAD};
use serde::{Deserialize, Serialize};

/// A static axis-aligned wall segment. Sent once per client, at handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub wall: u32,
    pub p1: Vec2D,
    pub p2: Vec2D,
}

impl Wall {
    pub fn new(wall: u32, p1: Vec2D, p2: Vec2D) -> Self {
        Self { wall, p1, p2 }
    }

    /// Hitbox: the segment's bounding box padded to cover a snake's width.
    pub fn rect(&self) -> Rect {
        Rect::around_segment(self.p1, self.p2, WALL_PAD)
    }
}

/// A collectible powerup. `value` never crosses the wire; the server sets
/// it above 1 only for powerups dropped by a dead snake in Special mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub power: u32,
    pub loc: Vec2D,
    pub died: bool,
    #[serde(skip, default = "default_value")]
    pub value: i32,
}

fn default_value() -> i32 {
    1
}

impl Powerup {
    pub fn new(power: u32, loc: Vec2D) -> Self {
        Self {
            power,
            loc,
            died: false,
            value: 1,
        }
    }

    pub fn with_value(power: u32, loc: Vec2D, value: i32) -> Self {
        Self {
            power,
            loc,
            died: false,
            value,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::around_point(self.loc, POWERUP_HALF)
    }
}

/// A player's snake. The head is always the **last** point of `body`.
///
/// Fields after `join` are server-side simulation state and never
/// serialized; a deserialized snake gets their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    pub snake: u32,
    pub name: String,
    pub body: Vec<Vec2D>,
    pub dir: Vec2D,
    pub score: i32,
    pub died: bool,
    pub alive: bool,
    pub dc: bool,
    pub join: bool,

    /// Ticks elapsed since this snake died.
    #[serde(skip)]
    pub frames_after_death: u32,
    /// Remaining ticks of suspended tail shrink.
    #[serde(skip)]
    pub growth_left: i32,
    /// Set while a consumed powerup's growth is still pending.
    #[serde(skip)]
    pub ate_powerup: bool,
    /// Distance traveled since the last accepted turn.
    #[serde(skip)]
    pub distance_moved: f64,
    #[serde(skip, default = "default_can_turn")]
    pub can_turn: bool,
    /// Set once a `dc=true` record for this snake has been packaged into a
    /// broadcast, so cleanup may safely drop it.
    #[serde(skip)]
    pub dc_announced: bool,
    /// Per-segment hitboxes, nearest-the-head first.
    #[serde(skip)]
    pub segment_rects: Vec<Rect>,
    #[serde(skip)]
    pub head_rect: Rect,
}

fn default_can_turn() -> bool {
    true
}

impl Snake {
    pub fn new(snake: u32, name: String, body: Vec<Vec2D>, dir: Vec2D, join: bool) -> Self {
        let mut s = Self {
            snake,
            name,
            body,
            dir,
            score: 0,
            died: false,
            alive: true,
            dc: false,
            join,
            frames_after_death: 0,
            growth_left: 0,
            ate_powerup: false,
            distance_moved: 0.0,
            can_turn: true,
            dc_announced: false,
            segment_rects: Vec::new(),
            head_rect: Rect::default(),
        };
        s.rebuild_rects();
        s
    }

    pub fn head(&self) -> Vec2D {
        *self.body.last().unwrap_or(&Vec2D::default())
    }

    /// Recomputes the head hitbox and all segment hitboxes from `body`.
    /// Segments whose padded box reaches the wrap-guard extent are skipped.
    pub fn rebuild_rects(&mut self) {
        self.segment_rects.clear();
        for i in (0..self.body.len().saturating_sub(1)).rev() {
            let r = Rect::around_segment(self.body[i + 1], self.body[i], HEAD_HALF);
            if r.w < MAX_SEGMENT_EXTENT && r.h < MAX_SEGMENT_EXTENT {
                self.segment_rects.push(r);
            }
        }
        self.head_rect = Rect::around_point(self.head(), HEAD_HALF);
    }

    /// Death bookkeeping shared by every kill site: flags flip and the
    /// hitboxes are cleared in the same tick.
    pub fn kill(&mut self) {
        self.alive = false;
        self.died = true;
        self.segment_rects.clear();
        self.head_rect = Rect::default();
    }
}

/// The four movement commands a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn vector(self) -> Vec2D {
        match self {
            Direction::Up => Vec2D::new(0.0, -1.0),
            Direction::Down => Vec2D::new(0.0, 1.0),
            Direction::Left => Vec2D::new(-1.0, 0.0),
            Direction::Right => Vec2D::new(1.0, 0.0),
        }
    }
}

/// The single client→server record: `{"moving":"up"}` etc.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveCommand {
    pub moving: Direction,
}

/// Any record that may appear on the wire, decoded by trying each variant
/// in order: wall, then snake, then powerup, then move command. Lines that
/// match none of them fail to decode and are ignored by both endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireObject {
    Wall(Wall),
    Snake(Snake),
    Powerup(Powerup),
    Move(MoveCommand),
}
