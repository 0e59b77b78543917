//! Types shared between the snake server and its clients: the 2-D geometry
//! used for collision, the wire protocol records, and the newline-delimited
//! line codec.

pub mod codec;
pub mod geometry;
pub mod protocol;

pub use codec::{encode, LineBuffer};
pub use geometry::{Rect, Vec2D};
pub use protocol::{Direction, MoveCommand, Powerup, Snake, Wall, WireObject};

/// Rendered width of a snake, in world units. A snake may not turn again
/// until its head has traveled past this distance.
pub const SNAKE_WIDTH: f64 = 10.0;

/// Half-extent of a snake's head hitbox.
pub const HEAD_HALF: f64 = 5.0;

/// Half-extent of a powerup's hitbox.
pub const POWERUP_HALF: f64 = 8.0;

/// Padding added to each side of a wall segment's hitbox.
pub const WALL_PAD: f64 = 25.0;

/// Segment hitboxes at least this large in either extent are discarded;
/// they only arise from the synthetic vertices inserted at a world wrap.
pub const MAX_SEGMENT_EXTENT: f64 = 2000.0;

/// Distance between head and tail of a freshly spawned snake.
pub const SPAWN_LENGTH: f64 = 120.0;

/// Maximum accepted player name length; longer names are truncated.
pub const MAX_NAME_LEN: usize = 16;
