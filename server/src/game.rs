//! The per-tick world simulation: lifecycle transitions, movement,
//! collision, growth, powerup spawning and wrap-around.
//!
//! The order inside [`step`] is load-bearing. Snake and powerup collision
//! run against the *pre-move* head position, wrap vertices are injected
//! before the move is applied, and wall collision is re-tested against the
//! *post-move* head, overriding the completed move with a death.

use crate::config::{Mode, Settings};
use crate::world::World;
use rand::Rng;
use shared::{Powerup, Rect, Snake, Vec2D, HEAD_HALF, MAX_SEGMENT_EXTENT, SNAKE_WIDTH, SPAWN_LENGTH};

/// Advances the world by exactly one tick. Caller holds the world lock.
pub fn step(world: &mut World, settings: &Settings, rng: &mut impl Rng) {
    // 1. Drain everything staged since the last tick.
    let staged_powerups = std::mem::take(&mut world.pending_powerups);
    for (id, powerup) in staged_powerups {
        world.powerups.insert(id, powerup);
    }
    let staged_snakes = std::mem::take(&mut world.pending_snakes);
    for (id, snake) in staged_snakes {
        world.players.insert(id, snake);
    }

    // 2. Cleanup: consumed powerups go away; disconnected snakes go away
    //    once their dc record has been broadcast.
    world.powerups.retain(|_, p| !p.died);
    world.players.retain(|_, s| !(s.dc && s.dc_announced));

    // 3. Powerup repopulation countdown.
    repopulate_powerups(world, settings, rng);

    // 4. Per-snake update.
    let ids: Vec<u32> = world.players.keys().copied().collect();
    for id in ids {
        let Some(mut snake) = world.players.remove(&id) else {
            continue;
        };

        if !snake.alive && snake.frames_after_death >= settings.respawn_rate {
            let fresh = spawn_snake(world, settings, rng, id, snake.name.clone(), false);
            world.pending_snakes.insert(id, fresh);
            snake.frames_after_death = 0;
        } else if snake.died || !snake.alive {
            snake.frames_after_death += 1;
            snake.died = false;
        } else {
            update_alive(world, settings, &mut snake);
        }

        world.players.insert(id, snake);
    }
}

/// When the countdown elapses, refill vacant population slots with random
/// placements, rejecting wall overlaps (a rejected slot retries next
/// cycle), then redraw the countdown target.
fn repopulate_powerups(world: &mut World, settings: &Settings, rng: &mut impl Rng) {
    if world.powerup_frames < world.powerup_spawn_target {
        world.powerup_frames += 1;
        return;
    }

    if world.powerups.len() < settings.max_powerups {
        for id in 0..settings.max_powerups as u32 {
            if world.powerups.contains_key(&id) {
                continue;
            }
            let powerup = Powerup::new(id, random_powerup_location(world.size, rng));
            if !hits_wall(&powerup.rect(), world) {
                world.powerups.insert(id, powerup);
            }
        }
    }

    world.powerup_frames = 0;
    world.powerup_spawn_target = rng.gen_range(0..settings.max_powerup_delay.max(1));
}

/// One alive snake's full tick, in the mandated order.
fn update_alive(world: &mut World, settings: &Settings, snake: &mut Snake) {
    if snake.body.len() < 2 {
        return;
    }

    // Pre-move: collision with other snakes or the snake's own body.
    if hits_snake(world, snake) {
        let loc = snake.head();
        let score = snake.score;
        snake.kill();
        queue_death_drop(world, settings, loc, score);
        return;
    }

    // Pre-move: powerup pickup, at most one per tick.
    consume_powerup(world, settings, snake);

    // Wrap-around: inject the synthetic vertices before moving, so the
    // client renders the crossing as two segments instead of one
    // world-wide diagonal.
    let half = world.size as f64 / 2.0;
    let head = snake.head();
    if head.x.abs() > half || head.y.abs() > half {
        let offset = world.size as f64;
        let far = if snake.dir.x == 0.0 {
            if snake.dir.y > 0.0 {
                Vec2D::new(head.x, head.y - offset)
            } else {
                Vec2D::new(head.x, head.y + offset)
            }
        } else if snake.dir.x > 0.0 {
            Vec2D::new(head.x - offset, head.y)
        } else {
            Vec2D::new(head.x + offset, head.y)
        };
        snake.body.push(head);
        snake.body.push(far);
        snake.body.push(far);
    }

    // Advance the head and re-test walls at the new position. A wall hit
    // always overrides the completed move.
    let speed = settings.snake_speed;
    let new_head = snake.head() + snake.dir * speed;
    if let Some(h) = snake.body.last_mut() {
        *h = new_head;
    }
    snake.head_rect = Rect::around_point(new_head, HEAD_HALF);

    if hits_wall(&snake.head_rect, world) {
        let loc = snake.body[snake.body.len() - 2];
        let score = snake.score;
        snake.kill();
        queue_death_drop(world, settings, loc, score);
        return;
    }

    // Turn-lock release once the snake has moved past its own width.
    if !snake.can_turn {
        snake.distance_moved += speed;
        if snake.distance_moved > SNAKE_WIDTH {
            snake.can_turn = true;
            snake.distance_moved = 0.0;
        }
    }

    // Growth suspends tail shrink, one tick per remaining growth unit.
    if snake.ate_powerup && snake.growth_left > 0 {
        snake.growth_left -= 1;
    }
    if snake.growth_left == 0 {
        shrink_tail(snake, speed);
        snake.ate_powerup = false;
    }

    snake.rebuild_rects();
}

/// In Special mode a snake worth 2 or more drops its score as a powerup
/// where it died; staged so a mid-iteration tick never mutates the map.
fn queue_death_drop(world: &mut World, settings: &Settings, loc: Vec2D, score: i32) {
    if settings.mode == Mode::Special && score >= 2 {
        let id = world.alloc_powerup_id();
        world
            .pending_powerups
            .insert(id, Powerup::with_value(id, loc, score));
    }
}

/// Head-vs-body test: every other snake's segments, and the snake's own
/// segments past the three nearest the head (those always touch it).
fn hits_snake(world: &World, snake: &Snake) -> bool {
    for rect in snake.segment_rects.iter().skip(3) {
        if rect.intersects(&snake.head_rect) {
            return true;
        }
    }
    for other in world.players.values() {
        for rect in &other.segment_rects {
            // A segment anchored at the head's own origin means the two
            // heads occupy the same point (overlapping spawns), not a hit.
            if rect.x == snake.head_rect.x && rect.y == snake.head_rect.y {
                continue;
            }
            if rect.intersects(&snake.head_rect) {
                return true;
            }
        }
    }
    false
}

fn hits_wall(rect: &Rect, world: &World) -> bool {
    world.walls.values().any(|w| w.rect().intersects(rect))
}

/// Marks the first overlapping live powerup consumed and grants the reward.
fn consume_powerup(world: &mut World, settings: &Settings, snake: &mut Snake) {
    for powerup in world.powerups.values_mut() {
        if powerup.died || !powerup.rect().intersects(&snake.head_rect) {
            continue;
        }
        powerup.died = true;
        match settings.mode {
            Mode::Standard => {
                snake.growth_left += settings.snake_growth;
                snake.score += 1;
            }
            Mode::Special => {
                let scaled =
                    (settings.snake_growth as f64 * powerup.value as f64 / settings.snake_speed)
                        as i32;
                snake.growth_left += scaled;
                snake.score += powerup.value;
            }
        }
        snake.ate_powerup = true;
        return;
    }
}

/// Shrinks the tail by `amount` world units, consuming whole segments
/// shorter than the remaining budget and partially trimming the last.
///
/// Segment lengths use the `|Δx + Δy|` measure: on the axis-aligned
/// segments snakes are made of one term is always zero, and across the
/// synthetic wrap vertices it consumes the degenerate spans quickly.
fn shrink_tail(snake: &mut Snake, amount: f64) {
    let mut remainder = amount;
    while remainder > 0.0 && snake.body.len() >= 2 {
        let span = segment_span(snake.body[0], snake.body[1]);
        if remainder > span {
            remainder -= span;
            snake.body.remove(0);
            continue;
        }

        if span >= MAX_SEGMENT_EXTENT {
            snake.body.remove(0);
            if snake.body.len() < 2 {
                break;
            }
        }
        let dx = snake.body[0].x - snake.body[1].x;
        let dy = snake.body[0].y - snake.body[1].y;
        let tail_dir = if dx == 0.0 {
            if dy < 0.0 {
                Vec2D::new(0.0, 1.0)
            } else {
                Vec2D::new(0.0, -1.0)
            }
        } else if dx < 0.0 {
            Vec2D::new(1.0, 0.0)
        } else {
            Vec2D::new(-1.0, 0.0)
        };
        snake.body[0] = snake.body[0] + tail_dir * remainder;
        remainder = 0.0;
    }
}

fn segment_span(a: Vec2D, b: Vec2D) -> f64 {
    (a.x - b.x + a.y - b.y).abs()
}

/// Builds a fresh two-point snake at a random position and axis-aligned
/// direction whose head does not sit inside a wall.
pub fn spawn_snake(
    world: &World,
    settings: &Settings,
    rng: &mut impl Rng,
    id: u32,
    name: String,
    join: bool,
) -> Snake {
    let half = settings.world_size / 2;
    loop {
        let head = Vec2D::new(
            rng.gen_range(-half..half) as f64,
            rng.gen_range(-half..half) as f64,
        );
        let dir = match rng.gen_range(0..4) {
            0 => Vec2D::new(0.0, -1.0),
            1 => Vec2D::new(0.0, 1.0),
            2 => Vec2D::new(-1.0, 0.0),
            _ => Vec2D::new(1.0, 0.0),
        };
        let tail = head - dir * SPAWN_LENGTH;

        let snake = Snake::new(id, name.clone(), vec![tail, head], dir, join);
        if !hits_wall(&snake.head_rect, world) {
            return snake;
        }
    }
}

/// Places the initial powerup population. Runs once, when the first client
/// joins; later vacancies are refilled by the repopulation countdown.
pub fn seed_powerups(world: &mut World, settings: &Settings, rng: &mut impl Rng) {
    if world.powerups_seeded {
        return;
    }
    world.powerups_seeded = true;

    let mut slot = 0u32;
    let mut attempts = 0u32;
    while (slot as usize) < settings.max_powerups && attempts < 10_000 {
        attempts += 1;
        if world.powerups.contains_key(&slot) {
            slot += 1;
            continue;
        }
        let powerup = Powerup::new(slot, random_powerup_location(world.size, rng));
        if !hits_wall(&powerup.rect(), world) {
            world.powerups.insert(slot, powerup);
            slot += 1;
        }
    }
}

/// Uniform world coordinate, held a powerup's width off the boundary.
fn random_powerup_location(size: i32, rng: &mut impl Rng) -> Vec2D {
    let half = size / 2;
    Vec2D::new(
        (-half + rng.gen_range(0..size - 10) + 5) as f64,
        (-half + rng.gen_range(0..size - 10) + 5) as f64,
    )
}
