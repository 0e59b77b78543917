//! # Snake Arena Server Library
//!
//! The authoritative server for the multiplayer snake arena. It owns the
//! canonical world (walls, snakes, powerups), runs the simulation at a
//! fixed tick rate, and broadcasts the resulting state to every connected
//! client over a newline-delimited JSON protocol.
//!
//! ## Architecture
//!
//! ### Single authoritative world, one coarse lock
//! The whole mutable world lives in one `Arc<Mutex<World>>`. Every
//! mutation path (the tick update, command application, joins and
//! disconnects) takes that one lock, so each tick and each broadcast
//! snapshot is atomic with respect to everything else. Throughput is
//! traded for the guarantee that no entity is ever observed half-updated.
//!
//! ### Task layout
//! - an **accept loop** task hands each connection a player id and its own
//!   handler task;
//! - each **connection handler** performs the name handshake and then
//!   decodes command lines, applying them to the world as they arrive;
//! - each connection also gets a dedicated **writer task** fed by an
//!   unbounded queue, so broadcasts and handshake replies are serialized
//!   per connection and never interleave on the wire;
//! - one **frame loop** drives the simulation and the broadcast at the
//!   configured tick period.
//!
//! ### Failure model
//! A connection-level I/O failure closes that session, marks its snake
//! disconnected, and touches nothing else. Malformed protocol lines are
//! skipped. An accept-loop failure stops new connections but neither
//! established sessions nor the tick loop. Nothing terminates the frame
//! scheduler.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use server::config::Settings;
//! use server::network::GameServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = GameServer::bind("127.0.0.1:11000", Settings::default()).await?;
//!     server.run().await
//! }
//! ```

pub mod clients;
pub mod config;
pub mod game;
pub mod network;
pub mod world;
