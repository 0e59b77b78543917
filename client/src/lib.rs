//! # Snake Arena Client Library
//!
//! A headless client for the snake arena server. It speaks the same
//! newline-delimited JSON protocol as the server and keeps a mirror of the
//! authoritative world, but renders nothing; it exists for observing
//! games, scripting bots and driving integration tests.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The [`game::MirrorWorld`]: a passive copy of the server's walls,
//! powerups and snakes, updated record by record. The client never
//! simulates; a record either replaces an entity or, when its removal
//! flag is set, deletes it.
//!
//! ### Network Module (`network`)
//! The [`network::Client`]: connects with a timeout, performs the name
//! handshake, decodes incoming broadcast lines into the mirror and
//! encodes outgoing movement commands.

pub mod game;
pub mod network;
