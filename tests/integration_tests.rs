//! Integration tests for the snake arena server.
//!
//! These tests run a real server on an ephemeral port and talk to it over
//! TCP, validating the handshake bytes, the broadcast stream and the
//! lifecycle of connecting and disconnecting players.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};

use client::game::MirrorWorld;
use client::network::Client;
use server::config::Settings;
use server::network::GameServer;
use shared::{Direction, WireObject};

/// Binds a server on an ephemeral port, runs it in the background and
/// returns the address to connect to.
async fn start_server(settings: Settings) -> String {
    let server = GameServer::bind("127.0.0.1:0", settings)
        .await
        .expect("Failed to bind server");
    let addr = server.local_addr().expect("No local address");
    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            eprintln!("Server stopped: {}", e);
        }
    });
    format!("{}", addr)
}

/// Fast-ticking settings so the tests never wait on the default 34 ms frame.
fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.ms_per_frame = 10;
    settings.max_powerups = 1;
    settings
}

/// Pumps broadcasts into the client's mirror until `pred` holds or five
/// seconds pass.
async fn wait_for<F>(client: &mut Client, mut pred: F) -> bool
where
    F: FnMut(&MirrorWorld) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if pred(&client.world) {
            return true;
        }
        match timeout(Duration::from_millis(500), client.recv_update()).await {
            Ok(Ok(_)) => {}
            Ok(Err(_)) => break,
            Err(_) => {}
        }
    }
    pred(&client.world)
}

/// HANDSHAKE TESTS
mod handshake_tests {
    use super::*;

    /// Validates the exact greeting byte stream: the assigned id line, the
    /// world-size line, one line per wall, then the join-time snapshot with
    /// powerups before snakes.
    #[tokio::test]
    async fn handshake_byte_stream() {
        let mut settings = test_settings();
        settings.world_size = 1500;
        settings.walls = serde_json::from_str(
            r#"[{"id":3,"p1":{"x":-700,"y":-700},"p2":{"x":-700,"y":700}}]"#,
        )
        .unwrap();
        let addr = start_server(settings).await;

        let mut stream = TcpStream::connect(&addr).await.unwrap();
        stream.write_all(b"Ann\n").await.unwrap();

        let mut lines = BufReader::new(stream).lines();

        assert_eq!(lines.next_line().await.unwrap().unwrap(), "1");
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "1500");

        let wall: WireObject =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        match wall {
            WireObject::Wall(w) => assert_eq!(w.wall, 3),
            other => panic!("Expected a wall record, got {:?}", other),
        }

        // Snapshot: the single seeded powerup, then our freshly joined snake.
        let powerup: WireObject =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert!(matches!(powerup, WireObject::Powerup(_)));

        let snake: WireObject =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        match snake {
            WireObject::Snake(s) => {
                assert_eq!(s.snake, 1);
                assert_eq!(s.name, "Ann");
                assert!(s.join);
                assert!(s.alive);
                assert_eq!(s.body.len(), 2);
            }
            other => panic!("Expected a snake record, got {:?}", other),
        }
    }

    /// Names longer than sixteen characters are truncated, not rejected.
    #[tokio::test]
    async fn overlong_name_is_truncated() {
        let addr = start_server(test_settings()).await;

        let mut client = Client::connect(&addr, "abcdefghijklmnopqrstuvwxyz")
            .await
            .unwrap();
        let id = client.id;

        let found = wait_for(&mut client, |world| {
            world
                .snakes
                .get(&id)
                .map(|s| s.name == "abcdefghijklmnop")
                .unwrap_or(false)
        })
        .await;
        assert!(found, "Truncated name never appeared in a broadcast");
    }
}

/// GAMEPLAY TESTS
mod gameplay_tests {
    use super::*;

    /// A perpendicular move command changes the snake's direction in the
    /// next broadcasts.
    #[tokio::test]
    async fn move_command_turns_snake() {
        let addr = start_server(test_settings()).await;

        let mut client = Client::connect(&addr, "turner").await.unwrap();
        let id = client.id;

        assert!(wait_for(&mut client, |world| world.snakes.contains_key(&id)).await);

        // Spawn direction is random; pick whichever axis is perpendicular.
        let horizontal = client.world.snakes[&id].dir.x != 0.0;
        let (command, expected) = if horizontal {
            (Direction::Up, Direction::Up.vector())
        } else {
            (Direction::Left, Direction::Left.vector())
        };
        client.send_move(command).await.unwrap();

        let turned = wait_for(&mut client, |world| {
            world.snakes.get(&id).map(|s| s.dir == expected).unwrap_or(false)
        })
        .await;
        assert!(turned, "Direction never changed after the move command");
    }

    /// Snakes advance between broadcasts.
    #[tokio::test]
    async fn snake_moves_every_tick() {
        let addr = start_server(test_settings()).await;

        let mut client = Client::connect(&addr, "walker").await.unwrap();
        let id = client.id;

        assert!(wait_for(&mut client, |world| world.snakes.contains_key(&id)).await);
        let start = *client.world.snakes[&id].body.last().unwrap();

        let moved = wait_for(&mut client, |world| {
            world
                .snakes
                .get(&id)
                .and_then(|s| s.body.last())
                .map(|head| *head != start)
                .unwrap_or(false)
        })
        .await;
        assert!(moved, "Head never advanced");
    }

    /// A line that is not valid JSON is skipped; the session stays alive
    /// and later commands still apply.
    #[tokio::test]
    async fn malformed_line_is_ignored() {
        let addr = start_server(test_settings()).await;

        let mut stream = TcpStream::connect(&addr).await.unwrap();
        stream.write_all(b"Bob\n").await.unwrap();
        stream
            .write_all(b"this is not json\n{\"half\":true\n")
            .await
            .unwrap();

        // The connection must survive; we keep receiving broadcast frames.
        let mut lines = BufReader::new(stream).lines();
        let mut snake_records = 0;
        let deadline = Instant::now() + Duration::from_secs(5);
        while snake_records < 5 && Instant::now() < deadline {
            match timeout(Duration::from_millis(500), lines.next_line()).await {
                Ok(Ok(Some(line))) => {
                    if let Ok(WireObject::Snake(s)) = serde_json::from_str(&line) {
                        assert!(!s.dc, "Server dropped the session over garbage input");
                        snake_records += 1;
                    }
                }
                Ok(Ok(None)) | Ok(Err(_)) => panic!("Connection closed after garbage input"),
                Err(_) => {}
            }
        }
        assert_eq!(snake_records, 5);
    }
}

/// LIFECYCLE TESTS
mod lifecycle_tests {
    use super::*;

    /// Both players see each other, and a disconnect reaches the survivor
    /// as a removal record.
    #[tokio::test]
    async fn disconnect_is_broadcast_to_survivors() {
        let addr = start_server(test_settings()).await;

        let mut ann = Client::connect(&addr, "Ann").await.unwrap();
        let bob = Client::connect(&addr, "Bob").await.unwrap();
        let bob_id = bob.id;
        assert_ne!(ann.id, bob_id);

        let both = wait_for(&mut ann, |world| world.snakes.len() == 2).await;
        assert!(both, "Second snake never appeared");

        drop(bob);

        let pruned = wait_for(&mut ann, |world| !world.snakes.contains_key(&bob_id)).await;
        assert!(pruned, "Disconnected snake never left the broadcast");
    }

    /// Ids keep increasing across joins, even after earlier players left.
    #[tokio::test]
    async fn player_ids_are_never_reused() {
        let addr = start_server(test_settings()).await;

        let first = Client::connect(&addr, "first").await.unwrap();
        let first_id = first.id;
        drop(first);

        let second = Client::connect(&addr, "second").await.unwrap();
        assert!(second.id > first_id);
    }
}
