//! Server network layer: TCP accept loop, per-connection handshake and
//! command handling, and the fixed-rate frame scheduler.

use crate::clients::ClientRegistry;
use crate::config::{Mode, Settings};
use crate::game;
use crate::world::World;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{Direction, LineBuffer, Powerup, WireObject, MAX_NAME_LEN};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::time::interval;

/// The authoritative game server: one listener, one world, one tick loop.
pub struct GameServer {
    listener: TcpListener,
    settings: Arc<Settings>,
    world: Arc<Mutex<World>>,
    clients: Arc<Mutex<ClientRegistry>>,
}

impl GameServer {
    /// Binds the listener and builds the world from `settings`.
    pub async fn bind(
        addr: &str,
        settings: Settings,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server is running on {}. Accepting clients.", listener.local_addr()?);

        let mut world = World::new(&settings);
        world.powerup_spawn_target =
            rand::thread_rng().gen_range(0..settings.max_powerup_delay.max(1));

        Ok(GameServer {
            listener,
            settings: Arc::new(settings),
            world: Arc::new(Mutex::new(world)),
            clients: Arc::new(Mutex::new(ClientRegistry::new())),
        })
    }

    /// Address the listener actually bound to (port 0 resolves here).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop and the frame scheduler until the process ends.
    /// Connection failures are routine churn; nothing here may stop the
    /// tick loop.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let GameServer {
            listener,
            settings,
            world,
            clients,
        } = self;

        {
            let settings = Arc::clone(&settings);
            let world = Arc::clone(&world);
            let clients = Arc::clone(&clients);
            tokio::spawn(async move {
                accept_loop(listener, settings, world, clients).await;
            });
        }

        frame_loop(settings, world, clients).await;
        Ok(())
    }
}

/// Accepts connections until the listener fails. Each client gets the next
/// id and its own handler task. A terminal accept error is surfaced once
/// and ends only this loop; established sessions and the tick loop go on.
async fn accept_loop(
    listener: TcpListener,
    settings: Arc<Settings>,
    world: Arc<Mutex<World>>,
    clients: Arc<Mutex<ClientRegistry>>,
) {
    let mut next_id: u32 = 1;
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("Accepted new connection from {}", addr);
                let id = next_id;
                next_id += 1;

                let settings = Arc::clone(&settings);
                let world = Arc::clone(&world);
                let clients = Arc::clone(&clients);
                tokio::spawn(async move {
                    handle_client(stream, id, settings, world, clients).await;
                });
            }
            Err(e) => {
                error!("Accept loop terminated: {}", e);
                break;
            }
        }
    }
}

/// The fixed-period tick driver: advance the simulation, package one
/// consistent snapshot, fan it out, prune rejected connections.
async fn frame_loop(
    settings: Arc<Settings>,
    world: Arc<Mutex<World>>,
    clients: Arc<Mutex<ClientRegistry>>,
) {
    let mut ticker = interval(Duration::from_millis(settings.ms_per_frame.max(1)));
    let mut rng = StdRng::from_entropy();

    let mut ticks_this_second: u32 = 0;
    let mut second_mark = Instant::now();

    // The first tick fires immediately; skip it so ticks are evenly spaced.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let frame = {
            let mut w = world.lock().await;
            game::step(&mut w, &settings, &mut rng);
            w.encode_snapshot()
        };

        let failed = {
            let registry = clients.lock().await;
            if registry.is_empty() {
                Vec::new()
            } else {
                registry.broadcast(&frame)
            }
        };
        for id in failed {
            disconnect(id, &settings, &world, &clients).await;
        }

        ticks_this_second += 1;
        if second_mark.elapsed() >= Duration::from_secs(1) {
            debug!(
                "Tick rate: {}/s, {} client(s)",
                ticks_this_second,
                clients.lock().await.len()
            );
            ticks_this_second = 0;
            second_mark = Instant::now();
        }
    }
}

/// One connection's whole lifetime: handshake, command loop, teardown.
async fn handle_client(
    stream: TcpStream,
    id: u32,
    settings: Arc<Settings>,
    world: Arc<Mutex<World>>,
    clients: Arc<Mutex<ClientRegistry>>,
) {
    let (mut reader, mut writer) = stream.into_split();

    // All outbound traffic for this connection funnels through one queue;
    // the writer task is the single point that touches the socket's write
    // half. Any write failure ends it, which surfaces as rejected sends.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if writer.write_all(msg.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    // Handshake: the first line is the raw player name.
    let mut buf = LineBuffer::new();
    let name = match read_line(&mut reader, &mut buf).await {
        Some(line) => line.chars().take(MAX_NAME_LEN).collect::<String>(),
        None => {
            debug!("Connection {} closed before sending a name", id);
            return;
        }
    };
    info!("Player ({}) \"{}\" joined.", id, name);

    // Under one lock hold: create the snake, seed the initial powerups if
    // this is the first client, and package id + world size + walls +
    // join-time snapshot.
    let greeting = {
        let mut w = world.lock().await;
        let snake = game::spawn_snake(&w, &settings, &mut rand::thread_rng(), id, name, true);
        w.players.insert(id, snake);
        game::seed_powerups(&mut w, &settings, &mut rand::thread_rng());

        let mut msg = format!("{}\n{}\n", id, w.size);
        msg.push_str(&w.encode_walls());
        msg.push_str(&w.encode_join_snapshot());
        msg
    };
    if tx.send(greeting).is_err() {
        disconnect(id, &settings, &world, &clients).await;
        return;
    }
    clients.lock().await.insert(id, tx);

    // Command loop. The name line may have arrived glued to command lines,
    // so drain the buffer before each read.
    let mut bytes = [0u8; 1024];
    loop {
        while let Some(line) = buf.next_line() {
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<WireObject>(&line) {
                Ok(WireObject::Move(cmd)) => apply_move(id, cmd.moving, &world).await,
                Ok(_) => {} // world records from a client carry no authority
                Err(_) => debug!("Ignoring unparseable line from {}: {}", id, line),
            }
        }

        match reader.read(&mut bytes).await {
            Ok(0) => break,
            Ok(n) => buf.extend(&bytes[..n]),
            Err(e) => {
                debug!("Receive error on connection {}: {}", id, e);
                break;
            }
        }
    }

    disconnect(id, &settings, &world, &clients).await;
}

/// Reads until the buffer yields one complete line. `None` on EOF/error.
async fn read_line(reader: &mut OwnedReadHalf, buf: &mut LineBuffer) -> Option<String> {
    let mut bytes = [0u8; 256];
    loop {
        if let Some(line) = buf.next_line() {
            return Some(line);
        }
        match reader.read(&mut bytes).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend(&bytes[..n]),
        }
    }
}

/// Applies a move command immediately. The turn-lock is consumed by any
/// command, accepted or not; only a perpendicular command changes `dir`,
/// and an effective turn pins a duplicate vertex at the head.
async fn apply_move(id: u32, moving: Direction, world: &Arc<Mutex<World>>) {
    let mut w = world.lock().await;
    let Some(snake) = w.players.get_mut(&id) else {
        return;
    };
    if !snake.can_turn || snake.dc || !snake.alive || snake.died {
        return;
    }

    let previous = snake.dir;
    snake.can_turn = false;

    let wanted = moving.vector();
    let perpendicular = if wanted.x == 0.0 {
        snake.dir.y == 0.0
    } else {
        snake.dir.x == 0.0
    };
    if perpendicular {
        snake.dir = wanted;
    }

    if snake.dir != previous {
        let head = snake.head();
        snake.body.push(head);
    }
}

/// Marks the player disconnected and removes its outbound queue. The dead
/// snake stays in the world until its `dc` record has been broadcast; in
/// Special mode a scoring snake drops its score as a powerup.
async fn disconnect(
    id: u32,
    settings: &Arc<Settings>,
    world: &Arc<Mutex<World>>,
    clients: &Arc<Mutex<ClientRegistry>>,
) {
    clients.lock().await.remove(id);

    let mut w = world.lock().await;
    let dropped = match w.players.get_mut(&id) {
        Some(snake) if !snake.dc => {
            snake.dc = true;
            let loc = snake.head();
            let score = snake.score;
            snake.kill();
            Some((loc, score))
        }
        // Already marked (read loop and broadcast pruning can race here)
        // or already cleaned up.
        Some(_) => None,
        None => {
            warn!("Disconnect for unknown player {}", id);
            None
        }
    };
    if let Some((loc, score)) = dropped {
        if settings.mode == Mode::Special && score >= 2 {
            let pid = w.alloc_powerup_id();
            w.pending_powerups
                .insert(pid, Powerup::with_value(pid, loc, score));
        }
    }
}
