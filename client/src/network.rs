//! TCP connection to the game server.

use std::time::Duration;

use log::{debug, info};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use shared::{encode, Direction, LineBuffer, MoveCommand, WireObject, MAX_NAME_LEN};

use crate::game::MirrorWorld;

const CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);

/// A connected session: the socket, the per-session line buffer, the id
/// the server assigned and the mirrored world it keeps updating.
pub struct Client {
    stream: TcpStream,
    buffer: LineBuffer,
    pub id: u32,
    pub world: MirrorWorld,
}

impl Client {
    /// Connects, sends the player name and performs the handshake. On
    /// return the assigned player id and the world size are known; walls
    /// and the join snapshot follow on the normal receive path.
    pub async fn connect(addr: &str, name: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr)).await??;

        let mut name = name.to_string();
        name.truncate(MAX_NAME_LEN);

        let mut client = Client {
            stream,
            buffer: LineBuffer::new(),
            id: 0,
            world: MirrorWorld::default(),
        };
        client.stream.write_all(format!("{}\n", name).as_bytes()).await?;

        let id_line = client.read_line().await?;
        let size_line = client.read_line().await?;
        client.id = id_line.trim().parse()?;
        client.world.size = size_line.trim().parse()?;

        info!(
            "Connected as '{}' with id {} (world size {})",
            name, client.id, client.world.size
        );
        Ok(client)
    }

    /// Sends one movement command.
    pub async fn send_move(&mut self, direction: Direction) -> std::io::Result<()> {
        let line = encode(&MoveCommand { moving: direction });
        self.stream.write_all(line.as_bytes()).await
    }

    /// Reads from the socket until at least one record has been applied to
    /// the mirror, then drains whatever complete lines arrived with it.
    /// Returns the number of records applied.
    pub async fn recv_update(&mut self) -> Result<usize, Box<dyn std::error::Error>> {
        let mut applied = 0;
        loop {
            while let Some(line) = self.buffer.next_line() {
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<WireObject>(&line) {
                    Ok(object) => {
                        self.world.apply(object);
                        applied += 1;
                    }
                    Err(e) => debug!("Dropping undecodable line {:?}: {}", line, e),
                }
            }
            if applied > 0 {
                return Ok(applied);
            }
            self.fill_buffer().await?;
        }
    }

    async fn read_line(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        loop {
            if let Some(line) = self.buffer.next_line() {
                return Ok(line);
            }
            self.fill_buffer().await?;
        }
    }

    async fn fill_buffer(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut chunk = [0u8; 4096];
        let n = self.stream.read(&mut chunk).await?;
        if n == 0 {
            return Err("server closed the connection".into());
        }
        self.buffer.extend(&chunk[..n]);
        Ok(())
    }
}
