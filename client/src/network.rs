//! Event bus bridge transport.
//!
//! The bridge speaks JSON frames over TCP, each prefixed with its length as a
//! 4-byte big-endian integer. Reading and writing run as separate tasks; the
//! render loop only ever touches the [`UpdateQueue`] and a [`BusSender`].

use crate::config::SessionMode;
use crate::error::ClientError;
use crate::queue::UpdateQueue;
use log::{debug, error, info, warn};
use serde_json::Value;
use shared::protocol::{GameRequest, ReplayRegister, ReplayStart};
use shared::{addresses, BridgeFrame, GameId, MoveCommand, PlayerId, ServerPush, Snapshot};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

/// Frames larger than this are treated as a protocol violation.
pub const MAX_FRAME_LEN: usize = 1 << 20;
pub const PING_INTERVAL: Duration = Duration::from_secs(5);

pub async fn write_frame<W>(writer: &mut W, frame: &BridgeFrame) -> Result<(), ClientError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_vec(frame)?;
    let mut buf = Vec::with_capacity(4 + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(&payload);
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame; `Ok(None)` when the peer closed the stream between frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<BridgeFrame>, ClientError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    if reader.read(&mut len_buf[..1]).await? == 0 {
        return Ok(None);
    }
    match reader.read_exact(&mut len_buf[1..]).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            return Err(ClientError::Protocol(
                "stream ended inside a frame header".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ClientError::Protocol(format!(
            "frame of {} bytes exceeds limit",
            len
        )));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(serde_json::from_slice(&payload)?))
}

/// Outbound side of the transport as seen by the input gate.
pub trait CommandSink {
    fn send_command(&mut self, cmd: &MoveCommand) -> Result<(), ClientError>;
}

/// Cheap, cloneable handle that queues frames for the writer task.
#[derive(Debug, Clone)]
pub struct BusSender {
    tx: mpsc::UnboundedSender<BridgeFrame>,
    game_id: GameId,
}

impl BusSender {
    pub fn new(tx: mpsc::UnboundedSender<BridgeFrame>, game_id: GameId) -> Self {
        Self { tx, game_id }
    }

    pub fn send_frame(&self, frame: BridgeFrame) -> Result<(), ClientError> {
        self.tx
            .send(frame)
            .map_err(|_| ClientError::TransportUnavailable)
    }
}

impl CommandSink for BusSender {
    fn send_command(&mut self, cmd: &MoveCommand) -> Result<(), ClientError> {
        let body = serde_json::to_value(GameRequest::from(*cmd))?;
        self.send_frame(BridgeFrame::send(addresses::game(self.game_id), body))
    }
}

/// A bootstrapped session: who we are, where the world starts, and how to talk back.
#[derive(Debug)]
pub struct Session {
    pub local_player: PlayerId,
    pub snapshot: Snapshot,
    pub commands: BusSender,
}

/// Connection to the bus bridge for one game.
pub struct BusClient {
    sender: BusSender,
    incoming: mpsc::UnboundedReceiver<BridgeFrame>,
    queue: UpdateQueue,
    game_id: GameId,
    push_address: Option<String>,
    snapshot: Option<Snapshot>,
    bootstrapped: bool,
    next_reply: u64,
}

impl BusClient {
    pub async fn connect(
        addr: &str,
        game_id: GameId,
        queue: UpdateQueue,
    ) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!("Connected to bus at {}", addr);

        let (mut reader, mut writer) = stream.into_split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<BridgeFrame>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<BridgeFrame>();

        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                if let Err(e) = write_frame(&mut writer, &frame).await {
                    error!("Failed to write frame: {}", e);
                    break;
                }
            }
        });

        tokio::spawn(async move {
            loop {
                match read_frame(&mut reader).await {
                    Ok(Some(frame)) => {
                        if in_tx.send(frame).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Bus closed the connection");
                        break;
                    }
                    Err(e) => {
                        error!("Error reading frame: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            sender: BusSender::new(out_tx, game_id),
            incoming: in_rx,
            queue,
            game_id,
            push_address: None,
            snapshot: None,
            bootstrapped: false,
            next_reply: 0,
        })
    }

    pub fn sender(&self) -> BusSender {
        self.sender.clone()
    }

    async fn next_frame(&mut self) -> Result<BridgeFrame, ClientError> {
        self.incoming
            .recv()
            .await
            .ok_or(ClientError::TransportUnavailable)
    }

    fn subscribe(&mut self, address: String) -> Result<(), ClientError> {
        self.sender.send_frame(BridgeFrame::register(address.clone()))?;
        debug!("Registered handler on {}", address);
        self.push_address = Some(address);
        Ok(())
    }

    /// Sends `body` to `address` and waits for the reply.
    ///
    /// Pushes that arrive while waiting are routed as usual.
    pub async fn request(&mut self, address: String, body: Value) -> Result<Value, ClientError> {
        let reply = format!("gridsync.reply.{}.{}", std::process::id(), self.next_reply);
        self.next_reply += 1;
        self.sender
            .send_frame(BridgeFrame::request(address, body, reply.clone()))?;

        loop {
            match self.next_frame().await? {
                BridgeFrame::Message { address, body, .. } if address == reply => return Ok(body),
                BridgeFrame::Err {
                    address,
                    failure_code,
                    message,
                    ..
                } if address.as_deref().map_or(true, |a| a == reply) => {
                    return Err(ClientError::Bus {
                        code: failure_code,
                        message,
                    })
                }
                other => self.route(other),
            }
        }
    }

    fn route(&mut self, frame: BridgeFrame) {
        match frame {
            BridgeFrame::Message { address, body, .. }
                if self.push_address.as_deref() == Some(address.as_str()) =>
            {
                match ServerPush::from_value(body) {
                    Ok(ServerPush::Update(event)) => self.queue.enqueue(event),
                    Ok(ServerPush::Snapshot(snapshot)) => {
                        if self.bootstrapped || self.snapshot.is_some() {
                            warn!(
                                "Ignoring snapshot for round {} after bootstrap",
                                snapshot.round_id
                            );
                        } else {
                            self.snapshot = Some(snapshot);
                        }
                    }
                    Err(e) => warn!("Dropping malformed push on {}: {}", address, e),
                }
            }
            BridgeFrame::Pong => debug!("Pong"),
            BridgeFrame::Err { message, .. } => warn!("Bus error: {}", message),
            other => match other.address() {
                Some(address) => warn!("Dropping unexpected frame on {}", address),
                None => warn!("Dropping unexpected frame {:?}", other),
            },
        }
    }

    /// Registers a new player and returns the id the game assigned.
    pub async fn register_player(&mut self, name: &str) -> Result<PlayerId, ClientError> {
        let body = serde_json::to_value(GameRequest::Register {
            name: name.to_string(),
        })?;
        let reply = self.request(addresses::game(self.game_id), body).await?;
        let player_id = serde_json::from_value(reply)?;
        info!("Registered as player {} in game {}", player_id, self.game_id);
        Ok(player_id)
    }

    /// Registers a spectator replaying from a stored snapshot index.
    pub async fn register_spectator(&mut self, index: u32) -> Result<PlayerId, ClientError> {
        let body = serde_json::to_value(ReplayRegister { index })?;
        let reply = self
            .request(addresses::replay_register(self.game_id), body)
            .await?;
        let spectator_id = serde_json::from_value(reply)?;
        info!("Registered as spectator {}", spectator_id);
        Ok(spectator_id)
    }

    /// Subscribes to the game's updates, then asks for the current roster.
    pub async fn bootstrap_player(&mut self) -> Result<Snapshot, ClientError> {
        self.subscribe(addresses::browser_game(self.game_id))?;
        let body = serde_json::to_value(GameRequest::Snapshot)?;
        let reply = self.request(addresses::game(self.game_id), body).await?;
        let snapshot: Snapshot = serde_json::from_value(reply)?;
        self.bootstrapped = true;
        Ok(snapshot)
    }

    /// Starts a replay; the first snapshot pushed to the spectator address wins.
    pub async fn bootstrap_spectator(&mut self, spectator_id: PlayerId) -> Result<Snapshot, ClientError> {
        self.subscribe(addresses::browser_replay(spectator_id))?;
        let body = serde_json::to_value(ReplayStart { id: spectator_id })?;
        self.sender
            .send_frame(BridgeFrame::send(addresses::replay_start(self.game_id), body))?;

        while self.snapshot.is_none() {
            let frame = self.next_frame().await?;
            self.route(frame);
        }
        self.bootstrapped = true;
        self.snapshot
            .take()
            .ok_or_else(|| ClientError::Protocol("replay produced no snapshot".to_string()))
    }

    /// Runs whichever registration and bootstrap the mode calls for.
    pub async fn bootstrap(&mut self, mode: &SessionMode) -> Result<Session, ClientError> {
        let (local_player, snapshot) = match mode {
            SessionMode::Player(player_id) => (*player_id, self.bootstrap_player().await?),
            SessionMode::Register(name) => {
                let player_id = self.register_player(name).await?;
                (player_id, self.bootstrap_player().await?)
            }
            SessionMode::Spectator(spectator_id) => (
                shared::SPECTATOR_ID,
                self.bootstrap_spectator(*spectator_id).await?,
            ),
            SessionMode::Replay(index) => {
                let spectator_id = self.register_spectator(*index).await?;
                (
                    shared::SPECTATOR_ID,
                    self.bootstrap_spectator(spectator_id).await?,
                )
            }
        };

        info!(
            "Bootstrapped game {} at round {} ({} players)",
            self.game_id,
            snapshot.round_id,
            snapshot.players.len()
        );

        Ok(Session {
            local_player,
            snapshot,
            commands: self.sender(),
        })
    }

    /// Routes pushes into the update queue until the connection goes away.
    pub async fn run(mut self) -> Result<(), ClientError> {
        let mut ping = interval(PING_INTERVAL);
        ping.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                frame = self.incoming.recv() => match frame {
                    Some(frame) => self.route(frame),
                    None => return Err(ClientError::TransportUnavailable),
                },
                _ = ping.tick() => self.sender.send_frame(BridgeFrame::Ping)?,
            }
        }
    }
}
