use clap::Parser;
use client::config::{ClientConfig, SessionMode};
use client::error::ClientError;
use client::game::GameClient;
use client::input::{DirectionalInput, InputGate};
use client::network::{BusClient, BusSender, Session};
use client::queue::UpdateQueue;
use client::rendering::{Renderer, UiConfig};
use client::world::WorldState;
use log::{error, info, warn};
use macroquad::prelude::*;
use shared::{TileMap, WINDOW_HEIGHT, WINDOW_WIDTH};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread;

enum Phase {
    Connecting,
    Running { game: GameClient, commands: BusSender },
    Failed(String),
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Tile Game Client".to_owned(),
        window_width: WINDOW_WIDTH as i32,
        window_height: WINDOW_HEIGHT as i32,
        ..Default::default()
    }
}

fn load_map(config: &ClientConfig) -> Result<TileMap, ClientError> {
    let json = std::fs::read_to_string(&config.map)?;
    TileMap::from_json(&json)
        .map_err(|e| ClientError::Map(format!("{}: {}", config.map.display(), e)))
}

async fn load_sprites(config: &ClientConfig) -> Option<Texture2D> {
    let path = config.sprites.as_ref()?;
    match load_texture(&path.to_string_lossy()).await {
        Ok(texture) => Some(texture),
        Err(e) => {
            warn!("Could not load sprites from {}: {:?}", path.display(), e);
            None
        }
    }
}

/// Runs the bus connection on its own runtime; the session is handed back once.
fn spawn_transport(
    config: &ClientConfig,
    mode: SessionMode,
    queue: UpdateQueue,
) -> mpsc::Receiver<Result<Session, ClientError>> {
    let (tx, rx) = mpsc::channel();
    let addr = config.bus.clone();
    let game_id = config.game;

    thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                let _ = tx.send(Err(e.into()));
                return;
            }
        };

        runtime.block_on(async move {
            let mut bus = match BusClient::connect(&addr, game_id, queue).await {
                Ok(bus) => bus,
                Err(e) => {
                    let _ = tx.send(Err(e));
                    return;
                }
            };

            match bus.bootstrap(&mode).await {
                Ok(session) => {
                    let _ = tx.send(Ok(session));
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    return;
                }
            }

            if let Err(e) = bus.run().await {
                error!("Transport stopped: {}", e);
            }
        });
    });

    rx
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ClientConfig::parse();
    let mode = match config.mode() {
        Ok(mode) => mode,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let map = match load_map(&config) {
        Ok(map) => Arc::new(map),
        Err(e) => {
            error!("Failed to load map: {}", e);
            return;
        }
    };

    info!("Starting client for game {} as {:?}", config.game, mode);
    info!("Connecting to bus at {}", config.bus);
    info!("Controls: arrow keys or WASD to move, Escape to quit");

    let mut renderer = Renderer::new(map.clone(), &config.walls_layer, load_sprites(&config).await);
    let queue = UpdateQueue::new();
    let sessions = spawn_transport(&config, mode, queue.clone());
    let mut phase = Phase::Connecting;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        if let Phase::Connecting = phase {
            phase = match sessions.try_recv() {
                Ok(Ok(session)) => match WorldState::from_snapshot(
                    &config.map_name(),
                    config.game,
                    session.local_player,
                    &session.snapshot,
                    &mut renderer,
                ) {
                    Ok(mut world) => {
                        world.attach_map(map.clone());
                        let gate = InputGate::new(&config.walls_layer);
                        Phase::Running {
                            game: GameClient::new(world, queue.clone(), gate),
                            commands: session.commands,
                        }
                    }
                    Err(e) => Phase::Failed(e.to_string()),
                },
                Ok(Err(e)) => match e.failure_code() {
                    Some(code) => Phase::Failed(format!("bus refused the session ({})", code)),
                    None => Phase::Failed(e.to_string()),
                },
                Err(TryRecvError::Empty) => Phase::Connecting,
                Err(TryRecvError::Disconnected) => {
                    Phase::Failed("transport thread exited".to_string())
                }
            };

            if let Phase::Failed(reason) = &phase {
                error!("Bootstrap failed: {}", reason);
            }
        }

        match &mut phase {
            Phase::Connecting => renderer.render_connecting("Connecting..."),
            Phase::Failed(reason) => renderer.render_connecting(&format!("Failed: {}", reason)),
            Phase::Running { game, commands } => {
                game.tick(DirectionalInput::sample_keyboard(), &mut renderer, commands);
                renderer.render(&game.world, UiConfig::from_world(&game.world, queue.len()));
            }
        }

        next_frame().await;
    }

    info!("Client shutting down");
}
