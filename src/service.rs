//! The event loop.
//!
//! One task owns the transport and drives the [`Engine`] behind a
//! single mutex: inbound packets, connect/disconnect commands, and a
//! 50 ms base tick (refresh batches ride the tick directly; the poll,
//! countdown and persistence cadences are tracked inside the engine).
//! API callers reach the same engine through [`Handle::with_engine`],
//! so every mutation is serialized by the one lock.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::engine::Engine;
use crate::enums::CoreError;
use crate::osc::Buffer;
use crate::show::files::ShowFiles;
use crate::show::settings::OscSettings;
use crate::transport::{Transport, TransportEvent};

/// base tick; the finest cadence anything in the engine needs
const BASE_TICK: Duration = Duration::from_millis(50);
/// command channel depth
const COMMAND_DEPTH: usize = 16;

/// Lifecycle commands that must reach the loop task
enum Command {
    /// open a transport with these parameters
    Connect(OscSettings, oneshot::Sender<Result<(), CoreError>>),
    /// drop the transport
    Disconnect(oneshot::Sender<()>),
}

/// Spawns the event loop
pub struct Service;

impl Service {
    /// Start the service on the current tokio runtime. `root`
    /// overrides the data directory (tests, portable installs).
    ///
    /// # Errors
    /// reserved for future startup failures; loading is tolerant today
    pub fn spawn(root: Option<PathBuf>) -> Result<Handle, CoreError> {
        let files = root.map_or_else(ShowFiles::default_location, ShowFiles::new);
        let engine = Arc::new(Mutex::new(Engine::new(files)));

        let (commands, rx) = mpsc::channel(COMMAND_DEPTH);
        tokio::spawn(run(engine.clone(), rx));

        Ok(Handle { engine, commands })
    }
}

/// Cloneable handle to the running service
#[derive(Clone)]
pub struct Handle {
    /// the engine, shared with the loop task
    engine: Arc<Mutex<Engine>>,
    /// lifecycle command channel
    commands: mpsc::Sender<Command>,
}

impl Handle {
    /// Connect to the console; resolves once the socket is open
    ///
    /// # Errors
    /// connect refusal, or the service task is gone
    pub async fn connect(&self, settings: OscSettings) -> Result<(), CoreError> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::Connect(settings, tx)).await
            .map_err(|_| CoreError::ServiceGone)?;
        rx.await.map_err(|_| CoreError::ServiceGone)?
    }

    /// Drop the console connection
    ///
    /// # Errors
    /// the service task is gone
    pub async fn disconnect(&self) -> Result<(), CoreError> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::Disconnect(tx)).await
            .map_err(|_| CoreError::ServiceGone)?;
        rx.await.map_err(|_| CoreError::ServiceGone)
    }

    /// Queue a bulk refresh of one cue list
    ///
    /// # Errors
    /// reserved; queueing itself cannot fail
    pub async fn refresh(&self, list: i32) -> Result<(), CoreError> {
        self.with_engine(move |engine| engine.request_refresh(list, Instant::now())).await;
        Ok(())
    }

    /// Run a closure against the engine under its lock. This is the
    /// API surface handed to HTTP handlers: the engine is passed
    /// explicitly, mutations are serialized, nothing global.
    pub async fn with_engine<F, R>(&self, f: F) -> R where
        F: FnOnce(&mut Engine) -> R
    {
        let mut engine = self.engine.lock().await;
        f(&mut engine)
    }
}

/// The loop task
async fn run(engine: Arc<Mutex<Engine>>, mut commands: mpsc::Receiver<Command>) {
    let mut transport: Option<Transport> = None;
    let mut events: Option<mpsc::Receiver<TransportEvent>> = None;

    let mut tick = tokio::time::interval(BASE_TICK);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let out = {
                    let mut engine = engine.lock().await;
                    engine.tick(Instant::now());
                    engine.take_outbox()
                };
                deliver(&mut transport, &engine, out).await;
            },

            cmd = commands.recv() => match cmd {
                None => {
                    info!("all handles dropped; service stopping");
                    return;
                },
                Some(Command::Connect(settings, reply)) => {
                    if let Some(mut old) = transport.take() {
                        old.close();
                    }
                    match Transport::connect(&settings).await {
                        Ok((t, rx)) => {
                            transport = Some(t);
                            events = Some(rx);
                            engine.lock().await.set_osc_settings(settings);
                            let _ = reply.send(Ok(()));
                        },
                        Err(error) => {
                            let _ = reply.send(Err(error));
                        },
                    }
                },
                Some(Command::Disconnect(reply)) => {
                    if let Some(mut old) = transport.take() {
                        old.close();
                    }
                    events = None;
                    engine.lock().await.on_transport_closed();
                    let _ = reply.send(());
                },
            },

            event = next_event(&mut events) => match event {
                None => events = None,
                Some(TransportEvent::Ready) => {
                    let out = {
                        let mut engine = engine.lock().await;
                        engine.on_transport_ready(Instant::now());
                        engine.take_outbox()
                    };
                    deliver(&mut transport, &engine, out).await;
                },
                Some(TransportEvent::Packet(buffer)) => {
                    let out = {
                        let mut engine = engine.lock().await;
                        engine.ingest(buffer, Instant::now());
                        engine.take_outbox()
                    };
                    deliver(&mut transport, &engine, out).await;
                },
                Some(TransportEvent::Closed) => {
                    transport = None;
                    events = None;
                    engine.lock().await.on_transport_closed();
                },
            },
        }
    }
}

/// Receive from the inbound stream when one exists
async fn next_event(events: &mut Option<mpsc::Receiver<TransportEvent>>) -> Option<TransportEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Push queued messages out. A failed write closes the connection;
/// nothing is retried or queued for later.
async fn deliver(transport: &mut Option<Transport>, engine: &Arc<Mutex<Engine>>, buffers: Vec<Buffer>) {
    if buffers.is_empty() {
        return;
    }
    let Some(t) = transport.as_mut() else { return };

    for buffer in buffers {
        if let Err(error) = t.send(&buffer).await {
            warn!(%error, "send failed; dropping connection");
            *transport = None;
            engine.lock().await.on_transport_closed();
            return;
        }
    }
}
