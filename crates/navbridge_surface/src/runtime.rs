//! Single-owner tokio actor around a `NavigationSurface`.
//!
//! Every lifecycle transition of one surface runs on this task. Background work
//! (route responses, init retries, origin lookups) posts its result back into
//! the same channel, so the surface never sees concurrent mutation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::sync::{broadcast, oneshot};

use navbridge_core::error::{CoreError, Domain, ErrorKind};
use navbridge_core::geo::Coordinate;
use navbridge_core::logging::log_core_error;
use navbridge_core::route::{RouteOutcome, RouteTicket};
use navbridge_core::Result;

use crate::engine::GuidanceUpdate;
use crate::surface::{Deferred, NavigationSurface, StateTransition, SurfaceCommand, SurfaceSnapshot};

/// Everything the runtime task consumes, in arrival order.
#[derive(Debug)]
pub enum SurfaceInput {
    Command {
        command: SurfaceCommand,
        reply: Option<oneshot::Sender<Result<()>>>,
    },
    RouteResponse {
        ticket: RouteTicket,
        outcome: RouteOutcome,
    },
    Guidance(GuidanceUpdate),
    RetryObservers {
        generation: u64,
        attempt: u32,
    },
    OriginResolved {
        generation: u64,
        result: Result<Coordinate>,
    },
    Snapshot(oneshot::Sender<SurfaceSnapshot>),
    Shutdown,
}

/// Cloneable handle to a running surface. Dropping every handle detaches it.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    owner_id: Arc<str>,
    inputs: UnboundedSender<SurfaceInput>,
    transitions: broadcast::Sender<StateTransition>,
}

impl SurfaceHandle {
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Apply a host command and wait for its result.
    pub async fn send(&self, command: SurfaceCommand) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.post(SurfaceInput::Command {
            command,
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| runtime_stopped())?
    }

    /// Enqueue an input without waiting.
    pub fn post(&self, input: SurfaceInput) -> Result<()> {
        self.inputs.send(input).map_err(|_| runtime_stopped())
    }

    pub async fn snapshot(&self) -> Result<SurfaceSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.post(SurfaceInput::Snapshot(reply))?;
        rx.await.map_err(|_| runtime_stopped())
    }

    pub fn subscribe_transitions(&self) -> broadcast::Receiver<StateTransition> {
        self.transitions.subscribe()
    }

    /// Detach the surface and stop the task once queued inputs are handled.
    pub fn shutdown(&self) -> Result<()> {
        self.post(SurfaceInput::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.inputs.is_closed()
    }
}

pub struct SurfaceRuntime {
    surface: NavigationSurface,
    inputs: UnboundedReceiver<SurfaceInput>,
    // Weak so pending background work never keeps the runtime alive.
    poster: WeakUnboundedSender<SurfaceInput>,
}

impl SurfaceRuntime {
    /// Wire `surface` to a fresh channel. Guidance callbacks are routed into it.
    pub fn new(mut surface: NavigationSurface) -> (Self, SurfaceHandle) {
        let (tx, inputs) = mpsc::unbounded_channel();
        let poster = tx.downgrade();

        let sink_poster = poster.clone();
        surface.set_observer_sink(Arc::new(move |update: GuidanceUpdate| {
            post(&sink_poster, SurfaceInput::Guidance(update));
        }));

        let handle = SurfaceHandle {
            owner_id: Arc::from(surface.owner_id()),
            inputs: tx,
            transitions: surface.transition_sender(),
        };

        (
            Self {
                surface,
                inputs,
                poster,
            },
            handle,
        )
    }

    /// Spawn the runtime on the current tokio runtime.
    pub fn spawn(surface: NavigationSurface) -> SurfaceHandle {
        let (runtime, handle) = Self::new(surface);
        tokio::spawn(runtime.run());
        handle
    }

    /// Process inputs until shutdown or until every handle is dropped.
    /// Returns the detached surface.
    pub async fn run(mut self) -> NavigationSurface {
        tracing::debug!(owner = %self.surface.owner_id(), "surface runtime started");

        while let Some(input) = self.inputs.recv().await {
            let keep_running = self.handle_input(input);
            self.drain_deferred();
            if !keep_running {
                break;
            }
        }

        if let Err(err) = self.surface.detach() {
            log_core_error(&err);
        }
        tracing::debug!(owner = %self.surface.owner_id(), "surface runtime stopped");
        self.surface
    }

    fn handle_input(&mut self, input: SurfaceInput) -> bool {
        match input {
            SurfaceInput::Command { command, reply } => {
                let name = command.name();
                let result = self.surface.apply(command);
                if let Err(err) = &result {
                    tracing::debug!(command = name, "command rejected");
                    log_core_error(err);
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            SurfaceInput::RouteResponse { ticket, outcome } => {
                report(self.surface.on_route_response(ticket, outcome));
            }
            SurfaceInput::Guidance(update) => {
                report(self.surface.on_guidance(update, Instant::now()));
            }
            SurfaceInput::RetryObservers {
                generation,
                attempt,
            } => self.surface.retry_observers(generation, attempt),
            SurfaceInput::OriginResolved { generation, result } => {
                report(self.surface.origin_resolved(generation, result));
            }
            SurfaceInput::Snapshot(reply) => {
                let _ = reply.send(self.surface.snapshot());
            }
            SurfaceInput::Shutdown => return false,
        }
        true
    }

    fn drain_deferred(&mut self) {
        for work in self.surface.take_deferred() {
            let poster = self.poster.clone();
            match work {
                Deferred::AwaitRoute { ticket, pending } => {
                    tokio::spawn(async move {
                        let outcome = pending.await;
                        post(&poster, SurfaceInput::RouteResponse { ticket, outcome });
                    });
                }
                Deferred::RetryObservers {
                    generation,
                    attempt,
                    delay,
                } => {
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        post(
                            &poster,
                            SurfaceInput::RetryObservers {
                                generation,
                                attempt,
                            },
                        );
                    });
                }
                Deferred::ResolveOrigin {
                    generation,
                    timeout,
                    lookup,
                } => {
                    tokio::spawn(async move {
                        let result = match tokio::time::timeout(timeout, lookup).await {
                            Ok(result) => result,
                            Err(_) => Err(origin_timeout(timeout)),
                        };
                        post(&poster, SurfaceInput::OriginResolved { generation, result });
                    });
                }
            }
        }
    }
}

fn post(poster: &WeakUnboundedSender<SurfaceInput>, input: SurfaceInput) {
    match poster.upgrade() {
        Some(tx) => {
            let _ = tx.send(input);
        }
        None => tracing::trace!("surface runtime gone; dropping background result"),
    }
}

fn report(result: Result<()>) {
    if let Err(err) = result {
        log_core_error(&err);
    }
}

fn runtime_stopped() -> CoreError {
    CoreError::warn()
        .domain(Domain::Bridge)
        .kind(ErrorKind::InvalidState)
        .msg("surface runtime has stopped")
        .build()
}

fn origin_timeout(timeout: Duration) -> CoreError {
    CoreError::error()
        .domain(Domain::Other)
        .kind(ErrorKind::Timeout)
        .msgf(format_args!("device location not available within {timeout:?}"))
        .build()
}
