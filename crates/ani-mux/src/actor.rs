//! Multiplexer Actor
//!
//! Async front-end for a `MuxDevice`. Read requests arrive over a channel
//! and are executed one at a time; each blocking read runs on the blocking
//! thread pool and is awaited before the next request is taken, so reads
//! complete in the order they were sent and never overlap. A read whose
//! task panics is answered with `MuxError::ReadAborted` and the actor keeps
//! serving.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ani_mux::{spawn_mux_actor, MuxClient};
//!
//! let (client, task) = spawn_mux_actor(Arc::new(device), 64);
//! let value = client.read_raw(ChannelIndex(0)).await?;
//! client.shutdown().await?;
//! task.await?;
//! ```

use std::sync::Arc;

use ani_hal::{ChannelIndex, Delay, ParentChannel, Quantity, Sample, Scale, Selector};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::device::MuxDevice;
use crate::error::MuxError;

/// Commands sent to the multiplexer actor
#[derive(Debug)]
pub enum MuxActorCommand {
    /// Read a quantity from a logical channel
    Read {
        /// Logical channel
        channel: ChannelIndex,
        /// Requested quantity
        quantity: Quantity,
        /// Channel to send back the result
        response: oneshot::Sender<Result<Sample, MuxError>>,
    },

    /// Shutdown the actor
    Shutdown,
}

/// Run the multiplexer actor until shutdown or until all senders are gone
pub async fn run_mux_actor<S, P, D>(
    device: Arc<MuxDevice<S, P, D>>,
    mut cmd_rx: mpsc::Receiver<MuxActorCommand>,
) where
    S: Selector + 'static,
    P: ParentChannel + 'static,
    D: Delay + 'static,
{
    info!("Mux actor starting for {}", device.name());

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            MuxActorCommand::Read {
                channel,
                quantity,
                response,
            } => {
                let dev = Arc::clone(&device);
                let result =
                    tokio::task::spawn_blocking(move || dev.read(channel, quantity)).await;

                match result {
                    Ok(result) => {
                        if let Err(e) = &result {
                            debug!(
                                "{}: {} read on channel {} failed: {}",
                                device.name(),
                                quantity,
                                channel,
                                e
                            );
                        }
                        let _ = response.send(result);
                    }
                    Err(e) => {
                        warn!(
                            "{}: {} read on channel {} aborted: {}",
                            device.name(),
                            quantity,
                            channel,
                            e
                        );
                        let _ = response.send(Err(MuxError::ReadAborted(e.to_string())));
                    }
                }
            }
            MuxActorCommand::Shutdown => break,
        }
    }

    info!("Mux actor stopped for {}", device.name());
}

/// Spawn the actor on the current runtime and return a client for it
pub fn spawn_mux_actor<S, P, D>(
    device: Arc<MuxDevice<S, P, D>>,
    buffer_size: usize,
) -> (MuxClient, JoinHandle<()>)
where
    S: Selector + 'static,
    P: ParentChannel + 'static,
    D: Delay + 'static,
{
    let (tx, rx) = mpsc::channel(buffer_size);
    let task = tokio::spawn(run_mux_actor(device, rx));
    (MuxClient::new(tx), task)
}

/// Cloneable handle for sending reads to the actor
#[derive(Debug, Clone)]
pub struct MuxClient {
    tx: mpsc::Sender<MuxActorCommand>,
}

impl MuxClient {
    /// Wrap an existing command sender
    pub fn new(tx: mpsc::Sender<MuxActorCommand>) -> Self {
        Self { tx }
    }

    /// Read `quantity` from `channel`
    pub async fn read(
        &self,
        channel: ChannelIndex,
        quantity: Quantity,
    ) -> Result<Sample, MuxError> {
        let (response, rx) = oneshot::channel();
        self.tx
            .send(MuxActorCommand::Read {
                channel,
                quantity,
                response,
            })
            .await
            .map_err(|_| MuxError::ActorClosed)?;

        rx.await.map_err(|_| MuxError::ActorClosed)?
    }

    /// Read a raw value from `channel`
    pub async fn read_raw(&self, channel: ChannelIndex) -> Result<i32, MuxError> {
        let sample = self.read(channel, Quantity::Raw).await?;
        sample.as_raw().ok_or(MuxError::Unsupported {
            channel,
            quantity: Quantity::Raw,
        })
    }

    /// Read the scale reported for `channel`
    pub async fn read_scale(&self, channel: ChannelIndex) -> Result<Scale, MuxError> {
        let sample = self.read(channel, Quantity::Scale).await?;
        sample.as_scale().ok_or(MuxError::Unsupported {
            channel,
            quantity: Quantity::Scale,
        })
    }

    /// Ask the actor to stop after the requests already queued
    pub async fn shutdown(&self) -> Result<(), MuxError> {
        self.tx
            .send(MuxActorCommand::Shutdown)
            .await
            .map_err(|_| MuxError::ActorClosed)
    }
}
