use crate::error::ClientError;
use crate::input::{DirectionalInput, InputGate};
use crate::network::CommandSink;
use crate::queue::UpdateQueue;
use crate::reconcile::{reconcile, ReconcileReport};
use crate::sprite::RenderAdapter;
use crate::world::WorldState;
use log::{error, warn};
use shared::MoveCommand;

/// What happened during one tick.
#[derive(Debug, Default)]
pub struct TickReport {
    pub reconcile: ReconcileReport,
    pub sent: Option<MoveCommand>,
}

/// Drives one bootstrapped session: server rounds first, then local input.
pub struct GameClient {
    pub world: WorldState,
    queue: UpdateQueue,
    gate: InputGate,
}

impl GameClient {
    pub fn new(world: WorldState, queue: UpdateQueue, gate: InputGate) -> Self {
        Self { world, queue, gate }
    }

    pub fn queue(&self) -> &UpdateQueue {
        &self.queue
    }

    /// Applies every queued round, then samples input once.
    ///
    /// Errors are logged and reported; they never abort the tick.
    pub fn tick(
        &mut self,
        input: DirectionalInput,
        render: &mut dyn RenderAdapter,
        sink: &mut dyn CommandSink,
    ) -> TickReport {
        let reconcile = reconcile(&mut self.world, &self.queue, render);

        let sent = match self.gate.poll(&mut self.world, input, render, sink) {
            Ok(cmd) => cmd,
            Err(ClientError::TransportUnavailable) => {
                error!("Cannot send move: transport unavailable");
                None
            }
            Err(e) => {
                warn!("Input skipped: {}", e);
                None
            }
        };

        TickReport { reconcile, sent }
    }
}
