//! Persistence worker loop.

use crate::backend::bridge::{PersistenceBridge, PersistenceCommand, PersistenceMessage};
use crate::backend::PipelineStore;
use crate::error::{Result, ThothError};
use crossbeam_channel::{Receiver, Sender};
use std::thread::JoinHandle;

/// Owns a [`PipelineStore`] and serves UI commands one at a time.
pub struct PersistenceWorker {
    store: Box<dyn PipelineStore>,
    command_rx: Receiver<PersistenceCommand>,
    message_tx: Sender<PersistenceMessage>,
}

impl PersistenceWorker {
    pub fn new(
        store: Box<dyn PipelineStore>,
        command_rx: Receiver<PersistenceCommand>,
        message_tx: Sender<PersistenceMessage>,
    ) -> Self {
        Self {
            store,
            command_rx,
            message_tx,
        }
    }

    /// Block on commands until `Shutdown` or until the UI side hangs up.
    pub fn run(&mut self) {
        tracing::info!("Persistence worker started");

        while let Ok(cmd) = self.command_rx.recv() {
            if matches!(cmd, PersistenceCommand::Shutdown) {
                break;
            }
            let msg = self.handle_command(cmd);
            if self.message_tx.send(msg).is_err() {
                break;
            }
        }

        let _ = self.message_tx.send(PersistenceMessage::Shutdown);
        tracing::info!("Persistence worker stopped");
    }

    /// Execute one command against the store and build the reply.
    pub fn handle_command(&mut self, cmd: PersistenceCommand) -> PersistenceMessage {
        let Some(operation) = cmd.operation() else {
            return PersistenceMessage::Shutdown;
        };

        let result = match cmd {
            PersistenceCommand::ListPipelines => self
                .store
                .list_pipelines()
                .map(PersistenceMessage::PipelineList),
            PersistenceCommand::OpenPipeline(id) => self
                .store
                .get_pipeline(&id)
                .map(PersistenceMessage::PipelineOpened),
            PersistenceCommand::CreatePipeline(request) => self
                .store
                .create_pipeline(&request)
                .and_then(|doc| match doc.id {
                    Some(_) => Ok(PersistenceMessage::PipelineCreated(doc)),
                    None => Err(ThothError::Serialization(
                        "create response carries no pipeline id".to_string(),
                    )),
                }),
            PersistenceCommand::UpdatePipeline { id, request } => self
                .store
                .update_pipeline(&id, &request)
                .map(|mut doc| {
                    doc.id.get_or_insert(id);
                    PersistenceMessage::PipelineUpdated(doc)
                }),
            PersistenceCommand::Shutdown => return PersistenceMessage::Shutdown,
        };

        result.unwrap_or_else(|err| {
            tracing::warn!("Failed to {}: {}", operation, err);
            PersistenceMessage::Error {
                operation,
                message: err.to_string(),
            }
        })
    }
}

/// Start a worker thread for `store` and return the UI-side bridge.
pub fn spawn_worker(store: Box<dyn PipelineStore>) -> Result<(PersistenceBridge, JoinHandle<()>)> {
    let (bridge, cmd_rx, msg_tx) = PersistenceBridge::new();
    let handle = std::thread::Builder::new()
        .name("thoth-persistence".to_string())
        .spawn(move || PersistenceWorker::new(store, cmd_rx, msg_tx).run())?;
    Ok((bridge, handle))
}
