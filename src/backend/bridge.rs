//! Thread boundary between the persistence worker and the UI.

use crate::pipeline::{
    CreatePipelineRequest, PipelineDocument, PipelineSummary, UpdatePipelineRequest,
};
use crossbeam_channel::{bounded, Receiver, Sender};

/// Which request an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Open,
    Create,
    Update,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::List => "list pipelines",
            Operation::Open => "open pipeline",
            Operation::Create => "create pipeline",
            Operation::Update => "save pipeline",
        };
        f.write_str(s)
    }
}

/// Commands sent from the UI thread to the worker.
#[derive(Debug, Clone)]
pub enum PersistenceCommand {
    ListPipelines,
    OpenPipeline(String),
    CreatePipeline(CreatePipelineRequest),
    UpdatePipeline {
        id: String,
        request: UpdatePipelineRequest,
    },
    Shutdown,
}

impl PersistenceCommand {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            PersistenceCommand::ListPipelines => Some(Operation::List),
            PersistenceCommand::OpenPipeline(_) => Some(Operation::Open),
            PersistenceCommand::CreatePipeline(_) => Some(Operation::Create),
            PersistenceCommand::UpdatePipeline { .. } => Some(Operation::Update),
            PersistenceCommand::Shutdown => None,
        }
    }
}

/// Messages sent from the worker to the UI thread.
#[derive(Debug, Clone)]
pub enum PersistenceMessage {
    PipelineList(Vec<PipelineSummary>),
    PipelineOpened(PipelineDocument),
    /// Create acknowledged; the document carries the assigned id.
    PipelineCreated(PipelineDocument),
    PipelineUpdated(PipelineDocument),
    Error { operation: Operation, message: String },
    /// Worker is shutting down.
    Shutdown,
}

const CMD_CHANNEL_CAPACITY: usize = 64;
const MSG_CHANNEL_CAPACITY: usize = 64;

/// UI-side handle to the persistence worker.
pub struct PersistenceBridge {
    pub cmd_tx: Sender<PersistenceCommand>,
    pub msg_rx: Receiver<PersistenceMessage>,
}

impl PersistenceBridge {
    pub fn new() -> (
        Self,
        Receiver<PersistenceCommand>,
        Sender<PersistenceMessage>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(CMD_CHANNEL_CAPACITY);
        let (msg_tx, msg_rx) = bounded(MSG_CHANNEL_CAPACITY);
        (Self { cmd_tx, msg_rx }, cmd_rx, msg_tx)
    }

    pub fn drain(&self) -> Vec<PersistenceMessage> {
        let mut msgs = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            msgs.push(msg);
        }
        msgs
    }

    pub fn try_recv(&self) -> Option<PersistenceMessage> {
        self.msg_rx.try_recv().ok()
    }

    /// Returns false when the worker is gone.
    pub fn send_command(&self, cmd: PersistenceCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    pub fn list_pipelines(&self) -> bool {
        self.send_command(PersistenceCommand::ListPipelines)
    }

    pub fn open_pipeline(&self, id: impl Into<String>) -> bool {
        self.send_command(PersistenceCommand::OpenPipeline(id.into()))
    }

    pub fn create_pipeline(&self, request: CreatePipelineRequest) -> bool {
        self.send_command(PersistenceCommand::CreatePipeline(request))
    }

    pub fn update_pipeline(&self, id: impl Into<String>, request: UpdatePipelineRequest) -> bool {
        self.send_command(PersistenceCommand::UpdatePipeline {
            id: id.into(),
            request,
        })
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(PersistenceCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_reach_receiver() {
        let (bridge, cmd_rx, _msg_tx) = PersistenceBridge::new();
        assert!(bridge.open_pipeline("p-1"));
        match cmd_rx.try_recv() {
            Ok(PersistenceCommand::OpenPipeline(id)) => assert_eq!(id, "p-1"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_send_fails_when_worker_gone() {
        let (bridge, cmd_rx, _msg_tx) = PersistenceBridge::new();
        drop(cmd_rx);
        assert!(!bridge.list_pipelines());
    }

    #[test]
    fn test_drain_collects_all() {
        let (bridge, _cmd_rx, msg_tx) = PersistenceBridge::new();
        msg_tx.send(PersistenceMessage::PipelineList(Vec::new())).unwrap();
        msg_tx.send(PersistenceMessage::Shutdown).unwrap();
        assert_eq!(bridge.drain().len(), 2);
        assert!(bridge.try_recv().is_none());
    }
}
