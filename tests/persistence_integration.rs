//! Integration tests for the persistence worker
//!
//! These tests run the real worker thread against an in-memory Brain:
//! - Create, list, open and update round trips
//! - Backend failures surfacing as error messages
//! - Clean shutdown

mod common;

use common::builders::chain;
use common::fake_store::FakeBrain;
use common::test_timeout;
use std::time::Instant;
use thoth_studio::backend::{spawn_worker, Operation, PersistenceBridge, PersistenceMessage};
use thoth_studio::pipeline::{DataType, GraphStore};

/// Wait for the next message from the worker.
fn next_message(bridge: &PersistenceBridge) -> PersistenceMessage {
    let deadline = Instant::now() + test_timeout();
    loop {
        if let Some(msg) = bridge.try_recv() {
            return msg;
        }
        assert!(Instant::now() < deadline, "no reply from persistence worker");
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
}

#[test]
fn test_create_list_open_update() {
    let brain = FakeBrain::new();
    let (bridge, handle) = spawn_worker(Box::new(brain.clone())).unwrap();

    let (mut store, ids) = chain(DataType::Csi, &["csi_loader", "amplitude_extractor"]);
    assert!(bridge.create_pipeline(store.create_request("gestures", "room A")));
    let id = match next_message(&bridge) {
        PersistenceMessage::PipelineCreated(doc) => doc.id.unwrap(),
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(brain.len(), 1);

    assert!(bridge.list_pipelines());
    match next_message(&bridge) {
        PersistenceMessage::PipelineList(list) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].name, "gestures");
        }
        other => panic!("unexpected {:?}", other),
    }

    store.delete_block(&ids[1]).unwrap();
    assert!(bridge.update_pipeline(id.clone(), store.update_request()));
    assert!(matches!(
        next_message(&bridge),
        PersistenceMessage::PipelineUpdated(_)
    ));
    assert_eq!(brain.get(&id).unwrap().blocks.len(), 1);

    assert!(bridge.open_pipeline(id.clone()));
    match next_message(&bridge) {
        PersistenceMessage::PipelineOpened(doc) => {
            let mut reopened = GraphStore::new(DataType::Csi);
            reopened.load_document(&doc).unwrap();
            assert_eq!(reopened.blocks(), store.blocks());
            assert_eq!(doc.name, "gestures");
        }
        other => panic!("unexpected {:?}", other),
    }

    bridge.shutdown();
    assert!(handle.join().is_ok());
}

#[test]
fn test_backend_failure_is_reported() {
    let brain = FakeBrain::new();
    let (bridge, handle) = spawn_worker(Box::new(brain.clone())).unwrap();

    brain.fail_next(500, "database locked");
    let store = GraphStore::new(DataType::Imu);
    assert!(bridge.create_pipeline(store.create_request("x", "")));
    match next_message(&bridge) {
        PersistenceMessage::Error { operation, message } => {
            assert_eq!(operation, Operation::Create);
            assert!(message.contains("database locked"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(brain.len(), 0);

    // The worker keeps serving after a failure
    assert!(bridge.open_pipeline("missing".to_string()));
    assert!(matches!(
        next_message(&bridge),
        PersistenceMessage::Error {
            operation: Operation::Open,
            ..
        }
    ));

    bridge.shutdown();
    assert!(handle.join().is_ok());
}

#[test]
fn test_shutdown_is_acknowledged() {
    let (bridge, handle) = spawn_worker(Box::new(FakeBrain::new())).unwrap();
    bridge.shutdown();
    assert!(handle.join().is_ok());
    assert!(matches!(bridge.try_recv(), Some(PersistenceMessage::Shutdown)));
}
