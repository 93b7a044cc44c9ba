//! Shutting the process-wide bridge down and starting it again.
//!
//! Kept in its own test binary: a shutdown stops the bridge every other test
//! in the same process would be sharing.

use skill_nodes::ops::subject;
use skill_nodes::{EditorContext, StateId, StubSkillClient, TaskBridge};
use std::sync::Arc;

#[test]
fn test_shutdown_closes_the_session_and_a_new_bridge_starts_on_demand() {
    let stub = Arc::new(StubSkillClient::new());
    let ctx = EditorContext::from_arc(stub.clone());
    let params = || subject::Params {
        image: StateId::from("photo"),
    };

    assert_eq!(ctx.run_one_sync(subject::run, params()).unwrap(), "subject of photo");
    let first = TaskBridge::acquire().unwrap().id();

    ctx.shutdown();
    assert!(stub.is_closed());
    assert!(!TaskBridge::is_running());

    // The next call brings up a fresh bridge.
    assert_eq!(ctx.run_one_sync(subject::run, params()).unwrap(), "subject of photo");
    let second = TaskBridge::acquire().unwrap();
    assert_ne!(second.id(), first);
    assert!(TaskBridge::is_running());
    assert_eq!(stub.call_count(), 2);
}
