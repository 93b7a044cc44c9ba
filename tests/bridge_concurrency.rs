//! Integration tests for driving tasks through the shared bridge from
//! several threads, including the bridge's own.

use skill_nodes::ops::subject;
use skill_nodes::{
    BridgeSettings, EditorContext, NodeError, Skill, StateId, StubSkillClient, TaskBridge,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn infer(ctx: &EditorContext, image: &str) -> Result<String, NodeError> {
    ctx.run_one_sync(
        subject::run,
        subject::Params {
            image: StateId::from(image),
        },
    )
}

#[test]
fn test_concurrent_callers_get_their_own_results() {
    let stub = Arc::new(StubSkillClient::new().delay_state("slow", Duration::from_millis(300)));
    let ctx = EditorContext::from_arc(stub.clone());

    let slow = {
        let ctx = ctx.clone();
        thread::spawn(move || {
            let started = Instant::now();
            (infer(&ctx, "slow"), started.elapsed())
        })
    };
    // Give the slow call a head start so it is in flight first.
    thread::sleep(Duration::from_millis(20));
    let fast = {
        let ctx = ctx.clone();
        thread::spawn(move || {
            let started = Instant::now();
            (infer(&ctx, "fast"), started.elapsed())
        })
    };

    let (fast_result, fast_elapsed) = fast.join().unwrap();
    let (slow_result, slow_elapsed) = slow.join().unwrap();

    assert_eq!(fast_result.unwrap(), "subject of fast");
    assert_eq!(slow_result.unwrap(), "subject of slow");
    assert!(slow_elapsed >= Duration::from_millis(300));
    // The loop keeps serving others while the slow call waits.
    assert!(fast_elapsed < Duration::from_millis(300), "fast took {fast_elapsed:?}");
    assert_eq!(stub.call_count(), 2);
}

#[test]
fn test_many_threads_share_one_bridge() {
    let ctx = EditorContext::new(StubSkillClient::new());
    let bridge = TaskBridge::acquire().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ctx = ctx.clone();
            thread::spawn(move || infer(&ctx, &format!("image-{i}")))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap().unwrap(), format!("subject of image-{i}"));
    }
    assert!(Arc::ptr_eq(&bridge, &TaskBridge::acquire().unwrap()));
}

#[test]
fn test_sync_call_from_the_loop_thread_completes() {
    let ctx = EditorContext::new(StubSkillClient::new());

    // A node callback that runs while the loop is busy with another task,
    // on the loop's own thread.
    let (on_loop, nested) = ctx
        .run_one_sync(
            |ctx, image: StateId| async move {
                let on_loop = TaskBridge::acquire()?.on_loop_thread();
                let nested = infer(&ctx, image.as_str())?;
                Ok::<_, NodeError>((on_loop, nested))
            },
            StateId::from("inner"),
        )
        .unwrap();

    assert!(on_loop);
    assert_eq!(nested, "subject of inner");
}

#[test]
fn test_nested_errors_propagate_to_the_outer_caller() {
    let ctx = EditorContext::new(StubSkillClient::new().fail(Skill::InferMainSubject, "blurry"));

    let err = ctx
        .run_one_sync(
            |ctx, ()| async move { infer(&ctx, "photo") },
            (),
        )
        .unwrap_err();

    assert!(matches!(err, NodeError::Skill { ref message, .. } if message == "blurry"));
}

#[test]
fn test_timeout_applies_per_task() {
    let stub = StubSkillClient::new().delay_state("stuck", Duration::from_secs(10));
    let settings = BridgeSettings::default().with_task_timeout(Some(Duration::from_millis(50)));
    let ctx = EditorContext::new(stub).with_settings(settings);

    let err = infer(&ctx, "stuck").unwrap_err();
    assert!(matches!(err, NodeError::Timeout { .. }));

    // The bridge is still usable afterwards.
    assert_eq!(infer(&ctx, "fine").unwrap(), "subject of fine");
}

#[test]
fn test_panics_resume_on_the_caller() {
    let ctx = EditorContext::new(StubSkillClient::new());
    let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        ctx.run_one_sync(
            |_ctx, ()| async move {
                if true {
                    panic!("script bug");
                }
                Ok::<(), NodeError>(())
            },
            (),
        )
    }));
    assert!(caught.is_err());

    assert_eq!(infer(&ctx, "after").unwrap(), "subject of after");
}
