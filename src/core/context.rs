use crate::core::bridge::TaskBridge;
use crate::core::client::{SkillClient, SkillResult};
use crate::core::error::NodeError;
use crate::core::settings::BridgeSettings;
use crate::core::telemetry::{CallOutcome, CallTrace, Telemetry};
use crate::core::types::{CallResult, Skill};
use std::future::Future;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// What every operation script runs against: one shared skill client
/// session plus the settings for driving tasks through the [`TaskBridge`].
///
/// Cloning is cheap; all clones share the same session.
#[derive(Clone)]
pub struct EditorContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    client: Arc<dyn SkillClient>,
    settings: BridgeSettings,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl EditorContext {
    pub fn new<C: SkillClient>(client: C) -> Self {
        Self::from_arc(Arc::new(client))
    }

    pub fn from_arc(client: Arc<dyn SkillClient>) -> Self {
        EditorContext {
            inner: Arc::new(ContextInner {
                client,
                settings: BridgeSettings::default(),
                telemetry: None,
            }),
        }
    }

    pub fn with_settings(self, settings: BridgeSettings) -> Self {
        EditorContext {
            inner: Arc::new(ContextInner {
                client: Arc::clone(&self.inner.client),
                settings,
                telemetry: self.inner.telemetry.clone(),
            }),
        }
    }

    /// Records a [`CallTrace`] for every skill call made through this context.
    pub fn with_telemetry(self, telemetry: Arc<dyn Telemetry>) -> Self {
        EditorContext {
            inner: Arc::new(ContextInner {
                client: Arc::clone(&self.inner.client),
                settings: self.inner.settings.clone(),
                telemetry: Some(telemetry),
            }),
        }
    }

    pub fn client(&self) -> &dyn SkillClient {
        self.inner.client.as_ref()
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.inner.settings
    }

    /// Awaits one skill call and converts its tagged result.
    ///
    /// This is the only place where an error-tagged [`CallResult`] becomes a
    /// [`NodeError::Skill`]; scripts never see the tagged form.
    pub async fn call<T, F>(&self, skill: Skill, call: F) -> Result<T, NodeError>
    where
        F: Future<Output = SkillResult<T>>,
    {
        let started = Instant::now();
        let response = call.await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let outcome = match &response {
            Ok(CallResult::Success(_)) => {
                log::debug!("{skill} call succeeded in {elapsed_ms}ms");
                CallOutcome::Success
            }
            Ok(CallResult::Error { message }) => {
                log::warn!("{skill} call rejected after {elapsed_ms}ms: {message}");
                CallOutcome::Rejected(message.clone())
            }
            Err(err) => {
                log::warn!("{skill} call failed after {elapsed_ms}ms: {err}");
                CallOutcome::TransportFailed(err.to_string())
            }
        };

        if let Some(telemetry) = &self.inner.telemetry {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            telemetry.record(CallTrace {
                timestamp,
                skill,
                elapsed_ms,
                outcome,
            });
        }

        response?.into_result(skill)
    }

    /// Runs one operation script to completion from synchronous code.
    ///
    /// `task_body` receives a clone of this context and `params`; the future
    /// it returns is run on the process-wide [`TaskBridge`], bounded by the
    /// configured task timeout. Errors raised by the script come back
    /// unchanged.
    pub fn run_one_sync<P, T, F, Fut>(&self, task_body: F, params: P) -> Result<T, NodeError>
    where
        F: FnOnce(EditorContext, P) -> Fut,
        Fut: Future<Output = Result<T, NodeError>> + Send + 'static,
        T: Send + 'static,
    {
        let bridge = TaskBridge::acquire()?;
        let task = task_body(self.clone(), params);

        match self.inner.settings.task_timeout {
            Some(limit) => bridge.run(async move {
                match tokio::time::timeout(limit, task).await {
                    Ok(result) => result,
                    Err(_) => {
                        log::warn!("Task exceeded its {limit:?} limit and was dropped");
                        Err(NodeError::Timeout { limit })
                    }
                }
            }),
            None => bridge.run(task),
        }
    }

    /// Closes the client session and stops the process-wide bridge.
    pub fn shutdown(&self) {
        let closed = self.run_one_sync(
            |ctx, ()| async move {
                ctx.client().close().await;
                Ok::<(), NodeError>(())
            },
            (),
        );
        if let Err(err) = closed {
            log::warn!("Could not close the skill client cleanly: {err}");
        }
        if let Some(telemetry) = &self.inner.telemetry {
            telemetry.flush();
        }
        TaskBridge::shutdown_timeout(self.inner.settings.shutdown_grace);
    }
}
