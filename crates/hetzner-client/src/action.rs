//! Waiting for Cloud actions to finish

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use hetzner_api::{Action, ActionStatus};

use crate::error::{ClientError, Result};

/// Delay between two status requests
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Total time to wait for an action
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_millis(300_000);

/// Anything that can report the current state of an action
#[async_trait]
pub trait ActionSource: Send + Sync {
    /// Fetch the action with the given id
    async fn fetch_action(&self, id: u64) -> Result<Action>;
}

/// Polling interval and overall budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }
}

impl PollConfig {
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upper bound on status requests for one wait
    #[must_use]
    pub fn max_requests(&self) -> u128 {
        let interval = self.interval.as_millis().max(1);
        self.timeout.as_millis().div_ceil(interval) + 1
    }
}

/// Observes an action until it succeeds, fails, times out or is cancelled
///
/// Only one status request is in flight at a time. The poller never changes
/// the action; state transitions happen on the server.
#[derive(Debug, Clone, Default)]
pub struct ActionPoller {
    config: PollConfig,
    cancel: Option<CancellationToken>,
}

impl ActionPoller {
    /// Create a poller with the given settings
    #[must_use]
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Abort the wait when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Poll until the action leaves `running`
    ///
    /// The timeout is checked before every request, so at most
    /// [`PollConfig::max_requests`] requests are made.
    ///
    /// # Errors
    /// - [`ClientError::ActionFailed`] if the action ends in `error`
    /// - [`ClientError::Timeout`] if the budget runs out first
    /// - [`ClientError::Cancelled`] if the cancellation token fires
    /// - [`ClientError::Config`] if the poll interval is zero
    /// - any error returned by `source`
    #[instrument(skip(self, source))]
    pub async fn wait<S>(&self, source: &S, id: u64) -> Result<Action>
    where
        S: ActionSource + ?Sized,
    {
        if self.config.interval.is_zero() {
            return Err(ClientError::Config(
                "poll interval must be greater than zero".into(),
            ));
        }
        let started = Instant::now();

        loop {
            if started.elapsed() > self.config.timeout {
                return Err(ClientError::Timeout {
                    id,
                    timeout: self.config.timeout,
                });
            }
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                return Err(ClientError::Cancelled { id });
            }

            let action = source.fetch_action(id).await?;
            debug!(status = %action.status, progress = action.progress, "polled action");

            match action.status {
                ActionStatus::Success => return Ok(action),
                ActionStatus::Error => {
                    return Err(ClientError::ActionFailed {
                        id,
                        code: action.error.as_ref().map(|e| e.code.clone()),
                        message: action.error_message().to_string(),
                    });
                }
                ActionStatus::Running => self.pause(id).await?,
            }
        }
    }

    async fn pause(&self, id: u64) -> Result<()> {
        match &self.cancel {
            Some(token) => tokio::select! {
                () = token.cancelled() => Err(ClientError::Cancelled { id }),
                () = sleep(self.config.interval) => Ok(()),
            },
            None => {
                sleep(self.config.interval).await;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hetzner_api::ActionError;

    /// Replays a fixed status sequence, repeating the last entry
    struct Scripted {
        statuses: Vec<ActionStatus>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(statuses: Vec<ActionStatus>) -> Self {
            Self {
                statuses,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ActionSource for Scripted {
        async fn fetch_action(&self, id: u64) -> Result<Action> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let status = self.statuses[call.min(self.statuses.len() - 1)];
            Ok(Action {
                id,
                command: "reboot_server".into(),
                status,
                progress: if status == ActionStatus::Running { 50 } else { 100 },
                started: "2024-01-01T00:00:00Z".parse().unwrap(),
                finished: None,
                resources: Vec::new(),
                error: (status == ActionStatus::Error).then(|| ActionError {
                    code: "action_failed".into(),
                    message: "Server is locked".into(),
                }),
            })
        }
    }

    struct Failing;

    #[async_trait]
    impl ActionSource for Failing {
        async fn fetch_action(&self, _id: u64) -> Result<Action> {
            Err(ClientError::Http {
                status: 500,
                status_text: "Internal Server Error".into(),
            })
        }
    }

    fn config(timeout_ms: u64) -> PollConfig {
        PollConfig::default().with_timeout(Duration::from_millis(timeout_ms))
    }

    #[test]
    fn test_default_config() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.max_requests(), 301);
        assert_eq!(self::config(2500).max_requests(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success() {
        let source = Scripted::new(vec![ActionStatus::Success]);
        let action = ActionPoller::default().wait(&source, 1).await.unwrap();
        assert_eq!(action.status, ActionStatus::Success);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_running() {
        let source = Scripted::new(vec![
            ActionStatus::Running,
            ActionStatus::Running,
            ActionStatus::Success,
        ]);
        let started = Instant::now();
        let action = ActionPoller::default().wait(&source, 2).await.unwrap();
        assert_eq!(action.id, 2);
        assert_eq!(source.calls(), 3);
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_requests() {
        let source = Scripted::new(vec![ActionStatus::Running]);
        let poller = ActionPoller::new(config(3000));

        let err = poller.wait(&source, 3).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { id: 3, .. }));
        assert_eq!(err.to_string(), "Action 3 timed out after 3000ms");
        assert!(source.calls() as u128 <= poller.config().max_requests());
        assert!(source.calls() >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_with_partial_interval() {
        let source = Scripted::new(vec![ActionStatus::Running]);
        let poller = ActionPoller::new(config(2500));

        let err = poller.wait(&source, 4).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }));
        assert!(source.calls() as u128 <= poller.config().max_requests());
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_error_fails_regardless_of_budget() {
        let source = Scripted::new(vec![ActionStatus::Running, ActionStatus::Error]);
        let err = ActionPoller::default().wait(&source, 42).await.unwrap_err();

        assert_eq!(err.to_string(), "Action 42 failed: Server is locked");
        assert_eq!(err.code(), Some("action_failed"));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_error_propagates() {
        let err = ActionPoller::default().wait(&Failing, 5).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_sleep() {
        let source = Scripted::new(vec![ActionStatus::Running]);
        let token = CancellationToken::new();
        let poller = ActionPoller::default().with_cancellation(token.clone());

        tokio::spawn(async move {
            sleep(Duration::from_millis(1500)).await;
            token.cancel();
        });

        let err = poller.wait(&source, 6).await.unwrap_err();
        assert!(matches!(err, ClientError::Cancelled { id: 6 }));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled() {
        let source = Scripted::new(vec![ActionStatus::Success]);
        let token = CancellationToken::new();
        token.cancel();

        let err = ActionPoller::default()
            .with_cancellation(token)
            .wait(&source, 7)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled { .. }));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_rejected() {
        let source = Scripted::new(vec![ActionStatus::Running]);
        let poller = ActionPoller::new(
            PollConfig::default()
                .with_interval(Duration::ZERO)
                .with_timeout(Duration::from_millis(50)),
        );

        let err = poller.wait(&source, 1).await.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert_eq!(source.calls(), 0);
    }
}
