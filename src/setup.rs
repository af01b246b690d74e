//! One-shot readiness gate for the selection controller.
//!
//! Setup prefers an explicit "map ready" signal. When the map handle is not
//! available yet the gate defers with exponential backoff, and gives up after
//! a bounded number of attempts, leaving the map non-interactive.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::SetupError;
use crate::selection::{MapSurface, SelectionController, SelectionSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub factor: u32,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 250,
            factor: 2,
            max_attempts: 4,
        }
    }
}

impl RetryPolicy {
    /// Delay before check number `attempt + 1` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.factor.max(1));
        let ms = self
            .initial_delay_ms
            .saturating_mul(factor.saturating_pow(attempt));
        Duration::from_millis(ms)
    }
}

pub enum SetupStep<S> {
    Ready(SelectionController<S>),
    Retry(Duration),
    Disabled(SetupError),
}

#[derive(Debug)]
pub struct SetupGate {
    policy: RetryPolicy,
    attempts: u32,
}

impl SetupGate {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Feed the result of one check for the map surface.
    pub fn poll<S: MapSurface>(
        &mut self,
        surface: Option<S>,
        settings: SelectionSettings,
    ) -> SetupStep<S> {
        self.attempts += 1;

        let Some(surface) = surface else {
            if self.attempts >= self.policy.max_attempts.max(1) {
                error!(
                    attempts = self.attempts,
                    "map never became available, interaction disabled"
                );
                return SetupStep::Disabled(SetupError::MapUnavailable {
                    attempts: self.attempts,
                });
            }
            let delay = self.policy.delay(self.attempts - 1);
            debug!(attempt = self.attempts, ?delay, "map not ready, deferring setup");
            return SetupStep::Retry(delay);
        };

        let mut controller = SelectionController::new(surface, settings);
        match controller.attach_handlers() {
            Ok(shapes) => {
                info!(shapes, attempts = self.attempts, "selection controller ready");
                SetupStep::Ready(controller)
            }
            Err(e) => {
                error!(error = %e, "selection controller disabled");
                SetupStep::Disabled(e)
            }
        }
    }
}

/// Poll until the surface is available or the policy runs out.
pub async fn wait_for_surface<S, F>(
    settings: SelectionSettings,
    mut lookup: F,
) -> Result<SelectionController<S>, SetupError>
where
    S: MapSurface,
    F: FnMut() -> Option<S>,
{
    let mut gate = SetupGate::new(settings.retry);
    loop {
        match gate.poll(lookup(), settings) {
            SetupStep::Ready(controller) => return Ok(controller),
            SetupStep::Disabled(e) => return Err(e),
            SetupStep::Retry(delay) => tokio::time::sleep(delay).await,
        }
    }
}
