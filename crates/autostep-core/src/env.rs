use std::sync::Arc;
use std::time::Duration;

use crate::asset::AssetStore;
use crate::driver::Browser;
use crate::human::ConfirmationGate;

/// Bounds applied to individual page waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long an action waits for its selector to appear.
    pub selector: Duration,
    /// How long the cookie-consent button is looked for.
    pub cookie: Duration,
    /// Pause after dismissing the cookie banner.
    pub cookie_settle: Duration,
    /// Delay between typed characters.
    pub type_delay: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            selector: Duration::from_millis(5000),
            cookie: Duration::from_millis(5000),
            cookie_settle: Duration::from_millis(3000),
            type_delay: Duration::from_millis(100),
        }
    }
}

/// Collaborators shared by every script run.
#[derive(Clone)]
pub struct ExecEnv {
    pub browser: Arc<dyn Browser>,
    pub gate: Arc<ConfirmationGate>,
    pub assets: Arc<AssetStore>,
    pub timeouts: Timeouts,
    pub max_condition_retries: u32,
}

impl ExecEnv {
    pub const DEFAULT_CONDITION_RETRIES: u32 = 3;

    pub fn new(
        browser: Arc<dyn Browser>,
        gate: Arc<ConfirmationGate>,
        assets: Arc<AssetStore>,
    ) -> Self {
        Self {
            browser,
            gate,
            assets,
            timeouts: Timeouts::default(),
            max_condition_retries: Self::DEFAULT_CONDITION_RETRIES,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_max_condition_retries(mut self, retries: u32) -> Self {
        self.max_condition_retries = retries;
        self
    }
}
