//! Configuration for the input controller and the root controller.

use std::time::Duration;

use trellis_core::QueueConfig;

/// Presses of the same button at the same position within this interval
/// count as one multi-click sequence.
pub const DEFAULT_DOUBLE_CLICK_TIMEOUT: Duration = Duration::from_millis(500);

/// Input controller behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputConfig {
    pub double_click_timeout: Duration,
    /// Whether an unconsumed Tab (Shift+Tab) press moves focus forward
    /// (backward).
    pub tab_traversal: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            double_click_timeout: DEFAULT_DOUBLE_CLICK_TIMEOUT,
            tab_traversal: true,
        }
    }
}

impl InputConfig {
    pub fn with_double_click_timeout(mut self, timeout: Duration) -> Self {
        self.double_click_timeout = timeout;
        self
    }

    pub fn with_tab_traversal(mut self, enabled: bool) -> Self {
        self.tab_traversal = enabled;
        self
    }

    /// The double-click window in microseconds, the unit of event timestamps.
    pub(crate) fn double_click_timeout_us(&self) -> u64 {
        u64::try_from(self.double_click_timeout.as_micros()).unwrap_or(u64::MAX)
    }
}

/// Everything a [`RootController`](crate::RootController) is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootConfig {
    /// Initial root width in pixels.
    pub width: i32,
    /// Initial root height in pixels.
    pub height: i32,
    pub queue: QueueConfig,
    pub input: InputConfig,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            queue: QueueConfig::default(),
            input: InputConfig::default(),
        }
    }
}

/// Builder for [`RootController`](crate::RootController).
#[derive(Debug, Clone, Default)]
pub struct RootBuilder {
    config: RootConfig,
}

impl RootBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn double_click_timeout(mut self, timeout: Duration) -> Self {
        self.config.input.double_click_timeout = timeout;
        self
    }

    pub fn tab_traversal(mut self, enabled: bool) -> Self {
        self.config.input.tab_traversal = enabled;
        self
    }

    pub fn max_retained_items(mut self, max: usize) -> Self {
        self.config.queue.max_retained_items = max;
        self
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    pub fn build(self) -> crate::RootController {
        crate::RootController::new(self.config)
    }
}
