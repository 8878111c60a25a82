//! Component-tagged logging over the `log` facade.

use log::{debug, info, warn};

/// Thin wrapper over the `log` facade so every component tags its records
/// with the same target.
#[derive(Debug, Clone)]
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }

    pub fn record(&self, message: &str) {
        info!(target: self.target, "{}", message);
    }

    pub fn trace(&self, message: &str) {
        debug!(target: self.target, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        warn!(target: self.target, "{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("kalmancore")
    }
}
