use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whether the relay currently accepts and forwards location updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PollingStatus {
    pub polling_active: bool,
}

impl PollingStatus {
    pub fn new(polling_active: bool) -> Self {
        Self { polling_active }
    }

    pub fn label(&self) -> &'static str {
        if self.polling_active {
            "Polling Active"
        } else {
            "Polling Paused"
        }
    }
}
