//! Integration settings domain types
//!
//! Third-party toggles for the panel: payment gateway, analytics, tracking
//! pixel, and backing database sync. Settings storage only, no lifecycle
//! logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Integration toggles and credentials
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IntegrationSettings {
    #[serde(default)]
    pub payment_gateway_enabled: bool,
    #[serde(default)]
    pub payment_webhook_url: Option<String>,
    #[serde(default)]
    pub analytics_enabled: bool,
    #[serde(default)]
    pub analytics_measurement_id: Option<String>,
    #[serde(default)]
    pub tracking_pixel_enabled: bool,
    #[serde(default)]
    pub tracking_pixel_id: Option<String>,
    #[serde(default)]
    pub database_sync_enabled: bool,
}

/// Request DTO for updating integration settings
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateIntegrationSettingsRequest {
    pub settings: IntegrationSettings,
}

/// Response DTO for integration settings
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationSettingsResponse {
    pub settings: IntegrationSettings,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_everything_disabled() {
        let settings: IntegrationSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, IntegrationSettings::default());
        assert!(!settings.payment_gateway_enabled);
        assert!(settings.payment_webhook_url.is_none());
    }
}
