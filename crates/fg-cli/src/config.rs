//! Command line configuration

use fg_client::{ClientConfig, TenantId, UserId};
use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by every subcommand
#[derive(Clone, Debug)]
pub struct AdminConfig {
    /// Tenant the command acts on
    pub tenant: TenantId,
    /// User the command acts as
    pub user: UserId,
    /// Access token handed to the gateway for the user
    pub token: Option<String>,
    /// File holding the per-tenant gateway endpoints
    pub store_path: PathBuf,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            tenant: TenantId(0),
            user: UserId(0),
            token: None,
            store_path: PathBuf::from("fg-endpoints.json"),
            timeout_secs: 30,
        }
    }
}

impl AdminConfig {
    /// Client settings derived from this configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_user_agent(format!("fg-admin/{}", env!("CARGO_PKG_VERSION")))
    }
}
