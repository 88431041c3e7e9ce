//! Per-tenant gateway endpoint storage

use crate::{GatewayError, Result, TenantId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage of the gateway base URL of every tenant
#[async_trait]
pub trait EndpointStore: Send + Sync {
    /// Endpoint of the tenant; `None` or an empty string when unset
    async fn get_endpoint(&self, tenant: TenantId) -> Result<Option<String>>;

    /// Store the endpoint of the tenant, replacing any previous value
    async fn set_endpoint(&self, tenant: TenantId, url: &str) -> Result<()>;

    /// Prepare the tenant's storage. Must be idempotent.
    async fn ensure_storage(&self, _tenant: TenantId) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<S: EndpointStore + ?Sized> EndpointStore for Arc<S> {
    async fn get_endpoint(&self, tenant: TenantId) -> Result<Option<String>> {
        (**self).get_endpoint(tenant).await
    }

    async fn set_endpoint(&self, tenant: TenantId, url: &str) -> Result<()> {
        (**self).set_endpoint(tenant, url).await
    }

    async fn ensure_storage(&self, tenant: TenantId) -> Result<()> {
        (**self).ensure_storage(tenant).await
    }
}

/// Validate an endpoint URL and strip trailing slashes so that
/// `endpoint + "/" + collection` never produces `//`
pub fn normalize_endpoint(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(GatewayError::Configuration("endpoint URL is empty".to_string()));
    }

    let parsed = url::Url::parse(trimmed)
        .map_err(|e| GatewayError::Configuration(format!("invalid endpoint URL {}: {}", trimmed, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(GatewayError::Configuration(format!(
            "unsupported endpoint scheme: {}",
            parsed.scheme()
        )));
    }

    Ok(trimmed.to_string())
}

/// Prepare endpoint storage for every tenant.
///
/// A tenant whose storage cannot be prepared is logged and skipped; the
/// returned list holds the tenants that succeeded.
pub async fn provision_tenants<S>(store: &S, tenants: &[TenantId]) -> Vec<TenantId>
where
    S: EndpointStore + ?Sized,
{
    let mut ready = Vec::with_capacity(tenants.len());
    for &tenant in tenants {
        match store.ensure_storage(tenant).await {
            Ok(()) => {
                debug!(%tenant, "Endpoint storage ready");
                ready.push(tenant);
            }
            Err(e) => {
                warn!(%tenant, "Unable to set up gateway endpoint storage: {}", e);
            }
        }
    }
    ready
}

/// An in-memory endpoint store
#[derive(Clone, Default)]
pub struct MemoryEndpointStore {
    endpoints: Arc<DashMap<TenantId, String>>,
}

impl MemoryEndpointStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one tenant already configured
    pub fn with_endpoint(tenant: TenantId, url: impl Into<String>) -> Self {
        let store = Self::new();
        store.endpoints.insert(tenant, url.into());
        store
    }

    /// Number of configured tenants
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Check if no tenant is configured
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[async_trait]
impl EndpointStore for MemoryEndpointStore {
    async fn get_endpoint(&self, tenant: TenantId) -> Result<Option<String>> {
        Ok(self.endpoints.get(&tenant).map(|e| e.value().clone()))
    }

    async fn set_endpoint(&self, tenant: TenantId, url: &str) -> Result<()> {
        let url = normalize_endpoint(url)?;
        self.endpoints.insert(tenant, url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakyStore;

    #[async_trait]
    impl EndpointStore for FlakyStore {
        async fn get_endpoint(&self, _tenant: TenantId) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set_endpoint(&self, _tenant: TenantId, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn ensure_storage(&self, tenant: TenantId) -> Result<()> {
            if tenant.0 % 2 == 0 {
                Ok(())
            } else {
                Err(GatewayError::Configuration("table locked".to_string()))
            }
        }
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(
            normalize_endpoint("https://fg.example.org/apis/v1.0/").unwrap(),
            "https://fg.example.org/apis/v1.0"
        );
        assert!(normalize_endpoint("").unwrap_err().is_configuration());
        assert!(normalize_endpoint("   ").unwrap_err().is_configuration());
        assert!(normalize_endpoint("not a url").unwrap_err().is_configuration());
        assert!(normalize_endpoint("ftp://fg.example.org").unwrap_err().is_configuration());
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryEndpointStore::new();
        assert!(store.get_endpoint(TenantId(1)).await.unwrap().is_none());

        store.set_endpoint(TenantId(1), "http://localhost:8888/v1.0/").await.unwrap();
        assert_eq!(
            store.get_endpoint(TenantId(1)).await.unwrap().as_deref(),
            Some("http://localhost:8888/v1.0")
        );
        assert!(store.get_endpoint(TenantId(2)).await.unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_rejects_invalid_url() {
        let store = MemoryEndpointStore::new();
        let err = store.set_endpoint(TenantId(1), "localhost").await.unwrap_err();
        assert!(err.is_configuration());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_provision_skips_failing_tenants() {
        let tenants = [TenantId(0), TenantId(1), TenantId(2), TenantId(3)];
        let ready = provision_tenants(&FlakyStore, &tenants).await;
        assert_eq!(ready, vec![TenantId(0), TenantId(2)]);
    }
}
