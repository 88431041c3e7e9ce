//! JSON file backed endpoint store

use async_trait::async_trait;
use fg_client::{normalize_endpoint, EndpointStore, GatewayError, Result, TenantId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

type EndpointTable = BTreeMap<TenantId, String>;

/// Endpoints of all tenants kept in one JSON object, `{"<tenant>": "<url>"}`
pub struct FileEndpointStore {
    path: PathBuf,
    // held across the read-modify-write of the file
    lock: Mutex<()>,
}

impl FileEndpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<EndpointTable> {
        match fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(EndpointTable::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                GatewayError::Configuration(format!(
                    "endpoint store {} is corrupt: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EndpointTable::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, table: &EndpointTable) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        let text = serde_json::to_string_pretty(table)
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;
        fs::write(&tmp, text).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl EndpointStore for FileEndpointStore {
    async fn get_endpoint(&self, tenant: TenantId) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(&tenant))
    }

    async fn set_endpoint(&self, tenant: TenantId, url: &str) -> Result<()> {
        let url = normalize_endpoint(url)?;
        let _guard = self.lock.lock().await;
        let mut table = self.load().await?;
        table.insert(tenant, url);
        self.save(&table).await
    }

    async fn ensure_storage(&self, tenant: TenantId) -> Result<()> {
        let _guard = self.lock.lock().await;
        if !fs::try_exists(&self.path).await? {
            debug!(%tenant, path = %self.path.display(), "Creating endpoint store");
            self.save(&EndpointTable::new()).await?;
        } else {
            // refuse to provision on top of an unreadable file
            self.load().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("endpoints.json");

        let store = FileEndpointStore::new(&path);
        assert!(store.get_endpoint(TenantId(1)).await.unwrap().is_none());

        store.set_endpoint(TenantId(1), "https://fg.example.org/v1.0/").await.unwrap();
        store.set_endpoint(TenantId(2), "http://localhost:8888").await.unwrap();

        let reopened = FileEndpointStore::new(&path);
        assert_eq!(
            reopened.get_endpoint(TenantId(1)).await.unwrap().as_deref(),
            Some("https://fg.example.org/v1.0")
        );
        assert_eq!(
            reopened.get_endpoint(TenantId(2)).await.unwrap().as_deref(),
            Some("http://localhost:8888")
        );

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["1"], "https://fg.example.org/v1.0");
    }

    #[tokio::test]
    async fn test_ensure_storage_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endpoints.json");
        let store = FileEndpointStore::new(&path);

        store.ensure_storage(TenantId(1)).await.unwrap();
        assert!(path.exists());
        store.set_endpoint(TenantId(1), "http://localhost:8888").await.unwrap();
        store.ensure_storage(TenantId(1)).await.unwrap();

        assert_eq!(
            store.get_endpoint(TenantId(1)).await.unwrap().as_deref(),
            Some("http://localhost:8888")
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endpoints.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileEndpointStore::new(&path);
        assert!(store.get_endpoint(TenantId(1)).await.unwrap_err().is_configuration());
        assert!(store.ensure_storage(TenantId(1)).await.unwrap_err().is_configuration());
    }

    #[tokio::test]
    async fn test_concurrent_updates_all_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(FileEndpointStore::new(dir.path().join("endpoints.json")));

        let mut handles = Vec::new();
        for tenant in 1..=8u64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let url = format!("http://gateway-{}.example.org", tenant);
                store.set_endpoint(TenantId(tenant), &url).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = FileEndpointStore::new(store.path());
        for tenant in 1..=8u64 {
            assert_eq!(
                reopened.get_endpoint(TenantId(tenant)).await.unwrap(),
                Some(format!("http://gateway-{}.example.org", tenant))
            );
        }
    }
}
