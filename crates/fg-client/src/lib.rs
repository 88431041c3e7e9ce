//! # Future Gateway Client
//!
//! A client for the Future Gateway REST service as used by a multi-tenant
//! portal.
//!
//! ## Features
//!
//! - **Per-tenant endpoints**: the gateway URL of each tenant lives in an [`EndpointStore`]
//! - **Bearer authentication**: tokens come from the caller or from an [`IdentityProvider`]
//! - **Resources**: create (POST), overwrite (PUT) and read (GET) JSON resources
//! - **File input**: upload any number of files in one `multipart/form-data` request
//!
//! ## Example
//!
//! ```rust,ignore
//! use fg_client::{
//!     FilePart, GatewayClient, MemoryEndpointStore, StaticTokenProvider, TenantId, UserId,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GatewayClient::new(
//!         MemoryEndpointStore::new(),
//!         StaticTokenProvider::new("your-access-token"),
//!     )?;
//!
//!     let tenant = TenantId(20116);
//!     client.set_endpoint(tenant, "https://fg.example.org/apis/v1.0").await?;
//!
//!     // Create a task and feed it its input files
//!     let id = client
//!         .add_resource_as(tenant, "tasks", None, r#"{"application":"2"}"#, UserId(1))
//!         .await?;
//!     client
//!         .submit_files_as(tenant, "tasks", &id, vec![FilePart::open("job.sh").await?], UserId(1))
//!         .await?;
//!
//!     for (id, name) in client.infrastructures(tenant, UserId(1)).await? {
//!         println!("{id}: {name}");
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod endpoint;
mod error;
mod identity;
mod multipart;
mod types;

pub use client::GatewayClient;
pub use config::{ClientConfig, JSON_CONTENT_TYPE};
pub use endpoint::{normalize_endpoint, provision_tenants, EndpointStore, MemoryEndpointStore};
pub use error::{GatewayError, Result};
pub use identity::{IdentityProvider, StaticTokenProvider, TokenTable};
pub use multipart::{FilePart, MultipartBody, FILE_FIELD};
pub use types::*;
