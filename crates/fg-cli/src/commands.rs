//! Subcommand definitions and their execution

use crate::{store::FileEndpointStore, AdminConfig};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use fg_client::{provision_tenants, FilePart, GatewayClient, StaticTokenProvider, TenantId, UserId};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Client wired the way the admin tool uses it
pub type AdminClient = GatewayClient<FileEndpointStore, StaticTokenProvider>;

#[derive(Parser, Debug)]
#[command(name = "fg-admin")]
#[command(about = "Manage Future Gateway resources of portal tenants")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Tenant (portal instance) id
    #[arg(short, long, global = true, default_value = "0", env = "FG_TENANT")]
    pub tenant: u64,

    /// User id the requests are made for
    #[arg(short, long, global = true, default_value = "0", env = "FG_USER")]
    pub user: u64,

    /// Access token of the user
    #[arg(long, global = true, env = "FG_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Endpoint store file
    #[arg(long, global = true, default_value = "fg-endpoints.json", env = "FG_ENDPOINT_STORE")]
    pub store: PathBuf,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30", env = "FG_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long, global = true, env = "FG_DEBUG")]
    pub debug: bool,
}

impl GlobalArgs {
    pub fn to_config(&self) -> AdminConfig {
        AdminConfig {
            tenant: TenantId(self.tenant),
            user: UserId(self.user),
            token: self.token.clone(),
            store_path: self.store.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set the gateway endpoint of the tenant
    SetEndpoint {
        /// Base URL, e.g. https://fg.example.org/apis/v1.0
        url: String,
    },
    /// Print the gateway endpoint of the tenant
    ShowEndpoint,
    /// Create a resource, or overwrite it when an id is given
    Add {
        collection: String,
        /// Id of the resource to overwrite
        #[arg(long)]
        id: Option<String>,
        /// Resource document
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        json: Option<String>,
        /// File holding the resource document
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print a whole collection
    List {
        collection: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Print a single resource
    Get {
        collection: String,
        id: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Upload input files to a resource
    Upload {
        collection: String,
        id: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the enabled infrastructures
    Infrastructures,
    /// Prepare endpoint storage for tenants
    Provision {
        #[arg(required = true)]
        tenants: Vec<u64>,
    },
}

/// Build the client for a configuration
pub fn build_client(config: &AdminConfig) -> anyhow::Result<AdminClient> {
    let store = FileEndpointStore::new(config.store_path.clone());
    let identity = StaticTokenProvider::new(config.token.clone().unwrap_or_default());
    let client = GatewayClient::with_config(store, identity, config.client_config())?;
    Ok(client)
}

/// Run one subcommand and return what it prints
pub async fn execute(
    client: &AdminClient,
    config: &AdminConfig,
    command: Command,
) -> anyhow::Result<String> {
    let tenant = config.tenant;
    let user = config.user;

    let output = match command {
        Command::SetEndpoint { url } => {
            client
                .set_endpoint(tenant, &url)
                .await
                .with_context(|| format!("unable to save endpoint for tenant {}", tenant))?;
            client.endpoint(tenant).await?
        }
        Command::ShowEndpoint => client.endpoint(tenant).await?,
        Command::Add {
            collection,
            id,
            json,
            file,
        } => {
            let resource = match (json, file) {
                (Some(json), _) => json,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("unable to read {}", path.display()))?,
                (None, None) => bail!("either --json or --file is required"),
            };
            serde_json::from_str::<serde_json::Value>(&resource)
                .context("resource is not valid JSON")?;

            let id = client
                .add_resource_as(tenant, &collection, id.as_deref(), &resource, user)
                .await?;
            info!("Resource {}/{} stored", collection, id);
            id
        }
        Command::List { collection, pretty } => {
            let raw = client.get_collection_as(tenant, &collection, user).await?;
            render(raw, pretty)?
        }
        Command::Get {
            collection,
            id,
            pretty,
        } => {
            let raw = client.get_resource_as(tenant, &collection, &id, user).await?;
            render(raw, pretty)?
        }
        Command::Upload {
            collection,
            id,
            files,
        } => {
            let mut parts = Vec::with_capacity(files.len());
            for path in &files {
                parts.push(
                    FilePart::open(path)
                        .await
                        .with_context(|| format!("unable to open {}", path.display()))?,
                );
            }
            let count = parts.len();
            client
                .submit_files_as(tenant, &collection, &id, parts, user)
                .await?;
            format!("uploaded {} file(s) to {}/{}", count, collection, id)
        }
        Command::Infrastructures => {
            let sorted: BTreeMap<_, _> = client.infrastructures(tenant, user).await?.into_iter().collect();
            sorted
                .into_iter()
                .map(|(id, name)| format!("{}\t{}", id, name))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Command::Provision { tenants } => {
            let tenants: Vec<TenantId> = tenants.into_iter().map(TenantId).collect();
            let ready = provision_tenants(client.endpoints(), &tenants).await;
            ready
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        }
    };

    Ok(output)
}

fn render(raw: String, pretty: bool) -> anyhow::Result<String> {
    if !pretty {
        return Ok(raw);
    }
    let value: serde_json::Value = serde_json::from_str(&raw).context("gateway returned invalid JSON")?;
    Ok(serde_json::to_string_pretty(&value)?)
}
