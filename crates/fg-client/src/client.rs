//! Main client implementation

use crate::{
    multipart::{FilePart, MultipartBody},
    types::{CreatedResource, InfrastructureList, INFRASTRUCTURE_COLLECTION, INPUT_PATH},
    ClientConfig, EndpointStore, GatewayError, IdentityProvider, Result, TenantId, UserId,
};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Client of the Future Gateway REST service.
///
/// The gateway base URL is looked up per tenant on every call and every call
/// performs exactly one HTTP request. Nothing is cached and failed requests
/// are never retried.
pub struct GatewayClient<E, I> {
    endpoints: E,
    identity: I,
    config: ClientConfig,
    http: Client,
}

impl<E, I> GatewayClient<E, I>
where
    E: EndpointStore,
    I: IdentityProvider,
{
    /// Create a client with the default configuration
    pub fn new(endpoints: E, identity: I) -> Result<Self> {
        Self::with_config(endpoints, identity, ClientConfig::default())
    }

    /// Create a client with the given configuration
    pub fn with_config(endpoints: E, identity: I, config: ClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
                GatewayError::Configuration(format!("invalid user agent: {}", e))
            })?,
        );

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            endpoints,
            identity,
            config,
            http,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the endpoint store
    pub fn endpoints(&self) -> &E {
        &self.endpoints
    }

    // ==================== Endpoint ====================

    /// Set the gateway endpoint of a tenant
    #[instrument(skip(self))]
    pub async fn set_endpoint(&self, tenant: TenantId, url: &str) -> Result<()> {
        self.endpoints.set_endpoint(tenant, url).await?;
        info!("Gateway endpoint updated");
        Ok(())
    }

    /// Gateway endpoint of a tenant; fails when the tenant has none
    pub async fn endpoint(&self, tenant: TenantId) -> Result<String> {
        match self.endpoints.get_endpoint(tenant).await? {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(GatewayError::Configuration(format!(
                "no gateway endpoint configured for tenant {}",
                tenant
            ))),
        }
    }

    // ==================== Resources ====================

    /// Create or overwrite a resource.
    ///
    /// With a resource id the document is PUT to `collection/id` and the
    /// same id is returned on `200 OK`. Without one it is POSTed to
    /// `collection` and the id assigned by the gateway is read from the
    /// `201 Created` body.
    #[instrument(skip(self, resource, token))]
    pub async fn add_resource(
        &self,
        tenant: TenantId,
        collection: &str,
        resource_id: Option<&str>,
        resource: &str,
        token: &str,
    ) -> Result<String> {
        let base = self.endpoint(tenant).await?;
        self.store_resource(&base, collection, resource_id, resource, token)
            .await
    }

    /// [`add_resource`](Self::add_resource) on behalf of a portal user
    #[instrument(skip(self, resource))]
    pub async fn add_resource_as(
        &self,
        tenant: TenantId,
        collection: &str,
        resource_id: Option<&str>,
        resource: &str,
        user: UserId,
    ) -> Result<String> {
        let (base, token) = self.user_session(tenant, user).await?;
        self.store_resource(&base, collection, resource_id, resource, &token)
            .await
    }

    /// Upload files to the `input` of an existing resource.
    ///
    /// All files travel in one `multipart/form-data` request, in the given
    /// order. Every source is consumed and closed.
    #[instrument(skip(self, files, token), fields(file_count = files.len()))]
    pub async fn submit_files(
        &self,
        tenant: TenantId,
        collection: &str,
        resource_id: &str,
        files: Vec<FilePart>,
        token: &str,
    ) -> Result<()> {
        let base = self.endpoint(tenant).await?;
        self.send_files(&base, collection, resource_id, files, token)
            .await
    }

    /// [`submit_files`](Self::submit_files) on behalf of a portal user
    #[instrument(skip(self, files), fields(file_count = files.len()))]
    pub async fn submit_files_as(
        &self,
        tenant: TenantId,
        collection: &str,
        resource_id: &str,
        files: Vec<FilePart>,
        user: UserId,
    ) -> Result<()> {
        let (base, token) = self.user_session(tenant, user).await?;
        self.send_files(&base, collection, resource_id, files, &token)
            .await
    }

    /// Raw JSON of a whole collection
    #[instrument(skip(self, token))]
    pub async fn get_collection(
        &self,
        tenant: TenantId,
        collection: &str,
        token: &str,
    ) -> Result<String> {
        let base = self.endpoint(tenant).await?;
        self.fetch(&base, &resource_path(collection, None), token)
            .await
    }

    /// [`get_collection`](Self::get_collection) on behalf of a portal user
    #[instrument(skip(self))]
    pub async fn get_collection_as(
        &self,
        tenant: TenantId,
        collection: &str,
        user: UserId,
    ) -> Result<String> {
        let (base, token) = self.user_session(tenant, user).await?;
        self.fetch(&base, &resource_path(collection, None), &token)
            .await
    }

    /// Raw JSON of a single resource
    #[instrument(skip(self, token))]
    pub async fn get_resource(
        &self,
        tenant: TenantId,
        collection: &str,
        resource_id: &str,
        token: &str,
    ) -> Result<String> {
        let base = self.endpoint(tenant).await?;
        self.fetch(&base, &resource_path(collection, Some(resource_id)), token)
            .await
    }

    /// [`get_resource`](Self::get_resource) on behalf of a portal user
    #[instrument(skip(self))]
    pub async fn get_resource_as(
        &self,
        tenant: TenantId,
        collection: &str,
        resource_id: &str,
        user: UserId,
    ) -> Result<String> {
        let (base, token) = self.user_session(tenant, user).await?;
        self.fetch(&base, &resource_path(collection, Some(resource_id)), &token)
            .await
    }

    /// Enabled infrastructures visible to the user, keyed by id
    #[instrument(skip(self))]
    pub async fn infrastructures(
        &self,
        tenant: TenantId,
        user: UserId,
    ) -> Result<HashMap<String, String>> {
        let raw = self
            .get_collection_as(tenant, INFRASTRUCTURE_COLLECTION, user)
            .await?;
        let list: InfrastructureList = serde_json::from_str(&raw)?;
        debug!("Available {} infrastructures", list.items.len());

        let enabled = list
            .items
            .into_iter()
            .filter(|infra| {
                debug!("Infrastructure {} enabled option is {}", infra.id, infra.enabled);
                infra.enabled
            })
            .map(|infra| (infra.id, infra.name))
            .collect();
        Ok(enabled)
    }

    // ==================== Helper Methods ====================

    /// Endpoint of the tenant, then a token for the user. The endpoint is
    /// checked first so an unconfigured tenant never reaches the identity
    /// provider.
    async fn user_session(&self, tenant: TenantId, user: UserId) -> Result<(String, String)> {
        let base = self.endpoint(tenant).await?;
        let token = self.identity.user_token(user).await?;
        Ok((base, token))
    }

    /// Build an unsent request against `{base}/{path}`
    fn prepare(
        &self,
        base: &str,
        path: &str,
        token: &str,
        method: Method,
        content_type: &str,
    ) -> RequestBuilder {
        let url = format!("{}/{}", base, path);
        debug!("Sending {} request to {}", method, url);

        self.http
            .request(method, &url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, content_type)
    }

    async fn store_resource(
        &self,
        base: &str,
        collection: &str,
        resource_id: Option<&str>,
        resource: &str,
        token: &str,
    ) -> Result<String> {
        debug!("Updating/adding resource in {}: {}", collection, resource);

        match resource_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                let path = resource_path(collection, Some(id));
                let response = self
                    .prepare(base, &path, token, Method::PUT, &self.config.content_type)
                    .body(resource.to_owned())
                    .send()
                    .await?;

                expect_status(
                    response,
                    StatusCode::OK,
                    format!("unable to update resource {}", path),
                )
                .await?;
                Ok(id.to_string())
            }
            None => {
                let response = self
                    .prepare(base, collection, token, Method::POST, &self.config.content_type)
                    .body(resource.to_owned())
                    .send()
                    .await?;

                let response = expect_status(
                    response,
                    StatusCode::CREATED,
                    format!("unable to add resource to {}", collection),
                )
                .await?;
                let text = response.text().await?;
                let created: CreatedResource = serde_json::from_str(&text).map_err(|e| {
                    GatewayError::MalformedResponse(format!(
                        "created resource in {} has no usable id: {}",
                        collection, e
                    ))
                })?;
                debug!("Gateway assigned id {}", created.id);
                Ok(created.id)
            }
        }
    }

    async fn send_files(
        &self,
        base: &str,
        collection: &str,
        resource_id: &str,
        files: Vec<FilePart>,
        token: &str,
    ) -> Result<()> {
        info!("Adding new files to {}/{}", collection, resource_id);

        let form = MultipartBody::new();
        let path = format!("{}/{}", resource_path(collection, Some(resource_id)), INPUT_PATH);
        let request = self.prepare(base, &path, token, Method::POST, &form.content_type());
        let body = form.encode(files).await?;

        let response = request.body(body).send().await?;
        expect_status(
            response,
            StatusCode::OK,
            format!(
                "impossible to post files to the resource {}/{}",
                collection, resource_id
            ),
        )
        .await?;
        Ok(())
    }

    async fn fetch(&self, base: &str, path: &str, token: &str) -> Result<String> {
        let response = self
            .prepare(base, path, token, Method::GET, &self.config.content_type)
            .send()
            .await?;

        let response = expect_status(
            response,
            StatusCode::OK,
            format!("unable to read {}", path),
        )
        .await?;
        let text = response.text().await?;
        debug!("Received {} bytes from {}", text.len(), path);
        Ok(text)
    }
}

/// `collection` or `collection/resource_id`
fn resource_path(collection: &str, resource_id: Option<&str>) -> String {
    match resource_id {
        Some(id) => format!("{}/{}", collection, id),
        None => collection.to_string(),
    }
}

/// Pass the response through when it carries `expected`; otherwise drain
/// and drop it so the connection goes back to the pool
async fn expect_status(
    response: Response,
    expected: StatusCode,
    context: String,
) -> Result<Response> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }

    debug!("Gateway response code not correct: {}", status);
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::remote(status.as_u16(), context, &body))
}
