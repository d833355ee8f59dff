use std::time::Duration;

use anyhow::{Result, bail};
use serde::Serialize;

use sharespace_api::*;

/// Typed HTTP client for the sharespace API.
///
/// Provides high-level methods for each API endpoint (using the stored bearer
/// token) and low-level `*_with_auth` methods for callers that need per-request
/// auth (e.g. E2E tests acting as several users).
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    pub fn set_auth(&mut self, token: String) {
        self.auth_token = Some(token);
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path like `/health`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token_or_bail(&self) -> Result<&str> {
        self.auth_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("auth token not set"))
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self.client.get(self.url("/health")).send().await?;
        parse_response(resp).await
    }

    pub async fn me(&self) -> Result<UserResponse> {
        let token = self.token_or_bail()?;
        let resp = self.get_with_auth("/me", token).await?;
        parse_response(resp).await
    }

    // ── Workspaces ────────────────────────────────────────────────────────

    pub async fn create_workspace(&self, name: &str) -> Result<WorkspaceResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .post_json_with_auth(
                "/workspaces",
                token,
                &CreateWorkspaceRequest {
                    name: name.to_string(),
                },
            )
            .await?;
        parse_response(resp).await
    }

    pub async fn list_workspaces(&self) -> Result<ListWorkspacesResponse> {
        let token = self.token_or_bail()?;
        let resp = self.get_with_auth("/workspaces", token).await?;
        parse_response(resp).await
    }

    pub async fn get_workspace(&self, id: &str) -> Result<WorkspaceResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .get_with_auth(&format!("/workspaces/{id}"), token)
            .await?;
        parse_response(resp).await
    }

    pub async fn delete_workspace(&self, id: &str) -> Result<OkResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .delete_with_auth(&format!("/workspaces/{id}"), token)
            .await?;
        parse_response(resp).await
    }

    // ── Members ───────────────────────────────────────────────────────────

    pub async fn list_members(&self, workspace_id: &str) -> Result<ListMembersResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .get_with_auth(&format!("/workspaces/{workspace_id}/members"), token)
            .await?;
        parse_response(resp).await
    }

    pub async fn add_member(&self, workspace_id: &str, email: &str) -> Result<MemberResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .post_json_with_auth(
                &format!("/workspaces/{workspace_id}/members"),
                token,
                &AddMemberRequest {
                    email: email.to_string(),
                },
            )
            .await?;
        parse_response(resp).await
    }

    pub async fn remove_member(&self, workspace_id: &str, member_id: &str) -> Result<OkResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .delete_with_auth(
                &format!("/workspaces/{workspace_id}/members/{member_id}"),
                token,
            )
            .await?;
        parse_response(resp).await
    }

    // ── Items ─────────────────────────────────────────────────────────────

    pub async fn create_item(
        &self,
        workspace_id: &str,
        req: &CreateItemRequest,
    ) -> Result<ItemResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .post(self.url("/items"))
            .query(&WorkspaceScopeQuery {
                workspace_id: Some(workspace_id.to_string()),
            })
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn list_items(&self, query: &ItemListQuery) -> Result<ListItemsResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .get(self.url("/items"))
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn get_item(&self, id: &str) -> Result<ItemResponse> {
        let token = self.token_or_bail()?;
        let resp = self.get_with_auth(&format!("/items/{id}"), token).await?;
        parse_response(resp).await
    }

    pub async fn update_item(&self, id: &str, req: &UpdateItemRequest) -> Result<ItemResponse> {
        let token = self.token_or_bail()?;
        let resp = self
            .put_json_with_auth(&format!("/items/{id}"), token, req)
            .await?;
        parse_response(resp).await
    }

    pub async fn delete_item(&self, id: &str) -> Result<OkResponse> {
        let token = self.token_or_bail()?;
        let resp = self.delete_with_auth(&format!("/items/{id}"), token).await?;
        parse_response(resp).await
    }

    // ── Raw helpers (for E2E / advanced usage) ────────────────────────────

    /// Authenticated GET returning the raw response.
    pub async fn get_with_auth(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Authenticated POST with JSON body returning the raw response.
    pub async fn post_json_with_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Authenticated PUT with JSON body returning the raw response.
    pub async fn put_json_with_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Authenticated DELETE returning the raw response.
    pub async fn delete_with_auth(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Unauthenticated GET returning the raw response.
    pub async fn get_raw(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }
}

/// Parse an HTTP response: return the deserialized body on 2xx,
/// or an error containing the status and body text.
async fn parse_response<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("{status}: {body}");
    }
    Ok(resp.json().await?)
}
