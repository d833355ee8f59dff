use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use uuid::Uuid;

use sharespace_api::crypto::{JwtClaims, sign_jwt};
use sharespace_api::{
    AddMemberRequest, CreateItemRequest, CreateWorkspaceRequest, ItemResponse, MemberResponse,
    UserResponse, WorkspaceResponse,
};
use sharespace_api_client::ApiClient;
use sharespace_server::{AppConfig, AppState, build_router, storage};

/// Secret used when the suite spawns its own server.
pub const LOCAL_JWT_SECRET: &str = "e2e-local-secret";

/// Holds connection info for a test run, plus the in-process server when one
/// was spawned.
pub struct TestContext {
    pub api: ApiClient,
    jwt_secret: String,
    _data_dir: Option<tempfile::TempDir>,
}

/// A test user: an identity-provider subject and a token minted for it.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub subject: String,
    pub email: String,
    pub token: String,
    /// Internal user id, known once the server has seen the token.
    pub user_id: String,
}

impl TestContext {
    /// Target an already-running server that trusts `jwt_secret`.
    pub fn remote(base_url: String, jwt_secret: String) -> Self {
        Self {
            api: ApiClient::with_client(reqwest::Client::new(), &base_url),
            jwt_secret,
            _data_dir: None,
        }
    }

    /// Start a server on an ephemeral local port backed by a throwaway database.
    pub async fn spawn_local() -> Result<Self> {
        let data_dir = tempfile::tempdir().context("creating temp data dir")?;
        let config = AppConfig {
            data_dir: data_dir.path().to_path_buf(),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            jwt_audience: sharespace_api::crypto::DEFAULT_AUDIENCE.to_string(),
            cors_origins: Vec::new(),
            port: 0,
        };
        let db = storage::init_db(&config.data_dir)?;
        let app = build_router(AppState { db, config });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("e2e server stopped: {e}");
            }
        });

        Ok(Self {
            api: ApiClient::with_client(reqwest::Client::new(), &format!("http://{addr}")),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            _data_dir: Some(data_dir),
        })
    }

    /// Mint a token valid for an hour for `subject`.
    pub fn mint_token(&self, subject: &str, email: Option<&str>) -> Result<String> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims::new(subject, email, now, 3600);
        sign_jwt(&claims, &self.jwt_secret).map_err(|e| anyhow!("sign token: {e}"))
    }

    /// Mint a token that expired an hour ago.
    pub fn mint_expired_token(&self, subject: &str) -> Result<String> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims::new(subject, None, now - 7200, 3600);
        sign_jwt(&claims, &self.jwt_secret).map_err(|e| anyhow!("sign token: {e}"))
    }

    /// Create a fresh identity and make the server resolve it via `/me`.
    pub async fn register_user(&self) -> Result<TestUser> {
        let id = Uuid::new_v4();
        let subject = format!("e2e|{id}");
        let email = format!("test-{id}@e2e.local");
        let token = self.mint_token(&subject, Some(&email))?;

        let resp = self.api.get_with_auth("/me", &token).await?;
        let me: UserResponse = expect_json(resp, 200, "resolve identity").await?;

        Ok(TestUser {
            subject,
            email,
            token,
            user_id: me.id,
        })
    }

    pub async fn create_workspace(&self, user: &TestUser) -> Result<WorkspaceResponse> {
        let name = format!("ws-{}", &Uuid::new_v4().to_string()[..8]);
        let resp = self
            .post_json_authed("/workspaces", &user.token, &CreateWorkspaceRequest { name })
            .await?;
        expect_json(resp, 201, "create workspace").await
    }

    pub async fn add_member(
        &self,
        owner: &TestUser,
        workspace_id: &str,
        member: &TestUser,
    ) -> Result<MemberResponse> {
        let resp = self
            .post_json_authed(
                &format!("/workspaces/{workspace_id}/members"),
                &owner.token,
                &AddMemberRequest {
                    email: member.email.clone(),
                },
            )
            .await?;
        expect_json(resp, 201, "add member").await
    }

    pub async fn create_item(
        &self,
        user: &TestUser,
        workspace_id: &str,
        title: &str,
    ) -> Result<ItemResponse> {
        let resp = self
            .post_json_authed(
                &format!("/items?workspace_id={workspace_id}"),
                &user.token,
                &CreateItemRequest {
                    title: title.to_string(),
                    description: None,
                },
            )
            .await?;
        expect_json(resp, 201, "create item").await
    }

    /// Register an owner with a workspace and a second user sharing it.
    /// Returns `(owner, member, workspace_id)`.
    pub async fn setup_shared_workspace(&self) -> Result<(TestUser, TestUser, String)> {
        let owner = self.register_user().await?;
        let member = self.register_user().await?;
        let ws = self.create_workspace(&owner).await?;
        self.add_member(&owner, &ws.id, &member).await?;
        Ok((owner, member, ws.id))
    }

    // ── HTTP convenience methods (delegate to ApiClient) ──────────────

    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        self.api.get_raw(path).await
    }

    pub async fn get_authed(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        self.api.get_with_auth(path, token).await
    }

    pub async fn post_json_authed<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        self.api.post_json_with_auth(path, token, body).await
    }

    pub async fn put_json_authed<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        self.api.put_json_with_auth(path, token, body).await
    }

    pub async fn delete_authed(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        self.api.delete_with_auth(path, token).await
    }
}

/// Check the status and decode the body, reporting the body text on mismatch.
pub async fn expect_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    expected: u16,
    what: &str,
) -> Result<T> {
    let status = resp.status();
    if status.as_u16() != expected {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("{what}: expected {expected}, got {status}: {body}"));
    }
    Ok(resp.json().await?)
}
