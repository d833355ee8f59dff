use anyhow::{Result, ensure};
use uuid::Uuid;

use sharespace_api::UserResponse;

use crate::client::{TestContext, expect_json};

/// First request with a new subject creates the user; later ones reuse it.
pub async fn me_resolves_identity_once(ctx: &TestContext) -> Result<()> {
    let subject = format!("e2e|{}", Uuid::new_v4());
    let email = format!("{}@E2E.local", Uuid::new_v4());
    let token = ctx.mint_token(&subject, Some(&email))?;

    let first: UserResponse = expect_json(ctx.get_authed("/me", &token).await?, 200, "me").await?;
    let second: UserResponse =
        expect_json(ctx.get_authed("/me", &token).await?, 200, "me again").await?;

    ensure!(first.id == second.id, "same subject must map to one user");
    ensure!(
        first.email.as_deref() == Some(email.to_lowercase().as_str()),
        "email should be stored lowercased, got {:?}",
        first.email
    );
    Ok(())
}

/// Tokens without an email claim still resolve to a user.
pub async fn me_without_email(ctx: &TestContext) -> Result<()> {
    let token = ctx.mint_token(&format!("e2e|{}", Uuid::new_v4()), None)?;
    let me: UserResponse = expect_json(ctx.get_authed("/me", &token).await?, 200, "me").await?;
    ensure!(me.email.is_none(), "expected no email, got {:?}", me.email);
    Ok(())
}

pub async fn missing_token_401(ctx: &TestContext) -> Result<()> {
    for path in ["/me", "/workspaces", "/items"] {
        let resp = ctx.get(path).await?;
        ensure!(resp.status() == 401, "{path}: expected 401, got {}", resp.status());
        let body: serde_json::Value = resp.json().await?;
        ensure!(body["error"].is_string(), "{path}: expected error body");
    }
    Ok(())
}

pub async fn garbage_token_401(ctx: &TestContext) -> Result<()> {
    let resp = ctx.get_authed("/me", "not.a.jwt").await?;
    ensure!(resp.status() == 401, "expected 401, got {}", resp.status());
    Ok(())
}

pub async fn expired_token_401(ctx: &TestContext) -> Result<()> {
    let token = ctx.mint_expired_token(&format!("e2e|{}", Uuid::new_v4()))?;
    let resp = ctx.get_authed("/me", &token).await?;
    ensure!(resp.status() == 401, "expected 401, got {}", resp.status());
    Ok(())
}

/// A token signed with another secret is rejected.
pub async fn wrong_secret_401(ctx: &TestContext) -> Result<()> {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = sharespace_api::crypto::JwtClaims::new("e2e|forged", None, now, 3600);
    let token = sharespace_api::crypto::sign_jwt(&claims, "some-other-secret")
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let resp = ctx.get_authed("/me", &token).await?;
    ensure!(resp.status() == 401, "expected 401, got {}", resp.status());
    Ok(())
}
