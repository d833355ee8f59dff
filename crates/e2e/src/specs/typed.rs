use std::time::Duration;

use anyhow::{Result, ensure};

use sharespace_api::{CreateItemRequest, ItemListQuery, Role, UpdateItemRequest};
use sharespace_api_client::ApiClient;

use crate::client::TestContext;

fn typed_client(ctx: &TestContext, token: &str) -> Result<ApiClient> {
    let mut api = ApiClient::new(ctx.api.base_url(), Duration::from_secs(10))?;
    api.set_auth(token.to_string());
    Ok(api)
}

/// Whole sharing lifecycle driven through the typed client only.
pub async fn sharing_lifecycle(ctx: &TestContext) -> Result<()> {
    let owner = ctx.register_user().await?;
    let member = ctx.register_user().await?;
    let owner_api = typed_client(ctx, &owner.token)?;
    let member_api = typed_client(ctx, &member.token)?;

    ensure!(owner_api.health().await?.status == "ok");
    let me = owner_api.me().await?;
    ensure!(me.id == owner.user_id);

    let ws = owner_api.create_workspace("typed-flow").await?;
    ensure!(ws.role == Role::Owner);
    ensure!(member_api.get_workspace(&ws.id).await.is_err(), "not shared yet");

    let added = owner_api.add_member(&ws.id, &member.email).await?;
    ensure!(added.user_id == member.user_id);

    let seen = member_api.get_workspace(&ws.id).await?;
    ensure!(seen.role == Role::Member);
    let listed = member_api.list_workspaces().await?;
    ensure!(listed.workspaces.iter().any(|w| w.id == ws.id));
    let members = member_api.list_members(&ws.id).await?;
    ensure!(members.members.len() == 2);

    let item = member_api
        .create_item(
            &ws.id,
            &CreateItemRequest {
                title: "from the member".into(),
                description: Some("typed".into()),
            },
        )
        .await?;
    let fetched = owner_api.get_item(&item.id).await?;
    ensure!(fetched.title == "from the member");

    let updated = owner_api
        .update_item(
            &item.id,
            &UpdateItemRequest {
                description: Some(None),
                ..Default::default()
            },
        )
        .await?;
    ensure!(updated.description.is_none());

    let page = member_api
        .list_items(&ItemListQuery {
            workspace_id: Some(ws.id.clone()),
            limit: Some(10),
            ..Default::default()
        })
        .await?;
    ensure!(page.items.len() == 1, "expected 1, got {}", page.items.len());

    ensure!(owner_api.remove_member(&ws.id, &added.id).await?.ok);
    ensure!(member_api.get_item(&item.id).await.is_err(), "access revoked");

    let second = owner_api
        .create_item(
            &ws.id,
            &CreateItemRequest {
                title: "second".into(),
                description: None,
            },
        )
        .await?;
    ensure!(owner_api.delete_item(&second.id).await?.ok);
    ensure!(owner_api.delete_workspace(&ws.id).await?.ok);
    ensure!(owner_api.get_item(&item.id).await.is_err(), "item removed with workspace");
    Ok(())
}

/// Typed calls without a token fail locally instead of sending a request.
pub async fn typed_client_requires_token(ctx: &TestContext) -> Result<()> {
    let api = ApiClient::new(ctx.api.base_url(), Duration::from_secs(10))?;
    ensure!(api.auth_token().is_none());
    let err = api.list_workspaces().await.err();
    ensure!(
        err.is_some_and(|e| e.to_string().contains("auth token not set")),
        "expected missing-token error"
    );
    Ok(())
}
