use anyhow::{Result, ensure};
use uuid::Uuid;

use sharespace_api::{CreateItemRequest, ItemResponse, ListItemsResponse, UpdateItemRequest};

use crate::client::{TestContext, expect_json};

/// A member creates an item the owner can read.
pub async fn create_item_shared(ctx: &TestContext) -> Result<()> {
    let (owner, member, ws_id) = ctx.setup_shared_workspace().await?;

    let resp = ctx
        .post_json_authed(
            &format!("/items?workspace_id={ws_id}"),
            &member.token,
            &CreateItemRequest {
                title: "groceries".into(),
                description: Some("milk, eggs".into()),
            },
        )
        .await?;
    let item: ItemResponse = expect_json(resp, 201, "create item").await?;
    ensure!(item.workspace_id == ws_id);
    ensure!(item.title == "groceries");
    ensure!(item.description.as_deref() == Some("milk, eggs"));

    let resp = ctx
        .get_authed(&format!("/items/{}", item.id), &owner.token)
        .await?;
    let fetched: ItemResponse = expect_json(resp, 200, "get item").await?;
    ensure!(fetched.id == item.id);
    Ok(())
}

pub async fn create_item_without_workspace_400(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let resp = ctx
        .post_json_authed(
            "/items",
            &user.token,
            &CreateItemRequest {
                title: "orphan".into(),
                description: None,
            },
        )
        .await?;
    ensure!(resp.status() == 400, "expected 400, got {}", resp.status());
    Ok(())
}

pub async fn create_item_blank_title_400(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let ws = ctx.create_workspace(&user).await?;
    let resp = ctx
        .post_json_authed(
            &format!("/items?workspace_id={}", ws.id),
            &user.token,
            &CreateItemRequest {
                title: "".into(),
                description: None,
            },
        )
        .await?;
    ensure!(resp.status() == 400, "expected 400, got {}", resp.status());
    Ok(())
}

pub async fn create_item_missing_workspace_404(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let resp = ctx
        .post_json_authed(
            &format!("/items?workspace_id={}", Uuid::new_v4()),
            &user.token,
            &CreateItemRequest {
                title: "lost".into(),
                description: None,
            },
        )
        .await?;
    ensure!(resp.status() == 404, "expected 404, got {}", resp.status());
    Ok(())
}

/// Every item operation is refused to users outside the workspace.
pub async fn outsider_item_ops_403(ctx: &TestContext) -> Result<()> {
    let owner = ctx.register_user().await?;
    let outsider = ctx.register_user().await?;
    let ws = ctx.create_workspace(&owner).await?;
    let item = ctx.create_item(&owner, &ws.id, "private").await?;
    let path = format!("/items/{}", item.id);

    let resp = ctx
        .post_json_authed(
            &format!("/items?workspace_id={}", ws.id),
            &outsider.token,
            &CreateItemRequest {
                title: "intrusion".into(),
                description: None,
            },
        )
        .await?;
    ensure!(resp.status() == 403, "create: expected 403, got {}", resp.status());

    let resp = ctx
        .get_authed(&format!("/items?workspace_id={}", ws.id), &outsider.token)
        .await?;
    ensure!(resp.status() == 403, "list: expected 403, got {}", resp.status());

    let resp = ctx.get_authed(&path, &outsider.token).await?;
    ensure!(resp.status() == 403, "get: expected 403, got {}", resp.status());

    let resp = ctx
        .put_json_authed(
            &path,
            &outsider.token,
            &UpdateItemRequest {
                title: Some("hijacked".into()),
                ..Default::default()
            },
        )
        .await?;
    ensure!(resp.status() == 403, "update: expected 403, got {}", resp.status());

    let resp = ctx.delete_authed(&path, &outsider.token).await?;
    ensure!(resp.status() == 403, "delete: expected 403, got {}", resp.status());

    let resp = ctx.get_authed(&path, &owner.token).await?;
    let still: ItemResponse = expect_json(resp, 200, "owner get").await?;
    ensure!(still.title == "private", "item must be unchanged");
    Ok(())
}

pub async fn get_item_not_found(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let resp = ctx
        .get_authed(&format!("/items/{}", Uuid::new_v4()), &user.token)
        .await?;
    ensure!(resp.status() == 404, "expected 404, got {}", resp.status());
    Ok(())
}

/// PUT only touches the fields it carries.
pub async fn update_item_partial(ctx: &TestContext) -> Result<()> {
    let (_, member, ws_id) = ctx.setup_shared_workspace().await?;
    let item = ctx.create_item(&member, &ws_id, "draft").await?;
    let path = format!("/items/{}", item.id);

    let resp = ctx
        .put_json_authed(
            &path,
            &member.token,
            &UpdateItemRequest {
                description: Some(Some("details".into())),
                ..Default::default()
            },
        )
        .await?;
    let updated: ItemResponse = expect_json(resp, 200, "update description").await?;
    ensure!(updated.title == "draft");
    ensure!(updated.description.as_deref() == Some("details"));

    let resp = ctx
        .put_json_authed(
            &path,
            &member.token,
            &UpdateItemRequest {
                title: Some("final".into()),
                ..Default::default()
            },
        )
        .await?;
    let updated: ItemResponse = expect_json(resp, 200, "update title").await?;
    ensure!(updated.title == "final");
    ensure!(updated.description.as_deref() == Some("details"));

    let resp = ctx
        .put_json_authed(
            &path,
            &member.token,
            &UpdateItemRequest {
                title: Some(" ".into()),
                ..Default::default()
            },
        )
        .await?;
    ensure!(resp.status() == 400, "blank title: expected 400, got {}", resp.status());

    let resp = ctx
        .put_json_authed(&path, &member.token, &serde_json::json!({ "description": null }))
        .await?;
    let cleared: ItemResponse = expect_json(resp, 200, "clear description").await?;
    ensure!(cleared.title == "final");
    ensure!(
        cleared.description.is_none(),
        "description should be cleared, got {:?}",
        cleared.description
    );
    Ok(())
}

pub async fn delete_item(ctx: &TestContext) -> Result<()> {
    let (owner, member, ws_id) = ctx.setup_shared_workspace().await?;
    let item = ctx.create_item(&owner, &ws_id, "temporary").await?;
    let path = format!("/items/{}", item.id);

    let resp = ctx.delete_authed(&path, &member.token).await?;
    let body: serde_json::Value = expect_json(resp, 200, "delete item").await?;
    ensure!(body["ok"] == true);

    let resp = ctx.get_authed(&path, &owner.token).await?;
    ensure!(resp.status() == 404, "expected 404, got {}", resp.status());
    Ok(())
}

/// Listing with a workspace id stays inside that workspace.
pub async fn list_items_scoped(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let ws_a = ctx.create_workspace(&user).await?;
    let ws_b = ctx.create_workspace(&user).await?;
    ctx.create_item(&user, &ws_a.id, "a1").await?;
    ctx.create_item(&user, &ws_a.id, "a2").await?;
    ctx.create_item(&user, &ws_b.id, "b1").await?;

    let resp = ctx
        .get_authed(&format!("/items?workspace_id={}", ws_a.id), &user.token)
        .await?;
    let list: ListItemsResponse = expect_json(resp, 200, "list items").await?;
    ensure!(list.items.len() == 2, "expected 2, got {}", list.items.len());
    ensure!(list.items.iter().all(|i| i.workspace_id == ws_a.id));
    Ok(())
}

/// Without a workspace id the list covers every reachable workspace and
/// nothing else.
pub async fn list_items_across_workspaces(ctx: &TestContext) -> Result<()> {
    let (owner, member, shared_id) = ctx.setup_shared_workspace().await?;
    let own = ctx.create_workspace(&member).await?;
    let private = ctx.create_workspace(&owner).await?;
    ctx.create_item(&owner, &shared_id, "shared").await?;
    ctx.create_item(&member, &own.id, "mine").await?;
    ctx.create_item(&owner, &private.id, "hidden").await?;

    let resp = ctx.get_authed("/items", &member.token).await?;
    let list: ListItemsResponse = expect_json(resp, 200, "list items").await?;
    let mut titles: Vec<&str> = list.items.iter().map(|i| i.title.as_str()).collect();
    titles.sort();
    ensure!(titles == ["mine", "shared"], "unexpected items: {titles:?}");
    Ok(())
}

pub async fn list_items_paginated(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let ws = ctx.create_workspace(&user).await?;
    for n in 0..5 {
        ctx.create_item(&user, &ws.id, &format!("item-{n}")).await?;
    }

    let resp = ctx
        .get_authed(
            &format!("/items?workspace_id={}&skip=1&limit=2", ws.id),
            &user.token,
        )
        .await?;
    let page: ListItemsResponse = expect_json(resp, 200, "page").await?;
    ensure!(page.items.len() == 2, "expected 2, got {}", page.items.len());

    let resp = ctx
        .get_authed(&format!("/items?workspace_id={}&skip=4", ws.id), &user.token)
        .await?;
    let tail: ListItemsResponse = expect_json(resp, 200, "tail").await?;
    ensure!(tail.items.len() == 1, "expected 1, got {}", tail.items.len());
    Ok(())
}
