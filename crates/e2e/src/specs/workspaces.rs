use anyhow::{Result, ensure};
use uuid::Uuid;

use sharespace_api::{
    CreateWorkspaceRequest, ListWorkspacesResponse, Role, WorkspaceResponse,
};

use crate::client::{TestContext, expect_json};

/// POST /workspaces → 201 with the caller as owner.
pub async fn create_workspace(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let name = format!("ws-{}", &Uuid::new_v4().to_string()[..8]);

    let resp = ctx
        .post_json_authed(
            "/workspaces",
            &user.token,
            &CreateWorkspaceRequest { name: name.clone() },
        )
        .await?;
    let ws: WorkspaceResponse = expect_json(resp, 201, "create workspace").await?;
    ensure!(ws.name == name);
    ensure!(ws.owner_id == user.user_id);
    ensure!(ws.role == Role::Owner);
    Ok(())
}

pub async fn create_workspace_blank_name_400(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let resp = ctx
        .post_json_authed(
            "/workspaces",
            &user.token,
            &CreateWorkspaceRequest {
                name: "   ".into(),
            },
        )
        .await?;
    ensure!(resp.status() == 400, "expected 400, got {}", resp.status());
    Ok(())
}

/// GET /workspaces shows owned and shared workspaces with the caller's role.
pub async fn list_owned_and_shared(ctx: &TestContext) -> Result<()> {
    let (owner, member, shared_id) = ctx.setup_shared_workspace().await?;
    let own = ctx.create_workspace(&member).await?;

    let resp = ctx.get_authed("/workspaces", &member.token).await?;
    let list: ListWorkspacesResponse = expect_json(resp, 200, "list workspaces").await?;
    ensure!(list.workspaces.len() == 2, "expected 2, got {}", list.workspaces.len());
    ensure!(list.workspaces[0].id == own.id, "owned workspaces come first");
    ensure!(list.workspaces[0].role == Role::Owner);
    ensure!(list.workspaces[1].id == shared_id);
    ensure!(list.workspaces[1].role == Role::Member);

    let resp = ctx.get_authed("/workspaces", &owner.token).await?;
    let list: ListWorkspacesResponse = expect_json(resp, 200, "list owner workspaces").await?;
    ensure!(list.workspaces.len() == 1);
    ensure!(list.workspaces[0].role == Role::Owner);
    Ok(())
}

/// GET /workspaces/{id} reports the caller's role.
pub async fn get_workspace_as_member(ctx: &TestContext) -> Result<()> {
    let (_, member, ws_id) = ctx.setup_shared_workspace().await?;
    let resp = ctx
        .get_authed(&format!("/workspaces/{ws_id}"), &member.token)
        .await?;
    let ws: WorkspaceResponse = expect_json(resp, 200, "get workspace").await?;
    ensure!(ws.id == ws_id);
    ensure!(ws.role == Role::Member);
    Ok(())
}

pub async fn get_workspace_outsider_403(ctx: &TestContext) -> Result<()> {
    let owner = ctx.register_user().await?;
    let outsider = ctx.register_user().await?;
    let ws = ctx.create_workspace(&owner).await?;

    let resp = ctx
        .get_authed(&format!("/workspaces/{}", ws.id), &outsider.token)
        .await?;
    ensure!(resp.status() == 403, "expected 403, got {}", resp.status());
    Ok(())
}

pub async fn get_workspace_not_found(ctx: &TestContext) -> Result<()> {
    let user = ctx.register_user().await?;
    let resp = ctx
        .get_authed(&format!("/workspaces/{}", Uuid::new_v4()), &user.token)
        .await?;
    ensure!(resp.status() == 404, "expected 404, got {}", resp.status());
    Ok(())
}

pub async fn member_cannot_delete_workspace(ctx: &TestContext) -> Result<()> {
    let (owner, member, ws_id) = ctx.setup_shared_workspace().await?;

    let resp = ctx
        .delete_authed(&format!("/workspaces/{ws_id}"), &member.token)
        .await?;
    ensure!(resp.status() == 403, "expected 403, got {}", resp.status());

    let resp = ctx
        .get_authed(&format!("/workspaces/{ws_id}"), &owner.token)
        .await?;
    ensure!(resp.status() == 200, "workspace should survive, got {}", resp.status());
    Ok(())
}

/// Deleting a workspace takes its items and memberships with it.
pub async fn delete_workspace_cascades(ctx: &TestContext) -> Result<()> {
    let (owner, member, ws_id) = ctx.setup_shared_workspace().await?;
    let item = ctx.create_item(&member, &ws_id, "doomed").await?;

    let resp = ctx
        .delete_authed(&format!("/workspaces/{ws_id}"), &owner.token)
        .await?;
    let body: serde_json::Value = expect_json(resp, 200, "delete workspace").await?;
    ensure!(body["ok"] == true);

    let resp = ctx
        .get_authed(&format!("/workspaces/{ws_id}"), &owner.token)
        .await?;
    ensure!(resp.status() == 404, "expected 404, got {}", resp.status());

    let resp = ctx
        .get_authed(&format!("/items/{}", item.id), &owner.token)
        .await?;
    ensure!(resp.status() == 404, "item should be gone, got {}", resp.status());

    let resp = ctx.get_authed("/workspaces", &member.token).await?;
    let list: ListWorkspacesResponse = expect_json(resp, 200, "list workspaces").await?;
    ensure!(list.workspaces.is_empty(), "membership should be gone");
    Ok(())
}
