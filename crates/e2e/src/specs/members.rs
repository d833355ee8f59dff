use anyhow::{Result, ensure};

use sharespace_api::{AddMemberRequest, ListMembersResponse, Role};

use crate::client::{TestContext, expect_json};

/// The owner shares a workspace by email; the member then sees it.
pub async fn add_member_by_email(ctx: &TestContext) -> Result<()> {
    let owner = ctx.register_user().await?;
    let member = ctx.register_user().await?;
    let ws = ctx.create_workspace(&owner).await?;

    let resp = ctx
        .get_authed(&format!("/workspaces/{}", ws.id), &member.token)
        .await?;
    ensure!(resp.status() == 403, "expected 403 before sharing, got {}", resp.status());

    let added = ctx.add_member(&owner, &ws.id, &member).await?;
    ensure!(added.user_id == member.user_id);
    ensure!(added.role == Role::Member);
    ensure!(added.email.as_deref() == Some(member.email.as_str()));

    let resp = ctx
        .get_authed(&format!("/workspaces/{}", ws.id), &member.token)
        .await?;
    ensure!(resp.status() == 200, "expected 200 after sharing, got {}", resp.status());
    Ok(())
}

/// Email lookup ignores case.
pub async fn add_member_email_case_insensitive(ctx: &TestContext) -> Result<()> {
    let owner = ctx.register_user().await?;
    let member = ctx.register_user().await?;
    let ws = ctx.create_workspace(&owner).await?;

    let resp = ctx
        .post_json_authed(
            &format!("/workspaces/{}/members", ws.id),
            &owner.token,
            &AddMemberRequest {
                email: member.email.to_uppercase(),
            },
        )
        .await?;
    ensure!(resp.status() == 201, "expected 201, got {}", resp.status());
    Ok(())
}

pub async fn list_members_owner_first(ctx: &TestContext) -> Result<()> {
    let (owner, member, ws_id) = ctx.setup_shared_workspace().await?;

    let resp = ctx
        .get_authed(&format!("/workspaces/{ws_id}/members"), &member.token)
        .await?;
    let list: ListMembersResponse = expect_json(resp, 200, "list members").await?;
    ensure!(list.members.len() == 2, "expected 2, got {}", list.members.len());
    ensure!(list.members[0].user_id == owner.user_id);
    ensure!(list.members[0].role == Role::Owner);
    ensure!(list.members[1].user_id == member.user_id);
    ensure!(list.members[1].role == Role::Member);
    Ok(())
}

pub async fn add_unknown_email_404(ctx: &TestContext) -> Result<()> {
    let owner = ctx.register_user().await?;
    let ws = ctx.create_workspace(&owner).await?;

    let resp = ctx
        .post_json_authed(
            &format!("/workspaces/{}/members", ws.id),
            &owner.token,
            &AddMemberRequest {
                email: "nobody-here@e2e.local".into(),
            },
        )
        .await?;
    ensure!(resp.status() == 404, "expected 404, got {}", resp.status());
    Ok(())
}

pub async fn add_duplicate_member_400(ctx: &TestContext) -> Result<()> {
    let (owner, member, ws_id) = ctx.setup_shared_workspace().await?;

    let resp = ctx
        .post_json_authed(
            &format!("/workspaces/{ws_id}/members"),
            &owner.token,
            &AddMemberRequest {
                email: member.email.clone(),
            },
        )
        .await?;
    ensure!(resp.status() == 400, "expected 400, got {}", resp.status());
    let body: serde_json::Value = resp.json().await?;
    ensure!(body["error"].is_string(), "expected error body");
    Ok(())
}

pub async fn add_owner_as_member_400(ctx: &TestContext) -> Result<()> {
    let owner = ctx.register_user().await?;
    let ws = ctx.create_workspace(&owner).await?;

    let resp = ctx
        .post_json_authed(
            &format!("/workspaces/{}/members", ws.id),
            &owner.token,
            &AddMemberRequest {
                email: owner.email.clone(),
            },
        )
        .await?;
    ensure!(resp.status() == 400, "expected 400, got {}", resp.status());
    let body: serde_json::Value = resp.json().await?;
    ensure!(body["error"].is_string(), "expected error body");
    Ok(())
}

pub async fn member_cannot_add_members(ctx: &TestContext) -> Result<()> {
    let (_, member, ws_id) = ctx.setup_shared_workspace().await?;
    let third = ctx.register_user().await?;

    let resp = ctx
        .post_json_authed(
            &format!("/workspaces/{ws_id}/members"),
            &member.token,
            &AddMemberRequest {
                email: third.email.clone(),
            },
        )
        .await?;
    ensure!(resp.status() == 403, "expected 403, got {}", resp.status());
    Ok(())
}

/// Removing a membership revokes access to the workspace and its items.
pub async fn remove_member_revokes_access(ctx: &TestContext) -> Result<()> {
    let owner = ctx.register_user().await?;
    let member = ctx.register_user().await?;
    let ws = ctx.create_workspace(&owner).await?;
    let added = ctx.add_member(&owner, &ws.id, &member).await?;
    let item = ctx.create_item(&owner, &ws.id, "shared").await?;

    let resp = ctx
        .get_authed(&format!("/items/{}", item.id), &member.token)
        .await?;
    ensure!(resp.status() == 200, "expected 200, got {}", resp.status());

    let resp = ctx
        .delete_authed(
            &format!("/workspaces/{}/members/{}", ws.id, added.id),
            &member.token,
        )
        .await?;
    ensure!(resp.status() == 403, "member removing: expected 403, got {}", resp.status());

    let resp = ctx
        .delete_authed(
            &format!("/workspaces/{}/members/{}", ws.id, added.id),
            &owner.token,
        )
        .await?;
    ensure!(resp.status() == 200, "expected 200, got {}", resp.status());

    let resp = ctx
        .get_authed(&format!("/items/{}", item.id), &member.token)
        .await?;
    ensure!(resp.status() == 403, "expected 403 after removal, got {}", resp.status());

    let resp = ctx
        .delete_authed(
            &format!("/workspaces/{}/members/{}", ws.id, added.id),
            &owner.token,
        )
        .await?;
    ensure!(resp.status() == 404, "second removal: expected 404, got {}", resp.status());
    Ok(())
}
