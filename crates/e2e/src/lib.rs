pub mod client;
pub mod runner;
pub mod specs;

/// Invoke `$mac!(module::name)` for every E2E spec.
///
/// This is the **single source of truth** for the spec list. Adding a new spec
/// here automatically registers it in `runner::run_modules` and `tests/server.rs`.
#[macro_export]
macro_rules! for_each_spec {
    ($mac:ident) => {
        // health (2)
        $mac!(health::health_check);
        $mac!(health::root_welcome);

        // identity (6)
        $mac!(auth::me_resolves_identity_once);
        $mac!(auth::me_without_email);
        $mac!(auth::missing_token_401);
        $mac!(auth::garbage_token_401);
        $mac!(auth::expired_token_401);
        $mac!(auth::wrong_secret_401);

        // workspaces (8)
        $mac!(workspaces::create_workspace);
        $mac!(workspaces::create_workspace_blank_name_400);
        $mac!(workspaces::list_owned_and_shared);
        $mac!(workspaces::get_workspace_as_member);
        $mac!(workspaces::get_workspace_outsider_403);
        $mac!(workspaces::get_workspace_not_found);
        $mac!(workspaces::member_cannot_delete_workspace);
        $mac!(workspaces::delete_workspace_cascades);

        // members (8)
        $mac!(members::add_member_by_email);
        $mac!(members::add_member_email_case_insensitive);
        $mac!(members::list_members_owner_first);
        $mac!(members::add_unknown_email_404);
        $mac!(members::add_duplicate_member_400);
        $mac!(members::add_owner_as_member_400);
        $mac!(members::member_cannot_add_members);
        $mac!(members::remove_member_revokes_access);

        // items (11)
        $mac!(items::create_item_shared);
        $mac!(items::create_item_without_workspace_400);
        $mac!(items::create_item_blank_title_400);
        $mac!(items::create_item_missing_workspace_404);
        $mac!(items::outsider_item_ops_403);
        $mac!(items::get_item_not_found);
        $mac!(items::update_item_partial);
        $mac!(items::delete_item);
        $mac!(items::list_items_scoped);
        $mac!(items::list_items_across_workspaces);
        $mac!(items::list_items_paginated);

        // typed client (2)
        $mac!(typed::sharing_lifecycle);
        $mac!(typed::typed_client_requires_token);
    };
}
