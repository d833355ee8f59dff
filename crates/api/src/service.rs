//! Shared business logic: framework-agnostic pure functions.
//!
//! Route handlers gather facts from the database (who owns the workspace,
//! which membership row the caller has) and hand them to these functions,
//! keeping the access decisions in one place and testable without SQLite.

use crate::{Role, ServiceError};

// ─── Validation ─────────────────────────────────────────────────────────────

pub const MAX_WORKSPACE_NAME_LEN: usize = 128;
pub const MAX_ITEM_TITLE_LEN: usize = 256;

/// Validate and normalize an email address. Returns the lowercased, trimmed email.
pub fn validate_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') || email.len() > 254 {
        return Err(ServiceError::BadRequest("invalid email address".into()));
    }
    Ok(email)
}

/// Validate and normalize a workspace name. Returns the trimmed name.
pub fn validate_workspace_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim().to_string();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_WORKSPACE_NAME_LEN {
        return Err(ServiceError::BadRequest(format!(
            "workspace name must be 1-{MAX_WORKSPACE_NAME_LEN} characters"
        )));
    }
    Ok(trimmed)
}

/// Validate and normalize an item title. Returns the trimmed title.
pub fn validate_item_title(title: &str) -> Result<String, ServiceError> {
    let trimmed = title.trim().to_string();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_ITEM_TITLE_LEN {
        return Err(ServiceError::BadRequest(format!(
            "item title must be 1-{MAX_ITEM_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed)
}

/// Require the `workspace_id` query parameter for item creation.
pub fn require_workspace_id(workspace_id: Option<&str>) -> Result<&str, ServiceError> {
    match workspace_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ServiceError::BadRequest("workspace_id is required".into())),
    }
}

// ─── Access rules ───────────────────────────────────────────────────────────

/// Resolve a caller's role in a workspace.
///
/// `owner_id` is the workspace's owner; `membership_role` is the role stored
/// on the caller's membership row, if one exists. Ownership wins over any
/// membership row. An unrecognised stored role grants nothing.
pub fn resolve_role(owner_id: &str, user_id: &str, membership_role: Option<&str>) -> Option<Role> {
    if owner_id == user_id {
        return Some(Role::Owner);
    }
    membership_role.and_then(Role::parse)
}

/// Any resolvable role grants read/write access to a workspace and its items.
pub fn require_access(role: Option<Role>) -> Result<Role, ServiceError> {
    role.ok_or_else(|| ServiceError::Forbidden("access denied".into()))
}

/// Deleting a workspace and managing members require the owner role exactly.
pub fn require_owner(role: Option<Role>, action: &str) -> Result<(), ServiceError> {
    match role {
        Some(Role::Owner) => Ok(()),
        _ => Err(ServiceError::Forbidden(format!("only the owner can {action}"))),
    }
}

/// Reject sharing a workspace with someone who already has access.
pub fn check_new_member(owner_id: &str, target_user_id: &str, already_member: bool) -> Result<(), ServiceError> {
    if owner_id == target_user_id {
        return Err(ServiceError::BadRequest("user owns this workspace".into()));
    }
    if already_member {
        return Err(ServiceError::BadRequest("user is already a member".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_workspace_name() {
        assert_eq!(validate_workspace_name("  Research  ").unwrap(), "Research");
        assert!(validate_workspace_name("").is_err());
        assert!(validate_workspace_name("   ").is_err());
        assert!(validate_workspace_name(&"x".repeat(129)).is_err());
        assert!(validate_workspace_name(&"x".repeat(128)).is_ok());
    }

    #[test]
    fn test_validate_item_title() {
        assert_eq!(validate_item_title(" Build Dashboard ").unwrap(), "Build Dashboard");
        assert!(validate_item_title("").is_err());
        assert!(validate_item_title(&"t".repeat(257)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" User2@Example.com ").unwrap(), "user2@example.com");
        assert!(validate_email("nobody").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_require_workspace_id() {
        assert_eq!(require_workspace_id(Some(" ws-1 ")).unwrap(), "ws-1");
        assert_eq!(require_workspace_id(None).unwrap_err().status_code(), 400);
        assert_eq!(require_workspace_id(Some("")).unwrap_err().status_code(), 400);
    }

    #[test]
    fn owner_takes_precedence_over_membership() {
        assert_eq!(resolve_role("u1", "u1", None), Some(Role::Owner));
        assert_eq!(resolve_role("u1", "u1", Some("member")), Some(Role::Owner));
        assert_eq!(resolve_role("u1", "u2", Some("member")), Some(Role::Member));
        assert_eq!(resolve_role("u1", "u2", None), None);
        assert_eq!(resolve_role("u1", "u2", Some("bogus")), None);
    }

    #[test]
    fn access_requires_some_role() {
        assert_eq!(require_access(Some(Role::Member)).unwrap(), Role::Member);
        assert_eq!(require_access(Some(Role::Owner)).unwrap(), Role::Owner);
        assert_eq!(require_access(None).unwrap_err().status_code(), 403);
    }

    #[test]
    fn owner_only_rejects_members_and_strangers() {
        assert!(require_owner(Some(Role::Owner), "delete the workspace").is_ok());
        let err = require_owner(Some(Role::Member), "remove members").unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "only the owner can remove members");
        assert!(require_owner(None, "add members").is_err());
    }

    #[test]
    fn new_member_must_not_already_have_access() {
        assert!(check_new_member("u1", "u2", false).is_ok());
        let err = check_new_member("u1", "u1", false).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "user owns this workspace");
        let err = check_new_member("u1", "u2", true).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "user is already a member");
    }
}
