//! Compile-time–checked column identifiers for all tables.

use sea_query::Iden;

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Subject,
    Email,
    CreatedAt,
}

#[derive(Iden)]
pub enum Workspaces {
    Table,
    Id,
    Name,
    OwnerId,
    CreatedAt,
}

#[derive(Iden)]
pub enum WorkspaceMembers {
    Table,
    Id,
    WorkspaceId,
    UserId,
    Role,
    JoinedAt,
}

#[derive(Iden)]
pub enum Items {
    Table,
    Id,
    WorkspaceId,
    Title,
    Description,
    CreatedAt,
    UpdatedAt,
}
