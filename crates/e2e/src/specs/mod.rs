pub mod auth;
pub mod health;
pub mod items;
pub mod members;
pub mod typed;
pub mod workspaces;
