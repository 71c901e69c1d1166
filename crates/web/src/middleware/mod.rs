pub mod auth;
pub mod current_user;
