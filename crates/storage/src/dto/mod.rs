pub mod activity;
pub mod common;
pub mod conflict;
pub mod registration;
pub mod volunteer;
