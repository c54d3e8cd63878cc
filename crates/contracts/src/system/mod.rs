pub mod auth;
pub mod features;
pub mod roles;
