pub mod admin;
pub mod auth;
pub mod claims;
pub mod navigation;
pub mod role;
pub mod session;
