pub mod admin_overview_service;
pub mod auth_service;
pub mod authorization_gate;
pub mod endpoints;
pub mod errors;
pub mod role_router;
pub mod service_client;
pub mod session_events;
pub mod token_codec;
