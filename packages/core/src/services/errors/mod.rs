pub mod auth_service_errors;
pub mod service_client_errors;
pub mod token_codec_errors;
