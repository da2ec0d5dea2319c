pub mod errors;
pub mod session_store;
