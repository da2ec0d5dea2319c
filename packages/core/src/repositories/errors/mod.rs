pub mod session_store_errors;
