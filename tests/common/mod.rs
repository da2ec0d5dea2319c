pub mod tokens;
pub mod utils;
