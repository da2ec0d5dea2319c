use clap::{Parser, Subcommand};
use serde_json::Value;

use vrms_core::models::auth::requests::AccountKind;
use vrms_core::models::navigation::Screen;

#[derive(Debug, Parser)]
#[command(name = "vrms", about = "VolunteerConnect command line client")]
pub struct Cli {
    /// Override the session file location
    #[arg(long, global = true)]
    pub session_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and print the dashboard to navigate to
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "VRMS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a volunteer, NGO or corporate account
    Register {
        #[arg(value_parser = parse_account_kind)]
        kind: AccountKind,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "VRMS_PASSWORD", hide_env_values = true)]
        password: String,
        /// Extra profile fields as key=value, e.g. --field city=Pune
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, Value)>,
    },
    Logout,
    /// Show the claims of the current session
    Whoami,
    /// Run the entry check for a screen
    Open {
        #[arg(value_parser = parse_screen)]
        screen: Screen,
    },
    /// Load the admin dashboard sections
    AdminOverview,
    /// List opportunities
    Postings {
        #[arg(long, conflicts_with = "search")]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Recommended opportunities for the logged-in volunteer
    Recommendations,
    /// Register the logged-in volunteer for an opportunity
    Apply { posting_id: String },
    /// Show the logged-in user's profile
    Profile,
    /// Exchange the refresh token for a new access token
    Refresh,
    DeleteAccount,
}

fn parse_account_kind(value: &str) -> Result<AccountKind, String> {
    value.parse()
}

fn parse_screen(value: &str) -> Result<Screen, String> {
    value.parse()
}

/// `key=value`; values that parse as JSON (numbers, booleans) keep their type.
pub fn parse_field(value: &str) -> Result<(String, Value), String> {
    let (key, raw) = value
        .split_once('=')
        .ok_or_else(|| format!("Expected key=value, got {}", value))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("Field name cannot be empty".to_string());
    }
    let parsed = serde_json::from_str::<Value>(raw)
        .ok()
        .filter(|v| !v.is_object() && !v.is_array())
        .unwrap_or_else(|| Value::String(raw.to_string()));
    Ok((key.to_string(), parsed))
}
