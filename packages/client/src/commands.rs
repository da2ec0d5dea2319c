use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::{debug, error};

use vrms_core::models::admin::{count_for, total_users, Section};
use vrms_core::models::auth::requests::{AccountKind, LoginRequest, RegistrationRequest};
use vrms_core::models::navigation::{Route, Screen};
use vrms_core::models::role::Role;
use vrms_core::services::auth_service::AuthServiceTrait;
use vrms_core::services::authorization_gate::GateDecision;
use vrms_core::services::endpoints::{registration_rejection, RegistrationRejection};

use crate::cli::Command;
use crate::state::AppState;

pub async fn run(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => login(state, &email, &password).await,
        Command::Register {
            kind,
            name,
            email,
            password,
            fields,
        } => register(state, kind, name, email, password, fields).await,
        Command::Logout => {
            state.auth_service.logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => whoami(state),
        Command::Open { screen } => open(state, &screen).map(|_| ()),
        Command::AdminOverview => admin_overview(state).await,
        Command::Postings { category, search } => postings(state, category, search).await,
        Command::Recommendations => recommendations(state).await,
        Command::Apply { posting_id } => apply(state, &posting_id).await,
        Command::Profile => profile(state).await,
        Command::Refresh => {
            state.auth_service.refresh().await?;
            println!("Access token refreshed");
            Ok(())
        }
        Command::DeleteAccount => {
            state.auth_service.delete_account().await?;
            println!("Account deleted");
            Ok(())
        }
    }
}

async fn login(state: &AppState, email: &str, password: &str) -> Result<()> {
    let route = state
        .auth_service
        .login(&LoginRequest::new(email, password))
        .await
        .context("Login failed. Please check your credentials")?;
    println!("Login successful");
    println!("Navigate to {}", route);
    Ok(())
}

async fn register(
    state: &AppState,
    kind: AccountKind,
    name: String,
    email: String,
    password: String,
    fields: Vec<(String, Value)>,
) -> Result<()> {
    let request = fields
        .into_iter()
        .fold(RegistrationRequest::new(name, email, password), |req, (k, v)| {
            req.with_field(k, v)
        });
    let created = state.auth_service.register(kind, &request).await?;
    debug!("Registration response: {}", created);
    println!("Registration successful. Please log in");
    Ok(())
}

fn whoami(state: &AppState) -> Result<()> {
    let claims = state.auth_service.current_claims()?;
    println!("role:    {}", claims.role());
    println!(
        "subject: {}",
        claims.subject_id().unwrap_or_else(|| "-".to_string())
    );
    if let Some(email) = claims.email() {
        println!("email:   {}", email);
    }
    match claims.expires_at() {
        Some(exp) => println!("expires: {}", exp.to_rfc3339()),
        None => println!("expires: never"),
    }
    Ok(())
}

fn open(state: &AppState, screen: &Screen) -> Result<GateDecision> {
    let decision = state.gate.evaluate(screen);
    match &decision {
        GateDecision::Authorized(claims) => {
            println!("Entering {} as {}", screen.name, claims.role())
        }
        GateDecision::RedirectToLogin(reason) => {
            println!("{}. Redirecting to {}", reason, Route::Login)
        }
    }
    Ok(decision)
}

async fn admin_overview(state: &AppState) -> Result<()> {
    if !open(state, &Screen::ADMIN_DASHBOARD)?.is_authorized() {
        return Ok(());
    }

    let (overview, insights) = tokio::join!(
        state.overview_service.load(),
        state.overview_service.role_insights()
    );

    print_list_section("Users", &overview.users);
    print_list_section("Volunteers", &overview.volunteers);
    print_list_section("NGOs", &overview.ngos);
    print_list_section("Postings", &overview.postings);

    println!("User analytics ({})", insights.label());
    match insights.data() {
        Some(counts) => {
            println!("  Total users: {}", total_users(counts));
            for role in [Role::Volunteer, Role::Ngo, Role::Corporate, Role::Admin] {
                println!("  {:<10} {}", role, count_for(counts, role));
            }
        }
        None => {
            if let Section::Unavailable(message) = &insights {
                println!("  {}", message);
            }
        }
    }
    Ok(())
}

fn print_list_section(title: &str, section: &Section<Vec<Value>>) {
    match section {
        Section::Unavailable(message) => println!("{}: unavailable ({})", title, message),
        other => println!(
            "{}: {} ({})",
            title,
            other.data().map(Vec::len).unwrap_or(0),
            other.label()
        ),
    }
}

async fn postings(
    state: &AppState,
    category: Option<String>,
    search: Option<String>,
) -> Result<()> {
    let result = match (category, search) {
        (Some(category), _) => state.clients.postings_by_category(&category).await,
        (None, Some(query)) => state.clients.search_postings(&query).await,
        (None, None) => state.clients.postings().await,
    };
    let postings = result.map_err(|e| {
        error!("Failed to load opportunities: {}", e);
        e
    })?;

    if postings.is_empty() {
        println!("No opportunities found");
    }
    for posting in &postings {
        println!("{}", summarize(posting));
    }
    Ok(())
}

async fn recommendations(state: &AppState) -> Result<()> {
    let decision = open(state, &Screen::OPPORTUNITIES)?;
    let Some(claims) = decision.claims() else {
        return Ok(());
    };
    let Some(volunteer_id) = claims.subject_id() else {
        bail!("Invalid session. Please login again");
    };

    let recommended = state.clients.recommendations(&volunteer_id).await?;
    if recommended.is_empty() {
        println!("No recommendations yet");
    }
    for posting in &recommended {
        println!("{}", summarize(posting));
    }
    Ok(())
}

async fn apply(state: &AppState, posting_id: &str) -> Result<()> {
    let decision = open(state, &Screen::OPPORTUNITIES)?;
    let Some(claims) = decision.claims() else {
        return Ok(());
    };
    let Some(volunteer_id) = claims.subject_id() else {
        bail!("Invalid session. Please login again");
    };

    match state
        .clients
        .register_for_opportunity(&volunteer_id, posting_id)
        .await
    {
        Ok(_) => {
            println!("Registered for opportunity {}", posting_id);
            Ok(())
        }
        Err(e) => match registration_rejection(&e) {
            Some(RegistrationRejection::AlreadyRegistered(message))
            | Some(RegistrationRejection::NoSlotsLeft(message)) => {
                println!("{}", message);
                Ok(())
            }
            None => Err(e.into()),
        },
    }
}

async fn profile(state: &AppState) -> Result<()> {
    let claims = state.auth_service.current_claims()?;
    let subject = claims
        .email()
        .or_else(|| claims.subject_id())
        .context("Invalid session. Please login again")?;

    let profile = state.clients.profile(&subject).await?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

fn summarize(posting: &Value) -> String {
    let field = |key: &str| {
        posting
            .get(key)
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "-".to_string())
    };
    format!("[{}] {} ({})", field("id"), field("title"), field("location"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summarize_handles_missing_fields() {
        assert_eq!(
            summarize(&json!({"id": 3, "title": "Beach clean-up", "location": "Goa"})),
            "[3] Beach clean-up (Goa)"
        );
        assert_eq!(summarize(&json!({"title": "Tutoring"})), "[-] Tutoring (-)");
    }
}
