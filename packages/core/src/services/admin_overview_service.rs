use tracing::warn;

use crate::config::FallbackPolicy;
use crate::models::admin::{AdminOverview, RoleCount, Section};
use crate::services::errors::service_client_errors::ServiceClientError;
use crate::services::service_client::ServiceClients;

/// Loads the admin dashboard. Each read settles on its own; one failing
/// section never prevents the others from rendering.
pub struct AdminOverviewService {
    clients: ServiceClients,
    fallback: FallbackPolicy,
}

impl AdminOverviewService {
    pub fn new(clients: ServiceClients, fallback: FallbackPolicy) -> Self {
        AdminOverviewService { clients, fallback }
    }

    pub async fn load(&self) -> AdminOverview {
        let (users, volunteers, ngos, postings) = tokio::join!(
            self.clients.users(),
            self.clients.volunteers(),
            self.clients.ngos(),
            self.clients.postings(),
        );

        AdminOverview {
            users: settle("users", users, None),
            volunteers: settle("volunteers", volunteers, None),
            ngos: settle("ngos", ngos, None),
            postings: settle("postings", postings, None),
        }
    }

    pub async fn role_insights(&self) -> Section<Vec<RoleCount>> {
        let demo = match self.fallback {
            FallbackPolicy::DemoData => Some(RoleCount::demo()),
            FallbackPolicy::Disabled => None,
        };
        settle("role insights", self.clients.role_insights().await, demo)
    }
}

/// Demo data never masks a destroyed session.
fn settle<T>(
    label: &str,
    result: Result<T, ServiceClientError>,
    demo: Option<T>,
) -> Section<T> {
    match result {
        Ok(data) => Section::Live(data),
        Err(e) => {
            warn!("Failed to load {}: {}", label, e);
            match demo {
                Some(data) if !e.ends_session() => Section::Demo(data),
                _ => Section::Unavailable(e.to_string()),
            }
        }
    }
}
