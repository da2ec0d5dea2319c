use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use urlencoding::encode;

use crate::models::admin::RoleCount;
use crate::models::role::Role;
use crate::services::errors::service_client_errors::ServiceClientError;
use crate::services::service_client::ServiceClients;

pub const USER_PROFILE_PATH: &str = "/users/profile";
pub const VOLUNTEER_PROFILE_PATH: &str = "/volunteers/profile";

/// Where the logged-in user's own profile lives on the identity service.
/// Volunteers have a dedicated resource; every other role uses the user one.
pub fn own_profile_path(role: Role) -> &'static str {
    match role {
        Role::Volunteer => VOLUNTEER_PROFILE_PATH,
        _ => USER_PROFILE_PATH,
    }
}

/// Why the matching service turned down an opportunity registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationRejection {
    AlreadyRegistered(String),
    NoSlotsLeft(String),
}

/// Classifies a 400 from `register_for_opportunity`. The server message is
/// kept verbatim for display.
pub fn registration_rejection(error: &ServiceClientError) -> Option<RegistrationRejection> {
    let message = match error {
        ServiceClientError::Status { message, .. } if error.status() == Some(400) => message,
        _ => return None,
    };
    let lowered = message.to_lowercase();
    if lowered.contains("already registered") {
        Some(RegistrationRejection::AlreadyRegistered(message.clone()))
    } else if lowered.contains("no slots") {
        Some(RegistrationRejection::NoSlotsLeft(message.clone()))
    } else {
        None
    }
}

/// Accepts a bare array or a paged `{"content": [...]}` body; anything else
/// is treated as empty.
pub fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("content") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

// Identity service
impl ServiceClients {
    pub async fn users(&self) -> Result<Vec<Value>, ServiceClientError> {
        self.identity.get::<Value>("/users").await.map(into_list)
    }

    pub async fn volunteers(&self) -> Result<Vec<Value>, ServiceClientError> {
        self.identity.get::<Value>("/users/volunteers").await.map(into_list)
    }

    pub async fn ngos(&self) -> Result<Vec<Value>, ServiceClientError> {
        self.identity.get::<Value>("/users/ngos").await.map(into_list)
    }

    pub async fn user(&self, id: &str) -> Result<Value, ServiceClientError> {
        self.identity.get(&format!("/users/{}", encode(id))).await
    }

    /// Profile keyed by the token subject (the account email).
    pub async fn profile(&self, subject: &str) -> Result<Value, ServiceClientError> {
        self.identity
            .get(&format!("{}/{}", USER_PROFILE_PATH, encode(subject)))
            .await
    }

    pub async fn update_profile<B: Serialize + ?Sized>(
        &self,
        role: Role,
        profile: &B,
    ) -> Result<Value, ServiceClientError> {
        self.identity.put(own_profile_path(role), profile).await
    }

    /// Postings a volunteer has applied to.
    pub async fn volunteer_applications(
        &self,
        volunteer_id: &str,
    ) -> Result<Vec<Value>, ServiceClientError> {
        self.identity
            .get::<Value>(&format!("/users/volunteers/{}/postings", encode(volunteer_id)))
            .await
            .map(into_list)
    }
}

// Postings service
impl ServiceClients {
    pub async fn postings(&self) -> Result<Vec<Value>, ServiceClientError> {
        self.postings.get::<Value>("/postings").await.map(into_list)
    }

    pub async fn posting(&self, id: &str) -> Result<Value, ServiceClientError> {
        self.postings.get(&format!("/postings/{}", encode(id))).await
    }

    pub async fn ngo_postings(&self, ngo_id: &str) -> Result<Vec<Value>, ServiceClientError> {
        self.postings
            .get::<Value>(&format!("/postings/ngo/{}", encode(ngo_id)))
            .await
            .map(into_list)
    }

    pub async fn postings_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Value>, ServiceClientError> {
        self.postings
            .get::<Value>(&format!("/postings/category/{}", encode(category)))
            .await
            .map(into_list)
    }

    pub async fn search_postings(&self, query: &str) -> Result<Vec<Value>, ServiceClientError> {
        self.postings
            .get_with_query::<Value>("/postings/search", &[("q", query)])
            .await
            .map(into_list)
    }

    pub async fn create_posting<B: Serialize + ?Sized>(
        &self,
        posting: &B,
    ) -> Result<Value, ServiceClientError> {
        self.postings.post("/postings", posting).await
    }

    pub async fn update_posting<B: Serialize + ?Sized>(
        &self,
        id: &str,
        posting: &B,
    ) -> Result<Value, ServiceClientError> {
        self.postings
            .put(&format!("/postings/{}", encode(id)), posting)
            .await
    }

    pub async fn delete_posting(&self, id: &str) -> Result<(), ServiceClientError> {
        self.postings
            .delete::<Value>(&format!("/postings/{}", encode(id)))
            .await
            .map(|_| ())
    }
}

// Matching and analytics services
impl ServiceClients {
    pub async fn matches_for_volunteer(
        &self,
        volunteer_id: &str,
    ) -> Result<Vec<Value>, ServiceClientError> {
        self.matching
            .get::<Value>(&format!("/matches/volunteer/{}", encode(volunteer_id)))
            .await
            .map(into_list)
    }

    /// Sends no body. A 400 is classified by [`registration_rejection`].
    pub async fn register_for_opportunity(
        &self,
        volunteer_id: &str,
        posting_id: &str,
    ) -> Result<Value, ServiceClientError> {
        let path = format!(
            "/matching/register/{}/{}",
            encode(volunteer_id),
            encode(posting_id)
        );
        self.matching
            .send::<(), Value>(Method::POST, &path, &[], None)
            .await
    }

    pub async fn calculate_match(
        &self,
        volunteer_id: &str,
        posting_id: &str,
    ) -> Result<Value, ServiceClientError> {
        self.matching
            .get(&format!(
                "/matches/calculate/{}/{}",
                encode(volunteer_id),
                encode(posting_id)
            ))
            .await
    }

    pub async fn recommendations(
        &self,
        volunteer_id: &str,
    ) -> Result<Vec<Value>, ServiceClientError> {
        self.matching
            .get::<Value>(&format!("/matches/recommendations/{}", encode(volunteer_id)))
            .await
            .map(into_list)
    }

    pub async fn analytics_dashboard(&self) -> Result<Value, ServiceClientError> {
        self.analytics.get("/analytics/dashboard").await
    }

    pub async fn role_insights(&self) -> Result<Vec<RoleCount>, ServiceClientError> {
        self.analytics.get("/admin/analytics/user-insights").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceRegistry;
    use crate::repositories::session_store::InMemorySessionStore;
    use crate::services::service_client::ServiceClientFactory;
    use crate::services::session_events::SessionEvents;
    use serde_json::json;
    use std::sync::Arc;
    use test_case::test_case;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn clients(server: &MockServer) -> ServiceClients {
        ServiceClientFactory::new(Arc::new(InMemorySessionStore::new()), SessionEvents::new())
            .build_all(&ServiceRegistry::single(server.uri()))
    }

    #[test]
    fn test_into_list_shapes() {
        assert_eq!(into_list(json!([1, 2])), vec![json!(1), json!(2)]);
        assert_eq!(into_list(json!({"content": [3], "totalPages": 1})), vec![json!(3)]);
        assert!(into_list(json!({"items": [1]})).is_empty());
        assert!(into_list(Value::Null).is_empty());
    }

    #[tokio::test]
    async fn test_paged_postings_are_flattened() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/postings"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": [{"id": 1}, {"id": 2}], "totalElements": 2})),
            )
            .mount(&server)
            .await;

        let postings = clients(&server).postings().await.unwrap();
        assert_eq!(postings.len(), 2);
    }

    #[tokio::test]
    async fn test_category_and_search_encoding() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/postings/category/Animal%20Welfare"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 5}])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/postings/search"))
            .and(query_param("q", "beach clean-up"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 6}, {"id": 7}])))
            .mount(&server)
            .await;

        let clients = clients(&server);
        assert_eq!(clients.postings_by_category("Animal Welfare").await.unwrap().len(), 1);
        assert_eq!(clients.search_postings("beach clean-up").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_posting_lifecycle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/postings"))
            .and(body_json(json!({"title": "Food drive"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "p-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/postings/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "p-1", "title": "Food bank"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/postings/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "p-1"})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/postings/p-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let clients = clients(&server);
        let created = clients.create_posting(&json!({"title": "Food drive"})).await.unwrap();
        assert_eq!(created["id"], "p-1");
        let updated = clients
            .update_posting("p-1", &json!({"title": "Food bank"}))
            .await
            .unwrap();
        assert_eq!(updated["title"], "Food bank");
        assert_eq!(clients.posting("p-1").await.unwrap()["id"], "p-1");
        clients.delete_posting("p-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_volunteer_lookups() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/v%201"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "v 1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/matches/volunteer/v%201"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"postingId": 3}])))
            .mount(&server)
            .await;

        let clients = clients(&server);
        assert_eq!(clients.user("v 1").await.unwrap()["id"], "v 1");
        assert_eq!(clients.matches_for_volunteer("v 1").await.unwrap().len(), 1);
    }

    #[test_case(Role::Volunteer, "/volunteers/profile")]
    #[test_case(Role::Ngo, "/users/profile")]
    #[test_case(Role::Corporate, "/users/profile")]
    #[test_case(Role::Admin, "/users/profile")]
    fn test_own_profile_path(role: Role, expected: &str) {
        assert_eq!(own_profile_path(role), expected);
    }

    #[tokio::test]
    async fn test_profile_fetch_and_update_per_role() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/profile/ngo%40example.org"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Green Earth"})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/users/profile"))
            .and(body_json(json!({"name": "Green Earth Trust"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Green Earth Trust"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/volunteers/profile"))
            .and(body_json(json!({"skills": ["first aid"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"skills": ["first aid"]})))
            .expect(1)
            .mount(&server)
            .await;

        let clients = clients(&server);
        assert_eq!(
            clients.profile("ngo@example.org").await.unwrap()["name"],
            "Green Earth"
        );
        clients
            .update_profile(Role::Ngo, &json!({"name": "Green Earth Trust"}))
            .await
            .unwrap();
        clients
            .update_profile(Role::Volunteer, &json!({"skills": ["first aid"]}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ngo_postings_and_volunteer_applications() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/postings/ngo/12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/volunteers/3/postings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": [{"id": 2}]})))
            .mount(&server)
            .await;

        let clients = clients(&server);
        assert_eq!(clients.ngo_postings("12").await.unwrap().len(), 2);
        assert_eq!(clients.volunteer_applications("3").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_opportunity_registration_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/matching/register/3/10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "REGISTERED"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/matching/register/3/11"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                json!({"message": "Volunteer is already registered for this posting"}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/matching/register/3/12"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "No slots available"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/matching/register/3/13"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Posting closed"))
            .mount(&server)
            .await;

        let clients = clients(&server);
        assert_eq!(
            clients.register_for_opportunity("3", "10").await.unwrap()["status"],
            "REGISTERED"
        );

        let already = clients.register_for_opportunity("3", "11").await.unwrap_err();
        assert_eq!(
            registration_rejection(&already),
            Some(RegistrationRejection::AlreadyRegistered(
                "Volunteer is already registered for this posting".to_string()
            ))
        );

        let full = clients.register_for_opportunity("3", "12").await.unwrap_err();
        assert_eq!(
            registration_rejection(&full),
            Some(RegistrationRejection::NoSlotsLeft("No slots available".to_string()))
        );

        let closed = clients.register_for_opportunity("3", "13").await.unwrap_err();
        assert_eq!(registration_rejection(&closed), None);
        assert_eq!(closed.status(), Some(400));
        assert_eq!(closed.to_string(), "Request failed with status 400: Posting closed");
    }

    #[tokio::test]
    async fn test_calculate_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/matches/calculate/3/10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"score": 0.82})))
            .mount(&server)
            .await;

        let score = clients(&server).calculate_match("3", "10").await.unwrap();
        assert_eq!(score["score"], 0.82);
    }

    #[tokio::test]
    async fn test_role_insights_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/analytics/user-insights"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"role": "ADMIN", "count": 2},
                {"role": "NGO", "count": 11}
            ])))
            .mount(&server)
            .await;

        let insights = clients(&server).role_insights().await.unwrap();
        assert_eq!(insights[1], RoleCount { role: "NGO".to_string(), count: 11 });
    }
}
