use eventdesk_api::config::AppConfig;
use reqwest::StatusCode;
use serde_json::{Value, json};

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "admin-pass";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let config = AppConfig::new("test-secret").with_admin(ADMIN_EMAIL, ADMIN_PASSWORD);
        let app = eventdesk_api::app::build_app(&config).expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await.unwrap()).await
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await.unwrap()).await
    }

    async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.client.delete(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await.unwrap()).await
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post("/auth/login", None, json!({ "email": email, "password": password }))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn public_account(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({ "email": email, "password": "pw", "role": "public", "name": "Pat" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Register, approve and sign in a company.
    async fn approved_company(&self, admin: &str, email: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({
                    "email": email,
                    "password": "pw",
                    "role": "company",
                    "name": "Org Owner",
                    "organization_name": "Acme Events"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let account_id = body["account"]["id"].as_str().unwrap().to_string();

        let (status, _) = self
            .post(
                &format!("/admin/accounts/{account_id}/approval"),
                Some(admin),
                json!({ "status": "approved" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        self.login(email, "pw").await
    }

    /// Create and approve an event; returns its id.
    async fn published_event(&self, admin: &str, company: &str, capacity: u32) -> String {
        let (status, body) = self
            .post("/company/events", Some(company), event_body("Rust Meetup", capacity))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["id"].as_str().unwrap().to_string();

        let (status, body) = self
            .post(&format!("/admin/events/{id}/approve"), Some(admin), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["status"], "published");
        id
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read(res: reqwest::Response) -> (StatusCode, Value) {
    let status = res.status();
    let text = res.text().await.unwrap();
    let body = serde_json::from_str(&text).unwrap_or(Value::Null);
    (status, body)
}

fn event_body(title: &str, capacity: u32) -> Value {
    json!({
        "title": title,
        "description": "Talks and pizza",
        "category": "tech",
        "date": "2099-06-01",
        "time": "18:30",
        "format": { "type": "venue", "location": "Hall A" },
        "capacity": capacity
    })
}

#[tokio::test]
async fn health_is_public_and_protected_routes_need_a_session() {
    let srv = TestServer::spawn().await;

    let (status, _) = srv.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = srv.get("/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = srv.get("/events", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn company_sign_in_waits_for_admin_approval() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = srv
        .post(
            "/auth/register",
            None,
            json!({
                "email": "Org@Example.com",
                "password": "pw",
                "role": "company",
                "name": "Org Owner",
                "organization_name": "Acme Events"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["requires_approval"], true);
    assert!(body["token"].is_null());
    assert_eq!(body["account"]["email"], "org@example.com");
    let account_id = body["account"]["id"].as_str().unwrap().to_string();

    let (status, body) = srv
        .post(
            "/auth/login",
            None,
            json!({ "email": "org@example.com", "password": "pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "pending_approval");

    let (status, _) = srv
        .post(
            &format!("/admin/accounts/{account_id}/approval"),
            Some(&admin),
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = srv.login("org@example.com", "pw").await;
    let (status, body) = srv.get("/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "company");
    assert_eq!(body["approval_status"], "approved");
}

#[tokio::test]
async fn sign_up_and_sign_in_errors_are_specific() {
    let srv = TestServer::spawn().await;
    srv.public_account("pat@example.com").await;

    let (status, body) = srv
        .post(
            "/auth/register",
            None,
            json!({ "email": "PAT@example.com", "password": "pw", "role": "public", "name": "Pat" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email_taken");

    let (status, body) = srv
        .post(
            "/auth/login",
            None,
            json!({ "email": "pat@example.com", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");

    let (status, body) = srv
        .post(
            "/auth/register",
            None,
            json!({ "email": "root2@example.com", "password": "pw", "role": "admin", "name": "R" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn event_moderation_controls_catalog_visibility() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let company = srv.approved_company(&admin, "org@example.com").await;
    let public = srv.public_account("pat@example.com").await;

    let (status, _) = srv
        .post("/company/events", Some(&public), event_body("Nope", 5))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv
        .post("/company/events", Some(&company), event_body("Rust Meetup", 5))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["organizer_name"], "Acme Events");
    let id = body["id"].as_str().unwrap().to_string();

    // Hidden from anonymous callers until published; visible to the owner.
    let (status, _) = srv.get(&format!("/events/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = srv.get(&format!("/events/{id}"), Some(&company)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = srv
        .post(&format!("/admin/events/{id}/reject"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "draft");

    let (status, body) = srv
        .post(&format!("/admin/events/{id}/approve"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "illegal_transition");

    let (status, _) = srv
        .post(&format!("/company/events/{id}/submit"), Some(&company), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = srv
        .post(&format!("/admin/events/{id}/approve"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = srv.get("/events?category=tech&q=rust", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["time"], "18:30");
    assert_eq!(listed[0]["spots_remaining"], 5);

    let (status, body) = srv
        .get(&format!("/admin/events/{id}/history"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        [
            "catalog.event.created",
            "catalog.event.rejected",
            "catalog.event.submitted",
            "catalog.event.published",
        ]
    );
}

#[tokio::test]
async fn register_verify_and_cancel_round_trip() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let company = srv.approved_company(&admin, "org@example.com").await;
    let public = srv.public_account("pat@example.com").await;
    let event_id = srv.published_event(&admin, &company, 10).await;

    let (status, body) = srv
        .post(&format!("/events/{event_id}/registrations"), Some(&public), json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let registration_id = body["registration_id"].as_str().unwrap().to_string();
    let data = body["ticket"]["data"].as_str().unwrap().to_string();
    assert_eq!(body["ticket"]["payload"]["eventTitle"], "Rust Meetup");
    assert!(
        body["ticket"]["verification_link"]
            .as_str()
            .unwrap()
            .contains("/tickets/verify?data=")
    );

    let (status, body) = srv
        .post(&format!("/events/{event_id}/registrations"), Some(&public), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_registered");

    let verify = reqwest::Url::parse_with_params(
        &srv.url("/tickets/verify"),
        &[("data", data.as_str()), ("fresh", "true")],
    )
    .unwrap();
    let (status, body) = read(srv.client.get(verify.clone()).send().await.unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["ticket"]["registrationId"], registration_id.as_str());
    assert_eq!(body["freshness"], "active");

    // Someone else's session cannot cancel it.
    let other = srv.public_account("sam@example.com").await;
    let (status, _) = srv
        .delete(&format!("/registrations/{registration_id}"), Some(&other))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv
        .delete(&format!("/registrations/{registration_id}"), Some(&public))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = srv
        .delete(&format!("/registrations/{registration_id}"), Some(&public))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "registration_not_found");

    let (_, body) = read(srv.client.get(verify).send().await.unwrap()).await;
    assert_eq!(body["freshness"], "cancelled");

    let (status, body) = srv.get("/me/registrations", Some(&public)).await;
    assert_eq!(status, StatusCode::OK);
    let mine = body.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["status"], "cancelled");
    assert_eq!(mine[0]["event"]["registered_count"], 0);
}

#[tokio::test]
async fn guests_fill_an_event_and_then_see_event_full() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let company = srv.approved_company(&admin, "org@example.com").await;
    let event_id = srv.published_event(&admin, &company, 2).await;
    let path = format!("/events/{event_id}/guest-registrations");

    let (status, body) = srv
        .post(&path, None, json!({ "name": "Gina", "email": "Gina@Example.com" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticket"]["payload"]["accountEmail"], "gina@example.com");
    let first = body["registration_id"].as_str().unwrap().to_string();

    let (status, body) = srv.post(&path, None, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticket"]["payload"]["accountName"], "Guest User");

    let (status, body) = srv.post(&path, None, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "event_full");

    // Guests cancel with the id alone, which frees the seat.
    let (status, _) = srv.delete(&format!("/registrations/{first}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = srv.post(&path, None, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = srv
        .get(&format!("/company/events/{event_id}/registrations"), Some(&company))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = srv.get("/company/dashboard", Some(&company)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_registrations"], 2);
}

#[tokio::test]
async fn malformed_ticket_and_ids_are_bad_requests() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/tickets/verify?data=%25%25%25", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "malformed_payload");

    let (status, body) = srv.get("/events/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn admin_surfaces_are_admin_only() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let company = srv.approved_company(&admin, "org@example.com").await;
    srv.public_account("pat@example.com").await;

    let (status, _) = srv.get("/admin/dashboard", Some(&company)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv.get("/admin/accounts?role=company", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = srv.get("/admin/dashboard", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["companies"], 1);
    assert_eq!(body["public_accounts"], 1);
    assert_eq!(body["pending_companies"], 0);
}

#[tokio::test]
async fn suspending_a_company_stops_its_open_session() {
    let srv = TestServer::spawn().await;
    let admin = srv.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let company = srv.approved_company(&admin, "org@example.com").await;

    let (status, me) = srv.get("/me", Some(&company)).await;
    assert_eq!(status, StatusCode::OK);
    let account_id = me["id"].as_str().unwrap().to_string();

    let (status, _) = srv
        .post(
            &format!("/admin/accounts/{account_id}/approval"),
            Some(&admin),
            json!({ "status": "suspended" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = srv
        .post("/company/events", Some(&company), event_body("Late Show", 10))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "pending_approval");
}
