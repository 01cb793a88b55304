//! Shared helpers for the HTTP integration tests
//!
//! Every test gets a fresh server over the in-memory store and identity
//! provider, with a bootstrap administrator already signed in.

#![allow(dead_code)]

use axum_test::TestServer;
use backoffice::config::{AppConfig, BootstrapAdmin};
use backoffice::server::{ServerBuilder, ServerHost};
use serde_json::{Value, json};
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@empresa.com";
pub const ADMIN_PASSWORD: &str = "admin-pass-123";
pub const PASSWORD: &str = "s3cret-pass";

pub struct TestApp {
    pub server: TestServer,
    pub host: Arc<ServerHost>,
    pub admin_token: String,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(AppConfig::default_config()).await
}

pub async fn spawn_app_with(config: AppConfig) -> TestApp {
    let (host, router) = ServerBuilder::new()
        .with_config(config)
        .register_all()
        .build_with_host()
        .expect("Failed to build app");

    host.seed_admin(&BootstrapAdmin {
        name: "Administrador".to_string(),
        email: ADMIN_EMAIL.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    })
    .await
    .expect("Failed to seed admin");

    let server = TestServer::new(router).expect("Failed to create test server");
    let admin_token = login(&server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    TestApp {
        server,
        host,
        admin_token,
    }
}

pub async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["token"]
        .as_str()
        .expect("login returns a token")
        .to_string()
}

impl TestApp {
    /// Create a user through the API and sign it in
    pub async fn user_token(&self, name: &str, role: &str) -> String {
        let email = format!("{}@empresa.com", name.to_lowercase().replace(' ', "."));
        let response = self
            .server
            .post("/users")
            .authorization_bearer(&self.admin_token)
            .json(&json!({
                "name": name,
                "email": email,
                "password": PASSWORD,
                "role": role
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        login(&self.server, &email, PASSWORD).await
    }

    /// Create a record as administrator and return its JSON
    pub async fn create(&self, plural: &str, payload: Value) -> Value {
        let response = self
            .server
            .post(&format!("/{plural}"))
            .authorization_bearer(&self.admin_token)
            .json(&payload)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }
}

pub fn client_payload(name: &str, document: &str, city: &str) -> Value {
    let person_type = if document.chars().filter(char::is_ascii_digit).count() == 14 {
        "company"
    } else {
        "individual"
    };
    json!({
        "name": name,
        "person_type": person_type,
        "document": document,
        "email": format!("{}@exemplo.com", name.to_lowercase().replace(' ', ".")),
        "phone": "(11) 98765-4321",
        "zip_code": "01310-100",
        "address": "Av. Paulista, 1000",
        "city": city,
        "state": "SP"
    })
}

pub fn product_payload(name: &str, code: &str, price: f64) -> Value {
    json!({
        "name": name,
        "code": code,
        "unit": "un",
        "price": price,
        "stock": 10
    })
}

pub fn id_of(record: &Value) -> String {
    record["id"].as_str().expect("record has an id").to_string()
}
