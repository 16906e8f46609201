//! Integration tests for StylePreview.
//!
//! Each test spawns the full router on an ephemeral port, backed by the
//! in-memory stores, the stub AI backend and in-memory sessions, then drives
//! it over real HTTP with a cookie-keeping client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p style-preview-integration-tests
//!
//! # Live tests against a deployed server
//! STYLEPREVIEW_BASE_URL=http://localhost:3000 cargo test -p style-preview-integration-tests -- --ignored
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;

use reqwest::{Client, Response, StatusCode, multipart};
use serde_json::{Value, json};

use style_preview_core::UserRole;
use style_preview_server::build_app;
use style_preview_server::config::GenerationPolicy;
use style_preview_server::middleware::session_layer;
use style_preview_server::provider::Provider;
use style_preview_server::services::auth::AuthService;
use style_preview_server::state::AppState;
use style_preview_server::store::MemoryStore;

pub const ADMIN_EMAIL: &str = "admin@stylepreview.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const PASSWORD: &str = "salon-password";

/// A running server plus direct access to its store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: MemoryStore,
}

impl TestApp {
    /// Spawn with the default generation policy.
    pub async fn spawn() -> Self {
        Self::spawn_with(GenerationPolicy::default()).await
    }

    /// Spawn with a custom generation policy, with one admin account.
    pub async fn spawn_with(policy: GenerationPolicy) -> Self {
        let store = MemoryStore::new();
        AuthService::new(&store, &store)
            .create_user(ADMIN_EMAIL, ADMIN_PASSWORD, "Admin", UserRole::Admin, None)
            .await
            .expect("Failed to create admin user");

        let state = AppState::in_memory(&store, Provider::stub(), policy);
        let sessions = session_layer(tower_sessions::MemoryStore::default(), false);
        let app = build_app(state, sessions);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self { addr, store }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A fresh client with its own cookie jar.
    #[must_use]
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Sign up a salon operator and return a logged-in client.
    pub async fn salon_client(&self, slug: &str, salon_type: &str) -> Client {
        let client = Self::client();
        let email = format!("owner@{slug}.test");
        let resp = self.signup(&client, &email, slug, salon_type).await;
        assert_eq!(resp.status(), StatusCode::CREATED, "signup failed");
        self.login(&client, &email, PASSWORD).await;
        client
    }

    /// A logged-in admin client.
    pub async fn admin_client(&self) -> Client {
        let client = Self::client();
        self.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        client
    }

    pub async fn signup(
        &self,
        client: &Client,
        email: &str,
        slug: &str,
        salon_type: &str,
    ) -> Response {
        client
            .post(self.url("/api/auth/signup"))
            .json(&json!({
                "email": email,
                "password": PASSWORD,
                "name": "Salon Owner",
                "role": "salon",
                "salonSlug": slug,
                "salonName": format!("Salon {slug}"),
                "salonType": salon_type,
                "salonServices": "both",
            }))
            .send()
            .await
            .expect("Failed to send signup")
    }

    pub async fn login(&self, client: &Client, email: &str, password: &str) {
        let resp = client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to send login");
        assert_eq!(resp.status(), StatusCode::OK, "login failed for {email}");
    }

    /// Upload a small PNG and return its id.
    pub async fn upload_image(&self, client: &Client) -> String {
        let resp = client
            .post(self.url("/api/images"))
            .multipart(png_form("image"))
            .send()
            .await
            .expect("Failed to upload image");
        assert_eq!(resp.status(), StatusCode::OK, "upload failed");
        let body = json_body(resp).await;
        body["image"]["id"]
            .as_str()
            .expect("image id missing")
            .to_owned()
    }

    /// Add a style-library entry and return its id.
    pub async fn add_hairstyle(&self, client: &Client, name: &str) -> String {
        let form = png_form("image").text("name", name.to_owned());
        let resp = client
            .post(self.url("/api/salon/hairstyles"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to add hairstyle");
        assert_eq!(resp.status(), StatusCode::OK, "hairstyle upload failed");
        let body = json_body(resp).await;
        body["hairStyle"]["id"]
            .as_str()
            .expect("hairstyle id missing")
            .to_owned()
    }

    /// The caller's salon as JSON.
    pub async fn own_salon(&self, client: &Client) -> Value {
        let resp = client
            .get(self.url("/api/salon"))
            .send()
            .await
            .expect("Failed to get salon");
        assert_eq!(resp.status(), StatusCode::OK);
        json_body(resp).await["salon"].clone()
    }

    /// Patch a salon through the admin API.
    pub async fn admin_update_salon(&self, admin: &Client, salon_id: &str, patch: Value) -> Response {
        admin
            .patch(self.url(&format!("/api/salons/{salon_id}")))
            .json(&patch)
            .send()
            .await
            .expect("Failed to update salon")
    }

    /// Set a salon's credit balance through the admin API.
    pub async fn set_credits(&self, salon_id: &str, credits: i64) {
        let admin = self.admin_client().await;
        let resp = self
            .admin_update_salon(&admin, salon_id, json!({ "credits": credits }))
            .await;
        assert_eq!(resp.status(), StatusCode::OK, "credit update failed");
    }

    pub async fn generate(&self, client: &Client, body: &Value) -> Response {
        client
            .post(self.url("/api/generations"))
            .json(body)
            .send()
            .await
            .expect("Failed to send generation")
    }
}

/// A one-file multipart form carrying a tiny PNG under `field`.
#[must_use]
pub fn png_form(field: &str) -> multipart::Form {
    let part = multipart::Part::bytes(PNG_BYTES.to_vec())
        .file_name("photo.png")
        .mime_str("image/png")
        .expect("valid mime");
    multipart::Form::new().part(field.to_owned(), part)
}

pub async fn json_body(resp: Response) -> Value {
    resp.json().await.expect("Failed to parse JSON body")
}

/// PNG signature plus an IHDR chunk header.
const PNG_BYTES: [u8; 16] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];
