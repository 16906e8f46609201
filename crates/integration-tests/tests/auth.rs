//! Signup, login, session and account flows.

use reqwest::StatusCode;
use serde_json::json;

use style_preview_integration_tests::{PASSWORD, TestApp, json_body};

#[tokio::test]
async fn test_signup_creates_salon_with_starting_credits() {
    let app = TestApp::spawn().await;
    let client = app.salon_client("fade-house", "barbershop").await;

    let salon = app.own_salon(&client).await;
    assert_eq!(salon["slug"], "fade-house");
    assert_eq!(salon["type"], "barbershop");
    assert_eq!(salon["status"], "active");
    assert_eq!(salon["credits"], 50);
}

#[tokio::test]
async fn test_signup_rejects_admin_role() {
    let app = TestApp::spawn().await;
    let resp = TestApp::client()
        .post(app.url("/api/auth/signup"))
        .json(&json!({
            "email": "sneaky@example.com",
            "password": PASSWORD,
            "name": "Sneaky",
            "role": "admin",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_signup_duplicate_email_and_slug() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let first = app.signup(&client, "a@one.test", "one", "hairsalon").await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let same_email = app.signup(&client, "a@one.test", "two", "hairsalon").await;
    assert_eq!(same_email.status(), StatusCode::BAD_REQUEST);
    let body = json_body(same_email).await;
    assert_eq!(body["message"], "User with this email already exists");

    let same_slug = app.signup(&client, "b@two.test", "one", "hairsalon").await;
    assert_eq!(same_slug.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_missing_fields() {
    let app = TestApp::spawn().await;
    let resp = TestApp::client()
        .post(app.url("/api/auth/signup"))
        .json(&json!({ "email": "x@example.com" }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    app.signup(&client, "owner@cuts.test", "cuts", "barbershop")
        .await;

    let resp = client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "owner@cuts.test", "password": "nope-nope" }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_session_roundtrip_and_logout() {
    let app = TestApp::spawn().await;
    let client = app.salon_client("glow", "hairsalon").await;

    let session = json_body(
        client
            .get(app.url("/api/auth/session"))
            .send()
            .await
            .expect("request failed"),
    )
    .await;
    assert_eq!(session["user"]["email"], "owner@glow.test");
    assert_eq!(session["user"]["role"], "salon");
    assert_eq!(session["user"]["salonSlug"], "glow");

    let resp = client
        .post(app.url("/api/auth/logout"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let session = json_body(
        client
            .get(app.url("/api/auth/session"))
            .send()
            .await
            .expect("request failed"),
    )
    .await;
    assert!(session["user"].is_null());

    let resp = client
        .get(app.url("/api/salon"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_refreshes_session() {
    let app = TestApp::spawn().await;
    let client = app.salon_client("trim", "barbershop").await;

    let resp = client
        .patch(app.url("/api/user/profile"))
        .json(&json!({ "name": "New Name", "email": "new@trim.test" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["user"]["name"], "New Name");

    let session = json_body(
        client
            .get(app.url("/api/auth/session"))
            .send()
            .await
            .expect("request failed"),
    )
    .await;
    assert_eq!(session["user"]["email"], "new@trim.test");
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::spawn().await;
    let client = app.salon_client("shear", "hairsalon").await;

    let wrong = client
        .patch(app.url("/api/user/password"))
        .json(&json!({ "currentPassword": "wrong-one", "newPassword": "brand-new" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);

    let ok = client
        .patch(app.url("/api/user/password"))
        .json(&json!({ "currentPassword": PASSWORD, "newPassword": "brand-new" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(ok.status(), StatusCode::OK);

    let fresh = TestApp::client();
    app.login(&fresh, "owner@shear.test", "brand-new").await;
}
