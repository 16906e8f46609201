//! Admin salon management and salon self-service.

use reqwest::StatusCode;
use serde_json::json;

use style_preview_integration_tests::{TestApp, json_body, png_form};

#[tokio::test]
async fn test_admin_creates_and_lists_salons() {
    let app = TestApp::spawn().await;
    let admin = app.admin_client().await;

    let resp = admin
        .post(app.url("/api/salons"))
        .json(&json!({
            "name": "North Cuts",
            "slug": "north-cuts",
            "status": "active",
            "type": "barbershop",
            "services": "male",
            "credits": 10,
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    assert_eq!(created["salon"]["credits"], 10);

    let list = json_body(
        admin
            .get(app.url("/api/salons"))
            .send()
            .await
            .expect("request failed"),
    )
    .await;
    let salons = list["salons"].as_array().expect("salons array");
    assert_eq!(salons.len(), 1);
    assert_eq!(salons.first().map(|s| &s["slug"]), Some(&json!("north-cuts")));
}

#[tokio::test]
async fn test_admin_create_validation() {
    let app = TestApp::spawn().await;
    let admin = app.admin_client().await;

    let missing = admin
        .post(app.url("/api/salons"))
        .json(&json!({ "name": "Half" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(missing).await["message"], "Missing required fields");

    let bad_type = admin
        .post(app.url("/api/salons"))
        .json(&json!({
            "name": "Odd",
            "slug": "odd",
            "status": "active",
            "type": "spa",
            "services": "both",
        }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(bad_type.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(bad_type).await["message"], "Invalid salon type");
}

#[tokio::test]
async fn test_salon_routes_reject_wrong_role() {
    let app = TestApp::spawn().await;
    let operator = app.salon_client("corner", "barbershop").await;
    let admin = app.admin_client().await;

    let resp = operator
        .get(app.url("/api/salons"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = admin
        .get(app.url("/api/salon"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let anonymous = TestApp::client()
        .get(app.url("/api/salons"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_show_by_slug_scoping() {
    let app = TestApp::spawn().await;
    let alpha = app.salon_client("alpha", "hairsalon").await;
    app.salon_client("beta", "hairsalon").await;

    let own = alpha
        .get(app.url("/api/salons/slug/alpha"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(own.status(), StatusCode::OK);

    let other = alpha
        .get(app.url("/api/salons/slug/beta"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(other.status(), StatusCode::FORBIDDEN);

    let admin = app.admin_client().await;
    let resp = admin
        .get(app.url("/api/salons/slug/beta"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_update_sets_credits_and_fields() {
    let app = TestApp::spawn().await;
    let client = app.salon_client("refill", "barbershop").await;
    let id = app.own_salon(&client).await["id"]
        .as_str()
        .expect("salon id")
        .to_owned();
    let admin = app.admin_client().await;

    let resp = app
        .admin_update_salon(&admin, &id, json!({ "name": "Refilled", "credits": 7 }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(updated["salon"]["name"], "Refilled");
    assert_eq!(updated["salon"]["credits"], 7);

    let own = app.own_salon(&client).await;
    assert_eq!(own["credits"], 7);
    assert_eq!(own["name"], "Refilled");

    let resp = app
        .admin_update_salon(&admin, &id, json!({ "credits": -3 }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.own_salon(&client).await["credits"], 7);
}

#[tokio::test]
async fn test_admin_delete_salon() {
    let app = TestApp::spawn().await;
    let operator = app.salon_client("gone", "barbershop").await;
    let salon_id = app.own_salon(&operator).await["id"]
        .as_str()
        .expect("salon id")
        .to_owned();
    let admin = app.admin_client().await;

    let resp = admin
        .delete(app.url(&format!("/api/salons/{salon_id}")))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = admin
        .get(app.url(&format!("/api/salons/{salon_id}")))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = admin
        .get(app.url("/api/salons/not-a-uuid"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hairstyle_library() {
    let app = TestApp::spawn().await;
    let client = app.salon_client("library", "hairsalon").await;

    let style_id = app.add_hairstyle(&client, "Bob").await;
    let salon = app.own_salon(&client).await;
    assert_eq!(salon["hairStyles"][0]["name"], "Bob");

    let no_name = client
        .post(app.url("/api/salon/hairstyles"))
        .multipart(png_form("image"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(no_name.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .delete(app.url(&format!("/api/salon/hairstyles/{style_id}")))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let again = client
        .delete(app.url(&format!("/api/salon/hairstyles/{style_id}")))
        .send()
        .await
        .expect("request failed");
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_settings() {
    let app = TestApp::spawn().await;
    let client = app.salon_client("settings", "barbershop").await;

    let resp = client
        .patch(app.url("/api/salon/settings"))
        .json(&json!({ "services": "female" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["salon"]["services"], "female");

    let bad = client
        .patch(app.url("/api/salon/settings"))
        .json(&json!({ "services": "kids" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let live = client
        .get(app.url("/health"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(live.text().await.expect("body"), "ok");

    let ready = client
        .get(app.url("/health/ready"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(ready.status(), StatusCode::OK);
}
