use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use pawnhub_api::{AppStateInner, router};
use pawnhub_db::Database;
use pawnhub_services::MergePolicy;

fn app() -> Router {
    let db = Arc::new(Database::open_in_memory().unwrap());
    router(AppStateInner::new(
        db.clone(),
        db,
        MergePolicy::SkipBlank,
        "test_secret".to_string(),
    ))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    // Extractor rejections answer with plain text
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, email: &str, role: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "Test User",
            "email": email,
            "password": "securepassword123",
            "role": role
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    (body["token"].as_str().unwrap().to_string(), body["user"].clone())
}

fn pawn_shop(name: &str, lat: f64, lng: f64) -> Value {
    json!({
        "name": name,
        "location": { "address": "1 Main St", "lat": lat, "lng": lng },
        "contact": { "phone": "555-1111" }
    })
}

// ==================== Auth ====================

#[tokio::test]
async fn test_register_login_and_me() {
    let app = app();
    let (token, user) = register(&app, "Owner@Example.com", "store_owner").await;
    assert_eq!(user["email"], "owner@example.com");
    assert_eq!(user["role"], "store_owner");
    assert!(user["password"].is_null());

    let (status, me) = send(&app, Method::GET, "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user["id"]);

    let (status, _) = send(&app, Method::GET, "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "owner@example.com", "password": "securepassword123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "owner@example.com", "password": "wrongpassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = app();
    register(&app, "jane@example.com", "customer").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "Jane Again",
            "email": "JANE@example.com",
            "password": "securepassword123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/stores",
        Some("not-a-jwt"),
        Some(pawn_shop("Test Pawn", 25.0, -80.0)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ==================== Stores & products ====================

#[tokio::test]
async fn test_owner_manages_store_and_products() {
    let app = app();
    let (owner, _) = register(&app, "owner@example.com", "store_owner").await;
    let (customer, _) = register(&app, "customer@example.com", "customer").await;

    let (status, store) = send(
        &app,
        Method::POST,
        "/stores",
        Some(&owner),
        Some(pawn_shop("Test Pawn", 25.0, -80.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let store_id = store["id"].as_str().unwrap().to_string();

    let (_, me) = send(&app, Method::GET, "/me", Some(&owner), None).await;
    assert_eq!(me["storeId"], store_id.as_str());

    // Partial update keeps the address
    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/stores/{}", store_id),
        Some(&owner),
        Some(json!({ "name": "Test Pawn 2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Test Pawn 2");
    assert_eq!(updated["location"]["address"], "1 Main St");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/stores/{}", store_id),
        Some(&customer),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, product) = send(
        &app,
        Method::POST,
        "/products",
        Some(&owner),
        Some(json!({
            "storeId": store_id,
            "name": "Fender Stratocaster",
            "category": "musical_instruments",
            "condition": "good",
            "price": 650.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_str().unwrap().to_string();
    assert_eq!(product["createdAt"], product["updatedAt"]);

    let (_, listed) = send(
        &app,
        Method::GET,
        &format!("/stores/{}/products", store_id),
        None,
        None,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, by_category) =
        send(&app, Method::GET, "/products?category=watches", None, None).await;
    assert!(by_category.as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::GET, "/products?category=spaceships", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/products/{}", product_id),
        Some(&owner),
        Some(json!({ "price": 0, "condition": "fair" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 650.0);
    assert_eq!(updated["condition"], "fair");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/stores/{}", store_id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/products/{}", product_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_cannot_create_store() {
    let app = app();
    let (customer, _) = register(&app, "customer@example.com", "customer").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/stores",
        Some(&customer),
        Some(pawn_shop("Test Pawn", 25.0, -80.0)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_owner_second_store_conflicts() {
    let app = app();
    let (owner, _) = register(&app, "owner@example.com", "store_owner").await;

    let (status, first) = send(
        &app,
        Method::POST,
        "/stores",
        Some(&owner),
        Some(pawn_shop("First Pawn", 25.0, -80.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let first_id = first["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/stores",
        Some(&owner),
        Some(pawn_shop("Second Pawn", 26.0, -80.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].is_string());

    let (_, all) = send(&app, Method::GET, "/stores", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (_, me) = send(&app, Method::GET, "/me", Some(&owner), None).await;
    assert_eq!(me["storeId"], first_id.as_str());

    // The owner still manages the first store
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/stores/{}", first_id),
        Some(&owner),
        Some(json!({ "name": "First Pawn 2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/stores/{}", first_id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_store_search_and_nearby() {
    let app = app();
    for (email, name, lat, lng) in [
        ("south@example.com", "Cash Inn South", 25.5816, -80.3455),
        ("miami@example.com", "The Pawn Shop Miami", 25.8075, -80.2379),
    ] {
        let (owner, _) = register(&app, email, "store_owner").await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/stores",
            Some(&owner),
            Some(pawn_shop(name, lat, lng)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = send(&app, Method::GET, "/stores", None, None).await;
    assert_eq!(all[0]["name"], "Cash Inn South");
    assert_eq!(all[1]["name"], "The Pawn Shop Miami");

    let (_, found) = send(&app, Method::GET, "/stores?q=miami", None, None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, nearby) = send(
        &app,
        Method::GET,
        "/stores/nearby?lat=25.7617&lng=-80.1918",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nearby[0]["store"]["name"], "The Pawn Shop Miami");
    assert!(nearby[0]["distance"].as_f64().unwrap() < nearby[1]["distance"].as_f64().unwrap());
    assert!(nearby[0]["travelTime"].as_str().unwrap().ends_with("min"));

    let (status, _) = send(&app, Method::GET, "/stores/does-not-exist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ==================== Profile & favorites ====================

#[tokio::test]
async fn test_favorites_require_sign_in() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/me/favorites/store/anything",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Please sign in to add favorites");
}

#[tokio::test]
async fn test_favorite_toggle_and_remove() {
    let app = app();
    let (owner, _) = register(&app, "owner@example.com", "store_owner").await;
    let (customer, _) = register(&app, "customer@example.com", "customer").await;
    let (_, store) = send(
        &app,
        Method::POST,
        "/stores",
        Some(&owner),
        Some(pawn_shop("Test Pawn", 25.0, -80.0)),
    )
    .await;
    let uri = format!("/me/favorites/store/{}", store["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::POST, &uri, Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], true);
    assert_eq!(body["favorites"][0]["type"], "store");
    assert_eq!(body["favorites"][0]["name"], "Test Pawn");

    let (_, listed) = send(&app, Method::GET, "/me/favorites", Some(&customer), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::POST, &uri, Some(&customer), None).await;
    assert_eq!(body["added"], false);
    assert!(body["favorites"].as_array().unwrap().is_empty());

    // Removing something that is not a favorite is a no-op
    let (status, remaining) = send(&app, Method::DELETE, &uri, Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(remaining.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        Method::POST,
        "/me/favorites/product/ghost",
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_patch_merges() {
    let app = app();
    let (token, _) = register(&app, "jane@example.com", "customer").await;

    let (status, user) = send(
        &app,
        Method::PATCH,
        "/me",
        Some(&token),
        Some(json!({ "phone": "555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["phone"], "555-0100");
    assert_eq!(user["name"], "Test User");

    let (status, user) = send(
        &app,
        Method::PATCH,
        "/me",
        Some(&token),
        Some(json!({ "email": " Jane.Doe@Example.com " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "jane.doe@example.com");

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/me",
        Some(&token),
        Some(json!({ "email": "jane-at-example" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/me",
        None,
        Some(json!({ "phone": "555-0199" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
