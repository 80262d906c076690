//! Product CRUD, ownership checks, and the public catalogue.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use artisan_collective_core::ProductId;
use artisan_collective_integration_tests::{TestApp, json_body};

const NOT_OWNED: &str = "Product not found or you do not have permission to modify it.";

async fn add_product(app: &TestApp, cookie: &str, name: &str, price: &str) -> StatusCode {
    app.post_multipart(
        "/api/products",
        &[("name", name), ("description", "Hand made"), ("price", price)],
        &[],
        Some(cookie),
    )
    .await
    .status()
}

async fn first_product_id(app: &TestApp, cookie: &str) -> String {
    let body = json_body(app.get("/api/my-products", Some(cookie)).await).await;
    body.as_array().unwrap()[0]["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_add_product_requires_auth() {
    let app = TestApp::new();

    let response = app
        .post_multipart(
            "/api/products",
            &[("name", "Mug"), ("price", "9.99")],
            &[],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_and_list_product() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    let response = app
        .post_multipart(
            "/api/products",
            &[
                ("name", "Mug"),
                ("description", "A hand-thrown clay mug"),
                ("price", "9.99"),
            ],
            &[("productImages", "mug.png", "image/png", b"pngbytes")],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Product uploaded!");

    let body = json_body(app.get("/api/my-products", Some(&cookie)).await).await;
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Mug");
    assert_eq!(products[0]["price"], 9.99);
    assert_eq!(products[0]["imageIds"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_name_is_not_required() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    // Only the price is validated; a product without a name is stored
    // with an empty one
    let response = app
        .post_multipart("/api/products", &[("price", "9.99")], &[], Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(app.get("/api/my-products", Some(&cookie)).await).await;
    assert_eq!(body.as_array().unwrap()[0]["name"], "");
}

#[tokio::test]
async fn test_invalid_price_is_rejected() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    for bad in ["abc", "", "-5", "inf"] {
        let response = app
            .post_multipart(
                "/api/products",
                &[("name", "Mug"), ("price", bad)],
                &[],
                Some(&cookie),
            )
            .await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "price {bad:?} should be rejected"
        );
        let body = json_body(response).await;
        assert_eq!(body["message"], "Invalid price.");
    }
}

#[tokio::test]
async fn test_catalogue_is_enriched_with_owner_details() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    app.post_json(
        "/api/profile",
        &json!({
            "fullname": "Alice A",
            "shopname": "Clayworks",
            "contactNumber": "555-0101"
        }),
        Some(&cookie),
    )
    .await;
    add_product(&app, &cookie, "Mug", "9.99").await;

    let body = json_body(app.get("/api/products", None).await).await;
    let listings = body.as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["name"], "Mug");
    assert_eq!(listings[0]["shopname"], "Clayworks");
    assert_eq!(listings[0]["contactNumber"], "555-0101");

    // Enrichment reads the owner at request time, so a later profile
    // change shows up immediately
    app.post_json(
        "/api/profile",
        &json!({
            "fullname": "Alice A",
            "shopname": "Alice's Kiln",
            "contactNumber": "555-0102"
        }),
        Some(&cookie),
    )
    .await;

    let body = json_body(app.get("/api/products", None).await).await;
    assert_eq!(body.as_array().unwrap()[0]["shopname"], "Alice's Kiln");
}

#[tokio::test]
async fn test_ownership_isolation() {
    let app = TestApp::new();
    let alice = app.signup_and_login("alice", "pw123", "Alice A").await;
    let bob = app.signup_and_login("bob", "pw456", "Bob B").await;

    add_product(&app, &alice, "Mug", "9.99").await;
    let product_id = first_product_id(&app, &alice).await;

    // Bob's listing does not contain Alice's product
    let body = json_body(app.get("/api/my-products", Some(&bob)).await).await;
    assert!(body.as_array().unwrap().is_empty());

    // Bob cannot modify or delete it; absent and not-owned look alike
    let response = app
        .put_multipart(
            &format!("/api/products/{product_id}"),
            &[("name", "Stolen Mug"), ("price", "0.01")],
            &[],
            &bob,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["message"], NOT_OWNED);

    let response = app
        .delete(&format!("/api/products/{product_id}"), &bob)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Alice's product is untouched
    let body = json_body(app.get("/api/my-products", Some(&alice)).await).await;
    assert_eq!(body.as_array().unwrap()[0]["name"], "Mug");
}

#[tokio::test]
async fn test_update_without_images_keeps_existing_set() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    app.post_multipart(
        "/api/products",
        &[("name", "Mug"), ("price", "9.99")],
        &[("productImages", "mug.png", "image/png", b"pngbytes")],
        Some(&cookie),
    )
    .await;
    let product_id = first_product_id(&app, &cookie).await;

    let response = app
        .put_multipart(
            &format!("/api/products/{product_id}"),
            &[("name", "Large Mug"), ("description", "Bigger"), ("price", "12.50")],
            &[],
            &cookie,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Product updated successfully.");

    let body = json_body(app.get("/api/my-products", Some(&cookie)).await).await;
    let product = &body.as_array().unwrap()[0];
    assert_eq!(product["name"], "Large Mug");
    assert_eq!(product["price"], 12.5);
    assert_eq!(product["imageIds"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_product() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    add_product(&app, &cookie, "Mug", "9.99").await;
    let product_id = first_product_id(&app, &cookie).await;

    let response = app
        .delete(&format!("/api/products/{product_id}"), &cookie)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Product deleted successfully.");

    let body = json_body(app.get("/api/my-products", Some(&cookie)).await).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_modify_unknown_product() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    let absent = ProductId::new();
    let response = app
        .delete(&format!("/api/products/{absent}"), &cookie)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A malformed ID is indistinguishable from an absent one
    let response = app.delete("/api/products/not-an-id", &cookie).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_artisan_page_includes_products() {
    let app = TestApp::new();
    let cookie = app.signup_and_login("alice", "pw123", "Alice A").await;

    app.post_json(
        "/api/profile",
        &json!({ "fullname": "Alice A", "shopname": "Clayworks" }),
        Some(&cookie),
    )
    .await;
    add_product(&app, &cookie, "Mug", "9.99").await;

    let profile = json_body(app.get("/api/profile", Some(&cookie)).await).await;
    let artisan_id = profile["id"].as_str().unwrap();

    let body = json_body(app.get(&format!("/api/artisan-profile/{artisan_id}"), None).await).await;
    assert_eq!(body["artisan"]["shopname"], "Clayworks");
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Mug");
    assert_eq!(products[0]["shopname"], "Clayworks");
}
