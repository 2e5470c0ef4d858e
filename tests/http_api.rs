mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use storefront_api::{middleware::auth::issue_token, routes::create_app, state::AppState};
use tower::ServiceExt;

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

async fn tokens(state: &AppState) -> anyhow::Result<(String, String)> {
    let admin = common::create_user(state, "Admin", "admin@example.com", true).await?;
    let shopper = common::create_user(state, "Shopper", "shopper@example.com", false).await?;
    Ok((
        issue_token(&state.config, admin.user_id, true)?,
        issue_token(&state.config, shopper.user_id, false)?,
    ))
}

#[tokio::test]
async fn protected_routes_require_a_token() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let app = create_app(state);

    let (status, body) = send(&app, "GET", "/api/cart", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token, authorization denied");

    let (status, body) = send(&app, "GET", "/api/cart", Some("garbage"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is not valid");
    Ok(())
}

#[tokio::test]
async fn admin_routes_reject_shoppers() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (admin, shopper) = tokens(&state).await?;
    let app = create_app(state);
    let product = json!({
        "name": "Monitor",
        "price": 199.5,
        "description": "27 inch",
        "category": "Displays",
        "stock": 4,
        "image": "https://example.com/m.png"
    });

    let (status, _) = send(&app, "POST", "/api/products", Some(&shopper), Some(product.clone())).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", "/api/products", Some(&admin), Some(product)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Monitor");
    assert!(body["data"]["createdAt"].is_string());

    let (status, _) = send(&app, "GET", "/api/orders", Some(&shopper), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/products", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn shopper_places_an_order_over_http() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (admin, shopper) = tokens(&state).await?;
    let product_id = common::create_product(&state, "Cable", 12.25, 9).await?;
    let app = create_app(state);

    let (status, body) = send(
        &app,
        "POST",
        "/api/cart",
        Some(&shopper),
        Some(json!({ "productId": product_id, "quantity": 2 })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["quantity"], 2);

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&shopper),
        Some(json!({ "products": [{ "productId": product_id, "quantity": 4 }] })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["totalAmount"], 49.0);
    assert_eq!(body["data"]["status"], "Pending");
    let order_id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/orders/{order_id}/status"),
        Some(&admin),
        Some(json!({ "status": "Shipped" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Shipped");

    let (status, body) = send(&app, "GET", "/api/orders/myorders", Some(&shopper), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["status"], "Shipped");
    assert_eq!(body["data"][0]["products"][0]["product"]["name"], "Cable");
    Ok(())
}

#[tokio::test]
async fn malformed_input_is_a_bad_request() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let (_, shopper) = tokens(&state).await?;
    let app = create_app(state);

    let (status, _) = send(&app, "GET", "/api/products/not-a-uuid", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/cart",
        Some(&shopper),
        Some(json!({ "quantity": 1 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn register_login_and_profile_over_http() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let app = create_app(state);

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "name": "Gil", "email": "gil@example.com", "password": "pw-123456" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({ "email": "gil@example.com", "password": "pw-123456" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(&app, "GET", "/api/users/profile", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "gil@example.com");
    assert_eq!(body["data"]["isAdmin"], false);
    Ok(())
}

#[tokio::test]
async fn unknown_routes_return_json_404() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let app = create_app(state);

    let (status, body) = send(&app, "GET", "/api/nowhere", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/api/nowhere");

    let (status, body) = send(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "up");
    Ok(())
}
