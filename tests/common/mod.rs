#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{products::ActiveModel as ProductActive, users::ActiveModel as UserActive},
    middleware::auth::AuthUser,
    services::auth_service::hash_password,
    state::AppState,
};
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: TEST_SECRET.into(),
        jwt_ttl_hours: 24,
        cors_origin: None,
    }
}

/// Fresh in-memory database with the full schema applied.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let config = test_config();
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm, config))
}

pub async fn create_user(
    state: &AppState,
    name: &str,
    email: &str,
    is_admin: bool,
) -> anyhow::Result<AuthUser> {
    let password_hash = hash_password("password123")?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        email: Set(email.into()),
        password_hash: Set(password_hash),
        is_admin: Set(is_admin),
        mobile: Set(None),
        street: Set(Some("1 Main St".into())),
        city: Set(Some("Springfield".into())),
        state: Set(None),
        zip_code: Set(None),
        country: Set(Some("US".into())),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        is_admin,
    })
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    price: f64,
    stock: i32,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        price: Set(price),
        description: Set(format!("{name} description")),
        category: Set("General".into()),
        stock: Set(stock),
        image: Set("https://example.com/p.png".into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}
