use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use storefront_api::{
    db::{OrmConn, create_orm_conn, run_migrations},
    entity::{
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")?;
    let orm = create_orm_conn(&database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "Admin", "admin@example.com", "admin123", true).await?;
    let user_id = ensure_user(&orm, "Shopper", "user@example.com", "user123", false).await?;
    seed_products(&orm).await?;

    tracing::info!(%admin_id, %user_id, "seed completed");
    Ok(())
}

async fn ensure_user(
    orm: &OrmConn,
    name: &str,
    email: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        let id = existing.id;
        let mut active: UserActive = existing.into();
        active.is_admin = Set(is_admin);
        active.update(orm).await?;
        return Ok(id);
    }

    let password_hash = hash_password(password)?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        is_admin: Set(is_admin),
        mobile: Set(None),
        street: Set(None),
        city: Set(None),
        state: Set(None),
        zip_code: Set(None),
        country: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    tracing::info!(email, is_admin, "ensured user");
    Ok(user.id)
}

async fn seed_products(orm: &OrmConn) -> anyhow::Result<()> {
    let products = [
        ("Canvas Tote", 18.5, "Sturdy cotton tote bag", "Accessories", 40, "https://picsum.photos/seed/tote/400"),
        ("Ceramic Mug", 12.0, "350ml stoneware mug", "Kitchen", 100, "https://picsum.photos/seed/mug/400"),
        ("Desk Lamp", 39.99, "Adjustable LED desk lamp", "Home", 25, "https://picsum.photos/seed/lamp/400"),
        ("Notebook Set", 9.75, "Three dotted A5 notebooks", "Stationery", 200, "https://picsum.photos/seed/notebook/400"),
    ];

    for (name, price, description, category, stock, image) in products {
        let exists = Products::find()
            .filter(ProdCol::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            price: Set(price),
            description: Set(description.to_string()),
            category: Set(category.to_string()),
            stock: Set(stock),
            image: Set(image.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
    }

    tracing::info!("seeded products");
    Ok(())
}
