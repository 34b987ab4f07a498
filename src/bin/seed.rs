use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use storefront_api::{
    catalog::{MongoCatalog, NewProduct},
    config::AppConfig,
    db::{create_mongo_client, create_orm_conn, run_migrations},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    middleware::auth::{ROLE_ADMIN, ROLE_CUSTOMER},
};

// Idempotent seeder: users are keyed on unique email, products on SKU, so
// rerunning it leaves existing data untouched.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "Admin", "admin@example.com", "admin123", ROLE_ADMIN).await?;
    let user_id =
        ensure_user(&orm, "Demo User", "user@example.com", "user123", ROLE_CUSTOMER).await?;

    let mongo = create_mongo_client(&config.mongodb_url).await?;
    let catalog = MongoCatalog::new(&mongo, &config.mongodb_db);
    seed_products(&catalog).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already exists (role={})", existing.role);
        return Ok(existing.id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    println!("Created user {email} (role={role})");
    Ok(user.id)
}

async fn seed_products(catalog: &MongoCatalog) -> anyhow::Result<()> {
    let products = [
        (
            "SKU-001",
            "Wireless Headphones",
            "Comfortable wireless headphones with clear bass.",
            "120",
            "electronics",
            25,
        ),
        (
            "SKU-002",
            "Coffee Mug",
            "Ceramic coffee mug, dishwasher safe.",
            "12",
            "home",
            150,
        ),
        (
            "SKU-003",
            "Running Shoes",
            "Lightweight running shoes for daily training.",
            "85",
            "apparel",
            40,
        ),
        (
            "SKU-004",
            "Mechanical Keyboard",
            "Compact mechanical keyboard with tactile switches.",
            "75",
            "electronics",
            18,
        ),
        (
            "SKU-005",
            "Notebook (A5)",
            "Hardcover A5 notebook with 120 lined pages.",
            "8",
            "stationery",
            200,
        ),
        (
            "SKU-006",
            "Stainless Water Bottle",
            "Insulated 750ml bottle keeps drinks cold for 24h.",
            "22",
            "outdoors",
            60,
        ),
        (
            "SKU-007",
            "Desk Lamp",
            "LED desk lamp with adjustable brightness levels.",
            "35",
            "home",
            45,
        ),
        (
            "SKU-008",
            "Bluetooth Speaker",
            "Portable Bluetooth speaker with 10h battery life.",
            "50",
            "electronics",
            30,
        ),
    ];

    for (sku, name, description, price, category, stock) in products {
        catalog
            .upsert_by_sku(&NewProduct {
                sku: sku.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                price: price.parse::<Decimal>()?,
                category: category.to_string(),
                stock,
            })
            .await?;
        println!("Upserted {sku}");
    }

    println!("Seeded products");
    Ok(())
}
