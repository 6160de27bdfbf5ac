//! Seed the database with demo catalog data.
//!
//! Inserts the base fragrance category tree and a demo vendor with a few
//! products, for local development. Idempotent: existing slugs and emails
//! are skipped.

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("{0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Eau de Parfum", "eau-de-parfum"),
    ("Eau de Toilette", "eau-de-toilette"),
    ("Attar & Oils", "attar-oils"),
    ("Home Fragrance", "home-fragrance"),
];

const PRODUCTS: &[(&str, &str, i64)] = &[
    ("Oud Royale", "eau-de-parfum", 320),
    ("Amber Nights", "eau-de-parfum", 185),
    ("Citrus Veil", "eau-de-toilette", 95),
    ("Rose Taifi Attar", "attar-oils", 240),
];

/// Insert demo categories, a demo vendor and a few products.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    let database_url = super::database_url().map_err(SeedError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    for (name, slug) in CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (name, slug) VALUES ($1, $2)
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(name)
        .bind(slug)
        .execute(&pool)
        .await?;
    }
    tracing::info!("Seeded {} categories", CATEGORIES.len());

    // Demo vendor backed by a throwaway account with an unusable hash.
    let vendor_user: Option<i32> = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, full_name, role)
         VALUES ('vendor@attara.test', '!', 'Demo Vendor', 'vendor')
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .fetch_optional(&pool)
    .await?;

    let Some(user_id) = vendor_user else {
        tracing::info!("Demo vendor already present, skipping");
        return Ok(());
    };

    sqlx::query("INSERT INTO wallets (user_id) VALUES ($1)")
        .bind(user_id)
        .execute(&pool)
        .await?;

    let vendor_id: i32 = sqlx::query_scalar(
        "INSERT INTO vendors (user_id, store_name, description, status)
         VALUES ($1, 'Maison Demo', 'Demo fragrance house', 'approved')
         RETURNING id",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    for (name, category_slug, price) in PRODUCTS {
        sqlx::query(
            "INSERT INTO products (vendor_id, category_id, name, price, stock)
             SELECT $1, id, $2, $3, 50 FROM categories WHERE slug = $4",
        )
        .bind(vendor_id)
        .bind(name)
        .bind(Decimal::from(*price))
        .bind(category_slug)
        .execute(&pool)
        .await?;
    }
    tracing::info!("Seeded {} products for the demo vendor", PRODUCTS.len());

    Ok(())
}
