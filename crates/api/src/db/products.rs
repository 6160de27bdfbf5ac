//! Product repository.
//!
//! Vendor writes always carry the vendor ID in the statement, so a vendor
//! can never touch another vendor's rows. The public listing only shows
//! active products of approved vendors; products are soft-deleted because
//! order items reference them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use attara_core::{CategoryId, PageParams, Paginated, ProductId, VariantId, VendorId};

use super::RepositoryError;
use crate::models::product::{Product, ProductVariant};

const PRODUCT_COLUMNS: &str = "id, vendor_id, category_id, name, description, price, stock, \
     is_active, flash_sale_percent, flash_sale_ends_at, created_at, updated_at";

const VARIANT_COLUMNS: &str = "id, product_id, name, price, stock, is_active, created_at";

/// Field values for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
}

/// Field values for creating a variant.
#[derive(Debug, Clone)]
pub struct VariantFields {
    pub name: String,
    pub price: Option<Decimal>,
    pub stock: i32,
}

/// Typed filter for the public product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub vendor_id: Option<VendorId>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

fn validate(fields: &ProductFields) -> Result<(), RepositoryError> {
    if fields.name.trim().is_empty() {
        return Err(RepositoryError::Invalid(
            "product name must not be empty".to_owned(),
        ));
    }
    if fields.price <= Decimal::ZERO {
        return Err(RepositoryError::Invalid(
            "price must be positive".to_owned(),
        ));
    }
    if fields.stock < 0 {
        return Err(RepositoryError::Invalid(
            "stock must not be negative".to_owned(),
        ));
    }
    Ok(())
}

/// Repository for products and variants.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product for a vendor.
    ///
    /// # Errors
    ///
    /// - `Invalid` for an empty name, non-positive price, or negative stock.
    /// - `NotFound` if the category doesn't exist or is inactive.
    pub async fn create(
        &self,
        vendor_id: VendorId,
        fields: &ProductFields,
    ) -> Result<Product, RepositoryError> {
        validate(fields)?;

        let category_active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM categories WHERE id = $1")
                .bind(fields.category_id)
                .fetch_optional(self.pool)
                .await?;
        if category_active != Some(true) {
            return Err(RepositoryError::NotFound);
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (vendor_id, category_id, name, description, price, stock)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(vendor_id)
        .bind(fields.category_id)
        .bind(fields.name.trim())
        .bind(&fields.description)
        .bind(fields.price)
        .bind(fields.stock)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Update a vendor's product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't belong to
    /// this vendor.
    pub async fn update(
        &self,
        id: ProductId,
        vendor_id: VendorId,
        fields: &ProductFields,
    ) -> Result<Product, RepositoryError> {
        validate(fields)?;

        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET
                 category_id = $1, name = $2, description = $3, price = $4, stock = $5,
                 updated_at = now()
             WHERE id = $6 AND vendor_id = $7
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(fields.category_id)
        .bind(fields.name.trim())
        .bind(&fields.description)
        .bind(fields.price)
        .bind(fields.stock)
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete a vendor's product. Order items keep their snapshot, so
    /// the row stays; it just disappears from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't belong to
    /// this vendor.
    pub async fn soft_delete(
        &self,
        id: ProductId,
        vendor_id: VendorId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET is_active = FALSE, updated_at = now()
             WHERE id = $1 AND vendor_id = $2",
        )
        .bind(id)
        .bind(vendor_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Force-set a product's active flag, ignoring ownership. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_active(
        &self,
        id: ProductId,
        is_active: bool,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET is_active = $1, updated_at = now()
             WHERE id = $2
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(is_active)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Add a variant to a vendor's product.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the product doesn't belong to this vendor.
    /// - `Invalid` for an empty name, non-positive price, or negative stock.
    /// - `Conflict` if the variant name is taken on this product.
    pub async fn add_variant(
        &self,
        product_id: ProductId,
        vendor_id: VendorId,
        fields: &VariantFields,
    ) -> Result<ProductVariant, RepositoryError> {
        if fields.name.trim().is_empty() {
            return Err(RepositoryError::Invalid(
                "variant name must not be empty".to_owned(),
            ));
        }
        if fields.price.is_some_and(|p| p <= Decimal::ZERO) {
            return Err(RepositoryError::Invalid(
                "price must be positive".to_owned(),
            ));
        }
        if fields.stock < 0 {
            return Err(RepositoryError::Invalid(
                "stock must not be negative".to_owned(),
            ));
        }

        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1 AND vendor_id = $2)",
        )
        .bind(product_id)
        .bind(vendor_id)
        .fetch_one(self.pool)
        .await?;
        if !owned {
            return Err(RepositoryError::NotFound);
        }

        let variant = sqlx::query_as::<_, ProductVariant>(&format!(
            "INSERT INTO product_variants (product_id, name, price, stock)
             VALUES ($1, $2, $3, $4)
             RETURNING {VARIANT_COLUMNS}"
        ))
        .bind(product_id)
        .bind(fields.name.trim())
        .bind(fields.price)
        .bind(fields.stock)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "variant name already exists"))?;

        Ok(variant)
    }

    /// Variants of a product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variants(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductVariant>, RepositoryError> {
        let variants = sqlx::query_as::<_, ProductVariant>(&format!(
            "SELECT {VARIANT_COLUMNS} FROM product_variants
             WHERE product_id = $1
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(variants)
    }

    /// Deactivate a vendor's variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant doesn't belong to
    /// one of this vendor's products.
    pub async fn remove_variant(
        &self,
        variant_id: VariantId,
        vendor_id: VendorId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE product_variants v SET is_active = FALSE
             FROM products p
             WHERE v.id = $1 AND v.product_id = p.id AND p.vendor_id = $2",
        )
        .bind(variant_id)
        .bind(vendor_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Start a flash sale on a vendor's product.
    ///
    /// # Errors
    ///
    /// - `Invalid` for a percent outside 1-90 or a non-future end date.
    /// - `NotFound` if the product doesn't belong to this vendor.
    pub async fn set_flash_sale(
        &self,
        id: ProductId,
        vendor_id: VendorId,
        percent: i32,
        ends_at: DateTime<Utc>,
    ) -> Result<Product, RepositoryError> {
        if !(1..=90).contains(&percent) {
            return Err(RepositoryError::Invalid(
                "flash sale percent must be between 1 and 90".to_owned(),
            ));
        }
        if ends_at <= Utc::now() {
            return Err(RepositoryError::Invalid(
                "flash sale end date must be in the future".to_owned(),
            ));
        }

        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET flash_sale_percent = $1, flash_sale_ends_at = $2,
                 updated_at = now()
             WHERE id = $3 AND vendor_id = $4
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(percent)
        .bind(ends_at)
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Clear a flash sale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't belong to
    /// this vendor.
    pub async fn clear_flash_sale(
        &self,
        id: ProductId,
        vendor_id: VendorId,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET flash_sale_percent = NULL, flash_sale_ends_at = NULL,
                 updated_at = now()
             WHERE id = $1 AND vendor_id = $2
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Fetch a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Public catalog listing: active products of approved vendors, newest
    /// first, filtered by the typed `ProductFilter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_public(
        &self,
        filter: &ProductFilter,
        page: PageParams,
    ) -> Result<Paginated<Product>, RepositoryError> {
        let base = "FROM products p
             JOIN vendors ven ON ven.id = p.vendor_id
             WHERE p.is_active AND ven.status = 'approved'";

        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) {base}"));
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} {base}",
            qualified_product_columns()
        ));

        for qb in [&mut count, &mut query] {
            if let Some(category_id) = filter.category_id {
                qb.push(" AND p.category_id = ").push_bind(category_id);
            }
            if let Some(vendor_id) = filter.vendor_id {
                qb.push(" AND p.vendor_id = ").push_bind(vendor_id);
            }
            if let Some(search) = &filter.search {
                qb.push(" AND (p.name ILIKE ")
                    .push_bind(format!("%{search}%"))
                    .push(" OR p.description ILIKE ")
                    .push_bind(format!("%{search}%"))
                    .push(")");
            }
            if let Some(min_price) = filter.min_price {
                qb.push(" AND p.price >= ").push_bind(min_price);
            }
            if let Some(max_price) = filter.max_price {
                qb.push(" AND p.price <= ").push_bind(max_price);
            }
        }

        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        query.push(" ORDER BY p.created_at DESC LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let products = query
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;

        Ok(Paginated::new(products, total, page))
    }

    /// A vendor's own products, newest first, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_vendor(
        &self,
        vendor_id: VendorId,
        page: PageParams,
    ) -> Result<Paginated<Product>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE vendor_id = $1")
            .bind(vendor_id)
            .fetch_one(self.pool)
            .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE vendor_id = $1
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(vendor_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Paginated::new(products, total, page))
    }

    /// Admin listing: every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self, page: PageParams) -> Result<Paginated<Product>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Paginated::new(products, total, page))
    }
}

/// `PRODUCT_COLUMNS` qualified with the `p.` alias for joined queries.
fn qualified_product_columns() -> String {
    PRODUCT_COLUMNS
        .split(", ")
        .map(|col| format!("p.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
