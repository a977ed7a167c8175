//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with two independent uniqueness checks (code, name)
//! - Supplier expansion for reads
//! - Batch lookup for expanding sale lines
//!
//! Stock is only decremented by the sale processor. A direct edit through
//! [`ProductRepository::update`] may set any non-negative quantity.
//!
//! ## Create Product
//! ```text
//! NewProduct
//!      │ normalize (trim, quantity ≥ 0, costPrice > 0)
//!      ▼
//! code taken? ──yes──► Product with ID "A001" already exists...
//!      │ no
//!      ▼
//! name taken? ──yes──► Product with name "..." already exists...
//!      │ no
//!      ▼
//! supplier exists? ──no──► supplier "..." does not exist
//!      │ yes
//!      ▼
//! INSERT (UNIQUE constraints catch races)
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::supplier::SupplierRepository;
use shopkeep_core::{
    CoreError, NewProduct, Product, ProductPatch, ProductView, Supplier, ValidationError,
};

const SELECT_PRODUCT: &str = r#"
    SELECT id, product_code, name, quantity, cost_price, category, supplier_id,
           created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.create(new_product).await?;
/// let view = repo.get_view(&product.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product with its supplier expanded, in creation order.
    pub async fn list(&self) -> DbResult<Vec<ProductView>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCT} ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        self.expand(products).await
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by ID, failing with `ProductNotFound`.
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Gets a product with its supplier expanded.
    pub async fn get_view(&self, id: &str) -> DbResult<ProductView> {
        let product = self.get(id).await?;
        let supplier = match product.supplier_id.as_deref() {
            Some(supplier_id) => self.suppliers().get_by_id(supplier_id).await?,
            None => None,
        };
        Ok(ProductView { product, supplier })
    }

    /// Loads the given products keyed by ID. Unknown IDs are simply absent.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<HashMap<String, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_PRODUCT);
        query.push(" WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    /// Creates a product.
    ///
    /// ## Errors
    /// - Validation: blank code/name, negative quantity, cost ≤ 0, unknown supplier
    /// - Duplicate: product code or name already used (distinct messages)
    pub async fn create(&self, input: NewProduct) -> DbResult<Product> {
        let input = input.normalize()?;

        debug!(product_code = %input.product_code, name = %input.name, "Creating product");

        if self.field_taken("product_code", &input.product_code).await? {
            return Err(CoreError::duplicate_product_code(input.product_code).into());
        }
        if self.field_taken("name", &input.name).await? {
            return Err(CoreError::duplicate("Product", "name", input.name).into());
        }
        if let Some(supplier_id) = input.supplier.as_deref() {
            self.require_supplier(supplier_id).await?;
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            product_code: input.product_code,
            name: input.name,
            quantity: input.quantity,
            cost_price: input.cost_price,
            category: input.category,
            supplier_id: input.supplier,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, product_code, name, quantity, cost_price, category, supplier_id,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.product_code)
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.cost_price)
        .bind(product.category)
        .bind(&product.supplier_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            unique_to_duplicate(
                e.into(),
                Some(product.product_code.as_str()),
                Some(product.name.as_str()),
            )
        })?;

        info!(id = %product.id, product_code = %product.product_code, "Product created");
        Ok(product)
    }

    /// Writes the fields present in `patch` onto the product with this ID.
    ///
    /// Absent fields keep their stored value, so a concurrent sale's stock
    /// decrement is never overwritten by an edit that does not set `quantity`.
    /// Uniqueness of a changed code or name is enforced by the UNIQUE
    /// constraints and reported as a duplicate.
    pub async fn update(&self, id: &str, patch: ProductPatch) -> DbResult<Product> {
        let patch = patch.normalize()?;
        if let Some(Some(supplier_id)) = patch.supplier.as_ref() {
            self.require_supplier(supplier_id).await?;
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET product_code = COALESCE(?2, product_code),
                name = COALESCE(?3, name),
                quantity = COALESCE(?4, quantity),
                cost_price = COALESCE(?5, cost_price),
                category = COALESCE(?6, category),
                supplier_id = CASE WHEN ?7 THEN ?8 ELSE supplier_id END,
                updated_at = ?9
            WHERE id = ?1
            RETURNING id, product_code, name, quantity, cost_price, category, supplier_id,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.product_code.as_deref())
        .bind(patch.name.as_deref())
        .bind(patch.quantity)
        .bind(patch.cost_price)
        .bind(patch.category)
        .bind(patch.supplier.is_some())
        .bind(patch.supplier.clone().flatten())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            unique_to_duplicate(e.into(), patch.product_code.as_deref(), patch.name.as_deref())
        })?
        .ok_or_else(|| DbError::from(CoreError::ProductNotFound(id.to_string())))?;

        info!(id = %product.id, quantity = product.quantity, "Product updated");
        Ok(product)
    }

    /// Deletes a product. Sales that sold it keep their lines.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Number of products on file.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn suppliers(&self) -> SupplierRepository {
        SupplierRepository::new(self.pool.clone())
    }

    async fn require_supplier(&self, supplier_id: &str) -> DbResult<()> {
        if self.suppliers().exists(supplier_id).await? {
            Ok(())
        } else {
            Err(ValidationError::UnknownReference {
                field: "supplier".to_string(),
                id: supplier_id.to_string(),
            }
            .into())
        }
    }

    async fn field_taken(&self, column: &str, value: &str) -> DbResult<bool> {
        // column is one of our own literals, never user input
        let sql = format!("SELECT 1 FROM products WHERE {column} = ?1");
        let found: Option<i64> = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn expand(&self, products: Vec<Product>) -> DbResult<Vec<ProductView>> {
        let suppliers: HashMap<String, Supplier> = self
            .suppliers()
            .list()
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        Ok(products
            .into_iter()
            .map(|product| {
                let supplier = product
                    .supplier_id
                    .as_ref()
                    .and_then(|id| suppliers.get(id))
                    .cloned();
                ProductView { product, supplier }
            })
            .collect())
    }
}

fn unique_to_duplicate(err: DbError, product_code: Option<&str>, name: Option<&str>) -> DbError {
    match (err.unique_field(), product_code, name) {
        (Some("products.product_code"), Some(code), _) => {
            CoreError::duplicate_product_code(code).into()
        }
        (Some("products.name"), _, Some(name)) => {
            CoreError::duplicate("Product", "name", name).into()
        }
        _ => err,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
