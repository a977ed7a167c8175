//! # Supplier Repository
//!
//! Database operations for suppliers.
//!
//! Name and contact are each unique. The repository checks both before
//! inserting so the caller gets a message naming the clashing field; the
//! UNIQUE constraints catch anything that races past the check.
//!
//! Deleting a supplier clears `supplier_id` on its products
//! (`ON DELETE SET NULL`).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopkeep_core::{CoreError, NewSupplier, Supplier, SupplierPatch};

const SELECT_SUPPLIER: &str = r#"
    SELECT id, name, contact, address, payment_terms, created_at, updated_at
    FROM suppliers
"#;

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Lists all suppliers in creation order.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "{SELECT_SUPPLIER} ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = suppliers.len(), "Listed suppliers");
        Ok(suppliers)
    }

    /// Gets a supplier by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!("{SELECT_SUPPLIER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    /// Gets a supplier by ID, failing with `SupplierNotFound`.
    pub async fn get(&self, id: &str) -> DbResult<Supplier> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::SupplierNotFound(id.to_string()).into())
    }

    /// Whether a supplier with this ID exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM suppliers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Creates a supplier.
    ///
    /// ## Errors
    /// - Validation: name shorter than 2 or contact shorter than 5 characters
    /// - Duplicate: name or contact already used
    pub async fn create(&self, input: NewSupplier) -> DbResult<Supplier> {
        let input = input.normalize()?;

        debug!(name = %input.name, "Creating supplier");

        if self.field_taken("name", &input.name).await? {
            return Err(CoreError::duplicate("Supplier", "name", input.name).into());
        }
        if self.field_taken("contact", &input.contact).await? {
            return Err(CoreError::duplicate("Supplier", "contact", input.contact).into());
        }

        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            contact: input.contact,
            address: input.address,
            payment_terms: input.payment_terms,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact, address, payment_terms, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.address)
        .bind(&supplier.payment_terms)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_to_duplicate(e.into(), &supplier))?;

        info!(id = %supplier.id, name = %supplier.name, "Supplier created");
        Ok(supplier)
    }

    /// Merges `patch` onto the supplier with this ID.
    pub async fn update(&self, id: &str, patch: SupplierPatch) -> DbResult<Supplier> {
        let patch = patch.normalize()?;
        let existing = self.get(id).await?;
        let supplier = patch.apply(existing, Utc::now());

        sqlx::query(
            r#"
            UPDATE suppliers
            SET name = ?2, contact = ?3, address = ?4, payment_terms = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.address)
        .bind(&supplier.payment_terms)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_to_duplicate(e.into(), &supplier))?;

        info!(id = %supplier.id, "Supplier updated");
        Ok(supplier)
    }

    /// Deletes a supplier. Products that referenced it keep existing with no
    /// supplier.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::SupplierNotFound(id.to_string()).into());
        }

        info!(id = %id, "Supplier deleted");
        Ok(())
    }

    /// Number of suppliers on file.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn field_taken(&self, column: &str, value: &str) -> DbResult<bool> {
        // column is one of our own literals, never user input
        let sql = format!("SELECT 1 FROM suppliers WHERE {column} = ?1");
        let found: Option<i64> = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

fn unique_to_duplicate(err: DbError, supplier: &Supplier) -> DbError {
    match err.unique_field() {
        Some("suppliers.name") => CoreError::duplicate("Supplier", "name", &supplier.name).into(),
        Some("suppliers.contact") => {
            CoreError::duplicate("Supplier", "contact", &supplier.contact).into()
        }
        _ => err,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
