//! # Domain Types
//!
//! Core domain types used throughout Shopkeep.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Supplier     │◄──│    Product      │◄──│      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name (unique)  │   │  productId      │   │  voucherNumber  │       │
//! │  │  contact (uniq) │   │  name (unique)  │   │  products[]     │       │
//! │  │  address?       │   │  quantity ≥ 0   │   │  totalAmount    │       │
//! │  │  paymentTerms?  │   │  costPrice > 0  │   │  profit         │       │
//! │  └─────────────────┘   │  category       │   │  date           │       │
//! │        0..1            │  supplierId?    │   └────────┬────────┘       │
//! │                        └─────────────────┘            │ owns          │
//! │                                               ┌───────▼────────┐       │
//! │                                               │   SaleLine     │       │
//! │                                               │  product (id)  │       │
//! │                                               │  quantity ≥ 1  │       │
//! │                                               │  salePrice > 0 │       │
//! │                                               │  unitCost      │       │
//! │                                               └────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4, immutable, used in URLs and references
//! - Business key: product code, supplier name/contact, voucher number
//!
//! ## Views
//! Reads return "expanded" views: a product carries its supplier object and a
//! sale line carries its full product. A reference to a deleted record expands
//! to `null`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::validation;

// =============================================================================
// Category
// =============================================================================

/// Product category. The catalogue only carries these two.
///
/// Deserializes through [`FromStr`] so an unknown value reports the allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Category {
    Pistol,
    Rifle,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 2] = [Category::Pistol, Category::Rifle];

    /// Returns the stored/serialized name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Pistol => "Pistol",
            Category::Rifle => "Rifle",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "Category".to_string(),
                allowed: Category::ALL.iter().map(|c| c.as_str().to_string()).collect(),
            })
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier the shop buys stock from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Supplier {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, trimmed, unique.
    pub name: String,

    /// Phone number or other contact handle, trimmed, unique.
    pub contact: String,

    pub address: Option<String>,

    /// Free text, e.g. "30 days".
    pub payment_terms: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/suppliers`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    pub contact: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
}

impl NewSupplier {
    /// Trims name and contact, then checks their minimum lengths.
    pub fn normalize(self) -> CoreResult<Self> {
        let name = validation::validate_supplier_name(&self.name)?;
        let contact = validation::validate_supplier_contact(&self.contact)?;
        Ok(NewSupplier {
            name,
            contact,
            address: self.address,
            payment_terms: self.payment_terms,
        })
    }
}

/// Body of `PUT /api/suppliers/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub payment_terms: Option<Option<String>>,
}

impl SupplierPatch {
    /// Same rules as create, applied only to the fields present.
    pub fn normalize(self) -> CoreResult<Self> {
        Ok(SupplierPatch {
            name: self
                .name
                .as_deref()
                .map(validation::validate_supplier_name)
                .transpose()?,
            contact: self
                .contact
                .as_deref()
                .map(validation::validate_supplier_contact)
                .transpose()?,
            address: self.address,
            payment_terms: self.payment_terms,
        })
    }

    /// Merges the patch onto an existing record.
    pub fn apply(self, mut supplier: Supplier, now: DateTime<Utc>) -> Supplier {
        if let Some(name) = self.name {
            supplier.name = name;
        }
        if let Some(contact) = self.contact {
            supplier.contact = contact;
        }
        if let Some(address) = self.address {
            supplier.address = address;
        }
        if let Some(terms) = self.payment_terms {
            supplier.payment_terms = terms;
        }
        supplier.updated_at = now;
        supplier
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product held in inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business code assigned by the shop (e.g. "A001"). Unique.
    #[serde(rename = "productId")]
    pub product_code: String,

    /// Full display name, e.g. "PX3 CHINA 30 BORE". Unique.
    pub name: String,

    /// Units in stock. Never negative.
    #[ts(type = "number")]
    pub quantity: i64,

    /// Unit cost in minor currency units. Always positive.
    #[ts(type = "number")]
    pub cost_price: Money,

    pub category: Category,

    /// Optional, non-owning reference to a supplier.
    pub supplier_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// A product with its supplier expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,

    /// `null` when there is no supplier or it has been deleted.
    pub supplier: Option<Supplier>,
}

/// Body of `POST /api/products`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    #[serde(rename = "productId")]
    pub product_code: String,
    pub name: String,
    #[ts(type = "number")]
    pub quantity: i64,
    #[ts(type = "number")]
    pub cost_price: Money,
    pub category: Category,
    /// Supplier id.
    #[serde(default)]
    pub supplier: Option<String>,
}

impl NewProduct {
    /// Trims the text fields and checks every rule a new product must meet.
    pub fn normalize(self) -> CoreResult<Self> {
        let product_code = validation::validate_product_code(&self.product_code)?;
        let name = validation::validate_product_name(&self.name)?;
        validation::validate_stock_quantity(self.quantity)?;
        validation::validate_cost_price(self.cost_price)?;
        Ok(NewProduct {
            product_code,
            name,
            supplier: self.supplier.filter(|s| !s.trim().is_empty()),
            ..self
        })
    }
}

/// Body of `PUT /api/products/:id`. Absent fields are left untouched and
/// `"supplier": null` clears the supplier.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(rename = "productId")]
    pub product_code: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub cost_price: Option<Money>,
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub supplier: Option<Option<String>>,
}

impl ProductPatch {
    /// Same rules as create, applied only to the fields present.
    pub fn normalize(self) -> CoreResult<Self> {
        if let Some(quantity) = self.quantity {
            validation::validate_stock_quantity(quantity)?;
        }
        if let Some(cost) = self.cost_price {
            validation::validate_cost_price(cost)?;
        }
        Ok(ProductPatch {
            product_code: self
                .product_code
                .as_deref()
                .map(validation::validate_product_code)
                .transpose()?,
            name: self
                .name
                .as_deref()
                .map(validation::validate_product_name)
                .transpose()?,
            supplier: self
                .supplier
                .map(|s| s.filter(|id| !id.trim().is_empty())),
            ..self
        })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line item in a sale.
///
/// `unit_cost` freezes the product's cost price at the moment of sale so the
/// sale's profit stays auditable after the product is repriced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLine {
    /// Product id (UUID). May dangle once the product is deleted.
    pub product: String,
    #[ts(type = "number")]
    pub quantity: i64,
    #[ts(type = "number")]
    pub sale_price: Money,
    #[ts(type = "number")]
    pub unit_cost: Money,
}

/// A recorded sale. Immutable once created; only deletion is allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub voucher_number: String,
    pub products: Vec<SaleLine>,
    #[ts(type = "number")]
    pub total_amount: Money,
    #[ts(type = "number")]
    pub profit: Money,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

/// A sale line with its product expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLineView {
    /// `null` once the product has been deleted.
    pub product: Option<Product>,
    #[ts(type = "number")]
    pub quantity: i64,
    #[ts(type = "number")]
    pub sale_price: Money,
    #[ts(type = "number")]
    pub unit_cost: Money,
}

/// A sale with each line's product expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleView {
    pub id: String,
    pub voucher_number: String,
    pub products: Vec<SaleLineView>,
    #[ts(type = "number")]
    pub total_amount: Money,
    #[ts(type = "number")]
    pub profit: Money,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

impl SaleView {
    /// Expands `sale` using `lookup` to resolve product ids.
    pub fn expand<F>(sale: Sale, mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<Product>,
    {
        let products = sale
            .products
            .into_iter()
            .map(|line| SaleLineView {
                product: lookup(&line.product),
                quantity: line.quantity,
                sale_price: line.sale_price,
                unit_cost: line.unit_cost,
            })
            .collect();

        SaleView {
            id: sale.id,
            voucher_number: sale.voucher_number,
            products,
            total_amount: sale.total_amount,
            profit: sale.profit,
            date: sale.date,
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    #[ts(type = "number")]
    pub total_products: i64,
    /// Σ totalAmount of sales dated today (UTC).
    #[ts(type = "number")]
    pub today_sales: Money,
    /// Number of sales dated in the current month (UTC).
    #[ts(type = "number")]
    pub monthly_orders: i64,
    #[ts(type = "number")]
    pub active_suppliers: i64,
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Distinguishes `"field": null` (Some(None)) from an absent field (None).
/// Pair with `#[serde(default)]`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap()
    }

    fn product() -> Product {
        Product {
            id: "p-1".to_string(),
            product_code: "A001".to_string(),
            name: "PX3 CHINA 30 BORE".to_string(),
            quantity: 10,
            cost_price: Money::from_minor(35_000),
            category: Category::Pistol,
            supplier_id: Some("s-1".to_string()),
            created_at: ts(),
            updated_at: ts(),
        }
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Pistol".parse::<Category>().unwrap(), Category::Pistol);
        assert_eq!("Rifle".parse::<Category>().unwrap(), Category::Rifle);

        let err = "Shotgun".parse::<Category>().unwrap_err();
        assert_eq!(err.to_string(), "Category must be one of: Pistol, Rifle");
    }

    #[test]
    fn test_category_rejected_by_serde() {
        let body = r#"{"productId":"A1","name":"X","quantity":1,"costPrice":5,"category":"Shotgun"}"#;
        let err = serde_json::from_str::<NewProduct>(body).unwrap_err();
        assert!(err.to_string().contains("Category must be one of: Pistol, Rifle"));
    }

    #[test]
    fn test_product_json_uses_product_id_key() {
        let json = serde_json::to_value(product()).unwrap();
        assert_eq!(json["productId"], "A001");
        assert_eq!(json["costPrice"], 35_000);
        assert_eq!(json["category"], "Pistol");
        assert!(json.get("productCode").is_none());
    }

    #[test]
    fn test_product_view_flattens_product() {
        let view = ProductView {
            product: product(),
            supplier: None,
        };
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["name"], "PX3 CHINA 30 BORE");
        assert!(json["supplier"].is_null());
    }

    #[test]
    fn test_new_product_normalize() {
        let input = NewProduct {
            product_code: "  A002 ".to_string(),
            name: " TT PISTOL ".to_string(),
            quantity: 0,
            cost_price: Money::from_minor(20_000),
            category: Category::Pistol,
            supplier: Some("".to_string()),
        };
        let normalized = input.normalize().unwrap();
        assert_eq!(normalized.product_code, "A002");
        assert_eq!(normalized.name, "TT PISTOL");
        assert_eq!(normalized.supplier, None);
    }

    #[test]
    fn test_new_product_rejects_bad_numbers() {
        let mut input = NewProduct {
            product_code: "A002".to_string(),
            name: "TT PISTOL".to_string(),
            quantity: -1,
            cost_price: Money::from_minor(20_000),
            category: Category::Pistol,
            supplier: None,
        };
        let err = input.clone().normalize().unwrap_err();
        assert_eq!(err.to_string(), "Quantity cannot be negative");

        input.quantity = 1;
        input.cost_price = Money::zero();
        let err = input.normalize().unwrap_err();
        assert_eq!(err.to_string(), "Cost price must be greater than 0");
    }

    #[test]
    fn test_product_patch_distinguishes_null_supplier() {
        let clear: ProductPatch = serde_json::from_str(r#"{"supplier":null}"#).unwrap();
        assert_eq!(clear.supplier, Some(None));

        let untouched: ProductPatch = serde_json::from_str(r#"{"name":"NEW"}"#).unwrap();
        assert_eq!(untouched.supplier, None);
        assert_eq!(untouched.name.as_deref(), Some("NEW"));
    }

    #[test]
    fn test_product_patch_validates_present_fields() {
        let patch: ProductPatch = serde_json::from_str(r#"{"quantity":-4}"#).unwrap();
        assert!(patch.normalize().is_err());

        let patch: ProductPatch = serde_json::from_str(r#"{"productId":"  B9  "}"#).unwrap();
        assert_eq!(patch.normalize().unwrap().product_code.as_deref(), Some("B9"));
    }

    #[test]
    fn test_new_supplier_normalize_trims() {
        let supplier = NewSupplier {
            name: "  ABC Arms Supplier ".to_string(),
            contact: " 03001234567 ".to_string(),
            address: None,
            payment_terms: Some("30 days".to_string()),
        }
        .normalize()
        .unwrap();

        assert_eq!(supplier.name, "ABC Arms Supplier");
        assert_eq!(supplier.contact, "03001234567");
    }

    #[test]
    fn test_sale_view_expand_marks_missing_products() {
        let sale = Sale {
            id: "s".to_string(),
            voucher_number: "V-1".to_string(),
            products: vec![
                SaleLine {
                    product: "p-1".to_string(),
                    quantity: 1,
                    sale_price: Money::from_minor(40_000),
                    unit_cost: Money::from_minor(35_000),
                },
                SaleLine {
                    product: "gone".to_string(),
                    quantity: 1,
                    sale_price: Money::from_minor(10),
                    unit_cost: Money::from_minor(5),
                },
            ],
            total_amount: Money::from_minor(40_010),
            profit: Money::from_minor(5_005),
            date: ts(),
        };

        let view = SaleView::expand(sale, |id| (id == "p-1").then(product));
        assert_eq!(view.products[0].product.as_ref().map(|p| p.name.as_str()), Some("PX3 CHINA 30 BORE"));
        assert!(view.products[1].product.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["voucherNumber"], "V-1");
        assert!(json["products"][1]["product"].is_null());
    }
}
