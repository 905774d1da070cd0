//! Product model with stock and sales counters.
//!
//! Prices are stored as integer cents. The stock and sold counters are only
//! ever moved together by the conditional sale update in the product
//! repository, so they cannot drift apart under concurrency.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::products;

/// A product listed in a store.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    /// Unique product identifier.
    pub id: Uuid,
    /// The store this product is listed in.
    pub store_id: Uuid,
    /// The user who created this product.
    pub author_id: Uuid,
    /// Product name (1-60 characters).
    pub name: String,
    /// Free-form product description.
    pub description: String,
    /// Sale price in cents.
    pub price_cents: i64,
    /// Acquisition cost in cents.
    pub purchase_price_cents: i64,
    /// Units currently available for sale.
    pub stock: i32,
    /// Units sold so far.
    pub sold_count: i32,
    /// Optional URL to the product's image.
    pub image_url: Option<String>,
    /// Timestamp when the product was created.
    pub created_at: Timestamp,
    /// Timestamp when the product was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new product.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewProduct {
    /// The store this product is listed in.
    pub store_id: Uuid,
    /// The user who created this product.
    pub author_id: Uuid,
    /// Product name (1-60 characters).
    pub name: String,
    /// Free-form product description.
    pub description: String,
    /// Sale price in cents.
    pub price_cents: i64,
    /// Acquisition cost in cents.
    pub purchase_price_cents: i64,
    /// Units initially available for sale.
    pub stock: i32,
    /// Optional URL to the product's image.
    pub image_url: Option<String>,
}

/// Data for updating a product.
///
/// The sold counter is deliberately absent; it moves only through the sale
/// operation. Stock may be set here to restock.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateProduct {
    /// Product name.
    pub name: Option<String>,
    /// Free-form product description.
    pub description: Option<String>,
    /// Sale price in cents.
    pub price_cents: Option<i64>,
    /// Acquisition cost in cents.
    pub purchase_price_cents: Option<i64>,
    /// Units currently available for sale.
    pub stock: Option<i32>,
    /// URL to the product's image.
    pub image_url: Option<String>,
}

impl Product {
    /// Returns whether the product has no units left.
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }

    /// Returns the margin per unit in cents.
    #[inline]
    pub fn margin_cents(&self) -> i64 {
        self.price_cents - self.purchase_price_cents
    }

    /// Returns the gross revenue from all recorded sales in cents.
    #[inline]
    pub fn revenue_cents(&self) -> i64 {
        self.price_cents * self.sold_count as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with(stock: i32, sold_count: i32, price: i64, purchase: i64) -> Product {
        let now = jiff::Timestamp::now();
        Product {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            name: "widget".to_owned(),
            description: String::new(),
            price_cents: price,
            purchase_price_cents: purchase,
            stock,
            sold_count,
            image_url: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn stock_and_margin_helpers() {
        let product = product_with(0, 3, 500, 300);
        assert!(product.is_out_of_stock());
        assert_eq!(product.margin_cents(), 200);
        assert_eq!(product.revenue_cents(), 1500);

        let in_stock = product_with(2, 0, 500, 300);
        assert!(!in_stock.is_out_of_stock());
        assert_eq!(in_stock.revenue_cents(), 0);
    }
}
