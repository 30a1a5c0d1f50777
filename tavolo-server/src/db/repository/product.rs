//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use shared::ProductStatus;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "products";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all products of a restaurant, in display order
    pub async fn find_for_restaurant(&self, restaurant_id: &str) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM products WHERE restaurant_id = $rid ORDER BY display_order")
            .bind(("rid", restaurant_id.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find available products of a restaurant (customer menu)
    pub async fn find_available(&self, restaurant_id: &str) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query(
                "SELECT * FROM products WHERE restaurant_id = $rid AND status = $status ORDER BY display_order",
            )
            .bind(("rid", restaurant_id.to_string()))
            .bind(("status", "available"))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let thing = parse_record_id(id, "product")?;
        let product: Option<Product> = self.base.db().select(thing).await?;
        Ok(product)
    }

    /// Find products by id list
    pub async fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let things = ids
            .iter()
            .map(|id| parse_record_id(id, "product"))
            .collect::<RepoResult<Vec<_>>>()?;
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM products WHERE id IN $ids")
            .bind(("ids", things))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Create a new product
    pub async fn create(&self, restaurant_id: &str, data: ProductCreate) -> RepoResult<Product> {
        validate_ayce_limit(data.ayce_limit_enabled.unwrap_or(false), data.ayce_limit_quantity)?;

        let rid = parse_record_id(restaurant_id, "restaurant")?;
        let cid = parse_record_id(&data.category_id, "category")?;
        let product = Product {
            id: None,
            restaurant_id: rid,
            category_id: cid,
            name: data.name,
            description: data.description,
            price: data.price,
            image_url: data.image_url,
            status: ProductStatus::Available,
            display_order: data.display_order.unwrap_or(0),
            ayce_limit_enabled: data.ayce_limit_enabled.unwrap_or(false),
            ayce_limit_quantity: data.ayce_limit_quantity,
        };

        let created: Option<Product> = self.base.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let thing = parse_record_id(id, "product")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        let ayce_limit_enabled = data
            .ayce_limit_enabled
            .unwrap_or(existing.ayce_limit_enabled);
        let ayce_limit_quantity = data.ayce_limit_quantity.or(existing.ayce_limit_quantity);
        validate_ayce_limit(ayce_limit_enabled, ayce_limit_quantity)?;

        let name = data.name.unwrap_or(existing.name);
        let description = data.description.or(existing.description);
        let price = data.price.unwrap_or(existing.price);
        let image_url = data.image_url.or(existing.image_url);
        let status = data.status.unwrap_or(existing.status);
        let display_order = data.display_order.unwrap_or(existing.display_order);

        self.base
            .db()
            .query(
                "UPDATE $thing SET name = $name, description = $description, price = $price, \
                 image_url = $image_url, status = $status, display_order = $display_order, \
                 ayce_limit_enabled = $ayce_limit_enabled, ayce_limit_quantity = $ayce_limit_quantity",
            )
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("description", description))
            .bind(("price", price))
            .bind(("image_url", image_url))
            .bind(("status", status))
            .bind(("display_order", display_order))
            .bind(("ayce_limit_enabled", ayce_limit_enabled))
            .bind(("ayce_limit_quantity", ayce_limit_quantity))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }
}

/// AYCE limit invariant: positive quantity whenever the flag is set
fn validate_ayce_limit(enabled: bool, quantity: Option<i32>) -> RepoResult<()> {
    if enabled && !quantity.is_some_and(|q| q > 0) {
        return Err(RepoError::Validation(
            "AYCE limit quantity must be a positive integer when the limit is enabled".to_string(),
        ));
    }
    Ok(())
}
