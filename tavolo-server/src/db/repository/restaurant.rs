//! Restaurant Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Restaurant, RestaurantCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "restaurants";

#[derive(Clone)]
pub struct RestaurantRepository {
    base: BaseRepository,
}

impl RestaurantRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find restaurant by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Restaurant>> {
        let thing = parse_record_id(id, "restaurant")?;
        let restaurant: Option<Restaurant> = self.base.db().select(thing).await?;
        Ok(restaurant)
    }

    /// Create a new restaurant with default flags
    pub async fn create(&self, data: RestaurantCreate) -> RepoResult<Restaurant> {
        let restaurant = Restaurant {
            id: None,
            name: data.name,
            address: data.address,
            phone: data.phone,
            logo_url: None,
            primary_color: None,
            all_you_can_eat_enabled: false,
            all_you_can_eat_lunch_price: None,
            all_you_can_eat_dinner_price: None,
            prepayment_required: false,
            order_cooldown_enabled: false,
            order_cooldown_minutes: None,
            is_active: true,
        };
        self.insert(restaurant).await
    }

    /// Insert a fully-specified restaurant row (seeding, tests)
    pub async fn insert(&self, restaurant: Restaurant) -> RepoResult<Restaurant> {
        let created: Option<Restaurant> =
            self.base.db().create(TABLE).content(restaurant).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create restaurant".to_string()))
    }
}
