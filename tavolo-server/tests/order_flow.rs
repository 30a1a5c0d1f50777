//! End-to-end order flow on the in-memory engine
//!
//! Walks the full customer/staff cycle: QR scan → token → cart → order →
//! kitchen → floor → payment → session revocation.

use std::collections::HashMap;

use shared::client::CartItemInput;
use shared::{OrderStatus, PaymentMethod, StaffRole, TokenRejection};
use tavolo_server::auth::CurrentStaff;
use tavolo_server::db::models::{DiningTableCreate, Product, ProductCreate, Restaurant};
use tavolo_server::db::repository::{
    CategoryRepository, DiningTableRepository, OrderRepository, ProductRepository,
    RestaurantRepository,
};
use tavolo_server::orders::{OrderCart, PricingMode};
use tavolo_server::{AppError, Config, ServerState};

struct World {
    state: ServerState,
    rid: String,
    tid: String,
    margherita: String,
    tiramisu: String,
}

async fn setup(ayce: bool) -> World {
    let config = Config::from_env();
    let state = ServerState::initialize_in_memory(&config).await.unwrap();

    let restaurants = RestaurantRepository::new(state.db.clone());
    let restaurant = restaurants
        .insert(Restaurant {
            id: None,
            name: "Da Mario".to_string(),
            address: Some("Via Roma 1".to_string()),
            phone: None,
            logo_url: None,
            primary_color: None,
            all_you_can_eat_enabled: ayce,
            all_you_can_eat_lunch_price: ayce.then_some(19.9),
            all_you_can_eat_dinner_price: ayce.then_some(24.9),
            prepayment_required: false,
            order_cooldown_enabled: false,
            order_cooldown_minutes: None,
            is_active: true,
        })
        .await
        .unwrap();
    let rid = restaurant.id.unwrap().to_string();

    let table = DiningTableRepository::new(state.db.clone())
        .create(&rid, DiningTableCreate {
            name: "T1".to_string(),
        })
        .await
        .unwrap();
    let tid = table.id.unwrap().to_string();

    let category = CategoryRepository::new(state.db.clone())
        .create(&rid, "Cucina".to_string(), 0)
        .await
        .unwrap();
    let cid = category.id.unwrap().to_string();

    let products = ProductRepository::new(state.db.clone());
    let margherita = products
        .create(&rid, ProductCreate {
            category_id: cid.clone(),
            name: "Margherita".to_string(),
            description: None,
            price: 8.0,
            image_url: None,
            display_order: Some(0),
            ayce_limit_enabled: None,
            ayce_limit_quantity: None,
        })
        .await
        .unwrap();
    let tiramisu = products
        .create(&rid, ProductCreate {
            category_id: cid,
            name: "Tiramisù".to_string(),
            description: None,
            price: 5.5,
            image_url: None,
            display_order: Some(1),
            ayce_limit_enabled: Some(true),
            ayce_limit_quantity: Some(2),
        })
        .await
        .unwrap();

    World {
        state,
        rid,
        tid,
        margherita: margherita.id.unwrap().to_string(),
        tiramisu: tiramisu.id.unwrap().to_string(),
    }
}

fn staff(role: StaffRole, rid: &str) -> CurrentStaff {
    CurrentStaff {
        id: "employees:test".to_string(),
        username: "test".to_string(),
        role,
        restaurant_id: Some(rid.to_string()),
    }
}

async fn catalog(world: &World) -> HashMap<String, Product> {
    ProductRepository::new(world.state.db.clone())
        .find_for_restaurant(&world.rid)
        .await
        .unwrap()
        .into_iter()
        .map(|p| (p.id.clone().unwrap().to_string(), p))
        .collect()
}

/// Place an order the way the customer handler does: session gate, party
/// size, catalog-priced cart, persisted rows
async fn place_order(
    world: &World,
    token: &str,
    items: Vec<CartItemInput>,
    party_size: Option<i32>,
) -> Result<String, AppError> {
    let state = &world.state;
    let session = state
        .gate
        .validate_entry(&world.rid, &world.tid, Some(token))
        .await?;

    let restaurant = RestaurantRepository::new(state.db.clone())
        .find_by_id(&world.rid)
        .await?
        .unwrap();
    state
        .gate
        .check_order_cooldown(&restaurant, &world.rid, &world.tid)
        .await?;
    let party = state.gate.ensure_party_size(&session, party_size).await?;

    let mode = PricingMode::for_restaurant(&restaurant);
    let cart = OrderCart::from_submission(mode, &items, &catalog(world).await)?;
    let (order, rows) = cart.into_rows(
        world.rid.parse().unwrap(),
        world.tid.parse().unwrap(),
        party,
        None,
    );

    let detail = OrderRepository::new(state.db.clone())
        .create_with_items(order, rows)
        .await?;
    Ok(detail.order.id.unwrap().to_string())
}

fn line(product_id: &str, quantity: i32) -> CartItemInput {
    CartItemInput {
        product_id: product_id.to_string(),
        quantity,
        notes: None,
        variant_id: None,
    }
}

#[tokio::test]
async fn full_table_lifecycle() {
    let world = setup(false).await;
    let state = &world.state;

    // Scan: a fresh token bound to (R1, T1)
    let issued = state
        .tokens
        .issue(&world.rid, &world.tid, "http://localhost:3000")
        .await
        .unwrap();

    // Party size is mandatory before the first submission
    let err = place_order(
        &world,
        &issued.token,
        vec![line(&world.margherita, 2)],
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // 2× Margherita (8.00) + 1× Tiramisù (5.50) = 21.50, party of 2
    let order_id = place_order(
        &world,
        &issued.token,
        vec![line(&world.margherita, 2), line(&world.tiramisu, 1)],
        Some(2),
    )
    .await
    .unwrap();

    let orders = OrderRepository::new(state.db.clone());
    let detail = orders.find_detail(&order_id).await.unwrap().unwrap();
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.total_amount, 21.5);
    assert_eq!(detail.order.party_size, Some(2));
    assert_eq!(detail.items.len(), 2);
    assert!(detail.items.iter().all(|i| i.status == OrderStatus::Pending));

    // Kitchen starts preparation, then marks ready
    let kitchen = staff(StaffRole::Kitchen, &world.rid);
    state
        .workflow
        .advance(&kitchen, &order_id, OrderStatus::Preparing)
        .await
        .unwrap();
    state
        .workflow
        .advance(&kitchen, &order_id, OrderStatus::Ready)
        .await
        .unwrap();

    // Floor delivers to the table
    let floor = staff(StaffRole::Floor, &world.rid);
    state
        .workflow
        .advance(&floor, &order_id, OrderStatus::Served)
        .await
        .unwrap();
    let detail = orders.find_detail(&order_id).await.unwrap().unwrap();
    assert_eq!(detail.order.status, OrderStatus::Served);
    assert!(detail.items.iter().all(|i| i.status == OrderStatus::Served));

    // Floor settles the table in cash; the session dies with the bill
    let settled = state
        .workflow
        .close_table(&floor, &world.tid, PaymentMethod::Cash)
        .await
        .unwrap();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].status, OrderStatus::Paid);
    assert_eq!(settled[0].payment_method, Some(PaymentMethod::Cash));

    let detail = orders.find_detail(&order_id).await.unwrap().unwrap();
    assert!(detail.items.iter().all(|i| i.status == OrderStatus::Paid));

    let err = state
        .tokens
        .validate(&issued.token, &world.rid, &world.tid)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::TokenInvalid(TokenRejection::Revoked)
    ));
}

#[tokio::test]
async fn ayce_orders_are_zeroed_and_limited() {
    let world = setup(true).await;
    let state = &world.state;

    let issued = state
        .tokens
        .issue(&world.rid, &world.tid, "http://localhost:3000")
        .await
        .unwrap();

    // Three Tiramisù exceed its per-cart AYCE limit of 2
    let err = place_order(
        &world,
        &issued.token,
        vec![line(&world.tiramisu, 3)],
        Some(2),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Tiramisù"));

    // A conforming AYCE order books every price as zero
    let order_id = place_order(
        &world,
        &issued.token,
        vec![line(&world.margherita, 4), line(&world.tiramisu, 2)],
        Some(2),
    )
    .await
    .unwrap();

    let detail = OrderRepository::new(state.db.clone())
        .find_detail(&order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.order.total_amount, 0.0);
    assert!(detail
        .items
        .iter()
        .all(|i| i.unit_price == 0.0 && i.total_price == 0.0));
    // Quantities still reach the kitchen
    assert_eq!(detail.items.iter().map(|i| i.quantity).sum::<i32>(), 6);
}

#[tokio::test]
async fn expired_tokens_fail_with_their_own_reason() {
    let world = setup(false).await;
    let state = &world.state;

    let issued = state
        .tokens
        .issue(&world.rid, &world.tid, "http://localhost:3000")
        .await
        .unwrap();
    assert!(state
        .tokens
        .validate(&issued.token, &world.rid, &world.tid)
        .await
        .is_ok());

    // Age the token past its 2-hour window
    state
        .db
        .query("UPDATE table_tokens SET expires_at = $at WHERE token = $token")
        .bind(("at", chrono::Utc::now().timestamp_millis() - 1_000))
        .bind(("token", issued.token.clone()))
        .await
        .unwrap();

    let err = state
        .tokens
        .validate(&issued.token, &world.rid, &world.tid)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::TokenInvalid(TokenRejection::Expired)
    ));
}

#[tokio::test]
async fn order_cooldown_blocks_rapid_resubmission() {
    let world = setup(false).await;
    let state = &world.state;

    // Switch the cooldown on: 5 minutes between orders per table
    state
        .db
        .query(
            "UPDATE restaurants SET order_cooldown_enabled = true, order_cooldown_minutes = 5 \
             WHERE id = $id",
        )
        .bind(("id", world.rid.parse::<surrealdb::RecordId>().unwrap()))
        .await
        .unwrap();

    let issued = state
        .tokens
        .issue(&world.rid, &world.tid, "http://localhost:3000")
        .await
        .unwrap();

    place_order(
        &world,
        &issued.token,
        vec![line(&world.margherita, 1)],
        Some(2),
    )
    .await
    .unwrap();

    let err = place_order(
        &world,
        &issued.token,
        vec![line(&world.margherita, 1)],
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
    assert!(err.to_string().contains("wait"));
}
