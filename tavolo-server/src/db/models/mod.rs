//! Database Models
//!
//! Row structs for the embedded SurrealDB store. Record links are
//! `RecordId`s serialized as `"table:id"` strings; timestamps are unix
//! millis.

pub mod serde_helpers;

pub mod category;
pub mod dining_table;
pub mod employee;
pub mod order;
pub mod product;
pub mod restaurant;
pub mod table_token;
pub mod waiter_call;

pub use category::Category;
pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate};
pub use employee::{Employee, EmployeeCreate};
pub use order::{Order, OrderDetail, OrderItem};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use restaurant::{Restaurant, RestaurantCreate};
pub use table_token::TableToken;
pub use waiter_call::WaiterCall;
