//! The order aggregate and its value objects.

mod aggregate;
mod status;
mod value_objects;

pub use aggregate::Order;
pub use status::OrderStatus;
pub use value_objects::{InventoryRef, LineItem, Money, OrderType, ShippingAddress};
