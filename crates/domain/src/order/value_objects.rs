//! Value objects for the order domain.

use serde::{Deserialize, Serialize};

use crate::ids::{CourseId, EventId, PackageId, SeatZoneId, VariantId};

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dollars = self.cents / 100;
        let rem = self.cents.abs() % 100;
        if self.cents < 0 {
            write!(f, "-${}.{:02}", dollars.abs(), rem)
        } else {
            write!(f, "${dollars}.{rem:02}")
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

/// The kind of inventory an order purchases.
///
/// Determines which adjuster applies to every line item of the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Product,
    Course,
    Ticket,
    AdsPackage,
}

impl OrderType {
    /// Returns the type name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Product => "product",
            OrderType::Course => "course",
            OrderType::Ticket => "ticket",
            OrderType::AdsPackage => "ads_package",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed reference to the inventory unit a line item consumes.
///
/// Replaces the `ref_model` string discriminator of loosely-typed document
/// schemas: the dispatch to an adjuster is an exhaustive match, so a new
/// inventory kind cannot be added without handling its adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InventoryRef {
    /// A product SKU; `variant_id` is the unit actually decremented.
    Product { variant_id: VariantId },
    /// A course with bookable slots.
    Course { course_id: CourseId },
    /// A seat zone embedded in an event listing.
    Ticket {
        event_id: EventId,
        seat_zone_id: SeatZoneId,
    },
    /// An ads-package catalog entry; purchasing it adjusts no counter.
    AdsPackage { package_id: PackageId },
}

impl InventoryRef {
    /// Returns the order type this reference belongs to.
    pub fn order_type(&self) -> OrderType {
        match self {
            InventoryRef::Product { .. } => OrderType::Product,
            InventoryRef::Course { .. } => OrderType::Course,
            InventoryRef::Ticket { .. } => OrderType::Ticket,
            InventoryRef::AdsPackage { .. } => OrderType::AdsPackage,
        }
    }
}

/// One entry in an order's item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The inventory unit this item consumes.
    pub inventory: InventoryRef,

    /// Unit price snapshotted at order time; immutable afterwards.
    pub price_at_order: Money,

    /// Units purchased.
    pub quantity: u32,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(inventory: InventoryRef, price_at_order: Money, quantity: u32) -> Self {
        Self {
            inventory,
            price_at_order,
            quantity,
        }
    }

    /// Returns the total price for this item (quantity * unit price).
    pub fn total_price(&self) -> Money {
        self.price_at_order.multiply(self.quantity)
    }
}

/// Denormalized delivery snapshot, required for every order type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub recipient: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
