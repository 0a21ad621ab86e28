//! Identifier newtypes for catalog entities and owned packages.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id! {
    /// Identifier of a product variant (the SKU whose stock is decremented).
    VariantId
}

uuid_id! {
    /// Identifier of a course with bookable slots.
    CourseId
}

uuid_id! {
    /// Identifier of an event listing containing seat zones.
    EventId
}

uuid_id! {
    /// Identifier of a seat zone embedded in an event listing.
    SeatZoneId
}

uuid_id! {
    /// Identifier of an ads-package catalog entry.
    PackageId
}

uuid_id! {
    /// Identifier of a user's owned package instance.
    OwnPackageId
}
