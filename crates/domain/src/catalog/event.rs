use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::ids::{EventId, SeatZoneId};

/// A seat zone embedded in an event listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatZone {
    pub id: SeatZoneId,
    pub name: String,
    pub number_of_seat: i64,
}

/// An event listing; seat zones live embedded in the parent document and the
/// listing is persisted whole after any zone adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListing {
    id: EventId,
    seat_zones: Vec<SeatZone>,
}

impl EventListing {
    pub fn new(id: EventId, seat_zones: Vec<SeatZone>) -> Self {
        Self { id, seat_zones }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn seat_zones(&self) -> &[SeatZone] {
        &self.seat_zones
    }

    /// Returns the zone with the given ID, if embedded in this listing.
    pub fn zone(&self, zone_id: SeatZoneId) -> Option<&SeatZone> {
        self.seat_zones.iter().find(|z| z.id == zone_id)
    }

    /// Applies a signed seat adjustment to the named zone.
    pub fn adjust_zone(&mut self, zone_id: SeatZoneId, delta: i64) -> Result<(), CatalogError> {
        let event_id = self.id;
        let zone = self
            .seat_zones
            .iter_mut()
            .find(|z| z.id == zone_id)
            .ok_or(CatalogError::SeatZoneNotFound { event_id, zone_id })?;

        let updated = zone.number_of_seat + delta;
        if updated < 0 {
            return Err(CatalogError::InsufficientSeats {
                event_id,
                zone_id,
                requested: -delta,
                available: zone.number_of_seat,
            });
        }
        zone.number_of_seat = updated;
        Ok(())
    }
}
