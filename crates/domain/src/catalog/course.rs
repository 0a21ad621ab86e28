use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::ids::CourseId;

/// A course with bookable slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    id: CourseId,
    available_slot: i64,
}

impl Course {
    pub fn new(id: CourseId, available_slot: i64) -> Self {
        Self { id, available_slot }
    }

    pub fn id(&self) -> CourseId {
        self.id
    }

    pub fn available_slot(&self) -> i64 {
        self.available_slot
    }

    /// Applies a signed slot adjustment; the committed value is never negative.
    pub fn adjust_slots(&mut self, delta: i64) -> Result<(), CatalogError> {
        let updated = self.available_slot + delta;
        if updated < 0 {
            return Err(CatalogError::InsufficientCapacity {
                course_id: self.id,
                requested: -delta,
                available: self.available_slot,
            });
        }
        self.available_slot = updated;
        Ok(())
    }
}
