use serde::Serialize;

use super::{BookingSummary, Interval};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub interval: Interval,
    #[serde(flatten)]
    pub status: SlotStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Booked { booking: BookingSummary },
}

impl Slot {
    pub fn is_available(&self) -> bool {
        matches!(self.status, SlotStatus::Available)
    }

    pub fn booked_by(&self) -> Option<&str> {
        match &self.status {
            SlotStatus::Available => None,
            SlotStatus::Booked { booking } => Some(&booking.name),
        }
    }
}
