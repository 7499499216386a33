use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Booking;

// {"2024-06-10": [booking, ...], ...}
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    days: BTreeMap<NaiveDate, Vec<Booking>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, day: NaiveDate) -> &[Booking] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push(&mut self, day: NaiveDate, booking: Booking) {
        self.days.entry(day).or_default().push(booking);
    }

    pub fn day_count(&self) -> usize {
        self.days.values().filter(|b| !b.is_empty()).count()
    }

    pub fn total_bookings(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_bookings() == 0
    }
}
