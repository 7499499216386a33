use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveTime, SubsecRound};
use uuid::Uuid;

use crate::models::booking::{normalize_name, normalize_note};
use crate::models::{Booking, BookingSummary, Interval, Slot, SlotStatus};
use crate::services::overlap::find_overlap;
use crate::services::time_grid::{GridConfig, GridError};
use crate::store::{BookingStore, Snapshot, StoreError};

// whole read-check-write attempts before a concurrent write is reported
// as a persistence failure
const MAX_SAVE_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("slot {} is already booked by {}", .conflict.interval, .conflict.name)]
    SlotTaken { conflict: BookingSummary },

    #[error("stored bookings are corrupt: {0}")]
    StorageCorrupt(String),

    #[error("booking could not be saved: {0}")]
    PersistenceFailed(String),
}

impl From<GridError> for BookingError {
    fn from(e: GridError) -> Self {
        match e {
            GridError::InvalidConfiguration(msg) => BookingError::InvalidConfiguration(msg),
        }
    }
}

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    grid: GridConfig,
    tolerate_corrupt_storage: bool,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>, grid: GridConfig) -> Self {
        Self {
            store,
            grid,
            tolerate_corrupt_storage: false,
        }
    }

    pub fn tolerate_corrupt_storage(mut self, tolerate: bool) -> Self {
        self.tolerate_corrupt_storage = tolerate;
        self
    }

    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    fn load(&self) -> Result<Snapshot, BookingError> {
        match self.store.load_all() {
            Ok(snapshot) => Ok(snapshot),
            Err(StoreError::Corrupt { version, reason }) if self.tolerate_corrupt_storage => {
                tracing::warn!(version, reason = %reason, "ignoring corrupt booking storage");
                Ok(Snapshot {
                    version,
                    ledger: Default::default(),
                })
            }
            Err(StoreError::Corrupt { reason, .. }) => {
                tracing::error!(reason = %reason, "booking storage is corrupt");
                Err(BookingError::StorageCorrupt(reason))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load bookings");
                Err(BookingError::PersistenceFailed(e.to_string()))
            }
        }
    }

    pub fn list_slots(&self, day: NaiveDate, duration_minutes: i64) -> Result<Vec<Slot>, BookingError> {
        let candidates = self.grid.generate(day, duration_minutes)?;
        let snapshot = self.load()?;
        let existing = snapshot.ledger.day(day);

        let slots = candidates
            .into_iter()
            .map(|interval| {
                let status = match find_overlap(&interval, existing) {
                    Some(booking) => SlotStatus::Booked {
                        booking: booking.summary(),
                    },
                    None => SlotStatus::Available,
                };
                Slot { interval, status }
            })
            .collect();

        Ok(slots)
    }

    pub fn create_booking(
        &self,
        candidate: Interval,
        day: NaiveDate,
        name: &str,
        note: Option<&str>,
    ) -> Result<Booking, BookingError> {
        let next_midnight = day
            .succ_opt()
            .map(|next| next.and_time(NaiveTime::default()));
        if candidate.start().date() != day || next_midnight.map_or(true, |m| candidate.end() > m) {
            return Err(BookingError::InvalidConfiguration(format!(
                "interval {candidate} does not lie within {day}"
            )));
        }

        let name = normalize_name(name);
        let note = normalize_note(note);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let snapshot = self.load()?;

            if let Some(existing) = find_overlap(&candidate, snapshot.ledger.day(day)) {
                tracing::info!(
                    day = %day,
                    requested = %candidate,
                    conflict = %existing.id,
                    "slot already taken"
                );
                return Err(BookingError::SlotTaken {
                    conflict: existing.summary(),
                });
            }

            let booking = Booking {
                id: Uuid::new_v4().to_string(),
                interval: candidate,
                name: name.clone(),
                note: note.clone(),
                created_at: Local::now().naive_local().trunc_subsecs(0),
            };

            let mut ledger = snapshot.ledger;
            ledger.push(day, booking.clone());

            match self.store.save_all(&ledger, snapshot.version) {
                Ok(version) => {
                    tracing::info!(
                        id = %booking.id,
                        day = %day,
                        interval = %booking.interval,
                        version,
                        "booking confirmed"
                    );
                    return Ok(booking);
                }
                Err(StoreError::VersionConflict { expected, actual }) if attempt < MAX_SAVE_ATTEMPTS => {
                    tracing::warn!(attempt, expected, actual, "ledger changed during booking, retrying");
                }
                Err(e) => {
                    tracing::error!(error = %e, day = %day, attempt, "failed to save booking");
                    return Err(BookingError::PersistenceFailed(e.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Version};
    use crate::models::Ledger;
    use chrono::NaiveDateTime;
    use std::sync::Mutex;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn iv(start: &str, end: &str) -> Interval {
        let dt = |s: &str| NaiveDateTime::parse_from_str(&format!("2024-06-10 {s}"), "%Y-%m-%d %H:%M").unwrap();
        Interval::new(dt(start), dt(end)).unwrap()
    }

    fn service() -> BookingService {
        BookingService::new(Arc::new(MemoryStore::new()), GridConfig::default())
    }

    #[test]
    fn test_empty_day_lists_all_available() {
        let slots = service().list_slots(day(), 60).unwrap();
        assert_eq!(slots.len(), 23);
        assert_eq!(slots[0].interval, iv("09:00", "10:00"));
        assert_eq!(slots[22].interval, iv("20:00", "21:00"));
        assert!(slots.iter().all(Slot::is_available));
    }

    #[test]
    fn test_booked_slot_shows_on_relist() {
        let svc = service();
        let booking = svc
            .create_booking(iv("09:00", "10:00"), day(), "Asha", None)
            .unwrap();
        assert_eq!(booking.name, "Asha");
        assert_eq!(booking.note, "");

        let slots = svc.list_slots(day(), 60).unwrap();
        assert_eq!(slots[0].booked_by(), Some("Asha"));
        // 09:30-10:30 also overlaps the booking
        assert_eq!(slots[1].booked_by(), Some("Asha"));
        assert!(slots[2].is_available());

        let err = svc
            .create_booking(iv("09:30", "10:30"), day(), "Ravi", None)
            .unwrap_err();
        match err {
            BookingError::SlotTaken { conflict } => {
                assert_eq!(conflict.id, booking.id);
                assert_eq!(conflict.name, "Asha");
            }
            other => panic!("expected SlotTaken, got {other:?}"),
        }
    }

    #[test]
    fn test_adjacent_bookings_both_succeed() {
        let svc = service();
        svc.create_booking(iv("10:00", "10:30"), day(), "A", None).unwrap();
        svc.create_booking(iv("10:30", "11:00"), day(), "B", None).unwrap();

        let slots = svc.list_slots(day(), 30).unwrap();
        let booked: Vec<_> = slots.iter().filter_map(Slot::booked_by).collect();
        assert_eq!(booked, vec!["A", "B"]);
    }

    #[test]
    fn test_other_days_are_independent() {
        let svc = service();
        svc.create_booking(iv("09:00", "10:00"), day(), "A", None).unwrap();
        let next = day().succ_opt().unwrap();
        let slots = svc.list_slots(next, 60).unwrap();
        assert!(slots.iter().all(Slot::is_available));
    }

    #[test]
    fn test_sequential_bookings_never_overlap() {
        let store = Arc::new(MemoryStore::new());
        let svc = BookingService::new(store.clone(), GridConfig::default());
        let attempts = [
            ("09:00", true),
            ("09:30", false),
            ("10:00", true),
            ("10:15", false),
            ("11:00", true),
            ("10:45", false),
            ("12:00", true),
        ];
        for (i, (start, admitted)) in attempts.iter().enumerate() {
            let start_dt = iv(start, "21:00").start();
            let interval = Interval::new(start_dt, start_dt + chrono::Duration::minutes(45)).unwrap();
            let result = svc.create_booking(interval, day(), &format!("guest {i}"), None);
            if *admitted {
                assert!(result.is_ok(), "{start} should be admitted: {result:?}");
            } else {
                assert!(
                    matches!(result, Err(BookingError::SlotTaken { .. })),
                    "{start} should be taken: {result:?}"
                );
            }
        }

        let ledger = store.load_all().unwrap().ledger;
        let bookings = ledger.day(day());
        assert_eq!(bookings.len(), 4);
        for (i, a) in bookings.iter().enumerate() {
            for b in &bookings[i + 1..] {
                assert!(!a.interval.overlaps(&b.interval), "{} overlaps {}", a.interval, b.interval);
            }
        }
    }

    #[test]
    fn test_interval_running_past_midnight_is_rejected() {
        let svc = service();
        let dt = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
        let overnight = Interval::new(dt("2024-06-10 23:00"), dt("2024-06-11 10:00")).unwrap();
        let err = svc.create_booking(overnight, day(), "A", None).unwrap_err();
        assert!(matches!(err, BookingError::InvalidConfiguration(_)));

        let next_morning = Interval::new(dt("2024-06-11 09:00"), dt("2024-06-11 10:00")).unwrap();
        svc.create_booking(next_morning, day().succ_opt().unwrap(), "B", None)
            .unwrap();

        // ending exactly at midnight stays within the day
        let late = Interval::new(dt("2024-06-10 23:00"), dt("2024-06-11 00:00")).unwrap();
        svc.create_booking(late, day(), "C", None).unwrap();
    }

    #[test]
    fn test_huge_duration_lists_nothing() {
        assert!(service().list_slots(day(), 1_000_000_000_000).unwrap().is_empty());
        assert!(service().list_slots(day(), i64::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_normalizes_name_and_note() {
        let booking = service()
            .create_booking(iv("09:00", "10:00"), day(), "   ", Some("  window seat "))
            .unwrap();
        assert_eq!(booking.name, "Anonymous");
        assert_eq!(booking.note, "window seat");
    }

    #[test]
    fn test_interval_on_other_day_is_rejected() {
        let err = service()
            .create_booking(iv("09:00", "10:00"), day().succ_opt().unwrap(), "A", None)
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_invalid_duration() {
        assert!(matches!(
            service().list_slots(day(), 0),
            Err(BookingError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_corrupt_storage_propagates() {
        let svc = BookingService::new(Arc::new(MemoryStore::with_raw("][")), GridConfig::default());
        assert!(matches!(svc.list_slots(day(), 60), Err(BookingError::StorageCorrupt(_))));
        assert!(matches!(
            svc.create_booking(iv("09:00", "10:00"), day(), "A", None),
            Err(BookingError::StorageCorrupt(_))
        ));
    }

    #[test]
    fn test_corrupt_storage_tolerated_when_configured() {
        let store = Arc::new(MemoryStore::with_raw("]["));
        let svc = BookingService::new(store.clone(), GridConfig::default()).tolerate_corrupt_storage(true);
        assert!(svc.list_slots(day(), 60).unwrap().iter().all(Slot::is_available));

        svc.create_booking(iv("09:00", "10:00"), day(), "A", None).unwrap();
        assert_eq!(store.load_all().unwrap().ledger.total_bookings(), 1);
    }

    struct FailingStore;

    impl BookingStore for FailingStore {
        fn load_all(&self) -> Result<Snapshot, StoreError> {
            Ok(Snapshot::default())
        }

        fn save_all(&self, _ledger: &Ledger, _expected: Version) -> Result<Version, StoreError> {
            Err(StoreError::Unavailable("disk full".to_string()))
        }

        fn clear_all(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_save_failure_is_persistence_failed() {
        let svc = BookingService::new(Arc::new(FailingStore), GridConfig::default());
        let err = svc
            .create_booking(iv("09:00", "10:00"), day(), "A", None)
            .unwrap_err();
        assert!(matches!(err, BookingError::PersistenceFailed(msg) if msg.contains("disk full")));
    }

    // commits one of `intruder` ahead of each save until it runs dry
    struct RacingStore {
        inner: MemoryStore,
        intruder: Mutex<Vec<Interval>>,
    }

    impl BookingStore for RacingStore {
        fn load_all(&self) -> Result<Snapshot, StoreError> {
            self.inner.load_all()
        }

        fn save_all(&self, ledger: &Ledger, expected: Version) -> Result<Version, StoreError> {
            if let Some(interval) = self.intruder.lock().unwrap().pop() {
                let mut snapshot = self.inner.load_all()?;
                snapshot.ledger.push(
                    interval.start().date(),
                    Booking {
                        id: format!("intruder-{}", interval.start()),
                        interval,
                        name: "Intruder".to_string(),
                        note: String::new(),
                        created_at: interval.start(),
                    },
                );
                self.inner.save_all(&snapshot.ledger, snapshot.version)?;
            }
            self.inner.save_all(ledger, expected)
        }

        fn clear_all(&self) -> Result<(), StoreError> {
            self.inner.clear_all()
        }
    }

    #[test]
    fn test_concurrent_write_is_retried() {
        let store = Arc::new(RacingStore {
            inner: MemoryStore::new(),
            intruder: Mutex::new(vec![iv("15:00", "16:00")]),
        });
        let svc = BookingService::new(store.clone(), GridConfig::default());
        svc.create_booking(iv("09:00", "10:00"), day(), "Asha", None).unwrap();

        let ledger = store.load_all().unwrap().ledger;
        assert_eq!(ledger.day(day()).len(), 2);
    }

    #[test]
    fn test_concurrent_write_of_same_slot_is_slot_taken() {
        let store = Arc::new(RacingStore {
            inner: MemoryStore::new(),
            intruder: Mutex::new(vec![iv("09:30", "10:00")]),
        });
        let svc = BookingService::new(store, GridConfig::default());
        let err = svc
            .create_booking(iv("09:00", "10:00"), day(), "Asha", None)
            .unwrap_err();
        assert!(matches!(err, BookingError::SlotTaken { conflict } if conflict.name == "Intruder"));
    }

    #[test]
    fn test_persistent_contention_gives_up() {
        let store = Arc::new(RacingStore {
            inner: MemoryStore::new(),
            intruder: Mutex::new(vec![iv("18:00", "19:00"), iv("17:00", "18:00"), iv("16:00", "17:00")]),
        });
        let svc = BookingService::new(store.clone(), GridConfig::default());
        let err = svc
            .create_booking(iv("09:00", "10:00"), day(), "Asha", None)
            .unwrap_err();
        assert!(matches!(err, BookingError::PersistenceFailed(_)));
        assert!(store
            .load_all()
            .unwrap()
            .ledger
            .day(day())
            .iter()
            .all(|b| b.name == "Intruder"));
    }
}
