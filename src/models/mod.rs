pub mod booking;
pub mod interval;
pub mod ledger;
pub mod slot;

pub use booking::{Booking, BookingSummary};
pub use interval::{Interval, IntervalError};
pub use ledger::Ledger;
pub use slot::{Slot, SlotStatus};
