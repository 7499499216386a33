pub mod booking;
pub mod overlap;
pub mod time_grid;

pub use booking::{BookingError, BookingService};
pub use time_grid::{GridConfig, GridError};
