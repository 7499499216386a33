use crate::models::{Booking, Interval};

// scans the whole slice; the bookings need not be disjoint
pub fn find_overlap<'a>(candidate: &Interval, existing: &'a [Booking]) -> Option<&'a Booking> {
    existing.iter().find(|b| candidate.overlaps(&b.interval))
}
