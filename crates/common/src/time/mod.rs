//! Monotonic time sources
//!
//! Cache expiry decisions must survive wall-clock adjustments (NTP steps,
//! DST, manual changes), so everything time-based in the workspace goes
//! through the [`Clock`] trait and `std::time::Instant`.

mod clock;

pub use clock::{Clock, MockClock, SystemClock};
