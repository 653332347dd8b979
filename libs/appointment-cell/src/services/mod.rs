pub mod agenda;
pub mod booking;
pub mod conflict;
pub mod lifecycle;

pub use booking::BookingService;
pub use conflict::ConflictChecker;
pub use lifecycle::AppointmentLifecycleService;
