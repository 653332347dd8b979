pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    Appointment, AppointmentStats, AppointmentStatus, BookAppointmentRequest, DayAgenda,
    SchedulingError, UpdateStatusRequest,
};
pub use services::agenda::{AgendaCatalogs, AgendaPartition, AppointmentFilter};
pub use services::booking::BookingService;
pub use services::conflict::ConflictChecker;
pub use services::lifecycle::AppointmentLifecycleService;
