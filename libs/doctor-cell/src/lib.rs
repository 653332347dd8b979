pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{BlockError, BlockedSlot, BookedSlot, CreateBlockedSlotRequest, Doctor};
pub use services::{BlockService, DirectoryService};
