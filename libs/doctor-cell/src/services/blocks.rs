use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::interval::{has_conflict, slot_interval, TimeInterval};
use shared_store::AgendaStoreClient;

use crate::models::{BlockError, BlockedSlot, BookedSlot, CreateBlockedSlotRequest};

/// Blocked-slot management for a doctor's calendar.
///
/// Overlap checks here are advisory: the external store re-validates at
/// write time and remains the authority when two writers race.
pub struct BlockService {
    store: Arc<AgendaStoreClient>,
    slot_minutes: u32,
}

impl BlockService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(AgendaStoreClient::new(config)),
            slot_minutes: config.slot_minutes,
        }
    }

    pub async fn list_blocks(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<BlockedSlot>, BlockError> {
        debug!("Fetching blocked slots for doctor {}", doctor_id);

        let path = format!("/doctors/{}/blocks", doctor_id);
        self.store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BlockError::Store(e.to_string()))
    }

    /// Create a blocked slot after rejecting invalid and overlapping
    /// ranges. The candidate is checked against the doctor's existing
    /// blocks and the day's booked appointment slots; either kind of
    /// overlap rejects it.
    pub async fn create_block(
        &self,
        doctor_id: Uuid,
        request: CreateBlockedSlotRequest,
        auth_token: &str,
    ) -> Result<BlockedSlot, BlockError> {
        let candidate = TimeInterval::new(request.date, request.start_time, request.end_time)?;

        debug!(
            "Creating blocked slot for doctor {} on {} from {} to {}",
            doctor_id, request.date, request.start_time, request.end_time
        );

        let blocks = self.list_blocks(doctor_id, auth_token).await?;
        let mut occupied: Vec<TimeInterval> = blocks.iter().map(BlockedSlot::interval).collect();

        let bookings = self
            .day_bookings(doctor_id, request.date, auth_token)
            .await?;
        occupied.extend(
            bookings
                .iter()
                .filter(|b| b.occupies_slot())
                .map(|b| slot_interval(b.date, b.start_time, self.slot_minutes)),
        );

        if has_conflict(&candidate, occupied.iter()) {
            warn!(
                "Blocked slot for doctor {} on {} overlaps an existing slot",
                doctor_id, request.date
            );
            return Err(BlockError::Overlap);
        }

        let body = json!({
            "doctor_id": doctor_id,
            "date": request.date,
            "start_time": request.start_time,
            "end_time": request.end_time,
            "note": request.note,
        });

        let path = format!("/doctors/{}/blocks", doctor_id);
        let created: BlockedSlot = self
            .store
            .request(Method::POST, &path, Some(auth_token), Some(body))
            .await
            .map_err(|e| BlockError::Store(e.to_string()))?;

        debug!("Blocked slot created with id {}", created.id);
        Ok(created)
    }

    pub async fn delete_block(&self, block_id: Uuid, auth_token: &str) -> Result<(), BlockError> {
        debug!("Deleting blocked slot {}", block_id);

        let path = format!("/blocks/{}", block_id);
        let _: serde_json::Value = self
            .store
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| {
                if e.to_string().contains("not found") {
                    BlockError::NotFound
                } else {
                    BlockError::Store(e.to_string())
                }
            })?;

        Ok(())
    }

    async fn day_bookings(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<BookedSlot>, BlockError> {
        let path = format!("/appointments?doctor_id={}&date={}", doctor_id, date);
        self.store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BlockError::Store(e.to_string()))
    }
}
