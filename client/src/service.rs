//! Cached reservation data-access layer.
//!
//! Mediates between the UI and the API: reads serve from the cache when
//! populated, mutations invalidate it only after the server confirms
//! success (invalidate-after-success, never before).

use tracing::debug;

use shared::models::{
    CancelReservationResponse, CreateReservationRequest, DocumentRequest, DocumentSlot,
    DocumentUpdateResponse, Reservation, ReservationDocument,
};

use crate::api::{ApiClient, ListQuery};
use crate::cache::ReservationCache;
use crate::error::Result;

/// Reservation operations with invalidate-on-mutation caching.
pub struct ReservationService {
    api: ApiClient,
    cache: ReservationCache,
}

impl ReservationService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: ReservationCache::new(),
        }
    }

    /// The caller's active reservation, or `None` when there is none.
    pub async fn active_reservation(&mut self) -> Result<Option<Reservation>> {
        if let Some(cached) = self.cache.active() {
            debug!("Active reservation served from cache");
            return Ok(cached.clone());
        }

        let active = self.api.active().await?;
        self.cache.store_active(active.clone());
        Ok(active)
    }

    /// The caller's reservation history (unfiltered).
    ///
    /// Filtered queries bypass the cache; only the plain list is cached.
    pub async fn reservations(&mut self) -> Result<Vec<Reservation>> {
        if let Some(cached) = self.cache.list() {
            debug!("Reservation list served from cache");
            return Ok(cached.clone());
        }

        let list = self.api.list(&ListQuery::default()).await?;
        self.cache.store_list(list.clone());
        Ok(list)
    }

    /// A filtered listing; never cached.
    pub async fn reservations_filtered(&self, query: &ListQuery) -> Result<Vec<Reservation>> {
        self.api.list(query).await
    }

    /// Create a reservation. On success the list slot is invalidated and the
    /// active slot is seeded with the server's response.
    pub async fn create(&mut self, request: &CreateReservationRequest) -> Result<Reservation> {
        let created = self.api.create(request).await?;

        self.cache.invalidate();
        self.cache.store_active(Some(created.clone()));

        Ok(created)
    }

    /// Cancel a reservation. Both cache slots are invalidated on success.
    pub async fn cancel(&mut self, reservation_id: &str) -> Result<CancelReservationResponse> {
        let response = self.api.cancel(reservation_id).await?;
        self.cache.invalidate();
        Ok(response)
    }

    /// Upload a document into one slot of a reservation.
    pub async fn upload_document(
        &mut self,
        reservation_id: &str,
        slot: DocumentSlot,
        document: ReservationDocument,
    ) -> Result<DocumentUpdateResponse> {
        let request = DocumentRequest::upload(slot, document);
        let response = self.api.update_document(reservation_id, &request).await?;
        self.cache.invalidate();
        Ok(response)
    }

    /// Remove a document from one slot of a reservation.
    pub async fn delete_document(
        &mut self,
        reservation_id: &str,
        slot: DocumentSlot,
    ) -> Result<DocumentUpdateResponse> {
        let request = DocumentRequest::delete(slot);
        let response = self.api.update_document(reservation_id, &request).await?;
        self.cache.invalidate();
        Ok(response)
    }
}
