//! Session-scoped reservation cache.
//!
//! Two slots mirror the two read endpoints: the active reservation and the
//! reservation list. Mutations invalidate after success; a create seeds the
//! active slot with the server's response so the next read skips a round
//! trip. Runs on the single UI thread, so no interior locking.

use shared::models::Reservation;

/// Cached read results for one session.
#[derive(Debug, Default)]
pub struct ReservationCache {
    // Outer Option: slot populated or not. Inner Option on `active`: a
    // cached "no active reservation" is a valid, serveable result.
    active: Option<Option<Reservation>>,
    list: Option<Vec<Reservation>>,
}

impl ReservationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached active reservation, if the slot is populated.
    pub fn active(&self) -> Option<&Option<Reservation>> {
        self.active.as_ref()
    }

    /// Cached reservation list, if the slot is populated.
    pub fn list(&self) -> Option<&Vec<Reservation>> {
        self.list.as_ref()
    }

    pub fn store_active(&mut self, value: Option<Reservation>) {
        self.active = Some(value);
    }

    pub fn store_list(&mut self, value: Vec<Reservation>) {
        self.list = Some(value);
    }

    /// Drop both slots; the next reads go back to the server.
    pub fn invalidate(&mut self) {
        self.active = None;
        self.list = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::ReservationStatus;

    fn reservation(id: &str) -> Reservation {
        Reservation {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            date: "2025/03/10".to_string(),
            time: "09:00".to_string(),
            category: "Visit".to_string(),
            doctor: "Dr. A".to_string(),
            status: ReservationStatus::Pending,
            location: None,
            notes: None,
            created_at: Utc::now(),
            user_document: None,
            doctor_document: None,
        }
    }

    #[test]
    fn test_empty_slots_are_misses() {
        let cache = ReservationCache::new();
        assert!(cache.active().is_none());
        assert!(cache.list().is_none());
    }

    #[test]
    fn test_cached_absence_is_a_hit() {
        let mut cache = ReservationCache::new();
        cache.store_active(None);
        // populated slot holding "no active reservation"
        assert_eq!(cache.active(), Some(&None));
    }

    #[test]
    fn test_invalidate_clears_both_slots() {
        let mut cache = ReservationCache::new();
        cache.store_active(Some(reservation("a")));
        cache.store_list(vec![reservation("a")]);

        cache.invalidate();

        assert!(cache.active().is_none());
        assert!(cache.list().is_none());
    }
}
