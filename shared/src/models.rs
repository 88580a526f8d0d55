//! Reservation domain models and lifecycle rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reservation lifecycle states.
///
/// `Completed` is never set by this core; it is reserved for an
/// administrative backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// Whether this status counts toward the active-reservation projection.
    pub fn is_active(self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "Pending",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Completed => "Completed",
            ReservationStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(ReservationStatus::Pending),
            "Confirmed" => Some(ReservationStatus::Confirmed),
            "Completed" => Some(ReservationStatus::Completed),
            "Cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

/// A document attached to a reservation (patient referral or doctor note).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDocument {
    pub file_name: String,
    pub file_content_encoded: String,
    pub uploaded_at: String,
}

/// A medical-appointment reservation, the sole entity of the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub time: String,
    pub category: String,
    pub doctor: String,
    pub status: ReservationStatus,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_document: Option<ReservationDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_document: Option<ReservationDocument>,
}

/// Select the active reservation: latest `createdAt` among Pending/Confirmed.
///
/// This is a read-time projection. The store may hold several
/// concurrently-active-looking rows (two creates can race); most recent wins.
pub fn select_active(reservations: &[Reservation]) -> Option<&Reservation> {
    reservations
        .iter()
        .filter(|r| r.status.is_active())
        .max_by_key(|r| r.created_at)
}

/// Sort reservations descending by calendar date (most recent first).
///
/// Dates are `YYYY/MM/DD` strings; unparseable dates sort last.
pub fn sort_newest_first(reservations: &mut [Reservation]) {
    reservations.sort_by(|a, b| date_sort_key(&b.date).cmp(&date_sort_key(&a.date)));
}

fn date_sort_key(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
        .ok()
}

/// Create-reservation request body.
///
/// All fields are optional at the wire level; `validate` enforces the
/// required set. A client-supplied `status` is accepted and ignored.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    pub category: Option<String>,
    pub doctor: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl CreateReservationRequest {
    /// Check that every required field is present and non-empty.
    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("date", &self.date),
            ("time", &self.time),
            ("category", &self.category),
            ("doctor", &self.doctor),
        ]
        .iter()
        .any(|(_, value)| value.as_deref().map_or(true, str::is_empty));

        if missing {
            return Err(Error::validation(
                "Missing required fields: date, time, category, doctor",
            ));
        }
        Ok(())
    }
}

/// Which document slot an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSlot {
    User,
    Doctor,
}

impl DocumentSlot {
    /// Attribute name of the slot in the stored item.
    pub fn attribute_name(self) -> &'static str {
        match self {
            DocumentSlot::User => "userDocument",
            DocumentSlot::Doctor => "doctorDocument",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentSlot::User => "user",
            DocumentSlot::Doctor => "doctor",
        }
    }
}

/// Document operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentAction {
    Upload,
    Delete,
}

/// Attach/remove document request body.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub action: Option<String>,
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<ReservationDocument>,
}

impl DocumentRequest {
    /// Build an upload request for the given slot.
    pub fn upload(slot: DocumentSlot, document: ReservationDocument) -> Self {
        Self {
            action: Some("upload".to_string()),
            document_type: Some(slot.as_str().to_string()),
            document: Some(document),
        }
    }

    /// Build a delete request for the given slot.
    pub fn delete(slot: DocumentSlot) -> Self {
        Self {
            action: Some("delete".to_string()),
            document_type: Some(slot.as_str().to_string()),
            document: None,
        }
    }

    /// Validate the request, yielding the parsed action and target slot.
    ///
    /// Each precondition maps to its own error code.
    pub fn validate(&self) -> Result<(DocumentAction, DocumentSlot)> {
        let (action, document_type) = match (&self.action, &self.document_type) {
            (Some(action), Some(document_type)) => (action.as_str(), document_type.as_str()),
            _ => {
                return Err(Error::Validation {
                    code: "MISSING_REQUIRED_DATA",
                    message: "Missing action or document type".to_string(),
                })
            }
        };

        let action = match action {
            "upload" => DocumentAction::Upload,
            "delete" => DocumentAction::Delete,
            _ => {
                return Err(Error::Validation {
                    code: "INVALID_ACTION",
                    message: "Invalid action. Use \"upload\" or \"delete\"".to_string(),
                })
            }
        };

        if action == DocumentAction::Upload && self.document.is_none() {
            return Err(Error::Validation {
                code: "MISSING_DOCUMENT_FOR_UPLOAD",
                message: "Missing document for upload".to_string(),
            });
        }

        let slot = match document_type {
            "user" => DocumentSlot::User,
            "doctor" => DocumentSlot::Doctor,
            _ => {
                return Err(Error::Validation {
                    code: "INVALID_DOCUMENT_TYPE",
                    message: "Invalid document type. Use \"user\" or \"doctor\"".to_string(),
                })
            }
        };

        Ok((action, slot))
    }
}

/// Response of the cancel endpoint (soft-cancel variant).
#[derive(Debug, Serialize, Deserialize)]
pub struct CancelReservationResponse {
    pub message: String,
    pub reservation: Reservation,
}

/// Response of the document endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentUpdateResponse {
    pub message: String,
    pub reservation: Reservation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reservation(id: &str, status: ReservationStatus, created_secs: i64) -> Reservation {
        Reservation {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            date: "2025/03/10".to_string(),
            time: "09:00".to_string(),
            category: "Visit".to_string(),
            doctor: "Dr. A".to_string(),
            status,
            location: None,
            notes: None,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
            user_document: None,
            doctor_document: None,
        }
    }

    #[test]
    fn test_select_active_none_when_no_active_status() {
        let reservations = vec![
            reservation("a", ReservationStatus::Cancelled, 100),
            reservation("b", ReservationStatus::Completed, 200),
        ];
        assert!(select_active(&reservations).is_none());
    }

    #[test]
    fn test_select_active_most_recent_wins() {
        let reservations = vec![
            reservation("a", ReservationStatus::Pending, 100),
            reservation("b", ReservationStatus::Confirmed, 300),
            reservation("c", ReservationStatus::Pending, 200),
            reservation("d", ReservationStatus::Cancelled, 400),
        ];
        assert_eq!(select_active(&reservations).unwrap().id, "b");
    }

    #[test]
    fn test_sort_newest_first() {
        let mut reservations = vec![
            reservation("a", ReservationStatus::Pending, 0),
            reservation("b", ReservationStatus::Pending, 0),
            reservation("c", ReservationStatus::Pending, 0),
        ];
        reservations[0].date = "2025/01/05".to_string();
        reservations[1].date = "2025/11/20".to_string();
        reservations[2].date = "2025/03/10".to_string();

        sort_newest_first(&mut reservations);

        let order: Vec<&str> = reservations.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_create_request_rejects_missing_fields() {
        let request = CreateReservationRequest {
            date: Some("2025/03/10".to_string()),
            time: Some("09:00".to_string()),
            category: None,
            doctor: Some("Dr. A".to_string()),
            ..Default::default()
        };
        let err = request.validate().unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let request = CreateReservationRequest {
            date: Some("2025/03/10".to_string()),
            time: Some("".to_string()),
            category: Some("Visit".to_string()),
            doctor: Some("Dr. A".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_accepts_full_input() {
        let request = CreateReservationRequest {
            date: Some("2025/03/10".to_string()),
            time: Some("09:00".to_string()),
            category: Some("Visit".to_string()),
            doctor: Some("Dr. A".to_string()),
            status: Some("ignored".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_document_request_validation_codes() {
        let err = DocumentRequest::default().validate().unwrap_err();
        assert_eq!(err.code(), "MISSING_REQUIRED_DATA");

        let mut request = DocumentRequest::delete(DocumentSlot::User);
        request.action = Some("archive".to_string());
        assert_eq!(request.validate().unwrap_err().code(), "INVALID_ACTION");

        let mut request = DocumentRequest::delete(DocumentSlot::User);
        request.action = Some("upload".to_string());
        assert_eq!(
            request.validate().unwrap_err().code(),
            "MISSING_DOCUMENT_FOR_UPLOAD"
        );

        let mut request = DocumentRequest::delete(DocumentSlot::User);
        request.document_type = Some("nurse".to_string());
        assert_eq!(
            request.validate().unwrap_err().code(),
            "INVALID_DOCUMENT_TYPE"
        );
    }

    #[test]
    fn test_document_request_validation_ok() {
        let document = ReservationDocument {
            file_name: "referral.pdf".to_string(),
            file_content_encoded: "aGVsbG8=".to_string(),
            uploaded_at: "2025-03-01T10:00:00Z".to_string(),
        };
        let (action, slot) = DocumentRequest::upload(DocumentSlot::Doctor, document)
            .validate()
            .unwrap();
        assert_eq!(action, DocumentAction::Upload);
        assert_eq!(slot, DocumentSlot::Doctor);
        assert_eq!(slot.attribute_name(), "doctorDocument");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ReservationStatus::Pending).unwrap(),
            "\"Pending\""
        );
        assert_eq!(
            ReservationStatus::parse("Cancelled"),
            Some(ReservationStatus::Cancelled)
        );
        assert_eq!(ReservationStatus::parse("active"), None);
        assert!(!ReservationStatus::Cancelled.is_active());
        assert!(ReservationStatus::Confirmed.is_active());
    }
}
