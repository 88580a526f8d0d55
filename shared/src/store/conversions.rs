//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and
//! domain types. These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};

use super::keys;
use crate::models::{Reservation, ReservationDocument, ReservationStatus};
use crate::{Error, Result};

/// Entity type marker stored on every reservation item.
pub const ENTITY_TYPE_RESERVATION: &str = "RESERVATION";

/// Convert a Reservation to a DynamoDB item.
pub fn reservation_to_item(reservation: &Reservation) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();

    // Keys
    item.insert(
        "PK".to_string(),
        AttributeValue::S(keys::user_pk(&reservation.user_id)),
    );
    item.insert(
        "SK".to_string(),
        AttributeValue::S(keys::reservation_sk(&reservation.id)),
    );

    // Entity type
    item.insert(
        "entityType".to_string(),
        AttributeValue::S(ENTITY_TYPE_RESERVATION.to_string()),
    );

    // Data
    item.insert("id".to_string(), AttributeValue::S(reservation.id.clone()));
    item.insert(
        "userId".to_string(),
        AttributeValue::S(reservation.user_id.clone()),
    );
    item.insert(
        "date".to_string(),
        AttributeValue::S(reservation.date.clone()),
    );
    item.insert(
        "time".to_string(),
        AttributeValue::S(reservation.time.clone()),
    );
    item.insert(
        "category".to_string(),
        AttributeValue::S(reservation.category.clone()),
    );
    item.insert(
        "doctor".to_string(),
        AttributeValue::S(reservation.doctor.clone()),
    );
    item.insert(
        "status".to_string(),
        AttributeValue::S(reservation.status.as_str().to_string()),
    );
    if let Some(location) = &reservation.location {
        item.insert("location".to_string(), AttributeValue::S(location.clone()));
    }
    if let Some(notes) = &reservation.notes {
        item.insert("notes".to_string(), AttributeValue::S(notes.clone()));
    }
    item.insert(
        "createdAt".to_string(),
        AttributeValue::S(reservation.created_at.to_rfc3339()),
    );
    if let Some(document) = &reservation.user_document {
        item.insert("userDocument".to_string(), document_to_attr(document));
    }
    if let Some(document) = &reservation.doctor_document {
        item.insert("doctorDocument".to_string(), document_to_attr(document));
    }

    item
}

/// Convert a DynamoDB item to a Reservation.
pub fn item_to_reservation(item: &HashMap<String, AttributeValue>) -> Result<Reservation> {
    Ok(Reservation {
        id: get_string(item, "id")?,
        user_id: get_string(item, "userId")?,
        date: get_string(item, "date")?,
        time: get_string(item, "time")?,
        category: get_string(item, "category")?,
        doctor: get_string(item, "doctor")?,
        status: get_status(item)?,
        location: get_optional_string(item, "location"),
        notes: get_optional_string(item, "notes"),
        created_at: get_datetime(item, "createdAt")?,
        user_document: get_optional_document(item, "userDocument")?,
        doctor_document: get_optional_document(item, "doctorDocument")?,
    })
}

/// Convert a document to a DynamoDB map attribute.
pub fn document_to_attr(document: &ReservationDocument) -> AttributeValue {
    let mut map = HashMap::new();
    map.insert(
        "fileName".to_string(),
        AttributeValue::S(document.file_name.clone()),
    );
    map.insert(
        "fileContentEncoded".to_string(),
        AttributeValue::S(document.file_content_encoded.clone()),
    );
    map.insert(
        "uploadedAt".to_string(),
        AttributeValue::S(document.uploaded_at.clone()),
    );
    AttributeValue::M(map)
}

fn attr_to_document(attr: &AttributeValue) -> Result<ReservationDocument> {
    let map = attr
        .as_m()
        .map_err(|_| Error::Store("Document attribute is not a map".to_string()))?;
    Ok(ReservationDocument {
        file_name: get_string(map, "fileName")?,
        file_content_encoded: get_string(map, "fileContentEncoded")?,
        uploaded_at: get_string(map, "uploadedAt")?,
    })
}

fn get_string(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| Error::Store(format!("Missing or invalid attribute: {}", name)))
}

fn get_optional_string(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn get_status(item: &HashMap<String, AttributeValue>) -> Result<ReservationStatus> {
    let raw = get_string(item, "status")?;
    ReservationStatus::parse(&raw)
        .ok_or_else(|| Error::Store(format!("Unknown reservation status: {}", raw)))
}

fn get_datetime(item: &HashMap<String, AttributeValue>, name: &str) -> Result<DateTime<Utc>> {
    let raw = get_string(item, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Store(format!("Invalid {} timestamp: {}", name, e)))
}

fn get_optional_document(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<Option<ReservationDocument>> {
    match item.get(name) {
        Some(attr) => Ok(Some(attr_to_document(attr)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_reservation() -> Reservation {
        Reservation {
            id: "res-1".to_string(),
            user_id: "user-1".to_string(),
            date: "2025/03/10".to_string(),
            time: "09:00".to_string(),
            category: "Visit".to_string(),
            doctor: "Dr. A".to_string(),
            status: ReservationStatus::Pending,
            location: Some("Clinic 3".to_string()),
            notes: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
            user_document: Some(ReservationDocument {
                file_name: "referral.pdf".to_string(),
                file_content_encoded: "aGVsbG8=".to_string(),
                uploaded_at: "2025-03-01T10:05:00Z".to_string(),
            }),
            doctor_document: None,
        }
    }

    #[test]
    fn test_item_keys_and_marker() {
        let item = reservation_to_item(&sample_reservation());
        assert_eq!(item["PK"].as_s().unwrap(), "USER#user-1");
        assert_eq!(item["SK"].as_s().unwrap(), "RESERVATION#res-1");
        assert_eq!(item["entityType"].as_s().unwrap(), ENTITY_TYPE_RESERVATION);
        // absent optionals are not written at all
        assert!(!item.contains_key("notes"));
        assert!(!item.contains_key("doctorDocument"));
    }

    #[test]
    fn test_item_to_reservation() {
        let item = reservation_to_item(&sample_reservation());
        let parsed = item_to_reservation(&item).unwrap();
        assert_eq!(parsed.id, "res-1");
        assert_eq!(parsed.status, ReservationStatus::Pending);
        assert_eq!(parsed.location.as_deref(), Some("Clinic 3"));
        assert_eq!(parsed.notes, None);
        assert_eq!(
            parsed.user_document.unwrap().file_name,
            "referral.pdf"
        );
    }

    #[test]
    fn test_item_missing_attribute_is_store_error() {
        let mut item = reservation_to_item(&sample_reservation());
        item.remove("createdAt");
        let err = item_to_reservation(&item).unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_item_unknown_status_rejected() {
        let mut item = reservation_to_item(&sample_reservation());
        item.insert(
            "status".to_string(),
            AttributeValue::S("active".to_string()),
        );
        assert!(item_to_reservation(&item).is_err());
    }
}
