//! DynamoDB reservation store.
//!
//! Single-table layout: `PK = USER#<userId>`, `SK = RESERVATION#<id>`, with
//! denormalized reservation attributes. Each handler performs at most one
//! read followed by at most one write; per-key atomicity is the store's.

mod conversions;
mod keys;

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;

use crate::models::{DocumentSlot, Reservation, ReservationDocument, ReservationStatus};
use crate::{Error, Result};

pub use conversions::{item_to_reservation, reservation_to_item};

/// Filters applied server-side when listing reservations.
#[derive(Debug, Default, Clone)]
pub struct ListFilters {
    pub status: Option<String>,
    pub date: Option<String>,
}

/// DynamoDB-backed reservation store.
pub struct ReservationStore {
    client: Client,
    table_name: String,
}

impl ReservationStore {
    /// Create a store with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Create a store from the default AWS credential chain and [`Config`].
    ///
    /// [`Config`]: crate::Config
    pub async fn from_config(config: &crate::Config) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&aws_config);
        Self::new(client, config.table_name.clone())
    }

    /// Persist a new reservation.
    ///
    /// Unconditional put: two concurrent creates for the same user both
    /// succeed, and the active-reservation projection resolves the winner at
    /// read time.
    pub async fn create(&self, reservation: &Reservation) -> Result<()> {
        let item = reservation_to_item(reservation);

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| Error::Store(format!("PutItem failed: {}", e)))?;

        Ok(())
    }

    /// Fetch a single reservation by composite key.
    pub async fn get(&self, user_id: &str, reservation_id: &str) -> Result<Option<Reservation>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(keys::user_pk(user_id)))
            .key("SK", AttributeValue::S(keys::reservation_sk(reservation_id)))
            .send()
            .await
            .map_err(|e| Error::Store(format!("GetItem failed: {}", e)))?;

        match result.item {
            Some(item) => Ok(Some(item_to_reservation(&item)?)),
            None => Ok(None),
        }
    }

    /// Query all reservations in a user's partition, with optional
    /// exact-match filters applied server-side.
    pub async fn list(&self, user_id: &str, filters: &ListFilters) -> Result<Vec<Reservation>> {
        let mut query = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("PK = :pk AND begins_with(SK, :sk)")
            .expression_attribute_values(":pk", AttributeValue::S(keys::user_pk(user_id)))
            .expression_attribute_values(
                ":sk",
                AttributeValue::S(keys::reservation_sk_prefix().to_string()),
            );

        // "status" and "date" are DynamoDB reserved words, hence the
        // expression attribute names.
        let mut filter_expressions = Vec::new();
        if let Some(status) = &filters.status {
            filter_expressions.push("#status = :status");
            query = query
                .expression_attribute_names("#status", "status")
                .expression_attribute_values(":status", AttributeValue::S(status.clone()));
        }
        if let Some(date) = &filters.date {
            filter_expressions.push("#date = :date");
            query = query
                .expression_attribute_names("#date", "date")
                .expression_attribute_values(":date", AttributeValue::S(date.clone()));
        }
        if !filter_expressions.is_empty() {
            query = query.filter_expression(filter_expressions.join(" AND "));
        }

        let result = query
            .send()
            .await
            .map_err(|e| Error::Store(format!("Query failed: {}", e)))?;

        let items = result.items.unwrap_or_default();
        items.iter().map(item_to_reservation).collect()
    }

    /// Flip a reservation's status to `Cancelled`, returning the updated
    /// record. The caller is responsible for the existence/ownership check.
    pub async fn cancel(&self, user_id: &str, reservation_id: &str) -> Result<Reservation> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(keys::user_pk(user_id)))
            .key("SK", AttributeValue::S(keys::reservation_sk(reservation_id)))
            .update_expression("SET #status = :status")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(
                ":status",
                AttributeValue::S(ReservationStatus::Cancelled.as_str().to_string()),
            )
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| Error::Store(format!("UpdateItem failed: {}", e)))?;

        updated_attributes(result.attributes)
    }

    /// Overwrite one document slot, returning the updated record.
    pub async fn set_document(
        &self,
        user_id: &str,
        reservation_id: &str,
        slot: DocumentSlot,
        document: &ReservationDocument,
    ) -> Result<Reservation> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(keys::user_pk(user_id)))
            .key("SK", AttributeValue::S(keys::reservation_sk(reservation_id)))
            .update_expression(format!("SET {} = :document", slot.attribute_name()))
            .expression_attribute_values(":document", conversions::document_to_attr(document))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| Error::Store(format!("UpdateItem failed: {}", e)))?;

        updated_attributes(result.attributes)
    }

    /// Clear one document slot entirely, returning the updated record.
    pub async fn remove_document(
        &self,
        user_id: &str,
        reservation_id: &str,
        slot: DocumentSlot,
    ) -> Result<Reservation> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(keys::user_pk(user_id)))
            .key("SK", AttributeValue::S(keys::reservation_sk(reservation_id)))
            .update_expression(format!("REMOVE {}", slot.attribute_name()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| Error::Store(format!("UpdateItem failed: {}", e)))?;

        updated_attributes(result.attributes)
    }
}

fn updated_attributes(
    attributes: Option<HashMap<String, AttributeValue>>,
) -> Result<Reservation> {
    let item =
        attributes.ok_or_else(|| Error::Store("UpdateItem returned no attributes".to_string()))?;
    item_to_reservation(&item)
}
