//! Key construction for the single-table layout.
//!
//! Partition key scopes every item to its owner; the sort key prefix marks
//! reservation items. Ownership checks still happen explicitly on the
//! fetched item, not only through key shape.

/// Partition key for a user's items.
pub fn user_pk(user_id: &str) -> String {
    format!("USER#{}", user_id)
}

/// Sort key for a reservation item.
pub fn reservation_sk(reservation_id: &str) -> String {
    format!("RESERVATION#{}", reservation_id)
}

/// Sort key prefix selecting all reservation items in a partition.
pub fn reservation_sk_prefix() -> &'static str {
    "RESERVATION#"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shapes() {
        assert_eq!(user_pk("abc"), "USER#abc");
        assert_eq!(reservation_sk("42"), "RESERVATION#42");
        assert!(reservation_sk("42").starts_with(reservation_sk_prefix()));
    }
}
