/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate an opaque document id (UUID v4, simple form)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Lower-case and trim an email address for lookups and uniqueness checks
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique_hex() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ama@Example.COM "), "ama@example.com");
    }
}
