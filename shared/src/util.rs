use uuid::Uuid;

/// Parse a UUID from user input, tolerating surrounding whitespace
pub fn parse_uuid(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}
