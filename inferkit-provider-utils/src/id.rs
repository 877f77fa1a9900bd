//! Id generation for stream blocks and tool calls.

/// Generate a unique id with the given prefix, e.g. `text-5f1a…`.
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let first = generate_id("text");
        let second = generate_id("text");
        assert!(first.starts_with("text-"));
        assert_ne!(first, second);
    }
}
