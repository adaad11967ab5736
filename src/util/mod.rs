//! Utility helpers shared across modules

use uuid::Uuid;

/// Returns an 8-character lowercase hex suffix for uniquifying names
///
/// Used for repository name collisions and platform app names.
pub fn short_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_is_eight_hex_chars() {
        let suffix = short_suffix();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_suffixes_are_unique() {
        let a = short_suffix();
        let b = short_suffix();
        assert_ne!(a, b);
    }
}
