//! Content-addressed identifiers.

use sha1::{Digest, Sha1};

/// Separator placed between identifier parts before hashing.
pub const ID_SEPARATOR: &str = "|";

/// Hash ordered string parts into a 40-character lowercase hex identifier.
///
/// The digest is SHA-1 over the UTF-8 bytes of `parts.join("|")`, so the same
/// parts in the same order always produce the same identifier, across runs and
/// across implementations.
pub fn stable_id<S: AsRef<str>>(parts: &[S]) -> String {
    let mut hasher = Sha1::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(ID_SEPARATOR.as_bytes());
        }
        hasher.update(part.as_ref().as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // sha1("abc")
        assert_eq!(
            stable_id(&["abc"]),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_expression_id_fixture() {
        assert_eq!(
            stable_id(&["42", "tmpl_touch_direct", "TOUCH", "INSTANT"]),
            "0727867fa6a6d12d07a5cf64f8376b07972fed5b"
        );
    }

    #[test]
    fn test_parts_are_joined_with_pipe() {
        let joined = stable_id(&["42|tmpl_touch_direct|TOUCH|INSTANT"]);
        let parts = stable_id(&["42", "tmpl_touch_direct", "TOUCH", "INSTANT"]);
        assert_eq!(joined, parts);
        assert_eq!(parts.len(), 40);
        assert!(parts.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_order_matters() {
        assert_ne!(stable_id(&["a", "b"]), stable_id(&["b", "a"]));
        assert_ne!(stable_id(&["ab", "c"]), stable_id(&["a", "bc"]));
    }

    #[test]
    fn test_owned_parts() {
        let parts = vec!["7".to_string(), "x".to_string()];
        assert_eq!(stable_id(&parts), stable_id(&["7", "x"]));
    }
}
