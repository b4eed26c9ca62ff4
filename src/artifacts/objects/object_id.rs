//! Object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character lowercase hexadecimal strings. They identify
//! every stored object (blobs, trees, commits).
//!
//! ## Storage
//!
//! Objects are stored in `.gogit/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use std::path::PathBuf;

/// Object identifier (SHA-1 hash)
///
/// A validated 40-character hexadecimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Uppercase hex digits are accepted and normalized to lowercase.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object ID length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object ID characters: {}", id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Convert to the fan-out path used by the object database
    ///
    /// `abc123...` becomes `ab/c123...`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fan_out_path_splits_after_two_characters() {
        let oid = ObjectId::try_parse("e69de29bb2d1d6434b8b29ae775ad8c2e48c5391".to_string())
            .unwrap();

        assert_eq!(
            oid.to_path(),
            PathBuf::from("e6").join("9de29bb2d1d6434b8b29ae775ad8c2e48c5391")
        );
        assert_eq!(oid.to_short_oid(), "e69de29");
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(ObjectId::try_parse("abc".to_string()).is_err());
        assert!(ObjectId::try_parse("z".repeat(40)).is_err());
    }

    #[test]
    fn normalizes_uppercase_hex() {
        let oid = ObjectId::try_parse("E69DE29BB2D1D6434B8B29AE775AD8C2E48C5391".to_string())
            .unwrap();

        assert_eq!(oid.as_ref(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }
}
