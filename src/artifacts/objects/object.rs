use crate::artifacts::objects::OBJECT_HEADER_SEPARATOR;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;

/// Produces the header-tagged on-disk form of an object
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Rebuilds an object from its payload (the header has already been stripped)
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Serialize once and hash the result
    fn hash_object(&self) -> Result<(ObjectId, Bytes)> {
        let content = self.serialize()?;
        let mut hasher = Sha1::new();
        hasher.update(&content);

        let oid = hasher.finalize();
        Ok((ObjectId::try_parse(format!("{oid:x}"))?, content))
    }

    fn object_id(&self) -> Result<ObjectId> {
        Ok(self.hash_object()?.0)
    }
}

/// Prefix `content` with `<type> <len>\0`
pub fn pack(object_type: ObjectType, content: &[u8]) -> Bytes {
    let header = format!("{} {}", object_type.as_str(), content.len());

    let mut object_bytes = Vec::with_capacity(header.len() + 1 + content.len());
    object_bytes.extend_from_slice(header.as_bytes());
    object_bytes.push(OBJECT_HEADER_SEPARATOR);
    object_bytes.extend_from_slice(content);

    Bytes::from(object_bytes)
}
