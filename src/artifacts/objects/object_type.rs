use crate::artifacts::objects::OBJECT_HEADER_SEPARATOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Split a stored object into its type tag and payload
    ///
    /// The header is `<type> <decimal length>` terminated by the first NUL byte.
    /// The declared length must match the payload length.
    pub fn split_object(data: &[u8]) -> anyhow::Result<(ObjectType, &[u8])> {
        let nul = data
            .iter()
            .position(|byte| *byte == OBJECT_HEADER_SEPARATOR)
            .ok_or_else(|| anyhow::anyhow!("object header is not NUL-terminated"))?;

        let header = std::str::from_utf8(&data[..nul])?;
        let (object_type, size) = header
            .split_once(' ')
            .ok_or_else(|| anyhow::anyhow!("malformed object header: {header}"))?;
        let size = size
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("malformed object size: {size}"))?;

        let payload = &data[nul + 1..];
        if payload.len() != size {
            anyhow::bail!(
                "object size mismatch: header says {} bytes, found {}",
                size,
                payload.len()
            );
        }

        Ok((ObjectType::try_from(object_type)?, payload))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(anyhow::anyhow!("Invalid object type: {value}")),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
