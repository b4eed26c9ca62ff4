//! Commit object
//!
//! Commits link a tree snapshot to its single parent and record who made the
//! snapshot, when, and why. History is a singly-linked list per branch.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>        (absent for the root commit)
//! author <name> <<email>>
//! date <RFC-3339 UTC timestamp>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::{Object, Packable, Unpackable, pack};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::BufRead;

/// Author information (`Name <email>`)
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
}

impl Author {
    pub fn new(name: String, email: String) -> Self {
        Author { name, email }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// String in format "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let email_start = value
            .rfind('<')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '<'"))?;
        let email_end = value
            .rfind('>')
            .filter(|end| *end > email_start)
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '>'"))?;

        Ok(Author {
            name: value[..email_start].trim().to_string(),
            email: value[email_start + 1..email_end].to_string(),
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parent: Option<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    date: DateTime<Utc>,
    message: String,
}

impl Commit {
    /// Create a commit stamped with the current time
    ///
    /// The timestamp is truncated to whole seconds, matching what the
    /// serialized form can represent.
    pub fn new(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        let now = Utc::now();
        let date = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);

        Self::new_with_date(parent, tree_oid, author, date, message)
    }

    pub fn new_with_date(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        date: DateTime<Utc>,
        message: String,
    ) -> Self {
        Commit {
            parent,
            tree_oid,
            author,
            date,
            message,
        }
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn date(&self) -> &DateTime<Utc> {
        &self.date
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the message
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    /// Timestamp like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.date.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }

    /// Header lines, a blank line, then the message
    fn body(&self) -> String {
        let mut body = format!("tree {}\n", self.tree_oid);
        if let Some(parent) = &self.parent {
            body.push_str(&format!("parent {}\n", parent));
        }
        body.push_str(&format!("author {}\n", self.author.display_name()));
        body.push_str(&format!(
            "date {}\n",
            self.date.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        body.push_str(&format!("\n{}\n", self.message));

        body
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(pack(self.object_type(), self.body().as_bytes()))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut lines = reader.lines();

        let mut tree_oid = None;
        let mut parent = None;
        let mut author = None;
        let mut date = None;

        for line in lines.by_ref() {
            let line = line?;
            if line.is_empty() {
                break;
            }

            let (key, value) = line
                .split_once(' ')
                .with_context(|| format!("Invalid commit header line: {line}"))?;
            match key {
                "tree" => tree_oid = Some(ObjectId::try_parse(value.to_string())?),
                "parent" => parent = Some(ObjectId::try_parse(value.to_string())?),
                "author" => author = Some(Author::try_from(value)?),
                "date" => {
                    date = Some(
                        DateTime::parse_from_rfc3339(value)
                            .with_context(|| format!("Invalid commit date: {value}"))?
                            .with_timezone(&Utc),
                    )
                }
                _ => anyhow::bail!("Unknown commit header: {key}"),
            }
        }

        let message = lines.collect::<Result<Vec<_>, _>>()?.join("\n");

        Ok(Commit {
            parent,
            tree_oid: tree_oid.context("Commit is missing its tree")?,
            author: author.context("Commit is missing its author")?,
            date: date.context("Commit is missing its date")?,
            message,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
