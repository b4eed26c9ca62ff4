//! Tree object
//!
//! Trees are flattened snapshots: a single mapping from repository-relative
//! path to blob hash. There are no nested sub-trees; one tree describes the
//! whole working directory of a commit.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> blob <hash>\t<path>\n`, sorted by path.
//!
//! The mode is a constant; real file permissions are not tracked.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, pack};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::BufRead;

/// Mode recorded for every tree entry
pub const FILE_MODE: &str = "100644";

/// Flattened snapshot of path -> blob hash
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, ObjectId>,
}

impl Tree {
    pub fn new(entries: BTreeMap<String, ObjectId>) -> Self {
        Tree { entries }
    }

    /// Build a tree from `(path, oid)` pairs such as the index entries
    pub fn build<'e>(entries: impl Iterator<Item = (&'e String, &'e ObjectId)>) -> Self {
        Tree {
            entries: entries
                .map(|(path, oid)| (path.clone(), oid.clone()))
                .collect(),
        }
    }

    pub fn entries(&self) -> &BTreeMap<String, ObjectId> {
        &self.entries
    }

    pub fn get(&self, path: &str) -> Option<&ObjectId> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry lines without the object header
    fn serialize_entries(&self) -> String {
        self.entries
            .iter()
            .map(|(path, oid)| {
                format!(
                    "{} {} {}\t{}\n",
                    FILE_MODE,
                    ObjectType::Blob.as_str(),
                    oid,
                    path
                )
            })
            .collect()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(pack(self.object_type(), self.serialize_entries().as_bytes()))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let (meta, path) = line
                .split_once('\t')
                .with_context(|| format!("Invalid tree entry at line {}", line_number + 1))?;
            let oid = meta
                .split_whitespace()
                .nth(2)
                .with_context(|| format!("Missing object ID at line {}", line_number + 1))?;

            entries.insert(path.to_string(), ObjectId::try_parse(oid.to_string())?);
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn oid(seed: char) -> ObjectId {
        ObjectId::try_parse(seed.to_string().repeat(40)).unwrap()
    }

    #[test]
    fn entries_are_serialized_in_path_order() {
        let mut entries = BTreeMap::new();
        entries.insert("b.txt".to_string(), oid('b'));
        entries.insert("a/z.txt".to_string(), oid('a'));
        entries.insert("a.txt".to_string(), oid('c'));

        let tree = Tree::new(entries);

        assert_eq!(
            tree.serialize_entries(),
            format!(
                "100644 blob {}\ta.txt\n100644 blob {}\ta/z.txt\n100644 blob {}\tb.txt\n",
                oid('c'),
                oid('a'),
                oid('b')
            )
        );
    }

    #[test]
    fn header_counts_entry_bytes() {
        let tree = Tree::new(BTreeMap::from([("a".to_string(), oid('1'))]));
        let serialized = tree.serialize().unwrap();
        let body = tree.serialize_entries();

        assert!(serialized.starts_with(format!("tree {}\0", body.len()).as_bytes()));
    }

    #[test]
    fn payload_parses_back_into_the_same_tree() {
        let tree = Tree::new(BTreeMap::from([
            ("dir/file with spaces.txt".to_string(), oid('d')),
            ("main.rs".to_string(), oid('e')),
        ]));

        let parsed = Tree::deserialize(Cursor::new(tree.serialize_entries())).unwrap();

        assert_eq!(parsed, tree);
    }

    proptest! {
        #[test]
        fn serialized_paths_follow_sorted_order(
            paths in proptest::collection::btree_set("[a-z]{1,6}(/[a-z]{1,6}){0,2}", 1..20)
        ) {
            let tree = Tree::new(paths.iter().map(|p| (p.clone(), oid('f'))).collect());

            let listed = tree
                .serialize_entries()
                .lines()
                .map(|line| line.split_once('\t').unwrap().1.to_string())
                .collect::<Vec<_>>();
            let mut sorted = listed.clone();
            sorted.sort();

            prop_assert_eq!(listed, sorted);
        }
    }
}
