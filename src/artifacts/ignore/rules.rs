use crate::artifacts::ignore::IgnorePredicate;
use anyhow::Context;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Name of the ignore file at the repository root
pub const IGNORE_FILE_NAME: &str = ".gogitignore";

/// Patterns written to a fresh ignore file
pub const DEFAULT_IGNORE_PATTERNS: [&str; 2] = [".gogit", ".git"];

/// Gitignore-style rules: `#` comments, `!` negation, trailing `/` for
/// directories only, last matching pattern wins
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    matcher: Gitignore,
}

impl IgnoreRules {
    /// Rules from `<root>/.gogitignore`; no file means nothing is ignored
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let ignore_path = root.join(IGNORE_FILE_NAME);
        let mut builder = GitignoreBuilder::new(root);

        if ignore_path.is_file()
            && let Some(err) = builder.add(&ignore_path)
        {
            return Err(err)
                .with_context(|| format!("Unable to parse ignore file {}", ignore_path.display()));
        }

        let matcher = builder
            .build()
            .with_context(|| format!("Unable to build ignore rules for {}", root.display()))?;

        Ok(IgnoreRules { matcher })
    }

    pub fn from_patterns<'a>(
        root: &Path,
        patterns: impl IntoIterator<Item = &'a str>,
    ) -> anyhow::Result<Self> {
        let mut builder = GitignoreBuilder::new(root);

        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .with_context(|| format!("Invalid ignore pattern '{}'", pattern))?;
        }

        Ok(IgnoreRules {
            matcher: builder.build()?,
        })
    }

    pub fn len(&self) -> usize {
        self.matcher.num_ignores() as usize + self.matcher.num_whitelists() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IgnorePredicate for IgnoreRules {
    fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
    }
}
