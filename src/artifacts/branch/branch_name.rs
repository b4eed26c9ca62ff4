use crate::artifacts::branch::{INVALID_BRANCH_NAME_REGEX, REF_PREFIX};
use crate::errors::RepositoryError;
use anyhow::Context;
use derive_new::new;

/// Ref path relative to the metadata directory, e.g. `refs/heads/main`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, new)]
pub struct SymRefName(String);

impl SymRefName {
    pub fn as_ref_path(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SymRefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            return Err(RepositoryError::InvalidBranchName(name).into());
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Err(RepositoryError::InvalidBranchName(name).into())
        } else {
            Ok(Self(name))
        }
    }

    /// Branch named by a `refs/heads/<name>` symbolic ref
    pub fn try_parse_sym_ref_name(sym_ref_name: &SymRefName) -> anyhow::Result<Self> {
        let name = sym_ref_name.0.strip_prefix(REF_PREFIX).with_context(|| {
            format!(
                "symbolic ref name must start with '{}', got '{}'",
                REF_PREFIX, sym_ref_name.0
            )
        })?;

        Self::try_parse(name.to_string())
    }

    pub fn to_sym_ref_name(&self) -> SymRefName {
        SymRefName::new(format!("{}{}", REF_PREFIX, self.0))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
