//! Ignore predicates
//!
//! The staging pipeline and the working-directory snapshot only ask one
//! question of an ignore source: is this repository-relative path ignored?
//! Paths always use `/` separators.

pub mod rules;

/// Decides whether a repository-relative path is excluded from tracking
pub trait IgnorePredicate: Send + Sync {
    fn is_ignored(&self, path: &str, is_dir: bool) -> bool;
}

impl<F> IgnorePredicate for F
where
    F: Fn(&str, bool) -> bool + Send + Sync,
{
    fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        self(path, is_dir)
    }
}

/// Tracks everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIgnore;

impl IgnorePredicate for NoIgnore {
    fn is_ignored(&self, _path: &str, _is_dir: bool) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_predicates() {
        let predicate: Box<dyn IgnorePredicate> =
            Box::new(|path: &str, is_dir: bool| is_dir && path == "target");

        assert!(predicate.is_ignored("target", true));
        assert!(!predicate.is_ignored("target", false));
        assert!(!NoIgnore.is_ignored("target", true));
    }
}
