//! Branch names and symbolic ref names

pub mod branch_name;

/// Characters and sequences a ref name may not contain
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

/// Directory (relative to the metadata dir) holding branch refs
pub const REF_PREFIX: &str = "refs/heads/";
