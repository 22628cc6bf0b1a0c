//! ID prefix constants.
//!
//! Every persisted entity gets an ID of the form `{prefix}-{8 hex chars}`,
//! generated by the store (see `keel_db::Repo::generate_id`).

pub const PREFIX_DECISION: &str = "dec";
pub const PREFIX_COMPONENT: &str = "cmp";
pub const PREFIX_DISCUSSION: &str = "dsc";
pub const PREFIX_AUDIT: &str = "aud";

/// All prefixes, for exhaustive ID-generation tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_DECISION,
    PREFIX_COMPONENT,
    PREFIX_DISCUSSION,
    PREFIX_AUDIT,
];
