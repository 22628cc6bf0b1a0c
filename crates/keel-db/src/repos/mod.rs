//! Repository modules implementing storage operations for all Keel entities.
//!
//! Each module adds methods to [`Repo`](crate::Repo) via `impl Repo` blocks.
//! Repositories only read and write rows; status rules, cross-project checks
//! and audit entries are decided by the caller inside the same transaction.

pub mod audit;
pub mod commit;
pub mod component;
pub mod decision;
pub mod discussion;
pub mod link;
