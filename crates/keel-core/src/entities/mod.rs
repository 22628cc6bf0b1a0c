//! Entity structs for all persisted Keel domain objects.
//!
//! Each entity maps to a table in the libSQL database (see `keel-db` migrations).
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON output
//! and schema validation.

mod audit;
mod commit;
mod component;
mod decision;
mod discussion;
mod link;

pub use audit::AuditEntry;
pub use commit::CommitTag;
pub use component::Component;
pub use decision::DecisionRecord;
pub use discussion::DiscussionThread;
pub use link::ComponentDecisionLink;
