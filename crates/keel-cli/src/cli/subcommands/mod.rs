mod component;
mod decision;
mod discussion;
mod link;
mod risk;

pub use component::{CommitCommands, ComponentCommands};
pub use decision::{CreateDecisionArgs, DecisionCommands, UpdateDecisionArgs};
pub use discussion::DiscussionCommands;
pub use link::LinkCommands;
pub use risk::RiskCommands;
