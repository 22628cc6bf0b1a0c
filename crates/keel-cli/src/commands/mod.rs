pub mod audit;
pub mod component;
pub mod decision;
pub mod discussion;
pub mod dispatch;
pub mod link;
pub mod risk;
pub mod shared;
