//! # keel-core
//!
//! Core types and ID prefixes for Keel.
//!
//! This crate provides the foundational types shared across all Keel crates:
//! - Entity structs for persisted domain objects (decisions, components, links,
//!   commit tags, discussion threads, audit entries)
//! - Status enums with state machine transitions
//! - ID prefix constants
//! - Audit detail sub-types
//! - Derived risk metrics returned by risk queries

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod ids;
pub mod metrics;
