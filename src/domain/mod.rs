//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: Rich domain types (validated, business-logic-ready)
//! - `wire.rs`: Raw serde structs matching exchange responses
//! - `convert.rs`: `TryFrom`/`From` conversions with validation
//! - `client.rs`: Sub-client with HTTP methods
//!
//! `validation` has no wire side: it turns user input plus cached symbol
//! rules into an accepted order or a rejection.

pub mod market;
pub mod order;
pub mod symbol;
pub mod validation;
