//! Identifier types shared by every crate in the payments workspace.

mod types;

pub use types::AggregateId;
