//! Declared effects: type/subtype tables and animation nodes.

/// Effect type and subtype tables.
pub mod filter;
/// Timeline nodes and their activities.
pub mod node;
