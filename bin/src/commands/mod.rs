//! CLI command implementations.

pub(crate) mod meta;
pub(crate) mod plan;
pub(crate) mod run;
