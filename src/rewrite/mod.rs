//! Lambda hoisting for lambdafix.
//!
//! This module handles:
//! - Callback rules (which calls take an inline lambda and how hoisted names look)
//! - Identifier generation for hoisted lambdas
//! - The single-pass rewrite itself

pub mod naming;
pub mod rewriter;
pub mod rules;

pub use naming::{IdentGenerator, RandomIdents};
pub use rewriter::{DEFAULT_INDENT, Hoisted, Rewrite, Rewriter, Skipped, validate_indent};
pub use rules::{CallbackRule, DEFAULT_COMMENT, DEFAULT_PREFIX, default_rules};
