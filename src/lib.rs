//! Lambdafix - hoist inline lambda callbacks in game scripts into named locals.
//!
//! Some engine script dialects reject an anonymous `func():` passed straight
//! into a callback registration such as `tween_callback(...)` or
//! `signal.connect(...)`. This library rewrites each such call so the lambda
//! is bound to a local variable declared just above the statement:
//! - Callback rules and the single-pass rewriter
//! - Identifier generation
//! - Configuration file parsing and cascade discovery
//! - Reading and writing the target script
//!
//! # Example
//!
//! ```
//! use lambdafix_cli::rewrite::{RandomIdents, Rewriter};
//!
//! let rewriter = Rewriter::with_default_rules().unwrap();
//! let source = "\ttimeout.connect(func(): print(\"hi\"))\n";
//! let result = rewriter.rewrite(source, &mut RandomIdents::new());
//!
//! assert_eq!(result.count(), 1);
//! assert!(result.text.contains("var timeout_callback_"));
//! ```

pub mod config;
pub mod error;
pub mod file;
pub mod rewrite;

pub use error::{LambdaFixError, Result};
