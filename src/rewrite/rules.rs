use crate::error::{LambdaFixError, Result};

/// Prefix used for identifiers when a configured rule does not name one.
pub const DEFAULT_PREFIX: &str = "lambda_callback";

/// Comment used above the declaration when a configured rule does not name one.
pub const DEFAULT_COMMENT: &str = "Create callback function";

/// A callback-registration call whose inline lambda argument gets hoisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackRule {
	/// Literal call text preceding `(func():`, e.g. `tween_callback` or `.connect`.
	pub call: String,

	/// Identifier prefix; the generated name is `<prefix>_<8 hex chars>`.
	pub prefix: String,

	/// Text of the `#` comment emitted above the declaration.
	pub comment: String,
}

impl CallbackRule {
	pub fn new(
		call: impl Into<String>,
		prefix: impl Into<String>,
		comment: impl Into<String>,
	) -> Self {
		CallbackRule {
			call: call.into(),
			prefix: prefix.into(),
			comment: comment.into(),
		}
	}

	/// Check that the rule can be turned into a pattern and a valid identifier.
	pub fn validate(&self) -> Result<()> {
		if self.call.trim().is_empty() {
			return Err(self.invalid("call must not be empty"));
		}
		if self.call.contains('\n') || self.comment.contains('\n') {
			return Err(self.invalid("call and comment must fit on a single line"));
		}
		if !is_identifier(&self.prefix) {
			return Err(self.invalid(&format!(
				"prefix '{}' is not a valid identifier",
				self.prefix
			)));
		}
		Ok(())
	}

	fn invalid(&self, reason: &str) -> LambdaFixError {
		LambdaFixError::InvalidRule {
			call: self.call.clone(),
			reason: reason.to_string(),
		}
	}
}

/// The built-in rules, in priority order.
///
/// `timeout.connect` sits ahead of the generic `.connect` so timer callbacks
/// keep their own prefix.
pub fn default_rules() -> Vec<CallbackRule> {
	vec![
		CallbackRule::new("tween_callback", "lambda_callback", "Create callback function"),
		CallbackRule::new(
			"timeout.connect",
			"timeout_callback",
			"Create timeout callback function",
		),
		CallbackRule::new(
			".connect",
			"connect_callback",
			"Create connect callback function",
		),
	]
}

fn is_identifier(s: &str) -> bool {
	let mut chars = s.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
