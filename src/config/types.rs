use crate::error::Result;
use crate::rewrite::{
	CallbackRule, DEFAULT_COMMENT, DEFAULT_INDENT, DEFAULT_PREFIX, default_rules, validate_indent,
};
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level configuration from a `.lambdafix.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// If true, stop walking up the directory tree after this file.
	#[serde(default)]
	pub root: bool,

	/// Script to rewrite. Relative paths resolve against the config file's directory.
	pub target: Option<PathBuf>,

	/// Indentation unit for hoisted lambda bodies.
	pub indent: Option<String>,

	/// Write through a temporary file and rename instead of truncating in place.
	pub atomic: Option<bool>,

	/// If true, the built-in rules are not appended after the configured ones.
	#[serde(default)]
	pub replace_default_rules: bool,

	/// Extra callback rules, tried before the built-ins.
	/// Earlier rules win when two match at the same position.
	#[serde(default)]
	pub rules: Vec<Rule>,
}

/// A callback-registration call whose inline lambda gets hoisted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Rule {
	/// Literal call text before `(func():`, e.g. `finished.connect`.
	pub call: String,

	/// Identifier prefix for hoisted lambdas.
	pub prefix: Option<String>,

	/// Comment emitted above the hoisted declaration.
	pub comment: Option<String>,
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Merged configuration from every file in the cascade.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// Most specific `target`, already resolved against its config's directory.
	pub target: Option<PathBuf>,

	/// Most specific `indent`.
	pub indent: Option<String>,

	/// Most specific `atomic`.
	pub atomic: Option<bool>,

	/// Configured rules in cascade order.
	pub rules: Vec<RuleWithSource>,

	/// Whether any config asked to drop the built-in rules.
	pub replace_default_rules: bool,
}

/// A rule with its source config path for debugging/display.
#[derive(Debug, Clone)]
pub struct RuleWithSource {
	/// The rule itself.
	pub rule: Rule,

	/// The config file this rule came from.
	pub source: PathBuf,
}

impl Rule {
	/// The rule with defaults filled in.
	pub fn to_callback_rule(&self) -> CallbackRule {
		CallbackRule::new(
			self.call.clone(),
			self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX),
			self.comment.as_deref().unwrap_or(DEFAULT_COMMENT),
		)
	}

	pub fn validate(&self) -> Result<()> {
		self.to_callback_rule().validate()
	}
}

impl Config {
	/// Validate the indent setting and all rules in this config.
	pub fn validate(&self) -> Result<()> {
		if let Some(ref indent) = self.indent {
			validate_indent(indent)?;
		}
		for rule in &self.rules {
			rule.validate()?;
		}
		Ok(())
	}
}

impl MergedConfig {
	/// Effective rules in priority order: configured rules, then the built-ins.
	pub fn callback_rules(&self) -> Vec<CallbackRule> {
		let mut rules: Vec<CallbackRule> = self
			.rules
			.iter()
			.map(|rws| rws.rule.to_callback_rule())
			.collect();
		if !self.replace_default_rules {
			rules.extend(default_rules());
		}
		rules
	}

	/// Effective indentation unit.
	pub fn indent(&self) -> &str {
		self.indent.as_deref().unwrap_or(DEFAULT_INDENT)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rule_defaults_filled_in() {
		let rule = Rule {
			call: "finished.connect".to_string(),
			..Default::default()
		};
		let callback = rule.to_callback_rule();
		assert_eq!(callback.prefix, DEFAULT_PREFIX);
		assert_eq!(callback.comment, DEFAULT_COMMENT);
	}

	#[test]
	fn test_callback_rules_order() {
		let merged = MergedConfig {
			rules: vec![RuleWithSource {
				rule: Rule {
					call: "finished.connect".to_string(),
					prefix: Some("finished_callback".to_string()),
					comment: None,
				},
				source: PathBuf::from("test.toml"),
			}],
			..Default::default()
		};

		let calls: Vec<_> = merged.callback_rules().into_iter().map(|r| r.call).collect();
		assert_eq!(
			calls,
			vec!["finished.connect", "tween_callback", "timeout.connect", ".connect"]
		);
	}

	#[test]
	fn test_replace_default_rules() {
		let merged = MergedConfig {
			replace_default_rules: true,
			..Default::default()
		};
		assert!(merged.callback_rules().is_empty());
	}

	#[test]
	fn test_default_indent() {
		assert_eq!(MergedConfig::default().indent(), "\t");
	}
}
