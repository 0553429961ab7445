use crate::error::{LambdaFixError, Result};
use crate::rewrite::naming::IdentGenerator;
use crate::rewrite::rules::{CallbackRule, default_rules};
use regex::{Captures, Regex};
use tracing::{debug, warn};

/// Indentation unit used for hoisted bodies unless configured otherwise.
pub const DEFAULT_INDENT: &str = "\t";

/// One inline lambda moved into a named local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hoisted {
	/// The rule call text that matched (e.g. `timeout.connect`).
	pub call: String,

	/// The generated identifier bound to the lambda.
	pub ident: String,

	/// The trimmed lambda body.
	pub body: String,

	/// 1-based line number in the input.
	pub line: usize,
}

/// An inline lambda left in place because its body does not close on the
/// line it opens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
	/// The rule call text in front of the lambda.
	pub call: String,

	/// 1-based line number in the input.
	pub line: usize,
}

/// Result of rewriting a source text.
#[derive(Debug, Clone)]
pub struct Rewrite {
	/// The rewritten text.
	pub text: String,

	/// Every hoisted lambda, in input order.
	pub hoisted: Vec<Hoisted>,

	/// Lambdas that were recognised but could not be hoisted, in input order.
	pub skipped: Vec<Skipped>,
}

impl Rewrite {
	/// Number of lambdas hoisted.
	pub fn count(&self) -> usize {
		self.hoisted.len()
	}

	/// Number of lambdas left untouched.
	pub fn skipped_count(&self) -> usize {
		self.skipped.len()
	}
}

/// Check that `indent` is a non-empty run of spaces and tabs.
pub fn validate_indent(indent: &str) -> Result<()> {
	if indent.is_empty() || !indent.chars().all(|c| c == ' ' || c == '\t') {
		return Err(LambdaFixError::InvalidIndent {
			indent: indent.to_string(),
		});
	}
	Ok(())
}

/// Hoists inline `func():` arguments of callback-registration calls into
/// named local variables.
///
/// All rules are folded into one alternation and applied in a single pass, so
/// text produced by one rewrite is never matched again in the same run. When
/// two rules could match at the same position the earlier rule wins.
#[derive(Debug)]
pub struct Rewriter {
	rules: Vec<CallbackRule>,
	group_names: Vec<String>,
	pattern: Regex,
	opening: Regex,
	reserved: Regex,
	indent: String,
}

impl Rewriter {
	/// Build a rewriter from rules in priority order.
	pub fn new(rules: Vec<CallbackRule>, indent: impl Into<String>) -> Result<Self> {
		let indent = indent.into();
		validate_indent(&indent)?;
		if rules.is_empty() {
			return Err(LambdaFixError::NoRules);
		}
		for rule in &rules {
			rule.validate()?;
		}

		let group_names: Vec<String> = (0..rules.len()).map(|i| format!("rule{}", i)).collect();
		let alternatives: Vec<String> = rules
			.iter()
			.zip(&group_names)
			.map(|(rule, name)| format!("(?P<{}>{})", name, regex::escape(&rule.call)))
			.collect();
		// The body is greedy up to the last `)` on the line, stopping at any `}`.
		let pattern = compile(&format!(
			r"(?:{})\(func\(\):[ \t]*(?P<body>[^}}\n]*)\)",
			alternatives.join("|")
		))?;
		// Any lambda opening, hoistable or not.
		let opening = compile(&format!(r"(?:{})\(func\(\):", alternatives.join("|")))?;

		let mut prefixes: Vec<String> = rules.iter().map(|r| regex::escape(&r.prefix)).collect();
		prefixes.sort();
		prefixes.dedup();
		let reserved = compile(&format!(r"\b(?:{})_[0-9a-f]{{8}}\b", prefixes.join("|")))?;

		Ok(Rewriter {
			rules,
			group_names,
			pattern,
			opening,
			reserved,
			indent,
		})
	}

	/// Rewriter with the built-in rules and tab indentation.
	pub fn with_default_rules() -> Result<Self> {
		Self::new(default_rules(), DEFAULT_INDENT)
	}

	/// The rules this rewriter applies, in priority order.
	pub fn rules(&self) -> &[CallbackRule] {
		&self.rules
	}

	/// Rewrite `source`, drawing identifiers from `idents`.
	///
	/// Lines without a match are copied through unchanged, line endings
	/// included. A matching line gets one declaration block per lambda,
	/// indented like the line itself, inserted above it. Lambdas whose body
	/// runs past the end of the line stay as they are and are reported in
	/// [`Rewrite::skipped`].
	pub fn rewrite(&self, source: &str, idents: &mut dyn IdentGenerator) -> Rewrite {
		for existing in self.reserved.find_iter(source) {
			idents.reserve(existing.as_str());
		}

		let mut text = String::with_capacity(source.len());
		let mut hoisted = Vec::new();
		let mut skipped = Vec::new();

		for (index, line) in source.split_inclusive('\n').enumerate() {
			if !self.opening.is_match(line) {
				text.push_str(line);
				continue;
			}

			let (content, eol) = split_line_ending(line);
			let newline = if eol == "\r\n" { "\r\n" } else { "\n" };
			let indent = &content[..content.len() - content.trim_start_matches([' ', '\t']).len()];
			let mut declarations = String::new();

			let replaced = self.pattern.replace_all(content, |caps: &Captures| {
				let (rule, call) = self.matched_rule(caps);
				let ident = idents.generate(&rule.prefix);
				let body = match caps["body"].trim() {
					"" => "pass",
					body => body,
				};

				declarations.push_str(&format!(
					"{indent}# {comment}{nl}{indent}var {ident} = func():{nl}{indent}{unit}{body}{nl}{nl}",
					comment = rule.comment,
					unit = self.indent,
					nl = newline,
				));
				debug!(line = index + 1, ident = %ident, call = %rule.call, "hoisted inline lambda");

				hoisted.push(Hoisted {
					call: rule.call.clone(),
					ident: ident.clone(),
					body: body.to_string(),
					line: index + 1,
				});

				format!("{}({})", call, ident)
			});

			for caps in self.opening.captures_iter(&replaced) {
				let (rule, _) = self.matched_rule(&caps);
				warn!(
					line = index + 1,
					call = %rule.call,
					"inline lambda not hoisted: its body does not close on the same line"
				);
				skipped.push(Skipped {
					call: rule.call.clone(),
					line: index + 1,
				});
			}

			text.push_str(&declarations);
			text.push_str(&replaced);
			text.push_str(eol);
		}

		Rewrite {
			text,
			hoisted,
			skipped,
		}
	}

	fn matched_rule<'c>(&self, caps: &Captures<'c>) -> (&CallbackRule, &'c str) {
		self.rules
			.iter()
			.zip(&self.group_names)
			.find_map(|(rule, name)| caps.name(name).map(|m| (rule, m.as_str())))
			// Exactly one alternative participates in every match.
			.unwrap_or_else(|| unreachable!("match without a rule group"))
	}
}

fn compile(pattern: &str) -> Result<Regex> {
	Regex::new(pattern).map_err(|source| LambdaFixError::InvalidPattern {
		pattern: pattern.to_string(),
		source,
	})
}

/// Split a line into its content and its terminator (`\r\n`, `\n` or empty).
fn split_line_ending(line: &str) -> (&str, &str) {
	if let Some(content) = line.strip_suffix("\r\n") {
		(content, "\r\n")
	} else if let Some(content) = line.strip_suffix('\n') {
		(content, "\n")
	} else {
		(line, "")
	}
}
