use std::path::PathBuf;

/// Library-level structured errors for lambdafix.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum LambdaFixError {
	#[error("Failed to read source file: {path}")]
	SourceReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write source file: {path}")]
	SourceWriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid callback rule '{call}': {reason}")]
	InvalidRule { call: String, reason: String },

	#[error("No callback rules configured")]
	NoRules,

	#[error("Invalid indent {indent:?}: only spaces and tabs are allowed")]
	InvalidIndent { indent: String },

	#[error("Invalid callback pattern: {pattern}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using LambdaFixError.
pub type Result<T> = std::result::Result<T, LambdaFixError>;
