use crate::config::parser::parse_config_file;
use crate::config::types::{LoadedConfig, MergedConfig, RuleWithSource};
use crate::error::{LambdaFixError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the config file looked up in every directory.
pub const CONFIG_FILE_NAME: &str = ".lambdafix.toml";

/// Environment variable that, if truthy, skips the ~/.lambdafix.toml lookup.
pub const NO_USER_CONFIG_ENV: &str = "LAMBDAFIX_NO_USER_CONFIG";

/// Discover and load all config files in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for `.lambdafix.toml`
/// 2. If found and `root = true`, stop walking up
/// 3. Otherwise, continue up the directory tree
/// 4. Finally, check ~/.lambdafix.toml (unless `LAMBDAFIX_NO_USER_CONFIG` is set)
///
/// Returns configs in cascade order (most specific first).
pub fn discover_configs(start_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let mut configs = Vec::new();
	let mut current_dir = start_dir.to_path_buf();

	loop {
		let config_path = current_dir.join(CONFIG_FILE_NAME);

		if config_path.exists() {
			let config = parse_config_file(&config_path)?;
			debug!(path = %config_path.display(), root = config.root, "loaded config");
			let root = config.root;

			configs.push(LoadedConfig {
				config,
				path: config_path,
			});

			if root {
				break;
			}
		}

		if let Some(parent) = current_dir.parent() {
			current_dir = parent.to_path_buf();
		} else {
			break;
		}
	}

	if let Some(user_config) = load_user_config(&configs)? {
		configs.push(user_config);
	}

	Ok(configs)
}

/// Load the user's ~/.lambdafix.toml if it exists and isn't disabled.
fn load_user_config(existing_configs: &[LoadedConfig]) -> Result<Option<LoadedConfig>> {
	if is_env_truthy(NO_USER_CONFIG_ENV) {
		return Ok(None);
	}

	let user_config_path = user_config_path()?;

	// Walking up from inside the home directory already picked it up.
	if existing_configs.iter().any(|c| c.path == user_config_path) {
		return Ok(None);
	}

	if user_config_path.exists() {
		let config = parse_config_file(&user_config_path)?;
		debug!(path = %user_config_path.display(), "loaded user config");
		Ok(Some(LoadedConfig {
			config,
			path: user_config_path,
		}))
	} else {
		Ok(None)
	}
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var_name: &str) -> bool {
	match std::env::var(var_name) {
		Ok(value) => {
			let lower = value.to_lowercase();
			!value.is_empty() && lower != "0" && lower != "false" && lower != "no"
		}
		Err(_) => false,
	}
}

/// Merge multiple configs into a single effective config.
///
/// Scalar settings come from the most specific config that sets them.
/// Rules are collected in cascade order.
pub fn merge_configs(configs: &[LoadedConfig]) -> MergedConfig {
	let mut merged = MergedConfig::default();

	for loaded in configs {
		let config = &loaded.config;

		if merged.target.is_none()
			&& let Some(ref target) = config.target
		{
			let base = loaded.path.parent().unwrap_or(Path::new("."));
			merged.target = Some(base.join(target));
		}
		if merged.indent.is_none() {
			merged.indent = config.indent.clone();
		}
		if merged.atomic.is_none() {
			merged.atomic = config.atomic;
		}

		for rule in &config.rules {
			merged.rules.push(RuleWithSource {
				rule: rule.clone(),
				source: loaded.path.clone(),
			});
		}

		if config.replace_default_rules {
			merged.replace_default_rules = true;
		}
	}

	merged
}

/// Convenience function to discover, load, and merge configs from a directory.
pub fn load_merged_config(start_dir: &Path) -> Result<MergedConfig> {
	let configs = discover_configs(start_dir)?;
	Ok(merge_configs(&configs))
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(LambdaFixError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::types::{Config, Rule};
	use std::fs;

	fn loaded(path: &str, config: Config) -> LoadedConfig {
		LoadedConfig {
			config,
			path: PathBuf::from(path),
		}
	}

	fn rule(call: &str) -> Rule {
		Rule {
			call: call.to_string(),
			..Default::default()
		}
	}

	#[test]
	fn test_is_env_truthy() {
		// SAFETY: These env var operations are safe in single-threaded test context
		unsafe {
			std::env::remove_var("TEST_LAMBDAFIX_ENV_1");
			assert!(!is_env_truthy("TEST_LAMBDAFIX_ENV_1"));

			std::env::set_var("TEST_LAMBDAFIX_ENV_2", "");
			assert!(!is_env_truthy("TEST_LAMBDAFIX_ENV_2"));

			std::env::set_var("TEST_LAMBDAFIX_ENV_3", "0");
			assert!(!is_env_truthy("TEST_LAMBDAFIX_ENV_3"));

			std::env::set_var("TEST_LAMBDAFIX_ENV_4", "FALSE");
			assert!(!is_env_truthy("TEST_LAMBDAFIX_ENV_4"));

			std::env::set_var("TEST_LAMBDAFIX_ENV_5", "no");
			assert!(!is_env_truthy("TEST_LAMBDAFIX_ENV_5"));

			std::env::set_var("TEST_LAMBDAFIX_ENV_6", "1");
			assert!(is_env_truthy("TEST_LAMBDAFIX_ENV_6"));

			std::env::set_var("TEST_LAMBDAFIX_ENV_7", "yes");
			assert!(is_env_truthy("TEST_LAMBDAFIX_ENV_7"));

			for i in 1..=7 {
				std::env::remove_var(format!("TEST_LAMBDAFIX_ENV_{}", i));
			}
		}
	}

	#[test]
	fn test_user_config_path() {
		let path = user_config_path().unwrap();
		assert!(path.ends_with(".lambdafix.toml"));
	}

	#[test]
	fn test_merge_most_specific_scalar_wins() {
		let configs = vec![
			loaded(
				"/project/game/.lambdafix.toml",
				Config {
					indent: Some("    ".to_string()),
					..Default::default()
				},
			),
			loaded(
				"/project/.lambdafix.toml",
				Config {
					target: Some(PathBuf::from("scripts/combat_manager.gd")),
					indent: Some("\t".to_string()),
					atomic: Some(true),
					..Default::default()
				},
			),
		];

		let merged = merge_configs(&configs);
		assert_eq!(merged.indent(), "    ");
		assert_eq!(merged.atomic, Some(true));
		assert_eq!(
			merged.target,
			Some(PathBuf::from("/project/scripts/combat_manager.gd"))
		);
	}

	#[test]
	fn test_merge_rules_in_cascade_order() {
		let configs = vec![
			loaded(
				"/a/b/.lambdafix.toml",
				Config {
					rules: vec![rule("first.connect")],
					..Default::default()
				},
			),
			loaded(
				"/a/.lambdafix.toml",
				Config {
					rules: vec![rule("second.connect")],
					replace_default_rules: true,
					..Default::default()
				},
			),
		];

		let merged = merge_configs(&configs);
		let calls: Vec<_> = merged.rules.iter().map(|r| r.rule.call.as_str()).collect();
		assert_eq!(calls, vec!["first.connect", "second.connect"]);
		assert_eq!(merged.rules[1].source, PathBuf::from("/a/.lambdafix.toml"));
		assert!(merged.replace_default_rules);
	}

	#[test]
	fn test_discover_stops_at_root() {
		let temp_dir = tempfile::tempdir().unwrap();
		let outer = temp_dir.path();
		let inner = outer.join("project");
		let nested = inner.join("scripts");
		fs::create_dir_all(&nested).unwrap();

		fs::write(outer.join(CONFIG_FILE_NAME), "indent = \"  \"\n").unwrap();
		fs::write(inner.join(CONFIG_FILE_NAME), "root = true\n").unwrap();
		fs::write(
			nested.join(CONFIG_FILE_NAME),
			"[[rules]]\ncall = \"finished.connect\"\n",
		)
		.unwrap();

		let configs = discover_configs(&nested).unwrap();
		let paths: Vec<_> = configs.iter().map(|c| c.path.clone()).collect();

		assert!(paths.len() >= 2);
		assert_eq!(paths[0], nested.join(CONFIG_FILE_NAME));
		assert_eq!(paths[1], inner.join(CONFIG_FILE_NAME));
		assert!(!paths.contains(&outer.join(CONFIG_FILE_NAME)));
	}

	#[test]
	fn test_discover_propagates_parse_errors() {
		let temp_dir = tempfile::tempdir().unwrap();
		fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "root = [[[").unwrap();

		assert!(matches!(
			discover_configs(temp_dir.path()),
			Err(LambdaFixError::ConfigParseError { .. })
		));
	}
}
