/// Generate a template `.lambdafix.toml` for `--init`.
pub fn generate_init_template() -> String {
	r#"# lambdafix configuration
# Configs are discovered from the current directory upward, then ~/.lambdafix.toml.

# Stop looking in parent directories after this file.
root = true

# Script rewritten when no path is given on the command line.
target = "combat_manager.gd"

# Indentation unit for hoisted lambda bodies.
indent = "\t"

# Write through a temporary file and rename it over the target.
atomic = false

# Set to true to use only the rules below, without the built-in
# tween_callback / timeout.connect / .connect rules.
replace-default-rules = false

# Extra rules are tried before the built-ins.
# [[rules]]
# call = "finished.connect"
# prefix = "finished_callback"
# comment = "Create finished callback function"
"#
	.to_string()
}
