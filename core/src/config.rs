use std::{env, path::PathBuf};

/// Toggles the BuildKit builder. Exported to the build process as `0` or `1`.
pub const BUILDKIT_VAR: &str = "DOCKER_BUILDKIT";
/// Set by Emacs for its subprocesses, where verbose docker output is known to hang.
pub const EMACS_MARKER_VAR: &str = "INSIDE_EMACS";
/// Overrides the build context directory.
pub const CONTEXT_VAR: &str = "CLBUILD_CONTEXT";
/// Overrides the engine executable.
pub const ENGINE_VAR: &str = "DOCKER";

/// Settings resolved once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub buildkit: bool,
	pub engine: String,
	pub context: Option<PathBuf>,
	pub inside_emacs: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			buildkit: false,
			engine: "docker".to_string(),
			context: None,
			inside_emacs: false,
		}
	}
}

impl Config {
	#[must_use]
	pub fn from_env() -> Self {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Resolve the configuration using `lookup` in place of the process environment.
	#[must_use]
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let defaults = Self::default();

		Self {
			buildkit: lookup(BUILDKIT_VAR)
				.as_deref()
				.and_then(parse_bool)
				.unwrap_or(defaults.buildkit),
			engine: lookup(ENGINE_VAR)
				.filter(|engine| !engine.trim().is_empty())
				.unwrap_or(defaults.engine),
			context: lookup(CONTEXT_VAR)
				.filter(|path| !path.is_empty())
				.map(PathBuf::from),
			inside_emacs: lookup(EMACS_MARKER_VAR).is_some(),
		}
	}
}

/// Parse a boolean-like environment value. Returns `None` for anything unrecognized.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" | "" => Some(false),
		_ => None,
	}
}
