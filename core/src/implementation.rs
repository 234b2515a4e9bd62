use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("The implementation spec cannot be empty.")]
	Empty,

	#[error("The implementation spec '{0}' is missing an implementation name.")]
	MissingName(String),
}

/// A Roswell implementation selector, either `name` or `name/version`.
///
/// The raw string is what gets passed to the image build; the name and version
/// are only used to derive a tag for the resulting image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplSpec {
	raw: String,
	name: String,
	version: Option<String>,
}

impl ImplSpec {
	/// Parse an implementation spec.
	///
	/// # Errors
	///
	/// Returns an error if the spec is empty or has nothing before the `/`.
	pub fn parse(raw: &str) -> Result<Self, Error> {
		if raw.trim().is_empty() {
			return Err(Error::Empty);
		}

		let (name, version) = match raw.split_once('/') {
			Some((name, version)) => (name, Some(version)),
			None => (raw, None),
		};

		if name.is_empty() {
			return Err(Error::MissingName(raw.to_string()));
		}

		Ok(Self {
			raw: raw.to_string(),
			name: name.to_string(),
			// `sbcl-bin/` pins nothing, so it behaves like a bare name.
			version: version.filter(|v| !v.is_empty()).map(ToString::to_string),
		})
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The pinned version, if the spec has one.
	#[must_use]
	pub fn version(&self) -> Option<&str> {
		self.version.as_deref()
	}
}

impl FromStr for ImplSpec {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for ImplSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bare_name_has_no_version() {
		let spec = ImplSpec::parse("sbcl-bin").unwrap();

		assert_eq!(spec.name(), "sbcl-bin");
		assert_eq!(spec.version(), None);
		assert_eq!(spec.as_str(), "sbcl-bin");
	}

	#[test]
	fn splits_on_the_first_slash_only() {
		let spec: ImplSpec = "ecl/24.5.10/extra".parse().unwrap();

		assert_eq!(spec.name(), "ecl");
		assert_eq!(spec.version(), Some("24.5.10/extra"));
		assert_eq!(spec.to_string(), "ecl/24.5.10/extra");
	}

	#[test]
	fn trailing_slash_is_treated_as_unpinned() {
		let spec = ImplSpec::parse("ccl-bin/").unwrap();

		assert_eq!(spec.name(), "ccl-bin");
		assert_eq!(spec.version(), None);
		assert_eq!(spec.as_str(), "ccl-bin/");
	}

	#[test]
	fn rejects_empty_and_nameless_specs() {
		assert_eq!(ImplSpec::parse(""), Err(Error::Empty));
		assert_eq!(ImplSpec::parse("  "), Err(Error::Empty));
		assert_eq!(
			ImplSpec::parse("/2.3.7"),
			Err(Error::MissingName("/2.3.7".to_string()))
		);
	}
}
