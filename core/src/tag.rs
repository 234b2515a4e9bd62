use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("The release '{0}' is empty once sanitized and cannot be used in a tag.")]
	EmptyRelease(String),
}

/// Make a raw version string safe to use as part of an image tag.
///
/// Whitespace is removed, then anything outside `[A-Za-z0-9_.-]` becomes `-`.
#[must_use]
pub fn sanitize(raw: &str) -> String {
	raw.chars()
		.filter(|c| !c.is_whitespace())
		.map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
				c
			} else {
				'-'
			}
		})
		.collect()
}

/// A `name-release` tag derived from the selected implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTag {
	impl_name: String,
	release: String,
}

impl DerivedTag {
	/// Build a tag from an implementation name and an unsanitized release.
	///
	/// # Errors
	///
	/// Returns an error if nothing is left of the release after sanitizing it.
	pub fn new(impl_name: &str, release: &str) -> Result<Self, Error> {
		let sanitized = sanitize(release);
		if sanitized.is_empty() {
			return Err(Error::EmptyRelease(release.to_string()));
		}

		Ok(Self {
			impl_name: impl_name.to_string(),
			release: sanitized,
		})
	}

	#[must_use]
	pub fn release(&self) -> &str {
		&self.release
	}
}

impl fmt::Display for DerivedTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.impl_name, self.release)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn is_tag_safe(value: &str) -> bool {
		!value.is_empty()
			&& value
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
	}

	#[test]
	fn strips_whitespace_from_queried_versions() {
		assert_eq!(sanitize("2.5.5\n"), "2.5.5");
		assert_eq!(sanitize("  1.12.2 \r\n"), "1.12.2");
		assert_eq!(sanitize("2 . 3\t7"), "2.37");
	}

	#[test]
	fn replaces_unsafe_characters() {
		assert_eq!(sanitize("24.5.10+git"), "24.5.10-git");
		assert_eq!(sanitize("Version 1.12.2 (LinuxX8664)"), "Version1.12.2-LinuxX8664-");
		assert_eq!(sanitize("2.3.7/x86:64"), "2.3.7-x86-64");
		assert_eq!(sanitize("λ1.0"), "-1.0");
	}

	#[test]
	fn sanitize_is_idempotent_and_tag_safe() {
		let inputs = [
			"2.5.5\n",
			"24.5.10",
			"Version 1.12.2 (LinuxX8664)",
			"a/b:c@d",
			"ünïcödé 1.0",
			"__--..",
			"\t9\n",
		];

		for input in inputs {
			let once = sanitize(input);

			assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
			assert!(is_tag_safe(&once), "{once:?} is not tag safe");
		}
	}

	#[test]
	fn derives_name_dash_release() {
		let tag = DerivedTag::new("sbcl-bin", "2.3.7").unwrap();
		assert_eq!(tag.to_string(), "sbcl-bin-2.3.7");

		let tag = DerivedTag::new("sbcl-bin", "2.5.5\n").unwrap();
		assert_eq!(tag.release(), "2.5.5");
		assert_eq!(tag.to_string(), "sbcl-bin-2.5.5");
	}

	#[test]
	fn rejects_releases_that_sanitize_to_nothing() {
		assert_eq!(
			DerivedTag::new("ccl-bin", " \n"),
			Err(Error::EmptyRelease(" \n".to_string()))
		);
	}
}
