use std::io;

use crate::{
	docker::{self, BuildFailure},
	options::ValidationError,
};

/// Everything that can end an invocation early.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error(transparent)]
	Environment(docker::Error),

	#[error("Could not determine the build context: {0}")]
	Context(#[source] io::Error),

	#[error(transparent)]
	Build(BuildFailure),

	#[error("Interrupted")]
	Interrupted,
}

impl Error {
	/// The process exit code for this error.
	#[must_use]
	pub const fn exit_code(&self) -> i32 {
		match self {
			Self::Validation(_) => 2,
			Self::Environment(_) | Self::Context(_) => 3,
			Self::Build(_) => 4,
			Self::Interrupted => 130,
		}
	}
}

impl From<BuildFailure> for Error {
	fn from(e: BuildFailure) -> Self {
		match e {
			BuildFailure::Engine(docker::Error::Interrupted) => Self::Interrupted,
			e => Self::Build(e),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn each_kind_has_its_own_exit_code() {
		assert_eq!(
			Error::from(ValidationError::MissingRequired("--impl")).exit_code(),
			2
		);
		assert_eq!(Error::Environment(docker::Error::NotRunning).exit_code(), 3);
		assert_eq!(
			Error::from(BuildFailure::Engine(docker::Error::Failed {
				action: "build image",
				code: Some(1),
			}))
			.exit_code(),
			4
		);
	}

	#[test]
	fn interrupted_builds_are_not_build_failures() {
		let err = Error::from(BuildFailure::Engine(docker::Error::Interrupted));

		assert!(matches!(err, Error::Interrupted));
		assert_eq!(err.exit_code(), 130);
	}

	#[test]
	fn messages_are_single_lines() {
		let errors = [
			Error::from(ValidationError::UnknownOption("--bogus".to_string())),
			Error::Environment(docker::Error::NotRunning),
			Error::from(BuildFailure::ImageId(anyhow::anyhow!("no id"))),
			Error::from(BuildFailure::Engine(docker::Error::Command(format!(
				"Failed to query the implementation version: {}",
				docker::stderr_summary(b"Unhandled SIMPLE-ERROR in thread main:\n  ros: implementation not installed\n")
			)))),
			Error::from(ValidationError::InvalidUtf8("caf\u{fffd}".to_string())),
		];

		for err in errors {
			assert!(!err.to_string().contains('\n'), "{err} spans lines");
		}
	}
}
