use clap::{
	builder::NonEmptyStringValueParser,
	error::{ContextKind, ContextValue, ErrorKind},
	CommandFactory, Parser,
};
use clbuild_core::{implementation, tag, DerivedTag, ImplSpec, DEFAULT_IMAGE_NAME};
use indoc::indoc;
use std::ffi::OsString;

const AFTER_HELP: &str = indoc! {"
	Examples:
	  clbuild --impl sbcl-bin/2.3.7          # tagged cl-amazon-linux:sbcl-bin-2.3.7
	  clbuild --impl sbcl-bin                # tag derived from the installed version
	  clbuild -n foo -t bar --impl ecl       # tagged foo:bar
	  clbuild --impl ccl-bin -- --no-cache   # extra arguments for docker build

	Environment:
	  DOCKER_BUILDKIT   use the BuildKit builder (default: 0)
	  CLBUILD_CONTEXT   build context directory (default: current directory)
	  DOCKER            engine executable (default: docker)
"};

/// Build a Common Lisp image on Amazon Linux, with Roswell and the selected implementation installed.
#[derive(Debug, Parser)]
#[command(name = "clbuild", after_help = AFTER_HELP, args_override_self = true)]
struct Args {
	/// Name of the built image
	#[arg(short, long, value_name = "NAME", default_value = DEFAULT_IMAGE_NAME, value_parser = NonEmptyStringValueParser::new())]
	name: String,

	/// Tag for the built image. Derived from the implementation when omitted
	#[arg(short, long, value_name = "TAG", value_parser = NonEmptyStringValueParser::new())]
	tag: Option<String>,

	/// Implementation to install with Roswell, as `name` or `name/version` (required)
	#[arg(long = "impl", value_name = "SPEC")]
	implementation: Option<String>,

	/// Hide docker build progress output
	#[arg(short, long)]
	quiet: bool,

	/// Arguments passed through to `docker build`, after everything else
	#[arg(last = true, value_name = "DOCKER_ARGS")]
	docker_args: Vec<String>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
	#[error("Option {0} requires a value.")]
	MissingValue(String),

	#[error("Unknown option: {0}")]
	UnknownOption(String),

	#[error("Unexpected argument: {0}")]
	UnexpectedArgument(String),

	#[error("Missing required option {0}.")]
	MissingRequired(&'static str),

	#[error(transparent)]
	InvalidImplementation(#[from] implementation::Error),

	#[error("Invalid --impl version: {0}")]
	InvalidRelease(#[from] tag::Error),

	#[error("Argument '{0}' is not valid UTF-8.")]
	InvalidUtf8(String),

	#[error("{0}")]
	Other(String),
}

/// Everything a build needs from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
	pub image_name: String,
	pub tag: Option<String>,
	pub implementation: ImplSpec,
	pub extra_args: Vec<String>,
	pub quiet: bool,
}

impl Options {
	/// Whether the caller picked the tag, which turns off tag derivation.
	#[must_use]
	pub const fn tag_explicit(&self) -> bool {
		self.tag.is_some()
	}
}

#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
	Help,
	Build(Options),
}

/// Parse the command line, without the program name.
///
/// # Errors
///
/// Returns an error if an argument is not UTF-8, an option is unknown or is missing its value,
/// `--impl` is not given, or its pinned version cannot be turned into a tag.
pub fn parse<I, S>(args: I) -> Result<Parsed, ValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<OsString>,
{
	let args = args
		.into_iter()
		.map(|arg| {
			arg.into()
				.into_string()
				.map_err(|arg| ValidationError::InvalidUtf8(arg.to_string_lossy().into_owned()))
		})
		.collect::<Result<Vec<String>, _>>()?;

	if args.is_empty() {
		return Ok(Parsed::Help);
	}

	let parsed = match Args::try_parse_from(std::iter::once("clbuild".to_string()).chain(args)) {
		Ok(parsed) => parsed,
		Err(e) if e.kind() == ErrorKind::DisplayHelp => return Ok(Parsed::Help),
		Err(e) => return Err(e.into()),
	};

	let implementation = parsed
		.implementation
		.ok_or(ValidationError::MissingRequired("--impl"))
		.and_then(|raw| ImplSpec::parse(&raw).map_err(Into::into))?;

	// Catch a pinned version that can't make a tag before spending a whole build on it.
	if let (None, Some(version)) = (&parsed.tag, implementation.version()) {
		DerivedTag::new(implementation.name(), version)?;
	}

	Ok(Parsed::Build(Options {
		image_name: parsed.name,
		tag: parsed.tag,
		implementation,
		extra_args: parsed.docker_args,
		quiet: parsed.quiet,
	}))
}

/// The full help text.
#[must_use]
pub fn usage() -> String {
	Args::command().render_help().to_string()
}

impl From<clap::Error> for ValidationError {
	fn from(e: clap::Error) -> Self {
		let invalid_arg = match e.get(ContextKind::InvalidArg) {
			Some(ContextValue::String(arg)) => Some(arg.clone()),
			_ => None,
		};

		match (e.kind(), invalid_arg) {
			(ErrorKind::InvalidValue, Some(arg)) => Self::MissingValue(
				// clap reports the argument as `--name <NAME>`.
				arg.split_whitespace().next().unwrap_or(&arg).to_string(),
			),
			(ErrorKind::UnknownArgument, Some(arg)) if arg.starts_with('-') => {
				Self::UnknownOption(arg)
			},
			(ErrorKind::UnknownArgument, Some(arg)) => Self::UnexpectedArgument(arg),
			_ => Self::Other(
				e.to_string()
					.lines()
					.next()
					.unwrap_or_default()
					.trim_start_matches("error: ")
					.to_string(),
			),
		}
	}
}
