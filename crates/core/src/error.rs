//! Error types for dependency discovery.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while discovering dependencies.
///
/// Only two of these are fatal, and only for the file or project they name:
/// [`Error::Parse`] and [`Error::UnresolvableTargetFramework`]. The
/// orchestrator always returns partial results for every project that did
/// not fail.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A build file could not be parsed.
    #[error("Failed to parse build file {path}: {message}")]
    #[diagnostic(
        code(nudge::discovery::parse_failed),
        help("Check the file for malformed XML or truncated content")
    )]
    Parse {
        /// Path to the unparseable file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// A condition expression has malformed syntax.
    #[error("Malformed condition expression `{expression}`: {message}")]
    #[diagnostic(
        code(nudge::discovery::condition_malformed),
        help("Conditions combine quoted strings with ==, !=, And, Or, ! and parentheses")
    )]
    Condition {
        /// The expression that failed to parse.
        expression: String,
        /// Description of what is malformed.
        message: String,
    },

    /// The project's target framework still contains an unresolved reference.
    ///
    /// Fail-closed: dependency conditions keyed on an unknown framework
    /// cannot be trusted, so the whole project is dropped from the result.
    #[error("Target framework `{value}` for {path} cannot be resolved")]
    #[diagnostic(
        code(nudge::discovery::unresolvable_target_framework),
        help("Every $(Property) reference in TargetFramework(s) must resolve to a concrete moniker")
    )]
    UnresolvableTargetFramework {
        /// The project whose frameworks could not be resolved.
        path: PathBuf,
        /// The partially resolved value.
        value: String,
    },

    /// The package metadata collaborator failed for one package.
    ///
    /// Non-fatal: the affected dependency is recorded without transitive
    /// children.
    #[error("Metadata lookup failed for {name} {version}: {message}")]
    #[diagnostic(
        code(nudge::discovery::metadata_lookup_failed),
        help("Transitive children are omitted for this dependency; the run continues")
    )]
    MetadataLookup {
        /// Package name that was queried.
        name: String,
        /// Package version that was queried.
        version: String,
        /// Description of the lookup failure.
        message: String,
    },
}
