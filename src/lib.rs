//! Remedy Patcher: cross-environment path resolution and snippet-based patching
//!
//! The engine behind an automated error-remediation pipeline. An upstream
//! planner produces a list of atomic code changes keyed by snippets of the
//! original source; this crate maps the file references (captured inside a
//! deployed container) onto a local codebase root, locates each snippet,
//! applies the replacements, and checks that the result still parses.
//!
//! # Architecture
//!
//! Four components, wired together by [`pipeline::patch_file`]:
//!
//! - [`resolve`] rewrites foreign paths onto the local root through a
//!   fallback cascade (direct mapping, deployment-prefix stripping,
//!   basename + tail matching).
//! - [`matcher`] locates a snippet in file content, with fuzzy suggestions
//!   when nothing matches exactly.
//! - [`apply`] performs ordered first-occurrence replacements and writes the
//!   patched artifact.
//! - [`validate`] parses the result with a Python grammar and reports the
//!   first structural error.
//!
//! # Safety
//!
//! - The original file is never overwritten; the artifact is a `fixed_`
//!   sibling written atomically (tempfile + fsync + rename)
//! - Path resolution is total: a best-effort path always comes back, and
//!   existence is the caller's check
//! - Ambiguous snippet matches resolve to the first occurrence,
//!   deterministically, with a warning
//!
//! # Example
//!
//! ```no_run
//! use remedy_patcher::{patch_file, CodeChange, ResolutionContext};
//!
//! let ctx = ResolutionContext::new("/work/target-app");
//! let changes = vec![CodeChange {
//!     file_path: "/usr/srv/app/services/user.py".into(),
//!     function_name: "create_user_account".into(),
//!     line_number: Some(7),
//!     original_snippet: "User.emails == data.email".into(),
//!     fixed_snippet: "User.email == data.email".into(),
//!     explanation: "User has no `emails` column".into(),
//! }];
//!
//! match patch_file("/usr/srv/app/services/user.py", &ctx, &changes) {
//!     Ok(result) => println!("wrote {:?}", result.outcome.output_path),
//!     Err(e) => eprintln!("patch failed: {e}"),
//! }
//! ```

pub mod apply;
pub mod change;
pub mod context;
pub mod matcher;
pub mod pipeline;
pub mod resolve;
pub mod source;
pub mod validate;

// Re-exports
pub use apply::{
    apply_and_write, apply_changes, diff_summary, write_patched, AppliedPatch, ApplyError,
    PatchOutcome, OUTPUT_PREFIX,
};
pub use change::{verify_changes, CodeChange, SkippedChange, VerifiedChange};
pub use context::ResolutionContext;
pub use matcher::{find_snippet, MatchResult, DEFAULT_CONTEXT_LINES};
pub use pipeline::{patch_file, FileOutcome, PipelineError};
pub use resolve::{display_path, find_file_in_root, resolve};
pub use source::{read_source, SourceError, SourceFile};
pub use validate::{validate_file, validate_source, PythonParser, SyntaxReport, ValidateError};
