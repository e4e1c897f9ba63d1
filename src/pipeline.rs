use crate::apply::{self, PatchOutcome};
use crate::change::{self, CodeChange, SkippedChange};
use crate::context::ResolutionContext;
use crate::resolve;
use crate::source::{self, SourceError};
use crate::validate::{self, SyntaxReport, ValidateError};
use std::path::PathBuf;
use thiserror::Error;

/// Complete per-file record handed back to the orchestration layer.
#[derive(Debug)]
pub struct FileOutcome {
    /// Local path the foreign reference resolved to.
    pub resolved_path: PathBuf,
    pub outcome: PatchOutcome,
    /// Report for the written artifact; absent when the write failed.
    pub syntax: Option<SyntaxReport>,
    /// Changes that failed verification, with fuzzy suggestions.
    pub skipped: Vec<SkippedChange>,
}

/// Per-file failures that prevent a patch operation from producing any
/// artifact. Per-change failures never surface here; they are recorded in
/// the outcome instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error("none of the {total} requested changes could be verified against {path}")]
    NoVerifiedChanges {
        path: PathBuf,
        total: usize,
        skipped: Vec<SkippedChange>,
    },
}

/// Run the full patch sequence for one file: resolve the foreign path, read
/// the source, verify each proposed change, apply and write the artifact,
/// then validate its syntax.
///
/// Mirrors the caller-driven control flow of the surrounding pipeline: a
/// change that fails verification is skipped and reported, while an
/// unreadable source or a plan with nothing verifiable is escalated as a
/// structured error.
pub fn patch_file(
    foreign_path: &str,
    ctx: &ResolutionContext,
    changes: &[CodeChange],
) -> Result<FileOutcome, PipelineError> {
    let resolved = resolve::resolve(foreign_path, ctx);
    let file = source::read_source(&resolved)?;

    let (verified, skipped) = change::verify_changes(&file.content, changes);
    if verified.is_empty() {
        return Err(PipelineError::NoVerifiedChanges {
            path: resolved,
            total: changes.len(),
            skipped,
        });
    }

    let outcome = apply::apply_and_write(&resolved, &file.content, &verified);
    let syntax = if outcome.success {
        Some(validate::validate_path(&outcome.output_path)?)
    } else {
        None
    };

    Ok(FileOutcome {
        resolved_path: resolved,
        outcome,
        syntax,
        skipped,
    })
}
