use crate::change::VerifiedChange;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker prefix applied to the original filename for the patched artifact.
pub const OUTPUT_PREFIX: &str = "fixed_";

/// Result of running verified changes over file content, before any write.
#[derive(Debug, Clone)]
pub struct AppliedPatch {
    pub content: String,
    pub changes_applied: usize,
    pub change_log: Vec<String>,
    pub warnings: Vec<String>,
}

/// Final report for one file's patch operation.
///
/// `success` reflects the artifact write only; `changes_applied` may be less
/// than `total_requested` on a successful write, and callers use the pair to
/// tell "wrote but partially applied" from "failed to write".
#[derive(Debug, Clone, Serialize)]
pub struct PatchOutcome {
    pub success: bool,
    pub output_path: PathBuf,
    pub changes_applied: usize,
    pub total_requested: usize,
    pub diff_summary: String,
    pub change_log: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("path has no filename: {path}")]
    NoFileName { path: PathBuf },

    #[error("output path would overwrite the original file: {path}")]
    WouldOverwrite { path: PathBuf },

    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Apply verified changes to content, strictly in order.
///
/// Each change replaces the first occurrence of its trimmed original snippet
/// in the *current* content. A snippet occurring more than once is still
/// replaced at its first occurrence only, with a warning, so repeated runs
/// stay deterministic and auditable. A snippet no longer present (an earlier
/// change may have altered it) is recorded and skipped.
pub fn apply_changes(original: &str, changes: &[VerifiedChange]) -> AppliedPatch {
    let mut content = original.to_string();
    let mut changes_applied = 0;
    let mut change_log = Vec::new();
    let mut warnings = Vec::new();

    for (idx, verified) in changes.iter().enumerate() {
        let needle = verified.change.original_snippet.trim();
        let replacement = verified.change.fixed_snippet.trim();

        let occurrences = content.matches(needle).count();
        if occurrences == 0 {
            warnings.push(format!(
                "change {}: original snippet no longer present in content; skipped",
                idx + 1
            ));
            continue;
        }
        if occurrences > 1 {
            warnings.push(format!(
                "change {}: snippet matches {} locations; applied to first occurrence only",
                idx + 1,
                occurrences
            ));
        }

        content = content.replacen(needle, replacement, 1);
        changes_applied += 1;

        let hint = verified
            .change
            .line_number
            .map(|l| l.to_string())
            .unwrap_or_else(|| format!("{}", verified.matched_line));
        change_log.push(format!("change {}: replaced at line ~{}", idx + 1, hint));
    }

    AppliedPatch {
        content,
        changes_applied,
        change_log,
        warnings,
    }
}

/// Line-aligned positional diff between original and patched content.
///
/// Indices present in both versions are compared directly; a differing line
/// count is noted rather than realigned. This is not an LCS diff - positional
/// comparison is enough for auditing what the applier changed.
pub fn diff_summary(original: &str, patched: &str) -> String {
    let before: Vec<&str> = original.split('\n').collect();
    let after: Vec<&str> = patched.split('\n').collect();

    let mut entries = Vec::new();
    for (i, (old, new)) in before.iter().zip(after.iter()).enumerate() {
        if old != new {
            entries.push(format!("Line {}:\n  - {}\n  + {}", i + 1, old, new));
        }
    }
    if before.len() != after.len() {
        entries.push(format!(
            "Note: line count changed from {} to {}",
            before.len(),
            after.len()
        ));
    }

    if entries.is_empty() {
        "No differences".to_string()
    } else {
        entries.join("\n")
    }
}

/// Compute the artifact location for an original file: a sibling with the
/// [`OUTPUT_PREFIX`] marker applied to the filename.
pub fn output_path_for(original_path: &Path) -> Result<PathBuf, ApplyError> {
    let name = original_path
        .file_name()
        .ok_or_else(|| ApplyError::NoFileName {
            path: original_path.to_path_buf(),
        })?;

    let mut output_name = OsString::from(OUTPUT_PREFIX);
    output_name.push(name);
    Ok(original_path.with_file_name(output_name))
}

/// Write patched content next to the original file.
///
/// Never overwrites the original: a computed output path that collides with
/// it (directly or through a symlink) is a hard failure, not a silent
/// overwrite. Parent directories are created as needed and the write itself
/// is atomic (tempfile + fsync + rename).
pub fn write_patched(original_path: &Path, content: &str) -> Result<PathBuf, ApplyError> {
    let output_path = output_path_for(original_path)?;

    if output_path == original_path {
        return Err(ApplyError::WouldOverwrite { path: output_path });
    }
    if output_path.exists() {
        if let (Ok(a), Ok(b)) = (output_path.canonicalize(), original_path.canonicalize()) {
            if a == b {
                return Err(ApplyError::WouldOverwrite { path: output_path });
            }
        }
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|source| ApplyError::Io {
            path: output_path.clone(),
            source,
        })?;
    }

    atomic_write(&output_path, content.as_bytes()).map_err(|source| ApplyError::Io {
        path: output_path.clone(),
        source,
    })?;

    Ok(output_path)
}

/// Apply changes and write the artifact, folding both phases into one report.
///
/// A write failure is reported in the outcome (`success = false`, cause in
/// `warnings`) rather than escalated, so the orchestration layer always gets
/// a complete per-file record.
pub fn apply_and_write(
    original_path: &Path,
    original_content: &str,
    changes: &[VerifiedChange],
) -> PatchOutcome {
    let applied = apply_changes(original_content, changes);
    let diff = diff_summary(original_content, &applied.content);

    let mut warnings = applied.warnings;
    let (success, output_path) = match write_patched(original_path, &applied.content) {
        Ok(path) => (true, path),
        Err(err) => {
            let path = output_path_for(original_path).unwrap_or_else(|_| original_path.to_path_buf());
            warnings.push(format!("write failed: {err}"));
            (false, path)
        }
    };

    PatchOutcome {
        success,
        output_path,
        changes_applied: applied.changes_applied,
        total_requested: changes.len(),
        diff_summary: diff,
        change_log: applied.change_log,
        warnings,
    }
}

/// Atomic file write: tempfile in the same directory, fsync, rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
