use crate::matcher::{self, MatchResult, DEFAULT_CONTEXT_LINES};
use serde::{Deserialize, Serialize};

/// One atomic change proposed by the upstream fix planner.
///
/// `original_snippet` is the search key; a change is eligible only if it is
/// non-empty after trimming. Fix plans arrive as JSON from the orchestration
/// layer, so the field names mirror that wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeChange {
    pub file_path: String,
    #[serde(default)]
    pub function_name: String,
    #[serde(default)]
    pub line_number: Option<usize>,
    pub original_snippet: String,
    pub fixed_snippet: String,
    #[serde(default)]
    pub explanation: String,
}

impl CodeChange {
    /// A change with a blank search key can never be located.
    pub fn is_eligible(&self) -> bool {
        !self.original_snippet.trim().is_empty()
    }
}

/// A change whose `original_snippet` was confirmed present in the target
/// file. Only verified changes reach the applier.
#[derive(Debug, Clone)]
pub struct VerifiedChange {
    pub change: CodeChange,
    /// 1-based line at which verification located the snippet.
    pub matched_line: usize,
}

/// A change that failed verification, with the closest candidates found.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedChange {
    pub change: CodeChange,
    pub reason: String,
    pub suggestions: Vec<String>,
}

/// Verify each proposed change against the file content, splitting the list
/// into changes safe to apply and changes to report back as skipped.
///
/// Per-change failures are local: one unlocatable snippet never blocks the
/// rest of the plan.
pub fn verify_changes(
    content: &str,
    changes: &[CodeChange],
) -> (Vec<VerifiedChange>, Vec<SkippedChange>) {
    let mut verified = Vec::new();
    let mut skipped = Vec::new();

    for change in changes {
        if !change.is_eligible() {
            skipped.push(SkippedChange {
                change: change.clone(),
                reason: "original snippet is empty".to_string(),
                suggestions: Vec::new(),
            });
            continue;
        }

        let result: MatchResult = matcher::find_snippet(
            content,
            &change.original_snippet,
            change.line_number,
            DEFAULT_CONTEXT_LINES,
        );

        if result.found {
            verified.push(VerifiedChange {
                change: change.clone(),
                matched_line: result.line_number.unwrap_or(0),
            });
        } else {
            skipped.push(SkippedChange {
                change: change.clone(),
                reason: "original snippet not found in content".to_string(),
                suggestions: result.suggestions,
            });
        }
    }

    (verified, skipped)
}
