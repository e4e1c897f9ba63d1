use crate::context::ResolutionContext;
use crate::resolve;
use crate::source;
use ast_grep_language::{LanguageExt, SupportLang};
use std::path::Path;
use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

/// Tree-sitter parser wrapper for Python source code.
pub struct PythonParser {
    parser: Parser,
}

#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse source code")]
    ParseFailed,
}

/// Grammatical well-formedness report for one file.
///
/// `valid = false` with no line/column means the file itself was missing or
/// unreadable; the message names the attempted path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SyntaxReport {
    pub valid: bool,
    /// 1-based line of the first structural error.
    pub error_line: Option<usize>,
    /// 1-based column of the first structural error.
    pub error_column: Option<usize>,
    pub error_message: Option<String>,
}

impl SyntaxReport {
    fn ok() -> Self {
        Self {
            valid: true,
            error_line: None,
            error_column: None,
            error_message: None,
        }
    }

    fn unreadable(message: String) -> Self {
        Self {
            valid: false,
            error_line: None,
            error_column: None,
            error_message: Some(message),
        }
    }
}

impl PythonParser {
    pub fn new() -> Result<Self, ValidateError> {
        let mut parser = Parser::new();
        // Get the tree-sitter Language from ast-grep-language
        let ts_lang = SupportLang::Python.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| ValidateError::LanguageSet)?;

        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str) -> Result<Tree, ValidateError> {
        self.parser
            .parse(source, None)
            .ok_or(ValidateError::ParseFailed)
    }
}

/// Check source text for grammatical well-formedness.
///
/// Reports the first structural error in document order. No semantic
/// analysis happens here; a file can be valid and still wrong.
pub fn validate_source(content: &str) -> Result<SyntaxReport, ValidateError> {
    let mut parser = PythonParser::new()?;
    let tree = parser.parse(content)?;

    match first_error_node(tree.root_node()) {
        None => Ok(SyntaxReport::ok()),
        Some(node) => {
            let point = node.start_position();
            let message = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "invalid syntax".to_string()
            };
            Ok(SyntaxReport {
                valid: false,
                error_line: Some(point.row + 1),
                error_column: Some(point.column + 1),
                error_message: Some(message),
            })
        }
    }
}

/// Validate the file at a local path. A missing or unreadable file is
/// reported as invalid, not raised, so validation never aborts the pipeline.
pub fn validate_path(path: &Path) -> Result<SyntaxReport, ValidateError> {
    match source::read_source(path) {
        Ok(file) => validate_source(&file.content),
        Err(err) => Ok(SyntaxReport::unreadable(err.to_string())),
    }
}

/// Validate a file referenced by a foreign path, resolving it through the
/// same context used for patching.
pub fn validate_file(
    foreign_path: &str,
    ctx: &ResolutionContext,
) -> Result<SyntaxReport, ValidateError> {
    let resolved = resolve::resolve(foreign_path, ctx);
    validate_path(&resolved)
}

/// First ERROR or missing node in document order, if any.
fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error_node(child) {
            return Some(found);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn valid_python_parses_clean() {
        let source = "def get_user(session, user_id):\n    return session.get(user_id)\n";
        let report = validate_source(source).unwrap();
        assert!(report.valid);
        assert!(report.error_line.is_none());
    }

    #[test]
    fn unmatched_bracket_reports_location() {
        let source = "x = 1\ny = [1, 2\nz = 3\n";
        let report = validate_source(source).unwrap();
        assert!(!report.valid);
        // The break is on line 2; tree-sitter localizes the error at or
        // after it, never on the clean first line.
        assert!(report.error_line.unwrap() >= 2);
        assert!(report.error_column.is_some());
        assert!(report.error_message.is_some());
    }

    #[test]
    fn semantic_nonsense_is_still_grammatical() {
        // Undefined names are a semantic problem, not a syntax one.
        let report = validate_source("x = frobnicate(missing)\n").unwrap();
        assert!(report.valid);
    }

    #[test]
    fn missing_file_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let report = validate_path(&dir.path().join("gone.py")).unwrap();
        assert!(!report.valid);
        assert!(report.error_line.is_none());
        assert!(report.error_message.unwrap().contains("gone.py"));
    }

    #[test]
    fn foreign_path_is_resolved_before_validation() {
        let dir = TempDir::new().unwrap();
        let services = dir.path().join("services");
        fs::create_dir_all(&services).unwrap();
        fs::write(services.join("user.py"), "user = 1\n").unwrap();

        let ctx = ResolutionContext::new(dir.path());
        let report = validate_file("/app/services/user.py", &ctx).unwrap();
        assert!(report.valid);
    }
}
