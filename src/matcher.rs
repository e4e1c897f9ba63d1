/// Lines of surrounding context returned with a match.
pub const DEFAULT_CONTEXT_LINES: usize = 5;

/// Similarity floor (0-1) below which a line is not offered as a suggestion.
const FUZZY_FLOOR: f64 = 0.6;

/// Maximum number of fuzzy suggestions returned for a failed match.
const MAX_SUGGESTIONS: usize = 3;

/// Outcome of locating a snippet inside file content.
///
/// `suggestions` is populated only when `found` is false.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    pub found: bool,
    pub exact_match: bool,
    /// 1-based line number of the match start.
    pub line_number: Option<usize>,
    pub matched_text: Option<String>,
    pub context_before: String,
    pub context_after: String,
    pub suggestions: Vec<String>,
}

/// Locate `snippet` inside `content`.
///
/// Strategy cascade, first success wins:
/// 1. single-line scan: a line whose trimmed form equals the trimmed snippet,
///    or which contains it as a substring;
/// 2. multi-line window: every trimmed window line equals the corresponding
///    trimmed snippet line, in order;
/// 3. fuzzy fallback: up to three closest non-blank lines by normalized
///    Levenshtein similarity, returned as suggestions with `found = false`.
///
/// `line_hint` is advisory only; the first scanned match always wins, keeping
/// results deterministic across runs.
pub fn find_snippet(
    content: &str,
    snippet: &str,
    line_hint: Option<usize>,
    context_lines: usize,
) -> MatchResult {
    let _ = line_hint;

    let lines: Vec<&str> = content.split('\n').collect();
    let trimmed = snippet.trim();

    if let Some(result) = find_single_line(&lines, trimmed, context_lines) {
        return result;
    }

    if let Some(result) = find_multi_line(&lines, trimmed, context_lines) {
        return result;
    }

    MatchResult {
        suggestions: closest_lines(&lines, trimmed),
        ..MatchResult::default()
    }
}

fn find_single_line(lines: &[&str], trimmed: &str, context_lines: usize) -> Option<MatchResult> {
    for (idx, line) in lines.iter().enumerate() {
        if line.contains(trimmed) || line.trim() == trimmed {
            let start = idx.saturating_sub(context_lines);
            let end = (idx + context_lines + 1).min(lines.len());

            return Some(MatchResult {
                found: true,
                exact_match: true,
                line_number: Some(idx + 1),
                matched_text: Some((*line).to_string()),
                context_before: lines[start..idx].join("\n"),
                context_after: lines[idx + 1..end].join("\n"),
                suggestions: Vec::new(),
            });
        }
    }
    None
}

fn find_multi_line(lines: &[&str], trimmed: &str, context_lines: usize) -> Option<MatchResult> {
    let snippet_lines: Vec<&str> = trimmed.split('\n').map(str::trim).collect();
    let height = snippet_lines.len();
    if height < 2 || lines.len() < height {
        return None;
    }

    for idx in 0..=lines.len() - height {
        let window = &lines[idx..idx + height];
        if window
            .iter()
            .zip(&snippet_lines)
            .all(|(line, want)| line.trim() == *want)
        {
            let start = idx.saturating_sub(context_lines);
            let end = (idx + height + context_lines).min(lines.len());

            return Some(MatchResult {
                found: true,
                exact_match: true,
                line_number: Some(idx + 1),
                matched_text: Some(window.join("\n")),
                context_before: lines[start..idx].join("\n"),
                context_after: lines[idx + height..end].join("\n"),
                suggestions: Vec::new(),
            });
        }
    }
    None
}

/// Rank non-blank lines by similarity to the snippet and keep the closest
/// few above the floor. Ties keep scan order, so suggestions are stable.
fn closest_lines(lines: &[&str], trimmed: &str) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| (strsim::normalized_levenshtein(trimmed, line), line))
        .filter(|(score, _)| *score >= FUZZY_FLOOR)
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut suggestions: Vec<String> = Vec::with_capacity(MAX_SUGGESTIONS);
    for (_, line) in scored {
        if suggestions.iter().any(|s| s.as_str() == line) {
            continue;
        }
        suggestions.push(line.to_string());
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
    }
    suggestions
}
