use crate::context::ResolutionContext;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// How many trailing path segments must line up for a filename-search
/// candidate to be accepted.
const TAIL_MATCH_DEPTH: usize = 3;

/// Map a path captured in a foreign environment onto the local codebase root.
///
/// Resolution is total: some path is always returned, even when nothing
/// exists at it, so a missing file surfaces downstream as a clear not-found
/// error instead of a silent resolution failure. Existence checking is the
/// caller's responsibility.
///
/// Strategy order for a foreign-rooted path (single leading `/`):
/// 1. direct mapping of all segments under the local root,
/// 2. stripping a known deployment prefix (`/usr/srv/app`, `/app`, ...) and
///    retrying the direct mapping,
/// 3. searching the root for a file with the same basename whose trailing
///    segments match the foreign path's,
/// 4. falling back to the nonexistent direct mapping from step 1.
///
/// Double-leading-separator paths are treated as network (UNC) paths and
/// passed through unchanged, as are paths already rooted in the local
/// filesystem convention.
pub fn resolve(foreign_path: &str, ctx: &ResolutionContext) -> PathBuf {
    let path = Path::new(foreign_path);

    let Some(root) = ctx.local_root() else {
        if path.is_absolute() {
            return normalize(path);
        }
        return path.to_path_buf();
    };

    if foreign_path.starts_with("//") {
        return path.to_path_buf();
    }

    if let Some(stripped) = foreign_path.strip_prefix('/') {
        let segments: Vec<&str> = stripped.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return root.to_path_buf();
        }
        return resolve_foreign(root, &segments, ctx);
    }

    if path.is_absolute() {
        // Already rooted in the local convention (e.g. a drive-letter path);
        // nothing to remap.
        return path.to_path_buf();
    }

    normalize(&root.join(path))
}

fn resolve_foreign(root: &Path, segments: &[&str], ctx: &ResolutionContext) -> PathBuf {
    let direct = join_segments(root, segments);
    if direct.exists() {
        return direct;
    }

    for prefix in ctx.strip_prefixes() {
        if segments.len() > prefix.len()
            && segments
                .iter()
                .zip(prefix.iter())
                .all(|(seg, pre)| *seg == pre.as_str())
        {
            let candidate = join_segments(root, &segments[prefix.len()..]);
            if candidate.exists() {
                return candidate;
            }
        }
    }

    if let Some(found) = find_by_tail(root, segments, ctx) {
        return found;
    }

    // Best effort: the nonexistent direct mapping lets the caller report a
    // clear file-not-found for the path it actually tried.
    direct
}

/// Search the root for a file sharing the foreign path's basename whose
/// trailing segments (up to [`TAIL_MATCH_DEPTH`]) match exactly. Traversal is
/// bounded by the context's depth and node limits.
fn find_by_tail(root: &Path, segments: &[&str], ctx: &ResolutionContext) -> Option<PathBuf> {
    let filename = *segments.last()?;
    let mut visited = 0usize;

    for entry in WalkDir::new(root)
        .max_depth(ctx.max_search_depth())
        .into_iter()
        .filter_map(Result::ok)
    {
        visited += 1;
        if visited > ctx.max_search_nodes() {
            return None;
        }
        if !entry.file_type().is_file() || entry.file_name().to_str() != Some(filename) {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let found: Vec<&str> = rel
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();

        let depth = TAIL_MATCH_DEPTH.min(segments.len()).min(found.len());
        if depth > 0 && segments[segments.len() - depth..] == found[found.len() - depth..] {
            return Some(entry.into_path());
        }
    }

    None
}

/// Depth-bounded search for a file by basename alone, used when no path
/// structure is available to match against.
pub fn find_file_in_root(filename: &str, ctx: &ResolutionContext) -> Option<PathBuf> {
    let root = ctx.local_root()?;
    let mut visited = 0usize;

    for entry in WalkDir::new(root)
        .max_depth(ctx.max_search_depth())
        .into_iter()
        .filter_map(Result::ok)
    {
        visited += 1;
        if visited > ctx.max_search_nodes() {
            return None;
        }
        if entry.file_type().is_file() && entry.file_name().to_str() == Some(filename) {
            return Some(entry.into_path());
        }
    }

    None
}

/// Normalize a path for human-readable output, using forward slashes
/// regardless of platform.
pub fn display_path(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if path.has_root() && !parts.is_empty() && parts[0] == std::path::MAIN_SEPARATOR.to_string() {
        format!("/{}", parts[1..].join("/"))
    } else {
        parts.join("/")
    }
}

fn join_segments(root: &Path, segments: &[&str]) -> PathBuf {
    let mut out = root.to_path_buf();
    for seg in segments {
        out.push(seg);
    }
    out
}

/// Lexical normalization: strips `.` components and folds `..` onto the
/// preceding segment without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(comp.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
