//! End-to-end patch workflow tests
//!
//! Exercises the complete sequence against a mock codebase tree:
//! 1. Resolve the foreign (container) path onto the local root
//! 2. Read the source and verify each proposed change
//! 3. Apply changes and write the `fixed_` artifact
//! 4. Validate the artifact's syntax

use anyhow::Result;
use remedy_patcher::{patch_file, CodeChange, PipelineError, ResolutionContext};
use std::fs;
use tempfile::TempDir;

const USER_SERVICE: &str = r#"from models.user import User

async def create_user_account(data, session):
    user_exist = session.query(User).filter(User.emails == data.email).first()
    if user_exist:
        raise HTTPException(status_code=400, detail="Email already exists.")

    user = User()
    user.name = data.name
    user.email = data.email
    session.add(user)
    session.commit()

    return user
"#;

/// Mirror the deployed layout under a local root: the container recorded
/// `/usr/srv/app/services/user.py`, the local copy keeps `services/user.py`.
fn setup_codebase() -> TempDir {
    let dir = TempDir::new().unwrap();
    let services = dir.path().join("services");
    fs::create_dir_all(&services).unwrap();
    fs::write(services.join("user.py"), USER_SERVICE).unwrap();
    dir
}

fn fix_plan_change(original: &str, fixed: &str, line: Option<usize>) -> CodeChange {
    CodeChange {
        file_path: "/usr/srv/app/services/user.py".to_string(),
        function_name: "create_user_account".to_string(),
        line_number: line,
        original_snippet: original.to_string(),
        fixed_snippet: fixed.to_string(),
        explanation: "User model exposes `email`, not `emails`".to_string(),
    }
}

#[test]
fn full_workflow_resolves_patches_and_validates() -> Result<()> {
    let dir = setup_codebase();
    let ctx = ResolutionContext::new(dir.path());
    let changes = vec![fix_plan_change(
        "User.emails == data.email",
        "User.email == data.email",
        Some(4),
    )];

    let result = patch_file("/usr/srv/app/services/user.py", &ctx, &changes)?;

    assert_eq!(result.resolved_path, dir.path().join("services/user.py"));
    assert!(result.outcome.success);
    assert_eq!(result.outcome.changes_applied, 1);
    assert_eq!(result.outcome.total_requested, 1);
    assert!(result.skipped.is_empty());

    // Artifact is a sibling with the marker prefix; the original is intact.
    let output = &result.outcome.output_path;
    assert_eq!(output, &dir.path().join("services/fixed_user.py"));
    let patched = fs::read_to_string(output)?;
    assert!(patched.contains("User.email == data.email"));
    assert!(!patched.contains("User.emails"));
    assert_eq!(
        fs::read_to_string(dir.path().join("services/user.py"))?,
        USER_SERVICE
    );

    // The patched artifact still parses.
    let syntax = result.syntax.expect("artifact was written");
    assert!(syntax.valid);

    // The diff names the patched line.
    assert!(result.outcome.diff_summary.contains("Line 4:"));
    assert!(result.outcome.change_log[0].contains("line ~4"));
    Ok(())
}

#[test]
fn structural_break_is_surfaced_by_validation() -> Result<()> {
    let dir = setup_codebase();
    let ctx = ResolutionContext::new(dir.path());
    // The replacement drops the closing parenthesis.
    let changes = vec![fix_plan_change(
        "session.query(User).filter(User.emails == data.email).first()",
        "session.query(User).filter(User.email == data.email.first()",
        Some(4),
    )];

    let result = patch_file("/usr/srv/app/services/user.py", &ctx, &changes)?;

    // The write still succeeds; validation is what flags the damage.
    assert!(result.outcome.success);
    let syntax = result.syntax.expect("artifact was written");
    assert!(!syntax.valid);
    assert!(syntax.error_line.is_some());
    Ok(())
}

#[test]
fn unverifiable_plan_reports_fuzzy_suggestions() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("user.py"), "User.email\n").unwrap();
    let ctx = ResolutionContext::new(dir.path());

    let mut change = fix_plan_change("User.emails", "User.email", None);
    change.file_path = "/app/user.py".to_string();

    let result = patch_file("/app/user.py", &ctx, &[change]);
    match result {
        Err(PipelineError::NoVerifiedChanges { skipped, .. }) => {
            assert_eq!(skipped.len(), 1);
            assert!(skipped[0].suggestions.contains(&"User.email".to_string()));
        }
        other => panic!("expected NoVerifiedChanges, got {other:?}"),
    }
}

#[test]
fn partially_verifiable_plan_applies_what_it_can() -> Result<()> {
    let dir = setup_codebase();
    let ctx = ResolutionContext::new(dir.path());
    let changes = vec![
        fix_plan_change("User.emails == data.email", "User.email == data.email", Some(4)),
        fix_plan_change("does_not_appear_anywhere()", "still_not_there()", None),
    ];

    let result = patch_file("/usr/srv/app/services/user.py", &ctx, &changes)?;

    assert!(result.outcome.success);
    assert_eq!(result.outcome.changes_applied, 1);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(
        result.skipped[0].reason,
        "original snippet not found in content"
    );
    Ok(())
}

#[test]
fn repeated_runs_are_deterministic() -> Result<()> {
    let first_dir = setup_codebase();
    let second_dir = setup_codebase();
    let changes = vec![fix_plan_change("user.name = data.name", "user.name = data.name.strip()", Some(9))];

    let first = patch_file(
        "/usr/srv/app/services/user.py",
        &ResolutionContext::new(first_dir.path()),
        &changes,
    )?;
    let second = patch_file(
        "/usr/srv/app/services/user.py",
        &ResolutionContext::new(second_dir.path()),
        &changes,
    )?;

    let a = fs::read_to_string(&first.outcome.output_path)?;
    let b = fs::read_to_string(&second.outcome.output_path)?;
    assert_eq!(a, b);
    assert_eq!(first.outcome.warnings, second.outcome.warnings);
    Ok(())
}

#[test]
fn fix_plan_round_trips_through_json() -> Result<()> {
    let dir = setup_codebase();
    let ctx = ResolutionContext::new(dir.path());

    // The shape the fix-planning collaborator emits.
    let plan = r#"[{
        "file_path": "/usr/srv/app/services/user.py",
        "function_name": "create_user_account",
        "line_number": 4,
        "original_snippet": "User.emails == data.email",
        "fixed_snippet": "User.email == data.email",
        "explanation": "column is singular"
    }]"#;
    let changes: Vec<CodeChange> = serde_json::from_str(plan)?;

    let result = patch_file(&changes[0].file_path.clone(), &ctx, &changes)?;
    assert!(result.outcome.success);
    assert!(result.syntax.expect("written").valid);
    Ok(())
}

#[test]
fn contexts_are_independent_across_runs() -> Result<()> {
    // Two concurrent pipeline runs with different roots must not interfere;
    // each context owns its root.
    let dir_a = setup_codebase();
    let dir_b = TempDir::new().unwrap();
    fs::create_dir_all(dir_b.path().join("services")).unwrap();
    fs::write(
        dir_b.path().join("services/user.py"),
        "unrelated = True\n",
    )
    .unwrap();

    let ctx_a = ResolutionContext::new(dir_a.path());
    let ctx_b = ResolutionContext::new(dir_b.path());

    assert_eq!(
        remedy_patcher::resolve("/usr/srv/app/services/user.py", &ctx_a),
        dir_a.path().join("services/user.py")
    );
    assert_eq!(
        remedy_patcher::resolve("/usr/srv/app/services/user.py", &ctx_b),
        dir_b.path().join("services/user.py")
    );
    assert!(!dir_a.path().join("services/user.py").starts_with(dir_b.path()));
    Ok(())
}
