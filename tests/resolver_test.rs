use smart_test_manager::{plan, GitWorkspace, Resolver, Strategy};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn args(files: &[&str]) -> Vec<String> {
    files.iter().map(|f| f.to_string()).collect()
}

fn git(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Initializes a repository with one committed file. `None` when git is
/// not available.
fn init_repo() -> Option<TempDir> {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("app.vue"), "<template></template>\n").unwrap();

    let ok = git(temp_dir.path(), &["init", "-q"])
        && git(temp_dir.path(), &["add", "."])
        && git(temp_dir.path(), &["commit", "-q", "-m", "init"]);

    ok.then_some(temp_dir)
}

#[test]
fn test_app_vue_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let strategy = Strategy::builtin();
    let ws = GitWorkspace::new(temp_dir.path());

    let rec = Resolver::new(&strategy, &ws).resolve(&args(&["app/app.vue"]));
    assert!(rec.contains("ui"));
    assert!(rec.contains("integration"));
    assert!(rec.reasons("ui").iter().any(|r| r == "app/app.vue changed"));
    assert_eq!(
        plan::test_command(&strategy, &rec),
        "npx playwright test --grep \"(@ui|@integration)\""
    );
}

#[test]
fn test_spec_file_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let strategy = Strategy::builtin();
    let ws = GitWorkspace::new(temp_dir.path());

    let rec = Resolver::new(&strategy, &ws).resolve(&args(&["package.json", "foo.spec.ts"]));
    assert!(rec.runs_all());
    assert!(rec.contains("smoke"));
    assert_eq!(plan::test_command(&strategy, &rec), "npx playwright test");
    assert_eq!(plan::estimated_secs(&strategy, &rec), 120);
}

#[test]
fn test_content_scan_reads_workspace_files() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("app")).unwrap();
    fs::write(
        temp_dir.path().join("app").join("tasks.ts"),
        "export function toggleTask(id: number) {}\nexport function deleteTask(id: number) {}\n",
    )
    .unwrap();

    let strategy = Strategy::builtin();
    let ws = GitWorkspace::new(temp_dir.path());
    let rec = Resolver::new(&strategy, &ws).resolve(&args(&["app/tasks.ts"]));

    assert_eq!(rec.suites(), &["logic", "integration"]);
    assert_eq!(
        rec.reasons("logic"),
        &["Function deleteTask modified", "Function toggleTask modified"]
    );
}

#[test]
fn test_every_exact_key_maps_to_superset() {
    let temp_dir = TempDir::new().unwrap();
    let strategy = Strategy::builtin();
    let ws = GitWorkspace::new(temp_dir.path());
    let resolver = Resolver::new(&strategy, &ws);

    for rule in &strategy.rules {
        let rec = resolver.resolve(&[rule.key.clone()]);
        for tag in &rule.suites {
            assert!(rec.contains(tag), "'{}' should select '{}'", rule.key, tag);
        }
        for tag in rec.suites() {
            assert!(strategy.suite(tag).is_some(), "unknown suite '{tag}'");
        }
    }
}

#[test]
fn test_empty_input_outside_repository() {
    let temp_dir = TempDir::new().unwrap();
    let strategy = Strategy::builtin();
    let ws = GitWorkspace::new(temp_dir.path());

    let analysis = Resolver::new(&strategy, &ws).analyze(&[]);
    assert_eq!(analysis.recommendation.suites(), &["smoke"]);
    assert_eq!(plan::estimated_secs(&strategy, &analysis.recommendation), 5);
}

#[test]
fn test_empty_input_clean_tree() {
    let Some(repo) = init_repo() else {
        eprintln!("git not available, skipping");
        return;
    };

    let strategy = Strategy::builtin();
    let ws = GitWorkspace::new(repo.path());
    let analysis = Resolver::new(&strategy, &ws).analyze(&[]);

    assert_eq!(analysis.recommendation.suites(), &["smoke"]);
    assert_eq!(
        analysis.recommendation.reasons("smoke"),
        &["No changes detected"]
    );
    assert_eq!(plan::estimated_secs(&strategy, &analysis.recommendation), 5);
}

#[test]
fn test_empty_input_uses_git_diff() {
    let Some(repo) = init_repo() else {
        eprintln!("git not available, skipping");
        return;
    };
    fs::write(
        repo.path().join("app.vue"),
        "<template></template>\n<script>const pendingTasks = 0</script>\n",
    )
    .unwrap();

    let strategy = Strategy::builtin();
    let ws = GitWorkspace::new(repo.path());
    let analysis = Resolver::new(&strategy, &ws).analyze(&[]);

    assert_eq!(analysis.files, vec!["app.vue"]);
    let rec = &analysis.recommendation;
    assert!(rec.contains("ui"));
    assert!(rec.contains("counter"));
    assert!(rec
        .reasons("integration")
        .iter()
        .any(|r| r == "Function pendingTasks modified"));
}

#[test]
fn test_empty_input_from_subdirectory() {
    let Some(repo) = init_repo() else {
        eprintln!("git not available, skipping");
        return;
    };
    let app_dir = repo.path().join("app");
    fs::create_dir_all(&app_dir).unwrap();
    fs::write(app_dir.join("store.js"), "export const total = 0\n").unwrap();
    assert!(git(repo.path(), &["add", "."]));
    assert!(git(repo.path(), &["commit", "-q", "-m", "store"]));
    fs::write(
        app_dir.join("store.js"),
        "export const pendingTasks = computed(() => 0)\n",
    )
    .unwrap();

    let strategy = Strategy::builtin();
    let ws = GitWorkspace::new(&app_dir);
    let analysis = Resolver::new(&strategy, &ws).analyze(&[]);

    assert_eq!(analysis.files, vec!["app/store.js"]);
    assert_eq!(
        analysis.recommendation.suites(),
        &["logic", "counter", "integration"]
    );
}

#[test]
fn test_empty_input_non_ascii_path() {
    let Some(repo) = init_repo() else {
        eprintln!("git not available, skipping");
        return;
    };
    fs::write(repo.path().join("café.vue"), "<template></template>\n").unwrap();
    assert!(git(repo.path(), &["add", "."]));
    assert!(git(repo.path(), &["commit", "-q", "-m", "cafe"]));
    fs::write(repo.path().join("café.vue"), "<template><p/></template>\n").unwrap();

    let strategy = Strategy::builtin();
    let ws = GitWorkspace::new(repo.path());
    let analysis = Resolver::new(&strategy, &ws).analyze(&[]);

    assert_eq!(analysis.files, vec!["café.vue"]);
    let rec = &analysis.recommendation;
    assert_eq!(rec.suites(), &["ui", "integration"]);
    assert_eq!(rec.reasons("ui"), &[".vue file changed"]);
}
