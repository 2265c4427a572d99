//! CLI smoke tests against synthesized Unity projects

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const SCENE_GUID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const PREFAB_GUID: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const ORPHAN_GUID: &str = "cccccccccccccccccccccccccccccccc";

fn cli() -> Command {
    Command::cargo_bin("searchunusedassets").unwrap()
}

fn write_asset(project: &Path, relative: &str, guid: &str, content: &str) {
    let path = project.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    let mut meta = path.into_os_string();
    meta.push(".meta");
    std::fs::write(meta, format!("guid: {}\n", guid)).unwrap();
}

fn small_project(dir: &TempDir) -> &Path {
    let project = dir.path();
    write_asset(
        project,
        "Assets/Scenes/Main.unity",
        SCENE_GUID,
        &format!("  m_Prefab: {{fileID: 100, guid: {}, type: 3}}\n", PREFAB_GUID),
    );
    write_asset(project, "Assets/Prefabs/Player.prefab", PREFAB_GUID, "x");
    write_asset(project, "Assets/Textures/Orphan.png", ORPHAN_GUID, "png");

    std::fs::create_dir_all(project.join("ProjectSettings")).unwrap();
    std::fs::write(
        project.join("ProjectSettings/EditorBuildSettings.asset"),
        "EditorBuildSettings:\n  m_Scenes:\n  - enabled: 1\n    path: Assets/Scenes/Main.unity\n",
    )
    .unwrap();
    project
}

#[test]
fn help_describes_the_tool() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("unused asset"));
}

#[test]
fn terminal_report_names_the_orphan() {
    let dir = TempDir::new().unwrap();
    let project = small_project(&dir);

    cli()
        .arg(project)
        .arg("--quiet")
        .arg("--no-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Orphan.png"))
        .stdout(predicate::str::contains("1 unused"));
}

#[test]
fn json_report_is_written_to_the_output_file() {
    let dir = TempDir::new().unwrap();
    let project = small_project(&dir);
    let out = project.join("report.json");

    cli()
        .arg(project)
        .args(["--format", "json", "--quiet", "--no-cache"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["total"], 3);
    assert_eq!(report["unused"], 1);
    let assets = report["assets"].as_array().unwrap();
    let orphan = assets
        .iter()
        .find(|asset| asset["guid"] == ORPHAN_GUID)
        .unwrap();
    assert_eq!(orphan["reachable"], false);
}

#[test]
fn cooperative_mode_reaches_the_same_verdict() {
    let dir = TempDir::new().unwrap();
    let project = small_project(&dir);

    cli()
        .arg(project)
        .args(["--cooperative", "--budget-ms", "1", "--quiet", "--no-cache"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Orphan.png"));
}

#[test]
fn cached_report_matches_the_live_one() {
    let dir = TempDir::new().unwrap();
    let project = small_project(&dir);

    cli().arg(project).arg("--quiet").assert().success();

    cli()
        .arg(project)
        .args(["--from-cache", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Orphan.png"))
        .stdout(predicate::str::contains("1 unused"));
}

#[test]
fn remove_quarantines_and_restore_brings_back() {
    let dir = TempDir::new().unwrap();
    let project = small_project(&dir);
    let orphan = project.join("Assets/Textures/Orphan.png");

    cli()
        .arg(project)
        .args(["--remove", "--yes", "--quiet", "--no-cache"])
        .assert()
        .success();

    assert!(!orphan.exists());
    assert!(project
        .join(".recovery/Assets/Textures/Orphan.png")
        .exists());

    cli()
        .arg(project)
        .args(["--restore", "--quiet"])
        .assert()
        .success();
    assert!(orphan.exists());
}

#[test]
fn restore_with_empty_recovery_reports_nothing_to_do() {
    let dir = TempDir::new().unwrap();
    let project = small_project(&dir);

    cli()
        .arg(project)
        .args(["--restore", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to restore"));
}

#[test]
fn missing_content_root_fails_loudly() {
    let dir = TempDir::new().unwrap();

    cli()
        .arg(dir.path())
        .arg("--quiet")
        .assert()
        .failure();
}
