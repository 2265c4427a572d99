//! End-to-end analysis tests over synthesized Unity projects

use searchunusedassets::analysis::{PhaseStatus, Session};
use searchunusedassets::config::Config;
use searchunusedassets::discovery::FileFinder;
use searchunusedassets::identity::{meta_path_for, AssetId, MetaFileResolver};
use searchunusedassets::roots::BuildSettingsRoots;
use searchunusedassets::snapshot;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const SCENE_GUID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const PREFAB_GUID: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const MATERIAL_GUID: &str = "cccccccccccccccccccccccccccccccc";
const TEXTURE_GUID: &str = "dddddddddddddddddddddddddddddddd";
const ORPHAN_GUID: &str = "eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";
const LONELY_CHAIN_GUID: &str = "ffffffffffffffffffffffffffffffff";

fn id(guid: &str) -> AssetId {
    AssetId::new(guid)
}

fn write_asset(project: &Path, relative: &str, guid: &str, content: &str) -> PathBuf {
    let path = project.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    std::fs::write(meta_path_for(&path), format!("guid: {}\n", guid)).unwrap();
    path
}

fn write_build_settings(project: &Path, scenes: &[&str]) {
    let mut manifest = String::from("EditorBuildSettings:\n  m_Scenes:\n");
    for scene in scenes {
        manifest.push_str(&format!("  - enabled: 1\n    path: {}\n", scene));
    }
    std::fs::create_dir_all(project.join("ProjectSettings")).unwrap();
    std::fs::write(project.join("ProjectSettings/EditorBuildSettings.asset"), manifest).unwrap();
}

fn guid_reference(guid: &str) -> String {
    format!("  m_Ref: {{fileID: 100, guid: {}, type: 2}}\n", guid)
}

/// Scene -> prefab -> material -> texture, a dangling two-asset chain,
/// and one orphan texture.
fn standard_project(dir: &TempDir) -> PathBuf {
    let project = dir.path().to_path_buf();

    write_asset(
        &project,
        "Assets/Scenes/Main.unity",
        SCENE_GUID,
        &guid_reference(PREFAB_GUID),
    );
    write_asset(
        &project,
        "Assets/Prefabs/Player.prefab",
        PREFAB_GUID,
        &guid_reference(MATERIAL_GUID),
    );
    write_asset(
        &project,
        "Assets/Materials/Player.mat",
        MATERIAL_GUID,
        &guid_reference(TEXTURE_GUID),
    );
    write_asset(&project, "Assets/Textures/Player.png", TEXTURE_GUID, "png");
    write_asset(&project, "Assets/Textures/Orphan.png", ORPHAN_GUID, "png");
    // references the texture but nothing references it
    write_asset(
        &project,
        "Assets/Prefabs/Lonely.prefab",
        LONELY_CHAIN_GUID,
        &guid_reference(TEXTURE_GUID),
    );

    write_build_settings(&project, &["Assets/Scenes/Main.unity"]);
    project
}

fn analyze(project: &Path) -> searchunusedassets::AnalysisState {
    let config = Config::default();
    let content_root = project.join(&config.content_root);
    let candidates = FileFinder::new(&config)
        .find_candidates(&content_root)
        .unwrap();

    let resolver = MetaFileResolver::new();
    let roots = BuildSettingsRoots::new(project);
    let mut session = Session::new(&content_root, candidates, &resolver, &roots);
    assert_eq!(session.run(), PhaseStatus::Finished);
    session.into_state()
}

#[test]
fn transitive_chain_from_scene_is_alive() {
    let dir = TempDir::new().unwrap();
    let project = standard_project(&dir);

    let state = analyze(&project);

    for guid in [SCENE_GUID, PREFAB_GUID, MATERIAL_GUID, TEXTURE_GUID] {
        assert!(state.is_reachable(&id(guid)), "{} should be in use", guid);
    }
}

#[test]
fn orphan_and_dangling_referencer_are_unused() {
    let dir = TempDir::new().unwrap();
    let project = standard_project(&dir);

    let state = analyze(&project);

    // the orphan has no references at all; the lonely prefab references a
    // live texture but nothing references the prefab itself
    assert!(!state.is_reachable(&id(ORPHAN_GUID)));
    assert!(!state.is_reachable(&id(LONELY_CHAIN_GUID)));

    let unused = state.unused_ids();
    assert_eq!(unused.len(), 2);
}

#[test]
fn bundle_membership_keeps_an_asset_alive() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().to_path_buf();

    let bundled = write_asset(&project, "Assets/Bundled.prefab", PREFAB_GUID, "x");
    std::fs::write(
        meta_path_for(&bundled),
        format!("guid: {}\nassetBundleName: levels\n", PREFAB_GUID),
    )
    .unwrap();
    write_asset(&project, "Assets/Orphan.png", ORPHAN_GUID, "png");
    write_build_settings(&project, &[]);

    let state = analyze(&project);
    assert!(state.is_reachable(&id(PREFAB_GUID)));
    assert!(!state.is_reachable(&id(ORPHAN_GUID)));
}

#[test]
fn scene_not_in_build_settings_is_itself_unused() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().to_path_buf();

    write_asset(
        &project,
        "Assets/Scenes/Abandoned.unity",
        SCENE_GUID,
        &guid_reference(TEXTURE_GUID),
    );
    write_asset(&project, "Assets/Textures/Player.png", TEXTURE_GUID, "png");
    write_build_settings(&project, &[]);

    let state = analyze(&project);
    assert!(!state.is_reachable(&id(SCENE_GUID)));
    // referenced only from an unused scene
    assert!(!state.is_reachable(&id(TEXTURE_GUID)));
}

#[test]
fn time_sliced_session_matches_blocking_session() {
    let dir = TempDir::new().unwrap();
    let project = standard_project(&dir);

    let config = Config::default();
    let content_root = project.join(&config.content_root);
    let candidates = FileFinder::new(&config)
        .find_candidates(&content_root)
        .unwrap();
    let resolver = MetaFileResolver::new();
    let roots = BuildSettingsRoots::new(&project);

    let mut blocking = Session::new(&content_root, candidates.clone(), &resolver, &roots);
    assert_eq!(blocking.run(), PhaseStatus::Finished);

    let mut sliced = Session::new(&content_root, candidates, &resolver, &roots);
    let mut steps = 0;
    while sliced.step(Duration::ZERO) != PhaseStatus::Finished {
        steps += 1;
        assert!(steps < 10_000, "scheduler failed to make progress");
    }

    assert_eq!(sliced.into_state(), blocking.into_state());
}

#[test]
fn removal_invalidates_downstream_assets() {
    let dir = TempDir::new().unwrap();
    let project = standard_project(&dir);

    let mut state = analyze(&project);
    assert!(state.is_reachable(&id(MATERIAL_GUID)));

    // drop the prefab: the material and texture lose their only live path
    let scene_ids = vec![id(SCENE_GUID)];
    state.remove_asset(&id(PREFAB_GUID));
    state.refresh_reachability(&scene_ids);

    assert!(state.is_reachable(&id(SCENE_GUID)));
    assert!(!state.is_reachable(&id(MATERIAL_GUID)));
    assert!(!state.is_reachable(&id(TEXTURE_GUID)));
}

#[test]
fn finished_session_persists_a_loadable_snapshot() {
    let dir = TempDir::new().unwrap();
    let project = standard_project(&dir);
    let cache = project.join("cache.json");

    let config = Config::default();
    let content_root = project.join(&config.content_root);
    let candidates = FileFinder::new(&config)
        .find_candidates(&content_root)
        .unwrap();
    let resolver = MetaFileResolver::new();
    let roots = BuildSettingsRoots::new(&project);

    let mut session = Session::new(&content_root, candidates, &resolver, &roots)
        .with_snapshot_path(&cache);
    assert_eq!(session.run(), PhaseStatus::Finished);
    let state = session.into_state();

    let snapshot = snapshot::load(&cache).unwrap();
    assert_eq!(snapshot.records.len(), state.index.len());
    for (asset_id, _) in &snapshot.records {
        assert_eq!(snapshot.is_reachable(asset_id), state.is_reachable(asset_id));
    }
}
