//! Extraction tests: script heuristics, manifests and resources end to end

use searchunusedassets::analysis::{PhaseStatus, Session};
use searchunusedassets::config::Config;
use searchunusedassets::discovery::FileFinder;
use searchunusedassets::identity::{meta_path_for, AssetId, MetaFileResolver};
use searchunusedassets::roots::BuildSettingsRoots;
use searchunusedassets::AnalysisState;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCENE_GUID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const PLAYER_GUID: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const WEAPON_GUID: &str = "cccccccccccccccccccccccccccccccc";
const GHOST_GUID: &str = "dddddddddddddddddddddddddddddddd";
const ICON_GUID: &str = "eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";
const ASMDEF_GUID: &str = "ffffffffffffffffffffffffffffffff";
const EDITOR_GUID: &str = "1111111111111111111111111111111a";

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

fn analyze(project: &Path) -> AnalysisState {
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
fn script_symbol_reference_keeps_declaring_script_alive() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();

    write_asset(
        project,
        "Assets/Scenes/Main.unity",
        SCENE_GUID,
        &format!("  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n", PLAYER_GUID),
    );
    write_asset(
        project,
        "Assets/Scripts/Player.cs",
        PLAYER_GUID,
        "public class Player {\n    private Weapon weapon;\n}\n",
    );
    write_asset(
        project,
        "Assets/Scripts/Weapon.cs",
        WEAPON_GUID,
        "public class Weapon {}\n",
    );
    write_asset(
        project,
        "Assets/Scripts/Ghost.cs",
        GHOST_GUID,
        "public class Ghost {}\n",
    );
    write_build_settings(project, &["Assets/Scenes/Main.unity"]);

    let state = analyze(project);
    assert!(state.is_reachable(&id(PLAYER_GUID)));
    assert!(state.is_reachable(&id(WEAPON_GUID)));
    assert!(!state.is_reachable(&id(GHOST_GUID)));
}

#[test]
fn commented_out_symbol_mention_does_not_count() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();

    write_asset(
        project,
        "Assets/Scenes/Main.unity",
        SCENE_GUID,
        &format!("  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n", PLAYER_GUID),
    );
    write_asset(
        project,
        "Assets/Scripts/Player.cs",
        PLAYER_GUID,
        "public class Player {\n    // Weapon weapon; retired in v2\n    /* new Weapon() */\n}\n",
    );
    write_asset(
        project,
        "Assets/Scripts/Weapon.cs",
        WEAPON_GUID,
        "public class Weapon {}\n",
    );
    write_build_settings(project, &["Assets/Scenes/Main.unity"]);

    let state = analyze(project);
    assert!(!state.is_reachable(&id(WEAPON_GUID)));
}

#[test]
fn resources_load_literal_resolves_to_the_asset() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();

    write_asset(
        project,
        "Assets/Scenes/Main.unity",
        SCENE_GUID,
        &format!("  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n", PLAYER_GUID),
    );
    write_asset(
        project,
        "Assets/Scripts/Player.cs",
        PLAYER_GUID,
        "public class Player {\n    void Start() {\n        var icon = Resources.Load<Sprite>(\"UI/Icon\");\n    }\n}\n",
    );
    write_asset(project, "Assets/Resources/UI/Icon.png", ICON_GUID, "png");
    write_build_settings(project, &["Assets/Scenes/Main.unity"]);

    let state = analyze(project);
    assert!(state.is_reachable(&id(ICON_GUID)));
}

#[test]
fn computed_resources_load_argument_is_ignored() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();

    write_asset(
        project,
        "Assets/Scenes/Main.unity",
        SCENE_GUID,
        &format!("  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n", PLAYER_GUID),
    );
    write_asset(
        project,
        "Assets/Scripts/Player.cs",
        PLAYER_GUID,
        "public class Player {\n    void Start() {\n        var icon = Resources.Load(iconName);\n    }\n}\n",
    );
    write_asset(project, "Assets/Resources/UI/Icon.png", ICON_GUID, "png");
    write_build_settings(project, &["Assets/Scenes/Main.unity"]);

    let state = analyze(project);
    // conservative: a computed path cannot prove use
    assert!(!state.is_reachable(&id(ICON_GUID)));
}

#[test]
fn used_script_keeps_its_assembly_manifest_alive() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();

    write_asset(
        project,
        "Assets/Scenes/Main.unity",
        SCENE_GUID,
        &format!("  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n", PLAYER_GUID),
    );
    write_asset(
        project,
        "Assets/Game/Game.asmdef",
        ASMDEF_GUID,
        "{\n    \"name\": \"Game\",\n    \"references\": []\n}\n",
    );
    write_asset(
        project,
        "Assets/Game/Player.cs",
        PLAYER_GUID,
        "public class Player {}\n",
    );
    write_build_settings(project, &["Assets/Scenes/Main.unity"]);

    let state = analyze(project);
    assert!(state.is_reachable(&id(PLAYER_GUID)));
    // ownership edge runs script -> manifest
    assert!(state.is_reachable(&id(ASMDEF_GUID)));
}

#[test]
fn custom_editor_follows_its_inspected_script() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();

    write_asset(
        project,
        "Assets/Scenes/Main.unity",
        SCENE_GUID,
        &format!("  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n", PLAYER_GUID),
    );
    write_asset(
        project,
        "Assets/Scripts/Player.cs",
        PLAYER_GUID,
        "public class Player {}\n",
    );
    write_asset(
        project,
        "Assets/Editor/PlayerEditor.cs",
        EDITOR_GUID,
        "using UnityEditor;\n[CustomEditor(typeof(Player))]\npublic class PlayerEditor {}\n",
    );
    write_build_settings(project, &["Assets/Scenes/Main.unity"]);

    let state = analyze(project);
    assert!(state.is_reachable(&id(PLAYER_GUID)));
    assert!(state.is_reachable(&id(EDITOR_GUID)));
}

#[test]
fn same_named_classes_both_count_as_referenced() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();

    write_asset(
        project,
        "Assets/Scenes/Main.unity",
        SCENE_GUID,
        &format!("  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n", PLAYER_GUID),
    );
    write_asset(
        project,
        "Assets/Scripts/Player.cs",
        PLAYER_GUID,
        "public class Player {\n    Weapon weapon;\n}\n",
    );
    // two scripts declare Weapon; telling them apart needs real semantics
    write_asset(
        project,
        "Assets/Scripts/Weapon.cs",
        WEAPON_GUID,
        "public class Weapon {}\n",
    );
    write_asset(
        project,
        "Assets/Legacy/Weapon.cs",
        GHOST_GUID,
        "public class Weapon {}\n",
    );
    write_build_settings(project, &["Assets/Scenes/Main.unity"]);

    let state = analyze(project);
    assert!(state.is_reachable(&id(WEAPON_GUID)));
    assert!(state.is_reachable(&id(GHOST_GUID)));
}
