//! Asset kind classification from file extensions
//!
//! Classification is driven by a single flat table of known Unity suffixes,
//! partitioned into contiguous ranges that each map to one [`AssetKind`].
//! Looking up a kind is one index search plus a range test, never a
//! per-kind scan. Two content probes sit on top of the table:
//!
//! - `.cs` files importing the editor-only API are reclassified as
//!   [`AssetKind::EditorTool`] instead of plain script
//! - unknown suffixes fall back to a small ASCII sniff that distinguishes
//!   text files from binary blobs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Largest file the text-sniff fallback will open, in bytes
const MAX_SNIFF_FILE_SIZE: u64 = 100_000;

/// How many leading bytes the text sniff inspects
const SNIFF_LEN: usize = 100;

/// Marker that flags a script as editor-only tooling
const EDITOR_API_MARKER: &str = "using UnityEditor";

/// Semantic category of an asset, derived from its file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    None,
    Model,
    Animation,
    Assembly,
    Audio,
    Avatar,
    BuildReport,
    Curves,
    EditorTool,
    Font,
    IhvImage,
    Localization,
    Material,
    Plugin,
    Prefab,
    Preset,
    Scene,
    Script,
    ScriptableObject,
    Shader,
    Substance,
    Colors,
    Terrain,
    Texture,
    GuiSkin,
    Video,
    VisualEffect,
    Text,
}

impl AssetKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            AssetKind::None => "unknown",
            AssetKind::Model => "3D model",
            AssetKind::Animation => "animation",
            AssetKind::Assembly => "assembly definition",
            AssetKind::Audio => "audio",
            AssetKind::Avatar => "avatar",
            AssetKind::BuildReport => "build report",
            AssetKind::Curves => "curves",
            AssetKind::EditorTool => "editor tool",
            AssetKind::Font => "font",
            AssetKind::IhvImage => "vendor image",
            AssetKind::Localization => "localization",
            AssetKind::Material => "material",
            AssetKind::Plugin => "plugin",
            AssetKind::Prefab => "prefab",
            AssetKind::Preset => "preset",
            AssetKind::Scene => "scene",
            AssetKind::Script => "script",
            AssetKind::ScriptableObject => "scriptable object",
            AssetKind::Shader => "shader",
            AssetKind::Substance => "substance",
            AssetKind::Colors => "colors",
            AssetKind::Terrain => "terrain",
            AssetKind::Texture => "texture",
            AssetKind::GuiSkin => "GUI skin",
            AssetKind::Video => "video",
            AssetKind::VisualEffect => "visual effect",
            AssetKind::Text => "text",
        }
    }

    /// Kinds serialized as line-oriented text with `guid:` references
    ///
    /// These are the formats the structured key-value scanner understands.
    /// Fonts qualify only through `.fontsettings`, which the extractor
    /// checks against the extension separately.
    pub fn uses_text_serialization(&self) -> bool {
        matches!(
            self,
            AssetKind::Animation
                | AssetKind::Avatar
                | AssetKind::Curves
                | AssetKind::Font
                | AssetKind::Material
                | AssetKind::Prefab
                | AssetKind::Preset
                | AssetKind::ScriptableObject
                | AssetKind::Colors
                | AssetKind::Terrain
                | AssetKind::GuiSkin
        )
    }

    /// Source-code kinds that feed the symbol table and symbol scanner
    pub fn is_source_code(&self) -> bool {
        matches!(self, AssetKind::Script | AssetKind::EditorTool)
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Every suffix Unity treats as an importable asset, grouped by kind.
/// Order matters: `KIND_RANGES` slices this list into contiguous runs.
#[rustfmt::skip]
const KNOWN_EXTENSIONS: &[&str] = &[
    // 3D model
    "fbx", "mb", "ma", "max", "jas", "dae", "dxf", "obj", "c4d", "blend",
    "lxo", "mesh", "3ds", "skp",
    // Animation
    "anim", "controller", "overridecontroller", "blendtree", "animset",
    "playable", "state", "statemachine", "signal", "transition",
    // Assembly
    "asmdef", "asmref",
    // Audio
    "ogg", "aif", "aiff", "flac", "wav", "mp3", "mod", "it", "s3m", "xm",
    "mixer",
    // Avatar
    "ht", "mask",
    // Build report
    "buildreport",
    // Curves
    "curves", "curvesnormalized",
    // Font
    "fontsettings", "ttf", "dfont", "otf", "ttc",
    // Independent hardware vendor images
    "astc", "dds", "ktx", "pvr",
    // Localization
    "po",
    // Material
    "mat", "cubemap", "physicmaterial", "physicsmaterial2d",
    // Plugin
    "dll", "winmd", "so", "jar", "java", "kt", "aar", "suprx", "prx", "rpl",
    "cpp", "cc", "c", "h", "jslib", "jspre", "bc", "a", "m", "mm", "swift",
    "xib", "bundle", "dylib", "config",
    // Prefab
    "prefab",
    // Preset
    "preset",
    // Scene
    "rsp", "unity",
    // Script
    "cs",
    // Scriptable object
    "asset",
    // Shader
    "compute", "raytrace", "cginc", "cg", "glslinc", "hlsl", "shader",
    "shadervariants", "shadergraph", "shadersubgraph",
    // Substance
    "sbsar",
    // Colors
    "colors", "gradients",
    // Terrain
    "brush", "terrainlayer", "spm", "st",
    // Texture
    "jpg", "jpeg", "tif", "tiff", "tga", "gif", "png", "psd", "bmp", "iff",
    "pict", "pic", "pct", "exr", "hdr", "rendertexture", "texture2d",
    "spriteatlas", "webcamtexture",
    // GUI skin
    "guiskin",
    // Video
    "avi", "asf", "wmv", "mov", "dv", "mp4", "m4v", "mpg", "mpeg", "ogv",
    "vp8", "webm",
    // Visual effects
    "flare", "giparams", "vfx", "vfxoperator", "vfxblock", "particlecurves",
    "particlecurvessigned", "particledoublecurves",
    "particledoublecurvessigned", "lighting",
];

/// Inclusive index ranges into `KNOWN_EXTENSIONS`, one per kind
const KIND_RANGES: &[(usize, usize, AssetKind)] = &[
    (0, 13, AssetKind::Model),
    (14, 23, AssetKind::Animation),
    (24, 25, AssetKind::Assembly),
    (26, 36, AssetKind::Audio),
    (37, 38, AssetKind::Avatar),
    (39, 39, AssetKind::BuildReport),
    (40, 41, AssetKind::Curves),
    (42, 46, AssetKind::Font),
    (47, 50, AssetKind::IhvImage),
    (51, 51, AssetKind::Localization),
    (52, 55, AssetKind::Material),
    (56, 80, AssetKind::Plugin),
    (81, 81, AssetKind::Prefab),
    (82, 82, AssetKind::Preset),
    (83, 84, AssetKind::Scene),
    (85, 85, AssetKind::Script),
    (86, 86, AssetKind::ScriptableObject),
    (87, 96, AssetKind::Shader),
    (97, 97, AssetKind::Substance),
    (98, 99, AssetKind::Colors),
    (100, 103, AssetKind::Terrain),
    (104, 122, AssetKind::Texture),
    (123, 123, AssetKind::GuiSkin),
    (124, 135, AssetKind::Video),
    (136, 145, AssetKind::VisualEffect),
];

/// Extension of font assets that carry text-serialized guid references
pub const FONT_SETTINGS_EXTENSION: &str = "fontsettings";

/// Classify a bare file suffix (without the leading dot, any case)
///
/// Returns [`AssetKind::None`] for suffixes outside the known table.
/// Table-only: the editor-tool and text-sniff probes need file content
/// and live in [`classify_path`].
pub fn classify_suffix(suffix: &str) -> AssetKind {
    let lowered = suffix.to_ascii_lowercase();

    let index = match KNOWN_EXTENSIONS.iter().position(|ext| *ext == lowered) {
        Some(index) => index,
        None => return AssetKind::None,
    };

    for &(start, end, kind) in KIND_RANGES {
        if index >= start && index <= end {
            return kind;
        }
    }

    AssetKind::None
}

/// Classify a file on disk, applying the content probes
pub fn classify_path(path: &Path) -> AssetKind {
    let suffix = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => ext,
        None => return AssetKind::None,
    };

    match classify_suffix(suffix) {
        AssetKind::Script => {
            if is_editor_script(path) {
                AssetKind::EditorTool
            } else {
                AssetKind::Script
            }
        }
        AssetKind::None => {
            if is_text_file(path) {
                AssetKind::Text
            } else {
                AssetKind::None
            }
        }
        kind => kind,
    }
}

/// A script importing the editor API only exists inside the editor
fn is_editor_script(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(text) => text.contains(EDITOR_API_MARKER),
        Err(_) => false,
    }
}

/// Sniff the first bytes of an unrecognized file: pure 7-bit ASCII is
/// treated as text, anything else (or anything oversized) is opaque
fn is_text_file(path: &Path) -> bool {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => return false,
    };

    if size >= MAX_SNIFF_FILE_SIZE {
        return false;
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    bytes.iter().take(SNIFF_LEN).all(|byte| byte.is_ascii())
}
