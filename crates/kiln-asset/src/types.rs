//! Asset type definitions

use kiln_core::AssetId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Types of assets the provider manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Texture,
    Cubemap,
    Material,
}

/// Metadata for a registered asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetMeta {
    #[serde(default)]
    pub id: Option<AssetId>,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// Location of the asset, used for path-addressed lookups
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, toml::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AssetMeta {
    pub fn new(name: impl Into<String>, asset_type: AssetType) -> Self {
        Self {
            id: None,
            name: name.into(),
            asset_type,
            path: None,
            properties: HashMap::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_id(mut self, id: AssetId) -> Self {
        self.id = Some(id);
        self
    }
}

/// A reference to an asset by one of the two addressing modes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetRef {
    /// Reference by provider id
    Id(AssetId),
    /// Reference by absolute path
    Path(String),
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetRef::Id(id) => write!(f, "id:{}", id),
            AssetRef::Path(path) => write!(f, "path:{}", path),
        }
    }
}

/// How a composite's data names its dependencies. One mode per composite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingMode {
    #[default]
    Id,
    Path,
}

/// TOML manifest listing assets to register
#[derive(Debug, Default, Deserialize)]
pub struct AssetManifest {
    #[serde(default, rename = "asset")]
    pub assets: Vec<AssetMeta>,
}

/// Resolve `relative` against the directory containing `base`.
///
/// Absolute paths (leading `/`) and URLs with a scheme are returned unchanged.
/// `.` and `..` segments are collapsed; `..` above the root is dropped.
pub fn resolve_relative(base: Option<&str>, relative: &str) -> String {
    if relative.starts_with('/') || relative.contains("://") {
        return relative.to_string();
    }

    let mut segments: Vec<&str> = match base {
        Some(base) => {
            let mut parts: Vec<&str> = base.split('/').collect();
            // Drop the file name of the base
            parts.pop();
            parts
        }
        None => Vec::new(),
    };

    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(s) if !s.is_empty()) {
                    segments.pop();
                }
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_manifest_serde() {
        let toml_str = r#"
[[asset]]
id = 7
name = "stone_diffuse"
type = "texture"
path = "textures/stone.png"
tags = ["stone"]

[[asset]]
name = "sky"
type = "cubemap"
"#;

        let manifest: AssetManifest = toml::from_str(toml_str).unwrap();
        assert_eq!(manifest.assets.len(), 2);
        assert_eq!(manifest.assets[0].id, Some(AssetId::from_raw(7)));
        assert_eq!(manifest.assets[0].asset_type, AssetType::Texture);
        assert_eq!(manifest.assets[1].asset_type, AssetType::Cubemap);
        assert!(manifest.assets[1].path.is_none());
    }

    #[test]
    fn test_addressing_mode_default_is_id() {
        assert_eq!(AddressingMode::default(), AddressingMode::Id);
    }

    #[test]
    fn test_resolve_relative_sibling() {
        assert_eq!(
            resolve_relative(Some("materials/stone.json"), "stone.png"),
            "materials/stone.png"
        );
    }

    #[test]
    fn test_resolve_relative_parent() {
        assert_eq!(
            resolve_relative(Some("materials/rock/stone.json"), "../../textures/./stone.png"),
            "textures/stone.png"
        );
    }

    #[test]
    fn test_resolve_relative_absolute_passthrough() {
        assert_eq!(
            resolve_relative(Some("materials/stone.json"), "/cdn/stone.png"),
            "/cdn/stone.png"
        );
        assert_eq!(
            resolve_relative(Some("materials/stone.json"), "https://host/a.png"),
            "https://host/a.png"
        );
    }

    #[test]
    fn test_resolve_relative_without_base() {
        assert_eq!(resolve_relative(None, "./a/b.png"), "a/b.png");
    }
}
