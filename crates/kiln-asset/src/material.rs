//! Materials: composite resources whose texture slots are filled by other assets

use crate::texture::{TextureHandle, TextureKind};
use crate::types::AddressingMode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Value naming a dependency in material data: a numeric id or a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Id(u64),
    Path(String),
}

/// Source data of a material, as stored by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    #[serde(default)]
    pub name: Option<String>,
    /// Addressing mode for every dependency of this material
    #[serde(default)]
    pub mapping_format: AddressingMode,
    /// Set once the data has been checked against the schema
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub textures: BTreeMap<String, SlotValue>,
    #[serde(default)]
    pub cubemaps: BTreeMap<String, SlotValue>,
    #[serde(default)]
    pub parameters: BTreeMap<String, toml::Value>,
}

impl MaterialData {
    /// Dependency value for a slot of the given shape. Empty paths count as absent.
    pub fn slot_value(&self, shape: TextureKind, slot: &str) -> Option<&SlotValue> {
        let map = match shape {
            TextureKind::Texture2D => &self.textures,
            TextureKind::Cubemap => &self.cubemaps,
        };
        map.get(slot).filter(|v| !matches!(v, SlotValue::Path(p) if p.is_empty()))
    }

    pub fn with_texture(mut self, slot: &str, value: SlotValue) -> Self {
        self.textures.insert(slot.to_string(), value);
        self
    }

    pub fn with_cubemap(mut self, slot: &str, value: SlotValue) -> Self {
        self.cubemaps.insert(slot.to_string(), value);
        self
    }
}

/// What a prefiltered cubemap slot contributes to the material's environment lighting
#[derive(Debug, Clone, Default)]
pub enum EnvironmentBinding {
    #[default]
    None,
    /// Complete prefiltered mip chain
    Prefiltered(Vec<TextureHandle>),
    /// Only the first prefiltered level was available
    Atlas(TextureHandle),
}

impl EnvironmentBinding {
    pub fn is_none(&self) -> bool {
        matches!(self, EnvironmentBinding::None)
    }
}

/// A resource whose dependency slots are managed by a resolver.
///
/// `reinitialize` is the hook invoked whenever a binding changes.
pub trait Composite {
    fn binding(&self, slot: &str) -> Option<&TextureHandle>;
    fn bind(&mut self, slot: &str, texture: TextureHandle);
    /// Remove a slot's binding. Returns the texture that was bound.
    fn unbind(&mut self, slot: &str) -> Option<TextureHandle>;
    fn environment(&self) -> &EnvironmentBinding;
    fn set_environment(&mut self, environment: EnvironmentBinding);
    fn reinitialize(&mut self, data: &MaterialData);
}

/// Shader variant derived from the current bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderVariant {
    /// Slots bound to real (non-placeholder) textures
    pub maps: BTreeSet<String>,
    pub prefiltered_environment: bool,
    pub environment_atlas: bool,
}

impl ShaderVariant {
    /// Preprocessor defines for this variant, e.g. `DIFFUSEMAP`
    pub fn defines(&self) -> Vec<String> {
        let mut defines: Vec<String> = self.maps.iter().map(|m| m.to_uppercase()).collect();
        if self.prefiltered_environment {
            defines.push("PREFILTERED_CUBEMAP".to_string());
        }
        if self.environment_atlas {
            defines.push("ENV_ATLAS".to_string());
        }
        defines
    }
}

/// A renderable material
#[derive(Debug, Default)]
pub struct Material {
    pub name: String,
    bindings: BTreeMap<String, TextureHandle>,
    environment: EnvironmentBinding,
    parameters: BTreeMap<String, toml::Value>,
    variant: ShaderVariant,
    generation: u64,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Number of times derived state has been rebuilt
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn variant(&self) -> &ShaderVariant {
        &self.variant
    }

    pub fn parameter(&self, name: &str) -> Option<&toml::Value> {
        self.parameters.get(name)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &TextureHandle)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Composite for Material {
    fn binding(&self, slot: &str) -> Option<&TextureHandle> {
        self.bindings.get(slot)
    }

    fn bind(&mut self, slot: &str, texture: TextureHandle) {
        self.bindings.insert(slot.to_string(), texture);
    }

    fn unbind(&mut self, slot: &str) -> Option<TextureHandle> {
        self.bindings.remove(slot)
    }

    fn environment(&self) -> &EnvironmentBinding {
        &self.environment
    }

    fn set_environment(&mut self, environment: EnvironmentBinding) {
        self.environment = environment;
    }

    fn reinitialize(&mut self, data: &MaterialData) {
        if let Some(name) = &data.name {
            self.name = name.clone();
        }
        self.parameters = data.parameters.clone();

        self.variant = ShaderVariant {
            maps: self
                .bindings
                .iter()
                .filter(|(_, tex)| !tex.is_placeholder())
                .map(|(slot, _)| slot.clone())
                .collect(),
            prefiltered_environment: matches!(self.environment, EnvironmentBinding::Prefiltered(_)),
            environment_atlas: matches!(self.environment, EnvironmentBinding::Atlas(_)),
        };
        self.generation += 1;
    }
}
