//! Dependency slot schemas
//!
//! A schema is the fixed, ordered list of slot names a composite type resolves, each with
//! exactly one placeholder. Built-in slots get their placeholder from an exhaustive match;
//! slots declared in configuration must name one explicitly.

use crate::placeholder::PlaceholderKind;
use crate::texture::TextureKind;
use kiln_core::{KilnError, Result};
use serde::{Deserialize, Serialize};

/// Texture slots of the standard material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardTextureSlot {
    AoMap,
    DiffuseMap,
    SpecularMap,
    SpecularityFactorMap,
    MetalnessMap,
    GlossMap,
    SheenMap,
    SheenGlossMap,
    ClearCoatMap,
    ClearCoatGlossMap,
    ClearCoatNormalMap,
    RefractionMap,
    EmissiveMap,
    NormalMap,
    HeightMap,
    OpacityMap,
    SphereMap,
    LightMap,
    ThicknessMap,
    IridescenceMap,
    IridescenceThicknessMap,
}

impl StandardTextureSlot {
    pub const ALL: [StandardTextureSlot; 21] = [
        StandardTextureSlot::AoMap,
        StandardTextureSlot::DiffuseMap,
        StandardTextureSlot::SpecularMap,
        StandardTextureSlot::SpecularityFactorMap,
        StandardTextureSlot::MetalnessMap,
        StandardTextureSlot::GlossMap,
        StandardTextureSlot::SheenMap,
        StandardTextureSlot::SheenGlossMap,
        StandardTextureSlot::ClearCoatMap,
        StandardTextureSlot::ClearCoatGlossMap,
        StandardTextureSlot::ClearCoatNormalMap,
        StandardTextureSlot::RefractionMap,
        StandardTextureSlot::EmissiveMap,
        StandardTextureSlot::NormalMap,
        StandardTextureSlot::HeightMap,
        StandardTextureSlot::OpacityMap,
        StandardTextureSlot::SphereMap,
        StandardTextureSlot::LightMap,
        StandardTextureSlot::ThicknessMap,
        StandardTextureSlot::IridescenceMap,
        StandardTextureSlot::IridescenceThicknessMap,
    ];

    /// Key used in material data
    pub fn name(self) -> &'static str {
        match self {
            StandardTextureSlot::AoMap => "aoMap",
            StandardTextureSlot::DiffuseMap => "diffuseMap",
            StandardTextureSlot::SpecularMap => "specularMap",
            StandardTextureSlot::SpecularityFactorMap => "specularityFactorMap",
            StandardTextureSlot::MetalnessMap => "metalnessMap",
            StandardTextureSlot::GlossMap => "glossMap",
            StandardTextureSlot::SheenMap => "sheenMap",
            StandardTextureSlot::SheenGlossMap => "sheenGlossMap",
            StandardTextureSlot::ClearCoatMap => "clearCoatMap",
            StandardTextureSlot::ClearCoatGlossMap => "clearCoatGlossMap",
            StandardTextureSlot::ClearCoatNormalMap => "clearCoatNormalMap",
            StandardTextureSlot::RefractionMap => "refractionMap",
            StandardTextureSlot::EmissiveMap => "emissiveMap",
            StandardTextureSlot::NormalMap => "normalMap",
            StandardTextureSlot::HeightMap => "heightMap",
            StandardTextureSlot::OpacityMap => "opacityMap",
            StandardTextureSlot::SphereMap => "sphereMap",
            StandardTextureSlot::LightMap => "lightMap",
            StandardTextureSlot::ThicknessMap => "thicknessMap",
            StandardTextureSlot::IridescenceMap => "iridescenceMap",
            StandardTextureSlot::IridescenceThicknessMap => "iridescenceThicknessMap",
        }
    }

    pub fn placeholder(self) -> PlaceholderKind {
        use PlaceholderKind::*;
        match self {
            StandardTextureSlot::AoMap => White,
            StandardTextureSlot::DiffuseMap => Gray,
            StandardTextureSlot::SpecularMap => Gray,
            StandardTextureSlot::SpecularityFactorMap => White,
            StandardTextureSlot::MetalnessMap => Black,
            StandardTextureSlot::GlossMap => Gray,
            StandardTextureSlot::SheenMap => Black,
            StandardTextureSlot::SheenGlossMap => Gray,
            StandardTextureSlot::ClearCoatMap => Black,
            StandardTextureSlot::ClearCoatGlossMap => Gray,
            StandardTextureSlot::ClearCoatNormalMap => Normal,
            StandardTextureSlot::RefractionMap => White,
            StandardTextureSlot::EmissiveMap => Gray,
            StandardTextureSlot::NormalMap => Normal,
            StandardTextureSlot::HeightMap => Gray,
            StandardTextureSlot::OpacityMap => Gray,
            StandardTextureSlot::SphereMap => Gray,
            StandardTextureSlot::LightMap => White,
            StandardTextureSlot::ThicknessMap => Black,
            StandardTextureSlot::IridescenceMap => Black,
            StandardTextureSlot::IridescenceThicknessMap => Black,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

/// Cubemap slot of the standard material carrying the prefiltered environment
pub const CUBE_MAP_SLOT: &str = "cubeMap";

/// A slot declaration as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDecl {
    pub name: String,
    #[serde(default)]
    pub placeholder: Option<PlaceholderKind>,
    #[serde(default)]
    pub prefiltered: bool,
}

/// A validated slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    pub name: String,
    pub placeholder: PlaceholderKind,
    /// Cubemap slot whose asset carries a prefiltered chain
    pub prefiltered: bool,
}

/// Ordered, validated list of slots for one composite type and texture shape
#[derive(Debug, Clone)]
pub struct SlotSchema {
    shape: TextureKind,
    slots: Vec<SlotSpec>,
}

impl SlotSchema {
    /// Texture slots of the standard material
    pub fn standard_textures() -> Self {
        Self {
            shape: TextureKind::Texture2D,
            slots: StandardTextureSlot::ALL
                .iter()
                .map(|slot| SlotSpec {
                    name: slot.name().to_string(),
                    placeholder: slot.placeholder(),
                    prefiltered: false,
                })
                .collect(),
        }
    }

    /// Cubemap slots of the standard material
    pub fn standard_cubemaps() -> Self {
        Self {
            shape: TextureKind::Cubemap,
            slots: vec![SlotSpec {
                name: CUBE_MAP_SLOT.to_string(),
                placeholder: PlaceholderKind::Black,
                prefiltered: true,
            }],
        }
    }

    /// An empty schema for the given texture shape
    pub fn empty(shape: TextureKind) -> Self {
        Self {
            shape,
            slots: Vec::new(),
        }
    }

    /// Append declared slots. Every declaration must carry a placeholder.
    pub fn with_declared(mut self, decls: &[SlotDecl]) -> Result<Self> {
        for decl in decls {
            let placeholder = decl
                .placeholder
                .ok_or_else(|| KilnError::MissingPlaceholder(decl.name.clone()))?;
            if self.get(&decl.name).is_some() {
                return Err(KilnError::DuplicateSlot(decl.name.clone()));
            }
            self.slots.push(SlotSpec {
                name: decl.name.clone(),
                placeholder,
                prefiltered: decl.prefiltered && self.shape == TextureKind::Cubemap,
            });
        }
        Ok(self)
    }

    pub fn shape(&self) -> TextureKind {
        self.shape
    }

    pub fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    pub fn get(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
