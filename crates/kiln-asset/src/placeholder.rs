//! Deterministic placeholder textures for unresolved dependency slots

use crate::texture::{Texture, TextureHandle, TextureKind};
use kiln_core::{Color, KilnError};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::str::FromStr;

/// Category of fallback value a slot shows while its dependency is unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    /// Opaque white, neutral for multiplicative maps (ao, light)
    White,
    /// Mid gray, neutral color
    Gray,
    /// Opaque black, "no contribution" for additive factors
    Black,
    /// Flat tangent-space normal
    Normal,
}

impl PlaceholderKind {
    pub fn color(self) -> Color {
        match self {
            PlaceholderKind::White => Color::WHITE,
            PlaceholderKind::Gray => Color::GRAY,
            PlaceholderKind::Black => Color::BLACK,
            PlaceholderKind::Normal => Color::FLAT_NORMAL,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlaceholderKind::White => "white",
            PlaceholderKind::Gray => "gray",
            PlaceholderKind::Black => "black",
            PlaceholderKind::Normal => "normal",
        }
    }
}

impl FromStr for PlaceholderKind {
    type Err = KilnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(PlaceholderKind::White),
            "gray" | "grey" => Ok(PlaceholderKind::Gray),
            "black" => Ok(PlaceholderKind::Black),
            "normal" => Ok(PlaceholderKind::Normal),
            other => Err(KilnError::UnknownPlaceholder(other.to_string())),
        }
    }
}

/// Lazily created 1x1 placeholder textures, one per (kind, shape).
///
/// Shared by every material of a library; the same handle is returned on each lookup so
/// bindings can be compared by identity.
#[derive(Debug, Default)]
pub struct PlaceholderTextures {
    textures: RefCell<HashMap<(PlaceholderKind, TextureKind), TextureHandle>>,
}

impl PlaceholderTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (creating on first use) the placeholder for a kind and texture shape
    pub fn get(&self, kind: PlaceholderKind, shape: TextureKind) -> TextureHandle {
        self.textures
            .borrow_mut()
            .entry((kind, shape))
            .or_insert_with(|| {
                let label = match shape {
                    TextureKind::Texture2D => format!("placeholder-{}", kind.name()),
                    TextureKind::Cubemap => format!("placeholder-cube-{}", kind.name()),
                };
                let mut texture = Texture::new(label, shape, 1, 1);
                texture.placeholder = Some(kind);
                texture.texel = Some(kind.color().to_rgba8());
                texture.into_handle()
            })
            .clone()
    }

    /// Number of placeholder textures created so far
    pub fn len(&self) -> usize {
        self.textures.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.borrow().is_empty()
    }
}
