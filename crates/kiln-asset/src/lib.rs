//! Kiln Asset - Resource provider and material dependency resolution
//!
//! This crate provides the in-memory asset registry, the slot schemas and placeholder
//! textures of the standard material, and the resolver that keeps a material's texture
//! slots consistent while its dependencies load, unload, and change.

mod library;
mod material;
mod placeholder;
mod provider;
mod reference;
mod registry;
mod resolver;
mod slot;
mod texture;
mod types;

pub use library::{MaterialAsset, MaterialLibrary};
pub use material::{Composite, EnvironmentBinding, Material, MaterialData, ShaderVariant, SlotValue};
pub use placeholder::{PlaceholderKind, PlaceholderTextures};
pub use provider::{
    AssetResource, ProviderEvent, ProviderEventKind, ResourceLoader, ResourceProvider,
};
pub use reference::ResourceReference;
pub use registry::{AssetRegistry, LoadState};
pub use resolver::DependencyResolver;
pub use slot::{SlotDecl, SlotSchema, SlotSpec, StandardTextureSlot, CUBE_MAP_SLOT};
pub use texture::{same_texture, CubemapSet, Texture, TextureHandle, TextureKind, PREFILTERED_LEVELS};
pub use types::{resolve_relative, AddressingMode, AssetManifest, AssetMeta, AssetRef, AssetType};
