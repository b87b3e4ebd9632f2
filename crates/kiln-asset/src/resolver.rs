//! Dependency resolution for composite resources
//!
//! A [`DependencyResolver`] keeps the texture slots of one composite in step with the
//! provider. Slots whose dependency is missing or still loading hold the placeholder for
//! their category; provider events swap real values in and out as they arrive.

use crate::material::{Composite, EnvironmentBinding, MaterialData, SlotValue};
use crate::placeholder::PlaceholderTextures;
use crate::provider::{AssetResource, ProviderEvent, ProviderEventKind, ResourceProvider};
use crate::reference::ResourceReference;
use crate::slot::{SlotSchema, SlotSpec};
use crate::texture::{same_texture, CubemapSet, TextureHandle, TextureKind};
use crate::types::{resolve_relative, AddressingMode, AssetRef};
use kiln_core::{AssetId, KilnError, Result};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Resolves the dependency slots of one composite resource
pub struct DependencyResolver {
    textures: Rc<SlotSchema>,
    cubemaps: Rc<SlotSchema>,
    placeholders: Rc<PlaceholderTextures>,
    /// Path of the composite itself, base for relative dependency paths
    base_path: Option<String>,
    addressing: Option<AddressingMode>,
    references: BTreeMap<String, ResourceReference>,
    initialized: bool,
}

impl DependencyResolver {
    /// Create a resolver over a texture schema and a cubemap schema.
    ///
    /// Fails if a schema has the wrong shape or a slot name appears in both.
    pub fn new(
        textures: Rc<SlotSchema>,
        cubemaps: Rc<SlotSchema>,
        placeholders: Rc<PlaceholderTextures>,
    ) -> Result<Self> {
        if textures.shape() != TextureKind::Texture2D || cubemaps.shape() != TextureKind::Cubemap {
            return Err(KilnError::ConfigError(
                "resolver needs a 2D texture schema and a cubemap schema".to_string(),
            ));
        }
        if let Some(dup) = textures.slots().iter().find(|s| cubemaps.get(&s.name).is_some()) {
            return Err(KilnError::DuplicateSlot(dup.name.clone()));
        }

        Ok(Self {
            textures,
            cubemaps,
            placeholders,
            base_path: None,
            addressing: None,
            references: BTreeMap::new(),
            initialized: false,
        })
    }

    /// Resolver over the standard material schemas
    pub fn standard(placeholders: Rc<PlaceholderTextures>) -> Self {
        Self {
            textures: Rc::new(SlotSchema::standard_textures()),
            cubemaps: Rc::new(SlotSchema::standard_cubemaps()),
            placeholders,
            base_path: None,
            addressing: None,
            references: BTreeMap::new(),
            initialized: false,
        }
    }

    /// Set the composite's own path, used to resolve relative dependency paths
    pub fn with_base_path(mut self, path: Option<String>) -> Self {
        self.base_path = path;
        self
    }

    /// Bring every slot of `composite` in line with `data`.
    ///
    /// Returns true if any binding changed. Calling it again with unchanged data issues no
    /// further loads and does not re-initialize the composite.
    pub fn resolve<C: Composite + ?Sized>(
        &mut self,
        data: &MaterialData,
        provider: &mut dyn ResourceProvider,
        composite: &mut C,
    ) -> bool {
        let mode = *self.addressing.get_or_insert(data.mapping_format);
        if mode != data.mapping_format {
            log::warn!(
                "addressing mode is fixed to {:?}, ignoring {:?} from updated data",
                mode,
                data.mapping_format
            );
        }

        let mut changed = false;
        let schemas = [Rc::clone(&self.textures), Rc::clone(&self.cubemaps)];
        for schema in &schemas {
            for spec in schema.slots() {
                changed |= self.resolve_slot(spec, schema.shape(), mode, data, provider, composite);
            }
        }

        if changed || !self.initialized {
            composite.reinitialize(data);
            self.initialized = true;
        }
        changed
    }

    /// React to one provider notification. Returns true if a binding changed, in which case
    /// the composite has been re-initialized.
    pub fn handle_event<C: Composite + ?Sized>(
        &mut self,
        event: &ProviderEvent,
        data: &MaterialData,
        provider: &mut dyn ResourceProvider,
        composite: &mut C,
    ) -> bool {
        let mut changed = false;
        let schemas = [Rc::clone(&self.textures), Rc::clone(&self.cubemaps)];
        for schema in &schemas {
            let shape = schema.shape();
            for spec in schema.slots() {
                let Some(reference) = self.references.get_mut(&spec.name) else {
                    continue;
                };
                if !reference.matches(event) {
                    continue;
                }

                match event.kind {
                    ProviderEventKind::Add => {
                        reference.set_asset(Some(event.asset));
                        if !provider.is_loaded(event.asset) {
                            request_load(reference, event.asset, provider);
                        }
                    }
                    ProviderEventKind::Load => {
                        reference.set_asset(Some(event.asset));
                        let resource = event
                            .resource
                            .clone()
                            .or_else(|| provider.resource(event.asset));
                        if let Some(resource) = resource {
                            log::debug!("slot '{}' bound to asset {}", spec.name, event.asset);
                            changed |=
                                bind_resource(&self.placeholders, spec, shape, &resource, composite);
                        }
                    }
                    ProviderEventKind::Remove | ProviderEventKind::Unload => {
                        if holds_resource(composite, spec, event.resource.as_ref()) {
                            log::debug!(
                                "slot '{}' reverted to placeholder, asset {} released",
                                spec.name,
                                event.asset
                            );
                            changed |= bind_placeholder(&self.placeholders, spec, shape, composite);
                        }
                        reference.reset_load();
                        if event.kind == ProviderEventKind::Remove {
                            reference.set_asset(None);
                        }
                    }
                    ProviderEventKind::Change => {
                        if let Some(resource) = provider.resource(event.asset) {
                            if !holds_resource(composite, spec, Some(&resource)) {
                                changed |= bind_resource(
                                    &self.placeholders,
                                    spec,
                                    shape,
                                    &resource,
                                    composite,
                                );
                            }
                        }
                    }
                }
            }
        }

        if changed {
            composite.reinitialize(data);
        }
        changed
    }

    /// Unsubscribe every reference. Used when the composite goes away.
    pub fn clear(&mut self) {
        for reference in self.references.values_mut() {
            reference.clear();
        }
        self.references.clear();
        self.initialized = false;
    }

    pub fn reference(&self, slot: &str) -> Option<&ResourceReference> {
        self.references.get(slot)
    }

    pub fn references(&self) -> impl Iterator<Item = &ResourceReference> {
        self.references.values()
    }

    pub fn addressing(&self) -> Option<AddressingMode> {
        self.addressing
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn resolve_slot<C: Composite + ?Sized>(
        &mut self,
        spec: &SlotSpec,
        shape: TextureKind,
        mode: AddressingMode,
        data: &MaterialData,
        provider: &mut dyn ResourceProvider,
        composite: &mut C,
    ) -> bool {
        let Some(target) = self.target_for(data, shape, &spec.name, mode) else {
            let Some(mut reference) = self.references.remove(&spec.name) else {
                return false;
            };
            reference.clear();
            log::debug!("slot '{}' no longer has a dependency", spec.name);
            let mut changed = composite.unbind(&spec.name).is_some();
            if spec.prefiltered && !composite.environment().is_none() {
                composite.set_environment(EnvironmentBinding::None);
                changed = true;
            }
            return changed;
        };

        let holds_value = composite
            .binding(&spec.name)
            .is_some_and(|tex| !tex.is_placeholder());
        let retargeted = self
            .references
            .get(&spec.name)
            .and_then(|r| r.target())
            != Some(&target);
        if holds_value && data.validated && !retargeted {
            return false;
        }

        let reference = self
            .references
            .entry(spec.name.clone())
            .or_insert_with(|| ResourceReference::new(spec.name.clone(), shape));
        if reference.set_target(target.clone()) {
            log::trace!("slot '{}' targets {}", spec.name, target);
        }

        let Some(asset) = provider.find(&target) else {
            // Unknown to the provider so far; its Add event triggers the load
            reference.set_asset(None);
            return bind_placeholder(&self.placeholders, spec, shape, composite);
        };
        reference.set_asset(Some(asset));

        match provider.resource(asset) {
            Some(resource) => bind_resource(&self.placeholders, spec, shape, &resource, composite),
            None => {
                request_load(reference, asset, provider);
                bind_placeholder(&self.placeholders, spec, shape, composite)
            }
        }
    }

    fn target_for(
        &self,
        data: &MaterialData,
        shape: TextureKind,
        slot: &str,
        mode: AddressingMode,
    ) -> Option<AssetRef> {
        match (mode, data.slot_value(shape, slot)?) {
            (AddressingMode::Id, SlotValue::Id(raw)) => Some(AssetRef::Id(AssetId::from_raw(*raw))),
            (AddressingMode::Path, SlotValue::Path(path)) => Some(AssetRef::Path(resolve_relative(
                self.base_path.as_deref(),
                path,
            ))),
            (mode, value) => {
                log::warn!(
                    "slot '{}' value {:?} does not match addressing mode {:?}, ignored",
                    slot,
                    value,
                    mode
                );
                None
            }
        }
    }
}

fn request_load(
    reference: &mut ResourceReference,
    asset: AssetId,
    provider: &mut dyn ResourceProvider,
) {
    if reference.load_requested() {
        return;
    }
    reference.mark_load_requested();
    log::trace!("slot '{}' requests load of asset {}", reference.name(), asset);
    provider.load(asset);
}

fn bind_texture<C: Composite + ?Sized>(composite: &mut C, slot: &str, texture: TextureHandle) -> bool {
    if composite
        .binding(slot)
        .is_some_and(|bound| same_texture(bound, &texture))
    {
        return false;
    }
    composite.bind(slot, texture);
    true
}

fn set_environment<C: Composite + ?Sized>(composite: &mut C, environment: EnvironmentBinding) -> bool {
    if same_environment(composite.environment(), &environment) {
        return false;
    }
    composite.set_environment(environment);
    true
}

fn bind_placeholder<C: Composite + ?Sized>(
    placeholders: &PlaceholderTextures,
    spec: &SlotSpec,
    shape: TextureKind,
    composite: &mut C,
) -> bool {
    let mut changed = bind_texture(composite, &spec.name, placeholders.get(spec.placeholder, shape));
    if spec.prefiltered {
        changed |= set_environment(composite, EnvironmentBinding::None);
    }
    changed
}

fn bind_resource<C: Composite + ?Sized>(
    placeholders: &PlaceholderTextures,
    spec: &SlotSpec,
    shape: TextureKind,
    resource: &AssetResource,
    composite: &mut C,
) -> bool {
    match (shape, resource) {
        (TextureKind::Texture2D, AssetResource::Texture(texture)) => {
            bind_texture(composite, &spec.name, texture.clone())
        }
        (TextureKind::Cubemap, AssetResource::Cubemap(set)) => {
            let cubemap = set
                .cubemap
                .clone()
                .unwrap_or_else(|| placeholders.get(spec.placeholder, shape));
            let mut changed = bind_texture(composite, &spec.name, cubemap);
            if spec.prefiltered {
                changed |= set_environment(composite, environment_of(set));
            }
            changed
        }
        _ => {
            log::warn!(
                "slot '{}' expects a {:?} resource, keeping placeholder",
                spec.name,
                shape
            );
            bind_placeholder(placeholders, spec, shape, composite)
        }
    }
}

/// Environment lighting a cubemap set can provide: the whole chain, else the first level
fn environment_of(set: &CubemapSet) -> EnvironmentBinding {
    if let Some(chain) = set.complete_chain() {
        EnvironmentBinding::Prefiltered(chain)
    } else if let Some(first) = set.first_level() {
        EnvironmentBinding::Atlas(first)
    } else {
        EnvironmentBinding::None
    }
}

fn same_environment(a: &EnvironmentBinding, b: &EnvironmentBinding) -> bool {
    match (a, b) {
        (EnvironmentBinding::None, EnvironmentBinding::None) => true,
        (EnvironmentBinding::Atlas(a), EnvironmentBinding::Atlas(b)) => same_texture(a, b),
        (EnvironmentBinding::Prefiltered(a), EnvironmentBinding::Prefiltered(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_texture(a, b))
        }
        _ => false,
    }
}

/// True if the slot currently shows a value owned by `resource`
fn holds_resource<C: Composite + ?Sized>(
    composite: &C,
    spec: &SlotSpec,
    resource: Option<&AssetResource>,
) -> bool {
    let Some(bound) = composite.binding(&spec.name) else {
        return false;
    };
    match resource {
        Some(AssetResource::Texture(texture)) => same_texture(bound, texture),
        Some(AssetResource::Cubemap(set)) => {
            let cube = set.cubemap.as_ref().is_some_and(|c| same_texture(bound, c));
            let env = spec.prefiltered && !composite.environment().is_none() && {
                let levels: Vec<&TextureHandle> = set.prefiltered.iter().flatten().collect();
                match composite.environment() {
                    EnvironmentBinding::Atlas(tex) => levels.iter().any(|l| same_texture(l, tex)),
                    EnvironmentBinding::Prefiltered(chain) => chain
                        .iter()
                        .any(|tex| levels.iter().any(|l| same_texture(l, tex))),
                    EnvironmentBinding::None => false,
                }
            };
            cube || env
        }
        _ => false,
    }
}
