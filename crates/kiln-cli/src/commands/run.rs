//! Headless run command

use anyhow::{bail, Context, Result};
use kiln_asset::{
    AddressingMode, AssetMeta, AssetRegistry, AssetResource, AssetType, MaterialData,
    MaterialLibrary, ResourceLoader, SlotValue, Texture, TextureKind,
};
use kiln_core::{AssetId, KilnError};
use kiln_render::{DrawItem, HeadlessBackend, Layer, LayerComposition, RenderTarget};
use kiln_runtime::{
    init_logging, AppConfig, Application, AssetSystem, LifecycleEvent, ManualFrameSource,
};
use std::cell::RefCell;
use std::rc::Rc;

pub struct RunArgs {
    pub config: Option<String>,
    pub frames: u32,
    pub fps: f64,
    pub loads_per_frame: usize,
}

const MATERIAL_PATH: &str = "materials/crate.toml";
const TEXTURES: [(&str, &str, &str); 3] = [
    ("diffuseMap", "crate_albedo", "textures/crate_albedo.png"),
    ("normalMap", "crate_normal", "textures/crate_normal.png"),
    ("metalnessMap", "crate_metal", "textures/crate_metal.png"),
];

/// Synthesizes textures from their metadata instead of reading files
struct DemoLoader;

impl ResourceLoader for DemoLoader {
    fn load(&mut self, id: AssetId, meta: &AssetMeta) -> kiln_core::Result<AssetResource> {
        let size = meta
            .properties
            .get("size")
            .and_then(|v| v.as_integer())
            .unwrap_or(256);
        let size = u32::try_from(size)
            .map_err(|_| KilnError::AssetLoadFailed(format!("bad size for {}", meta.name)))?;
        Ok(AssetResource::Texture(
            Texture::new(meta.name.clone(), TextureKind::Texture2D, size, size)
                .from_asset(id)
                .into_handle(),
        ))
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    if !(args.fps > 0.0) {
        bail!("--fps must be greater than zero");
    }

    let config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => AppConfig::default(),
    }
    .with_env_overrides()
    .context("Invalid environment override")?;
    init_logging(config.logging_config());

    let registry = Rc::new(RefCell::new(AssetRegistry::new()));
    let library = Rc::new(RefCell::new(
        MaterialLibrary::with_texture_slots(&config.resolver.texture_slots)
            .context("Invalid [resolver] section")?,
    ));
    let material = register_demo_assets(&mut registry.borrow_mut());

    let source = ManualFrameSource::new();
    let mut app = Application::new(HeadlessBackend::new(1280, 720), source.clone());
    *app.composition_mut() = demo_composition();
    app.add_system(Box::new(
        AssetSystem::new(
            Rc::clone(&registry),
            Rc::clone(&library),
            Box::new(DemoLoader),
        )
        .with_loads_per_frame(args.loads_per_frame),
    ));

    let bound = Rc::new(RefCell::new(Vec::new()));
    {
        let library = Rc::clone(&library);
        let bound = Rc::clone(&bound);
        app.on(LifecycleEvent::FrameEnd, move |frame| {
            let library = library.borrow();
            let Some(mat) = library.get(material) else {
                return;
            };
            let real = mat.bindings().filter(|(_, t)| !t.is_placeholder()).count();
            let mut bound = bound.borrow_mut();
            if bound.last().map(|(_, n)| *n) != Some(real) {
                bound.push((frame.frame, real));
            }
        });
    }

    app.initialize(config)
        .context("Failed to initialize application")?;

    let interval = 1000.0 / args.fps;
    log::info!("running {} frames at {} fps", args.frames, args.fps);
    app.start(0.0).context("Failed to start application")?;
    for i in 1..=args.frames {
        source.fire();
        app.tick(f64::from(i) * interval)
            .with_context(|| format!("Frame {} failed", i))?;
    }

    print_report(&app, &library.borrow(), material, &bound.borrow());

    app.destroy().context("Failed to destroy application")?;
    println!("Destroyed after {} frames", app.handle().frame());
    Ok(())
}

fn register_demo_assets(registry: &mut AssetRegistry) -> AssetId {
    let mut data = MaterialData {
        name: Some("crate".to_string()),
        mapping_format: AddressingMode::Path,
        validated: true,
        ..MaterialData::default()
    };

    for (slot, name, path) in TEXTURES {
        registry.register(AssetMeta::new(name, AssetType::Texture).with_path(path));
        data = data.with_texture(slot, SlotValue::Path(format!("../{}", path)));
    }

    registry.register_loaded(
        AssetMeta::new("crate", AssetType::Material).with_path(MATERIAL_PATH),
        AssetResource::Material(data),
    )
}

fn demo_composition() -> LayerComposition {
    let mut composition = LayerComposition::new();
    composition.push(
        Layer::new(0, "world")
            .with_clear(true)
            .with_item(DrawItem::new("crate-a", 12).with_batch_key(1))
            .with_item(DrawItem::new("crate-b", 12).with_batch_key(1))
            .with_item(DrawItem::new("floor", 2))
            .with_item(DrawItem::new("behind-camera", 400).hidden()),
    );
    composition.push(Layer::new(1, "decals").with_item(DrawItem::new("scorch", 2)));
    composition.push(
        Layer::new(2, "ui")
            .with_target(RenderTarget::Offscreen("hud".to_string()))
            .with_clear(true)
            .with_item(DrawItem::new("hud", 8)),
    );
    composition
}

fn print_report(
    app: &Application<HeadlessBackend>,
    library: &MaterialLibrary,
    material: AssetId,
    bound: &[(u64, usize)],
) {
    let stats = app.stats();
    let backend = app.backend();

    println!("Ran {} frames", stats.frame + 1);
    println!("  last dt:     {:.4}s ({:.1} ms)", stats.dt, stats.ms);
    println!("  fps:         {}", stats.fps);
    println!("  draw calls:  {}", stats.draw_calls);
    println!("  primitives:  {}", stats.primitives);
    println!("  passes:      {}", backend.executed_passes().join(", "));

    if let Some(mat) = library.get(material) {
        println!("Material '{}':", mat.name);
        for (slot, texture) in mat.bindings() {
            let state = if texture.is_placeholder() {
                "placeholder"
            } else {
                "loaded"
            };
            println!(
                "  {:<14} {:<12} {} ({}x{})",
                slot, state, texture.label, texture.width, texture.height
            );
        }
        for (frame, count) in bound {
            println!("  frame {:>4}: {} real textures bound", frame, count);
        }
    }
}
