//! Kiln Runtime - Application frame lifecycle
//!
//! Provides the pieces that drive an application from start to destroy:
//! - `Application` / `AppHandle` - lifecycle, per-frame tick, deferred destroy
//! - `FrameClock` - wall-clock to scaled, clamped delta time
//! - `EventEmitter` - named lifecycle events with `on` / `once` / `off`
//! - `RuntimeSystem` - trait for systems driven by the frame loop
//! - `AssetSystem` - streams asset loads and keeps materials resolved
//! - `AppConfig` - TOML configuration with environment overrides

mod app;
mod assets;
mod clock;
mod config;
mod events;
mod frame;
mod input;
mod logging;
mod registry;
mod state;
mod stats;
mod system;

pub use app::{AppHandle, Application};
pub use assets::AssetSystem;
pub use clock::FrameClock;
pub use config::{AppConfig, LoggingSection, RenderConfig, ResolverConfig, TimeConfig};
pub use events::{EventEmitter, FrameEvent, LifecycleEvent, ListenerId};
pub use frame::{FrameHandle, FrameRequestSource, ManualFrameSource};
pub use input::{InputDevice, KeyboardInput};
pub use logging::{init_logging, LoggingConfig};
pub use registry::{application_ids, get_application};
pub use state::{DestroyRequest, LifecycleState};
pub use stats::FrameStats;
pub use system::RuntimeSystem;
