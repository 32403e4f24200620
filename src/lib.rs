pub mod app;
pub mod core;
pub mod debug;
pub mod geometry;
pub mod interaction;
pub mod outline;
pub mod physics;
pub mod rendering;

// Curated re-exports
pub use crate::app::effect::EffectPlugin;
pub use crate::core::components::{Fragment, TravelBounds};
pub use crate::core::config::EffectConfig;
pub use crate::geometry::splitter::{split_outline, SplitOutcome};
pub use crate::interaction::pointer::{PointerState, PointerTracker};
pub use crate::rendering::sync::{FillStyle, FragmentRenderRecord, RenderRecords};
