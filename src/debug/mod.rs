//! Debug module: feature gated runtime visualization & stats logging.
//! Built only when compiled with `--features debug`.

#[cfg(feature = "debug")]
use bevy::prelude::*;
#[cfg(feature = "debug")]
use bevy_rapier2d::render::{DebugRenderContext, RapierDebugRenderPlugin};

#[cfg(feature = "debug")]
use crate::core::components::Fragment;
#[cfg(feature = "debug")]
use crate::core::config::EffectConfig;
#[cfg(feature = "debug")]
use crate::interaction::pointer::PointerTracker;

#[cfg(feature = "debug")]
const STATS_INTERVAL_SECS: f64 = 2.0;

pub struct DebugPlugin;

#[cfg(feature = "debug")]
impl bevy::prelude::Plugin for DebugPlugin {
    fn build(&self, app: &mut bevy::prelude::App) {
        app.add_plugins(RapierDebugRenderPlugin::default())
            .add_systems(Startup, apply_debug_render_flag)
            .add_systems(Update, log_fragment_stats);
    }
}

#[cfg(not(feature = "debug"))]
impl bevy::prelude::Plugin for DebugPlugin {
    fn build(&self, _app: &mut bevy::prelude::App) {}
}

#[cfg(feature = "debug")]
fn apply_debug_render_flag(cfg: Res<EffectConfig>, mut ctx: ResMut<DebugRenderContext>) {
    ctx.enabled = cfg.rapier_debug;
}

#[cfg(feature = "debug")]
fn log_fragment_stats(
    time: Res<Time>,
    mut next_log: Local<f64>,
    tracker: Res<PointerTracker>,
    q: Query<&Fragment>,
) {
    let now = time.elapsed_secs_f64();
    if now < *next_log {
        return;
    }
    *next_log = now + STATS_INTERVAL_SECS;
    let total = q.iter().count();
    if total == 0 {
        return;
    }
    let settled = q.iter().filter(|f| f.settled).count();
    let annealing = q.iter().filter(|f| now < f.anneal_until).count();
    info!(
        target: "debug_stats",
        "fragments={total} settled={settled} annealing={annealing} pointer={:?}",
        tracker.position()
    );
}
