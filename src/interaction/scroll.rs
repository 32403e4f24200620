//! Scroll/visibility boundary. The page layer owns the real values; here a
//! mouse-wheel feed stands in for the scroll orchestration so the demo binary
//! behaves like the embedded effect. The frame systems are gated on these
//! resources: stopping and resuming leaves no backlog because the gating is a
//! plain run condition, not a queued callback.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::core::components::Fragment;

/// Progress step per scroll line; pixels are normalized against this height.
const LINE_STEP: f32 = 0.05;
const PIXEL_REFERENCE: f32 = 600.0;

/// Externally pushed scroll state, polled once per relevant frame.
#[derive(Resource, Debug, Clone)]
pub struct ScrollSignal {
    /// Is this effect's section the active scroll target?
    pub section_active: bool,
    /// 0..1 progress past the effect's anchor section.
    pub progress: f32,
}

impl Default for ScrollSignal {
    fn default() -> Self {
        Self {
            section_active: true,
            progress: 0.0,
        }
    }
}

/// Mount-level visibility switches (shown at all, reveal animation done).
#[derive(Resource, Debug, Clone)]
pub struct EffectActivity {
    pub shown: bool,
    pub revealed: bool,
}

impl Default for EffectActivity {
    fn default() -> Self {
        Self {
            shown: true,
            revealed: true,
        }
    }
}

/// Shared gate: shown, revealed, at least one fragment, and the owning
/// section active. Also consumed by the physics pipeline toggle, which needs
/// both edges of the value rather than a run condition.
pub fn running_state(scroll: &ScrollSignal, activity: &EffectActivity, has_fragments: bool) -> bool {
    activity.shown && activity.revealed && scroll.section_active && has_fragments
}

/// Run condition for all per-frame effect work. Re-evaluated every frame, so
/// cancelling is idempotent and resumption starts fresh.
pub fn effect_running(
    scroll: Res<ScrollSignal>,
    activity: Res<EffectActivity>,
    fragments: Query<(), With<Fragment>>,
) -> bool {
    running_state(&scroll, &activity, !fragments.is_empty())
}

pub struct ScrollPlugin;

impl Plugin for ScrollPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScrollSignal>()
            .init_resource::<EffectActivity>()
            .add_systems(Update, feed_scroll_from_wheel);
    }
}

fn feed_scroll_from_wheel(
    mut wheel_evr: EventReader<MouseWheel>,
    mut scroll: ResMut<ScrollSignal>,
) {
    let mut delta = 0.0;
    for ev in wheel_evr.read() {
        delta += match ev.unit {
            MouseScrollUnit::Line => ev.y * LINE_STEP,
            MouseScrollUnit::Pixel => ev.y / PIXEL_REFERENCE,
        };
    }
    if delta != 0.0 {
        scroll.progress = (scroll.progress - delta).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_requires_every_condition() {
        let scroll = ScrollSignal::default();
        let activity = EffectActivity::default();
        assert!(running_state(&scroll, &activity, true));
        assert!(!running_state(&scroll, &activity, false));
        let hidden = EffectActivity {
            shown: false,
            ..activity.clone()
        };
        assert!(!running_state(&scroll, &hidden, true));
        let inactive = ScrollSignal {
            section_active: false,
            ..scroll
        };
        assert!(!running_state(&inactive, &activity, true));
    }
}
