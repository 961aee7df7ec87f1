//! Touch-to-flipper input mapping
//!
//! Raw touch events become game control calls on the shared field: a
//! press bootstraps the game and launches a ball when none is in play,
//! and pointer positions map to left/right flipper engagement. All of it
//! happens under the same lock the renderer takes, so a touch never
//! observes a half-drawn frame's state.

use log::debug;

use crate::field::{Playfield, SharedField, lock_field};
use crate::settings::RenderSettings;

/// What the platform can report about simultaneous pointers. Resolved
/// once by the platform shim and passed to [`InputMapper::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchCapability {
    /// One pointer at a time; zone mapping is unavailable.
    SingleTouch,
    /// Per-pointer positions are available.
    MultiTouch,
}

/// Classified touch action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// First pointer went down.
    Pressed,
    /// Last pointer went up; nothing remains on the screen.
    Released,
    Moved,
    /// A pointer lifted while others remain; `index` names the one
    /// lifting, which is still present in the event's pointer list.
    SecondaryReleased { index: usize },
}

/// One touch event as delivered by the platform shim.
#[derive(Debug, Clone)]
pub struct TouchEvent<'a> {
    pub action: TouchAction,
    /// X coordinate of each active pointer, in viewport pixels. Empty
    /// when the platform cannot enumerate pointers.
    pub pointer_xs: &'a [f32],
}

/// Maps touch events to control calls on the shared field.
pub struct InputMapper<F: Playfield> {
    field: SharedField<F>,
    capability: TouchCapability,
    /// Map the left and right halves of the screen to their flippers
    /// independently. Seeded from [`RenderSettings`]; with this off every
    /// touch drives both sides.
    pub independent_flippers: bool,
    /// Viewport width in pixels; the flipper zone boundary is half of it.
    pub viewport_width: f32,
    /// Level passed to `reset_for_level` when a press starts a new game.
    pub start_level: u32,
}

impl<F: Playfield> InputMapper<F> {
    pub fn new(
        field: SharedField<F>,
        capability: TouchCapability,
        settings: &RenderSettings,
    ) -> Self {
        Self {
            field,
            capability,
            independent_flippers: settings.independent_flippers,
            viewport_width: 1.0,
            start_level: 1,
        }
    }

    /// Handle one touch event. Always reports the event consumed.
    pub fn on_touch(&self, event: &TouchEvent) -> bool {
        let mut field = lock_field(&self.field);

        if event.action == TouchAction::Pressed {
            if !field.game_in_progress() {
                field.reset_for_level(self.start_level);
                field.start_game();
            }
            field.handle_dead_balls();
            if field.ball_count() == 0 {
                field.launch_ball();
            }
        }

        let full_release = event.action == TouchAction::Released;
        let zone_capable = self.independent_flippers
            && self.capability == TouchCapability::MultiTouch
            && (full_release || !event.pointer_xs.is_empty());

        if zone_capable {
            let (left, right) = if full_release {
                (false, false)
            } else {
                zone_engagement(
                    event.pointer_xs,
                    lifted_index(event.action),
                    self.viewport_width,
                )
            };
            field.set_left_flippers_engaged(left);
            field.set_right_flippers_engaged(right);
            debug!("flippers left={left} right={right}");
        } else {
            // Single-touch platforms and events without pointer data drive
            // both sides as one.
            field.set_all_flippers_engaged(!full_release);
        }

        true
    }
}

fn lifted_index(action: TouchAction) -> Option<usize> {
    match action {
        TouchAction::SecondaryReleased { index } => Some(index),
        _ => None,
    }
}

/// Left/right engagement from active pointer positions. A pointer
/// strictly left of the midline engages the left side; at or past it,
/// the right. A lifting pointer is skipped.
fn zone_engagement(pointer_xs: &[f32], lifted: Option<usize>, viewport_width: f32) -> (bool, bool) {
    let half = viewport_width / 2.0;
    let mut left = false;
    let mut right = false;
    for (i, &x) in pointer_xs.iter().enumerate() {
        if Some(i) == lifted {
            continue;
        }
        if x < half {
            left = true;
        } else {
            right = true;
        }
    }
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DrawTarget, Drawable, shared};

    #[derive(Default)]
    struct ProbeField {
        in_progress: bool,
        balls: usize,
        reset_level: Option<u32>,
        starts: u32,
        dead_ball_sweeps: u32,
        launches: u32,
        left: Option<bool>,
        right: Option<bool>,
        all: Option<bool>,
    }

    impl Playfield for ProbeField {
        fn world_width(&self) -> f32 {
            400.0
        }
        fn world_height(&self) -> f32 {
            300.0
        }
        fn game_in_progress(&self) -> bool {
            self.in_progress
        }
        fn reset_for_level(&mut self, level: u32) {
            self.reset_level = Some(level);
        }
        fn start_game(&mut self) {
            self.in_progress = true;
            self.starts += 1;
        }
        fn handle_dead_balls(&mut self) {
            self.dead_ball_sweeps += 1;
        }
        fn ball_count(&self) -> usize {
            self.balls
        }
        fn launch_ball(&mut self) {
            self.balls += 1;
            self.launches += 1;
        }
        fn elements(&self) -> &[Box<dyn Drawable + Send>] {
            &[]
        }
        fn draw_balls(&self, _target: &mut dyn DrawTarget) {}
        fn set_left_flippers_engaged(&mut self, engaged: bool) {
            self.left = Some(engaged);
        }
        fn set_right_flippers_engaged(&mut self, engaged: bool) {
            self.right = Some(engaged);
        }
        fn set_all_flippers_engaged(&mut self, engaged: bool) {
            self.all = Some(engaged);
        }
    }

    fn mapper(capability: TouchCapability) -> InputMapper<ProbeField> {
        let mut m = InputMapper::new(
            shared(ProbeField::default()),
            capability,
            &RenderSettings::default(),
        );
        m.viewport_width = 480.0;
        m
    }

    fn probe<T>(m: &InputMapper<ProbeField>, read: impl FnOnce(&ProbeField) -> T) -> T {
        read(&lock_field(&m.field))
    }

    #[test]
    fn test_press_starts_game_and_launches() {
        let m = mapper(TouchCapability::MultiTouch);
        let consumed = m.on_touch(&TouchEvent {
            action: TouchAction::Pressed,
            pointer_xs: &[100.0],
        });
        assert!(consumed);
        assert_eq!(probe(&m, |f| f.reset_level), Some(1));
        assert_eq!(probe(&m, |f| f.starts), 1);
        assert_eq!(probe(&m, |f| f.dead_ball_sweeps), 1);
        assert_eq!(probe(&m, |f| f.launches), 1);
    }

    #[test]
    fn test_press_mid_game_keeps_state() {
        let m = mapper(TouchCapability::MultiTouch);
        {
            let mut f = lock_field(&m.field);
            f.in_progress = true;
            f.balls = 1;
        }
        m.on_touch(&TouchEvent {
            action: TouchAction::Pressed,
            pointer_xs: &[100.0],
        });
        assert_eq!(probe(&m, |f| f.reset_level), None);
        assert_eq!(probe(&m, |f| f.starts), 0);
        assert_eq!(probe(&m, |f| f.dead_ball_sweeps), 1);
        assert_eq!(probe(&m, |f| f.launches), 0);
    }

    #[test]
    fn test_two_pointers_engage_both_sides() {
        let m = mapper(TouchCapability::MultiTouch);
        m.on_touch(&TouchEvent {
            action: TouchAction::Moved,
            pointer_xs: &[100.0, 500.0],
        });
        assert_eq!(probe(&m, |f| (f.left, f.right)), (Some(true), Some(true)));
        assert_eq!(probe(&m, |f| f.all), None);
    }

    #[test]
    fn test_pointer_at_midpoint_engages_right() {
        let m = mapper(TouchCapability::MultiTouch);
        m.on_touch(&TouchEvent {
            action: TouchAction::Moved,
            pointer_xs: &[240.0],
        });
        assert_eq!(probe(&m, |f| (f.left, f.right)), (Some(false), Some(true)));
    }

    #[test]
    fn test_secondary_release_excludes_lifted_pointer() {
        let m = mapper(TouchCapability::MultiTouch);
        // Left-half pointer lifts; the right-half one stays down.
        m.on_touch(&TouchEvent {
            action: TouchAction::SecondaryReleased { index: 0 },
            pointer_xs: &[100.0, 500.0],
        });
        assert_eq!(probe(&m, |f| (f.left, f.right)), (Some(false), Some(true)));
    }

    #[test]
    fn test_full_release_disengages_both() {
        let m = mapper(TouchCapability::MultiTouch);
        m.on_touch(&TouchEvent {
            action: TouchAction::Moved,
            pointer_xs: &[100.0],
        });
        m.on_touch(&TouchEvent {
            action: TouchAction::Released,
            pointer_xs: &[],
        });
        assert_eq!(probe(&m, |f| (f.left, f.right)), (Some(false), Some(false)));
    }

    #[test]
    fn test_single_touch_falls_back_to_combined_flag() {
        let m = mapper(TouchCapability::SingleTouch);
        m.on_touch(&TouchEvent {
            action: TouchAction::Pressed,
            pointer_xs: &[100.0],
        });
        assert_eq!(probe(&m, |f| f.all), Some(true));
        assert_eq!(probe(&m, |f| (f.left, f.right)), (None, None));

        m.on_touch(&TouchEvent {
            action: TouchAction::Released,
            pointer_xs: &[],
        });
        assert_eq!(probe(&m, |f| f.all), Some(false));
    }

    #[test]
    fn test_non_independent_mode_drives_both_sides_as_one() {
        let mut m = mapper(TouchCapability::MultiTouch);
        m.independent_flippers = false;
        m.on_touch(&TouchEvent {
            action: TouchAction::Moved,
            pointer_xs: &[100.0, 500.0],
        });
        assert_eq!(probe(&m, |f| f.all), Some(true));
        assert_eq!(probe(&m, |f| (f.left, f.right)), (None, None));

        m.on_touch(&TouchEvent {
            action: TouchAction::Released,
            pointer_xs: &[],
        });
        assert_eq!(probe(&m, |f| f.all), Some(false));
        assert_eq!(probe(&m, |f| (f.left, f.right)), (None, None));
    }

    #[test]
    fn test_engagement_mode_comes_from_settings() {
        let settings = RenderSettings {
            independent_flippers: false,
            ..Default::default()
        };
        let m = InputMapper::new(
            shared(ProbeField::default()),
            TouchCapability::MultiTouch,
            &settings,
        );
        m.on_touch(&TouchEvent {
            action: TouchAction::Moved,
            pointer_xs: &[100.0],
        });
        // The settings preference selects the combined path outright.
        assert_eq!(probe(&m, |f| f.all), Some(true));
        assert_eq!(probe(&m, |f| (f.left, f.right)), (None, None));
    }

    #[test]
    fn test_missing_pointer_data_degrades_silently() {
        let m = mapper(TouchCapability::MultiTouch);
        m.on_touch(&TouchEvent {
            action: TouchAction::Moved,
            pointer_xs: &[],
        });
        assert_eq!(probe(&m, |f| f.all), Some(true));
        assert_eq!(probe(&m, |f| (f.left, f.right)), (None, None));
    }

    #[test]
    fn test_concurrent_render_and_touch() {
        use crate::renderer::HeadlessBackend;
        use crate::renderer::frame::FieldRenderer;

        let field = shared(ProbeField::default());
        let mut m = InputMapper::new(
            field.clone(),
            TouchCapability::MultiTouch,
            &RenderSettings::default(),
        );
        m.viewport_width = 480.0;

        let mut renderer = FieldRenderer::new(RenderSettings::default());
        renderer.attach_field(field.clone());

        let toucher = std::thread::spawn(move || {
            for i in 0..200u32 {
                let xs = [100.0 + (i % 7) as f32, 400.0];
                m.on_touch(&TouchEvent {
                    action: TouchAction::Moved,
                    pointer_xs: &xs,
                });
            }
            m.on_touch(&TouchEvent {
                action: TouchAction::Released,
                pointer_xs: &[],
            });
        });

        let mut backend = HeadlessBackend::new();
        for _ in 0..200 {
            renderer.draw_frame(&mut backend);
        }
        toucher.join().unwrap();

        let f = lock_field(&field);
        assert_eq!((f.left, f.right), (Some(false), Some(false)));
        assert_eq!(backend.frames_finished, 200);
    }
}
