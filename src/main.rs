//! Pinfield demo entry point
//!
//! Runs the core headless: a small demo field stands in for a real
//! physics model, a second thread replays a touch script through the
//! input mapper, and the render loop draws into the recording backend at
//! a fixed cadence with an FPS counter fed back into the tally overlay.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use pinfield::consts::{FPS_WINDOW, TARGET_FPS};
use pinfield::renderer::vertex::colors;
use pinfield::{
    Color, DrawTarget, Drawable, FieldRenderer, HeadlessBackend, InputMapper, Playfield,
    RenderSettings, SharedField, TouchAction, TouchCapability, TouchEvent, lock_field, shared,
};

const WORLD_W: f32 = 20.0;
const WORLD_H: f32 = 30.0;
const BALL_RADIUS: f32 = 0.5;
const GRAVITY: f32 = 25.0;
const BOUNCE: f32 = 0.8;
const LAUNCH_SPEED: f32 = 27.0;
const FLIPPER_KICK: f32 = 20.0;
const RUN_FRAMES: u32 = 300;

struct Wall {
    a: Vec2,
    b: Vec2,
    color: Color,
}

impl Drawable for Wall {
    fn draw(&self, target: &mut dyn DrawTarget) {
        target.draw_line(self.a, self.b, self.color);
    }
}

struct Bumper {
    center: Vec2,
    radius: f32,
}

impl Drawable for Bumper {
    fn draw(&self, target: &mut dyn DrawTarget) {
        target.fill_circle(self.center, self.radius, colors::BUMPER);
        target.frame_circle(self.center, self.radius, colors::BUMPER_RIM);
    }
}

/// Demo flipper: a line from the pivot that raises while engaged. The
/// field holds one handle to write the flag, the element list another to
/// draw it.
struct Flipper {
    pivot: Vec2,
    /// Positive extends right from the pivot, negative left.
    length: f32,
    engaged: AtomicBool,
}

impl Flipper {
    fn new(pivot: Vec2, length: f32) -> Arc<Self> {
        Arc::new(Self {
            pivot,
            length,
            engaged: AtomicBool::new(false),
        })
    }

    fn tip(&self) -> Vec2 {
        let angle: f32 = if self.engaged.load(Ordering::Relaxed) {
            0.55
        } else {
            -0.4
        };
        self.pivot + Vec2::new(angle.cos() * self.length, angle.sin() * self.length.abs())
    }
}

struct FlipperElement(Arc<Flipper>);

impl Drawable for FlipperElement {
    fn draw(&self, target: &mut dyn DrawTarget) {
        target.draw_line(self.0.pivot, self.0.tip(), colors::FLIPPER);
    }
}

struct Ball {
    pos: Vec2,
    vel: Vec2,
}

/// Stand-in for a real physics model: enough motion to exercise every
/// draw path and control call.
struct DemoField {
    elements: Vec<Box<dyn Drawable + Send>>,
    left_flipper: Arc<Flipper>,
    right_flipper: Arc<Flipper>,
    balls: Vec<Ball>,
    in_progress: bool,
    level: u32,
    rng: Pcg32,
    launches: u32,
}

impl DemoField {
    fn new(seed: u64) -> Self {
        let left_flipper = Flipper::new(Vec2::new(6.0, 4.0), 3.0);
        let right_flipper = Flipper::new(Vec2::new(14.0, 4.0), -3.0);

        let wall = |a: Vec2, b: Vec2| -> Box<dyn Drawable + Send> {
            Box::new(Wall {
                a,
                b,
                color: colors::WALL,
            })
        };

        let mut elements: Vec<Box<dyn Drawable + Send>> = vec![
            wall(Vec2::new(0.0, 0.0), Vec2::new(0.0, WORLD_H)),
            wall(Vec2::new(WORLD_W, 0.0), Vec2::new(WORLD_W, WORLD_H)),
            wall(Vec2::new(0.0, WORLD_H), Vec2::new(WORLD_W, WORLD_H)),
            // Drain guides funnel toward the gap between the flippers.
            wall(Vec2::new(0.0, 6.0), Vec2::new(6.0, 4.0)),
            wall(Vec2::new(WORLD_W, 6.0), Vec2::new(14.0, 4.0)),
            Box::new(Wall {
                a: Vec2::new(WORLD_W - 1.5, 0.0),
                b: Vec2::new(WORLD_W - 1.5, 24.0),
                color: colors::LAUNCH_LANE,
            }),
        ];
        elements.push(Box::new(Bumper {
            center: Vec2::new(6.0, 20.0),
            radius: 1.2,
        }));
        elements.push(Box::new(Bumper {
            center: Vec2::new(14.0, 20.0),
            radius: 1.2,
        }));
        elements.push(Box::new(Bumper {
            center: Vec2::new(10.0, 24.0),
            radius: 1.2,
        }));
        elements.push(Box::new(FlipperElement(left_flipper.clone())));
        elements.push(Box::new(FlipperElement(right_flipper.clone())));

        Self {
            elements,
            left_flipper,
            right_flipper,
            balls: Vec::new(),
            in_progress: false,
            level: 1,
            rng: Pcg32::seed_from_u64(seed),
            launches: 0,
        }
    }

    fn step(&mut self, dt: f32) {
        let left_up = self.left_flipper.engaged.load(Ordering::Relaxed);
        let right_up = self.right_flipper.engaged.load(Ordering::Relaxed);

        for ball in &mut self.balls {
            ball.vel.y -= GRAVITY * dt;
            ball.pos += ball.vel * dt;

            if ball.pos.x < BALL_RADIUS && ball.vel.x < 0.0 {
                ball.vel.x = -ball.vel.x * BOUNCE;
            }
            if ball.pos.x > WORLD_W - BALL_RADIUS && ball.vel.x > 0.0 {
                ball.vel.x = -ball.vel.x * BOUNCE;
            }
            if ball.pos.y > WORLD_H - BALL_RADIUS && ball.vel.y > 0.0 {
                ball.vel.y = -ball.vel.y * BOUNCE;
            }

            // An engaged flipper kicks a falling ball on its half.
            if ball.pos.y < 5.0 && ball.vel.y < 0.0 {
                let on_left = ball.pos.x < WORLD_W / 2.0;
                if (on_left && left_up) || (!on_left && right_up) {
                    ball.vel.y = FLIPPER_KICK;
                }
            }
        }
        // Balls well past the drain stop mattering to the demo.
        self.balls.retain(|b| b.pos.y > -3.0);
    }
}

impl Playfield for DemoField {
    fn world_width(&self) -> f32 {
        WORLD_W
    }

    fn world_height(&self) -> f32 {
        WORLD_H
    }

    fn game_in_progress(&self) -> bool {
        self.in_progress
    }

    fn reset_for_level(&mut self, level: u32) {
        self.level = level;
        self.balls.clear();
    }

    fn start_game(&mut self) {
        self.in_progress = true;
        log::info!("game started at level {}", self.level);
    }

    fn handle_dead_balls(&mut self) {
        self.balls.retain(|b| b.pos.y >= 0.0);
    }

    fn ball_count(&self) -> usize {
        self.balls.len()
    }

    fn launch_ball(&mut self) {
        let jitter: f32 = self.rng.random_range(-1.5..1.5);
        self.balls.push(Ball {
            pos: Vec2::new(WORLD_W - 0.75, 1.0),
            vel: Vec2::new(-0.5, LAUNCH_SPEED + jitter),
        });
        self.launches += 1;
        log::info!("ball launched ({} so far)", self.launches);
    }

    fn elements(&self) -> &[Box<dyn Drawable + Send>] {
        &self.elements
    }

    fn draw_balls(&self, target: &mut dyn DrawTarget) {
        for ball in &self.balls {
            target.fill_circle(ball.pos, BALL_RADIUS, colors::BALL);
        }
    }

    fn set_left_flippers_engaged(&mut self, engaged: bool) {
        self.left_flipper.engaged.store(engaged, Ordering::Relaxed);
    }

    fn set_right_flippers_engaged(&mut self, engaged: bool) {
        self.right_flipper.engaged.store(engaged, Ordering::Relaxed);
    }

    fn set_all_flippers_engaged(&mut self, engaged: bool) {
        self.set_left_flippers_engaged(engaged);
        self.set_right_flippers_engaged(engaged);
    }
}

/// Scripted touches: press to launch, hold each side, roll a secondary
/// release, then let go. Runs on its own thread against the same lock
/// the renderer uses.
fn run_touch_script(mapper: InputMapper<DemoField>) {
    let step = Duration::from_millis(50);
    let script: &[(TouchAction, &[f32])] = &[
        (TouchAction::Pressed, &[120.0]),
        (TouchAction::Moved, &[120.0]),
        (TouchAction::Moved, &[120.0, 360.0]),
        (TouchAction::SecondaryReleased { index: 0 }, &[120.0, 360.0]),
        (TouchAction::Moved, &[360.0]),
        (TouchAction::Released, &[]),
        (TouchAction::Pressed, &[360.0]),
        (TouchAction::Moved, &[360.0, 120.0]),
        (TouchAction::SecondaryReleased { index: 1 }, &[360.0, 120.0]),
        (TouchAction::Released, &[]),
    ];

    for pass in 0..3 {
        for (action, xs) in script {
            mapper.on_touch(&TouchEvent {
                action: *action,
                pointer_xs: xs,
            });
            std::thread::sleep(step);
        }
        log::debug!("touch script pass {} complete", pass + 1);
    }
}

fn verify_run(field: &SharedField<DemoField>, frames: u64) {
    let f = lock_field(field);
    assert!(f.launches >= 1, "touch script should have launched a ball");
    println!("✓ demo run complete: {} launches over {frames} frames", f.launches);
}

fn main() {
    env_logger::init();
    log::info!("pinfield demo starting");

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(1);
    let field = shared(DemoField::new(seed));
    log::info!("demo field ready (seed {seed})");

    let mut renderer = FieldRenderer::new(RenderSettings {
        show_fps: true,
        ..Default::default()
    });
    renderer.attach_field(field.clone());
    let mut backend = HeadlessBackend::new();
    renderer.resize(&mut backend, 480, 720);

    let mut mapper = InputMapper::new(
        field.clone(),
        TouchCapability::MultiTouch,
        &renderer.settings,
    );
    mapper.viewport_width = 480.0;
    let toucher = std::thread::spawn(move || run_touch_script(mapper));

    let frame_budget = Duration::from_secs_f64(1.0 / TARGET_FPS as f64);
    let mut frame_times = [0.0f64; FPS_WINDOW];
    let mut frame_index = 0usize;
    let mut total_batches = 0usize;
    let mut total_vertices = 0usize;
    let start = Instant::now();

    for frame in 0..RUN_FRAMES {
        {
            let mut f = lock_field(&field);
            f.step(frame_budget.as_secs_f32());
        }

        if let Some(stats) = renderer.draw_frame(&mut backend) {
            total_batches += stats.batches;
            total_vertices += stats.vertices;
        }
        backend.take_drawn();

        // FPS over a sliding window of frame times.
        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        frame_times[frame_index] = now_ms;
        frame_index = (frame_index + 1) % FPS_WINDOW;
        let oldest = frame_times[frame_index];
        if oldest > 0.0 {
            let elapsed = now_ms - oldest;
            if elapsed > 0.0 {
                renderer.set_fps((FPS_WINDOW as f64 * 1000.0 / elapsed).round() as u32);
            }
        }

        let deadline = start + frame_budget * (frame + 1);
        if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        }
    }

    toucher.join().expect("touch script thread panicked");

    log::info!(
        "demo finished: {} frames, {} batches, {} vertices, {} balls in play",
        renderer.frames_drawn(),
        total_batches,
        total_vertices,
        lock_field(&field).ball_count(),
    );
    verify_run(&field, renderer.frames_drawn());
}
