//! Shared frame context between the input layer, the frame loop and the
//! render workers.
//!
//! The input layer writes held keys, mouse motion and focus. The frame loop
//! folds them into the camera between frames. Workers read the sample
//! count and the new-input flag (to abandon a stale frame) and bump the
//! completion counter.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicUsize, Ordering};

use lumen_math::{Camera, Direction};

#[derive(Debug)]
pub struct RenderContext {
    new_input: AtomicBool,
    held: [AtomicBool; 6],
    mouse_dx: AtomicI32,
    mouse_dy: AtomicI32,
    focused: AtomicBool,
    workers_done: AtomicUsize,
    sample_count: AtomicU32,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    /// A focused context with no pending input.
    pub fn new() -> Self {
        Self {
            new_input: AtomicBool::new(false),
            held: std::array::from_fn(|_| AtomicBool::new(false)),
            mouse_dx: AtomicI32::new(0),
            mouse_dy: AtomicI32::new(0),
            focused: AtomicBool::new(true),
            workers_done: AtomicUsize::new(0),
            sample_count: AtomicU32::new(1),
        }
    }

    // Input side

    /// Record a held movement key. Ignored while unfocused.
    pub fn press(&self, direction: Direction) {
        if !self.is_focused() {
            return;
        }
        self.held[direction.index()].store(true, Ordering::SeqCst);
        self.signal_input();
    }

    /// Accumulate mouse motion in pixels. Ignored while unfocused.
    pub fn add_mouse_delta(&self, dx: i32, dy: i32) {
        if !self.is_focused() || (dx == 0 && dy == 0) {
            return;
        }
        self.mouse_dx.fetch_add(dx, Ordering::SeqCst);
        self.mouse_dy.fetch_add(dy, Ordering::SeqCst);
        self.signal_input();
    }

    pub fn set_focus(&self, focused: bool) {
        if self.focused.swap(focused, Ordering::SeqCst) != focused {
            self.signal_input();
        }
    }

    pub fn toggle_focus(&self) {
        self.focused.fetch_xor(true, Ordering::SeqCst);
        self.signal_input();
    }

    pub fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    /// Mark the current frame as stale.
    pub fn signal_input(&self) {
        self.new_input.store(true, Ordering::SeqCst);
    }

    // Frame loop side

    pub fn has_new_input(&self) -> bool {
        self.new_input.load(Ordering::SeqCst)
    }

    /// Fold pending input into `camera` and clear the new-input flag.
    ///
    /// Returns false when there was nothing pending.
    pub fn apply_input(&self, camera: &mut Camera, move_step: f64, sensitivity: f64) -> bool {
        if !self.new_input.swap(false, Ordering::SeqCst) {
            return false;
        }

        for direction in Direction::ALL {
            if self.held[direction.index()].swap(false, Ordering::SeqCst) {
                camera.move_in(direction, move_step);
            }
        }

        let dx = self.mouse_dx.swap(0, Ordering::SeqCst);
        let dy = self.mouse_dy.swap(0, Ordering::SeqCst);
        if dy != 0 {
            camera.rotate_pitch(-sensitivity * dy as f64);
        }
        if dx != 0 {
            camera.rotate_yaw(-sensitivity * dx as f64);
        }
        true
    }

    // Worker side

    /// Reset the completion counter and publish the sample count.
    pub fn begin_frame(&self, samples: u32) {
        self.workers_done.store(0, Ordering::SeqCst);
        self.sample_count.store(samples, Ordering::SeqCst);
    }

    pub fn mark_worker_done(&self) {
        self.workers_done.fetch_add(1, Ordering::SeqCst);
    }

    pub fn workers_done(&self) -> usize {
        self.workers_done.load(Ordering::SeqCst)
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count.load(Ordering::SeqCst)
    }
}
