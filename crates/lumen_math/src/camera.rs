use crate::{Ray, Vec3};

/// Movement directions understood by [`Camera::move_in`].
///
/// The discriminants double as indices into per-direction input flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward = 0,
    Left = 1,
    Backward = 2,
    Right = 3,
    Up = 4,
    Down = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Left,
        Direction::Backward,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// First-person pinhole camera described by a position plus yaw and pitch.
///
/// The basis `(u, v, w)` is right, up and forward. The renderer only reads
/// it; the frame loop mutates the camera between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Degrees, rotation about world Y. -90 looks down -Z.
    yaw: f64,
    /// Degrees, clamped to (-89, 89).
    pitch: f64,
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
    /// Vertical extent of the image plane at unit distance.
    pub film_height: f64,
}

const MAX_PITCH: f64 = 89.0;

impl Camera {
    /// Create a camera at `position` looking down -Z.
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::NEG_Z,
            film_height: 0.5135,
        };
        camera.update_basis();
        camera
    }

    /// Create a camera at `position` looking along `direction`.
    pub fn look_along(position: Vec3, direction: Vec3) -> Self {
        let d = direction.normalize();
        let mut camera = Self::new(position);
        camera.yaw = d.z.atan2(d.x).to_degrees();
        camera.pitch = d.y.asin().to_degrees().clamp(-MAX_PITCH, MAX_PITCH);
        camera.update_basis();
        camera
    }

    /// Set the vertical film extent (a zoom control).
    pub fn with_film_height(mut self, film_height: f64) -> Self {
        self.film_height = film_height;
        self
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.w = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.u = self.w.cross(Vec3::Y).normalize();
        self.v = self.u.cross(self.w);
    }

    /// Translate the camera. Forward and backward stay in the horizontal plane.
    pub fn move_in(&mut self, direction: Direction, amount: f64) {
        let flat_forward = Vec3::new(self.w.x, 0.0, self.w.z);
        let delta = match direction {
            Direction::Up => Vec3::Y,
            Direction::Down => Vec3::NEG_Y,
            Direction::Left => -self.u,
            Direction::Right => self.u,
            Direction::Forward => flat_forward,
            Direction::Backward => -flat_forward,
        };
        self.position += delta * amount;
    }

    pub fn rotate_yaw(&mut self, degrees: f64) {
        self.yaw += degrees;
        self.update_basis();
    }

    pub fn rotate_pitch(&mut self, degrees: f64) {
        self.pitch = (self.pitch + degrees).clamp(-MAX_PITCH, MAX_PITCH);
        self.update_basis();
    }

    /// Primary ray through the film position `(px, py)`, measured in pixels
    /// from the bottom-left corner of a `width` x `height` image.
    pub fn primary_ray(&self, px: f64, py: f64, width: u32, height: u32) -> Ray {
        let aspect = width as f64 / height as f64;
        let sx = (px / width as f64 - 0.5) * self.film_height * aspect;
        let sy = (py / height as f64 - 0.5) * self.film_height;
        Ray::new(self.position, self.u * sx + self.v * sy + self.w)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}
