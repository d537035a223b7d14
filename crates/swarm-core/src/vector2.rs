//! 2D vector with lazily cached magnitude.
//!
//! Used for surface (u, v) coordinates.  Shares the caching and angle rules
//! of [`Vector3`][crate::Vector3]: angles are in degrees and a positive
//! cross product (anti-clockwise) yields a negative angle.

use std::fmt;
use std::ops;

use rand::Rng;

use crate::cache::MagnitudeCache;

#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2 {
    u: f32,
    v: f32,
    #[cfg_attr(feature = "serde", serde(skip))]
    cache: MagnitudeCache,
}

impl Vector2 {
    #[inline]
    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v, cache: MagnitudeCache::default() }
    }

    #[inline]
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    #[inline]
    pub fn u(&self) -> f32 {
        self.u
    }

    #[inline]
    pub fn v(&self) -> f32 {
        self.v
    }

    pub fn set_u(&mut self, u: f32) {
        if u != self.u {
            self.u = u;
            self.cache.invalidate();
        }
    }

    pub fn set_v(&mut self, v: f32) {
        if v != self.v {
            self.v = v;
            self.cache.invalidate();
        }
    }

    pub fn set(&mut self, u: f32, v: f32) {
        self.u = u;
        self.v = v;
        self.cache.invalidate();
    }

    pub fn reset(&mut self) {
        self.set(0.0, 0.0);
    }

    pub fn reset_to(&mut self, other: &Vector2) {
        self.u = other.u;
        self.v = other.v;
        self.cache = other.cache.clone();
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.u == 0.0 && self.v == 0.0
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.cache
            .magnitude_squared
            .get_or_compute(|| self.u * self.u + self.v * self.v)
    }

    pub fn magnitude(&self) -> f32 {
        self.cache
            .magnitude
            .get_or_compute(|| self.magnitude_squared().sqrt())
    }

    #[inline]
    pub fn is_magnitude_cached(&self) -> bool {
        self.cache.magnitude.is_set()
    }

    pub fn add(&mut self, other: &Vector2) {
        self.set(self.u + other.u, self.v + other.v);
    }

    pub fn subtract(&mut self, other: &Vector2) {
        self.set(self.u - other.u, self.v - other.v);
    }

    pub fn scale(&mut self, factor: f32) {
        self.set(self.u * factor, self.v * factor);
    }

    pub fn divide(&mut self, divisor: f32) {
        self.set(self.u / divisor, self.v / divisor);
    }

    pub fn invert(&mut self) {
        self.u = -self.u;
        self.v = -self.v;
    }

    pub fn inverted(&self) -> Vector2 {
        let mut w = self.clone();
        w.invert();
        w
    }

    pub fn normalize(&mut self, scale: f32) {
        if self.is_null() {
            return;
        }
        let factor = scale / self.magnitude();
        self.scale(factor);
    }

    pub fn normalized(&self, scale: f32) -> Vector2 {
        let mut w = self.clone();
        w.normalize(scale);
        w
    }

    #[inline]
    pub fn dot(&self, other: &Vector2) -> f32 {
        self.u * other.u + self.v * other.v
    }

    /// Scalar (z-component) cross product.
    #[inline]
    pub fn cross(&self, other: &Vector2) -> f32 {
        self.u * other.v - self.v * other.u
    }

    pub fn distance_squared_from(&self, other: &Vector2) -> f32 {
        let du = self.u - other.u;
        let dv = self.v - other.v;
        du * du + dv * dv
    }

    pub fn distance_from(&self, other: &Vector2) -> f32 {
        self.distance_squared_from(other).sqrt()
    }

    pub fn angle_between(&self, other: &Vector2) -> f32 {
        if self.is_null() || other.is_null() {
            return 0.0;
        }
        let cos = self.dot(other) / (self.magnitude() * other.magnitude());
        cos.clamp(-1.0, 1.0).acos().to_degrees()
    }

    pub fn angle_from(&self, other: &Vector2) -> f32 {
        let angle = self.angle_between(other);
        if angle > 0.0 && angle < 180.0 && self.cross(other) > 0.0 {
            -angle
        } else {
            angle
        }
    }

    pub fn angle_to(&self, other: &Vector2) -> f32 {
        other.angle_from(self)
    }

    /// Heading relative to `+v` ("north").
    pub fn degree_heading(&self) -> f32 {
        Vector2::new(0.0, 1.0).angle_from(self)
    }

    pub fn rotate(&mut self, degrees: f32) {
        let theta = (-degrees).to_radians();
        let (sin, cos) = theta.sin_cos();
        let u = self.u * cos - self.v * sin;
        let v = self.u * sin + self.v * cos;
        self.set(u, v);
    }

    pub fn move_towards(&mut self, target: &Vector2, max_step: f32) {
        let mut diff = target - &*self;
        if diff.magnitude() <= max_step {
            self.reset_to(target);
        } else {
            diff.normalize(max_step);
            self.add(&diff);
        }
    }

    pub fn jitter<R: Rng + ?Sized>(&mut self, max_amount: f32, rng: &mut R) {
        if max_amount <= 0.0 {
            return;
        }
        self.set(
            self.u + rng.gen_range(-max_amount..=max_amount),
            self.v + rng.gen_range(-max_amount..=max_amount),
        );
    }
}

impl PartialEq for Vector2 {
    fn eq(&self, other: &Self) -> bool {
        self.u == other.u && self.v == other.v
    }
}

impl fmt::Debug for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector2")
            .field("u", &self.u)
            .field("v", &self.v)
            .finish()
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<u={:.4}, v={:.4}>", self.u, self.v)
    }
}

impl ops::Add<&Vector2> for &Vector2 {
    type Output = Vector2;
    fn add(self, rhs: &Vector2) -> Vector2 {
        Vector2::new(self.u + rhs.u, self.v + rhs.v)
    }
}

impl ops::Sub<&Vector2> for &Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: &Vector2) -> Vector2 {
        Vector2::new(self.u - rhs.u, self.v - rhs.v)
    }
}

impl ops::Mul<f32> for &Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f32) -> Vector2 {
        Vector2::new(self.u * rhs, self.v * rhs)
    }
}

impl ops::Neg for &Vector2 {
    type Output = Vector2;
    fn neg(self) -> Vector2 {
        self.inverted()
    }
}

impl ops::AddAssign<&Vector2> for Vector2 {
    fn add_assign(&mut self, rhs: &Vector2) {
        Vector2::add(self, rhs);
    }
}

impl ops::SubAssign<&Vector2> for Vector2 {
    fn sub_assign(&mut self, rhs: &Vector2) {
        self.subtract(rhs);
    }
}

impl ops::Div<f32> for &Vector2 {
    type Output = Vector2;
    fn div(self, rhs: f32) -> Vector2 {
        Vector2::new(self.u / rhs, self.v / rhs)
    }
}

impl From<[f32; 2]> for Vector2 {
    fn from([u, v]: [f32; 2]) -> Self {
        Vector2::new(u, v)
    }
}
