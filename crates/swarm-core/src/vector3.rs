//! 3D vector with lazily cached magnitude.
//!
//! Components are private so that every write goes through a method that
//! invalidates the magnitude cache.  `magnitude()` needs a square root,
//! `magnitude_squared()` does not; radius comparisons in the engine always
//! use the squared form.  Both are memoised and invalidated together, so
//! repeated reads after a single write cost one recomputation.
//!
//! Angles are in **degrees**.
//!
//! # Signed angles in 3D
//!
//! The unsigned angle between two directions is `acos(a·b / |a||b|)`.  Its
//! sign comes from the ground-plane cross product `a.x*b.z - a.z*b.x`, i.e.
//! the 2D rule with `(x, z)` standing in for `(u, v)`: a positive cross
//! product (anti-clockwise seen from above) negates the angle.
//! [`Vector3::rotate`] turns about the vertical `y` axis with the same
//! convention, so `v.angle_from(&rotated_by_d) == d`.

use std::fmt;
use std::ops;

use rand::Rng;

use crate::cache::MagnitudeCache;

#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    x: f32,
    y: f32,
    z: f32,
    #[cfg_attr(feature = "serde", serde(skip))]
    cache: MagnitudeCache,
}

impl Vector3 {
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, cache: MagnitudeCache::default() }
    }

    #[inline]
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Unit vector along the vertical axis.
    #[inline]
    pub fn up() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    // ── Components ────────────────────────────────────────────────────────

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.z
    }

    pub fn set_x(&mut self, x: f32) {
        if x != self.x {
            self.x = x;
            self.cache.invalidate();
        }
    }

    pub fn set_y(&mut self, y: f32) {
        if y != self.y {
            self.y = y;
            self.cache.invalidate();
        }
    }

    pub fn set_z(&mut self, z: f32) {
        if z != self.z {
            self.z = z;
            self.cache.invalidate();
        }
    }

    /// Overwrite all three components.
    pub fn set(&mut self, x: f32, y: f32, z: f32) {
        self.x = x;
        self.y = y;
        self.z = z;
        self.cache.invalidate();
    }

    /// Reset to the zero vector.
    pub fn reset(&mut self) {
        self.set(0.0, 0.0, 0.0);
        self.cache.magnitude.set(0.0);
        self.cache.magnitude_squared.set(0.0);
    }

    /// Copy `other`'s components (and its cached magnitudes, if any).
    pub fn reset_to(&mut self, other: &Vector3) {
        self.x = other.x;
        self.y = other.y;
        self.z = other.z;
        self.cache = other.cache.clone();
    }

    #[inline]
    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// `true` if every component is exactly zero.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    // ── Magnitude ─────────────────────────────────────────────────────────

    pub fn magnitude_squared(&self) -> f32 {
        self.cache
            .magnitude_squared
            .get_or_compute(|| self.x * self.x + self.y * self.y + self.z * self.z)
    }

    pub fn magnitude(&self) -> f32 {
        self.cache
            .magnitude
            .get_or_compute(|| self.magnitude_squared().sqrt())
    }

    /// `true` if the magnitude is currently memoised (diagnostic only).
    #[inline]
    pub fn is_magnitude_cached(&self) -> bool {
        self.cache.magnitude.is_set()
    }

    // ── In-place arithmetic ───────────────────────────────────────────────

    pub fn add(&mut self, other: &Vector3) {
        self.set(self.x + other.x, self.y + other.y, self.z + other.z);
    }

    pub fn subtract(&mut self, other: &Vector3) {
        self.set(self.x - other.x, self.y - other.y, self.z - other.z);
    }

    pub fn scale(&mut self, factor: f32) {
        self.set(self.x * factor, self.y * factor, self.z * factor);
    }

    pub fn divide(&mut self, divisor: f32) {
        self.set(self.x / divisor, self.y / divisor, self.z / divisor);
    }

    /// Negate in place.  The magnitude is unchanged, so the cache survives.
    pub fn invert(&mut self) {
        self.x = -self.x;
        self.y = -self.y;
        self.z = -self.z;
    }

    pub fn inverted(&self) -> Vector3 {
        let mut v = self.clone();
        v.invert();
        v
    }

    /// Rescale to length `scale`.  No-op on the zero vector.
    pub fn normalize(&mut self, scale: f32) {
        if self.is_null() {
            return;
        }
        let factor = scale / self.magnitude();
        self.scale(factor);
    }

    pub fn normalized(&self, scale: f32) -> Vector3 {
        let mut v = self.clone();
        v.normalize(scale);
        v
    }

    // ── Products & distances ──────────────────────────────────────────────

    #[inline]
    pub fn dot(&self, other: &Vector3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Scalar cross product of the `(x, z)` ground-plane projections.
    #[inline]
    pub fn ground_cross(&self, other: &Vector3) -> f32 {
        self.x * other.z - self.z * other.x
    }

    pub fn distance_squared_from(&self, other: &Vector3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance_from(&self, other: &Vector3) -> f32 {
        self.distance_squared_from(other).sqrt()
    }

    // ── Angles ────────────────────────────────────────────────────────────

    /// Unsigned angle between the two directions, in `[0, 180]`.
    ///
    /// Returns 0 if either vector is null.
    pub fn angle_between(&self, other: &Vector3) -> f32 {
        if self.is_null() || other.is_null() {
            return 0.0;
        }
        let cos = self.dot(other) / (self.magnitude() * other.magnitude());
        // Rounding can push |cos| just past 1.
        cos.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Signed angle from `self` to `other` (negative for anti-clockwise).
    pub fn angle_from(&self, other: &Vector3) -> f32 {
        let angle = self.angle_between(other);
        if angle > 0.0 && angle < 180.0 && self.ground_cross(other) > 0.0 {
            -angle
        } else {
            angle
        }
    }

    /// Signed angle measured the other way round: `other.angle_from(self)`.
    pub fn angle_to(&self, other: &Vector3) -> f32 {
        other.angle_from(self)
    }

    /// Heading of this vector relative to the `+z` ("north") direction.
    pub fn degree_heading(&self) -> f32 {
        Vector3::new(0.0, 0.0, 1.0).angle_from(self)
    }

    /// Rotate about the vertical axis by `degrees`.
    pub fn rotate(&mut self, degrees: f32) {
        let theta = (-degrees).to_radians();
        let (sin, cos) = theta.sin_cos();
        let x = self.x * cos - self.z * sin;
        let z = self.x * sin + self.z * cos;
        self.set(x, self.y, z);
    }

    // ── Movement ──────────────────────────────────────────────────────────

    /// Step towards `target` by at most `max_step`, snapping onto it when
    /// it is within reach.
    pub fn move_towards(&mut self, target: &Vector3, max_step: f32) {
        let mut diff = target - &*self;
        if diff.magnitude() <= max_step {
            self.reset_to(target);
        } else {
            diff.normalize(max_step);
            self.add(&diff);
        }
    }

    /// Add independent uniform noise in `[-max_amount, max_amount]` per axis.
    pub fn jitter<R: Rng + ?Sized>(&mut self, max_amount: f32, rng: &mut R) {
        if max_amount <= 0.0 {
            return;
        }
        self.set(
            self.x + rng.gen_range(-max_amount..=max_amount),
            self.y + rng.gen_range(-max_amount..=max_amount),
            self.z + rng.gen_range(-max_amount..=max_amount),
        );
    }
}

// ── Trait impls ───────────────────────────────────────────────────────────────

impl PartialEq for Vector3 {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

impl fmt::Debug for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector3")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("z", &self.z)
            .finish()
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<x={:.4}, y={:.4}, z={:.4}>", self.x, self.y, self.z)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Vector3::new(x, y, z)
    }
}

impl ops::Add<&Vector3> for &Vector3 {
    type Output = Vector3;
    fn add(self, rhs: &Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl ops::Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        &self + &rhs
    }
}

impl ops::Sub<&Vector3> for &Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: &Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl ops::Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        &self - &rhs
    }
}

impl ops::AddAssign<&Vector3> for Vector3 {
    fn add_assign(&mut self, rhs: &Vector3) {
        Vector3::add(self, rhs);
    }
}

impl ops::SubAssign<&Vector3> for Vector3 {
    fn sub_assign(&mut self, rhs: &Vector3) {
        self.subtract(rhs);
    }
}

impl ops::Mul<f32> for &Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f32) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl ops::Mul<f32> for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f32) -> Vector3 {
        &self * rhs
    }
}

impl ops::Div<f32> for &Vector3 {
    type Output = Vector3;
    fn div(self, rhs: f32) -> Vector3 {
        Vector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl ops::Div<f32> for Vector3 {
    type Output = Vector3;
    fn div(self, rhs: f32) -> Vector3 {
        &self / rhs
    }
}

impl ops::Neg for &Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        self.inverted()
    }
}

impl ops::Neg for Vector3 {
    type Output = Vector3;
    fn neg(mut self) -> Vector3 {
        self.invert();
        self
    }
}
