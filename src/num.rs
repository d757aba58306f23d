//! Scalar and complex number types shared by the FFT and gridding stages.
//!
//! Transcendental functions route through `libm` so every module stays
//! usable without `std`.

use core::f32::consts::PI as PI32;

// Minimal float trait for the generic FFT (no_std, libm-backed)
pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + core::fmt::Debug
    + core::ops::Add<Output = Self>
    + core::ops::Sub<Output = Self>
    + core::ops::Mul<Output = Self>
    + core::ops::Div<Output = Self>
    + core::ops::Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    fn zero() -> Self;
    fn one() -> Self;
    fn from_f64(x: f64) -> Self;
    /// Attempt to convert a `usize` into the floating-point type.
    /// Returns `None` if the value cannot be represented exactly.
    fn from_usize(x: usize) -> Option<Self>;
    fn cos(self) -> Self;
    fn sin(self) -> Self;
    fn sin_cos(self) -> (Self, Self);
    fn exp(self) -> Self;
    fn sqrt(self) -> Self;
    fn abs(self) -> Self;
    fn pi() -> Self;
    #[inline(always)]
    fn mul_add(self, a: Self, b: Self) -> Self {
        self * a + b
    }
}

impl Float for f32 {
    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn from_f64(x: f64) -> Self {
        x as f32
    }
    fn from_usize(x: usize) -> Option<Self> {
        const MAX_EXACT: usize = 1usize << 24;
        if x < MAX_EXACT {
            Some(x as f32)
        } else {
            None
        }
    }
    fn cos(self) -> Self {
        libm::cosf(self)
    }
    fn sin(self) -> Self {
        libm::sinf(self)
    }
    fn sin_cos(self) -> (Self, Self) {
        libm::sincosf(self)
    }
    fn exp(self) -> Self {
        libm::expf(self)
    }
    fn sqrt(self) -> Self {
        libm::sqrtf(self)
    }
    fn abs(self) -> Self {
        libm::fabsf(self)
    }
    fn pi() -> Self {
        PI32
    }
    #[inline(always)]
    fn mul_add(self, a: Self, b: Self) -> Self {
        libm::fmaf(self, a, b)
    }
}

impl Float for f64 {
    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn from_f64(x: f64) -> Self {
        x
    }
    fn from_usize(x: usize) -> Option<Self> {
        const MAX_EXACT: usize = 1usize << 53;
        if x < MAX_EXACT {
            Some(x as f64)
        } else {
            None
        }
    }
    fn cos(self) -> Self {
        libm::cos(self)
    }
    fn sin(self) -> Self {
        libm::sin(self)
    }
    fn sin_cos(self) -> (Self, Self) {
        libm::sincos(self)
    }
    fn exp(self) -> Self {
        libm::exp(self)
    }
    fn sqrt(self) -> Self {
        libm::sqrt(self)
    }
    fn abs(self) -> Self {
        libm::fabs(self)
    }
    fn pi() -> Self {
        core::f64::consts::PI
    }
    #[inline(always)]
    fn mul_add(self, a: Self, b: Self) -> Self {
        libm::fma(self, a, b)
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Complex<T: Float> {
    pub re: T,
    pub im: T,
}

impl<T: Float> Complex<T> {
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
    pub fn zero() -> Self {
        Self {
            re: T::zero(),
            im: T::zero(),
        }
    }
    /// `exp(i·theta)`.
    #[inline(always)]
    pub fn expi(theta: T) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self { re: cos, im: sin }
    }
    #[inline(always)]
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }
    /// Multiply both parts by a real factor.
    #[inline(always)]
    pub fn scale(self, factor: T) -> Self {
        Self {
            re: self.re * factor,
            im: self.im * factor,
        }
    }
    /// Magnitude `|z|`.
    pub fn norm(self) -> T {
        (self.re * self.re + self.im * self.im).sqrt()
    }
    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn add(self, other: Self) -> Self {
        Self {
            re: self.re + other.re,
            im: self.im + other.im,
        }
    }
    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn sub(self, other: Self) -> Self {
        Self {
            re: self.re - other.re,
            im: self.im - other.im,
        }
    }
    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn mul(self, other: Self) -> Self {
        Self {
            re: self.re.mul_add(other.re, -(self.im * other.im)),
            im: self.re.mul_add(other.im, self.im * other.re),
        }
    }
}

impl<T: Float> core::ops::Neg for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl<T: Float> core::ops::Add for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Complex::<T>::add(self, other)
    }
}

impl<T: Float> core::ops::AddAssign for Complex<T> {
    #[inline(always)]
    fn add_assign(&mut self, other: Self) {
        *self = Complex::<T>::add(*self, other);
    }
}

impl<T: Float> core::ops::Sub for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Complex::<T>::sub(self, other)
    }
}

impl<T: Float> core::ops::Mul for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        Complex::<T>::mul(self, other)
    }
}

pub type Complex32 = Complex<f32>;
pub type Complex64 = Complex<f64>;
