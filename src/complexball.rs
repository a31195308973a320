//! Complex balls as rectangles: a real ball for each component.
//!
//! The enclosure contract matches the real layer componentwise, so the
//! represented set is an axis-aligned rectangle in the complex plane.
//! Transcendental operations go through `exp`, `log` and the angle
//! function; integer powers use binary powering so they stay valid on
//! and across the branch cut.

use std::fmt;

use num_complex::Complex64;
use num_traits::ToPrimitive;

use crate::bigfloat::BigFloat;
use crate::elementary::{atan2_ball, exp_ball, log_ball, sin_cos_ball};
use crate::realball::{BallError, BallResult, RealBall};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexBall {
    re: RealBall,
    im: RealBall,
}

impl ComplexBall {
    pub fn new(re: RealBall, im: RealBall) -> Self {
        Self { re, im }
    }

    pub fn zero() -> Self {
        Self::new(RealBall::zero(), RealBall::zero())
    }

    pub fn one() -> Self {
        Self::new(RealBall::one(), RealBall::zero())
    }

    pub fn from_real(re: RealBall) -> Self {
        Self::new(re, RealBall::zero())
    }

    pub fn from_i64(v: i64) -> Self {
        Self::from_real(RealBall::from_i64(v))
    }

    /// Exact ball from finite `f64` components.
    pub fn from_f64s(re: f64, im: f64) -> Self {
        Self::new(RealBall::from_f64(re), RealBall::from_f64(im))
    }

    pub fn re(&self) -> &RealBall {
        &self.re
    }

    pub fn im(&self) -> &RealBall {
        &self.im
    }

    pub fn to_complex64(&self) -> Complex64 {
        Complex64::new(self.re.to_f64(), self.im.to_f64())
    }

    pub fn conj(&self) -> Self {
        Self::new(self.re.clone(), self.im.neg())
    }

    pub fn neg(&self) -> Self {
        Self::new(self.re.neg(), self.im.neg())
    }

    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.re.is_one() && self.im.is_zero()
    }

    pub fn is_exact(&self) -> bool {
        self.re.is_exact() && self.im.is_exact()
    }

    /// True only when the ball is a single exact integer point.
    pub fn is_int(&self) -> bool {
        self.im.is_zero() && self.re.is_int()
    }

    pub fn contains_zero(&self) -> bool {
        self.re.contains_zero() && self.im.contains_zero()
    }

    /// The exact integer value, when the ball is one and it fits in `i64`.
    pub fn as_exact_i64(&self) -> Option<i64> {
        if !self.is_int() {
            return None;
        }
        self.re.mid().to_bigint().and_then(|b| b.to_i64())
    }

    /// Widen both component radii by an exact error bound.
    pub fn add_error(&mut self, err: &BigFloat) {
        self.re.add_error(err);
        self.im.add_error(err);
    }

    pub fn round(&self, prec: u32) -> Self {
        Self::new(self.re.round(prec), self.im.round(prec))
    }

    pub fn mul_2exp(&self, k: i64) -> Self {
        Self::new(self.re.mul_2exp(k), self.im.mul_2exp(k))
    }

    pub fn add(&self, rhs: &Self, prec: u32) -> Self {
        Self::new(self.re.add(&rhs.re, prec), self.im.add(&rhs.im, prec))
    }

    pub fn sub(&self, rhs: &Self, prec: u32) -> Self {
        Self::new(self.re.sub(&rhs.re, prec), self.im.sub(&rhs.im, prec))
    }

    pub fn add_i64(&self, k: i64, prec: u32) -> Self {
        Self::new(self.re.add_i64(k, prec), self.im.clone())
    }

    pub fn sub_i64(&self, k: i64, prec: u32) -> Self {
        Self::new(self.re.sub_i64(k, prec), self.im.clone())
    }

    pub fn mul(&self, rhs: &Self, prec: u32) -> Self {
        let wp = prec + 8;
        let ac = self.re.mul(&rhs.re, wp);
        let bd = self.im.mul(&rhs.im, wp);
        let ad = self.re.mul(&rhs.im, wp);
        let bc = self.im.mul(&rhs.re, wp);
        Self::new(ac.sub(&bd, prec), ad.add(&bc, prec))
    }

    pub fn mul_real(&self, rhs: &RealBall, prec: u32) -> Self {
        Self::new(self.re.mul(rhs, prec), self.im.mul(rhs, prec))
    }

    /// Enclosure of `|z|^2` as a real ball.
    pub fn normsq(&self, prec: u32) -> RealBall {
        let wp = prec + 8;
        self.re
            .mul(&self.re, wp)
            .add(&self.im.mul(&self.im, wp), prec)
    }

    /// Enclosure of `|z|`.
    pub fn abs(&self, prec: u32) -> RealBall {
        // normsq never has a negative upper bound
        self.normsq(prec + 8).sqrt_nonneg(prec)
    }

    /// Enclosure of `1/z`.
    ///
    /// # Errors
    /// `DivisionByZero` when the rectangle contains the origin.
    pub fn inv(&self, prec: u32) -> BallResult<Self> {
        let wp = prec + 8;
        let den = self.normsq(wp);
        if den.contains_zero() {
            return Err(BallError::DivisionByZero);
        }
        Ok(Self::new(
            self.re.div(&den, wp)?.round(prec),
            self.im.neg().div(&den, wp)?.round(prec),
        ))
    }

    /// Enclosure of the quotient, computed as `self * conj(rhs) / |rhs|^2`.
    ///
    /// # Errors
    /// `DivisionByZero` when `rhs` contains the origin.
    pub fn div(&self, rhs: &Self, prec: u32) -> BallResult<Self> {
        let wp = prec + 8;
        let den = rhs.normsq(wp);
        if den.contains_zero() {
            return Err(BallError::DivisionByZero);
        }
        let num = self.mul(&rhs.conj(), wp);
        Ok(Self::new(
            num.re.div(&den, wp)?.round(prec),
            num.im.div(&den, wp)?.round(prec),
        ))
    }

    pub fn div_real(&self, rhs: &RealBall, prec: u32) -> BallResult<Self> {
        Ok(Self::new(
            self.re.div(rhs, prec)?,
            self.im.div(rhs, prec)?,
        ))
    }

    /// Quotient by an exact nonzero integer, which cannot fail.
    pub fn div_i64(&self, k: i64, prec: u32) -> Self {
        Self::new(self.re.div_i64(k, prec), self.im.div_i64(k, prec))
    }

    /// Enclosure of `exp(z)` from `exp(a)(cos b + i sin b)`.
    pub fn exp(&self, prec: u32) -> Self {
        let wp = prec + 8;
        let er = exp_ball(&self.re, wp);
        let (s, c) = sin_cos_ball(&self.im, wp);
        Self::new(er.mul(&c, wp).round(prec), er.mul(&s, wp).round(prec))
    }

    /// Enclosure of the principal logarithm.
    ///
    /// # Errors
    /// `OutOfDomain` when the rectangle meets the origin or straddles the
    /// branch cut along the negative real axis.
    pub fn log(&self, prec: u32) -> BallResult<Self> {
        let wp = prec + 12;
        let n = self.normsq(wp);
        let re = log_ball(&n, wp)?.mul_2exp(-1);
        let im = atan2_ball(&self.im, &self.re, wp)?;
        Ok(Self::new(re.round(prec), im.round(prec)))
    }

    /// Enclosure of the principal square root `exp(log(z) / 2)`.
    ///
    /// # Errors
    /// Whatever `log` reports; the exact zero ball maps to zero directly.
    pub fn sqrt(&self, prec: u32) -> BallResult<Self> {
        if self.is_zero() {
            return Ok(Self::zero());
        }
        let wp = prec + 8;
        Ok(self.log(wp)?.mul_2exp(-1).exp(wp).round(prec))
    }

    /// Integer power by binary powering, valid on the branch cut.
    ///
    /// # Errors
    /// `DivisionByZero` for negative exponents of a ball containing zero.
    pub fn pow_i64(&self, k: i64, prec: u32) -> BallResult<Self> {
        if k == 0 {
            return Ok(Self::one());
        }
        let mag = 64 - k.unsigned_abs().leading_zeros();
        let wp = prec + 2 * mag + 8;
        let mut base = self.round(wp);
        let mut acc = Self::one();
        let mut e = k.unsigned_abs();
        while e > 0 {
            if e & 1 == 1 {
                acc = acc.mul(&base, wp);
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base, wp);
            }
        }
        if k < 0 {
            return acc.inv(prec);
        }
        Ok(acc.round(prec))
    }

    /// Enclosure of the principal power `z^w`.
    ///
    /// An exact zero exponent gives 1 regardless of the base. Exact
    /// integer exponents go through binary powering. An exact zero base
    /// gives 0 when `Re(w)` is strictly positive. Everything else is
    /// `exp(w log z)`.
    ///
    /// # Errors
    /// `OutOfDomain` for a zero base without strictly positive `Re(w)`,
    /// and whatever `log` reports for inexact balls meeting the origin or
    /// the branch cut.
    pub fn pow(&self, w: &Self, prec: u32) -> BallResult<Self> {
        if w.is_zero() {
            return Ok(Self::one());
        }
        if let Some(k) = w.as_exact_i64() {
            return self.pow_i64(k, prec);
        }
        if self.is_zero() {
            return if w.re.is_positive() {
                Ok(Self::zero())
            } else {
                Err(BallError::OutOfDomain(
                    "zero base requires an exponent with positive real part",
                ))
            };
        }
        let wp = prec + 12;
        let l = self.log(wp)?;
        Ok(w.mul(&l, wp).exp(wp).round(prec))
    }
}

impl fmt::Display for ComplexBall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}*I", self.re, self.im)
    }
}
