//! Real balls: midpoint-radius intervals with a rigorous enclosure contract.
//!
//! A `RealBall` stores an arbitrary-precision midpoint and a low-precision
//! nonnegative radius, and represents every real number within `radius` of
//! the midpoint. Every operation returns a ball that contains the exact
//! image of every point of its input balls; midpoint rounding errors are
//! folded into the output radius, and radius arithmetic always rounds up.

use std::fmt;

use num_rational::BigRational;

use crate::bigfloat::{BigFloat, Round};

/// Radius precision in bits. Radii are coarse upper bounds, so a handful of
/// bits suffices; what matters is that they are never rounded down.
pub const RAD_PREC: u32 = 30;

/// Errors shared by the ball-arithmetic operations and the evaluators
/// built on top of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallError {
    /// Divisor ball contains zero, so no finite enclosure exists.
    DivisionByZero,
    /// Power series divisor has a constant term containing zero.
    SingularDivisor,
    /// The quotient of two zero power series is undefined.
    IndeterminateResult,
    /// The arguments fall outside every implemented convergence region.
    UnsupportedRegion,
    /// The operation is undefined on part of the input ball.
    OutOfDomain(&'static str),
}

impl fmt::Display for BallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BallError::DivisionByZero => write!(f, "division by a ball containing zero"),
            BallError::SingularDivisor => {
                write!(f, "power series divisor has a constant term containing zero")
            }
            BallError::IndeterminateResult => {
                write!(f, "quotient of zero power series is indeterminate")
            }
            BallError::UnsupportedRegion => {
                write!(f, "arguments lie outside the supported convergence region")
            }
            BallError::OutOfDomain(msg) => write!(f, "out of domain: {}", msg),
        }
    }
}

impl std::error::Error for BallError {}

pub type BallResult<T> = Result<T, BallError>;

/// Ball `[mid - rad, mid + rad]` on the real line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RealBall {
    mid: BigFloat,
    rad: BigFloat,
}

/// Round a nonnegative bound up to radius precision.
fn rad_up(x: &BigFloat) -> BigFloat {
    x.round(RAD_PREC, Round::Up).0
}

/// Upper bound of `|x|` at radius precision.
fn abs_up(x: &BigFloat) -> BigFloat {
    x.abs().round(RAD_PREC, Round::Up).0
}

/// Upper bound of `a / b` for nonnegative `a` and positive `b`.
fn div_up(a: &BigFloat, b: &BigFloat) -> BigFloat {
    let (q, err) = a.div_round(b, RAD_PREC, Round::Up);
    q.add(&err)
}

impl RealBall {
    /// Exact ball with zero radius.
    pub fn from_bigfloat(mid: BigFloat) -> Self {
        Self {
            mid,
            rad: BigFloat::zero(),
        }
    }

    pub fn zero() -> Self {
        Self::from_bigfloat(BigFloat::zero())
    }

    pub fn one() -> Self {
        Self::from_bigfloat(BigFloat::one())
    }

    pub fn from_i64(v: i64) -> Self {
        Self::from_bigfloat(BigFloat::from_i64(v))
    }

    /// Exact ball from a finite `f64`.
    pub fn from_f64(v: f64) -> Self {
        Self::from_bigfloat(BigFloat::from_f64(v))
    }

    /// Enclosure of `num / den` at `prec` bits.
    ///
    /// # Panics
    /// Panics if `den` is zero.
    pub fn from_rational(num: i64, den: i64, prec: u32) -> Self {
        let (mid, err) = BigFloat::from_i64(num).div_round(
            &BigFloat::from_i64(den),
            prec,
            Round::Nearest,
        );
        Self {
            mid,
            rad: rad_up(&err),
        }
    }

    /// Enclosure of an exact rational at `prec` bits.
    pub fn from_big_rational(q: &BigRational, prec: u32) -> Self {
        let num = BigFloat::from_bigint(q.numer().clone());
        let den = BigFloat::from_bigint(q.denom().clone());
        let (mid, err) = num.div_round(&den, prec, Round::Nearest);
        Self {
            mid,
            rad: rad_up(&err),
        }
    }

    /// Ball from an explicit midpoint and radius.
    ///
    /// # Panics
    /// Panics if `rad` is negative.
    pub fn with_radius(mid: BigFloat, rad: BigFloat) -> Self {
        assert!(!rad.is_negative(), "ball radius must be nonnegative");
        Self {
            mid,
            rad: rad_up(&rad),
        }
    }

    pub fn mid(&self) -> &BigFloat {
        &self.mid
    }

    pub fn rad(&self) -> &BigFloat {
        &self.rad
    }

    /// Exact lower endpoint `mid - rad`.
    pub fn lower(&self) -> BigFloat {
        self.mid.sub(&self.rad)
    }

    /// Exact upper endpoint `mid + rad`.
    pub fn upper(&self) -> BigFloat {
        self.mid.add(&self.rad)
    }

    /// Upper bound of `|x|` over the ball.
    pub fn mag_upper(&self) -> BigFloat {
        self.mid.abs().add(&self.rad)
    }

    /// Lower bound of `|x|` over the ball (zero when the ball straddles 0).
    pub fn mag_lower(&self) -> BigFloat {
        let d = self.mid.abs().sub(&self.rad);
        if d.is_negative() {
            BigFloat::zero()
        } else {
            d
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.mid.to_f64()
    }

    /// True only for the exact point ball 0.
    pub fn is_zero(&self) -> bool {
        self.mid.is_zero() && self.rad.is_zero()
    }

    /// True only for the exact point ball 1.
    pub fn is_one(&self) -> bool {
        self.mid.is_one() && self.rad.is_zero()
    }

    pub fn is_exact(&self) -> bool {
        self.rad.is_zero()
    }

    /// True only when the ball is an exact integer point.
    pub fn is_int(&self) -> bool {
        self.rad.is_zero() && self.mid.is_integer()
    }

    /// True when the whole interval lies strictly above zero.
    pub fn is_positive(&self) -> bool {
        self.lower().is_positive()
    }

    /// True when the whole interval lies strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.upper().is_negative()
    }

    /// True when no point of the interval is negative.
    pub fn is_nonnegative(&self) -> bool {
        !self.lower().is_negative()
    }

    pub fn contains_zero(&self) -> bool {
        !self.lower().is_positive() && !self.upper().is_negative()
    }

    /// Membership test for an exact dyadic point.
    pub fn contains(&self, x: &BigFloat) -> bool {
        self.lower() <= *x && *x <= self.upper()
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.lower().max(other.lower()) <= self.upper().min(other.upper())
    }

    /// Widen the radius by an exact error bound.
    pub fn add_error(&mut self, err: &BigFloat) {
        self.rad = rad_up(&self.rad.add(&err.abs()));
    }

    pub fn neg(&self) -> Self {
        Self {
            mid: self.mid.neg(),
            rad: self.rad.clone(),
        }
    }

    /// Enclosure of `|x|`; the midpoint moves to `|mid|`, the radius is kept.
    pub fn abs(&self) -> Self {
        Self {
            mid: self.mid.abs(),
            rad: self.rad.clone(),
        }
    }

    /// Exact scaling by `2^k`.
    pub fn mul_2exp(&self, k: i64) -> Self {
        Self {
            mid: self.mid.mul_2exp(k),
            rad: self.rad.mul_2exp(k),
        }
    }

    /// Re-round the midpoint to `prec` bits, folding the error into the radius.
    pub fn round(&self, prec: u32) -> Self {
        let (mid, err) = self.mid.round(prec, Round::Nearest);
        Self {
            mid,
            rad: rad_up(&self.rad.add(&err)),
        }
    }

    pub fn add(&self, rhs: &Self, prec: u32) -> Self {
        let sum = self.mid.add(&rhs.mid);
        let (mid, err) = sum.round(prec, Round::Nearest);
        Self {
            mid,
            rad: rad_up(&self.rad.add(&rhs.rad).add(&err)),
        }
    }

    pub fn sub(&self, rhs: &Self, prec: u32) -> Self {
        self.add(&rhs.neg(), prec)
    }

    /// Convenience for `self + k` with an exact integer.
    pub fn add_i64(&self, k: i64, prec: u32) -> Self {
        let sum = self.mid.add(&BigFloat::from_i64(k));
        let (mid, err) = sum.round(prec, Round::Nearest);
        Self {
            mid,
            rad: rad_up(&self.rad.add(&err)),
        }
    }

    pub fn sub_i64(&self, k: i64, prec: u32) -> Self {
        self.add_i64(-k, prec)
    }

    pub fn mul(&self, rhs: &Self, prec: u32) -> Self {
        let prod = self.mid.mul(&rhs.mid);
        let (mid, err) = prod.round(prec, Round::Nearest);
        // |x| rad_y + |y| rad_x + rad_x rad_y, all bounds rounded up
        let ax = abs_up(&self.mid);
        let ay = abs_up(&rhs.mid);
        let prop = ax
            .mul(&rhs.rad)
            .add(&ay.mul(&self.rad))
            .add(&self.rad.mul(&rhs.rad));
        Self {
            mid,
            rad: rad_up(&prop.add(&err)),
        }
    }

    /// Enclosure of the quotient.
    ///
    /// # Errors
    /// `DivisionByZero` when `rhs` contains zero.
    pub fn div(&self, rhs: &Self, prec: u32) -> BallResult<Self> {
        if rhs.contains_zero() {
            return Err(BallError::DivisionByZero);
        }
        Ok(self.div_inner(rhs, prec))
    }

    /// Division by a ball known to lie strictly above zero.
    ///
    /// # Panics
    /// Panics if `rhs` is not strictly positive.
    pub(crate) fn div_pos(&self, rhs: &Self, prec: u32) -> Self {
        assert!(rhs.is_positive(), "divisor must be strictly positive");
        self.div_inner(rhs, prec)
    }

    fn div_inner(&self, rhs: &Self, prec: u32) -> Self {
        let (mid, err) = self.mid.div_round(&rhs.mid, prec, Round::Nearest);
        // (rad_x |m_y| + |m_x| rad_y) / (|m_y| (|m_y| - rad_y))
        let ay = rhs.mid.abs();
        let num = self.rad.mul(&abs_up(&ay)).add(&abs_up(&self.mid).mul(&rhs.rad));
        let den = ay
            .round(RAD_PREC, Round::Down)
            .0
            .mul(&ay.sub(&rhs.rad).round(RAD_PREC, Round::Down).0);
        let prop = if num.is_zero() {
            BigFloat::zero()
        } else {
            div_up(&num, &den)
        };
        Self {
            mid,
            rad: rad_up(&prop.add(&err)),
        }
    }

    /// Quotient by an exact nonzero integer, which cannot fail.
    pub fn div_i64(&self, k: i64, prec: u32) -> Self {
        assert!(k != 0, "division by zero integer");
        let d = BigFloat::from_i64(k);
        let (mid, err) = self.mid.div_round(&d, prec, Round::Nearest);
        let prop = if self.rad.is_zero() {
            BigFloat::zero()
        } else {
            div_up(&self.rad, &d.abs())
        };
        Self {
            mid,
            rad: rad_up(&prop.add(&err)),
        }
    }

    /// Square root with the negative part of the ball clamped to zero.
    ///
    /// # Errors
    /// `OutOfDomain` when the whole ball is strictly negative.
    pub fn sqrt(&self, prec: u32) -> BallResult<Self> {
        if self.upper().is_negative() {
            return Err(BallError::OutOfDomain("sqrt of a ball strictly below zero"));
        }
        Ok(self.sqrt_clamped(prec))
    }

    /// Square root for balls whose upper endpoint is known nonnegative.
    pub(crate) fn sqrt_nonneg(&self, prec: u32) -> Self {
        self.sqrt_clamped(prec)
    }

    fn sqrt_clamped(&self, prec: u32) -> Self {
        let hi = self.upper();
        let lo = self.lower();
        let lo = if lo.is_negative() { BigFloat::zero() } else { lo };
        let slo = lo.sqrt_bounds(prec + 2).0;
        let shi = hi.sqrt_bounds(prec + 2).1;
        let (mid, err) = slo.add(&shi).mul_2exp(-1).round(prec, Round::Nearest);
        Self {
            mid,
            rad: rad_up(&shi.sub(&slo).mul_2exp(-1).add(&err)),
        }
    }

    /// Integer power by binary powering.
    pub fn pow_u64(&self, e: u64, prec: u32) -> Self {
        if e == 0 {
            return Self::one();
        }
        let wp = prec + 2 * (64 - e.leading_zeros()) + 4;
        let mut base = self.round(wp);
        let mut acc = Self::one();
        let mut e = e;
        while e > 0 {
            if e & 1 == 1 {
                acc = acc.mul(&base, wp);
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base, wp);
            }
        }
        acc.round(prec)
    }

    /// Smallest ball containing both arguments.
    pub fn hull(&self, other: &Self, prec: u32) -> Self {
        let lo = self.lower().min(other.lower());
        let hi = self.upper().max(other.upper());
        let (mid, err) = lo.add(&hi).mul_2exp(-1).round(prec, Round::Nearest);
        Self {
            mid,
            rad: rad_up(&hi.sub(&lo).mul_2exp(-1).add(&err)),
        }
    }
}

impl fmt::Display for RealBall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:e} +/- {:e}]", self.mid.to_f64(), self.rad.to_f64())
    }
}
