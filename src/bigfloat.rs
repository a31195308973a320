//! Arbitrary-precision binary floating-point values with directed rounding.
//!
//! A `BigFloat` is `mantissa * 2^exponent` with a `BigInt` mantissa kept odd
//! (or zero), so every value has exactly one representation. Addition,
//! subtraction and multiplication are exact; precision enters only through
//! explicit rounding operations, each of which returns the rounded value
//! together with an exact upper bound on the rounding error. Division and
//! square root return one-ulp-correct results the same way. This is the
//! substrate the ball layer builds its enclosure guarantees on.

use std::cmp::Ordering;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::{Integer, Roots};
use num_traits::{Float, One, Signed, Zero};

/// Rounding direction for [`BigFloat::round`] and friends.
///
/// `Down` truncates toward zero, `Up` rounds away from zero, `Nearest`
/// rounds to nearest with ties to even. For nonnegative values `Up` always
/// produces an upper bound and `Down` a lower bound of the exact value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Round {
    Nearest,
    Down,
    Up,
}

/// Exact binary number `mantissa * 2^exponent`, mantissa odd unless zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigFloat {
    mantissa: BigInt,
    exponent: i64,
}

impl BigFloat {
    /// Normalizing constructor: strips trailing zero bits off the mantissa.
    pub fn new(mantissa: BigInt, exponent: i64) -> Self {
        if mantissa.is_zero() {
            return Self::zero();
        }
        match mantissa.trailing_zeros() {
            Some(0) | None => Self { mantissa, exponent },
            Some(tz) => Self {
                mantissa: mantissa >> (tz as usize),
                exponent: exponent + tz as i64,
            },
        }
    }

    pub fn zero() -> Self {
        Self {
            mantissa: BigInt::zero(),
            exponent: 0,
        }
    }

    pub fn one() -> Self {
        Self {
            mantissa: BigInt::one(),
            exponent: 0,
        }
    }

    /// The value `2^k`.
    pub fn pow2(k: i64) -> Self {
        Self {
            mantissa: BigInt::one(),
            exponent: k,
        }
    }

    pub fn from_i64(v: i64) -> Self {
        Self::new(BigInt::from(v), 0)
    }

    pub fn from_bigint(v: BigInt) -> Self {
        Self::new(v, 0)
    }

    /// Exact conversion; every finite `f64` is a dyadic rational.
    ///
    /// # Panics
    /// Panics if `v` is NaN or infinite.
    pub fn from_f64(v: f64) -> Self {
        assert!(v.is_finite(), "BigFloat::from_f64 requires a finite value");
        if v == 0.0 {
            return Self::zero();
        }
        let (mant, exp, sign) = Float::integer_decode(v);
        let m = BigInt::from(mant) * BigInt::from(sign as i64);
        Self::new(m, exp as i64)
    }

    /// Approximate conversion (truncated to 53 mantissa bits); overflows
    /// saturate to infinity and underflows to zero.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let bits = self.bits();
        let shift = bits.saturating_sub(53);
        let top: BigUint = self.mantissa.magnitude() >> (shift as usize);
        let mut v = 0.0f64;
        for (i, digit) in top.iter_u64_digits().enumerate() {
            v += (digit as f64) * 2f64.powi((64 * i) as i32);
        }
        if self.mantissa.is_negative() {
            v = -v;
        }
        let e = (self.exponent + shift as i64).clamp(-4400, 4400) as i32;
        v * 2f64.powi(e)
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.exponent == 0 && self.mantissa.is_one()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.mantissa.is_positive()
    }

    /// True when the value is an integer (always true for zero).
    pub fn is_integer(&self) -> bool {
        self.is_zero() || self.exponent >= 0
    }

    /// Exact integer value, or `None` when the value is not an integer or
    /// too large to materialize sensibly.
    pub fn to_bigint(&self) -> Option<BigInt> {
        if self.is_zero() {
            return Some(BigInt::zero());
        }
        if self.exponent < 0 || self.exponent > 1 << 20 {
            return None;
        }
        Some(&self.mantissa << (self.exponent as usize))
    }

    /// Nearest integer, ties away from zero. Used for range reduction.
    pub fn to_nearest_bigint(&self) -> BigInt {
        if self.is_zero() {
            return BigInt::zero();
        }
        if self.exponent >= 0 {
            return &self.mantissa << (self.exponent as usize);
        }
        let shift = (-self.exponent) as usize;
        let mag = self.mantissa.magnitude();
        let rounded: BigUint = (mag + (BigUint::one() << (shift - 1))) >> shift;
        BigInt::from_biguint(self.mantissa.sign(), rounded)
    }

    /// Number of significant bits of the mantissa (0 for zero).
    pub fn bits(&self) -> u64 {
        self.mantissa.magnitude().bits()
    }

    /// Smallest `m` with `|self| < 2^m`; for nonzero values
    /// `2^(m-1) <= |self| < 2^m`. Returns `i64::MIN` for zero.
    pub fn mag_2exp(&self) -> i64 {
        if self.is_zero() {
            return i64::MIN;
        }
        self.exponent + self.bits() as i64
    }

    pub fn neg(&self) -> Self {
        Self {
            mantissa: -self.mantissa.clone(),
            exponent: self.exponent,
        }
    }

    pub fn abs(&self) -> Self {
        Self {
            mantissa: self.mantissa.abs(),
            exponent: self.exponent,
        }
    }

    /// Exact addition.
    pub fn add(&self, rhs: &Self) -> Self {
        if self.is_zero() {
            return rhs.clone();
        }
        if rhs.is_zero() {
            return self.clone();
        }
        let e = self.exponent.min(rhs.exponent);
        let lhs_m = &self.mantissa << ((self.exponent - e) as usize);
        let rhs_m = &rhs.mantissa << ((rhs.exponent - e) as usize);
        Self::new(lhs_m + rhs_m, e)
    }

    /// Exact subtraction.
    pub fn sub(&self, rhs: &Self) -> Self {
        self.add(&rhs.neg())
    }

    /// Exact multiplication.
    pub fn mul(&self, rhs: &Self) -> Self {
        if self.is_zero() || rhs.is_zero() {
            return Self::zero();
        }
        // odd * odd is odd, no renormalization needed
        Self {
            mantissa: &self.mantissa * &rhs.mantissa,
            exponent: self.exponent + rhs.exponent,
        }
    }

    /// Exact scaling by `2^k`.
    pub fn mul_2exp(&self, k: i64) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        Self {
            mantissa: self.mantissa.clone(),
            exponent: self.exponent + k,
        }
    }

    /// Round to `prec` significant bits. Returns the rounded value and an
    /// exact upper bound on `|rounded - self|` (zero when exact).
    pub fn round(&self, prec: u32, rnd: Round) -> (Self, Self) {
        assert!(prec >= 2, "precision must be at least 2 bits");
        let bits = self.bits();
        if bits <= prec as u64 {
            return (self.clone(), Self::zero());
        }
        let shift = (bits - prec as u64) as usize;
        let sign = self.mantissa.sign();
        let mag = self.mantissa.magnitude();
        let mut q: BigUint = mag >> shift;
        let dropped = mag - (&q << shift);
        if dropped.is_zero() {
            return (
                Self::new(BigInt::from_biguint(sign, q), self.exponent + shift as i64),
                Self::zero(),
            );
        }
        let ulp_exp = self.exponent + shift as i64;
        let err = match rnd {
            Round::Down => Self::pow2(ulp_exp),
            Round::Up => {
                q += 1u32;
                Self::pow2(ulp_exp)
            }
            Round::Nearest => {
                let half: BigUint = BigUint::one() << (shift - 1);
                if dropped > half || (dropped == half && q.is_odd()) {
                    q += 1u32;
                }
                Self::pow2(ulp_exp - 1)
            }
        };
        (
            Self::new(BigInt::from_biguint(sign, q), self.exponent + shift as i64),
            err,
        )
    }

    /// Division rounded to `prec` bits. Returns the quotient and an exact
    /// upper bound on `|quotient - self/rhs|`.
    ///
    /// # Panics
    /// Panics if `rhs` is zero.
    pub fn div_round(&self, rhs: &Self, prec: u32, rnd: Round) -> (Self, Self) {
        assert!(!rhs.is_zero(), "division by zero BigFloat");
        if self.is_zero() {
            return (Self::zero(), Self::zero());
        }
        let sa = self.bits() as i64;
        let sb = rhs.bits() as i64;
        // scale the numerator so the integer quotient carries prec + 2 bits
        let k = (prec as i64 + 3 + sb - sa).max(0) as usize;
        let num = &self.mantissa << k;
        let q = num / &rhs.mantissa;
        let e = self.exponent - k as i64 - rhs.exponent;
        // integer truncation: |self/rhs - q*2^e| < 2^e
        let raw = Self::new(q, e);
        let (rounded, rerr) = raw.round(prec, rnd);
        (rounded, rerr.add(&Self::pow2(e)))
    }

    /// Rigorous enclosure of the square root: `(lo, hi)` with
    /// `lo <= sqrt(self) <= hi` and `hi - lo` one ulp at `prec` bits.
    ///
    /// # Panics
    /// Panics if `self` is negative.
    pub fn sqrt_bounds(&self, prec: u32) -> (Self, Self) {
        assert!(!self.is_negative(), "sqrt of a negative BigFloat");
        if self.is_zero() {
            return (Self::zero(), Self::zero());
        }
        let mut m = self.mantissa.magnitude().clone();
        let e = self.exponent;
        let bits = m.bits();
        let want = 2 * (prec as u64 + 2);
        let mut k = if bits < want { want - bits } else { 0 };
        // keep e - k even so the exponent halves exactly
        if (e - k as i64) & 1 != 0 {
            k += 1;
        }
        m <<= k as usize;
        let s0 = m.sqrt();
        let h = (e - k as i64) / 2;
        let lo = Self::new(BigInt::from_biguint(Sign::Plus, s0.clone()), h);
        let hi = Self::new(BigInt::from_biguint(Sign::Plus, s0 + 1u32), h);
        (lo, hi)
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        let d = self.sub(other);
        if d.is_zero() {
            Ordering::Equal
        } else if d.is_negative() {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let x = BigFloat::new(BigInt::from(8), 0);
        assert_eq!(x.mantissa(), &BigInt::from(1));
        assert_eq!(x.exponent(), 3);
        assert_eq!(x, BigFloat::from_i64(8));
    }

    #[test]
    fn test_exact_arithmetic() {
        let a = BigFloat::from_f64(1.5);
        let b = BigFloat::from_f64(2.25);
        assert_eq!(a.add(&b).to_f64(), 3.75);
        assert_eq!(a.sub(&b).to_f64(), -0.75);
        assert_eq!(a.mul(&b).to_f64(), 3.375);
        assert_eq!(a.mul_2exp(3).to_f64(), 12.0);
    }

    #[test]
    fn test_round_directions() {
        // 0.1^3 carries about 150 mantissa bits, far more than 20
        let x = BigFloat::from_f64(0.1)
            .mul(&BigFloat::from_f64(0.1))
            .mul(&BigFloat::from_f64(0.1));
        let (down, ed) = x.round(20, Round::Down);
        let (up, eu) = x.round(20, Round::Up);
        let (near, en) = x.round(20, Round::Nearest);
        assert!(down < x && x < up);
        assert!(!ed.is_zero() && !eu.is_zero());
        // error bounds really bound the rounding error
        assert!(x.sub(&down).abs() <= ed);
        assert!(up.sub(&x).abs() <= eu);
        assert!(near.sub(&x).abs() <= en);
        // nearest error is at most half the directed one
        assert!(en < ed);
    }

    #[test]
    fn test_round_exact_value_is_unchanged() {
        let x = BigFloat::from_f64(0.75);
        let (r, e) = x.round(10, Round::Up);
        assert_eq!(r, x);
        assert!(e.is_zero());
    }

    #[test]
    fn test_div_round_error_bound() {
        let a = BigFloat::from_i64(1);
        let b = BigFloat::from_i64(3);
        let (q, err) = a.div_round(&b, 60, Round::Nearest);
        // 3*q must land within 3*err of 1
        let three_q = q.mul(&b);
        assert!(three_q.sub(&a).abs() <= err.mul(&b));
        assert!((q.to_f64() - 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_sqrt_bounds_sandwich() {
        for v in [2.0f64, 3.0, 0.5, 1e-8, 12345.678] {
            let x = BigFloat::from_f64(v);
            let (lo, hi) = x.sqrt_bounds(50);
            assert!(lo <= hi);
            assert!(lo.mul(&lo) <= x, "lo^2 > x for {}", v);
            assert!(x <= hi.mul(&hi), "hi^2 < x for {}", v);
        }
    }

    #[test]
    fn test_f64_roundtrip() {
        for v in [0.0, 1.0, -2.5, 0.1, 1e300, -1e-300, 123456789.0] {
            let x = BigFloat::from_f64(v);
            assert_eq!(x.to_f64(), v, "roundtrip failed for {}", v);
        }
    }

    #[test]
    fn test_ordering() {
        let a = BigFloat::from_f64(-1.5);
        let b = BigFloat::from_f64(0.25);
        let c = BigFloat::from_f64(3.0);
        assert!(a < b && b < c);
        assert_eq!(b.cmp(&b), Ordering::Equal);
        assert!(BigFloat::pow2(-100) > BigFloat::zero());
    }

    #[test]
    fn test_nearest_bigint() {
        assert_eq!(
            BigFloat::from_f64(2.5).to_nearest_bigint(),
            BigInt::from(3)
        );
        assert_eq!(
            BigFloat::from_f64(-2.5).to_nearest_bigint(),
            BigInt::from(-3)
        );
        assert_eq!(
            BigFloat::from_f64(7.25).to_nearest_bigint(),
            BigInt::from(7)
        );
        assert_eq!(BigFloat::zero().to_nearest_bigint(), BigInt::zero());
    }

    #[test]
    fn test_integer_predicates() {
        assert!(BigFloat::from_i64(12).is_integer());
        assert!(!BigFloat::from_f64(0.5).is_integer());
        assert_eq!(
            BigFloat::from_i64(-40).to_bigint(),
            Some(BigInt::from(-40))
        );
        assert_eq!(BigFloat::from_f64(0.5).to_bigint(), None);
    }
}
