//! Combinatorial primitives: factorials, binomials and rising factorials,
//! as exact integers where possible and ball enclosures otherwise.

use num_bigint::BigInt;
use num_integer::binomial as int_binomial;
use num_traits::{One, Zero};

use crate::bigfloat::BigFloat;
use crate::complexball::ComplexBall;
use crate::realball::RealBall;

/// Exact factorial `n!`.
pub fn factorial_exact(n: u64) -> BigInt {
    let mut f = BigInt::one();
    for k in 2..=n {
        f *= BigInt::from(k);
    }
    f
}

/// Enclosure of `n!` rounded to `prec` bits.
pub fn factorial_ball(n: u64, prec: u32) -> RealBall {
    RealBall::from_bigfloat(BigFloat::from_bigint(factorial_exact(n))).round(prec)
}

/// Exact binomial coefficient `C(n, k)`; zero when `k > n`.
pub fn binomial_exact(n: u64, k: u64) -> BigInt {
    if k > n {
        return BigInt::zero();
    }
    int_binomial(BigInt::from(n), BigInt::from(k))
}

/// Rising factorial `x (x+1) ... (x+k-1)` over a complex ball.
pub fn rising_factorial(x: &ComplexBall, k: u64, prec: u32) -> ComplexBall {
    if k == 0 {
        return ComplexBall::one();
    }
    let wp = prec + 2 * (64 - k.leading_zeros()) + 8;
    let mut acc = x.round(wp);
    for i in 1..k {
        acc = acc.mul(&x.add_i64(i as i64, wp), wp);
    }
    acc.round(prec)
}

/// Enclosure of the binomial `C(x, k)` with real-ball upper argument,
/// computed as the rising factorial of `x - k + 1` over `k!`.
pub fn binomial_ball(x: &RealBall, k: u64, prec: u32) -> RealBall {
    if k == 0 {
        return RealBall::one();
    }
    if k == 1 {
        return x.round(prec);
    }
    let wp = prec + 2 * (64 - k.leading_zeros()) + 8;
    let base = x.sub_i64(k as i64 - 1, wp);
    let mut acc = base.clone();
    for i in 1..k {
        acc = acc.mul(&base.add_i64(i as i64, wp), wp);
    }
    acc.div_pos(&factorial_ball(k, wp), wp).round(prec)
}
