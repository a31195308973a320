//! Bernoulli numbers, Bernoulli polynomials, and the two-variable
//! generalization defined by the generating function
//! `t e^{a t} / (x e^t - 1)`.

use std::sync::Mutex;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

use crate::complexball::ComplexBall;
use crate::primitives::{binomial_exact, factorial_ball};
use crate::realball::{BallResult, RealBall};
use crate::series_div::div_series;

static BERNOULLI_CACHE: Lazy<Mutex<Vec<BigRational>>> =
    Lazy::new(|| Mutex::new(vec![BigRational::one()]));

/// Exact Bernoulli number `B_m`, with the `B_1 = -1/2` convention.
///
/// Values are produced by the defining recurrence and cached, so the cost
/// of a call is paid once per new index.
pub fn bernoulli_number(m: usize) -> BigRational {
    let mut cache = BERNOULLI_CACHE.lock().unwrap();
    while cache.len() <= m {
        let k = cache.len();
        // B_k = -(1/(k+1)) sum_{j<k} C(k+1, j) B_j
        let mut s = BigRational::zero();
        for (j, bj) in cache.iter().enumerate() {
            let c = BigRational::from_integer(binomial_exact(k as u64 + 1, j as u64));
            s += c * bj;
        }
        let b = -s / BigRational::from_integer(BigInt::from(k as i64 + 1));
        cache.push(b);
    }
    cache[m].clone()
}

/// Enclosure of the Bernoulli polynomial `B_n(x)` by Horner evaluation
/// of `sum_k C(n, k) B_k x^{n-k}`.
pub fn bernoulli_polynomial(n: u64, x: &ComplexBall, prec: u32) -> ComplexBall {
    let wp = prec + 2 * (64 - n.leading_zeros()) + 16;
    let mut acc = ComplexBall::one();
    for j in 1..=n {
        let c = BigRational::from_integer(binomial_exact(n, j)) * bernoulli_number(j as usize);
        let cb = ComplexBall::from_real(RealBall::from_big_rational(&c, wp));
        acc = acc.mul(x, wp).add(&cb, wp);
    }
    acc.round(prec)
}

/// Enclosure of the generalized Bernoulli polynomial `B_n(a, x)`, the
/// coefficient of `t^n / n!` in `t e^{a t} / (x e^t - 1)`.
///
/// At `x = 1` the pole cancels and the value reduces to the classical
/// `B_n(a)`. For other `x` the coefficient is extracted by truncated
/// power series division of the two exponential series.
///
/// # Errors
/// `SingularDivisor` when `x - 1` contains zero without `x` being the
/// exact point 1, since the two branches then disagree on the ball.
pub fn generalized_bernoulli(
    n: u64,
    a: &ComplexBall,
    x: &ComplexBall,
    prec: u32,
) -> BallResult<ComplexBall> {
    if x.is_one() {
        return Ok(bernoulli_polynomial(n, a, prec));
    }
    let wp = prec + 2 * n as u32 + 24;
    let len = n as usize + 1;
    // numerator t e^{a t}: N_0 = 0, N_j = a^{j-1} / (j-1)!
    let mut num = Vec::with_capacity(len);
    num.push(ComplexBall::zero());
    if len > 1 {
        let mut term = ComplexBall::one();
        num.push(term.clone());
        for j in 2..len {
            term = term.mul(a, wp).div_i64(j as i64 - 1, wp);
            num.push(term.clone());
        }
    }
    // denominator x e^t - 1: D_0 = x - 1, D_j = x / j!
    let mut den = Vec::with_capacity(len);
    den.push(x.sub_i64(1, wp));
    if len > 1 {
        let mut term = x.round(wp);
        den.push(term.clone());
        for j in 2..len {
            term = term.div_i64(j as i64, wp);
            den.push(term.clone());
        }
    }
    let q = div_series(&num, &den, len, wp)?;
    Ok(q[n as usize]
        .mul_real(&factorial_ball(n, wp), wp)
        .round(prec))
}
