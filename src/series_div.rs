//! Truncated power series arithmetic over complex-ball coefficients.
//!
//! Series are coefficient vectors, lowest order first, truncated to `n`
//! terms. Division dispatches between a scalar path, closed two-term
//! formulas, a direct recurrence with a precomputed reciprocal, and
//! Newton iteration on the reciprocal series for long truncations.

use crate::complexball::ComplexBall;
use crate::realball::{BallError, BallResult};

/// Truncation length at or below which division uses the direct recurrence.
const BASECASE_CUTOFF: usize = 10;

/// First `n` coefficients of `a * b` by classical convolution.
///
/// Empty inputs count as the zero series, so the result is all zeros.
pub fn mullow(a: &[ComplexBall], b: &[ComplexBall], n: usize, prec: u32) -> Vec<ComplexBall> {
    if n == 0 {
        return Vec::new();
    }
    if a.is_empty() || b.is_empty() {
        return vec![ComplexBall::zero(); n];
    }
    let mut out = Vec::with_capacity(n);
    for k in 0..n {
        let mut acc = ComplexBall::zero();
        let lo = if k >= b.len() { k - b.len() + 1 } else { 0 };
        let hi = k.min(a.len() - 1);
        for i in lo..=hi {
            acc = acc.add(&a[i].mul(&b[k - i], prec), prec);
        }
        out.push(acc);
    }
    out
}

/// First `n` coefficients of the reciprocal series `1 / b`.
///
/// A short head comes from the direct recurrence; the rest is filled in
/// by Newton doubling, each step extending a length-`m` reciprocal to
/// length `min(2m, n)` with two truncated multiplications.
///
/// # Errors
/// `IndeterminateResult` for an empty divisor, `SingularDivisor` when the
/// constant term contains zero.
pub fn inv_series(b: &[ComplexBall], n: usize, prec: u32) -> BallResult<Vec<ComplexBall>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if b.is_empty() {
        return Err(BallError::IndeterminateResult);
    }
    if b[0].contains_zero() {
        return Err(BallError::SingularDivisor);
    }
    let blen = b.len().min(n);
    let mut q = Vec::with_capacity(n);
    q.push(ComplexBall::one().div(&b[0], prec)?);
    let head = n.min(BASECASE_CUTOFF);
    for i in 1..head {
        let mut acc = ComplexBall::zero();
        for j in 1..=i.min(blen - 1) {
            acc = acc.add(&b[j].mul(&q[i - j], prec), prec);
        }
        let qi = acc.neg().mul(&q[0], prec);
        q.push(qi);
    }
    let mut m = q.len();
    while m < n {
        let n2 = (2 * m).min(n);
        // residue of b * q past x^m
        let t = mullow(&b[..b.len().min(n2)], &q, n2, prec);
        let u = mullow(&q, &t[m..n2], n2 - m, prec);
        for c in u {
            q.push(c.neg());
        }
        m = n2;
    }
    Ok(q)
}

/// First `n` coefficients of the quotient series `a / b`.
///
/// # Arguments
/// * `a` - numerator coefficients, lowest order first
/// * `b` - denominator coefficients, lowest order first
/// * `n` - truncation length of the result
/// * `prec` - working precision in bits
///
/// # Errors
/// `IndeterminateResult` when the denominator is the empty (zero) series,
/// `SingularDivisor` when its constant term contains zero.
pub fn div_series(
    a: &[ComplexBall],
    b: &[ComplexBall],
    n: usize,
    prec: u32,
) -> BallResult<Vec<ComplexBall>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if b.is_empty() {
        return Err(BallError::IndeterminateResult);
    }
    if a.is_empty() {
        return Ok(vec![ComplexBall::zero(); n]);
    }
    if b[0].contains_zero() {
        return Err(BallError::SingularDivisor);
    }
    let alen = a.len().min(n);
    let blen = b.len().min(n);

    if blen == 1 {
        let mut q = Vec::with_capacity(n);
        for ai in &a[..alen] {
            q.push(ai.div(&b[0], prec)?);
        }
        q.resize(n, ComplexBall::zero());
        return Ok(q);
    }

    if n == 2 {
        let q0 = a[0].div(&b[0], prec)?;
        let q1 = if alen == 1 {
            q0.mul(&b[1], prec).div(&b[0], prec)?.neg()
        } else {
            a[1].sub(&q0.mul(&b[1], prec), prec).div(&b[0], prec)?
        };
        return Ok(vec![q0, q1]);
    }

    if blen == 2 || n <= BASECASE_CUTOFF {
        let binv = ComplexBall::one().div(&b[0], prec)?;
        let scale = !binv.is_one();
        let mut q = Vec::with_capacity(n);
        q.push(a[0].div(&b[0], prec)?);
        for i in 1..n {
            let mut acc = b[1].mul(&q[i - 1], prec);
            for j in 2..=i.min(blen - 1) {
                acc = acc.add(&b[j].mul(&q[i - j], prec), prec);
            }
            let t = if i < alen {
                a[i].sub(&acc, prec)
            } else {
                acc.neg()
            };
            q.push(if scale { t.mul(&binv, prec) } else { t });
        }
        return Ok(q);
    }

    let binv = inv_series(b, n, prec)?;
    Ok(mullow(&binv, &a[..alen], n, prec))
}
