//! Hurwitz zeta function by Euler-Maclaurin summation.
//!
//! The evaluator splits `zeta(s, a)` into a finite power sum, two boundary
//! terms, a block of Bernoulli corrections, and a remainder that is bounded
//! rigorously and added to the output radius. Truncation parameters start
//! from a cheap estimate and double until the remainder bound clears the
//! requested accuracy.

use num_rational::BigRational;

use crate::bernoulli::bernoulli_number;
use crate::bigfloat::{BigFloat, Round};
use crate::complexball::ComplexBall;
use crate::elementary::{const_pi, exp_ball, log_ball};
use crate::primitives::factorial_exact;
use crate::realball::{BallError, BallResult, RealBall};

/// Doubling attempts for the truncation parameters.
const MAX_ATTEMPTS: u32 = 5;

/// `B_k / k!` as an exact rational.
fn bernoulli_factor(k: u64) -> BigRational {
    bernoulli_number(k as usize) / BigRational::from_integer(factorial_exact(k))
}

/// Upper-rounded quotient of nonnegative bounds.
fn bf_div_up(a: &BigFloat, b: &BigFloat) -> BigFloat {
    let (q, e) = a.div_round(b, 48, Round::Up);
    q.add(&e)
}

/// Enclosure of the Hurwitz zeta function `zeta(s, a)`.
///
/// # Arguments
/// * `s` - exponent ball; the pole at `s = 1` is rejected
/// * `a` - shift ball; terms `a + k` must stay clear of the branch cut
///   of the power function for the sum to be evaluable
/// * `prec` - target precision in bits
///
/// # Errors
/// `DivisionByZero` when `s` contains 1, `OutOfDomain` when a term
/// `(a + k)^{-s}` hits the origin or cannot take a principal power, and
/// `UnsupportedRegion` when no parameter choice validates the remainder.
pub fn hurwitz_zeta(s: &ComplexBall, a: &ComplexBall, prec: u32) -> BallResult<ComplexBall> {
    let wp = prec + 24;
    let sigma = s.re().to_f64();
    let tau = s.im().to_f64().abs();
    let rea = a.re().to_f64();
    let base = (prec as f64) * 0.35 + 12.0 + tau * 0.25;
    let mut attempt = 0u32;
    loop {
        let scale = (1u64 << attempt) as f64;
        let nm = (base * scale).ceil();
        let m = nm.max((3.0 - sigma) / 2.0).max(1.0).ceil() as u64;
        let n = nm.max(2.5 - rea).max(1.0).ceil() as u64;
        match euler_maclaurin(s, a, n, m, wp)? {
            Some((v, rem)) => {
                let mag = v
                    .re()
                    .mag_upper()
                    .max(v.im().mag_upper())
                    .max(BigFloat::one());
                let tol = BigFloat::pow2(-(prec as i64) - 2).mul(&mag);
                if rem <= tol || attempt + 1 >= MAX_ATTEMPTS {
                    let mut out = v;
                    out.add_error(&rem);
                    return Ok(out.round(prec));
                }
            }
            None => {
                if attempt + 1 >= MAX_ATTEMPTS {
                    return Err(BallError::UnsupportedRegion);
                }
            }
        }
        attempt += 1;
    }
}

/// One Euler-Maclaurin evaluation at fixed truncation parameters.
///
/// Returns `None` when the parameters fail the validity conditions
/// `Re(s) + 2M - 1 > 0` and `Re(a) + N > 0`, so the caller can enlarge
/// them and try again.
fn euler_maclaurin(
    s: &ComplexBall,
    a: &ComplexBall,
    n: u64,
    m: u64,
    wp: u32,
) -> BallResult<Option<(ComplexBall, BigFloat)>> {
    let sig2m = s.re().add_i64(2 * m as i64 - 1, wp);
    let an_re = a.re().add_i64(n as i64, wp);
    if !sig2m.is_positive() || !an_re.is_positive() {
        return Ok(None);
    }
    let minus_s = s.neg();

    // power sum over k < N
    let mut total = ComplexBall::zero();
    for k in 0..n {
        let t = a.add_i64(k as i64, wp).pow(&minus_s, wp)?;
        total = total.add(&t, wp);
    }

    // boundary terms (a+N)^{1-s}/(s-1) and (a+N)^{-s}/2
    let an = a.add_i64(n as i64, wp);
    let one_minus_s = ComplexBall::one().sub(s, wp);
    let t1 = an.pow(&one_minus_s, wp)?.div(&s.sub_i64(1, wp), wp)?;
    total = total.add(&t1, wp);
    let pw0 = an.pow(&minus_s, wp)?;
    total = total.add(&pw0.mul_2exp(-1), wp);

    // corrections B_2j/(2j)! (s)_{2j-1} (a+N)^{-s-2j+1}
    let an2 = an.mul(&an, wp);
    let mut rising = s.round(wp);
    let mut pw = pw0.div(&an, wp)?;
    for j in 1..=m {
        let coeff = RealBall::from_big_rational(&bernoulli_factor(2 * j), wp);
        total = total.add(&rising.mul(&pw, wp).mul_real(&coeff, wp), wp);
        if j < m {
            let step = s
                .add_i64(2 * j as i64 - 1, wp)
                .mul(&s.add_i64(2 * j as i64, wp), wp);
            rising = rising.mul(&step, wp);
            pw = pw.div(&an2, wp)?;
        }
    }

    // remainder: 4 |(s)_{2M}| / (2 pi)^{2M} * exp(pi |Im s| / 2)
    //            * (Re(a)+N)^{1 - Re(s) - 2M} / (Re(s) + 2M - 1)
    let rising_2m = rising.mul(&s.add_i64(2 * m as i64 - 1, wp), wp);
    let rnum = rising_2m.abs(48).mag_upper().mul_2exp(2);
    let p2m_low = const_pi(64).mul_2exp(1).pow_u64(2 * m, 64).lower();
    let ims = RealBall::from_bigfloat(s.im().mag_upper());
    let efac = exp_ball(&const_pi(64).mul(&ims, 64).mul_2exp(-1), 64).upper();
    let expo = RealBall::one().sub(s.re(), 64).sub_i64(2 * m as i64, 64);
    let powfac = exp_ball(&log_ball(&an_re, 64)?.mul(&expo, 64), 64).upper();
    let rem = bf_div_up(
        &bf_div_up(&rnum.mul(&efac).mul(&powfac), &p2m_low),
        &sig2m.lower(),
    );
    Ok(Some((total, rem)))
}
