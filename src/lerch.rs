//! Lerch transcendent `Phi(z, s, a) = sum_k z^k (k+a)^{-s}`.
//!
//! Evaluation dispatches on exact special arguments first: `z = 0` and
//! `z = 1` reduce to a single power and to Hurwitz zeta, `s = 0` to a
//! geometric closed form, and exact negative integer `s` to a generalized
//! Bernoulli polynomial. Everything else must sit inside `|z| < 0.7`,
//! where the defining series is summed with guard precision and a
//! rigorously bounded geometric tail.

use rayon::prelude::*;

use crate::bernoulli::generalized_bernoulli;
use crate::bigfloat::{BigFloat, Round};
use crate::complexball::ComplexBall;
use crate::elementary::exp_ball;
use crate::hurwitz::hurwitz_zeta;
use crate::realball::{BallError, BallResult, RealBall};

/// Doubling attempts for the series truncation point.
const MAX_ATTEMPTS: u32 = 4;

/// Enclosure of the Lerch transcendent `Phi(z, s, a)`.
///
/// # Arguments
/// * `z` - series argument; the direct sum needs `|z| < 0.7` rigorously
/// * `s` - exponent applied to the shifted index
/// * `a` - shift of the summation index
/// * `prec` - target precision in bits
///
/// # Errors
/// `UnsupportedRegion` when `|z|` cannot be placed below the series
/// threshold and no special form applies; otherwise whatever the
/// underlying power, division or zeta evaluation reports.
pub fn lerch_phi(
    z: &ComplexBall,
    s: &ComplexBall,
    a: &ComplexBall,
    prec: u32,
) -> BallResult<ComplexBall> {
    if z.is_zero() {
        return a.pow(&s.neg(), prec);
    }
    if z.is_one() {
        return hurwitz_zeta(s, a, prec);
    }
    if s.is_zero() {
        // geometric series: 1 / (1 - z)
        return ComplexBall::one().sub(z, prec + 8).inv(prec);
    }
    if let Some(k) = s.as_exact_i64() {
        if k < 0 {
            // Phi(z, -k, a) = -B_{k+1}(a, z) / (k+1)
            let n = (-k) as u64 + 1;
            let wp = prec + 2 * n as u32 + 16;
            let b = generalized_bernoulli(n, a, z, wp)?;
            return Ok(b.div_i64(n as i64, wp).neg().round(prec));
        }
    }
    let z2_up = z.normsq(60).mag_upper();
    // rigorous threshold |z|^2 < 0.49, compared exactly as 100 |z|^2 < 49
    if z2_up.mul(&BigFloat::from_i64(100)) >= BigFloat::from_i64(49) {
        return Err(BallError::UnsupportedRegion);
    }
    direct_sum(z, s, a, &z2_up, prec)
}

/// Batch evaluation over a rayon worker pool.
pub fn lerch_phi_parallel(
    args: &[(ComplexBall, ComplexBall, ComplexBall)],
    prec: u32,
) -> Vec<BallResult<ComplexBall>> {
    args.par_iter()
        .map(|(z, s, a)| lerch_phi(z, s, a, prec))
        .collect()
}

/// Direct summation inside `|z| < 0.7` with doubling truncation retries.
fn direct_sum(
    z: &ComplexBall,
    s: &ComplexBall,
    a: &ComplexBall,
    z2_up: &BigFloat,
    prec: u32,
) -> BallResult<ComplexBall> {
    // guard digits against the geometric decay rate log2(1/|z|)
    let z2 = z2_up.to_f64().max(1e-300);
    let lg = -0.5 * z2.log2();
    let g = ((prec as f64) / lg).ceil().max(0.0) as u32;
    let wp = prec + g + 16;

    let sigma = s.re().to_f64();
    let tau = s.im().to_f64().abs();
    let rea = a.re().to_f64();
    let lnz = 0.5 * z2.ln();
    // past n_mono the term magnitudes decay; n_tail brings them under target
    let n_mono = (sigma / lnz - rea).max(-rea).max(0.0);
    let n_tail = ((prec as f64) + 16.0) / lg + 0.5 * tau;
    let mut n = (n_mono + n_tail).ceil() as u64 + 8;

    let mut attempt = 0u32;
    loop {
        match tail_bound(z, s, a, n, z2_up)? {
            Some(tail) => {
                let tol = BigFloat::pow2(-(prec as i64) - 2);
                if tail <= tol || attempt + 1 >= MAX_ATTEMPTS {
                    return sum_terms(z, s, a, n, wp, prec, &tail);
                }
            }
            None => {
                if attempt + 1 >= MAX_ATTEMPTS {
                    return Err(BallError::UnsupportedRegion);
                }
            }
        }
        n *= 2;
        attempt += 1;
    }
}

/// Rigorous bound on `sum_{k > n} |z^k (k+a)^{-s}|`, or `None` when the
/// term-ratio bound fails to come out below 0.99 at this `n`.
fn tail_bound(
    z: &ComplexBall,
    s: &ComplexBall,
    a: &ComplexBall,
    n: u64,
    z2_up: &BigFloat,
) -> BallResult<Option<BigFloat>> {
    let wb = 48;
    // l lower-bounds Re(a) + k for every k >= n+1
    let l = a.re().lower().add(&BigFloat::from_i64(n as i64 + 1));
    if !l.is_positive() {
        return Ok(None);
    }
    // |t_{k+1}/t_k| <= |z| exp((max(-Re s, 0) + |Im s| |Im a|) / l)
    let sneg = {
        let t = s.re().neg().upper();
        if t.is_negative() {
            BigFloat::zero()
        } else {
            t
        }
    };
    let growth_arg = sneg.add(&s.im().mag_upper().mul(&a.im().mag_upper()));
    let (linv, linv_err) = BigFloat::one().div_round(&l, wb, Round::Up);
    let earg = RealBall::from_bigfloat(growth_arg.mul(&linv.add(&linv_err)));
    let growth = exp_ball(&earg, wb).upper();
    let z_up = z2_up.sqrt_bounds(wb).1;
    let rho = z_up.mul(&growth);
    if rho.mul(&BigFloat::from_i64(100)) > BigFloat::from_i64(99) {
        return Ok(None);
    }
    // first omitted term bound, then the geometric closure 1/(1 - rho)
    let w = a.add_i64(n as i64 + 1, wb);
    let pw = w.pow(&s.neg(), wb)?;
    let first = pw
        .abs(wb)
        .mag_upper()
        .mul(&RealBall::from_bigfloat(z_up).pow_u64(n + 1, wb).mag_upper());
    let denom = BigFloat::one().sub(&rho);
    let (q, e) = first.div_round(&denom, wb, Round::Up);
    Ok(Some(q.add(&e)))
}

/// Sum of the terms `k = 0 ..= n` at working precision, with the tail
/// bound folded into both component radii.
fn sum_terms(
    z: &ComplexBall,
    s: &ComplexBall,
    a: &ComplexBall,
    n: u64,
    wp: u32,
    prec: u32,
    tail: &BigFloat,
) -> BallResult<ComplexBall> {
    let minus_s = s.neg();
    let mut acc = a.pow(&minus_s, wp)?;
    if n >= 1 {
        let t1 = a.add_i64(1, wp).pow(&minus_s, wp)?.mul(z, wp);
        acc = acc.add(&t1, wp);
    }
    let mut zp = z.round(wp);
    for k in 2..=n {
        zp = zp.mul(z, wp);
        let term = a.add_i64(k as i64, wp).pow(&minus_s, wp)?.mul(&zp, wp);
        acc = acc.add(&term, wp);
    }
    acc.add_error(tail);
    Ok(acc.round(prec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elementary::{const_ln2, const_pi};
    use approx::assert_abs_diff_eq;

    fn cb(re: f64, im: f64) -> ComplexBall {
        ComplexBall::from_f64s(re, im)
    }

    #[test]
    fn test_zero_argument_is_a_power() {
        // Phi(0, 2, 3) = 3^{-2} = 1/9
        let r = lerch_phi(&ComplexBall::zero(), &cb(2.0, 0.0), &cb(3.0, 0.0), 90).unwrap();
        assert!(r.re().overlaps(&RealBall::from_rational(1, 9, 100)));
        assert!(r.im().contains(&BigFloat::zero()));
    }

    #[test]
    fn test_unit_argument_is_hurwitz() {
        // Phi(1, 2, 1) = zeta(2) = pi^2/6
        let r = lerch_phi(&ComplexBall::one(), &cb(2.0, 0.0), &cb(1.0, 0.0), 100).unwrap();
        let pi = const_pi(110);
        assert!(r.re().overlaps(&pi.mul(&pi, 110).div_i64(6, 110)));
    }

    #[test]
    fn test_zero_exponent_is_geometric() {
        // Phi(1/2, 0, a) = 1/(1 - 1/2) = 2 for any a
        let r = lerch_phi(&cb(0.5, 0.0), &ComplexBall::zero(), &cb(9.5, 3.0), 80).unwrap();
        assert!(r.re().contains(&BigFloat::from_i64(2)));
        assert!(r.im().contains(&BigFloat::zero()));
    }

    #[test]
    fn test_negative_integer_exponents() {
        let half = cb(0.5, 0.0);
        let one = cb(1.0, 0.0);
        // Phi(1/2, -1, 1) = sum (k+1)/2^k = 4
        let r = lerch_phi(&half, &cb(-1.0, 0.0), &one, 90).unwrap();
        assert!(r.re().contains(&BigFloat::from_i64(4)), "got {}", r);
        assert!(r.im().contains(&BigFloat::zero()));
        // Phi(1/2, -2, 1) = sum (k+1)^2/2^k = 12
        let r = lerch_phi(&half, &cb(-2.0, 0.0), &one, 90).unwrap();
        assert!(r.re().contains(&BigFloat::from_i64(12)), "got {}", r);
        // Phi(1/3, -1, 2) = (2 - 1/3)/(1 - 1/3)^2 = 15/4
        let third = ComplexBall::from_i64(1).div_i64(3, 120);
        let r = lerch_phi(&third, &cb(-1.0, 0.0), &cb(2.0, 0.0), 90).unwrap();
        assert!(r.re().contains(&BigFloat::from_f64(3.75)), "got {}", r);
    }

    #[test]
    fn test_series_against_dilogarithm() {
        // Phi(1/2, 2, 1) = 2 Li_2(1/2) = pi^2/6 - (ln 2)^2
        let r = lerch_phi(&cb(0.5, 0.0), &cb(2.0, 0.0), &cb(1.0, 0.0), 100).unwrap();
        let pi = const_pi(120);
        let l2 = const_ln2(120);
        let want = pi
            .mul(&pi, 120)
            .div_i64(6, 120)
            .sub(&l2.mul(&l2, 120), 120);
        assert!(r.re().overlaps(&want), "got {} want {}", r.re(), want);
        assert!(r.im().contains(&BigFloat::zero()));
    }

    #[test]
    fn test_series_against_logarithm() {
        // Phi(1/2, 1, 1) = -ln(1 - 1/2)/(1/2) = 2 ln 2
        let r = lerch_phi(&cb(0.5, 0.0), &cb(1.0, 0.0), &cb(1.0, 0.0), 100).unwrap();
        assert!(r.re().overlaps(&const_ln2(110).mul_2exp(1)));
    }

    #[test]
    fn test_series_against_partial_sum() {
        // partial f64 sum is accurate to ~1e-15 at |z| = 0.3
        let mut want = 0.0f64;
        for k in 0..80 {
            want += 0.3f64.powi(k) * (k as f64 + 1.25).powf(-2.5);
        }
        let r = lerch_phi(&cb(0.3, 0.0), &cb(2.5, 0.0), &cb(1.25, 0.0), 90).unwrap();
        assert_abs_diff_eq!(r.re().to_f64(), want, epsilon = 1e-12);
    }

    #[test]
    fn test_complex_arguments() {
        // conjugate symmetry for real a: Phi(conj z, conj s, a) = conj Phi(z, s, a)
        let z = cb(0.25, 0.3);
        let s = cb(1.5, -0.75);
        let a = cb(1.0, 0.0);
        let r = lerch_phi(&z, &s, &a, 80).unwrap();
        let rc = lerch_phi(&z.conj(), &s.conj(), &a, 80).unwrap();
        assert!(r.re().overlaps(rc.re()));
        assert!(r.im().overlaps(&rc.im().neg()));
    }

    #[test]
    fn test_outside_region_rejected() {
        let r = lerch_phi(&cb(0.9, 0.0), &cb(2.0, 0.0), &cb(1.0, 0.0), 60);
        assert_eq!(r, Err(BallError::UnsupportedRegion));
        // a wide ball pushes |z| past the threshold even with a small center
        let mut wide = cb(0.65, 0.0);
        wide.add_error(&BigFloat::from_f64(0.1));
        assert_eq!(
            lerch_phi(&wide, &cb(2.0, 0.0), &cb(1.0, 0.0), 60),
            Err(BallError::UnsupportedRegion)
        );
    }

    #[test]
    fn test_parallel_matches_serial() {
        let args = vec![
            (cb(0.5, 0.0), cb(2.0, 0.0), cb(1.0, 0.0)),
            (ComplexBall::zero(), cb(2.0, 0.0), cb(3.0, 0.0)),
            (cb(0.9, 0.0), cb(2.0, 0.0), cb(1.0, 0.0)),
            (cb(0.25, 0.25), cb(1.0, 1.0), cb(2.0, 0.0)),
        ];
        let batch = lerch_phi_parallel(&args, 70);
        assert_eq!(batch.len(), args.len());
        for (res, (z, s, a)) in batch.iter().zip(&args) {
            match (res, lerch_phi(z, s, a, 70)) {
                (Ok(b), Ok(serial)) => {
                    assert!(b.re().overlaps(serial.re()));
                    assert!(b.im().overlaps(serial.im()));
                }
                (Err(e), Err(want)) => assert_eq!(*e, want),
                (got, want) => panic!("mismatch: {:?} vs {:?}", got, want),
            }
        }
    }
}
