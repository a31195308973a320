//! Elementary functions on real balls with rigorous tail bounds.
//!
//! Each evaluator reduces its argument into a small interval, sums a
//! truncated Taylor series there, and widens the result radius by an
//! explicit bound on the discarded tail. Constants pi and ln 2 are computed
//! once per precision level and cached.

use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::bigfloat::{BigFloat, Round};
use crate::realball::{BallError, BallResult, RealBall};

/// Hard iteration cap for the series loops. The tail bounds below stay
/// valid at whatever term the loop stops on, so hitting the cap only
/// costs accuracy, never correctness.
const MAXIT: usize = 10_000;

static PI_CACHE: Lazy<Mutex<Option<(u32, RealBall)>>> = Lazy::new(|| Mutex::new(None));
static LN2_CACHE: Lazy<Mutex<Option<(u32, RealBall)>>> = Lazy::new(|| Mutex::new(None));

/// Taylor sum of `exp(t)` for `|t| <= 1/2`.
fn exp_taylor(t: &RealBall, wp: u32) -> RealBall {
    let tol = BigFloat::pow2(-(wp as i64) - 3);
    let mut sum = RealBall::one();
    let mut term = RealBall::one();
    for j in 1..=MAXIT {
        term = term.mul(t, wp).div_i64(j as i64, wp);
        sum = sum.add(&term, wp);
        let u = term.mag_upper();
        if u <= tol || j == MAXIT {
            // remaining terms shrink at least geometrically by 1/2
            sum.add_error(&u);
            break;
        }
    }
    sum
}

/// Taylor sum of `atanh(t)` for `|t| <= 1/2`.
fn atanh_series(t: &RealBall, wp: u32) -> RealBall {
    let tol = BigFloat::pow2(-(wp as i64) - 3);
    let tsq = t.mul(t, wp);
    let mut p = t.clone();
    let mut sum = RealBall::zero();
    let mut j: i64 = 0;
    loop {
        sum = sum.add(&p.div_i64(2 * j + 1, wp), wp);
        p = p.mul(&tsq, wp);
        j += 1;
        let u = p.mag_upper();
        if u <= tol || j as usize >= MAXIT {
            // tail <= |t|^(2j+1) / (1 - t^2) <= 2 |t|^(2j+1)
            sum.add_error(&u.mul_2exp(1));
            break;
        }
    }
    sum
}

/// Alternating Taylor sum of `atan(t)` for `|t| <= 1/2`.
fn atan_taylor(t: &RealBall, wp: u32) -> RealBall {
    let tol = BigFloat::pow2(-(wp as i64) - 3);
    let tsq = t.mul(t, wp);
    let mut p = t.clone();
    let mut sum = RealBall::zero();
    let mut j: i64 = 0;
    loop {
        let term = p.div_i64(2 * j + 1, wp);
        sum = if j % 2 == 0 {
            sum.add(&term, wp)
        } else {
            sum.sub(&term, wp)
        };
        p = p.mul(&tsq, wp);
        j += 1;
        let u = p.mag_upper();
        if u <= tol || j as usize >= MAXIT {
            // alternating with decreasing terms: tail below first omitted term
            sum.add_error(&u);
            break;
        }
    }
    sum
}

/// Alternating Taylor sums of `sin(t)` and `cos(t)` for `|t| <= 1/4`.
fn sin_cos_taylor(t: &RealBall, wp: u32) -> (RealBall, RealBall) {
    let tol = BigFloat::pow2(-(wp as i64) - 3);
    let tsq = t.mul(t, wp);

    let mut s = t.clone();
    let mut term = t.clone();
    let mut j: i64 = 0;
    loop {
        term = term.mul(&tsq, wp).div_i64((2 * j + 2) * (2 * j + 3), wp);
        j += 1;
        s = if j % 2 == 1 {
            s.sub(&term, wp)
        } else {
            s.add(&term, wp)
        };
        let u = term.mag_upper();
        if u <= tol || j as usize >= MAXIT {
            s.add_error(&u);
            break;
        }
    }

    let mut c = RealBall::one();
    let mut term = RealBall::one();
    let mut j: i64 = 0;
    loop {
        term = term.mul(&tsq, wp).div_i64((2 * j + 1) * (2 * j + 2), wp);
        j += 1;
        c = if j % 2 == 1 {
            c.sub(&term, wp)
        } else {
            c.add(&term, wp)
        };
        let u = term.mag_upper();
        if u <= tol || j as usize >= MAXIT {
            c.add_error(&u);
            break;
        }
    }

    (s, c)
}

/// Enclosure of pi by the Machin formula 16 atan(1/5) - 4 atan(1/239).
pub fn const_pi(prec: u32) -> RealBall {
    {
        let guard = PI_CACHE.lock().unwrap();
        if let Some((p, v)) = guard.as_ref() {
            if *p >= prec {
                return v.round(prec);
            }
        }
    }
    let wp = prec + 32;
    let a5 = atan_taylor(&RealBall::from_rational(1, 5, wp), wp);
    let a239 = atan_taylor(&RealBall::from_rational(1, 239, wp), wp);
    let v = a5.mul_2exp(4).sub(&a239.mul_2exp(2), wp);
    let mut guard = PI_CACHE.lock().unwrap();
    *guard = Some((wp, v.clone()));
    v.round(prec)
}

/// Enclosure of ln 2 as `2 atanh(1/3)`.
pub fn const_ln2(prec: u32) -> RealBall {
    {
        let guard = LN2_CACHE.lock().unwrap();
        if let Some((p, v)) = guard.as_ref() {
            if *p >= prec {
                return v.round(prec);
            }
        }
    }
    let wp = prec + 32;
    let v = atanh_series(&RealBall::from_rational(1, 3, wp), wp).mul_2exp(1);
    let mut guard = LN2_CACHE.lock().unwrap();
    *guard = Some((wp, v.clone()));
    v.round(prec)
}

/// Enclosure of `exp(x)` over the ball `x`.
///
/// The argument is scaled by `2^-k` into `[-1/4, 1/4]`, the series is
/// summed there, and the result is squared back up `k` times.
pub fn exp_ball(x: &RealBall, prec: u32) -> RealBall {
    if x.is_zero() {
        return RealBall::one();
    }
    let m = x.mag_upper();
    let k = (m.mag_2exp() + 2).max(0);
    let wp = prec + (2 * k).min(1 << 20) as u32 + 16;
    let t = x.mul_2exp(-k);
    let mut e = exp_taylor(&t, wp);
    for _ in 0..k {
        e = e.mul(&e, wp);
    }
    e.round(prec)
}

/// Enclosure of `log(v)` for an exact positive dyadic point.
fn log_point(v: &BigFloat, wp: u32) -> RealBall {
    // v = u * 2^g with u in [1, 2): log v = 2 atanh((u-1)/(u+1)) + g ln 2
    let g = v.mag_2exp() - 1;
    let u = v.mul_2exp(-g);
    let one = BigFloat::one();
    let (q, err) = u.sub(&one).div_round(&u.add(&one), wp, Round::Nearest);
    let t = RealBall::with_radius(q, err);
    let mut r = atanh_series(&t, wp).mul_2exp(1);
    if g != 0 {
        r = r.add(&const_ln2(wp).mul(&RealBall::from_i64(g), wp), wp);
    }
    r
}

/// Enclosure of `log(x)` over the ball `x`.
///
/// # Errors
/// `OutOfDomain` unless `x` lies strictly above zero.
pub fn log_ball(x: &RealBall, prec: u32) -> BallResult<RealBall> {
    if !x.is_positive() {
        return Err(BallError::OutOfDomain("log of a ball not strictly positive"));
    }
    let wp = prec + 12;
    if x.is_exact() {
        return Ok(log_point(x.mid(), wp).round(prec));
    }
    // log is increasing: hull of the endpoint images encloses the image
    let lo = log_point(&x.lower(), wp);
    let hi = log_point(&x.upper(), wp);
    Ok(lo.hull(&hi, prec))
}

/// Enclosure of the principal power `exp(y * log(x))`.
///
/// An exact zero exponent yields one for any base; otherwise the base
/// must lie strictly above zero.
///
/// # Errors
/// `OutOfDomain` when `log` rejects the base.
pub fn pow_ball(x: &RealBall, y: &RealBall, prec: u32) -> BallResult<RealBall> {
    if y.is_zero() {
        return Ok(RealBall::one());
    }
    let wp = prec + 12;
    let t = log_ball(x, wp)?.mul(y, wp);
    Ok(exp_ball(&t, wp).round(prec))
}

/// Enclosure of `atan(m)` for an exact dyadic point.
fn atan_point(m: &BigFloat, wp: u32) -> RealBall {
    if m.is_zero() {
        return RealBall::zero();
    }
    let a = m.abs();
    let one = BigFloat::one();
    let (mut t, flip) = if a > one {
        // atan(a) = pi/2 - atan(1/a)
        let (q, err) = one.div_round(&a, wp, Round::Nearest);
        (RealBall::with_radius(q, err), true)
    } else {
        (RealBall::from_bigfloat(a), false)
    };
    // halve with atan(t) = 2 atan(t / (1 + sqrt(1 + t^2))) until |t| <= 1/8
    let mut h = 0u32;
    let eighth = BigFloat::pow2(-3);
    while t.mag_upper() > eighth {
        let s = t.mul(&t, wp).add_i64(1, wp).sqrt_nonneg(wp);
        t = t.div_pos(&s.add_i64(1, wp), wp);
        h += 1;
    }
    let mut r = atan_taylor(&t, wp).mul_2exp(h as i64);
    if flip {
        r = const_pi(wp).mul_2exp(-1).sub(&r, wp);
    }
    if m.is_negative() {
        r.neg()
    } else {
        r
    }
}

/// Enclosure of `atan(x)` over the ball `x`.
pub fn atan_ball(x: &RealBall, prec: u32) -> RealBall {
    let wp = prec + 16;
    let mut r = atan_point(x.mid(), wp);
    // the derivative of atan is bounded by 1
    r.add_error(x.rad());
    r.round(prec)
}

/// Enclosure of the angle of the point `(x, y)` in `(-pi, pi]`.
///
/// # Errors
/// `OutOfDomain` when the rectangle `x + iy` meets the origin or straddles
/// the branch cut along the negative real axis.
pub fn atan2_ball(y: &RealBall, x: &RealBall, prec: u32) -> BallResult<RealBall> {
    let wp = prec + 16;
    if x.is_positive() {
        let q = y.div(x, wp)?;
        return Ok(atan_ball(&q, wp).round(prec));
    }
    if x.is_negative() {
        if y.is_zero() {
            return Ok(const_pi(prec + 8).round(prec));
        }
        let q = y.div(x, wp)?;
        let at = atan_ball(&q, wp);
        let pi = const_pi(wp);
        let r = if y.is_positive() {
            at.add(&pi, wp)
        } else if y.is_negative() {
            at.sub(&pi, wp)
        } else {
            return Err(BallError::OutOfDomain(
                "argument straddles the negative real axis",
            ));
        };
        return Ok(r.round(prec));
    }
    // x contains zero: resolve through the sign of y
    if y.is_positive() {
        let q = x.div(y, wp)?;
        let r = const_pi(wp).mul_2exp(-1).sub(&atan_ball(&q, wp), wp);
        return Ok(r.round(prec));
    }
    if y.is_negative() {
        let q = x.div(y, wp)?;
        let r = const_pi(wp).mul_2exp(-1).neg().sub(&atan_ball(&q, wp), wp);
        return Ok(r.round(prec));
    }
    Err(BallError::OutOfDomain("argument of a ball containing zero"))
}

/// Enclosures of `sin(m)` and `cos(m)` for an exact dyadic point.
fn sin_cos_point(m: &BigFloat, wp: u32) -> (RealBall, RealBall) {
    if m.is_zero() {
        return (RealBall::zero(), RealBall::one());
    }
    let mut t = RealBall::from_bigfloat(m.clone());
    if m.mag_2exp() >= 3 {
        // subtract the nearest multiple of 2 pi
        let wred = wp + m.mag_2exp().max(1) as u32 + 8;
        let qprec = m.mag_2exp().max(1) as u32 + 8;
        let twopi = const_pi(wred).mul_2exp(1);
        let (q0, _) = m.div_round(twopi.mid(), qprec, Round::Nearest);
        let k = BigFloat::from_bigint(q0.to_nearest_bigint());
        t = t.sub(&twopi.mul(&RealBall::from_bigfloat(k), wred), wred);
    }
    // halve to |t| <= 1/4
    let h = (t.mag_upper().mag_2exp() + 2).max(0);
    let t = t.mul_2exp(-h);
    let wp2 = wp + 2 * h as u32 + 8;
    let (mut s, mut c) = sin_cos_taylor(&t, wp2);
    for _ in 0..h {
        // sin 2t = 2 sin t cos t ; cos 2t = 1 - 2 sin^2 t
        let s2 = s.mul(&c, wp2).mul_2exp(1);
        let c2 = RealBall::one().sub(&s.mul(&s, wp2).mul_2exp(1), wp2);
        s = s2;
        c = c2;
    }
    (s, c)
}

/// Enclosures of `sin(x)` and `cos(x)` over the ball `x`.
pub fn sin_cos_ball(x: &RealBall, prec: u32) -> (RealBall, RealBall) {
    let wp = prec + 16;
    let (mut s, mut c) = sin_cos_point(x.mid(), wp);
    // both derivatives are bounded by 1
    s.add_error(x.rad());
    c.add_error(x.rad());
    (s.round(prec), c.round(prec))
}
