use ballrs::bigfloat::BigFloat;
use ballrs::realball::{BallError, RealBall};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rstest::rstest;

fn random_ball(rng: &mut Pcg64) -> RealBall {
    let mid = BigFloat::from_f64(rng.gen_range(-4.0..4.0));
    let rad = BigFloat::from_f64(rng.gen_range(0.0..0.25));
    RealBall::with_radius(mid, rad)
}

fn random_positive_ball(rng: &mut Pcg64) -> RealBall {
    let mid = BigFloat::from_f64(rng.gen_range(0.5..4.0));
    let rad = BigFloat::from_f64(rng.gen_range(0.0..0.4));
    RealBall::with_radius(mid, rad)
}

/// Exact dyadic points spanning the ball, endpoints included.
fn sample_points(b: &RealBall) -> Vec<BigFloat> {
    let lo = b.lower();
    let width = b.upper().sub(&lo);
    (0..=16)
        .map(|j| lo.add(&width.mul(&BigFloat::from_i64(j)).mul_2exp(-4)))
        .collect()
}

#[rstest]
#[case(24)]
#[case(53)]
#[case(128)]
fn test_ring_ops_enclose_exact_images(#[case] prec: u32) {
    let mut rng = Pcg64::seed_from_u64(0xBA11);
    for _ in 0..25 {
        let x = random_ball(&mut rng);
        let y = random_ball(&mut rng);
        let sum = x.add(&y, prec);
        let dif = x.sub(&y, prec);
        let prod = x.mul(&y, prec);
        for p in sample_points(&x) {
            for q in sample_points(&y) {
                assert!(sum.contains(&p.add(&q)), "sum lost {} + {}", p.to_f64(), q.to_f64());
                assert!(dif.contains(&p.sub(&q)), "dif lost {} - {}", p.to_f64(), q.to_f64());
                assert!(prod.contains(&p.mul(&q)), "prod lost {} * {}", p.to_f64(), q.to_f64());
            }
        }
    }
}

#[rstest]
#[case(24)]
#[case(80)]
fn test_division_encloses_exact_quotients(#[case] prec: u32) {
    let mut rng = Pcg64::seed_from_u64(0xD1F);
    for _ in 0..25 {
        let x = random_ball(&mut rng);
        let y = random_positive_ball(&mut rng);
        let q = x.div(&y, prec).unwrap();
        let lo = q.lower();
        let hi = q.upper();
        for p in sample_points(&x) {
            for r in sample_points(&y) {
                // lo <= p/r <= hi checked by exact cross multiplication, r > 0
                assert!(lo.mul(&r) <= p, "quotient lower bound fails");
                assert!(p <= hi.mul(&r), "quotient upper bound fails");
            }
        }
    }
}

#[test]
fn test_sqrt_encloses_exact_roots() {
    let mut rng = Pcg64::seed_from_u64(0x50_07);
    for _ in 0..40 {
        let mid = BigFloat::from_f64(rng.gen_range(0.05..9.0));
        let rad = BigFloat::from_f64(rng.gen_range(0.0..0.04));
        let x = RealBall::with_radius(mid, rad);
        let s = x.sqrt(60).unwrap();
        let lo = s.lower();
        let hi = s.upper();
        for p in sample_points(&x) {
            // lo^2 <= p <= hi^2 pins sqrt(p) inside [lo, hi]
            assert!(lo.mul(&lo) <= p);
            assert!(p <= hi.mul(&hi));
        }
    }
}

#[rstest]
#[case(24)]
#[case(53)]
#[case(128)]
fn test_distributive_identity_encloses_zero(#[case] prec: u32) {
    // x (x + y) - x^2 - x y contains 0 for every pair of balls
    let mut rng = Pcg64::seed_from_u64(0xD157);
    for _ in 0..50 {
        let x = random_ball(&mut rng);
        let y = random_ball(&mut rng);
        let lhs = x.add(&y, prec).mul(&x, prec);
        let rhs = x.mul(&x, prec).add(&x.mul(&y, prec), prec);
        assert!(
            lhs.sub(&rhs, prec).contains_zero(),
            "identity violated for {} and {}",
            x,
            y
        );
    }
}

#[test]
fn test_pow_matches_repeated_multiplication() {
    let mut rng = Pcg64::seed_from_u64(0xE4_90);
    for _ in 0..20 {
        let x = random_ball(&mut rng);
        let direct = x.pow_u64(5, 80);
        let manual = x
            .mul(&x, 90)
            .mul(&x, 90)
            .mul(&x, 90)
            .mul(&x, 90);
        assert!(direct.overlaps(&manual));
    }
}

#[test]
fn test_zero_divisor_taxonomy() {
    let mut rng = Pcg64::seed_from_u64(0x2E20);
    let x = random_ball(&mut rng);
    let straddle = RealBall::with_radius(BigFloat::from_f64(0.01), BigFloat::from_f64(0.5));
    assert_eq!(x.div(&straddle, 53), Err(BallError::DivisionByZero));
    assert_eq!(x.div(&RealBall::zero(), 53), Err(BallError::DivisionByZero));
}

#[test]
fn test_rounding_never_drops_points() {
    let mut rng = Pcg64::seed_from_u64(0x20D);
    for _ in 0..30 {
        let x = random_ball(&mut rng);
        let coarse = x.round(12);
        for p in sample_points(&x) {
            assert!(coarse.contains(&p));
        }
    }
}

#[test]
fn test_exact_and_extreme_scale_inputs() {
    // exact dyadic inputs pass through the ring ops with zero radius
    let x = RealBall::from_f64(1.5);
    let y = RealBall::from_f64(-0.375);
    let p = x.mul(&y, 53);
    assert!(p.is_exact());
    assert!(p.contains(&BigFloat::from_f64(-0.5625)));
    // scales far outside f64 range still enclose their exact images
    let a = RealBall::with_radius(BigFloat::pow2(1000), BigFloat::pow2(970));
    let b = RealBall::with_radius(BigFloat::pow2(-1000), BigFloat::pow2(-1030));
    let prod = a.mul(&b, 64);
    for p in sample_points(&a) {
        for q in sample_points(&b) {
            assert!(prod.contains(&p.mul(&q)));
        }
    }
    let sum = a.add(&b, 64);
    assert!(sum.contains(&BigFloat::pow2(1000).add(&BigFloat::pow2(-1000))));
}

#[test]
fn test_precision_ladder_tightens() {
    let x = RealBall::from_rational(2, 3, 200);
    let y = RealBall::from_rational(7, 11, 200);
    let mut prev: Option<RealBall> = None;
    for prec in [24u32, 53, 128] {
        let q = x.div(&y, prec).unwrap();
        // (2/3) / (7/11) = 22/21
        assert!(q.lower().mul(&BigFloat::from_i64(21)) <= BigFloat::from_i64(22));
        assert!(BigFloat::from_i64(22) <= q.upper().mul(&BigFloat::from_i64(21)));
        if let Some(p) = prev {
            assert!(q.rad() < p.rad(), "radius did not shrink at {} bits", prec);
        }
        prev = Some(q);
    }
}
