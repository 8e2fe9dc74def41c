//! Closed-form real-root solvers for monic polynomials up to degree four.
//!
//! Coefficients are passed lowest power first, without the (implicit) unit
//! leading coefficient: `cubic(a, b, c)` solves `x^3 + c x^2 + b x + a = 0`.
//! Every solver returns the real roots only, in no particular order; an empty
//! result simply means the polynomial has no real roots.
//!
//! The solvers never see a zero leading coefficient. Callers holding a general
//! polynomial go through [`solve`], which strips vanishing leading terms and
//! picks the lowest applicable solver.

use std::f64::consts::PI;

/// Root of `x + a = 0`.
pub fn linear(a: f64) -> Vec<f64> {
    finite(vec![-a])
}

/// Real roots of `x^2 + b x + a = 0`.
///
/// Uses the cancellation-free form `q = -(b + sign(b) sqrt(disc)) / 2`, whose
/// roots are `q` and `a / q`.
pub fn quadratic(a: f64, b: f64) -> Vec<f64> {
    let disc = b * b - 4.0 * a;
    if disc < 0.0 {
        return Vec::new();
    }
    let q = -0.5 * (b + disc.sqrt().copysign(b));
    if q == 0.0 {
        // b == 0 and a == 0: double root at the origin
        return vec![0.0, 0.0];
    }
    finite(vec![q, a / q])
}

/// Real roots of `x^3 + c x^2 + b x + a = 0`.
pub fn cubic(a: f64, b: f64, c: f64) -> Vec<f64> {
    // x = y - c/3 gives y^3 + p y + q = 0
    let shift = c / 3.0;
    let p = b - c * shift;
    let q = a - b * shift + 2.0 * shift * shift * shift;

    depressed_cubic(p, q)
        .into_iter()
        .map(|y| y - shift)
        .collect()
}

/// Real roots of `y^3 + p y + q = 0`.
fn depressed_cubic(p: f64, q: f64) -> Vec<f64> {
    let half_q = q / 2.0;
    let third_p = p / 3.0;
    let disc = half_q * half_q + third_p * third_p * third_p;

    if disc < 0.0 {
        // Three real roots; p is necessarily negative here.
        let r = 2.0 * (-third_p).sqrt();
        let cos_arg = (3.0 * q / (2.0 * p) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0);
        let phi = cos_arg.acos() / 3.0;
        return finite(
            (0..3)
                .map(|k| r * (phi - 2.0 * PI * k as f64 / 3.0).cos())
                .collect(),
        );
    }

    if disc == 0.0 && p != 0.0 {
        // Simple root plus a double root.
        return finite(vec![3.0 * q / p, -3.0 * q / (2.0 * p)]);
    }

    let sqrt_disc = disc.sqrt();
    finite(vec![(-half_q + sqrt_disc).cbrt() + (-half_q - sqrt_disc).cbrt()])
}

/// Real roots of `x^4 + d x^3 + c x^2 + b x + a = 0`.
///
/// Ferrari's method: depress with `x = y - d/4`, pick a root `m` of the
/// resolvent cubic `m^3 + 2p m^2 + (p^2 - 4r) m - q^2 = 0`, and split the
/// depressed quartic into two real quadratics
/// `y^2 ± sqrt(m) y + (m + p)/2 ∓ q / (2 sqrt(m))`.
///
/// When several resolvent roots qualify, the first one (largest first) for
/// which both quadratic factors have non-negative discriminants is used,
/// otherwise the largest positive one. Any positive root yields the same real
/// roots in exact arithmetic; the preference only affects rounding.
///
/// The factorization loses precision for some coefficient mixes, so every
/// root is refined with a few Newton steps on the input quartic.
pub fn quartic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    let shift = d / 4.0;
    let shift2 = shift * shift;
    let p = c - 6.0 * shift2;
    let q = b - 2.0 * c * shift + 8.0 * shift2 * shift;
    let r = a - b * shift + c * shift2 - 3.0 * shift2 * shift2;

    let eval = |x: f64| (((x + d) * x + c) * x + b) * x + a;
    let slope = |x: f64| ((4.0 * x + 3.0 * d) * x + 2.0 * c) * x + b;

    depressed_quartic(p, q, r)
        .into_iter()
        .map(|y| polish(y - shift, eval, slope))
        .collect()
}

/// Newton refinement that only accepts steps reducing the residual.
fn polish(mut x: f64, eval: impl Fn(f64) -> f64, slope: impl Fn(f64) -> f64) -> f64 {
    for _ in 0..3 {
        let f = eval(x);
        let df = slope(x);
        if f == 0.0 || df == 0.0 {
            break;
        }
        let next = x - f / df;
        if eval(next).abs() < f.abs() {
            x = next;
        } else {
            break;
        }
    }
    x
}

/// Real roots of `y^4 + p y^2 + q y + r = 0`.
fn depressed_quartic(p: f64, q: f64, r: f64) -> Vec<f64> {
    if q == 0.0 {
        return biquadratic(p, r);
    }

    let mut candidates: Vec<f64> = cubic(-q * q, p * p - 4.0 * r, 2.0 * p)
        .into_iter()
        .filter(|&m| m > 0.0)
        .collect();
    candidates.sort_by(|x, y| y.total_cmp(x));

    let factors = |m: f64| {
        let sqrt_m = m.sqrt();
        let s = (m + p) / 2.0;
        let t = q / (2.0 * sqrt_m);
        ((s - t, sqrt_m), (s + t, -sqrt_m))
    };
    let both_real = |m: f64| {
        let ((a1, b1), (a2, b2)) = factors(m);
        b1 * b1 - 4.0 * a1 >= 0.0 && b2 * b2 - 4.0 * a2 >= 0.0
    };

    let chosen = candidates
        .iter()
        .copied()
        .find(|&m| both_real(m))
        .or_else(|| candidates.first().copied());

    match chosen {
        Some(m) => {
            let ((a1, b1), (a2, b2)) = factors(m);
            let mut roots = quadratic(a1, b1);
            roots.extend(quadratic(a2, b2));
            roots
        }
        // Rounding pushed every resolvent root to m <= 0, which only happens
        // when q is negligible; treat the quartic as biquadratic.
        None => biquadratic(p, r),
    }
}

/// Real roots of `y^4 + p y^2 + r = 0`.
fn biquadratic(p: f64, r: f64) -> Vec<f64> {
    quadratic(r, p)
        .into_iter()
        .filter(|&z| z >= 0.0)
        .flat_map(|z| {
            let y = z.sqrt();
            [y, -y]
        })
        .collect()
}

/// Real roots of `c[0] + c[1] x + ... + c[n] x^n = 0` for `n <= 4`.
///
/// Leading coefficients that are exactly zero are stripped before dispatch, so
/// a quartic whose top term vanishes is solved as a cubic and so on. A
/// polynomial that reduces to a constant has no roots.
///
/// # Panics
///
/// Panics if more than five coefficients are given.
pub fn solve(coefficients: &[f64]) -> Vec<f64> {
    assert!(coefficients.len() <= 5, "degree above four is not supported");

    let degree = match coefficients.iter().rposition(|&c| c != 0.0) {
        Some(degree) => degree,
        None => return Vec::new(),
    };
    let lead = coefficients[degree];
    let n: Vec<f64> = coefficients[..degree].iter().map(|c| c / lead).collect();

    match degree {
        0 => Vec::new(),
        1 => linear(n[0]),
        2 => quadratic(n[0], n[1]),
        3 => cubic(n[0], n[1], n[2]),
        _ => quartic(n[0], n[1], n[2], n[3]),
    }
}

fn finite(mut roots: Vec<f64>) -> Vec<f64> {
    roots.retain(|r| r.is_finite());
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sorted(mut roots: Vec<f64>) -> Vec<f64> {
        roots.sort_by(f64::total_cmp);
        roots
    }

    fn assert_roots(actual: Vec<f64>, expected: &[f64]) {
        let actual = sorted(actual);
        assert_eq!(actual.len(), expected.len(), "roots: {actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_linear() {
        assert_roots(linear(-2.5), &[2.5]);
    }

    #[test]
    fn test_quadratic_two_roots() {
        // (x - 3)(x - 7) = x^2 - 10x + 21
        assert_roots(quadratic(21.0, -10.0), &[3.0, 7.0]);
    }

    #[test]
    fn test_quadratic_no_real_roots() {
        assert!(quadratic(1.0, 0.0).is_empty());
    }

    #[test]
    fn test_quadratic_double_root_at_zero() {
        assert_roots(quadratic(0.0, 0.0), &[0.0, 0.0]);
    }

    #[test]
    fn test_quadratic_small_root_precision() {
        // x^2 - 1e8 x + 1 has a root near 1e-8 that naive formulas lose.
        let roots = sorted(quadratic(1.0, -1e8));
        assert_abs_diff_eq!(roots[0], 1e-8, epsilon = 1e-20);
    }

    #[test]
    fn test_cubic_three_real_roots() {
        // (x - 1)(x - 2)(x - 3)
        assert_roots(cubic(-6.0, 11.0, -6.0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_cubic_one_real_root() {
        assert_roots(cubic(-1.0, 0.0, 0.0), &[1.0]);
    }

    #[test]
    fn test_cubic_double_root() {
        // (x - 1)^2 (x + 2) = x^3 - 3x + 2
        assert_roots(cubic(2.0, -3.0, 0.0), &[-2.0, 1.0]);
    }

    #[test]
    fn test_cubic_triple_root() {
        // (x - 2)^3 = x^3 - 6x^2 + 12x - 8
        let roots = cubic(-8.0, 12.0, -6.0);
        assert!(!roots.is_empty());
        for root in roots {
            assert_abs_diff_eq!(root, 2.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_quartic_four_real_roots() {
        // (x - 1)(x - 2)(x - 3)(x - 4)
        assert_roots(quartic(24.0, -50.0, 35.0, -10.0), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_quartic_biquadratic() {
        // (x^2 - 1)(x^2 - 4)
        assert_roots(quartic(4.0, 0.0, -5.0, 0.0), &[-2.0, -1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_quartic_two_real_roots() {
        // (x^2 + 1)(x - 1)(x - 2)
        assert_roots(quartic(2.0, -3.0, 3.0, -3.0), &[1.0, 2.0]);
    }

    #[test]
    fn test_quartic_no_real_roots() {
        assert!(quartic(1.0, 0.0, 0.0, 0.0).is_empty());
        // (x^2 + 1)(x^2 + 2x + 5)
        assert!(quartic(5.0, 2.0, 6.0, 2.0).is_empty());
    }

    #[test]
    fn test_quartic_resolvent_choice_regression() {
        // (x + 1)(x - 0.5)(x - 2)(x - 6): the resolvent cubic has three
        // positive roots and the largest one is taken.
        let roots = quartic(-6.0, 10.0, 7.5, -7.5);
        assert_roots(roots, &[-1.0, 0.5, 2.0, 6.0]);
    }

    #[test]
    fn test_solve_strips_vanishing_leading_terms() {
        // 0 x^4 + 0 x^3 + x^2 - 10 x + 21
        assert_roots(solve(&[21.0, -10.0, 1.0, 0.0, 0.0]), &[3.0, 7.0]);
        assert_roots(solve(&[4.0, 2.0, 0.0]), &[-2.0]);
    }

    #[test]
    fn test_solve_normalizes_leading_coefficient() {
        // -x^2 + 10x - 21
        assert_roots(solve(&[-21.0, 10.0, -1.0]), &[3.0, 7.0]);
        // 2 (x - 1)(x - 2)(x - 3)(x - 4)
        assert_roots(
            solve(&[48.0, -100.0, 70.0, -20.0, 2.0]),
            &[1.0, 2.0, 3.0, 4.0],
        );
    }

    #[test]
    fn test_solve_constant_has_no_roots() {
        assert!(solve(&[3.0, 0.0, 0.0]).is_empty());
        assert!(solve(&[0.0]).is_empty());
        assert!(solve(&[]).is_empty());
    }
}
