//! Lagrange interpolation over `FieldElem`, kept around to justify the fixed
//! reconstruction vector `GAMMA` used by [`crate::mpc::share`] rather than
//! deriving it at runtime. `GAMMA` is hard-wired to `NP = 3` nodes, so the
//! general interpolation path here is test-only.

use crate::field::FieldElem;

/// Computes the Lagrange basis polynomials evaluated at `x`, for the given
/// interpolation nodes.
pub fn compute_lagrange_basis(nodes: &[FieldElem], x: FieldElem) -> Vec<FieldElem> {
    let mut basis = Vec::with_capacity(nodes.len());
    for (j, &x_j) in nodes.iter().enumerate() {
        let mut term = FieldElem::ONE;
        for (m, &x_m) in nodes.iter().enumerate() {
            if m != j {
                let numerator = x.subtract(x_m);
                let denominator = x_j.subtract(x_m);
                term = term.multiply(numerator.multiply(inverse(denominator)));
            }
        }
        basis.push(term);
    }
    basis
}

/// Evaluates the polynomial interpolated through `(nodes[i], evaluations[i])`
/// at `x`.
pub fn interpolate_at(evaluations: &[FieldElem], nodes: &[FieldElem], x: FieldElem) -> FieldElem {
    assert_eq!(evaluations.len(), nodes.len());
    let basis = compute_lagrange_basis(nodes, x);
    evaluations
        .iter()
        .zip(basis)
        .fold(FieldElem::ZERO, |acc, (&e, b)| acc.add(e.multiply(b)))
}

/// Extended Euclid inverse mod `MOD`. Only used by the test-only
/// interpolation path above; the live protocol never inverts a field element.
fn inverse(x: FieldElem) -> FieldElem {
    assert_ne!(x.value(), 0, "cannot invert zero");
    let modulus = crate::field::MOD as i64;
    let mut old_r = x.value() as i64;
    let mut r = modulus;
    let mut old_s = 1i64;
    let mut s = 0i64;

    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }

    let normalized = ((old_s % modulus) + modulus) % modulus;
    FieldElem::new(normalized as u32)
}
