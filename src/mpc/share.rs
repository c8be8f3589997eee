//! Share algebra: `split`, `reconstruct`, and `renormalize` over the fixed
//! three-party topology. Every function here operates on `FieldElem`s that
//! are assumed to already be in `[0, MOD)`.

use rand::Rng;

use crate::field::FieldElem;

/// Fixed party count. The gamma vector and the renormalization math below are
/// hard-wired to this value; generalizing to `n` parties needs a different
/// gamma (Lagrange weights at 0 for nodes `1..n`) and a degree threshold
/// `t < n/2`, which is out of scope here (spec.md §9).
pub const NP: usize = 3;

/// Reconstruction coefficients `(3, p-3, 1)`. Collapses a three-share
/// degree-1 polynomial back to its constant term: `GAMMA . (1,1,1)^T == 1`.
pub const GAMMA: [FieldElem; NP] = [
    FieldElem::new(3),
    FieldElem::new(crate::field::MOD - 3),
    FieldElem::new(1),
];

/// `split(j, r, s) = (j+1)*r + s`, the share of secret `s` for party `j`
/// under the degree-1 polynomial `f(x) = s + r*x`.
pub fn split(party: usize, r: FieldElem, secret: FieldElem) -> FieldElem {
    let coeff = FieldElem::new(party as u32 + 1);
    coeff.multiply(r).add(secret)
}

/// A complete set of three shares, one per party. Only the coordinator ever
/// holds a `ShareTriple` — an agent's view of a secret is always a single
/// `FieldElem`, never this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareTriple(pub [FieldElem; NP]);

impl ShareTriple {
    /// Deals `secret` into a fresh degree-1 sharing using randomness `r`.
    pub fn deal(secret: FieldElem, r: FieldElem) -> Self {
        let mut shares = [FieldElem::ZERO; NP];
        for (j, share) in shares.iter_mut().enumerate() {
            *share = split(j, r, secret);
        }
        Self(shares)
    }

    pub fn share(&self, party: usize) -> FieldElem {
        self.0[party]
    }

    /// `reconstruct(s1, s2, s3) = gamma1*s1 + gamma2*s2 + gamma3*s3`.
    pub fn reconstruct(&self) -> FieldElem {
        GAMMA
            .iter()
            .zip(self.0.iter())
            .fold(FieldElem::ZERO, |acc, (&g, &s)| acc.add(g.multiply(s)))
    }

    /// Reduces the polynomial degree of a (possibly degree-2) share triple
    /// back to degree 1, preserving the encoded secret. See spec.md §4.B.
    ///
    /// Run by the coordinator after collecting the three raw shares for a
    /// REN round (either the agents' local-multiplication result, or an
    /// intermediate value inside the comparison protocol); the three new
    /// shares are then sent back out over the REN reply.
    pub fn renormalize<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let r_u = FieldElem::random(rng);
        let c2 = FieldElem::random(rng);

        // Step 1: fresh degree-1 sharing of r_u.
        let mut r_shares = [FieldElem::ZERO; NP];
        for (j, r_j) in r_shares.iter_mut().enumerate() {
            *r_j = r_u.add(c2.multiply(FieldElem::new(j as u32 + 1)));
        }

        // Step 2: blind each share with the matching r_j.
        let mut d = [FieldElem::ZERO; NP];
        for j in 0..NP {
            d[j] = self.0[j].add(r_shares[j]);
        }

        // Step 3-4: reshare each d_j to every party k.
        let mut reshared = [[FieldElem::ZERO; NP]; NP];
        for j in 0..NP {
            let c_j = FieldElem::random(rng);
            for k in 0..NP {
                reshared[j][k] = d[j].add(c_j.multiply(FieldElem::new(k as u32 + 1)));
            }
        }

        // Step 5: recombine with gamma and strip the blinding r_k.
        let mut new_shares = [FieldElem::ZERO; NP];
        for k in 0..NP {
            let mut sum = FieldElem::ZERO;
            for j in 0..NP {
                sum = sum.add(GAMMA[j].multiply(reshared[j][k]));
            }
            new_shares[k] = sum.subtract(r_shares[k]);
        }

        Self(new_shares)
    }
}
