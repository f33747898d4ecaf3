//! Nest rewriter (§4.7): allocates fresh index variables, substitutes
//! them for the original indices via the planner's unimodular matrix,
//! and rewrites each loop bound into the `ceil(max(...))`/`floor(min(...))
//! + 1` shape the code-shape generator renders.

use num_bigint::BigInt;

use crate::fourier_motzkin::{BoundSet, FmResult};
use crate::matrix::Matrix;
use crate::rational::Rational;

/// A rational affine form over the fresh index variables, one candidate
/// bound among possibly several for a given loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RationalAffine {
    pub coeffs: Vec<Rational>,
    pub constant: Rational,
}

/// All lower- and upper-bound candidates for one rewritten loop level.
/// §4.7: drop the `max`/`min` wrapper when only one candidate exists;
/// the upper bound's strict `<` is restored by adding 1 after `floor`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewrittenBound {
    pub lower_candidates: Vec<RationalAffine>,
    pub upper_candidates: Vec<RationalAffine>,
}

impl RewrittenBound {
    pub fn needs_max(&self) -> bool {
        self.lower_candidates.len() > 1
    }

    pub fn needs_min(&self) -> bool {
        self.upper_candidates.len() > 1
    }
}

/// The affine substitution for one original index `Iᵢ`: `Iᵢ = Σⱼ Uⱼᵢ·Kⱼ`
/// (§4.7), stored as the `i`-th column of `U`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSubstitution {
    pub coeffs: Vec<BigInt>,
}

/// Fresh index variables `K₁..Kₘ`, the substitution for each original
/// index, and the rewritten bound for each fresh variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewrittenNest {
    pub fresh_names: Vec<String>,
    pub substitutions: Vec<IndexSubstitution>,
    pub bounds: Vec<RewrittenBound>,
}

fn candidates_from_bound_set(bs: &BoundSet) -> Vec<RationalAffine> {
    (0..bs.consts.len())
        .map(|j| RationalAffine {
            coeffs: (0..bs.coeffs.rows()).map(|i| bs.coeffs.get(i, j).clone()).collect(),
            constant: bs.consts[j].clone(),
        })
        .collect()
}

/// Build the rewritten nest from the planner's chosen `U` and the bound
/// candidates `planner::new_bounds` derived by Fourier–Motzkin.
pub fn build(u: &Matrix, fm: &FmResult) -> RewrittenNest {
    let m = u.rows();
    let fresh_names = (1..=m).map(|i| format!("K{i}")).collect();
    let substitutions = (0..m).map(|i| IndexSubstitution { coeffs: u.column(i) }).collect();
    let bounds = fm
        .bounds
        .iter()
        .map(|vb| RewrittenBound {
            lower_candidates: candidates_from_bound_set(&vb.lower),
            upper_candidates: candidates_from_bound_set(&vb.upper),
        })
        .collect();
    RewrittenNest { fresh_names, substitutions, bounds }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier_motzkin;

    fn bi(v: i64) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn identity_transform_substitutes_each_index_to_itself() {
        let u = Matrix::identity(2);
        let fm = fourier_motzkin::eliminate(&Matrix::zeros(0, 0), &[]);
        let rn = build(&u, &fm);
        assert_eq!(rn.fresh_names, vec!["K1", "K2"]);
        assert_eq!(rn.substitutions[0].coeffs, vec![bi(1), bi(0)]);
        assert_eq!(rn.substitutions[1].coeffs, vec![bi(0), bi(1)]);
    }

    #[test]
    fn single_candidate_bound_does_not_need_max_or_min() {
        let bound = RewrittenBound {
            lower_candidates: vec![RationalAffine { coeffs: vec![], constant: Rational::from_int(0) }],
            upper_candidates: vec![RationalAffine { coeffs: vec![], constant: Rational::from_int(10) }],
        };
        assert!(!bound.needs_max());
        assert!(!bound.needs_min());
    }

    #[test]
    fn multiple_candidates_require_max_and_min() {
        let bound = RewrittenBound {
            lower_candidates: vec![
                RationalAffine { coeffs: vec![], constant: Rational::from_int(0) },
                RationalAffine { coeffs: vec![], constant: Rational::from_int(1) },
            ],
            upper_candidates: vec![
                RationalAffine { coeffs: vec![], constant: Rational::from_int(10) },
                RationalAffine { coeffs: vec![], constant: Rational::from_int(9) },
            ],
        };
        assert!(bound.needs_max());
        assert!(bound.needs_min());
    }
}
