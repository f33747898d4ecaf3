//! Dependence model (§3, §4.5): converts the affine IR into the integer
//! matrix/vector form the analyzer and planner work over — bound matrices
//! `(L, L0)`/`(U, U0)` and, per assignment statement, a
//! `(coefficient matrix, constant vector)` pair for every subscript.

use num_bigint::BigInt;
use num_traits::Zero;

use crate::affine_ir::{ArraySubscript, LoopHeader, PerfectLoopNest};
use crate::ast::DeclId;
use crate::matrix::Matrix;

/// `(coefficient matrix M, constant vector v)` for one subscript: row `i`
/// column `j` is the coefficient of the `i`-th enclosing index in the
/// `j`-th subscript dimension's linear form; `v[j]` is that dimension's
/// constant term (§3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptModel {
    pub array: DeclId,
    pub coeffs: Matrix,
    pub consts: Vec<BigInt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentModel {
    pub lhs: SubscriptModel,
    pub rhs: Vec<SubscriptModel>,
}

/// Bound matrices plus per-assignment subscript models for one nest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestModel {
    /// `(L, L0)`: lower-bound coefficient matrix and constant vector.
    pub lower: (Matrix, Vec<BigInt>),
    /// `(U, U0)`: upper-bound coefficient matrix and constant vector.
    pub upper: (Matrix, Vec<BigInt>),
    pub assignments: Vec<AssignmentModel>,
}

fn header_at(mut header: &LoopHeader, level: usize) -> &LoopHeader {
    for _ in 0..level {
        header = header.child.as_ref().expect("level within nest depth");
    }
    header
}

fn build_bound_matrices(nest: &PerfectLoopNest) -> ((Matrix, Vec<BigInt>), (Matrix, Vec<BigInt>)) {
    let m = nest.depth;
    let mut lower = Matrix::zeros(m, m);
    let mut lower0 = vec![BigInt::zero(); m];
    let mut upper = Matrix::zeros(m, m);
    let mut upper0 = vec![BigInt::zero(); m];

    for j in 0..m {
        let header = header_at(&nest.outermost, j);
        lower0[j] = header.lower.constant_term().clone();
        upper0[j] = header.upper.constant_term().clone();
        for &v in header.lower.variables() {
            if let Some(level) = nest.level_of(v) {
                lower.set(level.0, j, header.lower.coefficient_of(v).unwrap().clone());
            }
        }
        for &v in header.upper.variables() {
            if let Some(level) = nest.level_of(v) {
                upper.set(level.0, j, header.upper.coefficient_of(v).unwrap().clone());
            }
        }
    }
    ((lower, lower0), (upper, upper0))
}

fn build_subscript_model(nest: &PerfectLoopNest, sub: &ArraySubscript) -> SubscriptModel {
    let m = nest.depth;
    let d = sub.dims.len();
    let mut coeffs = Matrix::zeros(m, d);
    let mut consts = vec![BigInt::zero(); d];
    for (col, form) in sub.dims.iter().enumerate() {
        consts[col] = form.constant_term().clone();
        for &v in form.variables() {
            if let Some(level) = nest.level_of(v) {
                coeffs.set(level.0, col, form.coefficient_of(v).unwrap().clone());
            }
        }
    }
    SubscriptModel { array: sub.array, coeffs, consts }
}

/// Build the full dependence model for `nest` (§3, §4.5).
pub fn build(nest: &PerfectLoopNest) -> NestModel {
    let (lower, upper) = build_bound_matrices(nest);
    let assignments = nest
        .assignments
        .iter()
        .map(|a| AssignmentModel {
            lhs: build_subscript_model(nest, &a.lhs),
            rhs: a.rhs.iter().map(|r| build_subscript_model(nest, r)).collect(),
        })
        .collect();
    NestModel { lower, upper, assignments }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affine_ir::LinearForm;
    use std::collections::BTreeSet;

    fn d(n: u32) -> DeclId {
        DeclId(n)
    }

    /// `for i = 0..N-1 { for j = 0..M-1 { a[i][j] = a[i-1][j] + a[i][j-1]; } }`
    fn rectangular_nest() -> PerfectLoopNest {
        let i = d(0);
        let j = d(1);
        let n = d(2);
        let m = d(3);
        let a = d(4);

        let inner = LoopHeader {
            index_var: j,
            lower: LinearForm::constant(0),
            upper: LinearForm::variable(m).add(&LinearForm::constant(-1)),
            child: None,
        };
        let outer = LoopHeader {
            index_var: i,
            lower: LinearForm::constant(0),
            upper: LinearForm::variable(n).add(&LinearForm::constant(-1)),
            child: Some(Box::new(inner)),
        };

        let lhs = ArraySubscript { array: a, dims: vec![LinearForm::variable(i), LinearForm::variable(j)] };
        let rhs1 = ArraySubscript {
            array: a,
            dims: vec![LinearForm::variable(i).add(&LinearForm::constant(-1)), LinearForm::variable(j)],
        };
        let rhs2 = ArraySubscript {
            array: a,
            dims: vec![LinearForm::variable(i), LinearForm::variable(j).add(&LinearForm::constant(-1))],
        };

        let mut outputs = BTreeSet::new();
        outputs.insert(a);
        let mut inputs = BTreeSet::new();
        inputs.insert(a);

        PerfectLoopNest {
            outermost: outer,
            indices: vec![i, j],
            assignments: vec![crate::affine_ir::AssignmentStatement { lhs, rhs: vec![rhs1, rhs2] }],
            inputs,
            outputs,
            depth: 2,
        }
    }

    #[test]
    fn bound_matrices_are_rectangular_identity() {
        let nest = rectangular_nest();
        let model = build(&nest);
        // Outer bound is a pure constant; inner bound depends on no enclosing
        // index either (both are rectangular: L = U = 0 matrix here since
        // neither bound references an index variable).
        assert_eq!(model.lower.0.get(0, 0), &BigInt::zero());
        assert_eq!(model.lower.1, vec![BigInt::zero(), BigInt::zero()]);
    }

    #[test]
    fn subscript_coefficients_match_index_positions() {
        let nest = rectangular_nest();
        let model = build(&nest);
        let lhs = &model.assignments[0].lhs;
        assert_eq!(lhs.coeffs.get(0, 0), &BigInt::from(1)); // i in dim 0
        assert_eq!(lhs.coeffs.get(1, 1), &BigInt::from(1)); // j in dim 1
        assert_eq!(lhs.consts, vec![BigInt::zero(), BigInt::zero()]);

        let rhs1 = &model.assignments[0].rhs[0];
        assert_eq!(rhs1.consts[0], BigInt::from(-1));
    }
}
