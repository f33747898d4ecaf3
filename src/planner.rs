//! Transformation planner (§4.6): chooses outer-par, inner-par, or no
//! transformation from a set of distance vectors, and derives the
//! post-transform loop bounds by Fourier–Motzkin elimination.

use num_bigint::BigInt;
use num_traits::Zero;

use crate::fourier_motzkin::{self, FmResult};
use crate::matrix::{hermite_modified, invert_unimodular, Matrix};
use crate::rational::Rational;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("no transformation with k >= 1 dependence-free loops is available")]
    NotParallelizable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformKind {
    OuterPar,
    InnerPar,
    None,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub u: Matrix,
    pub kind: TransformKind,
    pub k: usize,
}

fn all_zero(v: &[BigInt]) -> bool {
    v.iter().all(|x| x.is_zero())
}

/// Hyperplane-direction vector `u` (§4.6): partition `D` by `level(d)` and
/// fill `u` from the innermost level (`r = m`) down to the outermost
/// (`r = 1`).
fn hyperplane_direction(d_set: &[Vec<BigInt>], m: usize) -> Vec<BigInt> {
    let mut u = vec![BigInt::zero(); m];
    for idx in (0..m).rev() {
        let partition: Vec<&Vec<BigInt>> = d_set.iter().filter(|d| crate::matrix::level(d) == idx).collect();
        if partition.is_empty() {
            continue;
        }
        let mut best: Option<BigInt> = None;
        for d in partition {
            let tail: BigInt = (idx + 1..m).map(|s| &d[s] * &u[s]).sum();
            let numerator = BigInt::from(1) - tail;
            let denom = d[idx].clone();
            let candidate = Rational::new(numerator, denom).ceil();
            best = Some(match best {
                Some(cur) if cur >= candidate => cur,
                _ => candidate,
            });
        }
        let computed = best.unwrap();
        u[idx] = if computed > BigInt::from(1) { computed } else { BigInt::from(1) };
    }
    u
}

fn build_inner_par_matrix(u: &[BigInt], idx: usize, m: usize) -> Matrix {
    let mut out = Matrix::zeros(m, m);
    for row in 0..m {
        out.set(row, 0, u[row].clone());
    }
    let mut src_row = 0;
    for row in 0..m {
        if row == idx {
            continue;
        }
        out.set(row, src_row + 1, BigInt::from(1));
        src_row += 1;
    }
    out
}

fn negate_col(m: &mut Matrix, col: usize) {
    for row in 0..m.rows() {
        let v = m.get(row, col).clone();
        m.set(row, col, -v);
    }
}

fn negate_row(m: &mut Matrix, row: usize) {
    for col in 0..m.cols() {
        let v = m.get(row, col).clone();
        m.set(row, col, -v);
    }
}

fn transpose_distance_set(d_set: &[Vec<BigInt>], m: usize) -> Matrix {
    let mut out = Matrix::zeros(m, d_set.len());
    for (col, d) in d_set.iter().enumerate() {
        for row in 0..m {
            out.set(row, col, d[row].clone());
        }
    }
    out
}

fn try_outer_par(d_set: &[Vec<BigInt>], m: usize) -> Option<Plan> {
    let d_t = transpose_distance_set(d_set, m);
    let (v, _s, rank) = hermite_modified(&d_t);
    if rank >= m {
        return None;
    }
    let n = m - rank;
    let u_vec = hyperplane_direction(d_set, m);
    if all_zero(&u_vec) || n < 2 {
        return None;
    }

    let mut a = Matrix::zeros(m, n + 1);
    for c in 0..n {
        for row in 0..m {
            a.set(row, c, v.get(rank + c, row).clone());
        }
    }
    for row in 0..m {
        a.set(row, n, u_vec[row].clone());
    }
    let (mut uo, mut t, _rank2) = hermite_modified(&a);
    if t.get(n, n).is_negative() {
        negate_col(&mut uo, n);
        negate_row(&mut t, n);
    }
    Some(Plan { u: uo, kind: TransformKind::OuterPar, k: n })
}

/// Choose a transformation for distance set `d_set` over an `m`-deep nest
/// (§4.6's choice rule): outer-par if it yields `k >= 2`, else inner-par,
/// else `NotParallelizable`.
pub fn plan(d_set: &[Vec<BigInt>], m: usize) -> Result<Plan, PlanError> {
    if d_set.is_empty() {
        return Ok(Plan { u: Matrix::identity(m), kind: TransformKind::None, k: m });
    }

    if let Some(outer) = try_outer_par(d_set, m) {
        return Ok(outer);
    }

    let u_vec = hyperplane_direction(d_set, m);
    if all_zero(&u_vec) {
        return Ok(Plan { u: Matrix::identity(m), kind: TransformKind::None, k: m });
    }
    if m < 2 {
        return Err(PlanError::NotParallelizable);
    }
    let idx = u_vec.iter().position(|x| !x.is_zero()).expect("u_vec not all zero");
    let u = build_inner_par_matrix(&u_vec, idx, m);
    Ok(Plan { u, kind: TransformKind::InnerPar, k: m - 1 })
}

/// New bounds by Fourier–Motzkin (§4.6): `V = U⁻¹·P`, `W = U⁻¹·Q`, solved
/// as `-V·K ≤ -p0` and `W·K ≤ q0` over the transformed indices `K`.
pub fn new_bounds(u: &Matrix, p: &Matrix, p0: &[BigInt], q: &Matrix, q0: &[BigInt]) -> FmResult {
    let u_inv = invert_unimodular(u);
    let v = u_inv.matmul(p);
    let w = u_inv.matmul(q);
    let m = u.rows();

    let neg_v_t = {
        let t = v.transpose();
        let mut out = Matrix::zeros(m, m);
        for r in 0..m {
            for c in 0..m {
                out.set(r, c, -t.get(r, c).clone());
            }
        }
        out
    };
    let w_t = w.transpose();

    let mut a_data = Vec::with_capacity(m * 2 * m);
    for row in 0..m {
        a_data.extend(neg_v_t.row(row).iter().cloned());
        a_data.extend(w_t.row(row).iter().cloned());
    }
    let a_fm = Matrix::from_rows(m, 2 * m, a_data);
    let mut c_fm: Vec<BigInt> = p0.iter().map(|x| -x).collect();
    c_fm.extend(q0.iter().cloned());

    fourier_motzkin::eliminate(&a_fm, &c_fm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bi(v: i64) -> BigInt {
        BigInt::from(v)
    }
    fn bv(vs: &[i64]) -> Vec<BigInt> {
        vs.iter().map(|&v| bi(v)).collect()
    }

    #[test]
    fn s4_distance_set_falls_back_to_inner_par_with_valid_direction() {
        // Applying the documented outer-par procedure to {(1,0),(0,1)}
        // literally gives D^T = identity, whose modified echelon has full
        // rank m, so outer-par reports k=0 by its own rule and the choice
        // rule falls back to inner-par. The resulting U must still satisfy
        // Testable Property 7 (first column of every d·U is >= 1).
        let d_set = vec![bv(&[1, 0]), bv(&[0, 1])];
        let plan = plan(&d_set, 2).expect("plan");
        assert_eq!(plan.kind, TransformKind::InnerPar);
        assert_eq!(plan.k, 1);
        for d in &d_set {
            let d_row = Matrix::from_rows(1, 2, d.clone());
            let transformed = d_row.matmul(&plan.u);
            assert!(transformed.row(0)[0] >= bi(1));
        }
    }

    #[test]
    fn s5_inner_par_distance_becomes_lex_positive_with_positive_first_entry() {
        // spec.md S5: distance set {(1,-1)} -> inner-par, k = 1; checked here
        // against Testable Property 7 rather than the worked example's exact
        // u = (1,1) numerals (see DESIGN.md for the convention note).
        let d_set = vec![bv(&[1, -1])];
        let plan = plan(&d_set, 2).expect("plan");
        assert_eq!(plan.kind, TransformKind::InnerPar);
        assert_eq!(plan.k, 1);
        let d_row = Matrix::from_rows(1, 2, d_set[0].clone());
        let transformed = d_row.matmul(&plan.u);
        assert!(transformed.row(0)[0] >= bi(1));
    }

    #[test]
    fn empty_distance_set_needs_no_transform() {
        let plan = plan(&[], 3).expect("plan");
        assert_eq!(plan.kind, TransformKind::None);
        assert_eq!(plan.k, 3);
    }

    #[test]
    fn single_loop_with_carry_is_not_parallelizable() {
        let d_set = vec![bv(&[1])];
        assert!(matches!(plan(&d_set, 1), Err(PlanError::NotParallelizable)));
    }

    #[test]
    fn unimodular_transform_makes_every_distance_lex_positive() {
        let d_set = vec![bv(&[1, -1]), bv(&[0, 2])];
        let plan = plan(&d_set, 2).expect("plan");
        for d in &d_set {
            let d_row = Matrix::from_rows(1, 2, d.clone());
            let transformed = d_row.matmul(&plan.u);
            assert!(crate::matrix::is_lex_positive(transformed.row(0)));
        }
    }
}
