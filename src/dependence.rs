//! Dependence analyzer (§4.5): general and uniform linear dependence
//! tests over the integer matrix/vector dependence model, producing
//! "T-on-S" / "S-on-T" sets of [`DependenceRecord`]s.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::dependence_model::SubscriptModel;
use crate::diophantine;
use crate::fourier_motzkin::{self, EnumerationError};
use crate::matrix::{self, Matrix};

#[derive(Debug, thiserror::Error)]
pub enum DependenceError {
    #[error(transparent)]
    InfiniteSolutionSet(#[from] EnumerationError),
}

/// (optional concrete source/sink index vectors, distance, sign, level) — §3.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependenceRecord {
    pub source: Option<Vec<BigInt>>,
    pub sink: Option<Vec<BigInt>>,
    pub distance: Vec<BigInt>,
    pub sign: Vec<i8>,
    /// 0-based index of the first nonzero entry of `distance`, or `m` for
    /// the zero vector (glossary: "1-based classical, 0-based internally").
    pub level: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependenceSets {
    pub t_on_s: Vec<DependenceRecord>,
    pub s_on_t: Vec<DependenceRecord>,
}

fn sign_vector(d: &[BigInt]) -> Vec<i8> {
    d.iter().map(|x| if x.is_negative() { -1 } else if x.is_zero() { 0 } else { 1 }).collect()
}

/// Build the canonical bound matrix `P`/`Q` with `p0 ≤ I·P` (or `I·Q ≤ q0`)
/// from the raw per-column coefficient matrix `(L, L0)`/`(U, U0)` (§4.5).
pub fn canonical_bound_matrix(raw: &Matrix) -> Matrix {
    let m = raw.rows();
    let mut out = Matrix::zeros(m, m);
    for i in 0..m {
        out.set(i, i, BigInt::from(1));
        for k in 0..i {
            out.set(k, i, -raw.get(k, i).clone());
        }
    }
    out
}

/// Append `bound.cols()` inequality columns `sign * (proj · bound) ≤ target`
/// (restricted to the free tail of the witness) to the growing FM system.
fn append_free_inequalities(
    proj: &Matrix,
    bound: &Matrix,
    target: &[BigInt],
    t_known: &[BigInt],
    rank: usize,
    free_count: usize,
    sign: i64,
    a_rows: &mut [Vec<BigInt>],
    c: &mut Vec<BigInt>,
) {
    let combined = proj.matmul(bound);
    let sign_b = BigInt::from(sign);
    for col in 0..bound.cols() {
        let known_contrib: BigInt = (0..rank).map(|row| &t_known[row] * combined.get(row, col)).sum();
        for (k, row) in a_rows.iter_mut().enumerate() {
            row.push(combined.get(rank + k, col) * &sign_b);
        }
        c.push(&target[col] - &(&sign_b * &known_contrib));
    }
}

fn assemble_fm_system(a_rows: Vec<Vec<BigInt>>, c: Vec<BigInt>, free_count: usize) -> (Matrix, Vec<BigInt>) {
    let cols = c.len();
    let data: Vec<BigInt> = a_rows.into_iter().flatten().collect();
    (Matrix::from_rows(free_count, cols, data), c)
}

fn bucket_pair(
    i: Vec<BigInt>,
    j: Vec<BigInt>,
    distinct_statements: bool,
    sets: &mut DependenceSets,
) {
    match matrix::compare_lex(&i, &j) {
        matrix::LexOrder::RightGreater => {
            let d: Vec<BigInt> = j.iter().zip(&i).map(|(a, b)| a - b).collect();
            let level = matrix::level(&d);
            let sign = sign_vector(&d);
            sets.t_on_s.push(DependenceRecord { source: Some(i), sink: Some(j), distance: d, sign, level });
        }
        matrix::LexOrder::LeftGreater => {
            let d: Vec<BigInt> = i.iter().zip(&j).map(|(a, b)| a - b).collect();
            let level = matrix::level(&d);
            let sign = sign_vector(&d);
            sets.s_on_t.push(DependenceRecord { source: Some(i), sink: Some(j), distance: d, sign, level });
        }
        matrix::LexOrder::Equal => {
            if distinct_statements {
                let m = i.len();
                let d = vec![BigInt::zero(); m];
                let sign = sign_vector(&d);
                sets.t_on_s.push(DependenceRecord {
                    source: Some(i),
                    sink: Some(j),
                    distance: d,
                    sign,
                    level: m,
                });
            }
        }
    }
}

fn row_matmul(row: &[BigInt], rhs: &Matrix) -> Vec<BigInt> {
    let t_row = Matrix::from_rows(1, row.len(), row.to_vec());
    t_row.matmul(rhs).row(0).to_vec()
}

/// The general linear dependence test (§4.5) for two references `a`, `b`
/// against the same array, with bound matrices `p`/`p0` (lower) and
/// `q`/`q0` (upper) over the `m` enclosing indices.
#[allow(clippy::too_many_arguments)]
pub fn general_test(
    m: usize,
    p: &Matrix,
    p0: &[BigInt],
    q: &Matrix,
    q0: &[BigInt],
    a: &SubscriptModel,
    b: &SubscriptModel,
    distinct_statements: bool,
    fm_chunk_size: usize,
) -> Result<DependenceSets, DependenceError> {
    let d = a.coeffs.cols();
    let mut w_data = Vec::with_capacity(2 * m * d);
    for row in 0..m {
        w_data.extend(a.coeffs.row(row).iter().cloned());
    }
    for row in 0..m {
        w_data.extend(b.coeffs.row(row).iter().map(|x| -x));
    }
    let w = Matrix::from_rows(2 * m, d, w_data);
    let c: Vec<BigInt> = b.consts.iter().zip(&a.consts).map(|(bb, aa)| bb - aa).collect();

    let mut sets = DependenceSets::default();
    let Some(sol) = diophantine::solve_system(&w, &c) else {
        return Ok(sets);
    };

    let u1 = submatrix_cols(&sol.u, 0, m);
    let u2 = submatrix_cols(&sol.u, m, m);
    let rank = sol.rank;
    let free_count = 2 * m - rank;
    let neg_p0: Vec<BigInt> = p0.iter().map(|x| -x).collect();

    let mut a_rows: Vec<Vec<BigInt>> = (0..free_count).map(|_| Vec::new()).collect();
    let mut c_fm = Vec::new();
    append_free_inequalities(&u1, p, &neg_p0, &sol.t, rank, free_count, -1, &mut a_rows, &mut c_fm);
    append_free_inequalities(&u1, q, q0, &sol.t, rank, free_count, 1, &mut a_rows, &mut c_fm);
    append_free_inequalities(&u2, p, &neg_p0, &sol.t, rank, free_count, -1, &mut a_rows, &mut c_fm);
    append_free_inequalities(&u2, q, q0, &sol.t, rank, free_count, 1, &mut a_rows, &mut c_fm);
    let (a_fm, c_fm) = assemble_fm_system(a_rows, c_fm, free_count);

    let fm = fourier_motzkin::eliminate(&a_fm, &c_fm);
    if !fm.feasible {
        return Ok(sets);
    }

    if free_count == 0 {
        let i = row_matmul(&sol.t, &u1);
        let j = row_matmul(&sol.t, &u2);
        bucket_pair(i, j, distinct_statements, &mut sets);
        return Ok(sets);
    }

    let chunks = fourier_motzkin::enumerate_integer_points(&fm.bounds, fm_chunk_size)?;
    for chunk in chunks {
        for completion in chunk {
            let mut t_full = sol.t.clone();
            for (k, y) in completion.into_iter().enumerate() {
                t_full[rank + k] = y;
            }
            let i = row_matmul(&t_full, &u1);
            let j = row_matmul(&t_full, &u2);
            bucket_pair(i, j, distinct_statements, &mut sets);
        }
    }
    Ok(sets)
}

/// The uniform linear dependence test (§4.5), valid only when `a.coeffs ==
/// b.coeffs` and the nest is regular/rectangular (`p == q` as raw bound
/// matrices, i.e. `L == U`).
pub fn uniform_test(
    m: usize,
    p: &Matrix,
    p0: &[BigInt],
    q0: &[BigInt],
    a: &SubscriptModel,
    b: &SubscriptModel,
    distinct_statements: bool,
    fm_chunk_size: usize,
) -> Result<DependenceSets, DependenceError> {
    let c: Vec<BigInt> = a.consts.iter().zip(&b.consts).map(|(aa, bb)| aa - bb).collect();
    let mut sets = DependenceSets::default();
    let Some(sol) = diophantine::solve_system(&a.coeffs, &c) else {
        return Ok(sets);
    };

    let rank = sol.rank;
    let free_count = m - rank;
    let target: Vec<BigInt> = q0.iter().zip(p0).map(|(qq, pp)| qq - pp).collect();

    let mut a_rows: Vec<Vec<BigInt>> = (0..free_count).map(|_| Vec::new()).collect();
    let mut c_fm = Vec::new();
    append_free_inequalities(&sol.u, p, &target, &sol.t, rank, free_count, 1, &mut a_rows, &mut c_fm);
    append_free_inequalities(&sol.u, p, &target, &sol.t, rank, free_count, -1, &mut a_rows, &mut c_fm);
    let (a_fm, c_fm) = assemble_fm_system(a_rows, c_fm, free_count);

    let fm = fourier_motzkin::eliminate(&a_fm, &c_fm);
    if !fm.feasible {
        return Ok(sets);
    }

    let mut record_k = |k: Vec<BigInt>| {
        let is_zero = k.iter().all(|x| x.is_zero());
        if matrix::is_lex_positive(&k) {
            let sign = sign_vector(&k);
            let level = matrix::level(&k);
            sets.t_on_s.push(DependenceRecord { source: None, sink: None, distance: k, sign, level });
        } else if !is_zero {
            let neg: Vec<BigInt> = k.iter().map(|x| -x).collect();
            let sign = sign_vector(&neg);
            let level = matrix::level(&neg);
            sets.s_on_t.push(DependenceRecord { source: None, sink: None, distance: neg, sign, level });
        } else if distinct_statements {
            let sign = sign_vector(&k);
            let level = m;
            sets.t_on_s.push(DependenceRecord { source: None, sink: None, distance: k, sign, level });
        }
    };

    if free_count == 0 {
        record_k(row_matmul(&sol.t, &sol.u));
        return Ok(sets);
    }
    let chunks = fourier_motzkin::enumerate_integer_points(&fm.bounds, fm_chunk_size)?;
    for chunk in chunks {
        for completion in chunk {
            let mut t_full = sol.t.clone();
            for (k, y) in completion.into_iter().enumerate() {
                t_full[rank + k] = y;
            }
            record_k(row_matmul(&t_full, &sol.u));
        }
    }
    Ok(sets)
}

fn submatrix_cols(m: &Matrix, start: usize, width: usize) -> Matrix {
    let mut out = Matrix::zeros(m.rows(), width);
    for r in 0..m.rows() {
        for c in 0..width {
            out.set(r, c, m.get(r, start + c).clone());
        }
    }
    out
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
    fn canonical_bound_matrix_has_unit_diagonal() {
        let raw = Matrix::zeros(2, 2);
        let p = canonical_bound_matrix(&raw);
        assert_eq!(p.get(0, 0), &bi(1));
        assert_eq!(p.get(1, 1), &bi(1));
    }

    #[test]
    fn s6_uniform_dependence_on_stencil_nest() {
        // spec.md S6: a[i][j] = a[i-1][j] + a[i][j-1], rectangular m=2.
        let m = 2;
        let lhs = SubscriptModel {
            array: crate::ast::DeclId(0),
            coeffs: Matrix::identity(2),
            consts: bv(&[0, 0]),
        };
        let rhs_i = SubscriptModel {
            array: crate::ast::DeclId(0),
            coeffs: Matrix::identity(2),
            consts: bv(&[-1, 0]),
        };
        let rhs_j = SubscriptModel {
            array: crate::ast::DeclId(0),
            coeffs: Matrix::identity(2),
            consts: bv(&[0, -1]),
        };
        // Rectangular nest: 0 <= i,j, no finite upper bound here (we only
        // need the dependence direction, so a loose upper bound suffices).
        let raw_bounds = Matrix::zeros(2, 2);
        let p = canonical_bound_matrix(&raw_bounds);
        let p0 = bv(&[0, 0]);
        let q0 = bv(&[1000, 1000]);

        let sets_i = uniform_test(m, &p, &p0, &q0, &lhs, &rhs_i, false, 64).expect("no infinite set");
        assert_eq!(sets_i.t_on_s.len(), 1);
        assert_eq!(sets_i.t_on_s[0].distance, bv(&[1, 0]));

        let sets_j = uniform_test(m, &p, &p0, &q0, &lhs, &rhs_j, false, 64).expect("no infinite set");
        assert_eq!(sets_j.t_on_s.len(), 1);
        assert_eq!(sets_j.t_on_s[0].distance, bv(&[0, 1]));
    }
}
