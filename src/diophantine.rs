//! Integer solutions of linear Diophantine equations and systems (§4.2).
//!
//! Both solvers reduce the coefficient matrix to Hermite form `U·A = S` and
//! then solve the much simpler triangular system `t·S = c`, exactly as
//! `original_source/gap/gap_util/diophantine.*` derives it (see the
//! `t = x·U⁻¹` substitution worked through in that file's doc comments).
//! Any integer solution is recovered by the caller as `x = t·U`.

use num_bigint::BigInt;
use num_traits::Zero;

use crate::matrix::{hermite, Matrix};

/// Solution of a single equation `x·A = c` (`A` an `m`×1 column vector).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiophantineSolution {
    /// Unimodular `U` with `U·A = S`; any solution is `x = t·U`.
    pub u: Matrix,
    /// The single determined component `t1 = c / S[0]`; `t2..tm` are free.
    pub t1: BigInt,
}

/// Solve `x·A = c` for a column vector `A` of length `m`.
///
/// Returns `None` (`NoSolution`, §7) when `gcd(A)` (equivalently `|S[0]|`)
/// does not divide `c`.
///
/// # Panics
/// Panics if `A` is empty (`m == 0`) — a caller invariant, not an analysis
/// error.
pub fn solve_equation(a: &Matrix, c: &BigInt) -> Option<DiophantineSolution> {
    assert!(a.rows() > 0, "solve_equation: A has zero rows");
    assert_eq!(a.cols(), 1, "solve_equation: A must be a column vector");
    let (u, s, _rank) = hermite(a);
    let pivot = s.get(0, 0);
    if pivot.is_zero() {
        return if c.is_zero() { Some(DiophantineSolution { u, t1: BigInt::zero() }) } else { None };
    }
    if (c % pivot) != BigInt::zero() {
        return None;
    }
    Some(DiophantineSolution { u, t1: c / pivot })
}

/// Solution of a system `x·A = c` (`A` is `m`×`n`, `c` is 1×`n`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiophantineSystemSolution {
    /// Unimodular `U` with `U·A = S`.
    pub u: Matrix,
    /// First `rank` entries determined, trailing `m - rank` filled with 0 (free).
    pub t: Vec<BigInt>,
    /// `rank(S)`.
    pub rank: usize,
}

/// Solve the system `x·A = c` by forward substitution over the Hermite
/// echelon form of `A`, as described in §4.2.
///
/// Returns `None` (`NoSolution`) the first time a column's required value
/// cannot be met — either because the column needs a pivot state the
/// echelon form does not provide, or because the needed division is not
/// exact.
pub fn solve_system(a: &Matrix, c: &[BigInt]) -> Option<DiophantineSystemSolution> {
    assert_eq!(a.cols(), c.len(), "solve_system: A/c column-count mismatch");
    let m = a.rows();
    let (u, s, rank) = hermite(a);
    let mut t = vec![BigInt::zero(); m];
    let mut component = 0usize;

    for j in 0..s.cols() {
        let sum: BigInt = (0..component).map(|k| s.get(k, j) * &t[k]).sum();
        if component >= rank || s.get(component, j).is_zero() {
            if c[j] != sum {
                return None;
            }
            continue;
        }
        let remainder = &c[j] - &sum;
        let pivot = s.get(component, j);
        if (&remainder % pivot) != BigInt::zero() {
            return None;
        }
        t[component] = &remainder / pivot;
        component += 1;
    }
    Some(DiophantineSystemSolution { u, t, rank })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    fn bi(v: i64) -> BigInt {
        BigInt::from(v)
    }
    fn col(vs: &[i64]) -> Matrix {
        Matrix::from_rows(vs.len(), 1, vs.iter().map(|&v| bi(v)).collect())
    }

    #[test]
    fn s3_single_equation_no_solution_when_gcd_does_not_divide() {
        // spec.md S3: A = [6,4,10], c = 5, gcd = 2, does not divide 5.
        let a = col(&[6, 4, 10]);
        assert!(solve_equation(&a, &bi(5)).is_none());
    }

    #[test]
    fn s3_single_equation_solution_when_gcd_divides() {
        // spec.md S3: A = [6,4,10], c = 8 -> t1 = 4.
        let a = col(&[6, 4, 10]);
        let sol = solve_equation(&a, &bi(8)).expect("solution expected");
        assert_eq!(sol.t1, bi(4));
        // Recover x = t·U and check x·A = c for the determined component
        // with free components fixed at an arbitrary integer (0).
        let mut t_full = vec![BigInt::zero(); a.rows()];
        t_full[0] = sol.t1.clone();
        let t_row = Matrix::from_rows(1, a.rows(), t_full);
        let x = t_row.matmul(&sol.u);
        let xa = x.matmul(&a);
        assert_eq!(xa.get(0, 0), &bi(8));
    }

    #[test]
    fn system_solution_satisfies_equation_for_any_free_completion() {
        let a = Matrix::from_rows(2, 2, vec![bi(1), bi(0), bi(0), bi(1)]);
        let c = vec![bi(3), bi(5)];
        let sol = solve_system(&a, &c).expect("solution expected");
        assert_eq!(sol.rank, 2);
        let t_row = Matrix::from_rows(1, 2, sol.t.clone());
        let x = t_row.matmul(&sol.u);
        let xa = x.matmul(&a);
        assert_eq!(xa.row(0), &c[..]);
    }

    #[test]
    fn system_no_solution_when_inconsistent() {
        // Rank-deficient A (both rows identical contributions) with an
        // inconsistent right-hand side.
        let a = Matrix::from_rows(2, 2, vec![bi(1), bi(1), bi(1), bi(1)]);
        let c = vec![bi(1), bi(2)];
        assert!(solve_system(&a, &c).is_none());
    }
}
