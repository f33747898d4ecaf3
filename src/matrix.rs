//! Dense exact-integer and exact-rational matrices.
//!
//! [`Matrix`] holds arbitrary-precision integers and implements the
//! elementary row/column operations, Hermite (echelon) and Smith (diagonal)
//! normal-form reductions, lexicographic row-vector comparison, rank, and the
//! gcd-via-echelon utility described by the design document's numeric
//! kernel. [`RatMatrix`] is the thin rational-entried counterpart used by the
//! Fourier–Motzkin engine, where working coefficients must be divided.
//!
//! [`RowVector`] / [`ColumnVector`] are convenience newtypes over a 1×n / n×1
//! [`Matrix`] — dot product, negation, and lexicographic comparison without
//! forcing every call site to index a generic matrix by hand.

use std::fmt;
use std::ops::{Index, IndexMut};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::rational::Rational;

/// A dense `rows` × `cols` matrix of arbitrary-precision integers, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<BigInt>,
}

impl Matrix {
    /// Zero matrix of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![BigInt::zero(); rows * cols] }
    }

    /// Identity matrix of size `n`.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = BigInt::one();
        }
        m
    }

    /// Build a matrix from row-major data; panics if the length mismatches.
    pub fn from_rows(rows: usize, cols: usize, data: Vec<BigInt>) -> Self {
        assert_eq!(data.len(), rows * cols, "Matrix::from_rows: shape mismatch");
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, r: usize, c: usize) -> &BigInt {
        &self.data[r * self.cols + c]
    }
    pub fn set(&mut self, r: usize, c: usize, v: BigInt) {
        self.data[r * self.cols + c] = v;
    }

    /// Row `r` as a borrowed slice.
    pub fn row(&self, r: usize) -> &[BigInt] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Column `c`, materialized (matrix is row-major so this copies).
    pub fn column(&self, c: usize) -> Vec<BigInt> {
        (0..self.rows).map(|r| self.get(r, c).clone()).collect()
    }

    /// Transpose.
    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out[(c, r)] = self.get(r, c).clone();
            }
        }
        out
    }

    pub fn matmul(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.cols, rhs.rows, "Matrix::matmul: shape mismatch");
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut acc = BigInt::zero();
                for k in 0..self.cols {
                    acc += self.get(i, k) * rhs.get(k, j);
                }
                out[(i, j)] = acc;
            }
        }
        out
    }

    // ---- Elementary row operations (§4.1) ----

    /// Reversal: multiply row `r` by −1.
    pub fn reverse_row(&mut self, r: usize) {
        for c in 0..self.cols {
            let v = std::mem::take(&mut self[(r, c)]);
            self[(r, c)] = -v;
        }
    }

    /// Interchange: swap two distinct rows.
    pub fn interchange_rows(&mut self, r1: usize, r2: usize) {
        if r1 == r2 {
            return;
        }
        for c in 0..self.cols {
            self.data.swap(r1 * self.cols + c, r2 * self.cols + c);
        }
    }

    /// Skew: `row(dst) += scalar * row(src)`, `dst != src`.
    pub fn skew_row(&mut self, dst: usize, src: usize, scalar: &BigInt) {
        assert_ne!(dst, src, "Matrix::skew_row: dst == src");
        for c in 0..self.cols {
            let add = scalar * self.get(src, c);
            self[(dst, c)] += add;
        }
    }

    // ---- Elementary column operations (mirror of the above) ----

    pub fn reverse_col(&mut self, c: usize) {
        for r in 0..self.rows {
            let v = std::mem::take(&mut self[(r, c)]);
            self[(r, c)] = -v;
        }
    }

    pub fn interchange_cols(&mut self, c1: usize, c2: usize) {
        if c1 == c2 {
            return;
        }
        for r in 0..self.rows {
            self.data.swap(r * self.cols + c1, r * self.cols + c2);
        }
    }

    pub fn skew_col(&mut self, dst: usize, src: usize, scalar: &BigInt) {
        assert_ne!(dst, src, "Matrix::skew_col: dst == src");
        for r in 0..self.rows {
            let add = scalar * self.get(r, src);
            self[(r, dst)] += add;
        }
    }

    // ---- Elementary matrix constructors ----

    /// The `n`×`n` elementary matrix realizing [`Matrix::reverse_row`] on row `r`.
    pub fn reversal_matrix(n: usize, r: usize) -> Matrix {
        let mut m = Matrix::identity(n);
        m.reverse_row(r);
        m
    }

    /// The `n`×`n` elementary matrix realizing [`Matrix::interchange_rows`].
    pub fn interchange_matrix(n: usize, r1: usize, r2: usize) -> Matrix {
        let mut m = Matrix::identity(n);
        m.interchange_rows(r1, r2);
        m
    }

    /// The `n`×`n` elementary matrix realizing [`Matrix::skew_row`].
    pub fn skew_matrix(n: usize, dst: usize, src: usize, scalar: &BigInt) -> Matrix {
        let mut m = Matrix::identity(n);
        m.skew_row(dst, src, scalar);
        m
    }

    /// True iff this square matrix is the identity.
    pub fn is_identity(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows).all(|i| {
                (0..self.cols).all(|j| {
                    let want = if i == j { BigInt::one() } else { BigInt::zero() };
                    self.get(i, j) == &want
                })
            })
    }

    /// Determinant magnitude check used by tests: `|det| == 1`.
    ///
    /// Computed by reducing to Hermite form (the determinant of the
    /// accumulated row operations is always ±1, and `|det(A)|` is the
    /// product of the echelon diagonal) rather than a cofactor expansion.
    pub fn is_unimodular(&self) -> bool {
        if self.rows != self.cols {
            return false;
        }
        let (_, s, rank) = hermite(self);
        rank == self.rows && (0..self.rows).all(|i| s.get(i, i).magnitude() == BigInt::one())
    }
}

trait Magnitude {
    fn magnitude(&self) -> BigInt;
}
impl Magnitude for BigInt {
    fn magnitude(&self) -> BigInt {
        self.abs()
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = BigInt;
    fn index(&self, (r, c): (usize, usize)) -> &BigInt {
        &self.data[r * self.cols + c]
    }
}
impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut BigInt {
        &mut self.data[r * self.cols + c]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            writeln!(f, "{:?}", self.row(r))?;
        }
        Ok(())
    }
}

// ============================================================================
// Row / column vector convenience layer (supplemented from original_source's
// gap_util/row_vector.* and column_vector.*; see SPEC_FULL.md AMBIENT-5).
// ============================================================================

/// A 1×n [`Matrix`] with vector-flavored convenience methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowVector(Matrix);

impl RowVector {
    pub fn from_entries(entries: Vec<BigInt>) -> Self {
        let n = entries.len();
        Self(Matrix::from_rows(1, n, entries))
    }
    pub fn zeros(n: usize) -> Self {
        Self(Matrix::zeros(1, n))
    }
    pub fn len(&self) -> usize {
        self.0.cols()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn as_slice(&self) -> &[BigInt] {
        self.0.row(0)
    }
    pub fn get(&self, i: usize) -> &BigInt {
        self.0.get(0, i)
    }
    pub fn dot(&self, other: &RowVector) -> BigInt {
        assert_eq!(self.len(), other.len());
        self.as_slice().iter().zip(other.as_slice()).map(|(a, b)| a * b).sum()
    }
    pub fn neg(&self) -> RowVector {
        RowVector::from_entries(self.as_slice().iter().map(|x| -x).collect())
    }
    pub fn compare_lex(&self, other: &RowVector) -> LexOrder {
        compare_lex(self.as_slice(), other.as_slice())
    }
}

/// An n×1 [`Matrix`] with vector-flavored convenience methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnVector(Matrix);

impl ColumnVector {
    pub fn from_entries(entries: Vec<BigInt>) -> Self {
        let n = entries.len();
        Self(Matrix::from_rows(n, 1, entries))
    }
    pub fn zeros(n: usize) -> Self {
        Self(Matrix::zeros(n, 1))
    }
    pub fn len(&self) -> usize {
        self.0.rows()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn as_vec(&self) -> Vec<BigInt> {
        self.0.column(0)
    }
    pub fn get(&self, i: usize) -> &BigInt {
        self.0.get(i, 0)
    }
    /// The underlying `Matrix`, for feeding into [`hermite`]/[`gcd_via_echelon`].
    pub fn as_matrix(&self) -> &Matrix {
        &self.0
    }
    /// GCD of the vector's entries, via Hermite reduction of the column (§4.1).
    pub fn gcd(&self) -> BigInt {
        gcd_via_echelon(&self.as_vec())
    }
}

// ============================================================================
// Lexicographic order (§4.1, Testable property 3)
// ============================================================================

/// Result of comparing two row vectors lexicographically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LexOrder {
    LeftGreater,
    RightGreater,
    Equal,
}

/// `level(v)`: index of the first nonzero entry, or `v.len()` if `v` is zero.
pub fn level(v: &[BigInt]) -> usize {
    v.iter().position(|x| !x.is_zero()).unwrap_or(v.len())
}

/// Lexicographic comparison of `x` and `y`, defined via `level(x - y)`.
pub fn compare_lex(x: &[BigInt], y: &[BigInt]) -> LexOrder {
    assert_eq!(x.len(), y.len(), "compare_lex: length mismatch");
    let diff: Vec<BigInt> = x.iter().zip(y).map(|(a, b)| a - b).collect();
    let lvl = level(&diff);
    if lvl == diff.len() {
        LexOrder::Equal
    } else if diff[lvl].is_positive() {
        LexOrder::LeftGreater
    } else {
        LexOrder::RightGreater
    }
}

/// `true` iff `x` is lexicographically strictly positive (level entry > 0).
pub fn is_lex_positive(x: &[BigInt]) -> bool {
    let lvl = level(x);
    lvl < x.len() && x[lvl].is_positive()
}

// ============================================================================
// GCD via echelon reduction (§4.1)
// ============================================================================

/// GCD of an integer vector's entries, computed as `|S[0]|` of the Hermite
/// reduction of the vector viewed as a column matrix.
pub fn gcd_via_echelon(entries: &[BigInt]) -> BigInt {
    if entries.iter().all(|x| x.is_zero()) {
        return BigInt::zero();
    }
    let col = Matrix::from_rows(entries.len(), 1, entries.to_vec());
    let (_, s, _) = hermite(&col);
    s.get(0, 0).abs()
}

// ============================================================================
// Hermite (echelon) reduction (§4.1)
// ============================================================================

fn euclid_step_quotient(a: &BigInt, b: &BigInt) -> BigInt {
    // q = -sign(a*b) * floor(|a|/|b|)
    let sign = (a * b).signum();
    -(sign * (a.abs() / b.abs()))
}

/// Compute unimodular `U` and echelon `S` with `U·A = S`. Returns `(U, S, rank)`.
///
/// Follows the column-by-column sweep of the design document: maintain a
/// pivot row `i0` starting at −1; for each column, if the sub-column below
/// the current pivot is entirely zero, skip it; otherwise clear every row
/// from the bottom up to the new pivot row via repeated skew-then-interchange
/// against the row immediately above, exactly as the Euclidean algorithm
/// reduces a pair of integers.
pub fn hermite(a: &Matrix) -> (Matrix, Matrix, usize) {
    let m = a.rows();
    let mut u = Matrix::identity(m);
    let mut s = a.clone();
    let mut i0: isize = -1;

    for j in 0..s.cols() {
        let lo = (i0 + 1) as usize;
        if (lo..m).all(|i| s.get(i, j).is_zero()) {
            continue;
        }
        i0 += 1;
        let pivot = i0 as usize;
        let mut i = m;
        while i > pivot + 1 {
            i -= 1;
            while !s.get(i, j).is_zero() {
                let a_val = s.get(i - 1, j).clone();
                let b_val = s.get(i, j).clone();
                let q = euclid_step_quotient(&a_val, &b_val);
                s.skew_row(i - 1, i, &q);
                u.skew_row(i - 1, i, &q);
                s.interchange_rows(i - 1, i);
                u.interchange_rows(i - 1, i);
            }
        }
    }
    let rank = (0..m).filter(|&i| s.row(i).iter().any(|x| !x.is_zero())).count();
    (u, s, rank)
}

/// Invert a unimodular square integer matrix by continuing the Hermite sweep
/// into full Gauss–Jordan form (clearing above the diagonal too, then fixing
/// sign so every pivot is `+1`). Used by the planner/rewriter (`U⁻¹` is
/// integer whenever `U` is unimodular, §4.6) and to realize the "modified"
/// echelon variant (`A = V·S` given `U·A = S`, so `V = U⁻¹`, §4.1).
///
/// # Panics
/// Panics if `u` is not unimodular — an internal invariant violation, not a
/// recoverable analysis error (§7: "errors inside the numeric kernel ...
/// are program invariants and treated as fatal").
pub fn invert_unimodular(u: &Matrix) -> Matrix {
    assert_eq!(u.rows(), u.cols(), "invert_unimodular: not square");
    let n = u.rows();
    let mut m = u.clone();
    let mut inv = Matrix::identity(n);

    for col in 0..n {
        if m.get(col, col).is_zero() {
            let found = (col + 1..n).find(|&r| !m.get(r, col).is_zero());
            match found {
                Some(r) => {
                    m.interchange_rows(col, r);
                    inv.interchange_rows(col, r);
                }
                None => panic!("invert_unimodular: singular matrix"),
            }
        }
        for row in (0..n).filter(|&r| r != col) {
            // Mirrors `hermite`'s inner loop exactly, with `col` playing the
            // role of the fixed "upper" slot and `row` the fixed "lower"
            // slot: skew-then-interchange until the lower slot is zero.
            while !m.get(row, col).is_zero() {
                if m.get(col, col).is_zero() {
                    m.interchange_rows(col, row);
                    inv.interchange_rows(col, row);
                    continue;
                }
                let a_val = m.get(col, col).clone();
                let b_val = m.get(row, col).clone();
                let q = euclid_step_quotient(&a_val, &b_val);
                m.skew_row(col, row, &q);
                inv.skew_row(col, row, &q);
                m.interchange_rows(col, row);
                inv.interchange_rows(col, row);
            }
        }
    }
    for i in 0..n {
        if m.get(i, i) == &BigInt::from(-1) {
            m.reverse_row(i);
            inv.reverse_row(i);
        }
    }
    debug_assert!(m.is_identity(), "invert_unimodular: U was not unimodular");
    inv
}

/// "Modified" echelon reduction: compute `V` and `S` with `A = V·S`, mirroring
/// the regular Hermite reduction's row operations but exposing the column
/// transform `V` (the design document's planner needs this orientation when
/// reducing a transposed distance-vector matrix, §4.6).
pub fn hermite_modified(a: &Matrix) -> (Matrix, Matrix, usize) {
    let (u, s, rank) = hermite(a);
    (invert_unimodular(&u), s, rank)
}

// ============================================================================
// Smith (diagonal) normal form (§4.1, Testable property 2)
// ============================================================================

fn floor_div(a: &BigInt, b: &BigInt) -> BigInt {
    a.div_floor(b)
}

fn find_min_abs_nonzero(d: &Matrix, k: usize) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, BigInt)> = None;
    for i in k..d.rows() {
        for j in k..d.cols() {
            let v = d.get(i, j);
            if v.is_zero() {
                continue;
            }
            let mag = v.abs();
            if best.as_ref().map(|(_, _, m)| mag < *m).unwrap_or(true) {
                best = Some((i, j, mag));
            }
        }
    }
    best.map(|(i, j, _)| (i, j))
}

/// Compute unimodular `U`, `V` and diagonal `D` with `U·A·V = D`.
pub fn smith(a: &Matrix) -> (Matrix, Matrix, Matrix) {
    let (m, n) = (a.rows(), a.cols());
    let mut d = a.clone();
    let mut u = Matrix::identity(m);
    let mut v = Matrix::identity(n);
    let kmax = m.min(n);

    for k in 0..kmax {
        loop {
            let Some((i, j)) = find_min_abs_nonzero(&d, k) else {
                break;
            };
            d.interchange_rows(k, i);
            u.interchange_rows(k, i);
            d.interchange_cols(k, j);
            v.interchange_cols(k, j);

            let mut swept_clean = true;
            for r in (k + 1)..m {
                if !d.get(r, k).is_zero() {
                    let q = floor_div(d.get(r, k), d.get(k, k));
                    d.skew_row(r, k, &(-&q));
                    u.skew_row(r, k, &(-&q));
                    if !d.get(r, k).is_zero() {
                        swept_clean = false;
                    }
                }
            }
            for c in (k + 1)..n {
                if !d.get(k, c).is_zero() {
                    let q = floor_div(d.get(k, c), d.get(k, k));
                    d.skew_col(c, k, &(-&q));
                    v.skew_col(c, k, &(-&q));
                    if !d.get(k, c).is_zero() {
                        swept_clean = false;
                    }
                }
            }
            if !swept_clean {
                continue;
            }
            // Divisibility fixup: every remaining entry in the trailing minor
            // must be divisible by the new pivot, or the pivot isn't yet the
            // true minimum of the *ideal* generated by the trailing minor.
            let pivot = d.get(k, k).clone();
            let mut bad = None;
            'search: for r in (k + 1)..m {
                for c in (k + 1)..n {
                    if !d.get(r, c).is_divisible_by(&pivot) {
                        bad = Some(r);
                        break 'search;
                    }
                }
            }
            match bad {
                Some(r) => {
                    d.skew_row(k, r, &BigInt::one());
                    u.skew_row(k, r, &BigInt::one());
                }
                None => break,
            }
        }
    }
    for i in 0..kmax {
        if d.get(i, i).is_negative() {
            d.reverse_row(i);
            u.reverse_row(i);
        }
    }
    (u, v, d)
}

trait Divisible {
    fn is_divisible_by(&self, other: &BigInt) -> bool;
}
impl Divisible for BigInt {
    fn is_divisible_by(&self, other: &BigInt) -> bool {
        if other.is_zero() {
            self.is_zero()
        } else {
            (self % other).is_zero()
        }
    }
}

/// Rank of a matrix: the number of nonzero rows of its Hermite reduction.
pub fn rank(a: &Matrix) -> usize {
    hermite(a).2
}

// ============================================================================
// Rational matrix (used by the Fourier–Motzkin engine, §4.3)
// ============================================================================

/// A dense `rows` × `cols` matrix of exact rationals, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RatMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Rational>,
}

impl RatMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![Rational::zero(); rows * cols] }
    }
    pub fn from_rows(rows: usize, cols: usize, data: Vec<Rational>) -> Self {
        assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }
    pub fn from_int_matrix(m: &Matrix) -> Self {
        let data = m.data.iter().map(|x| Rational::from_int(x.clone())).collect();
        Self { rows: m.rows, cols: m.cols, data }
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn get(&self, r: usize, c: usize) -> &Rational {
        &self.data[r * self.cols + c]
    }
    pub fn set(&mut self, r: usize, c: usize, v: Rational) {
        self.data[r * self.cols + c] = v;
    }
    pub fn row(&self, r: usize) -> &[Rational] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }
    pub fn matmul(&self, rhs: &RatMatrix) -> RatMatrix {
        assert_eq!(self.cols, rhs.rows);
        let mut out = RatMatrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut acc = Rational::zero();
                for k in 0..self.cols {
                    acc = &acc + &(self.get(i, k) * rhs.get(k, j));
                }
                out.set(i, j, acc);
            }
        }
        out
    }
    pub fn scale_col(&mut self, c: usize, by: &Rational) {
        for r in 0..self.rows {
            let v = self.get(r, c) * by;
            self.set(r, c, v);
        }
    }
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
    fn hermite_satisfies_u_a_eq_s_and_u_unimodular() {
        let a = Matrix::from_rows(3, 2, bv(&[2, 4, 3, 6, 5, 10]));
        let (u, s, rank) = hermite(&a);
        assert_eq!(u.matmul(&a), s);
        assert!(u.is_unimodular());
        let nonzero_rows = (0..s.rows()).filter(|&i| s.row(i).iter().any(|x| !x.is_zero())).count();
        assert_eq!(rank, nonzero_rows);
    }

    #[test]
    fn smith_satisfies_u_a_v_eq_d_diagonal_and_unimodular() {
        let a = Matrix::from_rows(2, 2, bv(&[2, 4, 6, 8]));
        let (u, v, d) = smith(&a);
        let lhs = u.matmul(&a).matmul(&v);
        assert_eq!(lhs, d);
        assert!(u.is_unimodular());
        assert!(v.is_unimodular());
        for i in 0..d.rows() {
            for j in 0..d.cols() {
                if i != j {
                    assert!(d.get(i, j).is_zero(), "off-diagonal nonzero at ({i},{j})");
                }
            }
        }
    }

    #[test]
    fn lexicographic_order_reflexive_and_symmetric() {
        let x = bv(&[0, 1, -2]);
        let y = bv(&[0, 0, 5]);
        assert_eq!(compare_lex(&x, &x), LexOrder::Equal);
        let xy = compare_lex(&x, &y);
        let yx = compare_lex(&y, &x);
        match (xy, yx) {
            (LexOrder::RightGreater, LexOrder::LeftGreater) => {}
            (LexOrder::LeftGreater, LexOrder::RightGreater) => {}
            (LexOrder::Equal, LexOrder::Equal) => {}
            other => panic!("asymmetric compare_lex: {other:?}"),
        }
    }

    #[test]
    fn gcd_via_echelon_matches_expectation() {
        assert_eq!(gcd_via_echelon(&bv(&[6, 4, 10])), bi(2));
        assert_eq!(gcd_via_echelon(&bv(&[0, 0, 0])), bi(0));
    }

    #[test]
    fn invert_unimodular_round_trips() {
        let mut u = Matrix::identity(3);
        u.skew_row(0, 1, &bi(2));
        u.interchange_rows(1, 2);
        let inv = invert_unimodular(&u);
        assert!(u.matmul(&inv).is_identity());
    }

    #[test]
    fn row_vector_dot_and_lex() {
        let a = RowVector::from_entries(bv(&[1, 2, 3]));
        let b = RowVector::from_entries(bv(&[1, 0, 0]));
        assert_eq!(a.dot(&b), bi(1));
        assert_eq!(a.neg().get(0), &bi(-1));
    }
}
