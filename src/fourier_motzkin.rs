//! Fourier–Motzkin elimination: real feasibility, bound extraction, and
//! chunked integer enumeration (§4.3).
//!
//! [`eliminate`] works over exact rationals in place, eliminating variables
//! from `m` down to `1` exactly as the design document describes: partition
//! the current inequalities by the sign of the coefficient of the variable
//! being eliminated, normalize, derive upper/lower bound sets over the
//! remaining (enclosing) variables, and fold `|P|·|N|` pairwise differences
//! plus the `|Z|` carried-over rows into the next round's system.
//!
//! [`enumerate_integer_points`] walks the resulting bound sets depth-first
//! and streams solutions in bounded [`IntegerPointChunks`], grounded in the
//! teacher's `stream.rs` tile-chunking discipline (see SPEC_FULL.md
//! AMBIENT-4) rather than materializing an unbounded solution set.

use num_bigint::BigInt;
use num_traits::Zero;

use crate::matrix::{Matrix, RatMatrix};
use crate::rational::Rational;

/// A set of candidate bounds over `vars` enclosing variables: each column
/// `j` is one candidate bound `consts[j] + coeffs[.., j]·(x_1..x_vars)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundSet {
    pub coeffs: RatMatrix,
    pub consts: Vec<Rational>,
}

impl BoundSet {
    fn empty(vars: usize) -> Self {
        Self { coeffs: RatMatrix::zeros(vars, 0), consts: Vec::new() }
    }

    fn count(&self) -> usize {
        self.consts.len()
    }

    /// Evaluate candidate bound `j` at the given (already-fixed) prefix.
    fn eval(&self, j: usize, prefix: &[BigInt]) -> Rational {
        let mut acc = self.consts[j].clone();
        for (i, x) in prefix.iter().enumerate() {
            acc = &acc + &(&Rational::from_int(x.clone()) * self.coeffs.get(i, j));
        }
        acc
    }
}

/// Lower and upper bound candidates for one variable, over the variables
/// that enclose it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableBounds {
    pub lower: BoundSet,
    pub upper: BoundSet,
}

/// Result of [`eliminate`]: feasibility plus, for each variable `1..=m` (in
/// that order), the bound candidates derived over its enclosing variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FmResult {
    pub feasible: bool,
    /// `bounds[k]` is variable `k+1`'s bounds, over variables `1..=k`.
    pub bounds: Vec<VariableBounds>,
}

fn sign(r: &Rational) -> std::cmp::Ordering {
    r.cmp(&Rational::zero())
}

/// Solve `x·A ≤ c` for real feasibility and per-variable bound sets.
///
/// `A` is `m`×`n`, `c` has length `n`. When `m == 0` the procedure
/// degenerates to checking every `c[j] ≥ 0` (§4.3).
pub fn eliminate(a: &Matrix, c: &[BigInt]) -> FmResult {
    assert_eq!(a.cols(), c.len(), "eliminate: A/c column-count mismatch");
    let m = a.rows();
    if m == 0 {
        let feasible = c.iter().all(|x| !x.is_negative());
        return FmResult { feasible, bounds: Vec::new() };
    }

    let mut t = RatMatrix::from_int_matrix(a);
    let mut q: Vec<Rational> = c.iter().map(|x| Rational::from_int(x.clone())).collect();
    let mut bounds: Vec<Option<VariableBounds>> = (0..m).map(|_| None).collect();

    for r in (1..=m).rev() {
        let row_idx = r - 1;
        let enclosing = row_idx;
        let cols = t.cols();

        let mut p = Vec::new();
        let mut neg = Vec::new();
        let mut z = Vec::new();
        for j in 0..cols {
            match sign(t.get(row_idx, j)) {
                std::cmp::Ordering::Greater => p.push(j),
                std::cmp::Ordering::Less => neg.push(j),
                std::cmp::Ordering::Equal => z.push(j),
            }
        }

        for &j in p.iter().chain(neg.iter()) {
            let denom = t.get(row_idx, j).clone();
            for i in 0..=row_idx {
                let v = t.get(i, j) / &denom;
                t.set(i, j, v);
            }
            q[j] = &q[j] / &denom;
        }

        let mut upper = BoundSet::empty(enclosing);
        upper.coeffs = RatMatrix::zeros(enclosing, p.len());
        for (col_idx, &j) in p.iter().enumerate() {
            for i in 0..enclosing {
                upper.coeffs.set(i, col_idx, -t.get(i, j).clone());
            }
            upper.consts.push(q[j].clone());
        }
        let mut lower = BoundSet::empty(enclosing);
        lower.coeffs = RatMatrix::zeros(enclosing, neg.len());
        for (col_idx, &j) in neg.iter().enumerate() {
            for i in 0..enclosing {
                lower.coeffs.set(i, col_idx, t.get(i, j).clone());
            }
            lower.consts.push(-&q[j]);
        }
        bounds[row_idx] = Some(VariableBounds { lower, upper });

        if r == 1 {
            let z_ok = z.iter().all(|&j| q[j] >= Rational::zero());
            let b1 = neg.iter().map(|&j| -&q[j]).max();
            let big_b1 = p.iter().map(|&j| q[j].clone()).min();
            let bound_ok = match (b1, big_b1) {
                (Some(lo), Some(hi)) => lo <= hi,
                _ => true,
            };
            return FmResult {
                feasible: z_ok && bound_ok,
                bounds: bounds.into_iter().map(|b| b.expect("every level filled")).collect(),
            };
        }

        let next_cols = p.len() * neg.len() + z.len();
        let mut next_t = RatMatrix::zeros(enclosing, next_cols);
        let mut next_q = Vec::with_capacity(next_cols);
        let mut cursor = 0;
        for &jn in &neg {
            for &jp in &p {
                for i in 0..enclosing {
                    let v = t.get(i, jn) + t.get(i, jp);
                    next_t.set(i, cursor, v);
                }
                next_q.push(&q[jn] + &q[jp]);
                cursor += 1;
            }
        }
        for &j in &z {
            for i in 0..enclosing {
                next_t.set(i, cursor, t.get(i, j).clone());
            }
            next_q.push(q[j].clone());
            cursor += 1;
        }
        t = next_t;
        q = next_q;
    }
    unreachable!("eliminate: loop always returns at r == 1 when m >= 1");
}

/// Pure feasibility check (drops the bound sets).
pub fn is_feasible(a: &Matrix, c: &[BigInt]) -> bool {
    eliminate(a, c).feasible
}

/// One fully-assigned integer point, `x_1..x_m` in order.
pub type IntegerPoint = Vec<BigInt>;

/// Errors from integer enumeration.
#[derive(Debug, thiserror::Error)]
pub enum EnumerationError {
    #[error("variable {0} (1-indexed) has no finite {1} bound; integer enumeration would be unbounded")]
    InfiniteSolutionSet(usize, &'static str),
}

/// A restartable sequence of bounded chunks of integer points (AMBIENT-4).
///
/// Contract: every solution is emitted exactly once, in depth-first order;
/// no chunk exceeds the configured chunk size.
pub struct IntegerPointChunks {
    chunks: std::vec::IntoIter<Vec<IntegerPoint>>,
}

impl Iterator for IntegerPointChunks {
    type Item = Vec<IntegerPoint>;
    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next()
    }
}

/// Enumerate every integer point satisfying `bounds` (depth-first, §4.3),
/// grouped into chunks of at most `chunk_size` points.
pub fn enumerate_integer_points(
    bounds: &[VariableBounds],
    chunk_size: usize,
) -> Result<IntegerPointChunks, EnumerationError> {
    assert!(chunk_size > 0, "enumerate_integer_points: chunk_size must be positive");
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    let mut prefix = Vec::new();
    recurse(bounds, 0, &mut prefix, &mut current, &mut chunks, chunk_size)?;
    if !current.is_empty() {
        chunks.push(current);
    }
    Ok(IntegerPointChunks { chunks: chunks.into_iter() })
}

fn recurse(
    bounds: &[VariableBounds],
    depth: usize,
    prefix: &mut Vec<BigInt>,
    current: &mut Vec<IntegerPoint>,
    chunks: &mut Vec<Vec<IntegerPoint>>,
    chunk_size: usize,
) -> Result<(), EnumerationError> {
    if depth == bounds.len() {
        current.push(prefix.clone());
        if current.len() == chunk_size {
            chunks.push(std::mem::take(current));
        }
        return Ok(());
    }
    let vb = &bounds[depth];
    if vb.lower.count() == 0 {
        return Err(EnumerationError::InfiniteSolutionSet(depth + 1, "lower"));
    }
    if vb.upper.count() == 0 {
        return Err(EnumerationError::InfiniteSolutionSet(depth + 1, "upper"));
    }
    let lo = (0..vb.lower.count())
        .map(|j| vb.lower.eval(j, prefix))
        .max()
        .expect("nonempty lower set")
        .ceil();
    let hi = (0..vb.upper.count())
        .map(|j| vb.upper.eval(j, prefix))
        .min()
        .expect("nonempty upper set")
        .floor();
    if lo > hi {
        return Ok(());
    }
    let mut v = lo;
    while v <= hi {
        prefix.push(v.clone());
        recurse(bounds, depth + 1, prefix, current, chunks, chunk_size)?;
        prefix.pop();
        v += BigInt::from(1);
    }
    Ok(())
}
