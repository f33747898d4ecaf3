//! Affine intermediate representation (§3): linear forms over loop
//! indices, array subscripts, assignment statements, loop headers, and
//! perfect loop nests.

use std::collections::{BTreeMap, BTreeSet};

use num_bigint::BigInt;
use num_traits::Zero;

use crate::ast::{AstProvider, BinOp, DeclId, ExprId, ExprKind, UnOp};

/// Index of a loop nesting level, `0..depth-1`, outermost first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoopLevel(pub usize);

/// An expression failed to reduce to an affine combination of index
/// variables (§3, §7).
#[derive(Debug, thiserror::Error)]
pub enum AffineIrError {
    #[error("expression is not affine in the enclosing index variables")]
    NotAffine,
}

/// `a0 + sum_i a_i * v_i`, stored with no zero-coefficient entries (§3
/// invariant: "no variable maps to the null variable").
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinearForm {
    coeffs: BTreeMap<DeclId, BigInt>,
    constant: BigInt,
}

impl LinearForm {
    pub fn zero() -> Self {
        Self { coeffs: BTreeMap::new(), constant: BigInt::zero() }
    }

    pub fn constant(c: impl Into<BigInt>) -> Self {
        Self { coeffs: BTreeMap::new(), constant: c.into() }
    }

    pub fn variable(v: DeclId) -> Self {
        let mut f = Self::zero();
        f.insert(v, BigInt::from(1));
        f
    }

    /// Overwrite the coefficient of `v` with `c`, dropping the entry if `c`
    /// is zero.
    pub fn insert(&mut self, v: DeclId, c: BigInt) {
        if c.is_zero() {
            self.coeffs.remove(&v);
        } else {
            self.coeffs.insert(v, c);
        }
    }

    pub fn add_to_coefficient(&mut self, v: DeclId, c: &BigInt) {
        let next = self.coeffs.get(&v).cloned().unwrap_or_else(BigInt::zero) + c;
        self.insert(v, next);
    }

    pub fn add_to_constant(&mut self, c: &BigInt) {
        self.constant += c;
    }

    /// Coefficient of `v`, or `None` if `v` does not appear.
    pub fn coefficient_of(&self, v: DeclId) -> Option<&BigInt> {
        self.coeffs.get(&v)
    }

    pub fn constant_term(&self) -> &BigInt {
        &self.constant
    }

    /// Variables referenced, in key order.
    pub fn variables(&self) -> impl Iterator<Item = &DeclId> {
        self.coeffs.keys()
    }

    pub fn negate(mut self) -> Self {
        for c in self.coeffs.values_mut() {
            *c = -c.clone();
        }
        self.constant = -self.constant;
        self
    }

    pub fn add(mut self, other: &LinearForm) -> Self {
        for (v, c) in &other.coeffs {
            self.add_to_coefficient(*v, c);
        }
        self.constant += &other.constant;
        self
    }

    pub fn sub(self, other: &LinearForm) -> Self {
        self.add(&other.clone().negate())
    }

    pub fn scale(mut self, by: &BigInt) -> Self {
        for c in self.coeffs.values_mut() {
            *c *= by;
        }
        self.constant *= by;
        self
    }
}

pub(crate) fn strip_cast(ast: &dyn AstProvider, mut e: ExprId) -> ExprId {
    while let ExprKind::Cast(inner) = ast.expr_kind(e) {
        e = inner;
    }
    e
}

/// Deserialize a source expression into a [`LinearForm`] (§3's
/// deserialization rule, verbatim): integer-valued constants, a DRE of an
/// unknown variable (coefficient ±1), and binary `+`/`-`/`*` where every
/// `*` has at least one compile-time-evaluable operand and the other a
/// bare DRE.
pub fn build_linear_form(ast: &dyn AstProvider, expr: ExprId) -> Result<LinearForm, AffineIrError> {
    let e = strip_cast(ast, expr);
    if let Some(n) = ast.eval_const_int(e) {
        return Ok(LinearForm::constant(n));
    }
    match ast.expr_kind(e) {
        ExprKind::IntLiteral(n) => Ok(LinearForm::constant(n)),
        ExprKind::DeclRef(d) => Ok(LinearForm::variable(d)),
        ExprKind::UnaryOp { op: UnOp::Neg, operand } => Ok(build_linear_form(ast, operand)?.negate()),
        ExprKind::BinaryOp { op: BinOp::Add, lhs, rhs } => {
            Ok(build_linear_form(ast, lhs)?.add(&build_linear_form(ast, rhs)?))
        }
        ExprKind::BinaryOp { op: BinOp::Sub, lhs, rhs } => {
            Ok(build_linear_form(ast, lhs)?.sub(&build_linear_form(ast, rhs)?))
        }
        ExprKind::BinaryOp { op: BinOp::Mul, lhs, rhs } => build_product(ast, lhs, rhs),
        _ => Err(AffineIrError::NotAffine),
    }
}

fn build_product(ast: &dyn AstProvider, lhs: ExprId, rhs: ExprId) -> Result<LinearForm, AffineIrError> {
    let lhs_c = ast.eval_const_int(strip_cast(ast, lhs));
    let rhs_c = ast.eval_const_int(strip_cast(ast, rhs));
    match (lhs_c, rhs_c) {
        (Some(a), Some(b)) => Ok(LinearForm::constant(a * b)),
        (Some(scalar), None) => scale_by_dre(ast, rhs, &scalar),
        (None, Some(scalar)) => scale_by_dre(ast, lhs, &scalar),
        (None, None) => Err(AffineIrError::NotAffine),
    }
}

fn scale_by_dre(ast: &dyn AstProvider, maybe_dre: ExprId, scalar: &BigInt) -> Result<LinearForm, AffineIrError> {
    match ast.expr_kind(strip_cast(ast, maybe_dre)) {
        ExprKind::DeclRef(d) => Ok(LinearForm::variable(d).scale(scalar)),
        _ => Err(AffineIrError::NotAffine),
    }
}

/// (array, ordered sequence of linear forms, one per dimension) — §3.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArraySubscript {
    pub array: DeclId,
    pub dims: Vec<LinearForm>,
}

impl ArraySubscript {
    pub fn dimensionality(&self) -> usize {
        self.dims.len()
    }
}

/// (LHS subscript, RHS subscripts flattened from the RHS expression tree) — §3.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentStatement {
    pub lhs: ArraySubscript,
    pub rhs: Vec<ArraySubscript>,
}

/// One loop header: index variable, lower bound, upper bound (already
/// normalized from a strict `<` condition to an inclusive bound), and an
/// optional nested header (§3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopHeader {
    pub index_var: DeclId,
    pub lower: LinearForm,
    pub upper: LinearForm,
    pub child: Option<Box<LoopHeader>>,
}

impl LoopHeader {
    /// Depth of the nest rooted at `self` (number of loop levels).
    pub fn depth(&self) -> usize {
        1 + self.child.as_ref().map(|c| c.depth()).unwrap_or(0)
    }

    /// Index variables outermost-first.
    pub fn index_vars(&self) -> Vec<DeclId> {
        let mut out = vec![self.index_var];
        if let Some(c) = &self.child {
            out.extend(c.index_vars());
        }
        out
    }
}

/// A complete perfect loop nest (§3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerfectLoopNest {
    pub outermost: LoopHeader,
    pub indices: Vec<DeclId>,
    pub assignments: Vec<AssignmentStatement>,
    pub inputs: BTreeSet<DeclId>,
    pub outputs: BTreeSet<DeclId>,
    pub depth: usize,
}

impl PerfectLoopNest {
    pub fn level_of(&self, v: DeclId) -> Option<LoopLevel> {
        self.indices.iter().position(|&i| i == v).map(LoopLevel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: u32) -> DeclId {
        DeclId(n)
    }

    #[test]
    fn linear_form_drops_zero_coefficients() {
        let mut f = LinearForm::variable(d(0));
        f.add_to_coefficient(d(0), &BigInt::from(-1));
        assert!(f.coefficient_of(d(0)).is_none());
    }

    #[test]
    fn add_and_sub_are_consistent() {
        let a = LinearForm::variable(d(0)).scale(&BigInt::from(3));
        let b = LinearForm::variable(d(0));
        let sum = a.clone().add(&b);
        assert_eq!(sum.coefficient_of(d(0)), Some(&BigInt::from(4)));
        let diff = sum.sub(&b);
        assert_eq!(diff.coefficient_of(d(0)), Some(&BigInt::from(3)));
    }

    #[test]
    fn subscript_dimensionality_matches_dims_len() {
        let s = ArraySubscript { array: d(1), dims: vec![LinearForm::zero(), LinearForm::zero()] };
        assert_eq!(s.dimensionality(), 2);
    }

    #[test]
    fn header_depth_counts_nested_children() {
        let inner = LoopHeader { index_var: d(1), lower: LinearForm::zero(), upper: LinearForm::zero(), child: None };
        let outer =
            LoopHeader { index_var: d(0), lower: LinearForm::zero(), upper: LinearForm::zero(), child: Some(Box::new(inner)) };
        assert_eq!(outer.depth(), 2);
        assert_eq!(outer.index_vars(), vec![d(0), d(1)]);
    }
}
