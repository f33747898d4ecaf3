//! Source AST provider — the consumed boundary (§6).
//!
//! The concrete host-language AST is explicitly out of scope (§1); this
//! module only defines the trait a front-end must implement and the handle
//! types the rest of the crate carries instead of raw pointers. Per the
//! arena design note (§9): nodes are owned by whatever implements
//! [`AstProvider`], and every other module threads opaque indices
//! (`FunctionId`, `StmtId`, `ExprId`, `DeclId`) rather than references into
//! that arena.

use num_bigint::BigInt;

macro_rules! handle {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

handle!(FunctionId);
handle!(StmtId);
handle!(ExprId);
handle!(DeclId);

/// File/line/column of an expression, used verbatim in the
/// `"<file>(<line>): info: <message>"` diagnostic format (§6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Binary operator opcode, as seen on a [`ExprKind::BinaryOp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Assign,
    Lt,
    Le,
    Other,
}

/// Unary operator opcode, as seen on a [`ExprKind::UnaryOp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    PreInc,
    PostInc,
    Neg,
    Other,
}

/// Discriminant for a statement (§6: "distinguish compound, for, while, do,
/// switch, if-else, declaration, assignment, ...").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StmtKind {
    Compound(Vec<StmtId>),
    For { init: StmtId, cond: ExprId, step: ExprId, body: StmtId },
    While { cond: ExprId, body: StmtId },
    Do { body: StmtId, cond: ExprId },
    Switch { scrutinee: ExprId, body: StmtId },
    IfElse { cond: ExprId, then_branch: StmtId, else_branch: Option<StmtId> },
    Decl(DeclId),
    /// A binary `=` expression statement; `§3`'s Assignment statement is
    /// built from these by the front-end collector, not by this trait.
    Assignment { lhs: ExprId, rhs: ExprId },
    Expr(ExprId),
}

/// Discriminant for an expression (§6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    BinaryOp { op: BinOp, lhs: ExprId, rhs: ExprId },
    UnaryOp { op: UnOp, operand: ExprId },
    /// A DRE (declaration reference expression) with a resolvable `VarDecl`.
    DeclRef(DeclId),
    IntLiteral(BigInt),
    Subscript { base: ExprId, index: ExprId },
    Call { callee: String, args: Vec<ExprId> },
    /// Transparent: the front-end looks through a cast to its operand.
    Cast(ExprId),
}

/// Coarse declaration type (§6: "constant-array, pointer, integer, other").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclType {
    ConstantArray,
    Pointer,
    Integer,
    Other,
}

/// Everything the front-end needs about one declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclInfo {
    pub name: String,
    pub decl_type: DeclType,
    pub element_type: String,
    /// Per-dimension compile-time sizes, where statically known (§3's
    /// array-like-identifier size discovery starts from here).
    pub static_sizes: Vec<Option<u64>>,
    pub initializer: Option<ExprId>,
    /// Byte size of one element of `element_type`, when the front-end can
    /// report it. Needed to turn a `malloc`/`calloc` byte count into an
    /// element count (§3).
    pub elem_size_bytes: Option<u64>,
}

/// The trait a host-language front-end implements; every other module in
/// this crate only ever walks an AST through this interface.
pub trait AstProvider {
    fn functions(&self) -> Vec<FunctionId>;
    fn function_name(&self, f: FunctionId) -> &str;
    fn function_body(&self, f: FunctionId) -> StmtId;

    fn stmt_kind(&self, s: StmtId) -> StmtKind;
    fn stmt_location(&self, s: StmtId) -> SourceLocation;

    fn expr_kind(&self, e: ExprId) -> ExprKind;
    fn expr_location(&self, e: ExprId) -> SourceLocation;
    /// Evaluate `e` as a compile-time integer constant, if possible.
    fn eval_const_int(&self, e: ExprId) -> Option<BigInt>;

    fn decl_info(&self, d: DeclId) -> DeclInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_ordered_by_index() {
        assert!(FunctionId(0) < FunctionId(1));
        assert_eq!(StmtId(3), StmtId(3));
    }
}
