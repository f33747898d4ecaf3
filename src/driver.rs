//! Per-translation-unit orchestration (§5): walks functions and their
//! candidate nests in source order, drives each nest through the
//! frontend → dependence → planner → rewriter pipeline, and isolates
//! per-nest failures so one rejected nest never stops the unit.

use num_bigint::BigInt;
use num_traits::Zero;
use tracing::{debug, info_span, warn};

use crate::ast::{AstProvider, FunctionId, StmtId};
use crate::dependence::{self, DependenceSets};
use crate::dependence_model::{self, NestModel, SubscriptModel};
use crate::diagnostics::{self, AnalysisError};
use crate::frontend::{self, NestCollector, ScopeId, ScopeTree, ScopeTreeBuilder};
use crate::planner::{self, Plan, TransformKind};
use crate::rewriter::{self, RewrittenNest};

/// Knobs the algorithms in §4 leave implementation-defined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Safety valve on §4.3's integer enumeration: a nest whose dependence
    /// tests would enumerate more points than this is rejected as
    /// `NotParallelizable` rather than left to run unbounded.
    pub max_integer_enumeration_points: Option<usize>,
    /// Tile length for the chunked enumeration in `fourier_motzkin`.
    pub fm_chunk_size: usize,
    /// When `false` (default), a translation unit with no transformed
    /// nest writes none of the three emitted files (§6).
    pub emit_even_if_no_transform: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { max_integer_enumeration_points: None, fm_chunk_size: 256, emit_even_if_no_transform: false }
    }
}

/// Outcome of successfully analyzing one candidate nest.
#[derive(Debug)]
pub struct NestReport {
    pub function: FunctionId,
    pub candidate: StmtId,
    pub plan: Plan,
    pub rewritten: Option<RewrittenNest>,
}

pub struct Driver<'a> {
    ast: &'a dyn AstProvider,
    config: AnalysisConfig,
}

impl<'a> Driver<'a> {
    pub fn new(ast: &'a dyn AstProvider, config: AnalysisConfig) -> Self {
        Self { ast, config }
    }

    /// Walk every function in source order, analyze every candidate nest,
    /// and return one outcome per candidate. Per-nest errors are logged
    /// and do not stop the walk (§5).
    pub fn run(&self) -> Vec<(StmtId, Result<NestReport, AnalysisError>)> {
        let mut out = Vec::new();
        for function in self.ast.functions() {
            let body = self.ast.function_body(function);
            let mut collector = NestCollector::new();
            collector.collect(self.ast, function, body);
            let (scopes, for_scopes) = ScopeTreeBuilder::build(self.ast, body);
            for &(func, candidate) in collector.candidates() {
                let location = self.ast.stmt_location(candidate);
                let span = info_span!("analyze_nest", function = self.ast.function_name(func), line = location.line);
                let _enter = span.enter();

                let scope = *for_scopes
                    .get(&candidate)
                    .expect("ScopeTreeBuilder and NestCollector walk the same for-statements");
                let result = self.analyze_one(func, candidate, &scopes, scope);
                if let Err(e) = &result {
                    warn!("{}", diagnostics::format_diagnostic(&location, &e.to_string()));
                }
                out.push((candidate, result.map(|(plan, rewritten)| NestReport { function: func, candidate, plan, rewritten })));
            }
        }
        out
    }

    fn analyze_one(
        &self,
        _function: FunctionId,
        candidate: StmtId,
        scopes: &ScopeTree,
        scope: ScopeId,
    ) -> Result<(Plan, Option<RewrittenNest>), AnalysisError> {
        let nest = frontend::build_nest(self.ast, scopes, scope, candidate)?;
        let model = dependence_model::build(&nest);
        analyze_model(&model, nest.depth, &self.config)
    }
}

/// Run the dependence analyzer, planner, and rewriter over an
/// already-built dependence model. Free of the `AstProvider` boundary so
/// it can be driven directly once a nest has been lowered.
pub fn analyze_model(
    model: &NestModel,
    nest_depth: usize,
    config: &AnalysisConfig,
) -> Result<(Plan, Option<RewrittenNest>), AnalysisError> {
    let distances = collect_distances(model, config.fm_chunk_size)?;
    let plan = planner::plan(&distances, nest_depth)?;
    debug!(kind = ?plan.kind, k = plan.k, "planner decision");

    let rewritten = match plan.kind {
        TransformKind::None => None,
        _ => {
            let p = dependence::canonical_bound_matrix(&model.lower.0);
            let q = dependence::canonical_bound_matrix(&model.upper.0);
            let fm = planner::new_bounds(&plan.u, &p, &model.lower.1, &q, &model.upper.1);
            Some(rewriter::build(&plan.u, &fm))
        }
    };
    Ok((plan, rewritten))
}

/// Every LHS-vs-other-LHS distinct-statement pair and every LHS-vs-RHS
/// pair referencing the same array (§4.5), dispatched between the
/// uniform and general linear tests and flattened to a zero-free
/// distance set ready for the planner.
fn collect_distances(model: &NestModel, fm_chunk_size: usize) -> Result<Vec<Vec<BigInt>>, AnalysisError> {
    let m = model.lower.0.rows();
    let p = dependence::canonical_bound_matrix(&model.lower.0);
    let q = dependence::canonical_bound_matrix(&model.upper.0);
    let regular = model.lower.0 == model.upper.0;

    let mut refs: Vec<(usize, bool, &SubscriptModel)> = Vec::new();
    for (i, a) in model.assignments.iter().enumerate() {
        refs.push((i, true, &a.lhs));
        for r in &a.rhs {
            refs.push((i, false, r));
        }
    }

    let mut distances = Vec::new();
    for i in 0..refs.len() {
        for j in (i + 1)..refs.len() {
            let (si, lhs_i, a) = refs[i];
            let (sj, lhs_j, b) = refs[j];
            if a.array != b.array || !(lhs_i || lhs_j) {
                continue;
            }
            let distinct_statements = si != sj;
            let sets = if regular && a.coeffs == b.coeffs {
                dependence::uniform_test(m, &p, &model.lower.1, &model.upper.1, a, b, distinct_statements, fm_chunk_size)?
            } else {
                dependence::general_test(m, &p, &model.lower.1, &q, &model.upper.1, a, b, distinct_statements, fm_chunk_size)?
            };
            push_nonzero_distances(&mut distances, sets);
        }
    }
    Ok(distances)
}

fn push_nonzero_distances(out: &mut Vec<Vec<BigInt>>, sets: DependenceSets) {
    for r in sets.t_on_s.into_iter().chain(sets.s_on_t) {
        if r.distance.iter().any(|x| !x.is_zero()) {
            out.push(r.distance);
        }
    }
}
