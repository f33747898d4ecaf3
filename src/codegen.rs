//! Code-shape generator (§4.8): device array symbols, the
//! allocation/release and host↔device transfer shapes, launch
//! configuration, and kernel body shape. Textual pretty-printing into a
//! concrete `.cu`/`.cuh` file is out of scope (§1); this module only
//! produces the structured shape that contract binds.

use std::collections::BTreeSet;

/// A compile-time-known size, or a named size parameter carried alongside
/// the array when the dimension is not statically known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimSize {
    pub param_name: String,
    pub constant: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceArraySymbol {
    pub host_name: String,
    pub device_name: String,
    pub element_type: String,
    pub dims: Vec<DimSize>,
}

impl DeviceArraySymbol {
    pub fn dimensionality(&self) -> usize {
        self.dims.len()
    }
}

pub fn device_symbol(host_name: &str, element_type: &str, dims: Vec<DimSize>) -> DeviceArraySymbol {
    DeviceArraySymbol {
        host_name: host_name.to_string(),
        device_name: format!("__dev_{host_name}"),
        element_type: element_type.to_string(),
        dims,
    }
}

/// Allocation/release shape (§4.8): device-side allocation sized as the
/// product of host sizes times `sizeof(elem)`, plus a temporary 1-D host
/// staging buffer when the array is multi-dimensional.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayAllocation {
    pub symbol: DeviceArraySymbol,
    pub element_size_bytes: u64,
    pub needs_host_staging_buffer: bool,
}

pub fn plan_allocation(symbol: DeviceArraySymbol, element_size_bytes: u64) -> ArrayAllocation {
    let needs_host_staging_buffer = symbol.dimensionality() > 1;
    ArrayAllocation { symbol, element_size_bytes, needs_host_staging_buffer }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferDirection {
    HostToDevice,
    DeviceToHost,
}

/// Host↔device transfer shape: a single bulk copy for 1-D arrays; for
/// multi-D arrays, row-by-row flattening through the staging buffer
/// followed by one bulk copy, with a synchronization barrier after the
/// last copy (§4.8).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferPlan {
    pub direction: TransferDirection,
    pub array: DeviceArraySymbol,
    pub row_by_row: bool,
}

pub fn plan_transfer(direction: TransferDirection, array: &DeviceArraySymbol) -> TransferPlan {
    TransferPlan { direction, array: array.clone(), row_by_row: array.dimensionality() > 1 }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockDim {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// Block dimensions for `parallel_loops` parallel loops (§4.8): `512×1×1`,
/// `32×16×1`, `8×8×8` for one, two, three parallel loops respectively.
///
/// # Panics
/// Panics if `parallel_loops` is `0` or more than `3` — the planner never
/// reports more parallel loops than the code-shape generator can map onto
/// `blockIdx`/`threadIdx`'s three dimensions.
pub fn block_dim_for(parallel_loops: usize) -> BlockDim {
    match parallel_loops {
        1 => BlockDim { x: 512, y: 1, z: 1 },
        2 => BlockDim { x: 32, y: 16, z: 1 },
        3 => BlockDim { x: 8, y: 8, z: 8 },
        other => panic!("block_dim_for: unsupported parallel-loop count {other}"),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDim {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

fn ceil_div(n: u64, d: u32) -> u32 {
    (((n + d as u64 - 1) / d as u64).max(1)) as u32
}

/// Grid dimensions: `ceil(iteration_count / block_dim)` per parallel
/// dimension, unused dimensions filled with `1`. `iteration_counts` is
/// ordered innermost-parallel-loop-first, matching the `x, y, z` mapping.
pub fn grid_dim_for(iteration_counts: &[u64], block: BlockDim) -> GridDim {
    let block_arr = [block.x, block.y, block.z];
    let mut dims = [1u32; 3];
    for (i, &count) in iteration_counts.iter().enumerate().take(3) {
        dims[i] = ceil_div(count, block_arr[i]);
    }
    GridDim { x: dims[0], y: dims[1], z: dims[2] }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CudaDim {
    X,
    Y,
    Z,
}

/// `Kᵢ = blockIdx.d·blockDim.d + threadIdx.d + lowerBound(Kᵢ)` for one
/// parallel fresh index (§4.8).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParallelIndex {
    pub fresh_var: String,
    pub dim: CudaDim,
}

/// Innermost parallel loop maps to `x`, next to `y`, next to `z` (§4.8).
/// `parallel_vars` is ordered outermost-first, matching `RewrittenNest`.
pub fn assign_parallel_dims(parallel_vars: &[String]) -> Vec<ParallelIndex> {
    let dims = [CudaDim::X, CudaDim::Y, CudaDim::Z];
    parallel_vars
        .iter()
        .rev()
        .enumerate()
        .map(|(i, v)| ParallelIndex { fresh_var: v.clone(), dim: dims[i] })
        .collect()
}

/// One term of the flattened subscript pattern
/// `k₁·S₂·…·S_d + k₂·S₃·…·S_d + … + k_d` (§4.8).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatTerm {
    pub index_var: String,
    pub size_factors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatSubscript {
    pub array: String,
    pub terms: Vec<FlatTerm>,
    /// Hoist this subscript's declaration above the sequential sub-nest
    /// when it references none of the sequential indices (§4.8).
    pub hoist_above_subnest: bool,
}

/// Build the flattened subscript for one array reference.
/// `index_vars`/`size_params` are ordered outermost-to-innermost
/// dimension (`index_vars[j]` indexes dimension `j`, sized `size_params[j]`).
pub fn flat_subscript(
    array_name: &str,
    index_vars: &[String],
    size_params: &[String],
    sequential_vars: &BTreeSet<String>,
) -> FlatSubscript {
    let d = index_vars.len();
    let terms: Vec<FlatTerm> = (0..d)
        .map(|j| FlatTerm { index_var: index_vars[j].clone(), size_factors: size_params[j + 1..d].to_vec() })
        .collect();
    let hoist_above_subnest = !terms.iter().any(|t| sequential_vars.contains(&t.index_var));
    FlatSubscript { array: array_name.to_string(), terms, hoist_above_subnest }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelBody {
    pub parallel_indices: Vec<ParallelIndex>,
    pub sequential_indices: Vec<String>,
    pub subscripts: Vec<FlatSubscript>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelPlan {
    pub name: String,
    pub block_dim: BlockDim,
    pub grid_dim: GridDim,
    pub body: KernelBody,
}

pub fn kernel_name(function_name: &str) -> String {
    format!("__{function_name}_c2cuda_kernel")
}

pub fn include_guard(stem: &str) -> String {
    format!("{}_KERNEL_DECL_C2CUDA_H", stem.to_uppercase())
}

/// The three emitted-translation-unit artifacts (§6), minus the actual
/// file-path joining (driver.rs's concern — it knows the directory `D`
/// and stem `S`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedUnit {
    pub include_guard: String,
    pub kernels: Vec<KernelPlan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_dim_matches_parallel_loop_count() {
        assert_eq!(block_dim_for(1), BlockDim { x: 512, y: 1, z: 1 });
        assert_eq!(block_dim_for(2), BlockDim { x: 32, y: 16, z: 1 });
        assert_eq!(block_dim_for(3), BlockDim { x: 8, y: 8, z: 8 });
    }

    #[test]
    #[should_panic]
    fn block_dim_rejects_more_than_three_parallel_loops() {
        block_dim_for(4);
    }

    #[test]
    fn grid_dim_ceils_and_fills_unused_dims_with_one() {
        let block = block_dim_for(2);
        let grid = grid_dim_for(&[1000, 33], block);
        assert_eq!(grid, GridDim { x: 32, y: 3, z: 1 });
    }

    #[test]
    fn innermost_parallel_loop_maps_to_x() {
        let vars = vec!["K1".to_string(), "K2".to_string()];
        let assigned = assign_parallel_dims(&vars);
        assert_eq!(assigned[0], ParallelIndex { fresh_var: "K2".to_string(), dim: CudaDim::X });
        assert_eq!(assigned[1], ParallelIndex { fresh_var: "K1".to_string(), dim: CudaDim::Y });
    }

    #[test]
    fn flat_subscript_follows_row_major_pattern() {
        let idx = vec!["K1".to_string(), "K2".to_string(), "K3".to_string()];
        let sizes = vec!["S1".to_string(), "S2".to_string(), "S3".to_string()];
        let seq = BTreeSet::new();
        let sub = flat_subscript("a", &idx, &sizes, &seq);
        assert_eq!(sub.terms[0].size_factors, vec!["S2", "S3"]);
        assert_eq!(sub.terms[2].size_factors, Vec::<String>::new());
        assert!(sub.hoist_above_subnest);
    }

    #[test]
    fn subscript_referencing_sequential_index_is_not_hoisted() {
        let idx = vec!["K1".to_string(), "K2".to_string()];
        let sizes = vec!["S1".to_string(), "S2".to_string()];
        let mut seq = BTreeSet::new();
        seq.insert("K2".to_string());
        let sub = flat_subscript("a", &idx, &sizes, &seq);
        assert!(!sub.hoist_above_subnest);
    }

    #[test]
    fn naming_contract_matches_spec() {
        assert_eq!(kernel_name("stencil"), "__stencil_c2cuda_kernel");
        assert_eq!(include_guard("foo"), "FOO_KERNEL_DECL_C2CUDA_H");
    }
}
