//! Shape propagation through the block graph.
//!
//! Every call recomputes all shapes from scratch: build the incoming-edge
//! index, order the blocks depth-first (upstream before downstream), derive
//! each block's input shape from its upstream outputs, apply the block's
//! transform, and finally check every connection for rank mismatches.
//!
//! Cycles are tolerated. A block re-entered while it is still on the DFS
//! stack is skipped, so blocks inside a cycle may read a stale upstream
//! shape. The re-entered blocks are listed in [`ShapeReport::cycles`] and
//! [`ShapePropagator::try_propagate`] turns them into an error.

use crate::pipeline::block::{BlockInstance, Connection};
use crate::pipeline::data_type::DataType;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::BlockId;
use crate::pipeline::registry::InputMerge;
use crate::pipeline::shape::Shape;
use std::collections::{BTreeMap, HashMap};

/// Result of one propagation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeReport {
    /// Blocks in their original order with recomputed shapes.
    pub blocks: Vec<BlockInstance>,
    /// Advisory mismatch messages keyed by the downstream block.
    pub shape_errors: BTreeMap<BlockId, String>,
    /// Processing order (upstream first).
    pub order: Vec<BlockId>,
    /// Blocks that were re-entered during traversal, in discovery order.
    pub cycles: Vec<BlockId>,
}

impl ShapeReport {
    pub fn has_errors(&self) -> bool {
        !self.shape_errors.is_empty()
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    pub fn block(&self, id: &BlockId) -> Option<&BlockInstance> {
        self.blocks.iter().find(|b| &b.id == id)
    }
}

/// Format of the rank-mismatch message.
pub fn rank_mismatch_message(upstream_rank: usize, downstream_rank: usize) -> String {
    format!("Shape mismatch: {}D → {}D", upstream_rank, downstream_rank)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnStack,
    Done,
}

/// Graph-driven shape calculator.
#[derive(Debug, Clone, Copy)]
pub struct ShapePropagator {
    data_type: DataType,
}

impl ShapePropagator {
    pub fn new(data_type: DataType) -> Self {
        Self { data_type }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Recompute every block's shapes. Never fails; cycles and mismatches
    /// are reported as data.
    pub fn propagate(&self, blocks: &[BlockInstance], connections: &[Connection]) -> ShapeReport {
        let index = Self::build_index(blocks);
        let incoming = Self::build_incoming(blocks.len(), connections, &index);
        let (order, cycle_nodes) = Self::topological_order(&incoming);

        let mut out = blocks.to_vec();
        for &i in &order {
            let input = self.derive_input(&out, i, &incoming[i]);
            let block = &mut out[i];
            block.input_shape = input;
            // Unknown types keep the stored output shape.
            if let Some(descriptor) = block.descriptor() {
                block.output_shape = descriptor.transform_shape(&block.input_shape, &block.config);
            }
        }

        let shape_errors = Self::validate(&out, connections, &index);
        let order = order.iter().map(|&i| out[i].id.clone()).collect();
        let cycles = cycle_nodes.iter().map(|&i| out[i].id.clone()).collect();

        ShapeReport {
            blocks: out,
            shape_errors,
            order,
            cycles,
        }
    }

    /// Strict variant: fails with [`PipelineError::CyclicGraph`] when the
    /// connections contain a cycle.
    pub fn try_propagate(
        &self,
        blocks: &[BlockInstance],
        connections: &[Connection],
    ) -> PipelineResult<ShapeReport> {
        let report = self.propagate(blocks, connections);
        if report.has_cycles() {
            return Err(PipelineError::CyclicGraph {
                blocks: report.cycles,
            });
        }
        Ok(report)
    }

    /// Map block id to position. The first block wins on duplicate ids.
    fn build_index(blocks: &[BlockInstance]) -> HashMap<&BlockId, usize> {
        let mut index = HashMap::with_capacity(blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            index.entry(&block.id).or_insert(i);
        }
        index
    }

    /// Incoming sources per block, in connection order. Connections with a
    /// missing endpoint are ignored.
    fn build_incoming(
        n: usize,
        connections: &[Connection],
        index: &HashMap<&BlockId, usize>,
    ) -> Vec<Vec<usize>> {
        let mut incoming = vec![Vec::new(); n];
        for conn in connections {
            if let (Some(&from), Some(&to)) = (index.get(&conn.from), index.get(&conn.to)) {
                incoming[to].push(from);
            }
        }
        incoming
    }

    /// Depth-first post-order over the incoming edges, starting from every
    /// block in stored order.
    ///
    /// Returns the processing order and the nodes that were found on the
    /// active stack when revisited.
    fn topological_order(incoming: &[Vec<usize>]) -> (Vec<usize>, Vec<usize>) {
        let n = incoming.len();
        let mut state = vec![VisitState::Unvisited; n];
        let mut order = Vec::with_capacity(n);
        let mut cycles = Vec::new();
        // (node, index of the next incoming edge to follow)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if state[root] != VisitState::Unvisited {
                continue;
            }
            state[root] = VisitState::OnStack;
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                if let Some(&src) = incoming[node].get(top.1) {
                    top.1 += 1;
                    match state[src] {
                        VisitState::Unvisited => {
                            state[src] = VisitState::OnStack;
                            stack.push((src, 0));
                        }
                        VisitState::OnStack => {
                            if !cycles.contains(&src) {
                                cycles.push(src);
                            }
                        }
                        VisitState::Done => {}
                    }
                } else {
                    state[node] = VisitState::Done;
                    order.push(node);
                    stack.pop();
                }
            }
        }

        (order, cycles)
    }

    fn derive_input(&self, blocks: &[BlockInstance], i: usize, sources: &[usize]) -> Shape {
        let block = &blocks[i];
        let descriptor = block.descriptor();

        if descriptor.is_some_and(|d| d.is_source) {
            return Shape::source();
        }

        match sources {
            [] => self.data_type.default_input_shape(),
            [only] => blocks[*only].output_shape.clone(),
            [first, ..] => {
                let base = blocks[*first].output_shape.clone();
                match descriptor.map(|d| d.input_merge) {
                    Some(InputMerge::ConcatLastDim) => {
                        let total = sources
                            .iter()
                            .filter_map(|&s| blocks[s].output_shape.last_dim())
                            .fold(0usize, usize::saturating_add);
                        base.with_last_dim(total)
                    }
                    _ => base,
                }
            }
        }
    }

    /// Rank check on every connection. Later connections into the same
    /// block overwrite earlier messages.
    fn validate(
        blocks: &[BlockInstance],
        connections: &[Connection],
        index: &HashMap<&BlockId, usize>,
    ) -> BTreeMap<BlockId, String> {
        let mut errors = BTreeMap::new();
        for conn in connections {
            let (Some(&from), Some(&to)) = (index.get(&conn.from), index.get(&conn.to)) else {
                continue;
            };
            let target = &blocks[to];
            if target.is_source() {
                continue;
            }
            let upstream = blocks[from].output_shape.rank();
            let downstream = target.input_shape.rank();
            if upstream != downstream {
                errors.insert(target.id.clone(), rank_mismatch_message(upstream, downstream));
            }
        }
        errors
    }
}

/// Lenient propagation with the given data type.
pub fn propagate(
    blocks: &[BlockInstance],
    connections: &[Connection],
    data_type: DataType,
) -> ShapeReport {
    ShapePropagator::new(data_type).propagate(blocks, connections)
}
