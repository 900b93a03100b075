//! Hierarchy flow builder
//!
//! Rolls filtered records up into a layered flow graph: one node per
//! `(level, label)` and one weighted edge per distinct adjacent-level pair.
//!
//! Node identity is namespaced by level, so a label used at two different
//! levels produces two nodes rather than silently merging them.

use crate::filter::FilterSet;
use crate::summary::Summary;
use costflow_record::{Level, Record};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Adjacent level pair that produced an edge
///
/// Tiers only drive presentation (link colouring); edge identity is the
/// `(source, target)` node pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tier {
    /// Parent level
    pub from: Level,
    /// Child level
    pub to: Level,
}

impl Tier {
    /// Tiers in processing order: (1,2), (2,3), (3,4), (4,5)
    #[must_use]
    pub fn all() -> [Tier; 4] {
        Level::adjacent_pairs().map(|(from, to)| Tier { from, to })
    }

    /// Zero-based position in processing order
    #[inline]
    #[must_use]
    pub const fn ordinal(self) -> usize {
        (self.from.index() - 1) as usize
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Graph vertex: a label at a hierarchy level
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowNode {
    /// Hierarchy level of the label
    pub level: Level,
    /// Display label
    pub label: String,
}

/// Aggregated cost flow between adjacent-level values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Index of the parent node
    pub source: usize,
    /// Index of the child node
    pub target: usize,
    /// Summed cost of all records carrying this pair
    pub weight: f64,
    /// Level pair the edge belongs to
    pub tier: Tier,
}

/// Node and edge lists ready for a flow diagram
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    /// Deduplicated nodes in first-seen order
    pub nodes: Vec<FlowNode>,
    /// Weighted edges, tier by tier
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    /// Check if graph has no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node labels in index order
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    /// Index of the node for a label at a level
    #[must_use]
    pub fn node_index(&self, level: Level, label: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.level == level && n.label == label)
    }

    /// Edge between two labelled nodes
    #[must_use]
    pub fn edge(&self, from: (Level, &str), to: (Level, &str)) -> Option<&FlowEdge> {
        let source = self.node_index(from.0, from.1)?;
        let target = self.node_index(to.0, to.1)?;
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    /// Edges of one tier
    pub fn tier_edges(&self, tier: Tier) -> impl Iterator<Item = &FlowEdge> + '_ {
        self.edges.iter().filter(move |e| e.tier == tier)
    }

    /// Sum of edge weights in one tier
    #[must_use]
    pub fn tier_total(&self, tier: Tier) -> f64 {
        self.tier_edges(tier).map(|e| e.weight).sum()
    }
}

/// Incremental builder for a [`FlowGraph`]
///
/// Usage:
/// ```rust,ignore
/// let mut builder = HierarchyFlowBuilder::new();
/// for tier in Tier::all() {
///     builder.add_tier(tier, &filtered);
/// }
/// let graph = builder.finish();
/// ```
#[derive(Debug, Default)]
pub struct HierarchyFlowBuilder {
    nodes: IndexSet<FlowNode>,
    edges: Vec<FlowEdge>,
}

impl HierarchyFlowBuilder {
    /// Create an empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Index for a node, assigning the next index on first sight
    pub fn intern(&mut self, level: Level, label: &str) -> usize {
        let (index, _) = self.nodes.insert_full(FlowNode {
            level,
            label: label.to_string(),
        });
        index
    }

    /// Group records by the tier's level pair and add one edge per group
    ///
    /// Groups are visited in ascending `(parent, child)` label order; costs
    /// within a group are summed in record order.
    pub fn add_tier(&mut self, tier: Tier, records: &[&Record]) {
        let mut groups: BTreeMap<(&str, &str), f64> = BTreeMap::new();
        for record in records {
            *groups
                .entry((record.level(tier.from), record.level(tier.to)))
                .or_insert(0.0) += record.cost();
        }

        for ((parent, child), weight) in groups {
            let source = self.intern(tier.from, parent);
            let target = self.intern(tier.to, child);
            self.edges.push(FlowEdge {
                source,
                target,
                weight,
                tier,
            });
        }
    }

    /// Finish construction
    #[must_use]
    pub fn finish(self) -> FlowGraph {
        FlowGraph {
            nodes: self.nodes.into_iter().collect(),
            edges: self.edges,
        }
    }
}

/// Flow graph plus KPI summary for one filter selection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowReport {
    /// Flow diagram input
    pub graph: FlowGraph,
    /// KPI values
    pub summary: Summary,
}

/// Roll already-filtered records up into a flow graph
#[must_use]
pub fn build_flow(records: &[&Record]) -> FlowGraph {
    let mut builder = HierarchyFlowBuilder::new();
    for tier in Tier::all() {
        builder.add_tier(tier, records);
    }
    builder.finish()
}

/// Apply filters, then build the flow graph and summary from scratch
#[must_use]
pub fn build(records: &[Record], filters: &FilterSet) -> FlowReport {
    let filtered = filters.apply(records);
    let graph = build_flow(&filtered);
    let summary = Summary::from_records(&filtered);

    tracing::debug!(
        records = records.len(),
        filtered = filtered.len(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "built flow graph"
    );

    FlowReport { graph, summary }
}
