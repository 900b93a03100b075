//! costflow Rollup
//!
//! Hierarchical cost aggregation over an immutable record set.
//!
//! # Core Concepts
//!
//! - [`FilterSet`]: Per-level value restriction applied before aggregation
//! - [`HierarchyFlowBuilder`]: Interns `(level, label)` nodes and sums
//!   adjacent-level edges into a [`FlowGraph`]
//! - [`Summary`]: Total, distinct region/division counts and mean cost
//! - [`breakdown`]: Ranked totals, pivots, cumulative curve, distributions
//! - [`hierarchy_tree`]: Path-keyed rollup for radial hierarchy charts
//!
//! Every function here is pure: no I/O, no shared mutable state, no caching.
//! Results are recomputed from scratch for each filter selection.
//!
//! # Example
//!
//! ```rust,ignore
//! use costflow_rollup::{build, FilterSet};
//! use costflow_record::Level;
//!
//! let filters = FilterSet::new().with_only(Level::L2, ["EMEA"]);
//! let report = build(store.records(), &filters);
//!
//! for edge in &report.graph.edges {
//!     let from = &report.graph.nodes[edge.source];
//!     let to = &report.graph.nodes[edge.target];
//!     println!("{} -> {}: {}", from.label, to.label, edge.weight);
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod breakdown;
mod filter;
mod flow;
mod summary;
mod tree;

pub use breakdown::{CostMatrix, CumulativePoint, Distribution, LabelCost};
pub use filter::{cascade_options, FilterOptions, FilterSet, LevelFilter, ALL_SENTINEL};
pub use flow::{
    build, build_flow, FlowEdge, FlowGraph, FlowNode, FlowReport, HierarchyFlowBuilder, Tier,
};
pub use summary::Summary;
pub use tree::{hierarchy_tree, TreeNode, PATH_SEPARATOR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
