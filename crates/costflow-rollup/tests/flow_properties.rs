use costflow_record::{Level, Record};
use costflow_rollup::{build, cascade_options, FilterSet, LevelFilter, Summary, Tier};
use costflow_test_utils::{
    arb_fractional_records, arb_level2_selection, arb_level3_selection, arb_records,
    sample_records, two_leaf_records,
};
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    #[test]
    fn prop_flow_is_conserved_across_tiers(
        records in arb_records(60),
        level2 in arb_level2_selection(),
    ) {
        let filters = FilterSet::new().with_only(Level::L2, level2);
        let report = build(&records, &filters);

        // whole-number costs keep every sum exact
        for tier in Tier::all() {
            prop_assert_eq!(report.graph.tier_total(tier), report.summary.total_cost);
        }
    }

    #[test]
    fn prop_fractional_flow_is_conserved_within_tolerance(
        records in arb_fractional_records(60),
        level2 in arb_level2_selection(),
    ) {
        let filters = FilterSet::new().with_only(Level::L2, level2);
        let report = build(&records, &filters);
        let total = report.summary.total_cost;

        for tier in Tier::all() {
            let tier_total = report.graph.tier_total(tier);
            let tolerance = 1e-9 * total.abs().max(1.0);
            prop_assert!(
                (tier_total - total).abs() <= tolerance,
                "tier {} sums to {} but total is {}",
                tier,
                tier_total,
                total
            );
        }
    }

    #[test]
    fn prop_edges_reference_unique_valid_nodes(records in arb_records(60)) {
        let graph = build(&records, &FilterSet::new()).graph;

        let unique: HashSet<_> = graph.nodes.iter().collect();
        prop_assert_eq!(unique.len(), graph.nodes.len());

        let mut pairs = HashSet::new();
        for edge in &graph.edges {
            prop_assert!(edge.source < graph.nodes.len());
            prop_assert!(edge.target < graph.nodes.len());
            prop_assert_eq!(graph.nodes[edge.source].level, edge.tier.from);
            prop_assert_eq!(graph.nodes[edge.target].level, edge.tier.to);
            prop_assert!(pairs.insert((edge.source, edge.target)));
        }
    }

    #[test]
    fn prop_edge_weight_is_exact_group_sum(records in arb_records(60)) {
        let graph = build(&records, &FilterSet::new()).graph;

        for edge in &graph.edges {
            let from = &graph.nodes[edge.source];
            let to = &graph.nodes[edge.target];
            let expected: f64 = records
                .iter()
                .filter(|r| r.level(from.level) == from.label && r.level(to.level) == to.label)
                .map(Record::cost)
                .sum();
            prop_assert_eq!(edge.weight, expected);
        }
    }

    #[test]
    fn prop_narrowing_never_increases_cost(
        records in arb_records(60),
        level2 in arb_level2_selection(),
        level3 in arb_level3_selection(),
    ) {
        let wide = FilterSet::new().with_only(Level::L2, level2.clone());
        let narrow = wide.clone().with_only(Level::L3, level3);

        let wide_report = build(&records, &wide);
        let narrow_report = build(&records, &narrow);
        prop_assert!(narrow_report.summary.total_cost <= wide_report.summary.total_cost);
        prop_assert!(narrow_report.summary.record_count <= wide_report.summary.record_count);
    }

    #[test]
    fn prop_build_is_idempotent(
        records in arb_records(60),
        level2 in arb_level2_selection(),
    ) {
        let filters = FilterSet::new().with_only(Level::L2, level2);
        let first = build(&records, &filters);
        let second = build(&records, &filters);

        prop_assert_eq!(&first.graph.nodes, &second.graph.nodes);
        let bits = |r: &costflow_rollup::FlowReport| -> Vec<u64> {
            r.graph.edges.iter().map(|e| e.weight.to_bits()).collect()
        };
        prop_assert_eq!(bits(&first), bits(&second));
        prop_assert_eq!(first.summary.total_cost.to_bits(), second.summary.total_cost.to_bits());
        prop_assert_eq!(first.summary.mean_cost.to_bits(), second.summary.mean_cost.to_bits());
    }

    #[test]
    fn prop_cascaded_options_are_never_empty_choices(
        records in arb_records(60),
        level2 in arb_level2_selection(),
    ) {
        let filters = FilterSet::new().with_only(Level::L2, level2);
        let options = cascade_options(&records, &filters);

        for country in &options.level3 {
            let narrowed = filters.clone().with_only(Level::L3, [country.as_str()]);
            prop_assert!(!build(&records, &narrowed).summary.is_empty());
        }
    }
}

#[test]
fn emea_then_germany_is_a_subset() {
    let records = sample_records();
    let emea = FilterSet::new().with_only(Level::L2, ["EMEA"]);
    let germany = emea.clone().with_only(Level::L3, ["Germany"]);

    let emea_total = build(&records, &emea).summary.total_cost;
    let germany_total = build(&records, &germany).summary.total_cost;

    assert_eq!(emea_total, 9250.0);
    assert_eq!(germany_total, 4000.0);
    assert!(germany_total <= emea_total);
}

#[test]
fn two_leaf_fixture() {
    let report = build(&two_leaf_records(), &FilterSet::new());
    assert_eq!(report.graph.nodes.len(), 6);
    for label in ["A", "B", "C", "D", "E", "F"] {
        assert!(report.graph.labels().contains(&label));
    }
    assert_eq!(
        report
            .graph
            .edge((Level::L4, "D"), (Level::L5, "E"))
            .map(|e| e.weight),
        Some(100.0)
    );
    assert_eq!(
        report
            .graph
            .edge((Level::L4, "D"), (Level::L5, "F"))
            .map(|e| e.weight),
        Some(50.0)
    );
    assert_eq!(report.summary.total_cost, 150.0);
    assert_eq!(report.summary.mean_cost, 75.0);
}

#[test]
fn empty_store_and_unknown_region() {
    let empty = build(&[], &FilterSet::new());
    assert!(empty.graph.nodes.is_empty());
    assert!(empty.graph.edges.is_empty());
    assert_eq!(empty.summary, Summary::zero());

    let mars = FilterSet::new().with_only(Level::L2, ["Mars"]);
    let report = build(&sample_records(), &mars);
    assert!(report.graph.nodes.is_empty());
    assert_eq!(report.summary, Summary::zero());
}

#[test]
fn empty_selection_differs_from_all() {
    let records = sample_records();
    let nothing = FilterSet::new().with(Level::L4, LevelFilter::only(Vec::<String>::new()));
    let everything = FilterSet::new().with(Level::L4, LevelFilter::All);

    assert!(build(&records, &nothing).summary.is_empty());
    assert_eq!(build(&records, &everything).summary.record_count, records.len());
}

#[test]
fn sample_summary_counts() {
    let summary = build(&sample_records(), &FilterSet::new()).summary;
    assert_eq!(summary.total_cost, 17250.0);
    assert_eq!(summary.distinct_level2, 3);
    assert_eq!(summary.distinct_level4, 3);
    assert_eq!(summary.record_count, 13);
}
