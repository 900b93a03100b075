//! Plain-text output

use costflow_core::{DashboardView, Prediction};
use costflow_predict::TrainingOutcome;
use costflow_rollup::breakdown::{CostMatrix, LabelCost};
use costflow_rollup::{FilterOptions, FlowGraph, Summary};

pub(crate) fn flow(graph: &FlowGraph) {
    if graph.is_empty() {
        println!("no records match the selection");
        return;
    }
    println!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
    for edge in &graph.edges {
        let source = &graph.nodes[edge.source];
        let target = &graph.nodes[edge.target];
        println!(
            "  [{}] {} -> {}: {:.2}",
            edge.tier, source.label, target.label, edge.weight
        );
    }
}

pub(crate) fn summary(summary: &Summary) {
    println!("Total cost:     {:.2}", summary.total_cost);
    println!("Regions:        {}", summary.distinct_level2);
    println!("Divisions:      {}", summary.distinct_level4);
    println!("Mean cost:      {:.2}", summary.mean_cost);
    println!("Records:        {}", summary.record_count);
}

pub(crate) fn options(options: &FilterOptions) {
    let rows = [
        ("level2", &options.level2),
        ("level3", &options.level3),
        ("level4", &options.level4),
        ("level5", &options.level5),
    ];
    for (name, values) in rows {
        println!("{name}: {}", values.join(", "));
    }
}

fn ranking(title: &str, items: &[LabelCost]) {
    println!("{title}");
    for item in items {
        println!("  {:<30} {:>14.2}", item.label, item.cost);
    }
}

fn matrix(title: &str, matrix: &CostMatrix) {
    println!("{title}");
    println!("  {:<20} {}", "", matrix.columns.join(" | "));
    for (row, values) in matrix.rows.iter().zip(&matrix.values) {
        let cells: Vec<String> = values.iter().map(|v| format!("{v:.0}")).collect();
        println!("  {:<20} {}", row, cells.join(" | "));
    }
}

pub(crate) fn view(view: &DashboardView) {
    summary(&view.summary);
    println!();
    ranking("Cost by region", &view.region_totals);
    ranking("Cost by division", &view.division_totals);
    ranking("Top services", &view.top_services);
    ranking("Top countries", &view.top_countries);
    ranking("Service share", &view.service_share);
    matrix("Region x division", &view.region_division);
    matrix("Division radar", &view.division_radar);

    println!("Cost spread by region");
    for d in &view.region_distribution {
        println!(
            "  {:<20} n={:<4} min={:.0} q1={:.0} median={:.0} q3={:.0} max={:.0} mean={:.0} sd={:.0}",
            d.label, d.count, d.min, d.q1, d.median, d.q3, d.max, d.mean, d.std_dev
        );
    }

    if let Some(half) = view.cumulative.iter().find(|p| p.percent >= 50.0) {
        println!(
            "Half of the cost sits in the top {} of {} records",
            half.rank,
            view.cumulative.len()
        );
    }
    println!();
    flow(&view.flow);
}

pub(crate) fn training(outcome: &TrainingOutcome) {
    let r = &outcome.record;
    println!("Trained {} model (run {})", r.kind, r.run_id);
    println!("  epochs:        {}", r.epochs);
    println!("  learning rate: {}", r.learning_rate);
    println!("  train/test:    {}/{}", r.train_records, r.test_records);
    println!("  train loss:    {:.6}", r.train_loss);
    println!("  test loss:     {:.6}", r.test_loss);
    println!("  test RMSE:     {:.2}", r.test_rmse);
}

pub(crate) fn prediction(prediction: &Prediction) {
    let q = &prediction.query;
    println!(
        "{} / {} / {} / {}: {:.2} ({} model)",
        q.level2, q.level3, q.level4, q.level5, prediction.cost, prediction.kind
    );
    if prediction.stale {
        println!("warning: model was trained on a different record set");
    }
}
