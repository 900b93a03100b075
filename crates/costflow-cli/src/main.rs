//! `costflow` command-line front end

mod render;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use costflow_core::{Dashboard, DashboardConfig};
use costflow_predict::{ModelKind, PredictionQuery, TrainingParams};
use costflow_record::Level;
use costflow_rollup::{FilterSet, LevelFilter};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const FILTER_ARGS: [(Level, &str); 4] = [
    (Level::L2, "level2"),
    (Level::L3, "level3"),
    (Level::L4, "level4"),
    (Level::L5, "level5"),
];

fn filter_args(cmd: Command) -> Command {
    FILTER_ARGS.iter().fold(cmd, |cmd, &(level, name)| {
        cmd.arg(
            Arg::new(name)
                .long(name)
                .action(ArgAction::Append)
                .value_name("VALUE")
                .help(format!(
                    "Keep only these {level} values (repeatable, ALL for no restriction)"
                )),
        )
    })
}

fn model_arg() -> Arg {
    Arg::new("model")
        .long("model")
        .default_value("small")
        .value_parser(value_parser!(ModelKind))
        .help("Model variant: small or big")
}

fn training_args(cmd: Command) -> Command {
    cmd.arg(model_arg())
        .arg(
            Arg::new("epochs")
                .long("epochs")
                .value_parser(value_parser!(usize))
                .help("Training epochs (1-500, default from config)"),
        )
        .arg(
            Arg::new("learning-rate")
                .long("learning-rate")
                .value_parser(value_parser!(f64))
                .help("Adam learning rate (0.0001-0.1, default from config)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .help("Seed for the train/test split"),
        )
}

fn cli() -> Command {
    Command::new("costflow")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Hierarchical cost rollup and flow analytics")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .short('d')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("CSV file with Level1..Level5,Cost columns (overrides config)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(filter_args(
            Command::new("flow").about("Flow graph nodes and edges for a selection"),
        ))
        .subcommand(filter_args(
            Command::new("summary").about("KPI summary for a selection"),
        ))
        .subcommand(filter_args(
            Command::new("options").about("Cascading selector options for a selection"),
        ))
        .subcommand(filter_args(
            Command::new("view")
                .about("Every dashboard panel for a selection")
                .arg(
                    Arg::new("top-n")
                        .long("top-n")
                        .value_parser(value_parser!(usize))
                        .help("Ranking length (overrides config)"),
                ),
        ))
        .subcommand(training_args(
            Command::new("train").about("Train a cost model and report its losses"),
        ))
        .subcommand(
            training_args(
                Command::new("predict").about("Train a cost model, then predict one combination"),
            )
            .args(FILTER_ARGS.iter().map(|&(_, name)| {
                Arg::new(name)
                    .long(name)
                    .required(true)
                    .value_name("VALUE")
            })),
        )
        .subcommand(Command::new("fingerprint").about("Digest of the loaded record set"))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_dashboard(args: &ArgMatches) -> Result<Dashboard> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(data) = args.get_one::<PathBuf>("data") {
        config.data_path = Some(data.clone());
    }
    if let Ok(Some(&top_n)) = args.try_get_one::<usize>("top-n") {
        config.top_n = top_n;
    }
    Dashboard::open(config).context("failed to open dashboard")
}

fn filters_from(args: &ArgMatches) -> FilterSet {
    let mut filters = FilterSet::new();
    for &(level, name) in &FILTER_ARGS {
        if let Some(values) = args.get_many::<String>(name) {
            filters.set(level, LevelFilter::from_values(values.cloned()));
        }
    }
    filters
}

fn training_params(dashboard: &Dashboard, args: &ArgMatches) -> TrainingParams {
    let mut params = dashboard.config().training;
    if let Some(&epochs) = args.get_one::<usize>("epochs") {
        params = params.with_epochs(epochs);
    }
    if let Some(&learning_rate) = args.get_one::<f64>("learning-rate") {
        params = params.with_learning_rate(learning_rate);
    }
    if let Some(&seed) = args.get_one::<u64>("seed") {
        params = params.with_seed(seed);
    }
    params
}

fn model_kind(args: &ArgMatches) -> ModelKind {
    args.get_one::<ModelKind>("model")
        .copied()
        .unwrap_or(ModelKind::Small)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    let json = matches.get_flag("json");
    let Some((name, args)) = matches.subcommand() else {
        return Ok(());
    };
    tracing::debug!(command = name, "running");
    let dashboard = load_dashboard(args)?;

    match name {
        "flow" => {
            let report = costflow_rollup::build(dashboard.store().records(), &filters_from(args));
            if json {
                print_json(&report.graph)?;
            } else {
                render::flow(&report.graph);
            }
        }
        "summary" => {
            let report = costflow_rollup::build(dashboard.store().records(), &filters_from(args));
            if json {
                print_json(&report.summary)?;
            } else {
                render::summary(&report.summary);
            }
        }
        "options" => {
            let options = dashboard.filter_options(&filters_from(args));
            if json {
                print_json(&options)?;
            } else {
                render::options(&options);
            }
        }
        "view" => {
            let view = dashboard.view(&filters_from(args));
            if json {
                print_json(&view)?;
            } else {
                render::view(&view);
            }
        }
        "train" => {
            let kind = model_kind(args);
            let outcome = dashboard
                .train(kind, Some(training_params(&dashboard, args)))
                .with_context(|| format!("failed to train {kind} model"))?;
            if json {
                print_json(&outcome)?;
            } else {
                render::training(&outcome);
            }
        }
        "predict" => {
            let kind = model_kind(args);
            dashboard
                .train(kind, Some(training_params(&dashboard, args)))
                .with_context(|| format!("failed to train {kind} model"))?;
            let value = |name: &str| args.get_one::<String>(name).cloned().unwrap_or_default();
            let query = PredictionQuery::new(
                value("level2"),
                value("level3"),
                value("level4"),
                value("level5"),
            );
            let prediction = dashboard.predict(kind, query)?;
            if json {
                print_json(&prediction)?;
            } else {
                render::prediction(&prediction);
            }
        }
        "fingerprint" => {
            let fingerprint = dashboard.store().fingerprint();
            if json {
                print_json(&serde_json::json!({
                    "fingerprint": fingerprint,
                    "records": dashboard.store().len(),
                }))?;
            } else {
                println!("{fingerprint}");
            }
        }
        other => anyhow::bail!("unknown command: {other}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));
    run(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn repeated_filters_collect() {
        let matches = cli()
            .try_get_matches_from([
                "costflow", "flow", "--level2", "EMEA", "--level2", "APAC", "--level4", "ALL",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let filters = filters_from(args);
        assert_eq!(
            filters.get(Level::L2),
            &LevelFilter::only(["APAC", "EMEA"])
        );
        assert!(filters.get(Level::L4).is_all());
        assert!(filters.get(Level::L3).is_all());
    }

    #[test]
    fn predict_requires_all_levels() {
        assert!(cli()
            .try_get_matches_from(["costflow", "predict", "--level2", "EMEA"])
            .is_err());
        let matches = cli()
            .try_get_matches_from([
                "costflow", "predict", "--model", "big", "--level2", "EMEA", "--level3",
                "Germany", "--level4", "Retail Banking", "--level5", "Network",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(model_kind(args), ModelKind::Big);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["costflow", "summary", "--json", "--data", "costs.csv"])
            .unwrap();
        assert!(matches.get_flag("json"));
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(
            args.get_one::<PathBuf>("data"),
            Some(&PathBuf::from("costs.csv"))
        );
    }
}
