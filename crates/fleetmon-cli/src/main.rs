use anyhow::{anyhow, bail, Context, Result};
use std::env;
use tracing_subscriber::EnvFilter;

use fleetmon_aggregate::{aggregate_by_cloud, build_database_tree, fleet_overview, region_markers};
use fleetmon_common::timerange::TimeRange;
use fleetmon_report::{render_fleet_report, summarization_context, ReportContext};
use fleetmon_synth::{FleetSnapshot, SnapshotConfig};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    Snapshot,
    Metrics,
    Aggregate,
    Report,
    Context,
}

impl Mode {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "snapshot" => Ok(Self::Snapshot),
            "metrics" => Ok(Self::Metrics),
            "aggregate" => Ok(Self::Aggregate),
            "report" => Ok(Self::Report),
            "context" => Ok(Self::Context),
            _ => bail!("unknown mode: {value}"),
        }
    }

    fn names() -> &'static [&'static str] {
        &["snapshot", "metrics", "aggregate", "report", "context"]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Metrics => "metrics",
            Self::Aggregate => "aggregate",
            Self::Report => "report",
            Self::Context => "context",
        }
    }
}

#[derive(Debug)]
struct Config {
    mode: Mode,
    seed: Option<u64>,
    database_count: usize,
    billing_days: usize,
    database_id: Option<String>,
    range: TimeRange,
    output: Option<String>,
    pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Snapshot,
            seed: None,
            database_count: 50,
            billing_days: 30,
            database_id: None,
            range: TimeRange::default(),
            output: None,
            pretty: false,
        }
    }
}

enum CliAction {
    Run(Config),
    Help,
    ListModes,
}

fn usage() {
    println!(
        "Usage:\n  fleetmon [options]\n\nOptions:\n  --mode <name>      snapshot|metrics|aggregate|report|context (default: snapshot)\n  --seed <n>         RNG seed (default: drawn from entropy)\n  --count <n>        number of databases to generate (default: 50)\n  --days <n>         days of cost history (default: 30)\n  --database <id>    database id, required for metrics mode\n  --range <window>   1h|24h|7d|30d (default: 24h)\n  --output <path>    write the result to a file instead of stdout\n  --pretty           pretty-print JSON output\n  --list-modes       print supported modes\n  -h, --help         show this help"
    );
}

fn parse_cli() -> Result<CliAction> {
    let mut config = Config::default();
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliAction::Help),
            "--list-modes" => return Ok(CliAction::ListModes),
            "--mode" => {
                let value = next_value(&mut args, "--mode")?;
                config.mode = Mode::parse(&value)?;
            }
            "--seed" => {
                let value = next_value(&mut args, "--seed")?;
                config.seed = Some(parse_u64(&value, "--seed")?);
            }
            "--count" => {
                let value = next_value(&mut args, "--count")?;
                config.database_count = parse_positive_usize(&value, "--count")?;
            }
            "--days" => {
                let value = next_value(&mut args, "--days")?;
                config.billing_days = parse_positive_usize(&value, "--days")?;
            }
            "--database" => {
                config.database_id = Some(next_value(&mut args, "--database")?);
            }
            "--range" => {
                let value = next_value(&mut args, "--range")?;
                config.range = value.parse()?;
            }
            "--output" => {
                config.output = Some(next_value(&mut args, "--output")?);
            }
            "--pretty" => {
                config.pretty = true;
            }
            _ => bail!("unknown argument: {arg}"),
        }
    }

    Ok(CliAction::Run(config))
}

fn next_value<I>(args: &mut I, flag: &str) -> Result<String>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}

fn parse_positive_usize(value: &str, flag: &str) -> Result<usize> {
    let parsed = value
        .parse::<usize>()
        .with_context(|| format!("invalid number for {flag}: {value}"))?;
    if parsed == 0 {
        bail!("{flag} must be greater than 0");
    }
    Ok(parsed)
}

fn parse_u64(value: &str, flag: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .with_context(|| format!("invalid number for {flag}: {value}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fleetmon=info".parse()?))
        .init();

    match parse_cli()? {
        CliAction::Help => {
            usage();
            Ok(())
        }
        CliAction::ListModes => {
            println!("{}", Mode::names().join("\n"));
            Ok(())
        }
        CliAction::Run(config) => run(config),
    }
}

fn run(config: Config) -> Result<()> {
    let snapshot_config = SnapshotConfig {
        databases: config.database_count,
        billing_days: config.billing_days,
        seed: config.seed,
    };
    let snapshot = FleetSnapshot::generate(&snapshot_config);

    eprintln!(
        "[fleetmon] mode={} seed={} databases={}",
        config.mode.as_str(),
        snapshot.seed,
        snapshot.databases.len()
    );

    let body = match config.mode {
        Mode::Snapshot => to_json(&snapshot, config.pretty)?,
        Mode::Metrics => {
            let database_id = config
                .database_id
                .as_deref()
                .ok_or_else(|| anyhow!("--database is required for metrics mode"))?;
            let series = snapshot
                .metric_series(database_id, config.range)
                .ok_or_else(|| anyhow!("unknown database id: {database_id}"))?;
            to_json(
                &serde_json::json!({
                    "database_id": database_id,
                    "range": config.range.as_str(),
                    "series": series,
                }),
                config.pretty,
            )?
        }
        Mode::Aggregate => {
            let overview =
                fleet_overview(&snapshot.databases, &snapshot.issues, &snapshot.costs);
            let clouds = aggregate_by_cloud(&snapshot.databases);
            let tree = build_database_tree(&snapshot.databases);
            let markers = region_markers(&snapshot.databases);
            to_json(
                &serde_json::json!({
                    "overview": overview,
                    "clouds": clouds,
                    "tree": tree,
                    "markers": markers,
                }),
                config.pretty,
            )?
        }
        Mode::Report => render_fleet_report(&report_context(&snapshot)),
        Mode::Context => summarization_context(&report_context(&snapshot)),
    };

    match &config.output {
        Some(path) => {
            std::fs::write(path, &body)
                .with_context(|| format!("failed to write output file: {path}"))?;
            eprintln!("[fleetmon] wrote {} bytes to {path}", body.len());
        }
        None => println!("{body}"),
    }

    Ok(())
}

fn report_context(snapshot: &FleetSnapshot) -> ReportContext<'_> {
    ReportContext {
        generated_at: snapshot.generated_at,
        seed: snapshot.seed,
        databases: &snapshot.databases,
        issues: &snapshot.issues,
        costs: &snapshot.costs,
        anomalies: &snapshot.anomalies,
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let body = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(body)
}
