use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use rollup_config::validate::validate_rollup;
use rollup_config::{FcnSetting, FillSetting, RollupConfig, RollupSection};
use rollup_core::parse_tz;
use rollup_runtime::tracing_init::init_tracing;
use rollup_runtime::{render_json, render_table, run_job};

#[derive(Parser)]
#[command(name = "tsrollup", about = "Downsample timestamped records into time-aligned bins")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll up a JSON or JSON-lines data file
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Records to roll up (JSON array or one object per line)
    #[arg(short, long)]
    data: PathBuf,
    /// Path to rollup.toml; flags override its [rollup] values
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Window length: second..year, or <n>min / <n>sec
    #[arg(short, long)]
    interval: Option<String>,
    /// Range start: epoch ms, now, +/-N<unit>, or a date
    #[arg(long)]
    start: Option<String>,
    /// Range end, same forms as --start
    #[arg(long)]
    end: Option<String>,
    /// IANA timezone for calendar windows
    #[arg(long)]
    tz: Option<String>,
    /// Timestamp field name
    #[arg(long)]
    timestamp_field: Option<String>,
    /// Comma-separated output fields
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<String>>,
    /// Aggregator for all fields, or field=kind pairs (v1=mean,v2=max)
    #[arg(long)]
    fcn: Option<FcnSetting>,
    /// Gap fill: none, zeros, nans, previous, or a literal
    #[arg(long)]
    fill: Option<FillSetting>,
    /// Field set to true on generated bins
    #[arg(long)]
    indicate_generated: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl RunArgs {
    /// The `[rollup]` keys given on the command line.
    fn overlay(&self) -> RollupSection {
        RollupSection {
            timestamp_field: self.timestamp_field.clone(),
            tz: self.tz.clone(),
            interval: self.interval.clone(),
            fields: self.fields.clone(),
            fcn: self.fcn.clone(),
            fill: self.fill.clone(),
            indicate_generated: self.indicate_generated.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<(RollupConfig, PathBuf)> {
    match path {
        Some(path) => {
            let path = path
                .canonicalize()
                .map_err(|e| anyhow::anyhow!("config path '{}': {e}", path.display()))?;
            let config = RollupConfig::load(&path)?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok((config, base_dir))
        }
        None => Ok((RollupConfig::default(), std::env::current_dir()?)),
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let (config, base_dir) = load_config(args.config.as_deref())?;
    let _guard = init_tracing(&config.logging, &base_dir)?;

    let section = config.rollup.merged_with(args.overlay());
    validate_rollup(&section)?;
    let tz = match &section.tz {
        Some(name) => parse_tz(name).map_err(|e| anyhow::anyhow!("{e}"))?,
        None => chrono_tz::Tz::UTC,
    };
    tracing::info!(domain = "sys", data = %args.data.display(), "tsrollup run");

    let bins = run_job(&args.data, &section)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let rendered = match args.format {
        OutputFormat::Table => render_table(&bins, tz),
        OutputFormat::Json => render_json(&bins).map_err(|e| anyhow::anyhow!("{e}"))?,
    };
    print!("{rendered}");
    tracing::info!(domain = "sys", bins = bins.len(), "tsrollup done");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn parse(args: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Run(args) => args,
        }
    }

    #[test]
    fn flags_become_overlay() {
        let args = parse(&[
            "tsrollup", "run", "--data", "points.jsonl", "--interval", "15min", "--fields",
            "v1,v2", "--fcn", "v1=mean, v2=max", "--fill", "0", "--format", "json",
        ]);
        assert!(args.format == OutputFormat::Json);
        let overlay = args.overlay();
        assert_eq!(overlay.interval.as_deref(), Some("15min"));
        assert_eq!(overlay.fields, Some(vec!["v1".to_string(), "v2".to_string()]));
        assert_eq!(
            overlay.fcn,
            Some(FcnSetting::PerField(BTreeMap::from([
                ("v1".to_string(), "mean".to_string()),
                ("v2".to_string(), "max".to_string()),
            ])))
        );
        assert_eq!(overlay.fill, Some(FillSetting::Number(0.0)));
        assert!(overlay.tz.is_none());
    }

    #[test]
    fn malformed_fcn_is_a_usage_error() {
        assert!(
            Cli::try_parse_from(["tsrollup", "run", "--data", "d.jsonl", "--fcn", "v1=mean,v2"])
                .is_err()
        );
    }

    #[test]
    fn data_is_required() {
        assert!(Cli::try_parse_from(["tsrollup", "run"]).is_err());
    }
}
