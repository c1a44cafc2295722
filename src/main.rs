//! dnet CLI: build discourse networks from a coded statement snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use discourse_net::config::ExportConfig;
use discourse_net::engine::{self, ExportControl, ExportOutcome};
use discourse_net::export::{self, OutputFormat};
use discourse_net::{AgreementPattern, AggregationRule, MemoryStore, NetworkType, StatementStore, Value};

#[derive(Parser)]
#[command(name = "dnet", version, about = "Discourse network construction")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List statement types and their variables.
    Types {
        /// JSON snapshot of the coded corpus.
        #[arg(long)]
        store: PathBuf,
    },

    /// Export networks.
    Export(ExportArgs),
}

#[derive(clap::Args)]
struct ExportArgs {
    /// JSON snapshot of the coded corpus.
    #[arg(long)]
    store: PathBuf,

    /// TOML export configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file.
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    #[arg(long)]
    statement_type: Option<String>,

    /// Variable whose values become row nodes.
    #[arg(long)]
    mode1: Option<String>,

    /// Variable whose values become column nodes.
    #[arg(long)]
    mode2: Option<String>,

    #[arg(long, value_enum)]
    network_type: Option<NetworkTypeArg>,

    /// Agreement qualifier variable.
    #[arg(long)]
    agreement: Option<String>,

    /// Restrict to these agreement values (repeatable).
    #[arg(long = "agreement-value")]
    agreement_values: Vec<String>,

    #[arg(long, value_enum)]
    pattern: Option<PatternArg>,

    /// Mode-1 labels to exclude (repeatable).
    #[arg(long)]
    exclude1: Vec<String>,

    /// Mode-2 labels to exclude (repeatable).
    #[arg(long)]
    exclude2: Vec<String>,

    /// YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS.
    #[arg(long)]
    start: Option<String>,

    /// YYYY-MM-DD (inclusive) or YYYY-MM-DDTHH:MM:SS.
    #[arg(long)]
    end: Option<String>,

    #[arg(long, value_enum)]
    aggregation: Option<AggregationArg>,

    /// Window length for `--aggregation time-window`.
    #[arg(long, default_value = "30")]
    window_days: u32,

    /// Keep nodes inactive in a slice.
    #[arg(long)]
    isolates: bool,

    /// Do not drop statements imported twice.
    #[arg(long)]
    keep_duplicates: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg { Csv, Matrix, Graphml, Json }

#[derive(Clone, Copy, ValueEnum)]
enum NetworkTypeArg { OneMode, TwoMode }

#[derive(Clone, Copy, ValueEnum)]
enum PatternArg { Congruence, Conflict, Subtract, Separate }

#[derive(Clone, Copy, ValueEnum)]
enum AggregationArg { WholeRange, PerDocument, PerYear, TimeWindow }

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Types { store } => list_types(store).await,
        Commands::Export(args) => run_export(args).await,
    }
}

async fn list_types(path: PathBuf) -> Result<()> {
    let store = MemoryStore::open_snapshot(&path)
        .await
        .with_context(|| format!("loading {}", path.display()))?;
    for st in store.statement_types().await? {
        let bounds = store.date_bounds(st.id).await?;
        match bounds {
            Some(b) => println!("{} [{}] {} .. {}", st.name, st.id, b.start, b.end),
            None => println!("{} [{}] (no statements)", st.name, st.id),
        }
        for v in &st.variables {
            println!("  {:<24} {}", v.name, v.kind);
        }
    }
    Ok(())
}

async fn run_export(args: ExportArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ExportConfig::load(path).with_context(|| format!("reading {}", path.display()))?,
        None => ExportConfig::default(),
    };
    apply_overrides(&mut config, &args);

    let Some(output) = config.output.clone() else {
        bail!("no output file given (use --output or set `output` in the config)");
    };
    let format = config.output_format();

    let store = MemoryStore::open_snapshot(&args.store)
        .await
        .with_context(|| format!("loading {}", args.store.display()))?;
    let Some(schema) = store.statement_type_by_name(&config.statement_type).await? else {
        bail!(discourse_net::ConfigError::UnknownStatementType(config.statement_type.clone()));
    };
    let bounds = store.date_bounds(schema.id).await?;
    let spec = config.to_spec(&schema, bounds)?;
    spec.validate(&schema)?;

    let control = Arc::new(ExportControl::new());
    let watcher = {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling export");
                control.cancel();
            }
        })
    };

    let outcome = engine::export(&store, &spec, config.engine_options(), &control).await;
    watcher.abort();

    let result = match outcome? {
        ExportOutcome::Completed(result) => result,
        ExportOutcome::Cancelled => {
            eprintln!("export cancelled, nothing written");
            std::process::exit(130);
        }
    };

    for w in &result.warnings {
        eprintln!("warning: statement {} skipped: {}", w.statement, w.message);
    }
    if result.is_empty() {
        tracing::warn!("no statements matched the export settings; writing an empty {format} file");
    }

    export::write_file(&result.networks, format, &output)
        .with_context(|| format!("writing {}", output.display()))?;
    eprintln!(
        "wrote {} network(s) from {} statement(s) to {} ({format}, {} skipped, {} duplicate(s) removed)",
        result.networks.len(),
        result.statements_used,
        output.display(),
        result.warnings.len(),
        result.duplicates_removed,
    );
    Ok(())
}

fn apply_overrides(config: &mut ExportConfig, args: &ExportArgs) {
    if let Some(v) = &args.output { config.output = Some(v.clone()); }
    if let Some(v) = args.format {
        config.format = Some(match v {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Matrix => OutputFormat::Matrix,
            FormatArg::Graphml => OutputFormat::GraphMl,
            FormatArg::Json => OutputFormat::Json,
        });
    }
    if let Some(v) = &args.statement_type { config.statement_type = v.clone(); }
    if let Some(v) = &args.mode1 { config.mode1 = v.clone(); }
    if let Some(v) = &args.mode2 { config.mode2 = v.clone(); }
    if let Some(v) = args.network_type {
        config.network_type = match v {
            NetworkTypeArg::OneMode => NetworkType::OneMode,
            NetworkTypeArg::TwoMode => NetworkType::TwoMode,
        };
    }
    if let Some(v) = &args.agreement { config.agreement.variable = Some(v.clone()); }
    if !args.agreement_values.is_empty() {
        config.agreement.values = args.agreement_values.iter().map(|s| parse_value(s)).collect();
    }
    if let Some(v) = args.pattern {
        config.agreement.pattern = match v {
            PatternArg::Congruence => AgreementPattern::Congruence,
            PatternArg::Conflict => AgreementPattern::Conflict,
            PatternArg::Subtract => AgreementPattern::Subtract,
            PatternArg::Separate => AgreementPattern::Separate,
        };
    }
    config.exclude.mode1.extend(args.exclude1.iter().cloned());
    config.exclude.mode2.extend(args.exclude2.iter().cloned());
    if let Some(v) = &args.start { config.start = Some(v.clone()); }
    if let Some(v) = &args.end { config.end = Some(v.clone()); }
    if let Some(v) = args.aggregation {
        config.aggregation = match v {
            AggregationArg::WholeRange => AggregationRule::WholeRange,
            AggregationArg::PerDocument => AggregationRule::PerDocument,
            AggregationArg::PerYear => AggregationRule::PerYear,
            AggregationArg::TimeWindow => AggregationRule::TimeWindow { days: args.window_days },
        };
    }
    if args.isolates { config.isolates = true; }
    if args.keep_duplicates { config.deduplicate = false; }
}

/// `true`/`false`, then integers, then plain text.
fn parse_value(s: &str) -> Value {
    match s {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => s.parse::<i64>().map(Value::Integer).unwrap_or_else(|_| Value::from(s)),
    }
}
