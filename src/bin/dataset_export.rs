//! Data Set Export CLI
//!
//! Loads a snapshot, validates it and prints one export as JSON:
//! 1. `nested` - parameters/groups of one data set
//! 2. `flat` - dotted-path leaves of one data set (or of every data set of the list)
//! 3. `ui` - attribute tree of a list with one column per data set
//! 4. `structure` - dotted leaf paths of a list's schema
//!
//! Usage:
//!   cargo run --features cli --bin dataset_export -- \
//!     --snapshot model.yaml \
//!     --list Customers \
//!     --data-set Customer1 \
//!     --format nested
//!
//! Logging goes to stderr and follows `RUST_LOG`.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dataset_resolver::{
    flatten_data_set, flatten_list, structure_paths, validate, DataSet, DataSetList,
    DataSetProvider, DataSetStore, EngineConfig, ExportContext, NestedExporter, UiTreeBuilder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Nested,
    Flat,
    Ui,
    Structure,
}

/// Export data sets with overlaps resolved
#[derive(Parser, Debug)]
#[command(name = "dataset_export")]
#[command(about = "Export data sets from a snapshot with overlaps resolved")]
struct Args {
    /// Snapshot file (.json, .yaml or .yml)
    #[arg(long, short = 's')]
    snapshot: PathBuf,

    /// Engine configuration file (YAML); defaults come from the environment
    #[arg(long, short = 'c', env = "DATASET_CONFIG")]
    config: Option<PathBuf>,

    /// Name of the data set list to export from
    #[arg(long, short = 'l')]
    list: String,

    /// Name of the data set; `ui` and `flat` use every data set of the list when omitted
    #[arg(long, short = 'd')]
    data_set: Option<String>,

    #[arg(long, short = 'f', value_enum, default_value = "nested")]
    format: Format,

    /// Export even when validation reports blocking errors
    #[arg(long)]
    skip_validation: bool,

    /// Pretty-print the JSON output
    #[arg(long, short = 'p')]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dataset_resolver=info,dataset_export=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::from_env(),
    };

    let store = DataSetStore::from_file(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;
    tracing::info!(snapshot = %args.snapshot.display(), "Snapshot loaded");

    let result = validate(&store);
    if !result.is_valid() {
        for error in &result.errors {
            tracing::error!(code = error.code(), "{}", error);
        }
        if !args.skip_validation {
            bail!("Snapshot has {} blocking validation errors", result.errors.len());
        }
    }

    let list = store
        .list_by_name(&args.list)
        .ok_or_else(|| anyhow!("Data set list '{}' not found", args.list))?;
    let data_set = args
        .data_set
        .as_deref()
        .map(|name| {
            store
                .data_set_by_name(list.id, name)
                .ok_or_else(|| anyhow!("Data set '{}' not found in list '{}'", name, list.name))
        })
        .transpose()?;

    let ctx = ExportContext::new(&store).with_config(config);
    let output = export(&ctx, list, data_set, args.format)?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}

fn export<'a>(
    ctx: &ExportContext<'a>,
    list: &'a DataSetList,
    data_set: Option<&'a DataSet>,
    format: Format,
) -> Result<Value> {
    let value = match (format, data_set) {
        (Format::Nested, Some(data_set)) => {
            NestedExporter::with_context(ctx.clone()).export_json(data_set)?
        }
        (Format::Nested, None) => bail!("--data-set is required for the nested format"),
        (Format::Flat, Some(data_set)) => serde_json::to_value(flatten_data_set(ctx, data_set)?)?,
        (Format::Flat, None) => {
            let rows: serde_json::Map<String, Value> = flatten_list(ctx, list)?
                .into_iter()
                .map(|(name, leaves)| Ok((name, serde_json::to_value(leaves)?)))
                .collect::<Result<_>>()?;
            Value::Object(rows)
        }
        (Format::Ui, data_set) => {
            let rows = match data_set {
                Some(data_set) => vec![data_set],
                None => ctx.provider().data_sets_of(list.id),
            };
            serde_json::to_value(UiTreeBuilder::with_context(ctx.clone()).build(list, &rows)?)?
        }
        (Format::Structure, _) => {
            serde_json::to_value(structure_paths(ctx.provider(), list, ctx.config())?)?
        }
    };
    Ok(value)
}
