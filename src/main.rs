use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use arbor_forest::{
    DecisionTreeConfig, HoldoutSplit, RandomForestConfig, Record, majority_label,
};
use arbor_io::DatasetReader;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Numeric decision trees and random forests with information-gain splits")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the holdout split and training
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input file and holdout options shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the input CSV file
    #[arg(long)]
    data: PathBuf,

    /// Name of the class column
    #[arg(long, default_value = "class")]
    target: String,

    /// Column names for a file without a header row
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Field delimiter (a single ASCII character)
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Fraction of records used for training, the rest for testing
    #[arg(long, default_value_t = 0.8)]
    train_fraction: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Train a single decision tree and report holdout accuracy
    Tree {
        #[command(flatten)]
        input: DataArgs,

        /// Maximum tree depth (unlimited if omitted)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Majority fraction at which a node stops splitting
        #[arg(long, default_value_t = 1.0)]
        purity: f64,

        /// Record count at or below which a node stops splitting
        #[arg(long, default_value_t = 0)]
        min_examples: usize,

        /// Attributes drawn at random at each node (all if omitted)
        #[arg(long)]
        random_attributes: Option<usize>,

        /// Include the rendered tree in the output
        #[arg(long, default_value_t = false)]
        show_tree: bool,
    },

    /// Train a random forest and report holdout accuracy
    Forest {
        #[command(flatten)]
        input: DataArgs,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 10)]
        n_trees: usize,

        /// Maximum depth of each tree (unlimited if omitted)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Attributes drawn at random at each node (all if omitted)
        #[arg(long)]
        attributes_per_node: Option<usize>,
    },

    /// Vary tree count, depth, and attributes per node on one holdout split
    Sweep {
        #[command(flatten)]
        input: DataArgs,

        /// Tree counts for the tree-count experiment (depth 10, all attributes)
        #[arg(long, value_delimiter = ',', default_values_t = [1, 5, 10, 50, 100])]
        n_trees_grid: Vec<usize>,

        /// Depths for the depth experiment (50 trees); "none" means unlimited
        #[arg(long, value_delimiter = ',', default_values = ["1", "3", "5", "10", "none"])]
        depth_grid: Vec<String>,

        /// Attribute counts for the attribute experiment (50 trees, depth 10);
        /// "all" means every attribute
        #[arg(long, value_delimiter = ',', default_values = ["1", "3", "5", "7", "all"])]
        attributes_grid: Vec<String>,
    },
}

#[derive(Serialize)]
struct TreeOutput {
    target: String,
    n_train: usize,
    n_test: usize,
    max_depth: Option<usize>,
    purity_threshold: f64,
    min_examples_to_split: usize,
    random_attributes: Option<usize>,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    train_accuracy: f64,
    test_accuracy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<String>,
}

#[derive(Serialize)]
struct ForestOutput {
    target: String,
    n_train: usize,
    n_test: usize,
    #[serde(flatten)]
    run: RunOutput,
}

#[derive(Serialize)]
struct RunOutput {
    n_trees: usize,
    max_depth: Option<usize>,
    attributes_per_node: Option<usize>,
    train_accuracy: f64,
    test_accuracy: f64,
}

#[derive(Serialize)]
struct ExperimentOutput {
    varied: &'static str,
    runs: Vec<RunOutput>,
}

#[derive(Serialize)]
struct SweepOutput {
    target: String,
    n_train: usize,
    n_test: usize,
    experiments: Vec<ExperimentOutput>,
}

/// Read the dataset and cut it into `(train, test)`.
fn load_holdout(args: &DataArgs, seed: u64) -> Result<(Vec<Record>, Vec<Record>)> {
    let delimiter = u8::try_from(args.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter {:?} is not a single ASCII character", args.delimiter))?;

    let mut reader = DatasetReader::new(&args.data)
        .with_delimiter(delimiter)
        .with_target(args.target.as_str());
    if let Some(columns) = &args.columns {
        reader = reader.with_column_names(columns.clone());
    }
    let dataset = reader.read().context("failed to read input CSV")?;

    let split = HoldoutSplit::new(args.train_fraction)?.with_seed(seed);
    let (train, test) = split.split(dataset.records());
    info!(n_train = train.len(), n_test = test.len(), "holdout split");
    Ok((train, test))
}

/// Parse a grid entry where `unbounded` (e.g. "none" or "all") means no limit.
fn parse_limit(raw: &str, unbounded: &str) -> Result<Option<usize>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case(unbounded) {
        return Ok(None);
    }
    let value = raw
        .parse::<usize>()
        .with_context(|| format!("invalid grid value {raw:?} (expected an integer or {unbounded:?})"))?;
    Ok(Some(value))
}

fn run_forest(
    config: &RandomForestConfig,
    train: &[Record],
    test: &[Record],
    target: &str,
) -> Result<RunOutput> {
    let forest = config.fit(train, target).context("forest training failed")?;
    let train_accuracy = forest.evaluate(train, target).context("training evaluation failed")?;
    let test_accuracy = forest.evaluate(test, target).context("test evaluation failed")?;
    info!(
        n_trees = config.n_trees(),
        max_depth = ?config.max_depth(),
        attributes_per_node = ?config.attributes_per_node(),
        train_accuracy,
        test_accuracy,
        "forest evaluated"
    );
    Ok(RunOutput {
        n_trees: config.n_trees(),
        max_depth: config.max_depth(),
        attributes_per_node: config.attributes_per_node(),
        train_accuracy,
        test_accuracy,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Tree {
            input,
            max_depth,
            purity,
            min_examples,
            random_attributes,
            show_tree,
        } => {
            let (train, test) = load_holdout(&input, cli.seed)?;
            let default_class = majority_label(&train, &input.target)
                .context("cannot pick a default class from the training set")?;

            let config = DecisionTreeConfig::new()
                .with_max_depth(max_depth)
                .with_purity_threshold(purity)
                .with_min_examples_to_split(min_examples)
                .with_num_random_attributes(random_attributes)
                .with_seed(cli.seed);

            let tree = config
                .fit(&train, &input.target, default_class)
                .context("tree training failed")?;

            let output = TreeOutput {
                target: input.target.clone(),
                n_train: train.len(),
                n_test: test.len(),
                max_depth,
                purity_threshold: purity,
                min_examples_to_split: min_examples,
                random_attributes,
                n_nodes: tree.n_nodes(),
                n_leaves: tree.n_leaves(),
                depth: tree.depth(),
                train_accuracy: tree
                    .evaluate(&train, &input.target)
                    .context("training evaluation failed")?,
                test_accuracy: tree
                    .evaluate(&test, &input.target)
                    .context("test evaluation failed")?,
                tree: show_tree.then(|| tree.to_string()),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Forest {
            input,
            n_trees,
            max_depth,
            attributes_per_node,
        } => {
            let (train, test) = load_holdout(&input, cli.seed)?;

            let config = RandomForestConfig::new(n_trees)?
                .with_max_depth(max_depth)
                .with_attributes_per_node(attributes_per_node)
                .with_seed(cli.seed);

            let output = ForestOutput {
                target: input.target.clone(),
                n_train: train.len(),
                n_test: test.len(),
                run: run_forest(&config, &train, &test, &input.target)?,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Sweep {
            input,
            n_trees_grid,
            depth_grid,
            attributes_grid,
        } => {
            let depths = depth_grid
                .iter()
                .map(|raw| parse_limit(raw, "none"))
                .collect::<Result<Vec<_>>>()?;
            let attribute_counts = attributes_grid
                .iter()
                .map(|raw| parse_limit(raw, "all"))
                .collect::<Result<Vec<_>>>()?;

            let (train, test) = load_holdout(&input, cli.seed)?;
            let target = input.target.as_str();

            let mut by_trees = Vec::with_capacity(n_trees_grid.len());
            for &n_trees in &n_trees_grid {
                let config = RandomForestConfig::new(n_trees)?
                    .with_max_depth(Some(10))
                    .with_seed(cli.seed);
                by_trees.push(run_forest(&config, &train, &test, target)?);
            }

            let mut by_depth = Vec::with_capacity(depths.len());
            for &max_depth in &depths {
                let config = RandomForestConfig::new(50)?
                    .with_max_depth(max_depth)
                    .with_seed(cli.seed);
                by_depth.push(run_forest(&config, &train, &test, target)?);
            }

            let mut by_attributes = Vec::with_capacity(attribute_counts.len());
            for &attributes_per_node in &attribute_counts {
                let config = RandomForestConfig::new(50)?
                    .with_max_depth(Some(10))
                    .with_attributes_per_node(attributes_per_node)
                    .with_seed(cli.seed);
                by_attributes.push(run_forest(&config, &train, &test, target)?);
            }

            let output = SweepOutput {
                target: input.target.clone(),
                n_train: train.len(),
                n_test: test.len(),
                experiments: vec![
                    ExperimentOutput {
                        varied: "n_trees",
                        runs: by_trees,
                    },
                    ExperimentOutput {
                        varied: "max_depth",
                        runs: by_depth,
                    },
                    ExperimentOutput {
                        varied: "attributes_per_node",
                        runs: by_attributes,
                    },
                ],
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
