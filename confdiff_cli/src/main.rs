use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use confdiff_common::{
    ensure_config, load_config, load_config_from, CollectionDiff, DiffResult, LoadedConfig, Policy,
};
use confdiff_core::{DiffEngine, DocumentComparison};
use serde::Serialize;
use serde_json::Value;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_EQUAL: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_DIFFERENT: i32 = 2;

#[derive(Parser)]
#[command(name = "confdiff")]
#[command(author = "ConfDiff Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Structural comparison of proxy configuration documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two configuration documents (JSON, YAML or TOML)
    Compare(CompareArgs),

    /// Show the configuration file location and effective settings
    Config {
        /// Write the default configuration file if it does not exist
        #[arg(long)]
        init: bool,

        /// Use the portable configuration next to the executable
        #[arg(long)]
        portable: bool,
    },
}

#[derive(Args)]
struct CompareArgs {
    /// Left document path
    left: PathBuf,

    /// Right document path
    right: PathBuf,

    /// Treat absent values as equal to empty ones ("", 0, false, [], {})
    #[arg(short = 'e', long)]
    absent_as_empty: bool,

    /// Treat absent values as distinct from empty ones
    #[arg(long, conflicts_with = "absent_as_empty")]
    strict_absent: bool,

    /// Exclude identity fields (e.g. "index") from the comparison
    #[arg(short = 'i', long)]
    ignore_identity: bool,

    /// Object key treated as an identity field (can be specified multiple times)
    #[arg(long = "identity-field")]
    identity_fields: Vec<String>,

    /// Report differing lists and maps as whole values
    #[arg(short = 'w', long)]
    whole_collections: bool,

    /// Configuration file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Disable ANSI colors in output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    // Initialize tracing to stderr (so JSON output can go cleanly to stdout)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(EXIT_ERROR);
            }
        },
    };

    let code = match cli.command {
        Commands::Compare(args) => match run_compare(&args) {
            Ok(true) => EXIT_EQUAL,
            Ok(false) => EXIT_DIFFERENT,
            Err(e) => {
                error!("Compare failed: {:#}", e);
                EXIT_ERROR
            }
        },
        Commands::Config { init, portable } => match run_config(init, portable) {
            Ok(()) => EXIT_EQUAL,
            Err(e) => {
                error!("Config failed: {:#}", e);
                EXIT_ERROR
            }
        },
    };

    std::process::exit(code);
}

/// Returns whether the documents are equal
fn run_compare(args: &CompareArgs) -> Result<bool> {
    for path in [&args.left, &args.right] {
        if !path.is_file() {
            anyhow::bail!("Path is not a file: {}", path.display());
        }
    }

    let loaded = match &args.config {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            load_config_from(path)
        }
        None => load_config(false),
    }
    .context("failed to load configuration")?;
    info!("Using configuration: {}", loaded.path.display());

    let policy = resolve_policy(loaded.config.policy, args);
    let identity_fields = if args.identity_fields.is_empty() {
        loaded.config.identity_fields.clone()
    } else {
        args.identity_fields.clone()
    };
    info!("Policy: {:?}, identity fields: {:?}", policy, identity_fields);

    let engine = DiffEngine::new(policy).with_identity_fields(identity_fields);
    let comparison = engine
        .compare_files(&args.left, &args.right)
        .with_context(|| {
            format!(
                "failed to compare {} with {}",
                args.left.display(),
                args.right.display()
            )
        })?;

    if args.json {
        let report = build_json_report(&args.left, &args.right, &comparison);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let use_color = !args.no_color && std::io::stdout().is_terminal();
        print_text_report(&args.left, &args.right, &comparison, use_color);
    }

    Ok(comparison.equal)
}

/// Command-line switches override the configured policy
fn resolve_policy(configured: Policy, args: &CompareArgs) -> Policy {
    let mut policy = configured;
    if args.absent_as_empty {
        policy.treat_absent_as_empty = true;
    } else if args.strict_absent {
        policy.treat_absent_as_empty = false;
    }
    if args.ignore_identity {
        policy.ignore_identity_field = true;
    }
    if args.whole_collections {
        policy.collection_diff = CollectionDiff::Whole;
    }
    policy
}

fn run_config(init: bool, portable: bool) -> Result<()> {
    let loaded: LoadedConfig = if init {
        ensure_config(portable)?
    } else {
        load_config(portable)?
    };

    let state = if loaded.exists {
        "exists"
    } else if init {
        "created"
    } else {
        "not found, using defaults"
    };
    println!("Config file: {} ({})", loaded.path.display(), state);
    println!("{}", toml::to_string_pretty(&loaded.config)?);
    Ok(())
}

fn print_text_report(left: &Path, right: &Path, comparison: &DocumentComparison, use_color: bool) {
    let (diff_color, reset) = if use_color {
        ("\x1b[31m", "\x1b[0m")
    } else {
        ("", "")
    };

    println!("\n{}", "=".repeat(80));
    println!("Comparison Results");
    println!("{}", "=".repeat(80));

    for leaf in comparison.diff.flatten() {
        println!(
            "{}  !=  {} {}: {} -> {}",
            diff_color,
            reset,
            leaf.path,
            format_value(leaf.left),
            format_value(leaf.right)
        );
    }

    println!("\n{}", "=".repeat(80));
    let verdict = if comparison.equal {
        "equal"
    } else {
        "different"
    };
    println!("Summary:");
    println!("  Left:            {}", left.display());
    println!("  Right:           {}", right.display());
    println!("  Changed paths:   {}", comparison.changed_paths);
    println!("  Result:          {}", verdict);
    println!("{}", "=".repeat(80));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::from("(absent)"),
        other => other.to_string(),
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    left: String,
    right: String,
    equal: bool,
    changed_paths: usize,
    diff: &'a DiffResult,
}

fn build_json_report<'a>(
    left: &Path,
    right: &Path,
    comparison: &'a DocumentComparison,
) -> JsonReport<'a> {
    JsonReport {
        left: left.to_string_lossy().to_string(),
        right: right.to_string_lossy().to_string(),
        equal: comparison.equal,
        changed_paths: comparison.changed_paths,
        diff: &comparison.diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(flags: &[&str]) -> CompareArgs {
        let mut argv = vec!["confdiff", "compare", "left.json", "right.json"];
        argv.extend_from_slice(flags);
        match Cli::parse_from(argv).command {
            Commands::Compare(args) => args,
            Commands::Config { .. } => panic!("expected compare"),
        }
    }

    #[test]
    fn test_resolve_policy_defaults_to_config() {
        let configured = Policy::lenient();
        assert_eq!(resolve_policy(configured, &args(&[])), configured);
    }

    #[test]
    fn test_resolve_policy_flags_override() {
        let policy = resolve_policy(Policy::default(), &args(&["-e", "-i", "-w"]));
        assert!(policy.treat_absent_as_empty);
        assert!(policy.ignore_identity_field);
        assert_eq!(policy.collection_diff, CollectionDiff::Whole);

        let policy = resolve_policy(Policy::lenient(), &args(&["--strict-absent"]));
        assert!(!policy.treat_absent_as_empty);
        assert!(policy.ignore_identity_field);
    }

    #[test]
    fn test_conflicting_absent_flags_rejected() {
        let result = Cli::try_parse_from([
            "confdiff",
            "compare",
            "a.json",
            "b.json",
            "--absent-as-empty",
            "--strict-absent",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_identity_field_flag_repeats() {
        let parsed = args(&["--identity-field", "index", "--identity-field", "id"]);
        assert_eq!(parsed.identity_fields, vec!["index", "id"]);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Null), "(absent)");
        assert_eq!(format_value(&json!("http")), "\"http\"");
        assert_eq!(format_value(&json!(80)), "80");
    }

    #[test]
    fn test_build_json_report() {
        let comparison = DiffEngine::default()
            .compare_values(json!({"mode": "http"}), json!({"mode": "tcp"}));
        let report = build_json_report(Path::new("/left.json"), Path::new("/right.json"), &comparison);

        assert_eq!(report.left, "/left.json");
        assert_eq!(report.right, "/right.json");
        assert!(!report.equal);
        assert_eq!(report.changed_paths, 1);
        assert_eq!(
            serde_json::to_value(&report).unwrap()["diff"],
            json!({"mode": ["http", "tcp"]})
        );
    }
}
