//! One-shot module loading

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::Table;

use loadstone_core::LoadOptions;

/// Load arguments
#[derive(Args)]
pub struct LoadArgs {
    /// Module paths to load
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Load all paths as one batch (all-or-nothing callback semantics,
    /// co-load tracking)
    #[arg(long)]
    pub batch: bool,

    /// Suppress captured module output
    #[arg(long)]
    pub quiet: bool,

    /// Settings file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the load command
pub fn run(args: LoadArgs) -> Result<()> {
    let mut manager = super::build_manager(args.config.as_ref());
    let options = LoadOptions {
        hide_output: args.quiet,
        hide_errors: false,
    };

    tracing::debug!(count = args.paths.len(), batch = args.batch, "Loading modules");

    if args.batch {
        let paths: Vec<&str> = args.paths.iter().map(String::as_str).collect();
        manager.load_batch_with(&paths, None, options);
    } else {
        for path in &args.paths {
            manager.load_with(path, None, options);
        }
    }

    let success_icon = manager.settings().success_icon.clone();
    let failed_icon = manager.settings().failed_icon.clone();

    let mut table = Table::new();
    table.set_header(["", "module", "duration", "failure"]);
    for path in manager.known_modules() {
        if let Some(report) = manager.status(&path) {
            let icon = if report.imported() {
                success_icon.clone()
            } else {
                failed_icon.clone()
            };
            table.add_row([
                icon,
                path.clone(),
                format!("{} ms", report.duration_millis()),
                report.failure.unwrap_or_default(),
            ]);
        }
    }
    println!("{table}");
    println!(
        "{} loaded, {} failed",
        manager.success_count(),
        manager.failure_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: LoadArgs,
    }

    #[test]
    fn test_load_args_parsing() {
        let cli = TestCli::parse_from(["test", "mod.a", "mod.b", "--batch"]);
        assert_eq!(cli.args.paths, vec!["mod.a", "mod.b"]);
        assert!(cli.args.batch);
        assert!(!cli.args.quiet);
        assert!(cli.args.config.is_none());
    }

    #[test]
    fn test_load_args_require_paths() {
        let result = TestCli::try_parse_from(["test"]);
        assert!(result.is_err());
    }
}
