// northwind/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use northwind_core::application::Stage;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "northwind")]
#[command(about = "Northwind batch ETL with an auditable data-quality log", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs the pipeline up to a stage (extract -> load -> transform -> build)
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Last stage to run: extract | load | transform | build | all
        #[arg(long, default_value = "all")]
        stage: Stage,

        /// Ignore Products.csv even if the project enables it
        #[arg(long)]
        no_products: bool,
    },

    /// 📋 Shows the latest DQ runs and the issues of the last one
    Report {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Number of runs to display
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// 🔍 Inspects a Parquet file (schema + row count + sample rows)
    Inspect {
        /// Parquet file to inspect
        #[arg(long, default_value = "data/02-model/sales_by_customer.parquet")]
        file: PathBuf,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["northwind", "run"]);
        match args.command {
            Commands::Run {
                project_dir,
                stage,
                no_products,
            } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                assert_eq!(stage, Stage::Build);
                assert!(!no_products);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_stage() -> Result<()> {
        let args = Cli::parse_from([
            "northwind",
            "run",
            "--stage",
            "load",
            "--no-products",
            "--project-dir",
            "/tmp",
        ]);
        match args.command {
            Commands::Run {
                project_dir,
                stage,
                no_products,
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(stage, Stage::Load);
                assert!(no_products);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_stage() {
        assert!(Cli::try_parse_from(["northwind", "run", "--stage", "deploy"]).is_err());
    }

    #[test]
    fn test_cli_parse_report() -> Result<()> {
        let args = Cli::parse_from(["northwind", "report", "--limit", "3"]);
        match args.command {
            Commands::Report { limit, .. } => {
                assert_eq!(limit, 3);
                Ok(())
            }
            _ => bail!("Expected Report command"),
        }
    }

    #[test]
    fn test_cli_parse_inspect() -> Result<()> {
        let args = Cli::parse_from(["northwind", "inspect"]);
        match args.command {
            Commands::Inspect { file, limit } => {
                assert!(file.ends_with("sales_by_customer.parquet"));
                assert_eq!(limit, 5);
                Ok(())
            }
            _ => bail!("Expected Inspect command"),
        }
    }
}
