//! Questionnaire rule-engine command-line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use octofhir_qrules::engine::score;
use octofhir_qrules::{Questionnaire, RuleSession, urls};
use std::fs;
use std::path::{Path, PathBuf};

/// Questionnaire rule tools
#[derive(Parser)]
#[command(name = "qrules")]
#[command(author, version, about = "FHIR Questionnaire rule tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the variables and launch contexts of a questionnaire
    Variables {
        /// Questionnaire JSON file
        file: PathBuf,
        /// linkId of the item whose rule is edited
        #[arg(short, long)]
        link_id: String,
        /// Final-expression extension URL
        #[arg(short, long, default_value = urls::CALCULATED_EXPRESSION)]
        url: String,
    },
    /// Re-export a questionnaire with a new final expression
    Export {
        /// Questionnaire JSON file
        file: PathBuf,
        /// linkId of the item whose rule is edited
        #[arg(short, long)]
        link_id: String,
        /// FHIRPath text of the final expression
        #[arg(short, long)]
        expression: String,
        /// Final-expression extension URL
        #[arg(short, long, default_value = urls::CALCULATED_EXPRESSION)]
        url: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Attach a generated total-score rule at an item
    AddScores {
        /// Questionnaire JSON file
        file: PathBuf,
        /// linkId of the item receiving the calculated total
        #[arg(short, long)]
        link_id: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove generated total-score rules
    RemoveScores {
        /// Questionnaire JSON file
        file: PathBuf,
        /// Only strip the item with this linkId (default: all items)
        #[arg(short, long)]
        link_id: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check whether an item carries a generated total-score rule
    CheckScore {
        /// Questionnaire JSON file
        file: PathBuf,
        /// linkId of the item to check
        #[arg(short, long)]
        link_id: String,
    },
}

fn main() -> Result<()> {
    human_panic::setup_panic!();
    env_logger::init();

    run(Cli::parse().command)
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Variables { file, link_id, url } => {
            let mut session = RuleSession::new();
            session.import(&url, load(&file)?, &link_id);

            for uneditable in session.uneditable_variables() {
                println!(
                    "{:12} {} ({})",
                    "context".dimmed(),
                    uneditable.name.bold(),
                    uneditable.type_codes
                );
            }
            for variable in session.variables() {
                println!(
                    "{:12} {} = {}",
                    variable.kind.to_string().cyan(),
                    variable.label.bold(),
                    variable.expression
                );
            }
            if !session.final_expression().is_empty() {
                println!("{:12} {}", "final".green(), session.final_expression());
            }
            Ok(())
        }
        Commands::Export {
            file,
            link_id,
            expression,
            url,
            output,
        } => {
            let mut session = RuleSession::new();
            session.import(&url, load(&file)?, &link_id);
            let document = session.export(&url, &expression)?;
            write_output(&document, output.as_deref())
        }
        Commands::AddScores {
            file,
            link_id,
            output,
        } => {
            let mut document = load(&file)?;
            score::add_total_score_rule(&mut document, &link_id);
            write_output(&document, output.as_deref())
        }
        Commands::RemoveScores {
            file,
            link_id,
            output,
        } => {
            let mut document = load(&file)?;
            score::remove_sum_of_scores(&mut document, link_id.as_deref());
            write_output(&document, output.as_deref())
        }
        Commands::CheckScore { file, link_id } => {
            let document = load(&file)?;
            if score::is_score_calculation(&document, &link_id) {
                println!("{} is a generated score calculation", link_id.green());
            } else {
                println!("{} carries no generated score rule", link_id.yellow());
            }
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<Questionnaire> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn write_output(document: &Questionnaire, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("writing {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
