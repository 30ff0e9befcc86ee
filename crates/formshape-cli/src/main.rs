//! Formshape CLI
//!
//! Operator tooling for inspecting templates without a running UI:
//! - `normalize` — parse a template file and print the resolved field
//!   model plus the seeded initial state
//! - `branches` — score a template's node-shape alternatives and show
//!   which branch selection would pick
//! - `concepts` — sort a flat concept list into its selector ordering

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use formshape_engine::{
    compile_rules, normalize, select_branch, sort_concepts, FormMode, NoCache, RoleHints,
};
use formshape_schema::{parse_template, FieldValue, OntologyConcept};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "formshape")]
#[command(author, version, about = "Schema-driven form synthesis toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a template and print fields plus initial state.
    Normalize {
        /// Template document (JSON-LD)
        template: PathBuf,
        /// Form mode to normalize under
        #[arg(short, long, default_value = "add")]
        mode: FormMode,
        /// Emit machine-readable JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// Score a template's branch alternatives.
    Branches {
        /// Template document (JSON-LD)
        template: PathBuf,
        #[arg(short, long, default_value = "edit")]
        mode: FormMode,
    },
    /// Sort a flat concept list (JSON array) for a hierarchical selector.
    Concepts {
        /// Concept list file
        concepts: PathBuf,
        /// Label or type value pinned first
        #[arg(short, long, default_value = "")]
        priority: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize {
            template,
            mode,
            json,
        } => cmd_normalize(&template, mode, json),
        Commands::Branches { template, mode } => cmd_branches(&template, mode),
        Commands::Concepts { concepts, priority } => cmd_concepts(&concepts, &priority),
    }
}

fn load_template(path: &PathBuf) -> Result<formshape_schema::TemplateDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading template {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw).context("template is not JSON")?;
    parse_template(&value).context("parsing template document")
}

fn cmd_normalize(path: &PathBuf, mode: FormMode, json: bool) -> Result<()> {
    let template = load_template(path)?;
    let hints = RoleHints::none();

    // branch-specific nodes go through selection first
    let form = if template.node_shapes.is_empty() {
        normalize(&template.properties, mode, &hints, &NoCache)
    } else {
        let selection = select_branch(&template.node_shapes, mode, &hints, &NoCache)
            .expect("non-empty branch list");
        selection.form
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&form.state)?);
        return Ok(());
    }

    println!("{} ({} mode)", "normalized fields".bold(), mode);
    for shape in form.shapes() {
        let rules = compile_rules(shape, mode);
        let marker = if rules.required {
            "required".red().to_string()
        } else {
            "optional".dimmed().to_string()
        };
        println!("  {:<32} {}", shape.field_id().cyan(), marker);
    }

    println!("\n{}", "initial state".bold());
    for (key, value) in &form.state {
        let rendered = match value {
            FieldValue::Scalar(s) if s.is_empty() => "(empty)".dimmed().to_string(),
            FieldValue::Scalar(s) => s.clone(),
            FieldValue::Flag(b) => b.to_string(),
            FieldValue::Rows(rows) => format!("[{} rows]", rows.rows.len()),
            FieldValue::Unset => "(unset)".dimmed().to_string(),
        };
        println!("  {:<32} {}", key, rendered);
    }
    Ok(())
}

fn cmd_branches(path: &PathBuf, mode: FormMode) -> Result<()> {
    let template = load_template(path)?;
    if template.node_shapes.is_empty() {
        println!("template declares no branch alternatives");
        return Ok(());
    }

    let selection = select_branch(&template.node_shapes, mode, &RoleHints::none(), &NoCache)
        .expect("non-empty branch list");
    for (index, branch) in template.node_shapes.iter().enumerate() {
        let scratch = normalize(&branch.property, mode, &RoleHints::none(), &NoCache);
        let score = formshape_engine::branch::score_state(&scratch.state);
        let tag = if index == selection.winner {
            "← selected".green().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<24} populated={} missing={} {}",
            branch.label, score.populated, score.missing, tag
        );
    }
    Ok(())
}

fn cmd_concepts(path: &PathBuf, priority: &str) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading concepts {}", path.display()))?;
    let concepts: Vec<OntologyConcept> =
        serde_json::from_str(&raw).context("concept list is not valid JSON")?;

    let mappings = sort_concepts(&concepts, priority);
    for concept in &mappings.root {
        println!("{}", concept.label.bold());
        if let Some(children) = mappings.children_of(&concept.type_value) {
            for child in children {
                println!("  {}", child.label);
            }
        }
    }
    Ok(())
}
