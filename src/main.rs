use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use resume_parser::parser::blocks::document_from_text;
use resume_parser::parser::catalog::Catalog;
use resume_parser::parser::suggest::GazetteerRecognizer;
use resume_parser::skills::{detect_proficiency, SkillsTaxonomy};
use resume_parser::{Document, Pipeline, ProcessedResponse, Settings};

#[derive(Parser)]
#[command(name = "resume_parser", about = "Extract structured profile fields from resume text")]
struct Cli {
    /// Print indented JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and print the response
    Process {
        /// Layout JSON, or plain text with --text
        path: PathBuf,
        /// Treat the input as plain text (form feeds separate pages)
        #[arg(long)]
        text: bool,
    },
    /// Split a document into sections
    Sections {
        path: PathBuf,
        #[arg(long)]
        text: bool,
    },
    /// Extract catalog fields only
    Fields {
        path: PathBuf,
        #[arg(long)]
        text: bool,
    },
    /// Bucket a skills fragment into categories
    Categorize { text: String },
    /// Score the proficiency wording of a fragment
    Proficiency { text: String },
    /// Propose alternative values for the given field types
    Suggest {
        path: PathBuf,
        /// Field type to suggest for (name, email, skills); repeatable
        #[arg(short, long = "field", required = true)]
        fields: Vec<String>,
        #[arg(long)]
        text: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load().context("loading settings")?;
    info!(?settings, "Starting resume parser");

    match cli.command {
        Commands::Process { path, text } => {
            let pipeline = build_pipeline(&settings)?;
            let document = read_document(&path, text)?;
            let t0 = Instant::now();
            let result = pipeline
                .process(document)
                .with_context(|| format!("processing {}", path.display()))?;
            let response = ProcessedResponse::from_result(&result, t0.elapsed())
                .context("building response")?;
            print_json(&response, cli.pretty)
        }
        Commands::Sections { path, text } => {
            let pipeline = build_pipeline(&settings)?;
            let document = read_document(&path, text)?;
            print_json(&pipeline.sections(&document), cli.pretty)
        }
        Commands::Fields { path, text } => {
            let pipeline = build_pipeline(&settings)?;
            let document = read_document(&path, text)?;
            print_json(&pipeline.fields(&document), cli.pretty)
        }
        Commands::Categorize { text } => {
            let taxonomy = load_taxonomy(&settings)?;
            print_json(&taxonomy.categorize(&text), cli.pretty)
        }
        Commands::Proficiency { text } => {
            println!("{}", detect_proficiency(&text));
            Ok(())
        }
        Commands::Suggest { path, fields, text } => {
            let pipeline = build_pipeline(&settings)?;
            let document = read_document(&path, text)?;
            let suggestions = pipeline
                .suggestions(document, &fields)
                .with_context(|| format!("suggesting for {}", path.display()))?;
            print_json(&suggestions, cli.pretty)
        }
    }
}

fn build_pipeline(settings: &Settings) -> anyhow::Result<Pipeline> {
    let catalog = match &settings.catalog_path {
        Some(path) => Catalog::from_path(path),
        None => Catalog::builtin(),
    }
    .context("loading field catalog")?;

    let recognizer = match &settings.gazetteer_path {
        Some(path) => GazetteerRecognizer::from_path(path),
        None => GazetteerRecognizer::builtin(),
    }
    .context("loading person gazetteer")?;

    Ok(Pipeline::new(
        Arc::new(catalog),
        Arc::new(load_taxonomy(settings)?),
        Arc::new(recognizer),
        settings,
    ))
}

fn load_taxonomy(settings: &Settings) -> anyhow::Result<SkillsTaxonomy> {
    match &settings.taxonomy_path {
        Some(path) => SkillsTaxonomy::from_path(path),
        None => SkillsTaxonomy::builtin(),
    }
    .context("loading skills taxonomy")
}

/// Layout JSON unless `--text` is given or the file ends in `.txt`.
fn read_document(path: &Path, as_text: bool) -> anyhow::Result<Document> {
    let is_text = as_text || path.extension().is_some_and(|ext| ext == "txt");
    if is_text {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(document_from_text(&raw))
    } else {
        Ok(Document::from_json_path(path)?)
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
