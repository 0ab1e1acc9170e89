use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use resumescore::analysis::pipeline::read_text;
use resumescore::{
    AnalysisPipeline, AnalysisResult, ClassifierConfig, ClassifierStore, Config, KeywordCatalog,
    Scorer, Storage,
};

#[derive(Parser, Debug)]
#[command(name = "resumescore")]
#[command(version = "0.1.0")]
#[command(about = "Score resumes against an ATS rubric and classify them by job category")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a single resume
    Analyze {
        /// Resume text file
        file: PathBuf,

        /// Job description text file to match against
        #[arg(short, long)]
        job_description: Option<PathBuf>,

        /// Output format (json, text, markdown)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keyword catalog JSON replacing the builtin vocabulary
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Record the result in the history database
        #[arg(long)]
        save: bool,
    },

    /// Score several resumes concurrently
    Batch {
        /// Resume text files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Job description text file to match against
        #[arg(short, long)]
        job_description: Option<PathBuf>,
    },

    /// Train the job-category classifier and save it
    Train {
        /// Corpus JSON: [{"text": "...", "label": "..."}]
        #[arg(short, long)]
        corpus: PathBuf,
    },

    /// Predict the job category of a resume with the saved classifier
    Classify {
        /// Resume text file
        file: PathBuf,
    },

    /// List stored analyses
    History {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Debug, Deserialize)]
struct CorpusEntry {
    text: String,
    label: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("resumescore=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        // Bad input gets a short message and a distinct exit code
        if let Some(err) = e.downcast_ref::<resumescore::Error>() {
            if err.is_client_error() {
                eprintln!("error: {}", err);
                std::process::exit(2);
            }
        }
        return Err(e);
    }

    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    match args.command {
        Command::Analyze {
            file,
            job_description,
            format,
            output,
            catalog,
            save,
        } => {
            let catalog = match catalog {
                Some(path) => KeywordCatalog::from_json_file(path)?,
                None => KeywordCatalog::new(),
            };
            let pipeline = AnalysisPipeline::new(Scorer::new(&catalog)?, config.concurrency_limit);

            let jd = load_optional(job_description.as_deref()).await?;
            let result = pipeline.analyze_file(&file, jd.as_deref()).await?;

            if save {
                let storage = Storage::new(&config.database_path)?;
                let id = storage.save_analysis(&document_name(&file), &result)?;
                tracing::info!("Analysis stored with id {}", id);
            }

            output_result(&result, &format, output.as_deref())?;
        }

        Command::Batch {
            files,
            job_description,
        } => {
            let pipeline =
                AnalysisPipeline::new(Scorer::with_builtin_catalog()?, config.concurrency_limit);
            let jd = load_optional(job_description.as_deref()).await?;

            for outcome in pipeline.analyze_files(&files, jd.as_deref()).await {
                match outcome.result {
                    Ok(result) => println!(
                        "{}: {}/100 (ATS {}, content {}, format {}, skills {})",
                        outcome.path.display(),
                        result.overall_score,
                        result.ats_compatibility.score,
                        result.content_quality.score,
                        result.format_structure.score,
                        result.skills_match.score
                    ),
                    Err(e) => println!("{}: error: {}", outcome.path.display(), e),
                }
            }
        }

        Command::Train { corpus } => {
            let entries: Vec<CorpusEntry> = serde_json::from_str(&read_text(&corpus).await?)?;
            let (texts, labels): (Vec<String>, Vec<String>) =
                entries.into_iter().map(|e| (e.text, e.label)).unzip();

            let mut store = ClassifierStore::new(ClassifierConfig::default());
            let report = store.train(&texts, &labels)?;

            println!("Model trained with accuracy: {:.2}", report.accuracy);
            println!("Classification Report:");
            println!("{}", report.report);

            store.save(&config.model_path)?;
            println!("Model saved to {}", config.model_path);
        }

        Command::Classify { file } => {
            let mut store = ClassifierStore::default();
            store.load(&config.model_path)?;

            let text = read_text(&file).await?;
            println!("{}", store.predict(&text)?);
        }

        Command::History { limit } => {
            let storage = Storage::new(&config.database_path)?;
            let entries = storage.recent_analyses(limit)?;

            if entries.is_empty() {
                println!("No analyses stored in {}", config.database_path);
            }
            for entry in entries {
                println!(
                    "#{} {} {} score {}/100",
                    entry.id,
                    entry.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    entry.document_name,
                    entry.result.overall_score
                );
            }
        }
    }

    Ok(())
}

async fn load_optional(path: Option<&Path>) -> anyhow::Result<Option<String>> {
    match path {
        Some(p) => Ok(Some(read_text(p).await?)),
        None => Ok(None),
    }
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn output_result(result: &AnalysisResult, format: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let rendered = match format {
        "json" => serde_json::to_string_pretty(result)?,
        "markdown" => format_markdown(result),
        _ => format_text(result),
    };

    if let Some(path) = output {
        std::fs::write(path, &rendered)?;
        tracing::info!("Output written to: {}", path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn format_text(result: &AnalysisResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n=== Resume Score: {}/100 ===\n\n", result.overall_score));

    for (name, component) in [
        ("ATS Compatibility", &result.ats_compatibility),
        ("Content Quality", &result.content_quality),
        ("Format & Structure", &result.format_structure),
        ("Skills Match", &result.skills_match),
    ] {
        output.push_str(&format!("{}: {}/100\n  {}\n", name, component.score, component.feedback));
    }

    output.push_str("\nSkills Found:\n");
    for (label, skills) in [
        ("Technical", &result.skills.technical),
        ("Soft", &result.skills.soft),
        ("Business", &result.skills.business),
    ] {
        if skills.is_empty() {
            output.push_str(&format!("  {}: none\n", label));
        } else {
            output.push_str(&format!("  {}: {}\n", label, skills.join(", ")));
        }
    }

    if !result.suggestions.is_empty() {
        output.push_str("\nSuggestions:\n");
        for suggestion in &result.suggestions {
            output.push_str(&format!("  - {}\n", suggestion));
        }
    }

    output
}

fn format_markdown(result: &AnalysisResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Resume Score: {}/100\n\n", result.overall_score));

    output.push_str("| Dimension | Score | Feedback |\n|-----------|-------|----------|\n");
    for (name, component) in [
        ("ATS Compatibility", &result.ats_compatibility),
        ("Content Quality", &result.content_quality),
        ("Format & Structure", &result.format_structure),
        ("Skills Match", &result.skills_match),
    ] {
        output.push_str(&format!(
            "| {} | {}/100 | {} |\n",
            name, component.score, component.feedback
        ));
    }

    output.push_str("\n## Skills\n\n");
    for (label, skills) in [
        ("Technical", &result.skills.technical),
        ("Soft", &result.skills.soft),
        ("Business", &result.skills.business),
    ] {
        let listed = if skills.is_empty() {
            "_none_".to_string()
        } else {
            skills.join(", ")
        };
        output.push_str(&format!("- **{}**: {}\n", label, listed));
    }

    if !result.suggestions.is_empty() {
        output.push_str("\n## Suggestions\n\n");
        for (i, suggestion) in result.suggestions.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, suggestion));
        }
    }

    output
}
