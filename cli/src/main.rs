use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_core::{calls_from_str, Category};
use triage_notes::{documentation_from_str, normalize_investigations, NotesConfig};

#[derive(Parser, Debug)]
#[command(
    name = "triage-cli",
    about = "Severity signals from AI clinical calls, and rendered encounter notes."
)]
struct Args {
    /// JSON file with note rendering options; defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a JSON list of AI calls into severity signals.
    Summarize {
        /// Path to the calls JSON file.
        #[arg(short, long)]
        input: PathBuf,
        /// Only report this category.
        #[arg(long)]
        category: Option<String>,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Render note sections from a clinical documentation record.
    Render {
        /// Path to the record JSON file.
        #[arg(short, long)]
        input: PathBuf,
        /// Section to print; all four when omitted.
        #[arg(long, value_enum)]
        section: Option<Section>,
    },
    /// Normalize a lab-results text file.
    Normalize {
        /// Path to the lab-results text file.
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Section {
    History,
    Investigations,
    Diagnosis,
    Treatment,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Summarize {
            input,
            category,
            json,
        } => summarize(&input, category.as_deref(), json),
        Command::Render { input, section } => render(&input, section, &config),
        Command::Normalize { input } => {
            let text = read_input(&input)?;
            let normalized = normalize_investigations(&text, &config)?;
            println!("{normalized}");
            Ok(())
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Could not read file {path:?}"))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<NotesConfig> {
    let Some(path) = path else {
        return Ok(NotesConfig::default());
    };
    let data = read_input(path)?;
    let config = serde_json::from_str(&data)
        .with_context(|| format!("Invalid config in {path:?}"))?;
    tracing::info!(config = ?path, "loaded note config");
    Ok(config)
}

fn summarize(input: &Path, category: Option<&str>, json: bool) -> anyhow::Result<()> {
    let calls = calls_from_str(&read_input(input)?)?;

    if let Some(name) = category {
        let category: Category = name.parse()?;
        let scoped = calls.for_category(category);
        println!(
            "{category}: {} calls | first {} | final {} | worst {}",
            scoped.len(),
            show(scoped.first_color()?),
            show(scoped.final_color()?),
            show(scoped.worst_color()),
        );
        return Ok(());
    }

    let summary = calls.summarize();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for signal in &summary.categories {
        println!(
            "{}: {} calls | first {} | final {} | worst {}",
            signal.category,
            signal.calls,
            show(signal.first_color),
            show(signal.final_color),
            show(signal.worst_color),
        );
    }
    println!(
        "Worst overall: {}\nAny final red: {}\nAny final red or yellow: {}",
        show(summary.worst_color),
        summary.any_final_red,
        summary.any_final_red_yellow
    );

    Ok(())
}

fn render(input: &Path, section: Option<Section>, config: &NotesConfig) -> anyhow::Result<()> {
    let doc = documentation_from_str(&read_input(input)?)?;

    let text = match section {
        Some(Section::History) => doc.history(config)?,
        Some(Section::Investigations) => doc.investigations(config)?,
        Some(Section::Diagnosis) => doc.diagnosis(config)?,
        Some(Section::Treatment) => doc.treatment(config)?,
        None => {
            let note = doc.render_all(config)?;
            [note.history, note.investigations, note.diagnosis, note.treatment].join("\n\n")
        }
    };
    println!("{text}");

    Ok(())
}

fn show<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
