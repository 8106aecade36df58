use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use codeassist::editor::virtual_editor::DEFAULT_VIEWPORT_ROWS;
use codeassist::editor::VirtualEditor;
use codeassist::utils::logging;
use codeassist::{AssistPanel, EditorReconstructor, GeminiBackend, SettingsStore, StaticPage};

#[derive(Parser)]
#[command(name = "codeassist", version, about = "Hint-style AI assistant for coding problems")]
struct Cli {
    /// Settings file holding the API key and backend options
    #[arg(long, default_value = "codeassist.json", global = true)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the API key used for backend requests
    SetKey {
        key: String,
    },
    /// Chat about a problem, with a solution file loaded into a virtualized editor
    Chat {
        /// Problem statement file
        #[arg(long)]
        problem: Option<PathBuf>,
        /// Current solution file
        #[arg(long)]
        solution: Option<PathBuf>,
        /// Language label shown on the page
        #[arg(long)]
        language: Option<String>,
        /// Rows the virtualized editor keeps mounted
        #[arg(long, default_value_t = DEFAULT_VIEWPORT_ROWS)]
        viewport_rows: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let settings = Arc::new(SettingsStore::new(cli.settings)?);

    match cli.command {
        Commands::SetKey { key } => {
            settings.set_api_key(&key)?;
            println!("API key saved.");
            Ok(())
        }
        Commands::Chat {
            problem,
            solution,
            language,
            viewport_rows,
        } => {
            let page = StaticPage {
                problem_statement: problem.map(read_file).transpose()?,
                language,
                editor: solution
                    .map(read_file)
                    .transpose()?
                    .map(|text| VirtualEditor::with_viewport(&text, viewport_rows)),
            };
            chat(settings, page).await
        }
    }
}

fn read_file(path: PathBuf) -> Result<String> {
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

async fn chat(settings: Arc<SettingsStore>, page: StaticPage) -> Result<()> {
    if !AssistPanel::is_available(settings.as_ref()) {
        bail!("No API key found. Run `codeassist set-key <KEY>` first.");
    }

    let snapshot = settings.snapshot();
    let backend = GeminiBackend::new(snapshot.gemini())?;
    let mut panel = AssistPanel::new(
        Arc::new(page),
        settings,
        Arc::new(backend),
        EditorReconstructor::new(snapshot.reconstruct()),
    );

    panel.open();
    let mut shown = print_transcript(&panel, 0).await;
    println!("(/close discards the conversation, /open starts a new one, /quit exits)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/close" => {
                panel.close();
                println!("Panel closed. /open starts a new conversation.");
            }
            "/open" => {
                if !panel.is_open() {
                    panel.open();
                    shown = print_transcript(&panel, 0).await;
                }
            }
            _ if !panel.is_open() => println!("Panel is closed. Type /open first."),
            _ => {
                panel.send(&line).await;
                shown = print_transcript(&panel, shown).await;
            }
        }
    }

    Ok(())
}

/// Print transcript lines past `from`; returns how many messages are now shown.
async fn print_transcript(panel: &AssistPanel, from: usize) -> usize {
    for line in panel.transcript().await.iter().skip(from) {
        println!("{line}");
    }
    match panel.conversation() {
        Some(conversation) => conversation.history().await.len(),
        None => 0,
    }
}
