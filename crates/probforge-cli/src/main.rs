use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use probforge_app::page::to_page;
use probforge_app::{GenerationWorkflow, Labels, WorkflowState, compose};
use probforge_common::config::parse_endpoint;
use probforge_common::telemetry::{self, TelemetryConfig};
use probforge_common::{
    Config, Difficulty, FileStore, HttpProblemService, Locale, ProblemId, ProblemInput, Subject,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(version, about = "ProbForge - generate similar problems with worked solutions", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a config file (.json or .toml)
    #[arg(long, global = true, env = "PROBFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Language for labels and status text
    #[arg(long, global = true)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a problem with the backend and generate a similar one
    Generate {
        /// Problem text; read from --file or stdin when omitted
        text: Option<String>,

        /// Read the problem text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        #[arg(long, default_value = "math")]
        subject: Subject,

        /// 1 (easiest) to 5
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=5))]
        difficulty: u8,

        /// Worked solution to store with the problem
        #[arg(long)]
        solution: Option<String>,

        /// Id of the stored problem this one derives from
        #[arg(long)]
        parent: Option<String>,

        /// Backend base URL, overrides the config file
        #[arg(long)]
        endpoint: Option<String>,

        /// Write the HTML page here instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Render text with $-delimited math to HTML without the backend
    Render {
        /// Text to render; read from --file or stdin when omitted
        text: Option<String>,

        /// Read the text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Emit a full page instead of an HTML fragment
        #[arg(long)]
        page: bool,

        /// Write the HTML here instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();
    telemetry::init(TelemetryConfig::from_env("probforge-cli"));

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref()).await?;
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    match cli.command {
        Commands::Generate {
            text,
            file,
            subject,
            difficulty,
            solution,
            parent,
            endpoint,
            out,
        } => {
            if let Some(endpoint) = endpoint {
                config.endpoint = parse_endpoint(&endpoint)?;
            }
            let content = read_content(text, file).await?;
            let input = problem_input(content, subject, difficulty, solution, parent)?;
            generate(input, &config, out.as_deref()).await?;
        }
        Commands::Render {
            text,
            file,
            page,
            out,
        } => {
            let content = read_content(text, file).await?;
            render(&content, page, &config, out.as_deref())?;
        }
    }

    Ok(())
}

/// Explicit config file, else the default one if present, then environment.
async fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(&FileStore::new(path)).await?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using default config file");
                Config::load(&FileStore::new(path)).await?
            }
            None => Config::default(),
        },
    };
    Ok(config.with_env()?)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("probforge").join("config.toml"))
}

async fn read_content(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(file)) => tokio::fs::read_to_string(&file).await.into_diagnostic(),
        (None, None) => {
            let mut content = String::new();
            tokio::io::stdin()
                .read_to_string(&mut content)
                .await
                .into_diagnostic()?;
            Ok(content)
        }
    }
}

fn problem_input(
    content: String,
    subject: Subject,
    difficulty: u8,
    solution: Option<String>,
    parent: Option<String>,
) -> Result<ProblemInput> {
    let mut input = ProblemInput::new(content, subject, Difficulty::new(difficulty)?);
    if let Some(solution) = solution {
        input = input.with_solution(solution);
    }
    if let Some(parent) = parent {
        input = input.with_parent(ProblemId::new(parent));
    }
    Ok(input)
}

async fn generate(input: ProblemInput, config: &Config, out: Option<&Path>) -> Result<()> {
    let service = HttpProblemService::new(config)?;
    let labels = Labels::for_locale(config.locale);

    let mut workflow = GenerationWorkflow::new();
    let mut status = workflow.subscribe();
    let progress = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let state = status.borrow_and_update().clone();
            if state != WorkflowState::Idle {
                eprintln!("→ {}", labels.status(&state));
            }
        }
    });

    tracing::info!(endpoint = %config.endpoint, subject = %input.subject, difficulty = %input.difficulty, "starting generation");
    let start = std::time::Instant::now();
    let failure = workflow.run(input.clone(), &service).await.err();

    let view = compose(&input, workflow.state(), workflow.generated(), config.locale);
    write_output(&to_page(&view), out)?;

    drop(workflow);
    let _ = progress.await;

    match failure {
        Some(err) => Err(err.into()),
        None => {
            eprintln!("✓ Generated in {:.2}s", start.elapsed().as_secs_f64());
            Ok(())
        }
    }
}

fn render(content: &str, page: bool, config: &Config, out: Option<&Path>) -> Result<()> {
    let rendered = probforge_renderer::render_all(content);
    for span in rendered.degraded() {
        if let probforge_renderer::RenderedSpan::Degraded { literal, message } = span {
            tracing::warn!(%literal, %message, "math could not be typeset");
        }
    }

    let html = if page {
        let input = ProblemInput::new(content, Subject::default(), Difficulty::default());
        let view = compose(&input, &WorkflowState::Idle, None, config.locale);
        to_page(&view)
    } else {
        rendered.to_html()
    };
    write_output(&html, out)
}

fn write_output(html: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).into_diagnostic()?;
            }
            std::fs::write(path, html).into_diagnostic()?;
            eprintln!("✓ Output: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes()).into_diagnostic()?;
            stdout.flush().into_diagnostic()?;
        }
    }
    Ok(())
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
