//! Matics CLI
//!
//! A command-line tool for running code with local toolchains and serving
//! web apps from the workspace.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use matics::{
    Config, EXAMPLE_CONFIG, ExecutionResult, ExecutionStage, Language, RunRequest, ServerManager,
    Session, WebFramework,
};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

const SERVER_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "matics")]
#[command(about = "A tool for running code snippets and dev servers")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace directory (overrides the configured one)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: matics.toml)
        #[arg(short, long, default_value = "matics.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run source files (compile if needed, then execute)
    Run {
        /// Source files to run, in order
        #[arg(value_name = "FILE", required = true)]
        sources: Vec<PathBuf>,

        /// Language ID (python, java, c, cpp); inferred from the extension if omitted
        #[arg(short, long)]
        language: Option<Language>,

        /// File whose contents are passed on stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Serve the source with a web framework (django, flask, streamlit)
        #[arg(long, value_name = "FRAMEWORK")]
        web: Option<WebFramework>,

        /// Project name for scaffolding frameworks
        #[arg(short, long, requires = "web")]
        project: Option<String>,

        /// Print the session history when done
        #[arg(long)]
        history: bool,
    },

    /// Print the starter program for a language
    Template {
        /// Language ID
        language: Language,
    },

    /// Install a web framework's packages
    Install {
        /// Framework ID
        framework: WebFramework,
    },

    /// List available languages
    Languages,

    /// List available web frameworks
    Frameworks,

    /// Show the active configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let mut config = if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
        Config::from_file(path).context("failed to load configuration")?
    } else {
        debug!("using default configuration");
        Config::default()
    };
    if let Some(dir) = cli.workspace {
        config = config.with_workspace_dir(dir);
    }

    match cli.command {
        Commands::Init { output, force } => init_config(&output, force).await,
        Commands::Run {
            sources,
            language,
            input,
            web,
            project,
            history,
        } => {
            let options = RunOptions {
                language,
                input,
                web,
                project,
                history,
            };
            run_sources(config, &sources, options).await
        }
        Commands::Template { language } => {
            print!("{}", language.default_source());
            Ok(())
        }
        Commands::Install { framework } => install(config, framework).await,
        Commands::Languages => {
            list_languages(&config);
            Ok(())
        }
        Commands::Frameworks => {
            list_frameworks(&config);
            Ok(())
        }
        Commands::ShowConfig => {
            show_config(&config);
            Ok(())
        }
    }
}

struct RunOptions {
    language: Option<Language>,
    input: Option<PathBuf>,
    web: Option<WebFramework>,
    project: Option<String>,
    history: bool,
}

async fn run_sources(config: Config, sources: &[PathBuf], options: RunOptions) -> Result<()> {
    if options.web.is_some() && sources.len() > 1 {
        bail!("--web serves a single source file, got {}", sources.len());
    }

    let stdin = if let Some(ref input_path) = options.input {
        tokio::fs::read_to_string(input_path)
            .await
            .context("failed to read input file")?
    } else {
        String::new()
    };

    let mut session = Session::open(config)
        .await
        .context("failed to prepare workspace")?;

    let mut failed_exit = run_files(&mut session, sources, &options, &stdin).await;

    if session.active_server().is_some()
        && let Some(code) = wait_for_server(&mut session).await?
    {
        failed_exit = Some(code);
    }

    if options.history {
        print_history(&session);
    }

    match failed_exit {
        Some(code) => std::process::exit(code),
        None => Ok(()),
    }
}

/// Run every file in order, reporting failures without stopping.
///
/// Returns the exit code to finish with if any file failed.
async fn run_files(
    session: &mut Session,
    sources: &[PathBuf],
    options: &RunOptions,
    stdin: &str,
) -> Option<i32> {
    let mut failed_exit = None;
    for source in sources {
        match run_file(session, source, options, stdin).await {
            Ok(result) => {
                print_result(&result);
                if result.stage != ExecutionStage::Server && !result.is_success() {
                    failed_exit = Some(result.exit_code.unwrap_or(1));
                }
            }
            Err(e) => {
                eprintln!("error: {e:#}");
                failed_exit = Some(1);
            }
        }
    }
    failed_exit
}

async fn run_file(
    session: &mut Session,
    source: &Path,
    options: &RunOptions,
    stdin: &str,
) -> Result<ExecutionResult> {
    let language = match options.language {
        Some(language) => language,
        None => infer_language(source)?,
    };
    let code = tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("failed to read source file '{}'", source.display()))?;

    let request = match options.web {
        Some(framework) => RunRequest::server(language, code, framework, options.project.clone()),
        None => RunRequest::batch(language, code, stdin),
    };

    info!(file = %source.display(), %language, "running");
    session
        .run(request)
        .await
        .with_context(|| format!("failed to run '{}'", source.display()))
}

/// Block until Ctrl-C, or until the server exits on its own.
///
/// Returns the exit code to finish with when the server died early.
async fn wait_for_server(session: &mut Session) -> Result<Option<i32>> {
    info!("press Ctrl-C to stop the server");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut poll = tokio::time::interval(SERVER_POLL_INTERVAL);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal.context("failed to listen for Ctrl-C")?;
                session.stop_server();
                return Ok(None);
            }
            _ = poll.tick() => {
                let exited = session
                    .reap_server()
                    .context("failed to check on the server")?;
                if let Some(status) = exited {
                    eprintln!("error: server exited early ({status}); check the source for errors");
                    return Ok(Some(status.code().filter(|code| *code != 0).unwrap_or(1)));
                }
            }
        }
    }
}

fn infer_language(source: &Path) -> Result<Language> {
    let extension = source
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    Language::from_extension(extension).with_context(|| {
        format!(
            "cannot infer language of '{}', pass --language",
            source.display()
        )
    })
}

fn print_result(result: &ExecutionResult) {
    let output = result.console_output();
    if result.stage == ExecutionStage::Server {
        println!("{output}");
    } else if !output.is_empty() {
        print!("{output}");
        if !output.ends_with('\n') {
            println!();
        }
    }

    // Log execution info via tracing (stderr), keeping stdout clean for piping
    info!(
        stage = ?result.stage,
        elapsed = format_args!("{:.3}s", result.elapsed.as_secs_f64()),
        exit_code = result.exit_code,
        signal = result.signal,
        "execution result"
    );
}

fn print_history(session: &Session) {
    println!("\nHistory:\n");
    for entry in session.history().iter() {
        let status = match entry.result.exit_code {
            Some(code) => format!("exit {code}"),
            None => format!("{:?}", entry.result.stage).to_lowercase(),
        };
        println!(
            "  {}  {:<8} {}",
            entry.recorded_at.format("%Y-%m-%d %H:%M:%S%.6f"),
            entry.language.id(),
            status
        );
        for line in entry.output().lines() {
            println!("      {line}");
        }
    }
}

async fn install(config: Config, framework: WebFramework) -> Result<()> {
    let servers = ServerManager::new(config);
    let result = servers
        .install(framework)
        .await
        .with_context(|| format!("failed to install {framework}"))?;

    print_result(&result);
    if result.is_success() {
        println!("{framework} installed");
        Ok(())
    } else {
        std::process::exit(result.exit_code.unwrap_or(1));
    }
}

fn list_languages(config: &Config) {
    println!("Available languages:\n");

    for language in Language::ALL {
        let Ok(lang) = config.get_language(language) else {
            continue;
        };
        let lang_type = if lang.is_compiled() {
            "compiled"
        } else {
            "interpreted"
        };
        println!(
            "  {:<10} {} ({}, {})",
            language.id(),
            lang.name,
            lang_type,
            lang.source_name
        );
    }
}

fn list_frameworks(config: &Config) {
    println!("Available web frameworks:\n");

    for framework in WebFramework::ALL {
        let Ok(fw) = config.get_framework(framework) else {
            continue;
        };
        println!(
            "  {:<10} {} ({})",
            framework.id(),
            fw.name,
            fw.url(&config.host)
        );
    }
}

fn show_config(config: &Config) {
    println!("Workspace: {}", config.workspace_dir.display());
    println!("Host: {}", config.host);
    println!("Default project: {}", config.default_project);
    println!();
    println!("Languages configured: {}", config.languages.len());
    println!("Frameworks configured: {}", config.frameworks.len());
}

async fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Python runs under sh; javac points at a compiler that is not installed.
    const MISSING_JAVAC_CONFIG: &str = r#"
[languages.python]
name = "Shell as Python"
source_name = "temp_script.py"

[languages.python.run]
command = ["sh", "{source}"]

[languages.java]
name = "Java"
source_name = "Main.java"

[languages.java.compile]
command = ["no-such-javac-4242", "{source}"]
output_name = "Main.class"

[languages.java.run]
command = ["java", "-cp", ".", "{class}"]
"#;

    fn batch_options() -> RunOptions {
        RunOptions {
            language: None,
            input: None,
            web: None,
            project: None,
            history: true,
        }
    }

    #[tokio::test]
    async fn failed_file_does_not_stop_later_files() {
        let tmp = tempfile::tempdir().unwrap();
        let java = tmp.path().join("Main.java");
        let notes = tmp.path().join("notes.txt");
        let python = tmp.path().join("b.py");
        std::fs::write(&java, "public class Main {}").unwrap();
        std::fs::write(&notes, "not code").unwrap();
        std::fs::write(&python, "echo ran").unwrap();

        let config = Config::parse_toml(MISSING_JAVAC_CONFIG)
            .unwrap()
            .with_workspace_dir(tmp.path().join("ws"));
        let mut session = Session::open(config).await.unwrap();

        let failed_exit = run_files(
            &mut session,
            &[java, notes, python],
            &batch_options(),
            "",
        )
        .await;

        assert_eq!(failed_exit, Some(1));
        let history = session.history();
        assert_eq!(history.len(), 1);
        let entry = history.latest().unwrap();
        assert_eq!(entry.language, Language::Python);
        assert_eq!(entry.output(), "ran\n");
    }

    #[tokio::test]
    async fn all_files_succeeding_reports_no_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("a.py");
        let second = tmp.path().join("b.py");
        std::fs::write(&first, "echo one").unwrap();
        std::fs::write(&second, "read line; echo \"$line\"").unwrap();

        let config = Config::parse_toml(MISSING_JAVAC_CONFIG)
            .unwrap()
            .with_workspace_dir(tmp.path().join("ws"));
        let mut session = Session::open(config).await.unwrap();

        let failed_exit = run_files(&mut session, &[first, second], &batch_options(), "two\n").await;

        assert_eq!(failed_exit, None);
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().latest().unwrap().output(), "two\n");
    }

    #[test]
    fn language_is_inferred_from_extension() {
        assert_eq!(infer_language(Path::new("hello.cpp")).unwrap(), Language::Cpp);
        assert!(infer_language(Path::new("README")).is_err());
    }
}
