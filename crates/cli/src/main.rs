//! quill CLI: the main entry point.
//!
//! Commands:
//! - `chat`    : Interactive chat, or a scripted run from a prompt file (default)
//! - `sessions`: List resumable sessions, newest first

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;
mod console;
mod prompts;

#[derive(Parser)]
#[command(
    name = "quill",
    about = "quill: a terminal coding agent with resumable sessions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent
    Chat(ChatArgs),

    /// List stored sessions
    Sessions,
}

#[derive(Args, Debug, Default)]
pub struct ChatArgs {
    /// Prompt file to run as the first turn (single-shot mode)
    #[arg(short = 'f', long)]
    pub prompt: Option<PathBuf>,

    /// Keep chatting interactively after the prompt file was answered
    #[arg(long = "continue", requires = "prompt")]
    pub continue_chat: bool,

    /// Deadline for a single-shot run, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Session id to resume (YYYY-MM-DD-HH-MM-SS), or `list` to pick one
    #[arg(long)]
    pub resume: Option<String>,

    /// Pause before every model request, in milliseconds
    #[arg(long)]
    pub request_delay: Option<u64>,

    /// File listing prompt files to send before the first turn
    #[arg(long)]
    pub preprompt: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with the transcript on stdout
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Chat(args)) => commands::chat::run(args).await?,
        Some(Commands::Sessions) => commands::sessions::run()?,
        None => commands::chat::run(ChatArgs::default()).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn continue_requires_prompt() {
        assert!(Cli::try_parse_from(["quill", "chat", "--continue"]).is_err());

        let cli = Cli::try_parse_from(["quill", "chat", "-f", "task.md", "--continue"]).unwrap();
        let Some(Commands::Chat(args)) = cli.command else {
            panic!("expected chat");
        };
        assert!(args.continue_chat);
        assert_eq!(args.prompt, Some(PathBuf::from("task.md")));
    }

    #[test]
    fn chat_flags_parse() {
        let cli = Cli::try_parse_from([
            "quill",
            "-v",
            "chat",
            "--resume",
            "list",
            "--timeout",
            "5",
            "--request-delay",
            "250",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Some(Commands::Chat(args)) = cli.command else {
            panic!("expected chat");
        };
        assert_eq!(args.resume.as_deref(), Some("list"));
        assert_eq!(args.timeout, Some(5));
        assert_eq!(args.request_delay, Some(250));
    }

    #[test]
    fn no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["quill"]).unwrap();
        assert!(cli.command.is_none());
    }
}
