//! `quill chat`: Interactive chat, or a scripted run from a prompt file.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use quill_agent::{ConversationEngine, InputSource, RunMode, ScriptedInput, TerminalInput};
use quill_config::AppConfig;
use quill_providers::OpenAiCompatProvider;
use quill_session::{ResumeTarget, SessionStore};
use quill_tools::{ToolSettings, default_registry};

use crate::ChatArgs;
use crate::console::{ConsoleSink, StdinSelector};
use crate::prompts;

pub async fn run(args: ChatArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::load().context("Failed to load config")?;

    if let Some(ms) = args.request_delay {
        config.agent.request_delay_ms = ms;
    }
    if let Some(secs) = args.timeout {
        config.agent.timeout_secs = secs;
    }

    let Some(api_key) = config.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    QUILL_API_KEY=...    (any OpenAI-compatible endpoint)");
        eprintln!("    OPENAI_API_KEY=...   (OpenAI direct)");
        eprintln!();
        eprintln!("  Or add `api_key` to {}", AppConfig::default_path().display());
        eprintln!();
        bail!("No API key found. See above for setup instructions.");
    };

    // Preprompts and the prompt file are read before touching the session
    // store so a typo does not leave an empty session behind.
    let preprompts = match &args.preprompt {
        Some(path) => prompts::load_preprompts(path, true)?,
        None => prompts::load_preprompts(&config.agent.preprompts, false)?,
    };
    let script = args.prompt.as_deref().map(prompts::read_prompt).transpose()?;

    let store = Arc::new(
        SessionStore::new(&config.session.dir)
            .with_select_on_invalid_id(config.session.select_on_invalid_id),
    );
    let target = ResumeTarget::from_flag(args.resume.as_deref());
    let mut session = store
        .initialize(&target, &StdinSelector)
        .await
        .context("Failed to initialize session")?;

    let provider = Arc::new(OpenAiCompatProvider::new("openai", &config.base_url, api_key)?);
    let tools = Arc::new(default_registry(
        store.clone(),
        session.id.clone(),
        &ToolSettings {
            command_timeout: Duration::from_secs(config.tools.command_timeout_secs),
        },
    ));

    let engine = ConversationEngine::new(provider, tools, store, &config.model)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_request_delay(Duration::from_millis(config.agent.request_delay_ms))
        .with_timeout(Duration::from_secs(config.agent.timeout_secs))
        .with_preprompts(preprompts)
        .with_event_sink(Arc::new(ConsoleSink));

    let terminal = || -> Box<dyn InputSource> { Box::new(TerminalInput::stdin()) };
    let (source, mode, live) = match script {
        Some(text) => {
            let script: Box<dyn InputSource> = Box::new(ScriptedInput::new([text]));
            if args.continue_chat {
                (script, RunMode::SingleShotThenInteractive, Some(terminal()))
            } else {
                (script, RunMode::SingleShot, None)
            }
        }
        None => (terminal(), RunMode::Interactive, None),
    };

    if mode != RunMode::SingleShot {
        println!(
            "Chat with {} at {} (session {}, type 'exit' or ctrl-d to quit)",
            config.model, config.base_url, session.id
        );
    }

    engine
        .run(&mut session, source, mode, live)
        .await
        .with_context(|| format!("Session {} ended with an error", session.id))?;

    Ok(())
}
