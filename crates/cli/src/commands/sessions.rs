//! `quill sessions`: List resumable sessions.

use anyhow::Context;
use quill_config::AppConfig;
use quill_session::SessionStore;

pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let store = SessionStore::new(&config.session.dir);
    let sessions = store.list().context("Failed to list sessions")?;

    if sessions.is_empty() {
        println!("No sessions in {}", store.root().display());
        return Ok(());
    }

    println!("Sessions in {} (newest first):", store.root().display());
    for id in sessions {
        println!("  {id}");
    }
    println!();
    println!("Resume one with `quill chat --resume <id>`.");
    Ok(())
}
