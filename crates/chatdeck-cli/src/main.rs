mod commands;
mod config;
mod speech;
mod view;

use chatdeck_agent::{ActivityIndicator, ChatController, SendOutcome};
use chatdeck_core::Message;
use chatdeck_session::{
    read_session_export, write_export, DeleteOutcome, FileKvStore, Preferences,
    SessionRepository, Storage, StorageKeys,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use commands::{resolve_target, Command, HELP};
use config::{ChatdeckConfig, BASE_URL_ENV};
use speech::{Listener, SpeakState, Speaker};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;
use view::{Palette, CLEAR_SCREEN};

#[derive(Parser)]
#[command(name = "chatdeck", about = "chatdeck: terminal chat with persistent sessions")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "chatdeck.toml")]
    config: PathBuf,

    /// Completion service root (overrides config and CHATDECK_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Send one message to the current chat and print the reply
    Send {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// List saved chats, most recent first
    List,
    /// Export the current chat as JSON
    Export {
        /// Export every chat instead
        #[arg(long)]
        all: bool,
    },
    /// Import an exported chat as the new current chat
    Import { path: PathBuf },
}

/// Shows "Thinking..." on stderr while a request is in flight.
struct TerminalIndicator;

impl ActivityIndicator for TerminalIndicator {
    fn thinking_started(&self) {
        eprint!("\x1b[2mThinking...\x1b[0m");
        let _ = std::io::stderr().flush();
    }

    fn thinking_finished(&self) {
        eprint!("\r\x1b[K");
        let _ = std::io::stderr().flush();
    }
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = ChatdeckConfig::load(&cli.config).await?;
    config.override_base_url(std::env::var(BASE_URL_ENV).ok(), cli.base_url);

    let storage = Storage::open(Arc::new(FileKvStore::new(config.storage.dir.clone()))).await;
    if !storage.is_available() {
        eprintln!("Storage unavailable: chats will not be saved after exit.");
    }
    let keys = StorageKeys::new(&config.storage.namespace);
    let repo = SessionRepository::open(storage.clone(), keys.clone()).await;
    let prefs = Preferences::new(storage, keys);
    let chat = ChatController::new(config.chat_config(), repo, prefs)
        .with_indicator(Arc::new(TerminalIndicator));
    info!(endpoint = %config.endpoint.base_url, "chatdeck ready");

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let mut repl = Repl::new(chat, config);
            repl.run().await?;
        }
        Commands::Send { message } => {
            if let SendOutcome::Replied { reply, .. } = chat.send(&message.join(" ")).await {
                println!("{}", reply.content);
            }
        }
        Commands::List => {
            let palette = Palette::for_theme(chat.preferences().theme().await);
            let repo = chat.sessions().await;
            let entries =
                view::sidebar_entries(&repo.list_by_recency(), repo.current_id(), Utc::now());
            print!("{}", view::render_sidebar(&entries, palette));
        }
        Commands::Export { all } => {
            let written = if all {
                export_all(&chat, &config).await?
            } else {
                export_current(&chat, &config).await?
            };
            match written {
                Some(path) => println!("Exported to {}", path.display()),
                None => println!("No chat history to export"),
            }
        }
        Commands::Import { path } => {
            let title = import(&chat, &path).await?;
            println!("Imported \"{title}\"");
        }
    }

    Ok(())
}

async fn export_current(
    chat: &ChatController,
    config: &ChatdeckConfig,
) -> anyhow::Result<Option<PathBuf>> {
    let export = {
        let repo = chat.sessions().await;
        repo.export_current()
            .map(|export| (export, repo.current_id().clone()))
    };
    let Some((export, id)) = export else {
        return Ok(None);
    };
    let name = export.file_name(&config.storage.namespace, &id);
    Ok(Some(write_export(&config.export.dir, &name, &export).await?))
}

async fn export_all(
    chat: &ChatController,
    config: &ChatdeckConfig,
) -> anyhow::Result<Option<PathBuf>> {
    let export = chat.sessions().await.export_all();
    let name = export.file_name(&config.storage.namespace);
    Ok(Some(write_export(&config.export.dir, &name, &export).await?))
}

/// Imports `path` as the new current session and returns its title.
async fn import(chat: &ChatController, path: &Path) -> anyhow::Result<String> {
    let export = read_session_export(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to import '{}': {}", path.display(), e))?;
    let mut repo = chat.sessions().await;
    repo.import(export).await;
    Ok(repo.current().title.clone())
}

enum Flow {
    Continue,
    Quit,
}

/// The interactive loop.
struct Repl {
    chat: ChatController,
    config: ChatdeckConfig,
    speaker: Speaker,
    listener: Listener,
    lines: Lines<BufReader<Stdin>>,
}

impl Repl {
    fn new(chat: ChatController, config: ChatdeckConfig) -> Self {
        Self {
            speaker: Speaker::new(&config.speech),
            listener: Listener::new(&config.speech),
            chat,
            config,
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn run(&mut self) -> anyhow::Result<()> {
        self.redraw().await;
        loop {
            print!("› ");
            std::io::stdout().flush()?;
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            let on_welcome = self.chat.sessions().await.current().messages.is_empty();
            match self.handle(Command::parse(&line, on_welcome)).await? {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }
        Ok(())
    }

    async fn palette(&self) -> Palette {
        Palette::for_theme(self.chat.preferences().theme().await)
    }

    async fn notice(&self, text: &str) {
        println!("{}", self.palette().await.dim(text));
    }

    /// Redraws the current transcript, or the welcome screen when it is empty.
    async fn redraw(&self) {
        let palette = self.palette().await;
        let profile = self
            .chat
            .preferences()
            .profile(self.chat.user_name())
            .await;
        let repo = self.chat.sessions().await;
        let transcript = repo.active().transcript();
        print!("{CLEAR_SCREEN}");
        println!("{}\n", palette.accent(&repo.current().title));
        if transcript.is_empty() {
            print!("{}", view::render_welcome(&profile.name, palette));
        } else {
            print!(
                "{}",
                view::render_transcript(transcript, self.chat.user_name(), palette)
            );
        }
    }

    async fn handle(&mut self, command: Command) -> anyhow::Result<Flow> {
        match command {
            Command::Empty => {}
            Command::Send(text) => self.send(&text).await,
            Command::New => {
                self.chat.sessions().await.create().await;
                self.redraw().await;
            }
            Command::List => {
                let palette = self.palette().await;
                let repo = self.chat.sessions().await;
                let entries =
                    view::sidebar_entries(&repo.list_by_recency(), repo.current_id(), Utc::now());
                print!("{}", view::render_sidebar(&entries, palette));
            }
            Command::Load(target) => {
                let loaded = {
                    let mut repo = self.chat.sessions().await;
                    match resolve_target(&repo, &target) {
                        Some(id) => repo.load(id.as_str()).await,
                        None => false,
                    }
                };
                if loaded {
                    self.redraw().await;
                } else {
                    self.notice(&format!("No chat matches '{target}'")).await;
                }
            }
            Command::Rename(title) => {
                let renamed = {
                    let mut repo = self.chat.sessions().await;
                    let id = repo.current_id().clone();
                    repo.rename(id.as_str(), &title).await
                };
                if renamed {
                    self.notice(&format!("Renamed to \"{title}\"")).await;
                }
            }
            Command::Delete(target) => {
                let outcome = {
                    let mut repo = self.chat.sessions().await;
                    let id = match target.as_deref() {
                        Some(t) => resolve_target(&repo, t),
                        None => Some(repo.current_id().clone()),
                    };
                    match id {
                        Some(id) => repo.delete(id.as_str()).await,
                        None => DeleteOutcome::Missing,
                    }
                };
                match outcome {
                    DeleteOutcome::ReplacedCurrent { .. } => self.redraw().await,
                    DeleteOutcome::Deleted => self.notice("Chat deleted.").await,
                    DeleteOutcome::Missing => self.notice("No such chat.").await,
                }
            }
            Command::Export => {
                let written = export_current(&self.chat, &self.config).await;
                self.report_export(written).await;
            }
            Command::ExportAll => {
                let written = export_all(&self.chat, &self.config).await;
                self.report_export(written).await;
            }
            Command::Import(path) => match import(&self.chat, &path).await {
                Ok(_) => self.redraw().await,
                Err(e) => self.notice(&e.to_string()).await,
            },
            Command::Clear => {
                print!("Delete all chat history? This cannot be undone. [y/N] ");
                std::io::stdout().flush()?;
                let answer = self.lines.next_line().await?.unwrap_or_default();
                if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                    self.chat.sessions().await.clear_all().await;
                    self.redraw().await;
                } else {
                    self.notice("Nothing was deleted.").await;
                }
            }
            Command::Theme => {
                let theme = self.chat.preferences().toggle_theme().await;
                self.notice(&format!("Theme: {theme}")).await;
            }
            Command::Speak => self.speak().await,
            Command::Listen => match self.listener.listen().await {
                Ok(text) => {
                    self.notice(&format!("You said: {text}")).await;
                    self.send(&text).await;
                }
                Err(e) => self.notice(&e.to_string()).await,
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(Flow::Quit),
            Command::Invalid(message) => self.notice(&message).await,
        }
        Ok(Flow::Continue)
    }

    async fn send(&self, text: &str) {
        match self.chat.send(text).await {
            SendOutcome::Replied {
                session_id, reply, ..
            } => {
                let is_current = self.chat.sessions().await.current_id() == &session_id;
                if is_current {
                    let palette = self.palette().await;
                    print!(
                        "{}",
                        view::render_transcript(
                            std::slice::from_ref(&reply),
                            self.chat.user_name(),
                            palette
                        )
                    );
                }
            }
            SendOutcome::Rejected => self.notice("A reply is still on its way.").await,
            SendOutcome::Ignored => {}
        }
    }

    async fn speak(&self) {
        let last_reply: Option<Message> = {
            let repo = self.chat.sessions().await;
            repo.active()
                .transcript()
                .iter()
                .rev()
                .find(|m| !m.is_user())
                .cloned()
        };
        let Some(reply) = last_reply else {
            self.notice("Nothing to read yet.").await;
            return;
        };
        match self.speaker.toggle(&reply.content).await {
            Ok(SpeakState::Speaking) => self.notice("Speaking... (/speak again to stop)").await,
            Ok(SpeakState::Stopped) => self.notice("Stopped speaking.").await,
            Ok(SpeakState::Silent) => {}
            Err(e) => self.notice(&e.to_string()).await,
        }
    }

    async fn report_export(&self, written: anyhow::Result<Option<PathBuf>>) {
        match written {
            Ok(Some(path)) => self.notice(&format!("Exported to {}", path.display())).await,
            Ok(None) => self.notice("No chat history to export").await,
            Err(e) => self.notice(&format!("Export failed: {e}")).await,
        }
    }
}
