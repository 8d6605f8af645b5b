//! Main module for the botdeck CLI application.
//!
//! This module provides the main function and auxiliary functionalities for
//! the CLI application. It handles command parsing, configuration loading, and
//! initialization, as well as invoking the appropriate functionalities based on
//! the provided command-line arguments.
//!
//! # Examples
//!
//! Logging in and listing your chatbots:
//!
//! ```sh
//! botdeck login --email alice@x.com --password secret1
//! botdeck bots
//! ```
//!
//! Chatting with a chatbot interactively:
//!
//! ```sh
//! botdeck chat <chatbot-id>
//! ```

use botdeck::{
    api::ApiClient,
    auth::CredentialStore,
    chat::{self, ChatView},
    commands::{self, Commands},
    config::{self, BotdeckConfig},
    config_dir,
    error::ApiError,
    knowledge::{self, Screened},
    models::ChatbotDraft,
    reveal::REVEAL_INTERVAL,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::OnceCell;
use std::{
    env,
    error::Error,
    fs,
    io::{BufRead, Write},
    path::PathBuf,
    sync::Arc,
};
use tracing::{debug, info};

static TRACING: OnceCell<()> = OnceCell::new();

fn main() -> Result<(), Box<dyn Error>> {
    TRACING.get_or_init(|| {
        tracing_subscriber::fmt::init();
    });
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run())
}

/// Main asynchronous function of the botdeck CLI application.
///
/// Loads configuration, parses command-line arguments, and executes the
/// appropriate command.
///
/// # Errors
///
/// Returns an error if there is an issue loading the configuration, parsing
/// the command-line arguments, or executing the specified command.
async fn run() -> Result<(), Box<dyn Error>> {
    let cli = commands::Cli::parse();

    if let Commands::Init = cli.command {
        return init();
    }

    let config_path = match env::var("BOTDECK_CONFIG") {
        // Tests and scripts point this at a config of their own
        Ok(path) => PathBuf::from(path),
        Err(_) => config_dir()?.join("config.yaml"),
    };
    debug!("Loading config from: {}", config_path.display());
    let deck_config = config::load_config(config_path.to_str().ok_or("bad config path")?)?;
    debug!("Config loaded: {:?}", deck_config);

    let store = CredentialStore::open()?;
    let client = ApiClient::new(&deck_config, store)?;

    match cli.command {
        Commands::Init => unreachable!("handled above"),

        Commands::Register {
            username,
            email,
            password,
        } => {
            let profile = client.register_and_login(&username, &email, &password).await?;
            println!("Account created. Logged in as {}.", profile.display_name());
        }

        Commands::Login { email, password } => {
            let profile = client.login(&email, &password).await?;
            println!("Logged in as {}.", profile.display_name());
        }

        Commands::Logout => {
            client.store().remove_token();
            println!("Logged out.");
        }

        Commands::Whoami => match client.store().profile() {
            Some(profile) => println!("{}", profile.display_name()),
            None => {
                let profile = client.current_user().await?;
                println!("{}", profile.display_name());
            }
        },

        Commands::Bots => {
            let bots = client.list_chatbots().await?;
            if bots.is_empty() {
                println!("No chatbots yet. Create one with `botdeck create`.");
            }
            for bot in bots {
                let business = bot.business_name.as_deref().unwrap_or("-");
                println!(
                    "{}  {}  ({})  messages: {}",
                    bot.id,
                    bot.name,
                    business,
                    bot.message_count.unwrap_or(0)
                );
            }
        }

        Commands::Create {
            name,
            business_name,
            about,
            files,
        } => {
            // Create accepts the valid files and only warns about the rest.
            let screened = screen_and_report(&files);
            let draft = ChatbotDraft {
                name,
                business_name,
                about_business: about,
                system_prompt: None,
            };
            let created = client.create_chatbot(&draft, &screened.accepted).await?;
            match created.message {
                Some(msg) => println!("{msg} (id: {})", created.chatbot_id),
                None => println!("Created chatbot {}.", created.chatbot_id),
            }
        }

        Commands::Show { chatbot_id } => {
            let bot = client.get_chatbot(&chatbot_id).await?;
            println!("id:            {}", bot.id);
            println!("name:          {}", bot.name);
            println!("business:      {}", bot.business_name.as_deref().unwrap_or("-"));
            println!("about:         {}", bot.about_business.as_deref().unwrap_or("-"));
            println!("system prompt: {}", bot.system_prompt.as_deref().unwrap_or("-"));
            println!("messages:      {}", bot.message_count.unwrap_or(0));
            println!("impressions:   {}", bot.impression_count.unwrap_or(0));

            // A failed document listing degrades to an empty list rather
            // than failing the whole view.
            let docs = client.list_files(&chatbot_id).await.unwrap_or_default();
            println!("documents:     {}", docs.len());
            for doc in docs {
                println!("  {}  {}", doc.id, doc.file_name);
            }
        }

        Commands::Update {
            chatbot_id,
            name,
            business_name,
            about,
            system_prompt,
            files,
        } => {
            // Unlike create, a save with invalid files aborts before any
            // network call.
            let screened = screen_and_report(&files);
            if screened.has_rejections() {
                return Err("fix or remove the rejected files, then save again".into());
            }

            let draft = ChatbotDraft {
                name,
                business_name,
                about_business: about,
                system_prompt,
            };
            let progress = upload_progress_bar();
            let bar = progress.clone();
            let result = client
                .update_chatbot(
                    &chatbot_id,
                    &draft,
                    &screened.accepted,
                    Some(Arc::new(move |sent, total| {
                        if total > 0 {
                            bar.set_length(total);
                            bar.set_position(sent);
                        }
                    })),
                )
                .await;
            // clear the bar on completion or failure
            progress.finish_and_clear();
            result?;
            println!("Updated chatbot {chatbot_id}.");
        }

        Commands::Delete { chatbot_id, yes } => {
            if !yes && !confirm(&format!("Delete chatbot {chatbot_id}? This cannot be undone."))? {
                println!("Aborted.");
                return Ok(());
            }
            client.delete_chatbot(&chatbot_id).await?;
            println!("Deleted chatbot {chatbot_id}.");
        }

        Commands::Files { chatbot_id } => {
            let docs = client.list_files(&chatbot_id).await?;
            if docs.is_empty() {
                println!("No knowledge documents uploaded yet.");
            }
            for doc in docs {
                let size = doc
                    .size
                    .map(|s| format!("{:.1} KB", s as f64 / 1024.0))
                    .unwrap_or_else(|| "-".to_string());
                println!("{}  {}  {}", doc.id, doc.file_name, size);
            }
        }

        Commands::RmFile {
            chatbot_id,
            file_id,
            yes,
        } => {
            if !yes && !confirm(&format!("Delete file {file_id}?"))? {
                println!("Aborted.");
                return Ok(());
            }
            client.delete_file(&chatbot_id, &file_id).await?;
            println!("Deleted file {file_id}.");
        }

        Commands::Ask {
            chatbot_id,
            message,
            session,
        } => {
            let mut view = ChatView::new(client, &chatbot_id)?;
            if let Some(sid) = session {
                view.log = botdeck::chat::ChatLog::with_session(sid);
            }

            let printed = std::cell::Cell::new(0usize);
            let outcome = view
                .send_and_reveal(&message, REVEAL_INTERVAL, |prefix| {
                    print!("{}", &prefix[printed.get()..]);
                    printed.set(prefix.len());
                    let _ = std::io::stdout().flush();
                })
                .await?;
            if outcome.is_none() {
                return Err(Box::new(ApiError::Invalid(
                    "message is empty".to_string(),
                )));
            }
            println!();
            if let Some(sid) = view.log.session_id() {
                info!("session: {sid}");
            }
        }

        Commands::Chat { chatbot_id } => {
            chat::interactive_mode(client, &chatbot_id).await?;
        }

        Commands::Sessions { chatbot_id } => {
            let sessions = client.list_sessions(&chatbot_id).await?;
            if sessions.is_empty() {
                println!("No sessions recorded for this chatbot yet.");
            }
            for session in sessions {
                let last = session.last_message.as_deref().unwrap_or("-");
                println!("{}  {}", session.id, last);
            }
        }

        Commands::Messages { session_id } => {
            let turns = client.list_messages(&session_id).await?;
            if turns.is_empty() {
                println!("No messages in this session.");
            }
            for turn in turns {
                println!("[{}] {}", turn.role, turn.content);
            }
        }
    }

    Ok(())
}

/// Screen a file selection, print a warning per rejected file, and return
/// the screening result.
fn screen_and_report(files: &[PathBuf]) -> Screened {
    let screened = knowledge::screen_files(files);
    for rejected in &screened.rejected {
        eprintln!(
            "warning: skipping {}: {}",
            rejected.path.display(),
            rejected.reason
        );
    }
    screened
}

/// Ask the user a yes/no question on stdin; defaults to "no".
fn confirm(prompt: &str) -> Result<bool, Box<dyn Error>> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn upload_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("uploading {percent:>3}% [{bar:30}] {bytes}/{total_bytes}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Initializes the application's configuration.
///
/// Creates the config directory and writes a starter `config.yaml` pointing
/// at a local backend.
///
/// # Errors
///
/// Returns an error if there is an issue creating the directory or file, or
/// serializing the configuration to YAML.
fn init() -> Result<(), Box<dyn Error>> {
    let config_dir = config_dir()?;
    info!("Creating config directory: {}", config_dir.display());
    fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("config.yaml");
    info!("Creating config file: {}", config_path.display());
    let config = BotdeckConfig::default();
    let config_yaml = serde_yaml::to_string(&config)?;
    fs::write(&config_path, config_yaml)?;
    println!("Wrote {}.", config_path.display());

    Ok(())
}
