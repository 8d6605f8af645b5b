//! This module defines the command-line interface for the application using `clap`.
//!
//! It provides a `Cli` struct that represents the parsed command-line arguments,
//! and a `Commands` enum that represents the available subcommands and their
//! options.
//!
//! # Examples
//!
//! Parsing command-line arguments:
//!
//! ```no_run
//! use clap::Parser;
//! use botdeck::commands::{Cli, Commands};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Commands::Bots => { /* list chatbots */ }
//!     _ => { /* ... */ }
//! }
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Represents the parsed command-line arguments.
///
/// This struct is constructed by parsing the command-line arguments using `clap`.
/// It contains a `command` field that holds the parsed subcommand and its options.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, propagate_version = true, color = clap::ColorChoice::Always)]
pub struct Cli {
    /// The parsed subcommand and its options.
    #[command(subcommand)]
    pub command: Commands,
}

/// Represents the available subcommands and their options.
///
/// Each variant of this enum corresponds to a subcommand that the user can invoke
/// from the command line, along with any options specific to that subcommand.
#[derive(Subcommand, Debug)]
#[command(about, long_about = None, color = clap::ColorChoice::Always)]
pub enum Commands {
    /// Write a starter config file to the platform config directory.
    Init,

    /// Create an account and log straight into it.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Exchange email and password for a session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Clear the stored session token and cached profile.
    Logout,

    /// Show who is currently logged in.
    Whoami,

    /// List your chatbots.
    #[clap(name = "bots", alias = "ls")]
    Bots,

    /// Create a chatbot, optionally attaching knowledge files.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        business_name: String,
        #[arg(long)]
        about: String,
        /// Knowledge files to upload (pdf, txt, docx, md; max 10 MB each).
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,
    },

    /// Show one chatbot's full record.
    Show { chatbot_id: String },

    /// Update a chatbot's record, optionally uploading new knowledge files.
    Update {
        chatbot_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        business_name: String,
        #[arg(long)]
        about: String,
        #[arg(long)]
        system_prompt: Option<String>,
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,
    },

    /// Delete a chatbot. Asks for confirmation unless --yes is given.
    Delete {
        chatbot_id: String,
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List a chatbot's knowledge documents.
    Files { chatbot_id: String },

    /// Delete one knowledge document. Asks for confirmation unless --yes is given.
    #[clap(name = "rm-file")]
    RmFile {
        chatbot_id: String,
        file_id: String,
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Send a single message to a chatbot and print the reply.
    #[clap(name = "ask", alias = "a")]
    Ask {
        chatbot_id: String,
        message: String,
        /// Continue an existing session instead of starting a new one.
        #[arg(short = 's', long)]
        session: Option<String>,
    },

    /// Chat with a chatbot interactively.
    #[clap(name = "chat", alias = "i")]
    Chat { chatbot_id: String },

    /// List recorded sessions for a chatbot.
    Sessions { chatbot_id: String },

    /// List the messages in a session.
    Messages { session_id: String },
}
