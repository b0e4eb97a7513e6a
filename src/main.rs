#![forbid(unsafe_code)]

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use todolist::{Config, SaveStatus, Session, TodoApp, TodoItem};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

/// Filter used until the config has been read.
const BOOTSTRAP_LOG_LEVEL: &str = "todolist=info";

/// Personal todo list backed by local JSON files.
#[derive(Parser, Debug)]
#[command(name = "todolist", version, about)]
struct Cli {
    /// Path to config.toml (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory from config
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Credentials {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new account
    Register {
        /// Display name shown after login
        #[arg(long)]
        name: String,
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Check credentials
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Add a todo
    Add {
        #[command(flatten)]
        credentials: Credentials,
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List todos, newest first
    List {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Flip a todo between open and done
    Toggle {
        #[command(flatten)]
        credentials: Credentials,
        id: u64,
    },
    /// Delete a todo
    Delete {
        #[command(flatten)]
        credentials: Credentials,
        id: u64,
    },
    /// Delete all of your todos
    Clear {
        #[command(flatten)]
        credentials: Credentials,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Start logging before the config is read; swap in its level afterwards
    // unless RUST_LOG pins one.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let pinned = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new(BOOTSTRAP_LOG_LEVEL)),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if !pinned {
        filter_handle.reload(EnvFilter::new(&config.log_level))?;
    }

    run(cli.command, &config)
}

fn run(command: Command, config: &Config) -> Result<()> {
    let app = TodoApp::open(config)?;

    match command {
        Command::Register { name, credentials } => {
            match app
                .accounts()
                .register(&name, &credentials.email, &credentials.password)
            {
                Ok(registered) => {
                    report_save(&registered.save);
                    println!("Registered user #{}", registered.value);
                }
                Err(e) => bail!("Registration failed: {e}"),
            }
        }
        Command::Login { credentials } => {
            let session = sign_in(&app, &credentials)?;
            println!(
                "Welcome, {} (user #{})",
                display_name(&session),
                session.user_id
            );
        }
        Command::Add {
            credentials,
            title,
            description,
        } => {
            let session = sign_in(&app, &credentials)?;
            let added = app
                .todos()
                .add(session.user_id, &title, description.as_deref())?;
            report_save(&added.save);
            println!("Added #{}", added.value.id);
        }
        Command::List { credentials } => {
            let session = sign_in(&app, &credentials)?;
            let items = app.todos_for(&session);
            if items.is_empty() {
                println!("No todos.");
            }
            for item in &items {
                print_item(item);
            }
        }
        Command::Toggle { credentials, id } => {
            let session = sign_in(&app, &credentials)?;
            let toggled = app.todos().toggle_done(id, session.user_id);
            if !toggled.value {
                bail!("No todo #{id}");
            }
            report_save(&toggled.save);
            if let Some(item) = app.todos().get(id, session.user_id) {
                print_item(&item);
            }
        }
        Command::Delete { credentials, id } => {
            let session = sign_in(&app, &credentials)?;
            let deleted = app.todos().delete(id, session.user_id);
            if !deleted.value {
                bail!("No todo #{id}");
            }
            report_save(&deleted.save);
            println!("Deleted #{id}");
        }
        Command::Clear { credentials } => {
            let session = sign_in(&app, &credentials)?;
            let cleared = app.todos().clear_for_owner(session.user_id);
            report_save(&cleared.save);
            println!("Cleared {} todo(s)", cleared.value);
        }
    }

    Ok(())
}

fn sign_in(app: &TodoApp, credentials: &Credentials) -> Result<Session> {
    match app.sign_in(&credentials.email, &credentials.password) {
        Some(session) => Ok(session),
        None => bail!("Invalid email or password"),
    }
}

fn display_name(session: &Session) -> &str {
    if session.display_name.is_empty() {
        &session.email
    } else {
        &session.display_name
    }
}

fn print_item(item: &TodoItem) {
    let mark = if item.done { "x" } else { " " };
    println!(
        "[{mark}] #{:<4} {}  ({})",
        item.id,
        item.title,
        item.created_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
        println!("           {description}");
    }
}

fn report_save(save: &SaveStatus) {
    if let SaveStatus::Failed { reason } = save {
        eprintln!("warning: change kept in memory only, write failed: {reason}");
    }
}
