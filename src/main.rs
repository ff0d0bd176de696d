use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use learnpath::api;
use learnpath::config::AppConfig;
use learnpath::learning::LearningService;
use learnpath::navigator::CurriculumNavigator;
use learnpath::store::{KvProgressRepository, ProgressRepository};

type Service = LearningService<Box<dyn ProgressRepository>>;

#[derive(Parser)]
#[command(name = "learnpath")]
#[command(about = "Work through a curriculum and track learning progress")]
struct Cli {
    /// SQLite database holding progress (overrides config and LEARNPATH_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Curriculum JSON file (overrides config and LEARNPATH_CATALOG)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List modules with their progress
    Modules,
    /// Show progress, statistics and where to continue (default)
    Status,
    /// Begin at the first topic of the curriculum
    Start,
    /// Jump to a topic
    Select { module_id: String, topic_id: String },
    /// Mark a topic completed (the current topic if omitted)
    Complete { topic_id: Option<String> },
    /// Move to the next topic
    Next,
    /// Move to the previous topic
    Prev,
    /// Manage topic notes
    Note {
        #[command(subcommand)]
        action: NoteCommand,
    },
    /// Delete all stored progress
    Reset,
    /// Show or write the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum NoteCommand {
    /// Save a note for a topic (an empty note deletes it)
    Set { topic_id: String, text: String },
    /// Delete the note for a topic
    Delete { topic_id: String },
    /// Print the note for a topic
    Show { topic_id: String },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init,
}

/// Initialize tracing with output to stdout (server) or stderr (commands)
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "learnpath=info,tower_http=info".into()),
    );

    if use_stderr {
        // Commands print results on stdout
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_service(config: &AppConfig) -> anyhow::Result<Service> {
    let catalog = config.load_catalog().context("Failed to load curriculum")?;
    let db = config.open_database()?;
    let repository: Box<dyn ProgressRepository> =
        Box::new(KvProgressRepository::with_key(db, config.storage_key.clone()));
    Ok(LearningService::new(
        repository,
        CurriculumNavigator::new(catalog),
    ))
}

fn print_position(service: &Service) {
    let progress = service.progress();
    let Some((_, topic_id)) = progress.current_position() else {
        println!("No topic selected");
        return;
    };
    match service.navigator().find_topic_by_id(topic_id) {
        Some(loc) => println!("Now at: {} / {}", loc.module.title(), loc.topic.title()),
        None => println!("Now at: {}", topic_id),
    }
}

fn print_status(service: &Service) {
    let overview = service.overview();
    let stats = &overview.statistics;

    println!("State:     {}", overview.state.as_str());
    println!(
        "Progress:  {}% ({}/{} topics)",
        overview.overall_progress, stats.completed_topics, stats.total_topics
    );
    println!("Remaining: {:.1} hours", stats.estimated_remaining_hours);
    println!("Notes:     {}", stats.total_notes);
    println!("Last seen: {}", overview.session_info.last_accessed_formatted);
    if let Some(pos) = &overview.session_info.current_position {
        println!("Current:   {} / {}", pos.module_title, pos.topic_title);
    }
    match overview
        .recommended
        .as_ref()
        .and_then(|r| service.navigator().find_topic_by_id(&r.topic_id))
    {
        Some(loc) => println!("Next up:   {} / {}", loc.module.title(), loc.topic.title()),
        None => println!("Next up:   nothing left, curriculum complete"),
    }
}

fn print_modules(service: &Service) {
    let progress = service.progress();
    for module in service.navigator().modules() {
        println!(
            "{:<24} {:<13} {:>4.1}h {:>3}%  {}",
            module.id(),
            module.difficulty().as_str(),
            module.estimated_hours(),
            service
                .analytics()
                .calculate_module_progress(&progress, module.id()),
            module.title()
        );
        for topic in module.topics() {
            let mark = if progress.is_topic_completed(topic.id()) {
                'x'
            } else {
                ' '
            };
            println!(
                "  [{}] {:<22} {:>3}m  {}",
                mark,
                topic.id(),
                topic.duration(),
                topic.title()
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Some(Commands::Serve { .. }));
    init_tracing(!serving);

    let mut config = AppConfig::load();
    if let Some(db) = cli.db {
        config.database_path = Some(db);
    }
    if let Some(catalog) = cli.catalog {
        config.catalog_path = Some(catalog);
    }

    let command = cli.command.unwrap_or(Commands::Status);

    if let Commands::Config { action } = &command {
        match action {
            ConfigCommand::Show => println!("{}", serde_json::to_string_pretty(&config)?),
            ConfigCommand::Init => {
                config.save()?;
                println!("Configuration written");
            }
        }
        return Ok(());
    }

    let service = build_service(&config)?;

    match command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            tracing::info!("Starting learnpath server on port {}", port);

            let app = api::create_router(service);

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("learnpath server listening on http://127.0.0.1:{}", port);

            axum::serve(listener, app).await?;
        }
        Commands::Modules => print_modules(&service),
        Commands::Status => print_status(&service),
        Commands::Start => {
            service.start_learning()?;
            print_position(&service);
        }
        Commands::Select {
            module_id,
            topic_id,
        } => {
            service.select_topic(&module_id, &topic_id)?;
            print_position(&service);
        }
        Commands::Complete { topic_id } => match topic_id {
            Some(topic_id) => {
                service.complete_topic(&topic_id)?;
                println!("Completed {}", topic_id);
            }
            None => match service.complete_current_topic()? {
                Some(progress) => println!(
                    "Completed {}",
                    progress.current_topic().unwrap_or_default()
                ),
                None => println!("No topic selected; run `learnpath start` first"),
            },
        },
        Commands::Next => {
            if service.navigate_next()? {
                print_position(&service);
            } else {
                println!("No next topic");
            }
        }
        Commands::Prev => {
            if service.navigate_previous()? {
                print_position(&service);
            } else {
                println!("No previous topic");
            }
        }
        Commands::Note { action } => match action {
            NoteCommand::Set { topic_id, text } => {
                let progress = service.save_note(&topic_id, &text)?;
                if progress.note_for_topic(&topic_id).is_empty() {
                    println!("Note for {} removed", topic_id);
                } else {
                    println!("Note for {} saved", topic_id);
                }
            }
            NoteCommand::Delete { topic_id } => {
                service.delete_note(&topic_id)?;
                println!("Note for {} deleted", topic_id);
            }
            NoteCommand::Show { topic_id } => {
                println!("{}", service.progress().note_for_topic(&topic_id));
            }
        },
        Commands::Reset => {
            service.reset_progress()?;
            println!("Progress reset");
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
