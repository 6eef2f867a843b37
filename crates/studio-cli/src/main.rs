//! `studio` - drive the image studio from the command line
//!
//! Each invocation signs in the given user, mounts the lifecycle manager,
//! runs one operation and prints the resulting view plus any notifications.

mod render;

use anyhow::Context;
use chrono::Utc;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use studio_core::{
    AssetId, AssetLifecycleManager, ChannelNotifier, Collaborators, FanoutNotifier,
    LifecycleSettings, NotificationReceiver, OperationOutcome, Section, SelectedFile,
    SessionHandle, StudioConfig, TracingNotifier, User, ViewRouter,
};
use studio_generation::{build_host, PollinationsSynthesizer};
use studio_store::build_store;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("studio")
        .version(studio_core::VERSION)
        .about("Image studio: generate, upload and curate images")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .default_value("local")
                .help("Signed-in user ID"),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .global(true)
                .help("Signed-in user email (defaults to <user>@localhost)"),
        )
        .subcommand(
            Command::new("list")
                .about("Show the gallery")
                .arg(
                    Arg::new("favorites")
                        .long("favorites")
                        .action(ArgAction::SetTrue)
                        .help("Only favorite images"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print records as JSON"),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Create an image from a text prompt")
                .arg(Arg::new("prompt").required(true).num_args(1..).help("Prompt text")),
        )
        .subcommand(
            Command::new("upload")
                .about("Create an image from a local file")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Image file (.jpeg, .jpg, .png, .webp)"),
                ),
        )
        .subcommand(
            Command::new("favorite")
                .about("Toggle the favorite flag of an image")
                .arg(Arg::new("id").required(true).help("Image ID"))
                .arg(
                    Arg::new("was-favorite")
                        .long("was-favorite")
                        .action(ArgAction::SetTrue)
                        .help("Current flag is set (unfavorite)"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete an image")
                .arg(Arg::new("id").required(true).help("Image ID")),
        )
        .subcommand(
            Command::new("view")
                .about("Render one studio section")
                .arg(
                    Arg::new("section")
                        .value_parser(value_parser!(Section))
                        .help("generate | edit | fill | expand | history | favorites | account"),
                ),
        )
}

struct Studio {
    manager: Arc<AssetLifecycleManager>,
    notifications: NotificationReceiver,
    default_section: Section,
}

impl Studio {
    async fn open(matches: &ArgMatches) -> anyhow::Result<Self> {
        let config = match matches.get_one::<PathBuf>("config") {
            Some(path) => StudioConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => StudioConfig::new(),
        }
        .with_env_overrides();
        config.validate()?;

        init_tracing(&config.log_filter);

        let user_id = matches
            .get_one::<String>("user")
            .cloned()
            .unwrap_or_else(|| "local".to_string());
        let email = matches
            .get_one::<String>("email")
            .cloned()
            .unwrap_or_else(|| format!("{user_id}@localhost"));
        tracing::info!(user = %user_id, backend = ?config.store.backend, "opening studio");
        let session = SessionHandle::signed_in(User::new(user_id, email, Utc::now()));

        let store = build_store(&config.store).await?;
        let synthesizer = Arc::new(PollinationsSynthesizer::new(&config.generation)?);
        let host = build_host(&config.hosting)?;

        let (channel, notifications) = ChannelNotifier::new();
        let notifier = FanoutNotifier::new()
            .with(Arc::new(channel))
            .with(Arc::new(TracingNotifier));

        let manager = AssetLifecycleManager::new(
            Collaborators {
                session: Arc::new(session),
                store,
                synthesizer,
                host,
                notifier: Arc::new(notifier),
            },
            LifecycleSettings::from(&config.generation),
        );

        Ok(Self {
            manager: Arc::new(manager),
            notifications,
            default_section: config.default_section,
        })
    }

    /// Print notifications, then the view of `section`
    fn show(&mut self, section: Section) {
        print!("{}", render::notifications(&self.notifications.drain()));
        let router = ViewRouter::starting_at(section);
        println!("{}", render::navigation(&router.navigation()));
        println!();
        print!("{}", render::view(&self.manager.render(&router)));
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn exit_code(outcome: &OperationOutcome) -> i32 {
    i32::from(outcome.is_failed())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let mut studio = Studio::open(&matches).await?;

    let mount = studio.manager.mount().await;
    let command = matches.subcommand_name().unwrap_or_default();
    tracing::info!(command, "running command");

    let code = match matches.subcommand() {
        Some(("list", args)) => {
            if args.get_flag("json") {
                let images = if args.get_flag("favorites") {
                    studio.manager.favorites()
                } else {
                    studio.manager.images().to_vec()
                };
                println!("{}", render::assets_json(&images)?);
            } else if args.get_flag("favorites") {
                studio.show(Section::Favorites);
            } else {
                studio.show(Section::History);
            }
            exit_code(&mount)
        }
        Some(("generate", args)) => {
            let prompt = args
                .get_many::<String>("prompt")
                .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            studio.manager.set_prompt_text(prompt);
            let outcome = studio.manager.submit_prompt().await;
            studio.show(Section::History);
            exit_code(&outcome)
        }
        Some(("upload", args)) => {
            let path = args
                .get_one::<PathBuf>("path")
                .context("missing upload path")?;
            let file = SelectedFile::from_path(path).await?;
            studio.manager.select_file(file);
            let outcome = studio.manager.upload_and_create().await;
            studio.show(Section::History);
            exit_code(&outcome)
        }
        Some(("favorite", args)) => {
            let id = args.get_one::<String>("id").context("missing image ID")?;
            let outcome = studio
                .manager
                .toggle_favorite(&AssetId::new(id.as_str()), args.get_flag("was-favorite"))
                .await;
            studio.show(Section::Favorites);
            exit_code(&outcome)
        }
        Some(("delete", args)) => {
            let id = args.get_one::<String>("id").context("missing image ID")?;
            let outcome = studio.manager.delete_asset(&AssetId::new(id.as_str())).await;
            studio.show(Section::History);
            exit_code(&outcome)
        }
        Some(("view", args)) => {
            let section = args
                .get_one::<Section>("section")
                .copied()
                .unwrap_or(studio.default_section);
            studio.show(section);
            exit_code(&mount)
        }
        _ => 0,
    };

    tracing::info!(command, code, "command finished");
    std::process::exit(code);
}
