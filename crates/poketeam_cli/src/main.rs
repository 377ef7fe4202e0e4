use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use poketeam_core::core_api::{
    CatalogClient, CatalogSource, ClientConfig, CoreError, FileCatalog, FilterCriteria,
    JsonFileStore, RosterRejection, RosterSession, STORAGE_NAMESPACE, SharePayload, SortKey,
    filter, sort, well_known,
};
use poketeam_core::creature::{Creature, CreatureId};
use poketeam_render::{
    TextRenderOptions, Toast, ToastSeverity, render_detail, render_grid, render_json_detail,
    render_json_grid, render_json_roster, render_json_share, render_json_types, render_roster,
    render_share, render_toast, render_types,
};
use serde_json::Value as JsonValue;
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Default, Clone, Args)]
pub(crate) struct GlobalArgs {
    /// Base path of the catalog API
    #[arg(long = "api-base", value_name = "URL", global = true)]
    pub(crate) api_base: Option<String>,
    /// Read the catalog from a JSON dump instead of the API
    #[arg(long = "catalog-file", value_name = "PATH", global = true)]
    pub(crate) catalog_file: Option<PathBuf>,
    /// Team file
    #[arg(long, value_name = "PATH", global = true)]
    pub(crate) store: Option<PathBuf>,
    /// Origin used in share links
    #[arg(long, value_name = "URL", global = true)]
    pub(crate) origin: Option<String>,
    #[arg(long, global = true)]
    pub(crate) json: bool,
    #[arg(long, global = true)]
    pub(crate) color: bool,
    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, conflicts_with = "quiet")]
    pub(crate) verbose: u8,
    /// Only errors
    #[arg(short, long, global = true)]
    pub(crate) quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search and sort the catalog
    List {
        #[arg(long, value_name = "Q")]
        search: Option<String>,
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<String>,
        #[arg(long = "gen", value_name = "N", value_parser = parse_generation)]
        generation: Option<u32>,
        #[arg(long, value_name = "KEY", default_value = "id-asc", value_parser = parse_sort_key)]
        sort: SortKey,
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    /// Show one creature in full
    Show { id: CreatureId },
    /// List one generation
    Gen {
        #[arg(value_parser = parse_generation)]
        generation: u32,
    },
    /// List type labels
    Types,
    /// Manage the team
    Team {
        #[command(subcommand)]
        action: Option<TeamAction>,
    },
}

#[derive(Debug, Subcommand)]
enum TeamAction {
    Show,
    Add {
        #[arg(required = true)]
        ids: Vec<CreatureId>,
    },
    Remove {
        id: CreatureId,
    },
    /// Move the member at position FROM to position TO (1-based)
    Move {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        from: u32,
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        to: u32,
    },
    Clear,
    Share {
        /// Also print a QR code
        #[arg(long)]
        qr: bool,
    },
    /// Replace the team from a share link or a comma-separated id list
    Import {
        #[arg(value_name = "URL|IDS")]
        source: String,
    },
}

fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    value.parse()
}

fn parse_generation(value: &str) -> Result<u32, String> {
    let number: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid generation '{value}'"))?;
    well_known::generation(number)
        .map(|generation| generation.number)
        .ok_or_else(|| {
            let last = well_known::GENERATIONS.len();
            format!("unknown generation {number}, expected 1 to {last}")
        })
}

/// Remote API or offline dump, chosen once at startup.
enum Catalog {
    Remote(CatalogClient),
    File(FileCatalog),
}

impl CatalogSource for Catalog {
    async fn fetch_all(&self) -> Result<Vec<Creature>, CoreError> {
        match self {
            Self::Remote(client) => client.fetch_all().await,
            Self::File(file) => file.fetch_all().await,
        }
    }

    async fn fetch_by_id(&self, id: CreatureId) -> Result<Creature, CoreError> {
        match self {
            Self::Remote(client) => client.fetch_by_id(id).await,
            Self::File(file) => file.fetch_by_id(id).await,
        }
    }

    async fn fetch_by_generation(&self, generation: u32) -> Result<Vec<Creature>, CoreError> {
        match self {
            Self::Remote(client) => client.fetch_by_generation(generation).await,
            Self::File(file) => file.fetch_by_generation(generation).await,
        }
    }

    async fn fetch_types(&self) -> Result<Vec<String>, CoreError> {
        match self {
            Self::Remote(client) => client.fetch_types().await,
            Self::File(file) => file.fetch_types().await,
        }
    }
}

struct Output {
    json: bool,
    quiet: bool,
    text: TextRenderOptions,
}

impl Output {
    fn toast(&self, toast: &Toast) {
        if self.quiet && toast.severity != ToastSeverity::Error {
            return;
        }
        if self.json {
            eprintln!("{}", poketeam_render::render_json_toast(toast));
        } else {
            eprintln!("{}", render_toast(toast, self.text));
        }
    }

    fn fail(&self, toast: Toast, error: &CoreError) -> ! {
        tracing::error!(code = error.code.as_str(), "{}", error.message);
        self.toast(&toast);
        process::exit(1);
    }

    fn json(&self, value: &JsonValue) {
        match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Error rendering JSON output: {e}");
                process::exit(1);
            }
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // POKETEAM_LOG_PATH appends to a file instead of stderr
    if let Ok(path) = std::env::var("POKETEAM_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn open_catalog(config: &Config) -> Catalog {
    match &config.catalog_file {
        Some(path) => match FileCatalog::load_from_path(path) {
            Ok(file) => Catalog::File(file),
            Err(e) => {
                eprintln!("Error reading catalog {}: {}", path.display(), e.message);
                process::exit(1);
            }
        },
        None => Catalog::Remote(CatalogClient::new(ClientConfig {
            api_base: config.api_base.clone(),
            ..ClientConfig::default()
        })),
    }
}

fn open_team(config: &Config) -> RosterSession<JsonFileStore> {
    let store = match &config.store_path {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::default_location().unwrap_or_else(|| {
            tracing::warn!("no data directory available, keeping the team in the working directory");
            JsonFileStore::in_dir(Path::new("."), STORAGE_NAMESPACE)
        }),
    };
    tracing::debug!(path = %store.path().display(), "team store");
    RosterSession::open(store).unwrap_or_else(|e| {
        eprintln!("Error reading team: {}", e.message);
        process::exit(1);
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose, cli.global.quiet);
    let config = Config::load(&cli.global);
    let out = Output {
        json: cli.global.json,
        quiet: cli.global.quiet,
        text: TextRenderOptions {
            color: cli.global.color,
        },
    };
    let catalog = open_catalog(&config);

    match cli.command {
        Command::List {
            search,
            types,
            generation,
            sort: sort_key,
            limit,
        } => {
            let records = catalog
                .fetch_all()
                .await
                .unwrap_or_else(|e| out.fail(Toast::load_failed(), &e));
            let mut criteria = FilterCriteria::new().with_query(search.unwrap_or_default());
            criteria.types = types;
            criteria.generation = generation;

            let mut shown = sort(&filter(&records, &criteria), sort_key);
            if let Some(limit) = limit {
                shown.truncate(limit);
            }
            print_grid(&out, &shown, &open_team(&config).roster().export_ids());
        }
        Command::Show { id } => {
            let record = catalog
                .fetch_by_id(id)
                .await
                .unwrap_or_else(|e| out.fail(Toast::load_failed(), &e));
            if out.json {
                out.json(&render_json_detail(&record));
            } else {
                print!("{}", render_detail(&record, out.text));
            }
        }
        Command::Gen { generation } => {
            if let Some(range) = well_known::generation(generation) {
                tracing::debug!(first = range.first_id, last = range.last_id, "generation range");
            }
            let records = catalog
                .fetch_by_generation(generation)
                .await
                .unwrap_or_else(|e| out.fail(Toast::load_failed(), &e));
            print_grid(&out, &records, &open_team(&config).roster().export_ids());
        }
        Command::Types => {
            let labels = catalog
                .fetch_types()
                .await
                .unwrap_or_else(|e| out.fail(Toast::load_failed(), &e));
            if out.json {
                out.json(&render_json_types(&labels));
            } else {
                print!("{}", render_types(&labels, out.text));
            }
        }
        Command::Team { action } => {
            let mut team = open_team(&config);
            run_team(&out, &config, &catalog, &mut team, action.unwrap_or(TeamAction::Show)).await;
        }
    }
}

async fn run_team(
    out: &Output,
    config: &Config,
    catalog: &Catalog,
    team: &mut RosterSession<JsonFileStore>,
    action: TeamAction,
) {
    match action {
        TeamAction::Show => {}
        TeamAction::Add { ids } => {
            for id in ids {
                let roster = team.roster();
                if roster.is_full() {
                    out.toast(&Toast::rejected(&RosterRejection::Full));
                    continue;
                }
                if roster.contains(id) {
                    out.toast(&Toast::rejected(&RosterRejection::Duplicate(id)));
                    continue;
                }
                let record = catalog
                    .fetch_by_id(id)
                    .await
                    .unwrap_or_else(|e| out.fail(Toast::load_failed(), &e));
                let toast = Toast::added(&record);
                match team.add(record) {
                    Ok(_) => out.toast(&toast),
                    Err(rejection) => out.toast(&Toast::rejected(&rejection)),
                }
            }
        }
        TeamAction::Remove { id } => match team.remove(id) {
            Some(entry) => out.toast(&Toast::removed(&entry.creature)),
            None => out.toast(&Toast::not_in_team(id)),
        },
        TeamAction::Move { from, to } => {
            let (from, to) = (from as usize - 1, to as usize - 1);
            match team.reorder(from, to) {
                Ok(()) => {
                    if let Some(entry) = team.roster().get(to) {
                        out.toast(&Toast::moved(&entry.creature, to));
                    }
                }
                Err(rejection) => out.toast(&Toast::rejected(&rejection)),
            }
        }
        TeamAction::Clear => {
            team.clear();
            out.toast(&Toast::cleared());
        }
        TeamAction::Share { qr } => {
            let payload = SharePayload::from_ids(&team.roster().export_ids());
            if payload.is_empty() {
                out.toast(&Toast::new(
                    ToastSeverity::Warning,
                    "Votre équipe est vide, rien à partager.",
                ));
                return;
            }
            let url = payload.to_url(&config.origin);
            let code = qr.then(|| {
                payload.to_code(&config.origin).unwrap_or_else(|e| {
                    out.fail(Toast::new(ToastSeverity::Error, e.message.clone()), &e)
                })
            });
            if out.json {
                out.json(&render_json_share(&url, &payload, code.as_ref()));
            } else {
                print!("{}", render_share(&url, code.as_ref()));
            }
            return;
        }
        TeamAction::Import { source } => {
            let payload = if source.contains('=') || source.contains('?') {
                SharePayload::from_url(&source)
            } else {
                Some(SharePayload::parse(&source)).filter(|payload| !payload.is_empty())
            };
            let Some(payload) = payload else {
                out.toast(&Toast::nothing_to_import());
                return;
            };
            team.import_from_ids(catalog, payload.ids())
                .await
                .unwrap_or_else(|e| out.fail(Toast::import_failed(&e), &e));
            out.toast(&Toast::imported(payload.ids().len()));
        }
    }

    if out.json {
        out.json(&render_json_roster(team.roster()));
    } else {
        print!("{}", render_roster(team.roster(), out.text));
    }
}

fn print_grid(out: &Output, records: &[Creature], in_team: &[CreatureId]) {
    if out.json {
        out.json(&render_json_grid(records, in_team));
    } else {
        print!("{}", render_grid(records, in_team, out.text));
    }
}
