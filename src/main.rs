use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deckvault::{
    cards::{CardIndex, CardQuery, CardRecord},
    config::AppConfig,
    deck::{
        export_deck_text, import_deck_text, import_edhrec_csv, DeckAggregate, DeckImport, DeckStore,
    },
    images::ImageCache,
    rules::{EntryStatus, FormatValidator, ReconciliationEngine},
};

#[derive(Parser)]
#[command(name = "deckvault")]
#[command(version)]
#[command(about = "Card collection, deck reconciliation and image cache tools")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "deckvault.toml")]
    config: PathBuf,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the collection
    Search(SearchArgs),
    /// Print collection statistics
    Stats,
    /// Compare a deck list (text, or EDHREC .csv export) against the collection
    Compare {
        deck: PathBuf,
    },
    /// Check a deck list against a format
    Validate {
        deck: PathBuf,
        /// Format name (standard, modern, commander)
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Print deck statistics for a deck list
    Analyze {
        deck: PathBuf,
    },
    /// Import a deck list into the deck store
    Import {
        deck: PathBuf,
        /// Deck name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Print a stored JSON deck as a text list
    Export {
        deck: PathBuf,
    },
    /// List stored decks
    Decks,
    /// Image cache maintenance
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Text matched against either card name
    query: String,

    #[arg(short, long, default_value_t = 20)]
    limit: usize,

    /// Color identity letter (repeatable)
    #[arg(long = "color")]
    colors: Vec<String>,

    #[arg(long = "type")]
    card_type: Option<String>,

    #[arg(long)]
    rarity: Option<String>,

    #[arg(long = "set")]
    set_code: Option<String>,

    #[arg(long)]
    min_cmc: Option<u32>,

    #[arg(long)]
    max_cmc: Option<u32>,
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Count cached images and their size
    Stats,
    /// Delete every cached image
    Clear,
    /// Download images into the cache
    Fetch {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("deckvault={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    match cli.command {
        Command::Search(args) => search(&config, args),
        Command::Stats => stats(&config),
        Command::Compare { deck } => compare(&config, &deck),
        Command::Validate { deck, format } => validate(&config, &deck, format.as_deref()),
        Command::Analyze { deck } => analyze(&config, &deck),
        Command::Import { deck, name, format } => import(&config, &deck, name, format),
        Command::Export { deck } => export(&deck),
        Command::Decks => list_decks(&config),
        Command::Cache { command } => cache(&config, command),
    }
}

fn load_index(config: &AppConfig) -> Result<CardIndex> {
    let index = CardIndex::load(&config.data).with_context(|| {
        format!(
            "loading collection from {}",
            config.data.collection_file.display()
        )
    })?;
    info!("Indexed {} cards", index.len());
    Ok(index)
}

/// Read a deck list and resolve it against the collection.
///
/// `.csv` files are read as EDHREC exports, anything else as a text list.
fn read_deck_list(index: &CardIndex, path: &Path, name: Option<String>) -> Result<DeckImport> {
    let name = name.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let import = if is_csv {
        let file = File::open(path)
            .with_context(|| format!("opening deck export {}", path.display()))?;
        import_edhrec_csv(file, &name, index)
            .with_context(|| format!("reading deck export {}", path.display()))?
    } else {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading deck list {}", path.display()))?;
        import_deck_text(&text, &name, index)
    };

    for line in &import.unresolved {
        println!("! not in collection: {} x{}", line.name, line.quantity);
    }
    Ok(import)
}

fn print_card(card: &CardRecord) {
    println!(
        "{:>3}x {:<32} {:<8} {:<30} {}",
        card.quantity,
        card.display_name(),
        card.mana_cost.as_deref().unwrap_or(""),
        card.type_line.as_deref().unwrap_or(""),
        card.set_code.as_deref().unwrap_or("")
    );
}

fn search(config: &AppConfig, args: SearchArgs) -> Result<()> {
    let index = load_index(config)?;

    let mut query = CardQuery::text(args.query).with_limit(args.limit);
    query.colors = args.colors;
    query.card_type = args.card_type;
    query.rarity = args.rarity;
    query.set_code = args.set_code;
    query.min_cmc = args.min_cmc;
    query.max_cmc = args.max_cmc;

    let results = index.query(&query);
    for card in &results {
        print_card(card);
    }
    println!("{} result(s)", results.len());
    Ok(())
}

fn stats(config: &AppConfig) -> Result<()> {
    let index = load_index(config)?;
    let stats = index.statistics();

    println!("Unique cards:   {}", stats.unique_cards);
    println!("Total quantity: {}", stats.total_quantity);
    for (title, distribution) in [
        ("Colors", &stats.color_distribution),
        ("Rarities", &stats.rarity_distribution),
        ("Types", &stats.type_distribution),
    ] {
        println!("\n{}:", title);
        for (key, count) in distribution {
            println!("  {:<16} {}", key, count);
        }
    }
    Ok(())
}

fn print_statuses(title: &str, statuses: &[EntryStatus]) {
    if statuses.is_empty() {
        return;
    }
    println!("\n{} ({}):", title, statuses.len());
    for status in statuses {
        println!(
            "  {:<32} need {:>2}  own {:>2}  short {:>2}",
            status.entry.name(),
            status.needed,
            status.owned,
            status.shortfall
        );
    }
}

fn compare(config: &AppConfig, path: &Path) -> Result<()> {
    let index = load_index(config)?;
    let import = read_deck_list(&index, path, None)?;
    let result = ReconciliationEngine::compare(&import.deck, &index.snapshot());

    print_statuses("Available", &result.available);
    print_statuses("Partial", &result.partial);
    print_statuses("Missing", &result.missing);
    println!(
        "\n{}/{} cards owned ({:.2}%)",
        result.available_total, result.needed_total, result.completion_percentage
    );

    let shopping = result.shopping_list();
    if !shopping.is_empty() {
        println!("\nTo acquire:");
        for (name, count) in shopping {
            println!("  {} {}", count, name);
        }
    }
    Ok(())
}

fn validate(config: &AppConfig, path: &Path, format: Option<&str>) -> Result<()> {
    let index = load_index(config)?;
    let import = read_deck_list(&index, path, None)?;
    let report = FormatValidator::validate_as(&import.deck, format);

    for error in &report.errors {
        println!("error: {}", error);
    }
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    if !report.valid {
        bail!("deck {} is not legal", import.deck.name);
    }
    println!("Deck {} is valid", import.deck.name);
    Ok(())
}

fn analyze(config: &AppConfig, path: &Path) -> Result<()> {
    let index = load_index(config)?;
    let import = read_deck_list(&index, path, None)?;
    let analysis = import.deck.analyze();
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn import(
    config: &AppConfig,
    path: &Path,
    name: Option<String>,
    format: Option<String>,
) -> Result<()> {
    let index = load_index(config)?;
    let mut deck = read_deck_list(&index, path, name)?.deck;
    deck.format = format;

    let store = DeckStore::from_config(&config.data);
    let saved = store.save(&deck)?;
    println!("Saved {} ({} cards) to {}", deck.name, deck.total_cards(), saved.display());
    Ok(())
}

fn export(path: &Path) -> Result<()> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading deck file {}", path.display()))?;
    let deck: DeckAggregate = serde_json::from_str(&json)
        .with_context(|| format!("parsing deck file {}", path.display()))?;
    print!("{}", export_deck_text(&deck));
    Ok(())
}

fn list_decks(config: &AppConfig) -> Result<()> {
    let store = DeckStore::from_config(&config.data);
    let decks = store.list()?;
    if decks.is_empty() {
        println!("No decks in {}", store.dir().display());
    }
    for deck in decks {
        println!(
            "{:<32} {:<10} {:>3} cards  {}",
            deck.name,
            deck.format.as_deref().unwrap_or("-"),
            deck.card_count,
            deck.file_name
        );
    }
    Ok(())
}

fn cache(config: &AppConfig, command: CacheCommand) -> Result<()> {
    let cache = ImageCache::from_config(config)?;

    match command {
        CacheCommand::Stats => {
            let stats = cache.stats()?;
            println!(
                "{} images, {:.2} MB in {}",
                stats.count,
                stats.size_mb(),
                stats.dir.display()
            );
        }
        CacheCommand::Clear => {
            let removed = cache.clear()?;
            println!("Removed {} images", removed);
        }
        CacheCommand::Fetch { urls } => {
            let report = cache.preload_all(
                &urls,
                config.images.timeout(),
                config.images.preload_workers,
            );
            println!(
                "{} already cached, {} fetched, {} failed",
                report.already_cached,
                report.fetched,
                report.failed.len()
            );
            for (url, error) in &report.failed {
                println!("  {}: {}", url, error);
            }
            if !report.is_success() {
                bail!("{} image(s) could not be cached", report.failed.len());
            }
        }
    }
    Ok(())
}
