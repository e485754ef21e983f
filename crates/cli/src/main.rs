use anyhow::{Context, Result, bail};
use catalog::{
    BrandFilter, CatalogError, CatalogStore, ErrorKind, ExportFormat, ImportStrategy, ListQuery,
    Profile, ProfilePatch, ProfileStore, Record, RecordDraft, RecordPatch, SortKey,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use recommend::filters::{InStockFilter, MinimumRatingFilter};
use recommend::{DEFAULT_TOP_K, PreferenceProfile, Recommendation, Recommender};
use std::path::PathBuf;
use std::process::ExitCode;

/// AromaVault - personal perfume catalogue
#[derive(Parser)]
#[command(name = "aromavault")]
#[command(about = "Perfume catalogue with preference-based recommendations", long_about = None)]
struct Cli {
    /// Path to the catalogue JSON file
    #[arg(long, global = true, default_value = "db.json")]
    db: PathBuf,

    /// Path to the profiles JSON file
    #[arg(long, global = true, default_value = "profiles.json")]
    profiles: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List perfumes, optionally filtered and sorted
    List {
        /// Case-insensitive substring of the name
        #[arg(long)]
        name: Option<String>,

        /// Exact brand (case-insensitive)
        #[arg(long, conflicts_with = "brand_contains")]
        brand: Option<String>,

        /// Substring of the brand (case-insensitive)
        #[arg(long)]
        brand_contains: Option<String>,

        /// Only perfumes carrying this note
        #[arg(long)]
        note: Option<String>,

        /// Only perfumes priced at or below this
        #[arg(long)]
        max_price: Option<f64>,

        #[arg(long, value_enum)]
        sort: Option<SortArg>,
    },

    /// Show one perfume by id or name
    Show { id_or_name: String },

    /// Add a perfume
    Add {
        name: String,

        #[arg(long)]
        brand: String,

        #[arg(long)]
        price: f64,

        /// Comma separated notes
        #[arg(long, default_value = "")]
        notes: String,

        /// Comma separated allergens
        #[arg(long, default_value = "")]
        allergens: String,

        #[arg(long)]
        rating: Option<f64>,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        stock: i64,
    },

    /// Update fields of a perfume by id or name
    Update {
        id_or_name: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        /// Replaces all notes (comma separated)
        #[arg(long)]
        notes: Option<String>,

        /// Replaces all allergens (comma separated)
        #[arg(long)]
        allergens: Option<String>,

        #[arg(long, conflicts_with = "clear_rating")]
        rating: Option<f64>,

        /// Remove the rating
        #[arg(long)]
        clear_rating: bool,

        #[arg(long, allow_negative_numbers = true)]
        stock: Option<i64>,
    },

    /// Delete a perfume by id or name
    Delete { id_or_name: String },

    /// Import perfumes from a CSV file
    Import {
        path: PathBuf,

        #[arg(long, value_enum, default_value = "merge")]
        mode: ImportMode,
    },

    /// Export the catalogue to stdout or a file
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: FormatArg,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Rank the catalogue against preferences
    Recommend {
        /// Comma separated notes to favour
        #[arg(long)]
        prefer: Option<String>,

        /// Comma separated notes or allergens to avoid
        #[arg(long)]
        avoid: Option<String>,

        /// Preferred brand
        #[arg(long)]
        brand: Option<String>,

        /// Price ceiling
        #[arg(long)]
        budget: Option<f64>,

        /// Use a stored profile instead of --prefer/--avoid
        #[arg(long, conflicts_with_all = ["prefer", "avoid"])]
        profile: Option<String>,

        /// Number of recommendations to return
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top: usize,

        /// Only perfumes in stock
        #[arg(long)]
        in_stock: bool,

        /// Only perfumes rated at least this
        #[arg(long)]
        min_rating: Option<f64>,

        /// Show why each perfume scored the way it did
        #[arg(long)]
        explain: bool,
    },

    /// Add three sample perfumes to an empty catalogue
    Seed,

    /// Manage stored preference profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    List,

    Show { id_or_name: String },

    Add {
        name: String,

        #[arg(long, default_value = "")]
        prefer: String,

        #[arg(long, default_value = "")]
        avoid: String,
    },

    Update {
        id_or_name: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        prefer: Option<String>,

        #[arg(long)]
        avoid: Option<String>,
    },

    Delete { id_or_name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Brand,
    Price,
    Rating,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortKey::Name,
            SortArg::Brand => SortKey::Brand,
            SortArg::Price => SortKey::Price,
            SortArg::Rating => SortKey::Rating,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ImportMode {
    Merge,
    Overwrite,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            exit_code(&e)
        }
    }
}

/// Map the first catalogue error in the chain to a distinct exit code
fn exit_code(err: &anyhow::Error) -> ExitCode {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<CatalogError>())
        .map(CatalogError::kind);
    match kind {
        Some(ErrorKind::Validation) => ExitCode::from(2),
        Some(ErrorKind::Uniqueness) => ExitCode::from(3),
        Some(ErrorKind::NotFound) => ExitCode::from(4),
        Some(ErrorKind::StorageIo) => ExitCode::from(5),
        None => ExitCode::FAILURE,
    }
}

fn run(cli: Cli) -> Result<()> {
    tracing::debug!(
        "Using catalogue {} and profiles {}",
        cli.db.display(),
        cli.profiles.display()
    );
    let store = CatalogStore::new(&cli.db);
    let profiles = ProfileStore::new(&cli.profiles);

    match cli.command {
        Commands::List {
            name,
            brand,
            brand_contains,
            note,
            max_price,
            sort,
        } => {
            let mut query = ListQuery::new();
            if let Some(name) = name {
                query = query.name_contains(name);
            }
            if let Some(brand) = brand {
                query = query.brand(BrandFilter::Exact(brand));
            } else if let Some(brand) = brand_contains {
                query = query.brand(BrandFilter::Contains(brand));
            }
            if let Some(note) = note {
                query = query.with_note(note);
            }
            if let Some(max) = max_price {
                query = query.price_max(max);
            }
            if let Some(sort) = sort {
                query = query.sort_by(sort.into());
            }
            handle_list(&store, &query)
        }
        Commands::Show { id_or_name } => {
            let record = store
                .get(&id_or_name)
                .ok_or_else(|| CatalogError::not_found("perfume", &id_or_name))?;
            print_record(&record);
            Ok(())
        }
        Commands::Add {
            name,
            brand,
            price,
            notes,
            allergens,
            rating,
            stock,
        } => {
            let mut draft = RecordDraft::new(name, brand, price)
                .notes(notes)
                .allergens(allergens)
                .stock(stock);
            if let Some(rating) = rating {
                draft = draft.rating(rating);
            }
            let record = store.add(draft).context("Failed to add perfume")?;
            println!("{} Added {} ({})", "✓".green(), record.name.bold(), record.id);
            Ok(())
        }
        Commands::Update {
            id_or_name,
            name,
            brand,
            price,
            notes,
            allergens,
            rating,
            clear_rating,
            stock,
        } => {
            let patch = RecordPatch {
                name,
                brand,
                price,
                notes: notes.map(|n| vec![n]),
                allergens: allergens.map(|a| vec![a]),
                rating: if clear_rating { Some(None) } else { rating.map(Some) },
                stock,
            };
            if patch.is_empty() {
                bail!("Nothing to update; pass at least one field");
            }
            if !store.update(&id_or_name, &patch).context("Failed to update perfume")? {
                return Err(CatalogError::not_found("perfume", &id_or_name).into());
            }
            println!("{} Updated {}", "✓".green(), id_or_name);
            Ok(())
        }
        Commands::Delete { id_or_name } => {
            if !store.delete(&id_or_name)? {
                return Err(CatalogError::not_found("perfume", &id_or_name).into());
            }
            println!("{} Deleted {}", "✓".green(), id_or_name);
            Ok(())
        }
        Commands::Import { path, mode } => {
            let strategy = match mode {
                ImportMode::Merge => ImportStrategy::Merge,
                ImportMode::Overwrite => ImportStrategy::Overwrite,
            };
            let summary = store
                .import_csv_file(&path, strategy)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            println!(
                "{} Imported {} perfumes ({} skipped)",
                "✓".green(),
                summary.ingested,
                summary.skipped
            );
            Ok(())
        }
        Commands::Export { format, out } => {
            let format = match format {
                FormatArg::Csv => ExportFormat::Csv,
                FormatArg::Json => ExportFormat::Json,
            };
            match out {
                Some(path) => {
                    let rows = store
                        .export_to_file(&path, format)
                        .with_context(|| format!("Failed to export to {}", path.display()))?;
                    println!("{} Exported {} perfumes to {}", "✓".green(), rows, path.display());
                }
                None => print!("{}", store.export_all(format)?.body),
            }
            Ok(())
        }
        Commands::Recommend {
            prefer,
            avoid,
            brand,
            budget,
            profile,
            top,
            in_stock,
            min_rating,
            explain,
        } => {
            let mut prefs = match profile {
                Some(key) => {
                    let stored = profiles
                        .get(&key)
                        .ok_or_else(|| CatalogError::not_found("profile", &key))?;
                    PreferenceProfile::from(&stored)
                }
                None => PreferenceProfile::new()
                    .prefer(prefer)
                    .avoid(avoid),
            };
            if let Some(brand) = brand {
                prefs = prefs.brand(brand);
            }
            if let Some(budget) = budget {
                prefs = prefs.budget(budget);
            }

            let mut recommender = Recommender::new();
            if in_stock {
                recommender = recommender.with_filter(InStockFilter);
            }
            if let Some(min) = min_rating {
                recommender = recommender.with_filter(MinimumRatingFilter::new(min, false));
            }

            let candidates = store.list(&ListQuery::new());
            tracing::debug!("Ranking {} candidates with {:?}", candidates.len(), prefs);
            let recommendations = recommender.recommend(candidates, &prefs, top)?;
            print_recommendations(&recommendations, explain);
            Ok(())
        }
        Commands::Seed => handle_seed(&store),
        Commands::Profile { command } => handle_profile(&profiles, command),
    }
}

fn handle_list(store: &CatalogStore, query: &ListQuery) -> Result<()> {
    let records = store.list(query);
    if records.is_empty() {
        println!("No perfumes found");
        return Ok(());
    }
    for record in &records {
        println!(
            "{}  {} by {}  {}  [{}]",
            record.id.dimmed(),
            record.name.bold(),
            record.brand,
            format_price(record.price).green(),
            record.notes.join(", ")
        );
    }
    println!("{} perfumes", records.len());
    Ok(())
}

/// Add the sample perfumes, but only into an empty catalogue
fn handle_seed(store: &CatalogStore) -> Result<()> {
    if !store.list(&ListQuery::new()).is_empty() {
        println!("Already seeded");
        return Ok(());
    }
    let samples = [
        RecordDraft::new("Citrus Aurora", "Sole", 48.0).notes("bergamot, lemon, neroli"),
        RecordDraft::new("Rose Dusk", "Floral", 55.0).notes("rose, musk"),
        RecordDraft::new("Vetiver Line", "Terra", 67.0).notes("vetiver, grapefruit, pepper"),
    ];
    let mut added = 0;
    for draft in samples {
        store.add(draft).context("Failed to seed catalogue")?;
        added += 1;
    }
    println!("{} Seeded {} perfumes", "✓".green(), added);
    Ok(())
}

fn handle_profile(profiles: &ProfileStore, command: ProfileCommands) -> Result<()> {
    match command {
        ProfileCommands::List => {
            let all = profiles.list();
            if all.is_empty() {
                println!("No profiles found");
            }
            for profile in &all {
                print_profile(profile);
            }
        }
        ProfileCommands::Show { id_or_name } => {
            let profile = profiles
                .get(&id_or_name)
                .ok_or_else(|| CatalogError::not_found("profile", &id_or_name))?;
            print_profile(&profile);
        }
        ProfileCommands::Add {
            name,
            prefer,
            avoid,
        } => {
            let profile = profiles
                .add(&name, &[prefer], &[avoid])
                .context("Failed to add profile")?;
            println!("{} Added profile {} ({})", "✓".green(), profile.name.bold(), profile.id);
        }
        ProfileCommands::Update {
            id_or_name,
            name,
            prefer,
            avoid,
        } => {
            let patch = ProfilePatch {
                name,
                preferred_notes: prefer.map(|p| vec![p]),
                avoid_allergens: avoid.map(|a| vec![a]),
            };
            let profile = profiles
                .update(&id_or_name, &patch)
                .context("Failed to update profile")?;
            println!("{} Updated profile {}", "✓".green(), profile.name.bold());
        }
        ProfileCommands::Delete { id_or_name } => {
            if !profiles.delete(&id_or_name)? {
                return Err(CatalogError::not_found("profile", &id_or_name).into());
            }
            println!("{} Deleted profile {}", "✓".green(), id_or_name);
        }
    }
    Ok(())
}

fn format_price(price: f64) -> String {
    format!("£{:.2}", price)
}

fn print_record(record: &Record) {
    println!("{}", record.name.bold().blue());
    println!("{}Id: {}", "• ".green(), record.id);
    println!("{}Brand: {}", "• ".green(), record.brand);
    println!("{}Price: {}", "• ".green(), format_price(record.price));
    println!("{}Notes: {}", "• ".green(), record.notes.join(", "));
    println!("{}Allergens: {}", "• ".green(), record.allergens.join(", "));
    match record.rating {
        Some(rating) => println!("{}Rating: {:.1}", "• ".cyan(), rating),
        None => println!("{}Rating: unrated", "• ".cyan()),
    }
    println!("{}Stock: {}", "• ".cyan(), record.stock);
}

fn print_profile(profile: &Profile) {
    println!(
        "{}  {}  prefers [{}]  avoids [{}]",
        profile.id.dimmed(),
        profile.name.bold(),
        profile.preferred_notes.join(", "),
        profile.avoid_allergens.join(", ")
    );
}

fn print_recommendations(recommendations: &[Recommendation], explain: bool) {
    print!("{}", format_recommendations(recommendations, explain));
}

fn format_recommendations(recommendations: &[Recommendation], explain: bool) -> String {
    let mut out = format!("{}\n", "Recommendations:".bold().blue());
    if recommendations.is_empty() {
        out.push_str("  No perfumes matched\n");
        return out;
    }
    for (i, rec) in recommendations.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} by {} {} [{}] - Score: {:.2}\n",
            (i + 1).to_string().green(),
            rec.record.name,
            rec.record.brand,
            format_price(rec.record.price),
            rec.record.notes.join(", "),
            rec.total()
        ));
        if explain {
            out.push_str(&format!("   Explanation: {}\n", rec.explanation()));
        }
    }
    out
}
