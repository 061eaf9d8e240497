use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use tunematch_core::{Error, SongId};
use tunematch_similarity::{Explanation, Recommendation, RecommendationHistory, DEFAULT_RECOMMENDATION_COUNT};
use tunematch_storage::{CatalogStore, LoaderConfig, PlaylistDraft, PLAYLIST_BATCH_SIZE};

/// Song recommendations from audio features
#[derive(Parser, Debug)]
#[command(name = "tunematch")]
#[command(about = "Recommend similar songs from a CSV of audio features", long_about = None)]
struct Args {
    /// Path to the songs CSV
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Comma-separated feature list replacing the canonical one
    #[arg(long, global = true, value_delimiter = ',')]
    features: Option<Vec<String>>,

    /// JSON loader configuration; --csv and --features take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend songs similar to one or more query songs
    Recommend {
        /// Song ids, or display names / titles with --by-title
        #[arg(required = true)]
        songs: Vec<String>,

        #[arg(short = 'n', long, default_value_t = DEFAULT_RECOMMENDATION_COUNT)]
        count: usize,

        /// Look songs up by "title - artist" or title instead of id
        #[arg(long)]
        by_title: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Show which feature drove each match
        #[arg(long)]
        explain: bool,
    },
    /// List songs in catalog order
    Songs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Catalog and feature statistics
    Stats,
    /// Write a playlist draft for a song's recommendations
    Export {
        song: String,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short = 'n', long, default_value_t = DEFAULT_RECOMMENDATION_COUNT)]
        count: usize,

        #[arg(long)]
        by_title: bool,
    },
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a SongId,
    recommendations: &'a [Recommendation],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    explanations: Vec<Explanation>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting TuneMatch v{}", env!("CARGO_PKG_VERSION"));

    let config = loader_config(&args)?;
    let store = CatalogStore::open(config)?;

    match args.command {
        Command::Recommend {
            songs,
            count,
            by_title,
            json,
            explain,
        } => {
            let mut history = RecommendationHistory::default();
            for key in &songs {
                let id = resolve(&store, key, by_title)?;
                let results = store.recommend(id.as_str(), count).map_err(|e| with_hint(&store, key, e))?;
                history.record(id.clone(), &results);

                let snapshot = store.snapshot();
                let explanations = if explain {
                    results
                        .iter()
                        .map(|rec| snapshot.engine.explain(id.as_str(), rec.song_id.as_str()))
                        .collect::<Result<Vec<_>, _>>()?
                } else {
                    Vec::new()
                };

                if json {
                    let output = QueryOutput {
                        query: &id,
                        recommendations: &results,
                        explanations,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    print_recommendations(&store, &id, &results, &explanations);
                }
            }
            if !json && history.len() > 1 {
                println!("Recent queries:");
                for line in history_lines(&history) {
                    println!("  {}", line);
                }
            }
        }
        Command::Songs { limit } => {
            let snapshot = store.snapshot();
            let catalog = snapshot.catalog();
            for song in catalog.songs().iter().take(limit) {
                println!("{}\t{}", song.id, song.display_name());
            }
            if catalog.len() > limit {
                println!("... {} more", catalog.len() - limit);
            }
        }
        Command::Stats => {
            let snapshot = store.snapshot();
            let stats = snapshot.catalog().stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
            if let Some(report) = &snapshot.report {
                println!("{}", serde_json::to_string_pretty(report)?);
            }
        }
        Command::Export {
            song,
            output,
            count,
            by_title,
        } => {
            let id = resolve(&store, &song, by_title)?;
            let results = store.recommend(id.as_str(), count).map_err(|e| with_hint(&store, &song, e))?;
            let snapshot = store.snapshot();
            let base = snapshot
                .catalog()
                .get(id.as_str())
                .with_context(|| format!("Song {} vanished from the catalog", id))?;

            let draft = PlaylistDraft::from_recommendations(base, &results);
            draft.write_json(&output)?;
            println!(
                "Playlist '{}' with {} tracks ({} request(s)) written to {}",
                draft.name,
                draft.len(),
                draft.batches(PLAYLIST_BATCH_SIZE).count(),
                output.display()
            );
        }
    }

    Ok(())
}

fn loader_config(args: &Args) -> anyhow::Result<LoaderConfig> {
    let mut config = match (&args.config, &args.csv) {
        (Some(path), _) => LoaderConfig::from_json_file(path)?,
        (None, Some(csv)) => LoaderConfig::new(csv),
        (None, None) => bail!("No catalog given: pass --csv <file> or --config <file>"),
    };
    if let Some(csv) = &args.csv {
        config.csv_path = csv.clone();
    }
    if let Some(features) = &args.features {
        config = config.with_features(features.clone());
    }
    Ok(config)
}

/// Map a command-line key to a song id in the current catalog
fn resolve(store: &CatalogStore, key: &str, by_title: bool) -> anyhow::Result<SongId> {
    if !by_title {
        return Ok(SongId::from(key));
    }
    let snapshot = store.snapshot();
    let catalog = snapshot.catalog();
    match catalog.find_by_title(key).and_then(|row| catalog.song(row)) {
        Some(song) => Ok(song.id.clone()),
        None => Err(with_hint(store, key, Error::SongNotFound(key.to_string()))),
    }
}

fn with_hint(store: &CatalogStore, key: &str, err: Error) -> anyhow::Error {
    if !matches!(err, Error::SongNotFound(_)) {
        return err.into();
    }
    let suggestions = store.snapshot().catalog().suggest(key, 5);
    if suggestions.is_empty() {
        anyhow::Error::new(err)
    } else {
        let names: Vec<&str> = suggestions.iter().map(SongId::as_str).collect();
        anyhow::Error::new(err).context(format!("Did you mean one of: {}", names.join(", ")))
    }
}

/// One line per recorded query, newest first
fn history_lines(history: &RecommendationHistory) -> Vec<String> {
    history
        .recent(history.len())
        .into_iter()
        .map(|entry| match entry.best_score {
            Some(best) => format!("{}: {} results, best {:.4}", entry.query, entry.result_count, best),
            None => format!("{}: no results", entry.query),
        })
        .collect()
}

fn print_recommendations(
    store: &CatalogStore,
    query: &SongId,
    results: &[Recommendation],
    explanations: &[Explanation],
) {
    let snapshot = store.snapshot();
    let name = snapshot
        .catalog()
        .get(query.as_str())
        .map(|song| song.display_name())
        .unwrap_or_else(|| query.to_string());

    println!("Songs similar to {}:", name);
    if results.is_empty() {
        println!("  (no other songs in the catalog)");
    }
    for (i, rec) in results.iter().enumerate() {
        let because = explanations
            .get(i)
            .and_then(Explanation::top_feature)
            .map(|f| format!("  [{}]", f))
            .unwrap_or_default();
        println!("{:>3}. {:.4}  {}{}", i + 1, rec.score, rec.display_name(), because);
    }
}
