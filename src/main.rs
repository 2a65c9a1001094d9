use anyhow::Result;
use gametrends::{country, meta, pipeline, rank, trend};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const TOP_N: usize = 10;

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) resolve snapshot directory ───────────────────────────────
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/raw"));
    info!(dir = %data_dir.display(), "reading snapshots");

    // ─── 3) player history: trend matrix + consistency ranking ───────
    match pipeline::load_corpus(&data_dir, "top100_games") {
        Ok(corpus) => {
            let matrix = trend::build_trend_matrix(&corpus.records);
            if matrix.is_empty() {
                info!("no usable player metrics; trend is empty");
            } else {
                info!(
                    days = matrix.dates().len(),
                    entities = matrix.columns().len(),
                    "trend matrix built"
                );
            }
            for entry in rank::rank_by_appearances(&corpus.records, TOP_N) {
                info!(
                    entity = %entry.entity_id,
                    appearances = entry.appearances,
                    "consistent entity"
                );
            }
        }
        Err(e) if e.is_no_data() => warn!("{e}; no player history to analyze"),
        Err(e) => return Err(e.into()),
    }

    // ─── 4) new releases by month ────────────────────────────────────
    match pipeline::load_release_corpus(&data_dir, "new_releases") {
        Ok(corpus) => {
            for key in corpus.month_keys() {
                if let Some(summary) = corpus.summarize(key) {
                    info!(
                        month = %summary.month_key,
                        games = summary.total_games,
                        top_tag = %summary
                            .top_tags
                            .first()
                            .map(|(tag, _)| tag.as_str())
                            .unwrap_or("-"),
                        "monthly summary"
                    );
                }
            }
        }
        Err(e) if e.is_no_data() => warn!("{e}; no release history to analyze"),
        Err(e) => return Err(e.into()),
    }

    // ─── 5) metadata analyses ────────────────────────────────────────
    match meta::load_latest_metadata(&data_dir, "game_metadata") {
        Ok(index) => {
            for (genre, count) in meta::genre_counts(&index).into_iter().take(TOP_N) {
                info!(%genre, count, "genre");
            }
        }
        Err(e) => warn!("{e:#}; skipping metadata analyses"),
    }

    // ─── 6) country statistics ───────────────────────────────────────
    match country::load_latest_country_stats(&data_dir, "country_stats") {
        Ok(index) => {
            for summary in country::summarize_countries(&index) {
                info!(
                    country = %summary.country,
                    avg_price = summary.avg_price,
                    avg_discount = summary.avg_discount,
                    "country summary"
                );
            }
        }
        Err(e) => warn!("{e:#}; skipping country statistics"),
    }

    info!("all done");
    Ok(())
}
