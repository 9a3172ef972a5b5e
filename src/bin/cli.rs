// Catalog Sync - VRT NU catalog aggregation and favorites synchronization
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::{Context, Result};
use catalog_sync::api::{ClientConfig, Facet, HttpCatalogClient, ListingVariant};
use catalog_sync::auth::{StaticTokenProvider, TokenVariant, ROAMING_TOKEN_NAME, USER_TOKEN_NAME};
use catalog_sync::cache::{CacheTtl, SqliteCache};
use catalog_sync::catalog::{
    CatalogAggregator, EpisodeItem, EpisodeListing, EpisodeQuery, HtmlCategorySource, Listing, SeasonSelection,
};
use catalog_sync::config::{CatalogConfig, StaticData};
use catalog_sync::favorites::{FavoritesStore, ManageOutcome, UpdateOutcome};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Catalog Sync CLI - browse the catalog and manage favorites", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache database (defaults to the platform cache directory)
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List programs, optionally restricted to one facet
    Shows {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        feature: Option<String>,
        /// Only followed programs
        #[arg(long)]
        favorites: bool,
    },
    /// List the episodes or seasons of a program
    Episodes {
        program: String,
        /// Season title, or "allseasons"
        #[arg(long)]
        season: Option<String>,
    },
    /// Newest episodes
    Recent {
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        favorites: bool,
    },
    /// Episodes that are removed today
    Offline {
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        favorites: bool,
    },
    /// Search the catalog
    Search {
        query: String,
        #[arg(long)]
        page: Option<i64>,
    },
    /// Show the newest episode of a program
    Latest { program: String },
    /// List followed programs
    Favorites,
    /// Follow a program
    Follow { program: String, title: String },
    /// Unfollow a program
    Unfollow { program: String, title: String },
    /// Keep only the given favorites (indices as listed by `manage --list`)
    Manage {
        /// Comma-separated indices to keep followed
        #[arg(long, value_delimiter = ',')]
        select: Vec<usize>,
        /// Only print the indices
        #[arg(long)]
        list: bool,
    },
    /// List categories
    Categories,
    /// List featured collections
    Featured,
    /// List channels
    Channels {
        /// Live stream entries instead of program listings
        #[arg(long)]
        live: bool,
    },
    /// Remove a cached listing
    DeleteCache { key: String },
}

struct App {
    aggregator: CatalogAggregator,
    favorites: Arc<FavoritesStore>,
}

async fn build_app(cli: &Cli) -> Result<App> {
    let config = match cli.config {
        Some(ref path) => CatalogConfig::load_from(path),
        None => CatalogConfig::load(),
    }
    .context("Failed to load config")?;

    let cache_path = cli.cache.clone().unwrap_or_else(CatalogConfig::cache_path);
    let cache = Arc::new(SqliteCache::new(&cache_path).await.context("Failed to open cache")?);

    let http = HttpCatalogClient::with_config(ClientConfig::from(&config.api))?;
    let client = Arc::new(http.clone());

    let mut tokens = StaticTokenProvider::new();
    if let Ok(token) = std::env::var("CATALOG_ROAMING_TOKEN") {
        tokens = tokens.with_token(ROAMING_TOKEN_NAME, TokenVariant::Roaming, token);
    }
    if let Ok(token) = std::env::var("CATALOG_USER_TOKEN") {
        tokens = tokens.with_token(USER_TOKEN_NAME, TokenVariant::User, token);
    }

    let favorites = Arc::new(FavoritesStore::new(
        cache.clone(),
        client.clone(),
        Arc::new(tokens),
        config.api.clone(),
        config.settings.use_favorites,
    ));
    favorites.refresh(CacheTtl::hours(1)).await?;

    let categories = Arc::new(HtmlCategorySource::new(http, config.api.categories_url.clone()));
    let aggregator = CatalogAggregator::new(client, cache, favorites.clone(), config, Arc::new(StaticData::builtin()))
        .with_category_source(categories);

    Ok(App { aggregator, favorites })
}

fn print_episodes(listing: &Listing<EpisodeItem>) {
    println!("{} episodes (sort: {}, ascending: {})", listing.len(), listing.sort.as_str(), listing.ascending);
    for item in &listing.items {
        let star = if item.is_favorite { "*" } else { " " };
        println!(
            "{} {}  [{}]",
            star,
            item.label,
            item.video_id.as_deref().unwrap_or("-")
        );
    }
}

fn print_outcome(program: &str, outcome: UpdateOutcome) {
    match outcome {
        UpdateOutcome::Unchanged => println!("{}: already in that state", program),
        UpdateOutcome::Updated => println!("{}: updated", program),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalog_sync=info")))
        .init();

    let cli = Cli::parse();
    let app = build_app(&cli).await?;

    match cli.command {
        Commands::Shows {
            category,
            channel,
            feature,
            favorites,
        } => {
            let facet = Facet::from_options(category.as_deref(), channel.as_deref(), feature.as_deref());
            for show in app.aggregator.get_show_items(&facet, favorites).await? {
                let star = if show.is_favorite { "*" } else { " " };
                println!("{} {:<40} {}", star, show.label, show.program);
            }
        }
        Commands::Episodes { program, season } => {
            let query = EpisodeQuery::program(program).season(SeasonSelection::from_option(season.as_deref()));
            match app.aggregator.get_episode_items(&query).await? {
                EpisodeListing::Episodes(listing) => print_episodes(&listing),
                EpisodeListing::Seasons(listing) => {
                    for season in &listing.items {
                        println!("{:<20} {}", season.label, season.season.as_option().unwrap_or(""));
                    }
                }
            }
        }
        Commands::Recent { page, favorites } => {
            let query = EpisodeQuery::variety(ListingVariant::Recent, page).favorites(favorites);
            if let EpisodeListing::Episodes(listing) = app.aggregator.get_episode_items(&query).await? {
                print_episodes(&listing);
            }
        }
        Commands::Offline { page, favorites } => {
            let query = EpisodeQuery::variety(ListingVariant::Offline, page).favorites(favorites);
            if let EpisodeListing::Episodes(listing) = app.aggregator.get_episode_items(&query).await? {
                print_episodes(&listing);
            }
        }
        Commands::Search { query, page } => {
            print_episodes(&app.aggregator.search(&query, page).await?);
        }
        Commands::Latest { program } => match app.aggregator.get_latest_episode(&program).await? {
            Some(latest) => println!(
                "video_id={} publication_id={}",
                latest.video_id.unwrap_or_default(),
                latest.publication_id.unwrap_or_default()
            ),
            None => println!("No episodes for {}", program),
        },
        Commands::Favorites => {
            for title in app.favorites.titles() {
                println!("{}", title);
            }
        }
        Commands::Follow { program, title } => {
            let outcome = app.favorites.follow(&program, &title).await?;
            print_outcome(&program, outcome);
        }
        Commands::Unfollow { program, title } => {
            let outcome = app.favorites.unfollow(&program, &title).await?;
            print_outcome(&program, outcome);
        }
        Commands::Manage { select, list } => {
            if list {
                for (idx, item) in app.favorites.manage_items().iter().enumerate() {
                    let mark = if item.enabled { "x" } else { " " };
                    println!("{:>3} [{}] {}", idx, mark, item.title);
                }
                return Ok(());
            }
            let selected: BTreeSet<usize> = select.into_iter().collect();
            match app.favorites.manage(|_| Some(selected)).await? {
                ManageOutcome::NothingToManage => println!("No favorites to manage"),
                ManageOutcome::Cancelled => println!("Cancelled"),
                ManageOutcome::Applied(report) => {
                    println!("Followed: {:?}", report.followed);
                    println!("Unfollowed: {:?}", report.unfollowed);
                    for failure in report.failures {
                        eprintln!("Failed {}: {}", failure.title, failure.error.user_message());
                    }
                }
            }
        }
        Commands::Categories => {
            for category in app.aggregator.get_categories().await {
                println!("{:<25} {}", category.id, category.label);
            }
        }
        Commands::Featured => {
            for feature in app.aggregator.get_featured_items() {
                println!("{:<20} {}", feature.id, feature.label);
            }
        }
        Commands::Channels { live } => {
            for channel in app.aggregator.get_channel_items(&[], live) {
                println!("{:<12} {}", channel.name, channel.label);
            }
        }
        Commands::DeleteCache { key } => {
            if app.aggregator.delete_cache(&key).await? {
                println!("Removed {}", key);
            } else {
                println!("No cached listing named {}", key);
            }
        }
    }

    Ok(())
}
