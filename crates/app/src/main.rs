use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use nearby_search_core::{
    format_distance, resolve_reference_position, sample_items, Coordinate, DistanceLocale,
    GeoItem, Geocoder, MapboxGeocoder, NearbyFeed, NominatimGeocoder, ProximitySearchController,
    RadiusSetting, ResultsView, SearchOptions, SearchSnapshot, StaticPosition, MAPBOX_ENDPOINT,
    NOMINATIM_ENDPOINT,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "nearby-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Geocoding provider used for place search
    #[arg(long, value_enum, default_value_t = Provider::Nominatim)]
    provider: Provider,

    /// Nominatim base URL
    #[arg(long, env = "NOMINATIM_URL", default_value = NOMINATIM_ENDPOINT)]
    nominatim_url: String,

    /// Mapbox API base URL
    #[arg(long, env = "MAPBOX_URL", default_value = MAPBOX_ENDPOINT)]
    mapbox_url: String,

    /// Mapbox access token
    #[arg(long, env = "MAPBOX_TOKEN", default_value = "")]
    mapbox_token: String,

    /// Country filter passed to the geocoder; empty disables it
    #[arg(long, default_value = "il")]
    country: String,

    /// Accept-language hint
    #[arg(long, default_value = "he,en")]
    language: String,

    /// Maximum number of geocoder results
    #[arg(long, default_value = "8")]
    limit: usize,

    /// Geocoder timeout in milliseconds
    #[arg(long, default_value = "10000")]
    timeout_ms: u64,

    /// Reference latitude (your position)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Reference longitude (your position)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Unit labels used when printing distances
    #[arg(long, value_enum, default_value_t = Locale::English)]
    locale: Locale,
}

#[derive(Clone, Copy, ValueEnum)]
enum Provider {
    Nominatim,
    Mapbox,
}

#[derive(Clone, Copy, ValueEnum)]
enum Locale {
    English,
    Hebrew,
}

impl From<Locale> for DistanceLocale {
    fn from(locale: Locale) -> Self {
        match locale {
            Locale::English => Self::English,
            Locale::Hebrew => Self::Hebrew,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run one place query and print ranked candidates.
    Search {
        /// Free-text place query
        #[arg(long)]
        query: String,
    },
    /// Replay keystrokes through the debounced search box.
    Type {
        /// Comma separated successive contents of the search box, e.g. "T,Te,Tel,Tel A"
        #[arg(long)]
        keystrokes: String,
        /// Delay between keystrokes in milliseconds
        #[arg(long, default_value = "50")]
        interval_ms: u64,
    },
    /// Filter items by distance from the reference position.
    Nearby {
        /// JSON array of items; the sample catalogue is used when omitted
        #[arg(long)]
        items: Option<PathBuf>,
        /// Radius in kilometers (1-250)
        #[arg(long, default_value = "50")]
        radius: u32,
    },
}

impl Cli {
    fn search_options(&self) -> SearchOptions {
        SearchOptions {
            result_limit: self.limit,
            country_filter: Some(self.country.clone()).filter(|country| !country.is_empty()),
            language: self.language.clone(),
            request_timeout_ms: self.timeout_ms,
            ..SearchOptions::default()
        }
    }

    fn geocoder(&self) -> anyhow::Result<Arc<dyn Geocoder + Send + Sync>> {
        let timeout = Duration::from_millis(self.timeout_ms);
        let geocoder: Arc<dyn Geocoder + Send + Sync> = match self.provider {
            Provider::Nominatim => {
                Arc::new(NominatimGeocoder::new(&self.nominatim_url).with_timeout(timeout))
            }
            Provider::Mapbox => {
                if self.mapbox_token.is_empty() {
                    bail!("--mapbox-token (or MAPBOX_TOKEN) is required for the mapbox provider");
                }
                Arc::new(
                    MapboxGeocoder::new(&self.mapbox_url, &self.mapbox_token).with_timeout(timeout),
                )
            }
        };
        Ok(geocoder)
    }

    async fn reference_position(&self) -> Option<Coordinate> {
        let provider = match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => {
                StaticPosition::resolved(Coordinate::new(latitude, longitude))
            }
            _ => StaticPosition::unavailable("no --lat/--lon given"),
        };
        resolve_reference_position(&provider).await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "nearby-search boot"
    );

    let reference = cli.reference_position().await;
    let locale = DistanceLocale::from(cli.locale);

    match &cli.command {
        Command::Search { query } => {
            let mut controller =
                ProximitySearchController::new(cli.geocoder()?, cli.search_options())
                    .with_reference_position(reference);
            controller.on_input_changed(query);
            let snapshot = controller.settle().await;
            print_snapshot(&snapshot, locale);
            controller.shutdown();
        }
        Command::Type {
            keystrokes,
            interval_ms,
        } => {
            let mut controller =
                ProximitySearchController::new(cli.geocoder()?, cli.search_options())
                    .with_reference_position(reference);
            let mut updates = controller.subscribe();
            let interval = Duration::from_millis(*interval_ms);

            for text in parse_keystrokes(keystrokes) {
                controller.on_input_changed(&text);
                println!("typed: {text:?}");

                let pause = tokio::time::sleep(interval);
                tokio::pin!(pause);
                loop {
                    tokio::select! {
                        () = &mut pause => break,
                        Some(event) = controller.next_event() => controller.handle_event(event),
                    }
                }
                if updates.has_changed().unwrap_or(false) {
                    let snapshot = updates.borrow_and_update();
                    debug!(
                        generation = snapshot.session.generation,
                        status = ?snapshot.session.status,
                        "search state changed"
                    );
                }
            }

            let snapshot = controller.settle().await;
            println!("final generation: {}", snapshot.session.generation);
            print_snapshot(&snapshot, locale);
            controller.shutdown();
        }
        Command::Nearby { items, radius } => {
            let items = load_items(items.as_deref()).await?;
            let mut feed = NearbyFeed::new(items, RadiusSetting::new(*radius));
            feed.set_reference(reference);

            if reference.is_none() {
                println!("no reference position; showing all items unfiltered");
            }
            println!(
                "{} of {} items within {} km",
                feed.visible().len(),
                feed.items().len(),
                feed.radius().km()
            );
            for item in feed.visible() {
                print_item(item, locale);
            }
        }
    }

    Ok(())
}

fn parse_keystrokes(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

async fn load_items(path: Option<&Path>) -> anyhow::Result<Vec<GeoItem>> {
    let Some(path) = path else {
        return Ok(sample_items());
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading items from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing items in {}", path.display()))
}

fn print_snapshot(snapshot: &SearchSnapshot, locale: DistanceLocale) {
    println!("query: {}", snapshot.session.query_text);
    if let Some(error) = &snapshot.last_error {
        println!("search failed: {error}");
    }
    match snapshot.view {
        ResultsView::NoResults => println!("no results"),
        ResultsView::Hidden if snapshot.candidates.is_empty() => println!("nothing to search"),
        _ => {
            for (position, candidate) in snapshot.candidates.iter().enumerate() {
                let distance = candidate
                    .distance_km
                    .map(|distance| format_distance(distance, locale))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>2}. {} [{}] {} ({:.5}, {:.5})",
                    position + 1,
                    candidate.display_name,
                    candidate.source_type,
                    distance,
                    candidate.coordinate.latitude,
                    candidate.coordinate.longitude
                );
            }
        }
    }
}

fn print_item(item: &GeoItem, locale: DistanceLocale) {
    let distance = item
        .distance_km
        .map(|distance| format_distance(distance, locale))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "[{}] {} / {} @ {} {}",
        item.id, item.title, item.author, item.place_name, distance
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn keystrokes_keep_spaces() {
        assert_eq!(
            parse_keystrokes("T,Te,Tel,Tel A"),
            vec!["T", "Te", "Tel", "Tel A"]
        );
    }

    #[tokio::test]
    async fn items_default_to_sample_catalogue() -> Result<(), Box<dyn std::error::Error>> {
        let items = load_items(None).await?;
        assert_eq!(items.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn items_load_from_json_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("items.json");
        fs::write(
            &path,
            r#"[{"id":"a","title":"Dune","author":"Herbert","coordinate":{"latitude":32.0,"longitude":34.8},"place_name":"Holon"}]"#,
        )?;

        let items = load_items(Some(&path)).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].place_name, "Holon");
        assert!(items[0].distance_km.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_items_file_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("items.json");
        fs::write(&path, "{not json")?;

        assert!(load_items(Some(&path)).await.is_err());
        Ok(())
    }

    #[test]
    fn cli_parses_reference_and_search() {
        let cli = Cli::try_parse_from([
            "nearby-search",
            "--lat",
            "32.08",
            "--lon",
            "-34.78",
            "--country",
            "",
            "search",
            "--query",
            "Tel Aviv",
        ])
        .expect("valid arguments");

        assert_eq!(cli.lat, Some(32.08));
        assert_eq!(cli.lon, Some(-34.78));
        assert_eq!(cli.search_options().country_filter, None);
        assert!(matches!(cli.command, Command::Search { .. }));
    }

    #[test]
    fn mapbox_requires_token() {
        let cli = Cli::try_parse_from([
            "nearby-search",
            "--provider",
            "mapbox",
            "--mapbox-token",
            "",
            "nearby",
        ])
        .expect("valid arguments");
        assert!(cli.geocoder().is_err());
    }
}
