mod config;
mod error;
mod geo;
mod help;
mod locate;
mod overlay;
mod scheduler;
mod settings;
mod solar;
mod terminal;
mod terminator;
mod watch;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use config::WatchConfig;
use env_logger::Env;
use geo::{GeoPoint, Instant};
use log::info;
use settings::Settings;
use solar::{sun_times, SolarPosition, SpaSun};
use terminator::NightEngine;

#[derive(Parser)]
#[command(name = "nightside")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.2.0")]
#[command(about = "Day/night terminator overlay: GeoJSON output and a live terminal map", long_about = None)]
struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the night overlay as a GeoJSON FeatureCollection
    Geojson {
        /// Instant as Unix seconds or RFC 3339 (default: now)
        #[arg(short, long)]
        at: Option<Instant>,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the dark hemisphere and the sampled terminator points
    Sample {
        /// Instant as Unix seconds or RFC 3339 (default: now)
        #[arg(short, long)]
        at: Option<Instant>,
    },

    /// Report day or night at one location
    #[command(allow_negative_numbers = true)]
    Point {
        /// Latitude in degrees, north positive
        #[arg(long)]
        lat: f64,

        /// Longitude in degrees, east positive
        #[arg(long)]
        lon: f64,

        /// Instant as Unix seconds or RFC 3339 (default: now)
        #[arg(short, long)]
        at: Option<Instant>,
    },

    /// Live world map with the night side shaded
    #[command(allow_negative_numbers = true)]
    Watch {
        /// Frame time in seconds
        #[arg(short, long)]
        time: Option<f32>,

        /// Mark the current location, looked up from the public IP
        #[arg(short = 'L', long)]
        locate: bool,

        /// Home latitude
        #[arg(long, requires = "lon")]
        lat: Option<f64>,

        /// Home longitude
        #[arg(long, requires = "lat")]
        lon: Option<f64>,
    },
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn print_geojson(engine: &NightEngine<SpaSun>, at: Instant, pretty: bool) -> Result<()> {
    let snapshot = engine.snapshot(at).context("cannot build night overlay")?;
    info!("Night overlay for {} ({} pole dark)", snapshot.instant(), snapshot.dark_hemisphere());
    println!("{}", snapshot.to_geojson(pretty)?);
    Ok(())
}

fn print_samples(engine: &NightEngine<SpaSun>, at: Instant) -> Result<()> {
    let samples = engine.sample(at).context("cannot sample terminator")?;
    let dark = engine.dark_hemisphere(at)?;
    let sampler = engine.sampler();
    println!("# {} dark hemisphere: {}", at, dark);
    println!(
        "# {} meridians, {}° apart, {} halvings each",
        samples.len(),
        sampler.longitude_step(),
        sampler.iterations()
    );
    println!("# {:>9} {:>9}", "lon", "lat");
    for point in samples {
        println!("{:>11.4} {:>9.4}", point.lon(), point.lat());
    }
    Ok(())
}

fn print_point(engine: &NightEngine<SpaSun>, point: GeoPoint, at: Instant) -> Result<()> {
    let altitude = engine.solar().altitude(at, point)?;
    let snapshot = engine.snapshot(at).context("cannot build night overlay")?;

    println!("Location:    {}", point.format_hud());
    println!("Instant:     {}", at);
    println!("Solar time:  {}", at.local_solar_time(point.lon()).format("%H:%M:%S"));
    println!("Altitude:    {:.3}°", altitude);
    println!("Sun:         {}", if altitude > 0.0 { "day" } else { "night" });
    println!("In overlay:  {}", if snapshot.is_night(point) { "yes" } else { "no" });
    match sun_times(at, point) {
        Some(times) => {
            println!("Sunrise:     {}", times.sunrise);
            println!("Sunset:      {}", times.sunset);
        }
        None => println!("Sunrise/set: unavailable"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let settings = Settings::load();
    let engine_config = settings.engine_config();

    match cli.command {
        Commands::Geojson { at, pretty } => {
            let engine = NightEngine::new(SpaSun, &engine_config)?;
            print_geojson(&engine, at.unwrap_or_else(Instant::now), pretty)?;
        }
        Commands::Sample { at } => {
            let engine = NightEngine::new(SpaSun, &engine_config)?;
            print_samples(&engine, at.unwrap_or_else(Instant::now))?;
        }
        Commands::Point { lat, lon, at } => {
            let engine = NightEngine::new(SpaSun, &engine_config)?;
            let point = GeoPoint::new(lon, lat)?;
            print_point(&engine, point, at.unwrap_or_else(Instant::now))?;
        }
        Commands::Watch {
            time,
            locate,
            lat,
            lon,
        } => {
            let home = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(GeoPoint::new(lon, lat)?),
                _ => settings.home(),
            };
            let defaults = WatchConfig::default();
            let config = WatchConfig {
                engine: engine_config,
                time_step: time
                    .or(settings.watch.frame_time)
                    .unwrap_or(defaults.time_step)
                    .max(0.01),
                home,
                locate,
            };
            watch::run(config)?;
        }
    }

    Ok(())
}
