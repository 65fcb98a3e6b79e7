use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use bundl_application::prelude::SubscriptionManager;
use bundl_core::{
    coverage::coverage_geohashes,
    entities::{GeoCoordinate, Geohash},
    util::{
        geo::distance,
        geohash::{decode_bounds, encode, neighbors},
    },
};
use clap::{Parser, Subcommand};

use crate::{config::Config, gateways, track};

#[derive(Debug, Parser)]
#[command(name = "bundl", version, about = "Geohash area subscriptions for nearby orders")]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "BUNDL_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Encode a coordinate as geohash
    Encode {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, default_value_t = 7)]
        precision: usize,
    },
    /// Print the center and the bounds of a geohash cell
    Decode { hash: Geohash },
    /// Print the surrounding cells (N, NE, E, SE, S, SW, W, NW)
    Neighbors { hash: Geohash },
    /// Great-circle distance between two `lat,lon` coordinates
    Distance {
        #[arg(allow_hyphen_values = true)]
        from: GeoCoordinate,
        #[arg(allow_hyphen_values = true)]
        to: GeoCoordinate,
    },
    /// All cells within a radius around a coordinate
    Coverage {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Radius in meters
        #[arg(long, default_value_t = 200.0)]
        radius: f64,
        #[arg(long, default_value_t = 7)]
        precision: usize,
    },
    /// Subscribe to the areas around the `lat,lon` locations read from stdin
    Track {
        /// Unsubscribe from all areas when the input ends
        #[arg(long)]
        cleanup_on_exit: bool,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let Cli { config, cmd } = cli;
    match cmd {
        Cmd::Encode {
            lat,
            lon,
            precision,
        } => {
            println!("{}", encode(lat, lon, precision)?);
        }
        Cmd::Decode { hash } => {
            let bounds = decode_bounds(&hash);
            println!("{}", bounds.center());
            println!(
                "lat: {} .. {}, lon: {} .. {}",
                bounds.min_lat, bounds.max_lat, bounds.min_lng, bounds.max_lng
            );
        }
        Cmd::Neighbors { hash } => {
            for neighbor in neighbors(&hash) {
                println!("{neighbor}");
            }
        }
        Cmd::Distance { from, to } => {
            println!("{}", distance(from, to));
        }
        Cmd::Coverage {
            lat,
            lon,
            radius,
            precision,
        } => {
            let center = GeoCoordinate::try_from_lat_lng_deg(lat, lon)?;
            let mut cells: Vec<_> = coverage_geohashes(center, radius, precision)?
                .into_iter()
                .collect();
            cells.sort();
            log::info!("{} cells cover {radius} m around {center}", cells.len());
            for cell in cells {
                println!("{cell}");
            }
        }
        Cmd::Track { cleanup_on_exit } => {
            let cfg = Config::try_load_from_file_or_default(config)?;
            let topic_gw = gateways::topic_gateway(cfg.topics.gateway)?;
            let manager = Arc::new(SubscriptionManager::new(topic_gw, cfg.subscriptions));
            track::run(manager, cleanup_on_exit).await?;
        }
    }
    Ok(())
}
