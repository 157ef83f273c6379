//! Coin roster
//!
//! The roster is produced out-of-band by the market-data ingestion script and
//! read once at startup. Records are forgiving: a malformed field falls back
//! to a safe default instead of rejecting the whole feed.

use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::sim::ArchetypeKind;

/// Sample feed bundled with the crate, used when no feed file is available
pub const BUNDLED_FEED: &str = include_str!("../data/memecoins.json");

/// Logo handle used when a record carries none
pub const DEFAULT_LOGO: &str = "default";

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster feed {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("roster feed is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("roster feed must be a JSON array of coin records")]
    NotAnArray,
    #[error("roster feed contains no usable coins")]
    Empty,
}

/// Fall speed derived from a percent change
#[inline]
pub fn fall_speed_for(percent_change: f32) -> f32 {
    (percent_change.abs() / 5.0).min(10.0)
}

/// Visual scale derived from a percent change
#[inline]
pub fn size_for(percent_change: f32) -> f32 {
    (percent_change.abs() / 10.0 + 0.5).min(3.0)
}

/// Damage stat derived from a percent change
#[inline]
pub fn damage_for(percent_change: f32) -> f32 {
    (percent_change.abs() / 5.0).min(20.0)
}

/// A tradable entity. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coin {
    pub id: u64,
    pub name: String,
    pub symbol: String,
    pub slug: String,
    /// Signed 24h percent change, the source of every derived stat
    pub percent_change: f32,
    /// Opaque texture handle for the render collaborator
    pub logo: String,
    pub price: f64,
    pub market_cap: f64,
    pub rank: Option<u32>,
    pub fall_speed: f32,
    pub size: f32,
    pub damage: f32,
}

impl Coin {
    pub fn new(id: u64, name: &str, symbol: &str, percent_change: f32) -> Self {
        let percent_change = if percent_change.is_finite() {
            percent_change
        } else {
            0.0
        };
        Self {
            id,
            name: name.to_string(),
            symbol: symbol.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            percent_change,
            logo: DEFAULT_LOGO.to_string(),
            price: 0.0,
            market_cap: 0.0,
            rank: None,
            fall_speed: fall_speed_for(percent_change),
            size: size_for(percent_change),
            damage: damage_for(percent_change),
        }
    }

    /// Build a coin from one feed record. Missing or non-numeric fields become
    /// defaults; derived stats are recomputed rather than trusted.
    pub fn from_record(index: usize, record: &Value) -> Self {
        let percent_change = number_field(record, &["percentChange24h", "percentChange"]) as f32;
        let id = record
            .get("id")
            .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or(index as u64);
        let symbol = string_field(record, "symbol").unwrap_or_else(|| format!("COIN{index}"));
        let name = string_field(record, "name").unwrap_or_else(|| symbol.clone());

        let mut coin = Coin::new(id, &name, &symbol, percent_change);
        if let Some(slug) = string_field(record, "slug") {
            coin.slug = slug;
        }
        if let Some(logo) =
            string_field(record, "logo").or_else(|| string_field(record, "logoRef"))
        {
            coin.logo = logo;
        }
        coin.price = number_field(record, &["price"]);
        coin.market_cap = number_field(record, &["marketCap"]);
        coin.rank = record
            .get("rank")
            .and_then(Value::as_u64)
            .and_then(|r| u32::try_from(r).ok());
        coin
    }

    /// Label shown next to a projectile, e.g. `BONK: -47.21% (HOMING)`
    pub fn label(&self, kind: ArchetypeKind) -> String {
        let suffix = match kind {
            ArchetypeKind::Homing => " (HOMING)",
            ArchetypeKind::Cluster => " (CLUSTER)",
            ArchetypeKind::Regular | ArchetypeKind::Fragment => "",
        };
        format!("{}: {:.2}%{}", self.symbol, self.percent_change, suffix)
    }
}

/// Read a numeric field that may be encoded as a number or a numeric string.
/// Anything else reads as zero.
fn number_field(record: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn string_field(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Ordered, read-only list of coins (most negative change first)
#[derive(Debug, Clone, Default, Serialize)]
pub struct Roster {
    coins: Vec<Coin>,
}

impl Roster {
    /// Build a roster, dropping gaining coins and ordering by ascending change
    pub fn from_coins(coins: Vec<Coin>) -> Self {
        let total = coins.len();
        let mut coins: Vec<Coin> = coins.into_iter().filter(|c| c.percent_change <= 0.0).collect();
        if coins.len() < total {
            log::warn!(
                "Dropped {} roster entries with a positive change",
                total - coins.len()
            );
        }
        coins.sort_by(|a, b| a.percent_change.total_cmp(&b.percent_change));
        Self { coins }
    }

    /// Parse a feed document (JSON array of records)
    pub fn from_json_str(json: &str) -> Result<Self, RosterError> {
        let doc: Value = serde_json::from_str(json)?;
        let records = doc.as_array().ok_or(RosterError::NotAnArray)?;

        let coins = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                if !record.is_object() {
                    log::warn!("Roster record {i} is not an object, using defaults");
                }
                Coin::from_record(i, record)
            })
            .collect();

        let roster = Self::from_coins(coins);
        if roster.is_empty() {
            return Err(RosterError::Empty);
        }
        Ok(roster)
    }

    /// Load a feed file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let roster = Self::from_json_str(&json)?;
        log::info!("Loaded {} coins from {}", roster.len(), path.display());
        Ok(roster)
    }

    /// Load a feed file, falling back to the bundled feed on any failure
    pub fn load_or_bundled(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(roster) => roster,
            Err(e) => {
                log::warn!("{e}; using bundled roster");
                Self::bundled()
            }
        }
    }

    /// The feed compiled into the binary
    pub fn bundled() -> Self {
        match Self::from_json_str(BUNDLED_FEED) {
            Ok(roster) => roster,
            Err(e) => {
                log::error!("Bundled roster is unusable: {e}");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Coin> {
        self.coins.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter()
    }

    /// Pick a coin uniformly at random
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(usize, &Coin)> {
        if self.coins.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.coins.len());
        Some((index, &self.coins[index]))
    }
}
