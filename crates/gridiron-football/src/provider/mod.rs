// Remote data provider: ESPN athlete directory and fantasy league API.

pub mod client;
pub mod models;
pub mod stats_map;

use async_trait::async_trait;
use thiserror::Error;

pub use client::FantasySession;
pub use models::{
    AthleteRecord, BoxScore, LeagueSnapshot, LineupPlayer, PlayerStats, RosterPlayer, Team,
    TeamScore, WeekStats,
};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Failures talking to the provider. A player that cannot be found is not
/// an error; lookups return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Source traits
// ---------------------------------------------------------------------------

/// Everything the dataset build needs from the provider.
#[async_trait]
pub trait PlayerStatsSource: Send + Sync {
    /// The full athlete directory, active and inactive.
    async fn fetch_all_athletes(&self) -> Result<Vec<AthleteRecord>, ProviderError>;

    /// Load whatever the per-player lookups share, once, before any of them
    /// run. An error here aborts the build.
    async fn prepare(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// League-scoped stats for a player by display name. `Ok(None)` when
    /// the name is unknown to the league.
    async fn fetch_player_stats(&self, full_name: &str)
        -> Result<Option<PlayerStats>, ProviderError>;
}

/// Everything the league analysis needs from the provider.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    async fn fetch_league(&self) -> Result<LeagueSnapshot, ProviderError>;

    /// Matchups for one scoring week. Team ids are resolved against
    /// `snapshot`.
    async fn fetch_box_scores(
        &self,
        week: u32,
        snapshot: &LeagueSnapshot,
    ) -> Result<Vec<BoxScore>, ProviderError>;
}
