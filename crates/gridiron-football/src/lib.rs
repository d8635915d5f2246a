// Fantasy football data: provider client, dataset build, league aggregation.

pub mod export;
pub mod league;
pub mod normalize;
pub mod pipeline;
pub mod provider;

pub use league::{load_league, LeagueSummary, SeriesStats, TeamSummary};
pub use pipeline::{build_dataset, BuildError, BuildSummary};
pub use provider::{FantasySession, LeagueSource, PlayerStatsSource, ProviderError};
