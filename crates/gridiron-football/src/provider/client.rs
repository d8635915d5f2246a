// HTTP client for the ESPN endpoints.
//
// One `FantasySession` is created per run and shared by reference. It holds
// the league identity, the opaque credential cookies, a pooled reqwest client
// and the player-name index, loaded by `prepare` before any lookup.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use gridiron_core::config::{CredentialsConfig, LeagueConfig, ProviderConfig};

use super::models::{
    AthleteDirectory, AthleteRecord, BoxScore, LeagueResponse, LeagueSnapshot, PlayerCardResponse,
    PlayerIndexEntry, PlayerStats, ScheduleResponse,
};
use super::{LeagueSource, PlayerStatsSource, ProviderError};

const FILTER_HEADER: &str = "x-fantasy-filter";

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

pub fn parse_athletes(body: &str) -> Result<Vec<AthleteRecord>, serde_json::Error> {
    let directory: AthleteDirectory = serde_json::from_str(body)?;
    Ok(directory.items)
}

pub fn parse_player_index(body: &str) -> Result<Vec<PlayerIndexEntry>, serde_json::Error> {
    serde_json::from_str(body)
}

/// Stats from a player card response; `None` when the card is empty.
pub fn parse_player_card(body: &str) -> Result<Option<PlayerStats>, serde_json::Error> {
    let response: PlayerCardResponse = serde_json::from_str(body)?;
    Ok(first_card_stats(response))
}

fn first_card_stats(response: PlayerCardResponse) -> Option<PlayerStats> {
    response
        .players
        .into_iter()
        .next()
        .map(|entry| entry.player.into_player_stats())
}

pub fn parse_league(body: &str) -> Result<LeagueSnapshot, serde_json::Error> {
    let response: LeagueResponse = serde_json::from_str(body)?;
    Ok(response.into_snapshot())
}

pub fn parse_box_scores(
    body: &str,
    week: u32,
    snapshot: &LeagueSnapshot,
) -> Result<Vec<BoxScore>, serde_json::Error> {
    let response: ScheduleResponse = serde_json::from_str(body)?;
    Ok(response.into_box_scores(week, snapshot))
}

// ---------------------------------------------------------------------------
// FantasySession
// ---------------------------------------------------------------------------

pub struct FantasySession {
    http: reqwest::Client,
    athletes_url: String,
    fantasy_base_url: String,
    league_id: u64,
    year: u16,
    cookie: Option<String>,
    player_index: OnceCell<HashMap<String, i64>>,
}

impl FantasySession {
    pub fn new(
        league: &LeagueConfig,
        provider: &ProviderConfig,
        credentials: &CredentialsConfig,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            athletes_url: provider.athletes_url.clone(),
            fantasy_base_url: provider.fantasy_base_url.trim_end_matches('/').to_string(),
            league_id: league.league_id,
            year: league.year,
            cookie: cookie_header(credentials),
            player_index: OnceCell::new(),
        }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn league_id(&self) -> u64 {
        self.league_id
    }

    /// Base URL for league-scoped views.
    pub fn league_url(&self) -> String {
        format!(
            "{}/seasons/{}/segments/0/leagues/{}",
            self.fantasy_base_url, self.year, self.league_id
        )
    }

    fn players_url(&self) -> String {
        format!("{}/seasons/{}/players", self.fantasy_base_url, self.year)
    }

    /// GET `url` and decode the body as JSON. Non-success statuses and
    /// undecodable bodies are errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        filter: Option<serde_json::Value>,
    ) -> Result<T, ProviderError> {
        let mut request = self.http.get(url).query(query);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(filter) = filter {
            request = request.header(FILTER_HEADER, filter.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| ProviderError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Name -> player id, loaded once and reused for the session.
    async fn player_index(&self) -> Result<&HashMap<String, i64>, ProviderError> {
        self.player_index
            .get_or_try_init(|| async {
                let entries: Vec<PlayerIndexEntry> = self
                    .get_json(
                        &self.players_url(),
                        &[
                            ("scoringPeriodId", "0".to_string()),
                            ("view", "players_wl".to_string()),
                        ],
                        Some(serde_json::json!({"filterActive": {"value": true}})),
                    )
                    .await?;
                info!(players = entries.len(), "player index loaded");
                Ok::<_, ProviderError>(
                    entries
                        .into_iter()
                        .map(|e| (e.full_name, e.id))
                        .collect(),
                )
            })
            .await
    }

    fn player_card_filter(&self, player_id: i64) -> serde_json::Value {
        serde_json::json!({
            "players": {
                "filterIds": {"value": [player_id]},
                "filterStatsForTopScoringPeriodIds": {
                    "value": 17,
                    "additionalValue": [format!("00{}", self.year), format!("10{}", self.year)]
                }
            }
        })
    }
}

/// `Cookie` header value for whichever credentials are present.
pub fn cookie_header(credentials: &CredentialsConfig) -> Option<String> {
    let parts: Vec<String> = [
        ("espn_s2", credentials.espn_s2.as_deref()),
        ("SWID", credentials.swid.as_deref()),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| format!("{name}={v}")))
    .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

#[async_trait]
impl PlayerStatsSource for FantasySession {
    async fn fetch_all_athletes(&self) -> Result<Vec<AthleteRecord>, ProviderError> {
        let directory: AthleteDirectory = self.get_json(&self.athletes_url, &[], None).await?;
        info!(athletes = directory.items.len(), "athlete directory fetched");
        Ok(directory.items)
    }

    async fn prepare(&self) -> Result<(), ProviderError> {
        self.player_index().await.map(|_| ())
    }

    async fn fetch_player_stats(
        &self,
        full_name: &str,
    ) -> Result<Option<PlayerStats>, ProviderError> {
        let Some(&player_id) = self.player_index().await?.get(full_name) else {
            debug!(player = full_name, "not in league player index");
            return Ok(None);
        };
        let response: PlayerCardResponse = self
            .get_json(
                &self.league_url(),
                &[("view", "kona_playercard".to_string())],
                Some(self.player_card_filter(player_id)),
            )
            .await?;
        Ok(first_card_stats(response))
    }
}

#[async_trait]
impl LeagueSource for FantasySession {
    async fn fetch_league(&self) -> Result<LeagueSnapshot, ProviderError> {
        let response: LeagueResponse = self
            .get_json(
                &self.league_url(),
                &[
                    ("view", "mTeam".to_string()),
                    ("view", "mRoster".to_string()),
                    ("view", "mSettings".to_string()),
                ],
                None,
            )
            .await?;
        let snapshot = response.into_snapshot();
        info!(
            teams = snapshot.teams.len(),
            current_week = snapshot.current_week,
            "league snapshot fetched"
        );
        Ok(snapshot)
    }

    async fn fetch_box_scores(
        &self,
        week: u32,
        snapshot: &LeagueSnapshot,
    ) -> Result<Vec<BoxScore>, ProviderError> {
        let response: ScheduleResponse = self
            .get_json(
                &self.league_url(),
                &[
                    ("view", "mMatchupScore".to_string()),
                    ("view", "mScoreboard".to_string()),
                    ("scoringPeriodId", week.to_string()),
                ],
                Some(serde_json::json!({
                    "schedule": {"filterMatchupPeriodIds": {"value": [week]}}
                })),
            )
            .await?;
        let scores = response.into_box_scores(week, snapshot);
        debug!(week, matchups = scores.len(), "box scores fetched");
        Ok(scores)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn session(credentials: CredentialsConfig) -> FantasySession {
        FantasySession::new(
            &LeagueConfig {
                league_id: 1341300474,
                year: 2023,
            },
            &ProviderConfig {
                athletes_url: "https://example.test/athletes".into(),
                fantasy_base_url: "https://example.test/apis/v3/games/ffl/".into(),
                concurrency: 4,
            },
            &credentials,
        )
    }

    #[test]
    fn league_url_is_season_scoped() {
        let s = session(CredentialsConfig::default());
        assert_eq!(
            s.league_url(),
            "https://example.test/apis/v3/games/ffl/seasons/2023/segments/0/leagues/1341300474"
        );
        assert_eq!(
            s.players_url(),
            "https://example.test/apis/v3/games/ffl/seasons/2023/players"
        );
    }

    #[test]
    fn cookie_header_uses_present_credentials() {
        assert_eq!(cookie_header(&CredentialsConfig::default()), None);
        let both = CredentialsConfig {
            espn_s2: Some("abc".into()),
            swid: Some("{GUID}".into()),
        };
        assert_eq!(cookie_header(&both).as_deref(), Some("espn_s2=abc; SWID={GUID}"));
        let swid_only = CredentialsConfig {
            espn_s2: None,
            swid: Some("{GUID}".into()),
        };
        assert_eq!(cookie_header(&swid_only).as_deref(), Some("SWID={GUID}"));
    }

    #[test]
    fn player_card_filter_selects_player_and_season() {
        let s = session(CredentialsConfig::default());
        let filter = s.player_card_filter(42);
        assert_eq!(filter["players"]["filterIds"]["value"][0], 42);
        assert_eq!(
            filter["players"]["filterStatsForTopScoringPeriodIds"]["additionalValue"][0],
            "002023"
        );
    }

    #[test]
    fn empty_player_card_is_absent() {
        assert_eq!(parse_player_card(r#"{"players": []}"#).unwrap(), None);
        assert!(parse_player_card("not json").is_err());
    }
}
