// Wire models for the ESPN endpoints and the domain records built from them.
//
// Wire structs mirror the JSON exactly and stay private to the provider;
// conversion functions turn them into the records the rest of the crate uses.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value as Json};

use gridiron_core::table::{Table, Value};

use super::stats_map::stat_name;

// ---------------------------------------------------------------------------
// Athlete directory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AthleteDirectory {
    #[serde(default)]
    pub items: Vec<AthleteRecord>,
}

/// One athlete as returned by the directory, every field kept verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AthleteRecord {
    pub fields: Map<String, Json>,
}

impl AthleteRecord {
    pub fn full_name(&self) -> Option<&str> {
        self.fields.get("fullName").and_then(Json::as_str)
    }

    pub fn is_active(&self) -> bool {
        self.fields
            .get("active")
            .and_then(Json::as_bool)
            .unwrap_or(false)
    }
}

/// Flatten athlete records into a table, one column per field in first-seen
/// order. Nested objects are kept as their JSON text.
pub fn athletes_to_table(athletes: &[AthleteRecord]) -> Table {
    let mut table = Table::new(Vec::<String>::new());
    for athlete in athletes {
        let record = athlete
            .fields
            .iter()
            .filter_map(|(key, value)| json_cell(value).map(|cell| (key.as_str(), cell)));
        table.push_record(record);
    }
    table
}

fn json_cell(value: &Json) -> Option<Value> {
    match value {
        Json::Null => None,
        Json::Bool(b) => Some(Value::Text(if *b { "True" } else { "False" }.into())),
        Json::Number(n) => n.as_f64().map(Value::Number),
        Json::String(s) => Some(Value::Text(s.clone())),
        other => Some(Value::Text(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Player statistics
// ---------------------------------------------------------------------------

/// Actual (not projected) stats for one week.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekStats {
    /// The week's fantasy point total.
    pub points: f64,
    /// Stat name -> value. Names the provider does not map stay numeric.
    pub breakdown: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub full_name: String,
    pub position: String,
    /// Keyed by scoring period; week 0 holds season totals.
    pub weeks: BTreeMap<u32, WeekStats>,
}

/// Entry in the season-wide player index used for name lookups.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIndexEntry {
    pub id: i64,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlayerCardResponse {
    #[serde(default)]
    pub players: Vec<PlayerCardEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlayerCardEntry {
    pub player: CardPlayer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CardPlayer {
    pub full_name: String,
    #[serde(default)]
    pub default_position_id: u32,
    #[serde(default)]
    pub stats: Vec<CardStat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CardStat {
    pub scoring_period_id: u32,
    pub stat_source_id: u32,
    #[serde(default)]
    pub applied_total: f64,
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
}

/// Stat source id of actual (as opposed to projected) stats.
const ACTUAL_STATS: u32 = 0;

/// Breakdown key under which each week's point total is repeated.
pub const POINTS_STAT: &str = "pointsScored";

pub fn position_name(position_id: u32) -> String {
    match position_id {
        1 => "QB".into(),
        2 => "RB".into(),
        3 => "WR".into(),
        4 => "TE".into(),
        5 => "K".into(),
        16 => "D/ST".into(),
        other => other.to_string(),
    }
}

impl CardPlayer {
    pub(crate) fn into_player_stats(self) -> PlayerStats {
        let mut weeks = BTreeMap::new();
        for entry in self.stats {
            if entry.stat_source_id != ACTUAL_STATS {
                continue;
            }
            // First actual entry for a period wins.
            if weeks.contains_key(&entry.scoring_period_id) {
                continue;
            }
            let mut breakdown: Vec<(String, f64)> = entry
                .stats
                .iter()
                .map(|(id, value)| (translate_stat(id), *value))
                .collect();
            breakdown.push((POINTS_STAT.to_string(), entry.applied_total));
            weeks.insert(
                entry.scoring_period_id,
                WeekStats {
                    points: entry.applied_total,
                    breakdown,
                },
            );
        }
        PlayerStats {
            full_name: self.full_name,
            position: position_name(self.default_position_id),
            weeks,
        }
    }
}

fn translate_stat(id: &str) -> String {
    id.parse::<u32>()
        .ok()
        .and_then(stat_name)
        .map_or_else(|| id.to_string(), str::to_string)
}

// ---------------------------------------------------------------------------
// League snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RosterPlayer {
    pub name: String,
    /// Position rank for the season; absent when the provider has no rating.
    pub pos_rank: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: u32,
    pub abbrev: String,
    pub name: String,
    pub roster: Vec<RosterPlayer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeagueSnapshot {
    pub current_week: u32,
    pub teams: Vec<Team>,
}

impl LeagueSnapshot {
    pub fn team(&self, id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeagueResponse {
    pub status: LeagueStatus,
    #[serde(default)]
    pub teams: Vec<TeamWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeagueStatus {
    pub current_matchup_period: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TeamWire {
    pub id: u32,
    #[serde(default)]
    pub abbrev: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub roster: Option<RosterWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RosterWire {
    #[serde(default)]
    pub entries: Vec<RosterEntryWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RosterEntryWire {
    #[serde(default)]
    pub lineup_slot_id: u32,
    pub player_pool_entry: PoolEntryWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PoolEntryWire {
    pub player: PoolPlayerWire,
    #[serde(default)]
    pub applied_stat_total: f64,
    #[serde(default)]
    pub ratings: BTreeMap<String, RatingWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PoolPlayerWire {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RatingWire {
    #[serde(default)]
    pub positional_ranking: Option<f64>,
}

impl TeamWire {
    fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match (&self.location, &self.nickname) {
            (Some(l), Some(n)) => format!("{l} {n}"),
            (Some(l), None) => l.clone(),
            (None, Some(n)) => n.clone(),
            (None, None) => self.abbrev.clone(),
        }
    }
}

impl LeagueResponse {
    pub(crate) fn into_snapshot(self) -> LeagueSnapshot {
        let teams = self
            .teams
            .into_iter()
            .map(|team| {
                let name = team.display_name();
                let roster = team
                    .roster
                    .map(|r| {
                        r.entries
                            .into_iter()
                            .map(|entry| RosterPlayer {
                                pos_rank: entry
                                    .player_pool_entry
                                    .ratings
                                    .get("0")
                                    .and_then(|r| r.positional_ranking),
                                name: entry.player_pool_entry.player.full_name,
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Team {
                    id: team.id,
                    abbrev: team.abbrev,
                    name,
                    roster,
                }
            })
            .collect();
        LeagueSnapshot {
            current_week: self.status.current_matchup_period,
            teams,
        }
    }
}

// ---------------------------------------------------------------------------
// Box scores
// ---------------------------------------------------------------------------

/// Lineup slot ids that do not count toward the starting lineup.
pub const BENCH_SLOT: u32 = 20;
pub const INJURED_RESERVE_SLOT: u32 = 21;

pub fn slot_name(slot_id: u32) -> String {
    match slot_id {
        0 => "QB".into(),
        2 => "RB".into(),
        4 => "WR".into(),
        6 => "TE".into(),
        16 => "D/ST".into(),
        17 => "K".into(),
        BENCH_SLOT => "BE".into(),
        INJURED_RESERVE_SLOT => "IR".into(),
        23 => "FLEX".into(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineupPlayer {
    pub name: String,
    pub slot: String,
    pub points: f64,
}

impl LineupPlayer {
    pub fn is_starter(&self) -> bool {
        self.slot != "BE" && self.slot != "IR"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamScore {
    pub team_abbrev: String,
    pub score: f64,
    pub lineup: Vec<LineupPlayer>,
}

/// One matchup. The away side is absent on bye weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxScore {
    pub week: u32,
    pub home: TeamScore,
    pub away: Option<TeamScore>,
}

impl BoxScore {
    pub fn sides(&self) -> impl Iterator<Item = &TeamScore> {
        std::iter::once(&self.home).chain(self.away.as_ref())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleResponse {
    #[serde(default)]
    pub schedule: Vec<MatchupWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchupWire {
    #[serde(default)]
    pub matchup_period_id: Option<u32>,
    pub home: MatchupSideWire,
    #[serde(default)]
    pub away: Option<MatchupSideWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchupSideWire {
    pub team_id: u32,
    #[serde(default)]
    pub total_points: f64,
    #[serde(default)]
    pub roster_for_current_scoring_period: Option<RosterWire>,
}

impl MatchupSideWire {
    fn into_team_score(self, snapshot: &LeagueSnapshot) -> TeamScore {
        let team_abbrev = snapshot
            .team(self.team_id)
            .map_or_else(|| self.team_id.to_string(), |t| t.abbrev.clone());
        let lineup = self
            .roster_for_current_scoring_period
            .map(|r| {
                r.entries
                    .into_iter()
                    .map(|entry| LineupPlayer {
                        slot: slot_name(entry.lineup_slot_id),
                        points: entry.player_pool_entry.applied_stat_total,
                        name: entry.player_pool_entry.player.full_name,
                    })
                    .collect()
            })
            .unwrap_or_default();
        TeamScore {
            team_abbrev,
            score: self.total_points,
            lineup,
        }
    }
}

impl ScheduleResponse {
    /// Matchups for `week`, with team ids resolved to abbreviations.
    pub(crate) fn into_box_scores(self, week: u32, snapshot: &LeagueSnapshot) -> Vec<BoxScore> {
        self.schedule
            .into_iter()
            .filter(|m| m.matchup_period_id.map_or(true, |p| p == week))
            .map(|m| BoxScore {
                week,
                home: m.home.into_team_score(snapshot),
                away: m.away.map(|a| a.into_team_score(snapshot)),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn athlete_accessors() {
        let a: AthleteRecord =
            serde_json::from_value(json!({"id": "1", "fullName": "Ada Runner", "active": true}))
                .unwrap();
        assert_eq!(a.full_name(), Some("Ada Runner"));
        assert!(a.is_active());

        let b: AthleteRecord = serde_json::from_value(json!({"id": "2"})).unwrap();
        assert_eq!(b.full_name(), None);
        assert!(!b.is_active());
    }

    #[test]
    fn athletes_flatten_to_table() {
        let athletes: Vec<AthleteRecord> = serde_json::from_value(json!([
            {"id": "1", "fullName": "Ada", "active": true, "weight": 210.0},
            {"id": "2", "fullName": "Bo", "active": true, "birthPlace": {"city": "Akron"}, "hand": null}
        ]))
        .unwrap();
        let t = athletes_to_table(&athletes);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.get(0, "active"), Some(&Value::from("True")));
        assert_eq!(t.get(0, "weight"), Some(&Value::Number(210.0)));
        assert_eq!(t.get(1, "weight"), None);
        assert_eq!(
            t.get(1, "birthPlace"),
            Some(&Value::from(r#"{"city":"Akron"}"#))
        );
        assert!(t.column_index("hand").is_none());
    }

    #[test]
    fn card_keeps_actual_stats_and_adds_points() {
        let player: CardPlayer = serde_json::from_value(json!({
            "fullName": "Ada Runner",
            "defaultPositionId": 2,
            "stats": [
                {"scoringPeriodId": 1, "statSourceId": 0, "appliedTotal": 12.5,
                 "stats": {"23": 15.0, "24": 80.0, "999": 1.0}},
                {"scoringPeriodId": 1, "statSourceId": 1, "appliedTotal": 9.0,
                 "stats": {"24": 60.0}},
                {"scoringPeriodId": 2, "statSourceId": 0, "appliedTotal": 3.0}
            ]
        }))
        .unwrap();
        let stats = player.into_player_stats();
        assert_eq!(stats.position, "RB");
        assert_eq!(stats.weeks.len(), 2);

        let week1 = &stats.weeks[&1];
        assert!((week1.points - 12.5).abs() < f64::EPSILON);
        let names: Vec<&str> = week1.breakdown.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["rushingAttempts", "rushingYards", "999", "pointsScored"]);

        let week2 = &stats.weeks[&2];
        assert_eq!(week2.breakdown, vec![("pointsScored".to_string(), 3.0)]);
    }

    #[test]
    fn position_and_slot_names() {
        assert_eq!(position_name(1), "QB");
        assert_eq!(position_name(16), "D/ST");
        assert_eq!(position_name(7), "7");
        assert_eq!(slot_name(20), "BE");
        assert_eq!(slot_name(21), "IR");
        assert_eq!(slot_name(23), "FLEX");
    }

    #[test]
    fn starters_exclude_bench_and_ir() {
        let p = |slot: &str| LineupPlayer {
            name: "x".into(),
            slot: slot.into(),
            points: 0.0,
        };
        assert!(p("RB").is_starter());
        assert!(p("FLEX").is_starter());
        assert!(!p("BE").is_starter());
        assert!(!p("IR").is_starter());
    }
}
