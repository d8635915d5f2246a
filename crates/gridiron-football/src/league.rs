// League statistics aggregator.
//
// Builds per-team score histories and position-rank summaries from one
// league snapshot plus the box scores of every week up to the current one.

use std::fmt::Write as _;

use tracing::{debug, info};

use crate::provider::{BoxScore, LeagueSnapshot, LeagueSource, LineupPlayer, ProviderError, Team};

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Mean and population standard deviation of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub mean: f64,
    pub stdev: f64,
}

/// `None` for an empty series.
pub fn compute_series_stats(values: &[f64]) -> Option<SeriesStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(SeriesStats {
        mean,
        stdev: variance.sqrt(),
    })
}

/// Drop the final (in-progress) element of a week-ordered score list.
pub fn completed_scores(mut scores: Vec<f64>) -> Vec<f64> {
    scores.pop();
    scores
}

// ---------------------------------------------------------------------------
// Per-team summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary {
    pub abbrev: String,
    /// Completed weeks only, in week order.
    pub scores: Vec<f64>,
    pub score_stats: Option<SeriesStats>,
    pub starters: Vec<LineupPlayer>,
    pub lineup: Vec<LineupPlayer>,
    /// Position ranks of roster players found in the starting lineup.
    pub starter_ranks: Vec<f64>,
    /// Position ranks of roster players found anywhere in the lineup.
    pub team_ranks: Vec<f64>,
    pub starter_rank_stats: Option<SeriesStats>,
    pub team_rank_stats: Option<SeriesStats>,
}

/// Position ranks of `roster` players whose name appears in `lineup`.
pub fn matched_ranks(team: &Team, lineup: &[LineupPlayer]) -> Vec<f64> {
    let mut ranks = Vec::new();
    for player in &team.roster {
        for slot in lineup {
            if player.name == slot.name {
                if let Some(rank) = player.pos_rank {
                    ranks.push(rank);
                }
            }
        }
    }
    ranks
}

// ---------------------------------------------------------------------------
// League summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LeagueSummary {
    pub current_week: u32,
    /// Week whose lineups feed the position-rank statistics.
    pub lineup_week: Option<u32>,
    pub snapshot: LeagueSnapshot,
    /// Box scores per fetched week, week 1 first.
    pub box_scores: Vec<Vec<BoxScore>>,
    pub teams: Vec<TeamSummary>,
}

impl LeagueSummary {
    pub fn build(snapshot: LeagueSnapshot, box_scores: Vec<Vec<BoxScore>>) -> Self {
        // The last fetched week is still in progress once a completed week
        // exists before it.
        let lineup_index = match box_scores.len() {
            0 => None,
            1 => Some(0),
            n => Some(n - 2),
        };
        let lineup_week = lineup_index.map(|i| i as u32 + 1);

        let teams = snapshot
            .teams
            .iter()
            .map(|team| {
                let history: Vec<f64> = box_scores
                    .iter()
                    .flatten()
                    .flat_map(BoxScore::sides)
                    .filter(|side| side.team_abbrev == team.abbrev)
                    .map(|side| side.score)
                    .collect();
                let scores = completed_scores(history);

                let lineup: Vec<LineupPlayer> = lineup_index
                    .and_then(|i| box_scores.get(i))
                    .into_iter()
                    .flatten()
                    .flat_map(BoxScore::sides)
                    .filter(|side| side.team_abbrev == team.abbrev)
                    .flat_map(|side| side.lineup.iter().cloned())
                    .collect();
                let starters: Vec<LineupPlayer> =
                    lineup.iter().filter(|p| p.is_starter()).cloned().collect();

                let starter_ranks = matched_ranks(team, &starters);
                let team_ranks = matched_ranks(team, &lineup);

                TeamSummary {
                    abbrev: team.abbrev.clone(),
                    score_stats: compute_series_stats(&scores),
                    scores,
                    starter_rank_stats: compute_series_stats(&starter_ranks),
                    team_rank_stats: compute_series_stats(&team_ranks),
                    starters,
                    lineup,
                    starter_ranks,
                    team_ranks,
                }
            })
            .collect();

        LeagueSummary {
            current_week: snapshot.current_week,
            lineup_week,
            snapshot,
            box_scores,
            teams,
        }
    }

    pub fn team(&self, abbrev: &str) -> Option<&TeamSummary> {
        self.teams.iter().find(|t| t.abbrev == abbrev)
    }

    /// Plain-text dump of rosters, box scores, lineups and every aggregate.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Rosters:");
        for team in &self.snapshot.teams {
            let _ = writeln!(out, "{}", team.abbrev);
            for player in &team.roster {
                match player.pos_rank {
                    Some(rank) => {
                        let _ = writeln!(out, "  {} (rank {rank})", player.name);
                    }
                    None => {
                        let _ = writeln!(out, "  {}", player.name);
                    }
                }
            }
        }

        let _ = writeln!(out, "\nBoxscores:");
        for week in &self.box_scores {
            for score in week {
                let _ = write!(
                    out,
                    "Week {}: {} {:.2}",
                    score.week, score.home.team_abbrev, score.home.score
                );
                match &score.away {
                    Some(away) => {
                        let _ = writeln!(out, " vs {} {:.2}", away.team_abbrev, away.score);
                    }
                    None => {
                        let _ = writeln!(out, " (bye)");
                    }
                }
            }
        }

        let lineup_week = self
            .lineup_week
            .map_or_else(|| "none".to_string(), |w| w.to_string());
        let _ = writeln!(out, "\nStarting Lineups (week {lineup_week}):");
        for team in &self.teams {
            let _ = writeln!(out, "{}", team.abbrev);
            for player in &team.starters {
                let _ = writeln!(out, "  {:<5} {}", player.slot, player.name);
            }
        }

        let sections: [(&str, fn(&TeamSummary) -> String); 5] = [
            ("Average Position Ranks (starters)", |t| {
                fmt_mean(t.starter_rank_stats)
            }),
            ("Average Position Ranks (entire team)", |t| {
                fmt_mean(t.team_rank_stats)
            }),
            ("Position Ranks Standard Deviation", |t| {
                fmt_stdev(t.starter_rank_stats)
            }),
            ("Average Scores", |t| fmt_mean(t.score_stats)),
            ("Score Standard Deviation", |t| fmt_stdev(t.score_stats)),
        ];
        for (title, value) in sections {
            let _ = writeln!(out, "\n{title}:");
            for team in &self.teams {
                let _ = writeln!(out, "{} {}", team.abbrev, value(team));
            }
        }

        let _ = writeln!(out, "\nScores:");
        for team in &self.teams {
            let scores: Vec<String> = team.scores.iter().map(|s| format!("{s:.2}")).collect();
            let _ = writeln!(
                out,
                "{} [{}] mean {}",
                team.abbrev,
                scores.join(", "),
                fmt_mean(team.score_stats)
            );
        }
        out
    }
}

fn fmt_mean(stats: Option<SeriesStats>) -> String {
    stats.map_or_else(|| "n/a".to_string(), |s| format!("{:.2}", s.mean))
}

fn fmt_stdev(stats: Option<SeriesStats>) -> String {
    stats.map_or_else(|| "n/a".to_string(), |s| format!("{:.2}", s.stdev))
}

/// Fetch the snapshot and every week's box scores up to the current week,
/// then aggregate.
pub async fn load_league<S>(source: &S) -> Result<LeagueSummary, ProviderError>
where
    S: LeagueSource + ?Sized,
{
    let snapshot = source.fetch_league().await?;
    let mut box_scores = Vec::with_capacity(snapshot.current_week as usize);
    for week in 1..=snapshot.current_week {
        let scores = source.fetch_box_scores(week, &snapshot).await?;
        debug!(week, matchups = scores.len(), "week loaded");
        box_scores.push(scores);
    }
    let summary = LeagueSummary::build(snapshot, box_scores);
    info!(
        teams = summary.teams.len(),
        current_week = summary.current_week,
        "league summary built"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{RosterPlayer, TeamScore};

    fn lineup(players: &[(&str, &str)]) -> Vec<LineupPlayer> {
        players
            .iter()
            .map(|(name, slot)| LineupPlayer {
                name: name.to_string(),
                slot: slot.to_string(),
                points: 0.0,
            })
            .collect()
    }

    fn team(id: u32, abbrev: &str, roster: &[(&str, f64)]) -> Team {
        Team {
            id,
            abbrev: abbrev.into(),
            name: abbrev.into(),
            roster: roster
                .iter()
                .map(|(name, rank)| RosterPlayer {
                    name: name.to_string(),
                    pos_rank: Some(*rank),
                })
                .collect(),
        }
    }

    fn matchup(
        week: u32,
        home: (&str, f64),
        away: (&str, f64),
        lineups: [Vec<LineupPlayer>; 2],
    ) -> BoxScore {
        let [home_lineup, away_lineup] = lineups;
        BoxScore {
            week,
            home: TeamScore {
                team_abbrev: home.0.into(),
                score: home.1,
                lineup: home_lineup,
            },
            away: Some(TeamScore {
                team_abbrev: away.0.into(),
                score: away.1,
                lineup: away_lineup,
            }),
        }
    }

    fn league() -> LeagueSummary {
        let snapshot = LeagueSnapshot {
            current_week: 3,
            teams: vec![
                team(1, "AAA", &[("Ada", 2.0), ("Bo", 10.0), ("Cy", 30.0)]),
                team(2, "BBB", &[("Di", 5.0), ("Ed", 15.0)]),
            ],
        };
        let week_lineups = || {
            [
                lineup(&[("Ada", "RB"), ("Bo", "WR"), ("Cy", "BE")]),
                lineup(&[("Di", "QB"), ("Ed", "IR")]),
            ]
        };
        let box_scores = vec![
            vec![matchup(1, ("AAA", 10.0), ("BBB", 90.0), week_lineups())],
            vec![matchup(2, ("AAA", 20.0), ("BBB", 100.0), week_lineups())],
            vec![matchup(3, ("AAA", 30.0), ("BBB", 5.0), week_lineups())],
        ];
        LeagueSummary::build(snapshot, box_scores)
    }

    // -- statistics --

    #[test]
    fn series_stats_population() {
        let s = compute_series_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.stdev - 2.0).abs() < 1e-12);
        assert_eq!(compute_series_stats(&[]), None);
    }

    #[test]
    fn in_progress_week_is_dropped() {
        assert_eq!(completed_scores(vec![10.0, 20.0, 30.0]), vec![10.0, 20.0]);
        assert!(completed_scores(vec![]).is_empty());
    }

    // -- aggregation --

    #[test]
    fn score_history_excludes_current_week() {
        let summary = league();
        let aaa = summary.team("AAA").unwrap();
        assert_eq!(aaa.scores, vec![10.0, 20.0]);
        let stats = aaa.score_stats.unwrap();
        assert!((stats.mean - 15.0).abs() < 1e-12);
        assert!((stats.stdev - 5.0).abs() < 1e-12);
        assert_eq!(summary.team("BBB").unwrap().scores, vec![90.0, 100.0]);
    }

    #[test]
    fn lineups_come_from_last_completed_week() {
        let summary = league();
        assert_eq!(summary.lineup_week, Some(2));
        let aaa = summary.team("AAA").unwrap();
        assert_eq!(aaa.lineup.len(), 3);
        let starters: Vec<&str> = aaa.starters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(starters, ["Ada", "Bo"]);
    }

    #[test]
    fn position_ranks_split_starters_and_team() {
        let summary = league();
        let aaa = summary.team("AAA").unwrap();
        assert_eq!(aaa.starter_ranks, vec![2.0, 10.0]);
        assert_eq!(aaa.team_ranks, vec![2.0, 10.0, 30.0]);
        assert!((aaa.starter_rank_stats.unwrap().mean - 6.0).abs() < 1e-12);
        assert!((aaa.team_rank_stats.unwrap().mean - 14.0).abs() < 1e-12);

        let bbb = summary.team("BBB").unwrap();
        assert_eq!(bbb.starter_ranks, vec![5.0]);
        assert!((bbb.starter_rank_stats.unwrap().stdev).abs() < 1e-12);
    }

    #[test]
    fn single_week_uses_that_week_and_has_no_scores() {
        let snapshot = LeagueSnapshot {
            current_week: 1,
            teams: vec![team(1, "AAA", &[("Ada", 1.0)])],
        };
        let box_scores = vec![vec![BoxScore {
            week: 1,
            home: TeamScore {
                team_abbrev: "AAA".into(),
                score: 50.0,
                lineup: lineup(&[("Ada", "RB")]),
            },
            away: None,
        }]];
        let summary = LeagueSummary::build(snapshot, box_scores);
        let aaa = summary.team("AAA").unwrap();
        assert!(aaa.scores.is_empty());
        assert_eq!(aaa.score_stats, None);
        assert_eq!(aaa.starter_ranks, vec![1.0]);
    }

    #[test]
    fn debug_dump_has_every_section() {
        let dump = league().debug_dump();
        for section in [
            "Rosters:",
            "Boxscores:",
            "Starting Lineups (week 2):",
            "Average Position Ranks (starters):",
            "Average Position Ranks (entire team):",
            "Position Ranks Standard Deviation:",
            "Average Scores:",
            "Score Standard Deviation:",
        ] {
            assert!(dump.contains(section), "missing {section}");
        }
        assert!(dump.contains("AAA 15.00"));
        assert!(dump.contains("Week 3: AAA 30.00 vs BBB 5.00"));
    }
}
