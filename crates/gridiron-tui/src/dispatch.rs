// Command dispatch: menu action -> league query -> figure.

use tracing::info;

use gridiron_football::{LeagueSummary, SeriesStats, TeamSummary};

use crate::figure::{BoxStats, Figure, ScatterPoint, Series};

/// A menu entry of the analysis session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StarterRanks,
    TeamRanks,
    RankStdev,
    ScoreBoxPlot,
    ScoresWithMean,
    ScoreStdev,
    PlotAll,
    /// Score history of one team, by abbreviation.
    TeamScores(String),
    ScoresTogether,
    ScoresSeparately,
    DebugDump,
    Quit,
}

impl Action {
    pub fn label(&self) -> String {
        match self {
            Action::StarterRanks => "Avg. Position Ranks of Starters".into(),
            Action::TeamRanks => "Avg. Position Ranks of Entire Team".into(),
            Action::RankStdev => "Std. Dev. of Position Ranks".into(),
            Action::ScoreBoxPlot => "Avg. Scores".into(),
            Action::ScoresWithMean => "Avg. Scores on All Scores".into(),
            Action::ScoreStdev => "Std. Dev. of Scores".into(),
            Action::PlotAll => "Plot All".into(),
            Action::TeamScores(abbrev) => format!("Scores Over Time: {abbrev}"),
            Action::ScoresTogether => "Scores Over Time: All Together".into(),
            Action::ScoresSeparately => "Scores Over Time: All Separately".into(),
            Action::DebugDump => "Debug".into(),
            Action::Quit => "Quit".into(),
        }
    }
}

/// The menu for `summary`: fixed actions, then one score-history entry per
/// team, then the quit entry.
pub fn actions(summary: &LeagueSummary) -> Vec<Action> {
    let mut actions = vec![
        Action::StarterRanks,
        Action::TeamRanks,
        Action::RankStdev,
        Action::ScoreBoxPlot,
        Action::ScoresWithMean,
        Action::ScoreStdev,
        Action::PlotAll,
        Action::DebugDump,
    ];
    actions.extend(
        summary
            .teams
            .iter()
            .map(|t| Action::TeamScores(t.abbrev.clone())),
    );
    actions.push(Action::ScoresTogether);
    actions.push(Action::ScoresSeparately);
    actions.push(Action::Quit);
    actions
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Show(Figure),
    Quit,
}

pub fn dispatch(action: &Action, summary: &LeagueSummary) -> Outcome {
    let figure = match action {
        Action::StarterRanks => starter_ranks(summary),
        Action::TeamRanks => team_ranks(summary),
        Action::RankStdev => rank_stdev(summary),
        Action::ScoreBoxPlot => score_box_plot(summary),
        Action::ScoresWithMean => scores_with_mean(summary),
        Action::ScoreStdev => score_stdev(summary),
        Action::PlotAll => Figure::Grid {
            title: format!("League Overview (Week {})", summary.current_week),
            figures: vec![
                starter_ranks(summary),
                rank_stdev(summary),
                score_box_plot(summary),
                score_stdev(summary),
            ],
        },
        Action::TeamScores(abbrev) => team_scores(summary, abbrev),
        Action::ScoresTogether => scores_together(summary),
        Action::ScoresSeparately => Figure::Grid {
            title: "Scores of Each Team Over Time".into(),
            figures: summary
                .teams
                .iter()
                .map(|t| team_scores(summary, &t.abbrev))
                .collect(),
        },
        Action::DebugDump => {
            let body = summary.debug_dump();
            info!("league debug dump\n{body}");
            Figure::Text {
                title: "Debug".into(),
                body,
            }
        }
        Action::Quit => return Outcome::Quit,
    };
    info!(action = %action.label(), "figure built");
    Outcome::Show(figure)
}

// ---------------------------------------------------------------------------
// Figure builders
// ---------------------------------------------------------------------------

fn categories(summary: &LeagueSummary) -> Vec<String> {
    summary.teams.iter().map(|t| t.abbrev.clone()).collect()
}

/// One labelled point per team that has the statistic.
fn team_scatter(
    summary: &LeagueSummary,
    title: String,
    y_label: &str,
    stat: impl Fn(&TeamSummary) -> Option<f64>,
) -> Figure {
    let points = summary
        .teams
        .iter()
        .enumerate()
        .filter_map(|(x, team)| {
            stat(team).map(|y| ScatterPoint {
                x,
                y,
                label: Some(format!("{y:.1}")),
                highlight: false,
            })
        })
        .collect();
    Figure::Scatter {
        title,
        x_label: "Team".into(),
        y_label: y_label.into(),
        categories: categories(summary),
        points,
    }
}

fn mean(stats: Option<SeriesStats>) -> Option<f64> {
    stats.map(|s| s.mean)
}

fn stdev(stats: Option<SeriesStats>) -> Option<f64> {
    stats.map(|s| s.stdev)
}

fn starter_ranks(summary: &LeagueSummary) -> Figure {
    team_scatter(
        summary,
        format!(
            "Average Position Rank of Each Team's Starting Lineups (Week {})",
            summary.current_week
        ),
        "Average Position Rank",
        |t| mean(t.starter_rank_stats),
    )
}

fn team_ranks(summary: &LeagueSummary) -> Figure {
    team_scatter(
        summary,
        format!(
            "Average Position Rank of Each Team (Week {})",
            summary.current_week
        ),
        "Average Position Rank",
        |t| mean(t.team_rank_stats),
    )
}

fn rank_stdev(summary: &LeagueSummary) -> Figure {
    team_scatter(
        summary,
        format!(
            "Standard Deviation of Position Ranks of Each Team (Week {})",
            summary.current_week
        ),
        "Standard Deviation of Position Ranks",
        |t| stdev(t.starter_rank_stats),
    )
}

fn score_stdev(summary: &LeagueSummary) -> Figure {
    team_scatter(
        summary,
        format!(
            "Standard Deviation of Scores of Each Team (Week {})",
            summary.current_week
        ),
        "Standard Deviation of Scores",
        |t| stdev(t.score_stats),
    )
}

fn score_box_plot(summary: &LeagueSummary) -> Figure {
    Figure::BoxPlot {
        title: format!("Scores of Each Team (Week {})", summary.current_week),
        x_label: "Team".into(),
        y_label: "Score".into(),
        boxes: summary
            .teams
            .iter()
            .filter_map(|t| BoxStats::from_values(&t.abbrev, &t.scores))
            .collect(),
    }
}

/// Every completed score in grey with the team mean highlighted.
fn scores_with_mean(summary: &LeagueSummary) -> Figure {
    let mut points = Vec::new();
    for (x, team) in summary.teams.iter().enumerate() {
        points.extend(team.scores.iter().map(|&y| ScatterPoint {
            x,
            y,
            label: None,
            highlight: false,
        }));
        if let Some(m) = mean(team.score_stats) {
            points.push(ScatterPoint {
                x,
                y: m,
                label: Some(format!("{m:.1}")),
                highlight: true,
            });
        }
    }
    Figure::Scatter {
        title: format!("Scores of Each Team (Week {})", summary.current_week),
        x_label: "Team".into(),
        y_label: "Score".into(),
        categories: categories(summary),
        points,
    }
}

fn week_lines(title: String, series: Vec<Series>, legend: bool) -> Figure {
    Figure::Lines {
        title,
        x_label: "Week".into(),
        y_label: "Score".into(),
        series,
        legend,
    }
}

fn team_scores(summary: &LeagueSummary, abbrev: &str) -> Figure {
    let scores = summary
        .team(abbrev)
        .map(|t| t.scores.as_slice())
        .unwrap_or_default();
    week_lines(
        format!("Scores of {abbrev} Over Time"),
        vec![Series::indexed(abbrev, scores)],
        false,
    )
}

fn scores_together(summary: &LeagueSummary) -> Figure {
    week_lines(
        "Scores of Each Team Over Time".into(),
        summary
            .teams
            .iter()
            .map(|t| Series::indexed(&t.abbrev, &t.scores))
            .collect(),
        true,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
