// Player record normalizer: per-week stat breakdowns -> one wide row.

use gridiron_core::table::{Table, Value};

use crate::provider::PlayerStats;

/// One player flattened to `{week}_{stat}` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub full_name: String,
    pub position: String,
    /// Point total of the highest observed week; absent when the player has
    /// no weeks at all.
    pub points: Option<f64>,
    pub stats: Vec<(String, f64)>,
}

/// Stat keys never turned into columns: unmapped numeric ids and every
/// defensive stat.
pub fn is_skipped_stat(name: &str) -> bool {
    let numeric = !name.is_empty() && name.chars().all(|c| c.is_ascii_digit());
    numeric || name.starts_with("defensive")
}

pub fn column_name(week: u32, stat: &str) -> String {
    format!("{week}_{stat}")
}

pub fn normalize_player(player: &PlayerStats) -> WideRow {
    let mut stats = Vec::new();
    for (week, week_stats) in &player.weeks {
        for (stat, value) in &week_stats.breakdown {
            if is_skipped_stat(stat) {
                continue;
            }
            stats.push((column_name(*week, stat), *value));
        }
    }
    WideRow {
        full_name: player.full_name.clone(),
        position: player.position.clone(),
        points: player.weeks.values().next_back().map(|w| w.points),
        stats,
    }
}

/// Assemble rows into a table: `fullName, position, points` first, then
/// stat columns in first-seen order.
pub fn rows_to_table(rows: &[WideRow]) -> Table {
    let mut table = Table::new(["fullName", "position", "points"]);
    for row in rows {
        let mut record: Vec<(&str, Value)> = vec![
            ("fullName", Value::Text(row.full_name.clone())),
            ("position", Value::Text(row.position.clone())),
        ];
        if let Some(points) = row.points {
            record.push(("points", Value::Number(points)));
        }
        record.extend(
            row.stats
                .iter()
                .map(|(name, value)| (name.as_str(), Value::Number(*value))),
        );
        table.push_record(record);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::WeekStats;
    use std::collections::BTreeMap;

    fn week(points: f64, breakdown: &[(&str, f64)]) -> WeekStats {
        WeekStats {
            points,
            breakdown: breakdown
                .iter()
                .map(|(n, v)| (n.to_string(), *v))
                .collect(),
        }
    }

    fn player(weeks: Vec<(u32, WeekStats)>) -> PlayerStats {
        PlayerStats {
            full_name: "Ada Runner".into(),
            position: "RB".into(),
            weeks: weeks.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn skip_rules() {
        assert!(is_skipped_stat("10"));
        assert!(is_skipped_stat("210"));
        assert!(is_skipped_stat("defensiveTackles"));
        assert!(!is_skipped_stat("rushAtt"));
        assert!(!is_skipped_stat("2PtConversions"));
        assert!(!is_skipped_stat(""));
    }

    #[test]
    fn two_week_player() {
        let p = player(vec![
            (1, week(11.0, &[("10", 3.0), ("rushAtt", 5.0)])),
            (2, week(17.5, &[("defensiveTackles", 1.0), ("rushAtt", 7.0)])),
        ]);
        let row = normalize_player(&p);
        assert_eq!(
            row.stats,
            vec![("1_rushAtt".to_string(), 5.0), ("2_rushAtt".to_string(), 7.0)]
        );
        assert_eq!(row.points, Some(17.5));
    }

    #[test]
    fn points_come_from_highest_week() {
        // Insertion order does not matter; the highest week wins.
        let p = player(vec![(9, week(4.0, &[])), (3, week(20.0, &[]))]);
        assert_eq!(normalize_player(&p).points, Some(4.0));
    }

    #[test]
    fn player_without_eligible_stats_keeps_identity() {
        let p = player(vec![(1, week(0.0, &[("defensiveSacks", 1.0), ("99", 2.0)]))]);
        let row = normalize_player(&p);
        assert!(row.stats.is_empty());
        let table = rows_to_table(&[row]);
        assert_eq!(table.columns(), ["fullName", "position", "points"]);
        assert_eq!(table.get(0, "fullName"), Some(&Value::from("Ada Runner")));
        assert_eq!(table.get(0, "points"), Some(&Value::Number(0.0)));
    }

    #[test]
    fn player_without_weeks_has_no_points() {
        let row = normalize_player(&player(vec![]));
        assert_eq!(row.points, None);
        let table = rows_to_table(&[row]);
        assert_eq!(table.get(0, "points"), None);
        assert_eq!(table.get(0, "position"), Some(&Value::from("RB")));
    }

    #[test]
    fn table_is_union_of_player_columns() {
        let a = normalize_player(&player(vec![(1, week(5.0, &[("rushAtt", 5.0)]))]));
        let mut b = normalize_player(&player(vec![(2, week(6.0, &[("receptions", 3.0)]))]));
        b.full_name = "Bo Catcher".into();
        let table = rows_to_table(&[a, b]);
        assert_eq!(
            table.columns(),
            ["fullName", "position", "points", "1_rushAtt", "2_receptions"]
        );
        assert_eq!(table.get(0, "2_receptions"), None);
        assert_eq!(table.get(1, "2_receptions"), Some(&Value::Number(3.0)));
    }
}
