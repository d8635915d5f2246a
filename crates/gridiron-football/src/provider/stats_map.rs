// ESPN stat id -> stat name table.

/// Name for a known stat id. Ids outside the table stay numeric in the
/// breakdown and are skipped when building dataset columns.
pub fn stat_name(id: u32) -> Option<&'static str> {
    let name = match id {
        // Passing
        0 => "passingAttempts",
        1 => "passingCompletions",
        2 => "passingIncompletions",
        3 => "passingYards",
        4 => "passingTouchdowns",
        15 => "passing40PlusYardTD",
        16 => "passing50PlusYardTD",
        17 => "passing300To399YardGame",
        18 => "passing400PlusYardGame",
        19 => "passing2PtConversions",
        20 => "passingInterceptions",
        21 => "passingCompletionPercentage",
        22 => "passingYardsPerGame",
        // Rushing
        23 => "rushingAttempts",
        24 => "rushingYards",
        25 => "rushingTouchdowns",
        26 => "rushing2PtConversions",
        35 => "rushing40PlusYardTD",
        36 => "rushing50PlusYardTD",
        37 => "rushing100To199YardGame",
        38 => "rushing200PlusYardGame",
        39 => "rushingYardsPerAttempt",
        40 => "rushingYardsPerGame",
        // Receiving
        41 => "receivingReceptions",
        42 => "receivingYards",
        43 => "receivingTouchdowns",
        44 => "receiving2PtConversions",
        45 => "receiving40PlusYardTD",
        46 => "receiving50PlusYardTD",
        56 => "receiving100To199YardGame",
        57 => "receiving200PlusYardGame",
        58 => "receivingTargets",
        59 => "receivingYardsAfterCatch",
        60 => "receivingYardsPerReception",
        61 => "receivingYardsPerGame",
        62 => "2PtConversions",
        63 => "fumbleRecoveredForTD",
        64 => "passingTimesSacked",
        68 => "fumbles",
        72 => "lostFumbles",
        73 => "turnovers",
        // Kicking
        74 => "madeFieldGoalsFrom50Plus",
        75 => "attemptedFieldGoalsFrom50Plus",
        76 => "missedFieldGoalsFrom50Plus",
        77 => "madeFieldGoalsFrom40To49",
        78 => "attemptedFieldGoalsFrom40To49",
        79 => "missedFieldGoalsFrom40To49",
        80 => "madeFieldGoalsFromUnder40",
        81 => "attemptedFieldGoalsFromUnder40",
        82 => "missedFieldGoalsFromUnder40",
        83 => "madeFieldGoals",
        84 => "attemptedFieldGoals",
        85 => "missedFieldGoals",
        86 => "madeExtraPoints",
        87 => "attemptedExtraPoints",
        88 => "missedExtraPoints",
        // Defense
        89 => "defensive0PointsAllowed",
        90 => "defensive1To6PointsAllowed",
        91 => "defensive7To13PointsAllowed",
        92 => "defensive14To17PointsAllowed",
        93 => "defensiveBlockedKickForTouchdowns",
        94 => "defensiveTouchdowns",
        95 => "defensiveInterceptions",
        96 => "defensiveFumbles",
        97 => "defensiveBlockedKicks",
        98 => "defensiveSafeties",
        99 => "defensiveSacks",
        106 => "defensiveForcedFumbles",
        107 => "defensiveAssistedTackles",
        108 => "defensiveSoloTackles",
        109 => "defensiveTotalTackles",
        113 => "defensivePassesDefensed",
        118 => "punter",
        120 => "defensivePointsAllowed",
        127 => "defensiveYardsAllowed",
        // Team results
        155 => "teamWin",
        156 => "teamLoss",
        157 => "teamTie",
        210 => "gamesPlayed",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_ids() {
        assert_eq!(stat_name(3), Some("passingYards"));
        assert_eq!(stat_name(42), Some("receivingYards"));
        assert_eq!(stat_name(210), Some("gamesPlayed"));
        assert_eq!(stat_name(5), None);
        assert_eq!(stat_name(10_000), None);
    }
}
