// Position label encoding.

use crate::error::ModelError;

/// Maps position labels to consecutive integers in sorted label order, so
/// the same label set always yields the same codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionEncoder {
    labels: Vec<String>,
}

impl PositionEncoder {
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(|l| l.as_ref().to_string()).collect();
        labels.sort();
        labels.dedup();
        PositionEncoder { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn encode(&self, label: &str) -> Result<usize, ModelError> {
        self.labels
            .binary_search_by(|l| l.as_str().cmp(label))
            .map_err(|_| ModelError::UnknownPosition(label.to_string()))
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_sorted_labels() {
        let enc = PositionEncoder::fit(["WR", "RB", "TE", "RB", "WR"]);
        assert_eq!(enc.labels(), ["RB", "TE", "WR"]);
        assert_eq!(enc.encode("RB").unwrap(), 0);
        assert_eq!(enc.encode("TE").unwrap(), 1);
        assert_eq!(enc.encode("WR").unwrap(), 2);
        assert_eq!(enc.decode(2), Some("WR"));
    }

    #[test]
    fn unknown_label_is_an_error() {
        let enc = PositionEncoder::fit(["RB"]);
        assert!(matches!(enc.encode("QB"), Err(ModelError::UnknownPosition(p)) if p == "QB"));
    }
}
