use serde::Serialize;

use crate::types::ResultSnapshot;

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub constituencies: usize,
    pub candidates: usize,
    pub independents: usize,
}

impl SnapshotStats {
    pub fn from_snapshot(snapshot: &ResultSnapshot, independent_label: &str) -> SnapshotStats {
        SnapshotStats {
            constituencies: snapshot.len(),
            candidates: snapshot.records().count(),
            independents: snapshot
                .records()
                .filter(|r| r.party == independent_label)
                .count(),
        }
    }
}

impl std::fmt::Display for SnapshotStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  Constituencies: {}", self.constituencies)?;
        writeln!(f, "  Candidates:     {}", self.candidates)?;
        writeln!(f, "  Independents:   {}", self.independents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateRecord;

    fn record(constituency: &str, party: &str) -> CandidateRecord {
        CandidateRecord {
            constituency: constituency.to_string(),
            constituency_url: String::new(),
            candidate: "someone".to_string(),
            party: party.to_string(),
            evm_votes: "0".to_string(),
            postal_votes: "0".to_string(),
            total_votes: "0".to_string(),
            vote_percentage: "0".to_string(),
        }
    }

    #[test]
    fn test_stats_from_snapshot() {
        let mut snapshot = ResultSnapshot::new();
        snapshot.insert(
            "Alpha",
            vec![record("Alpha", "Independent"), record("Alpha", "ABC")],
        );
        snapshot.insert("Beta", vec![record("Beta", "Independent")]);

        let stats = SnapshotStats::from_snapshot(&snapshot, "Independent");

        assert_eq!(
            stats,
            SnapshotStats {
                constituencies: 2,
                candidates: 3,
                independents: 2,
            }
        );
        assert!(stats.to_string().contains("Candidates:     3"));
    }
}
