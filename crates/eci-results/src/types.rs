use std::fmt::Display;

use indexmap::IndexMap;
use indexmap::map;
use serde::{Deserialize, Serialize};

/// One candidate row as scraped from a constituency page.
///
/// Every field is kept as the display string found on the page. Vote counts
/// and percentages are not parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(rename = "Constituency")]
    pub constituency: String,
    #[serde(rename = "Constituency URL")]
    pub constituency_url: String,
    #[serde(rename = "Candidate")]
    pub candidate: String,
    #[serde(rename = "Party")]
    pub party: String,
    #[serde(rename = "EVM Votes")]
    pub evm_votes: String,
    #[serde(rename = "Postal Votes")]
    pub postal_votes: String,
    #[serde(rename = "Total Votes")]
    pub total_votes: String,
    #[serde(rename = "Vote %")]
    pub vote_percentage: String,
}

impl Display for CandidateRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) — EVM {} | Postal {} | Total {} | {}%",
            self.candidate,
            self.party,
            self.evm_votes,
            self.postal_votes,
            self.total_votes,
            self.vote_percentage
        )
    }
}

/// Candidates of a single constituency, in the order the page lists them.
pub type ConstituencyResults = Vec<CandidateRecord>;

/// Constituency name to candidate list. Serialises as the bare JSON object.
///
/// Keys keep insertion order; the aggregator inserts them in page order.
/// Names are stored trimmed, so a label like `"Narela (NCT of Delhi)"` is
/// keyed as `"Narela"` with no trailing space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSnapshot(IndexMap<String, ConstituencyResults>);

impl ResultSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the results for `name`, returning whatever was stored under it before.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        results: ConstituencyResults,
    ) -> Option<ConstituencyResults> {
        self.0.insert(name.into(), results)
    }

    pub fn remove(&mut self, name: &str) -> Option<ConstituencyResults> {
        self.0.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ConstituencyResults> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> map::Iter<'_, String, ConstituencyResults> {
        self.0.iter()
    }

    pub fn constituencies(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every record across all constituencies, grouped by constituency.
    pub fn records(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.0.values().flatten()
    }
}

impl FromIterator<(String, ConstituencyResults)> for ResultSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, ConstituencyResults)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ResultSnapshot {
    type Item = (String, ConstituencyResults);
    type IntoIter = map::IntoIter<String, ConstituencyResults>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSnapshot {
    type Item = (&'a String, &'a ConstituencyResults);
    type IntoIter = map::Iter<'a, String, ConstituencyResults>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// What a single fetch+extract task produced for one page index.
///
/// `name == None` means nothing usable came back. A name with `records ==
/// None` means the heading was found but the results table was not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub index: u32,
    pub url: String,
    pub name: Option<String>,
    pub records: Option<ConstituencyResults>,
}

impl PageOutcome {
    pub fn failed(index: u32, url: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
            name: None,
            records: None,
        }
    }

    /// Name and records, when the page produced at least one candidate row.
    pub fn usable(self) -> Option<(String, ConstituencyResults)> {
        match (self.name, self.records) {
            (Some(name), Some(records)) if !records.is_empty() => Some((name, records)),
            _ => None,
        }
    }
}
