use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::stream::{self, StreamExt};

use crate::config::{CollisionPolicy, ScrapeConfig};
use crate::parser::parse_constituency_page;
use crate::scraper::WebScraper;
use crate::types::{ConstituencyResults, PageOutcome, ResultSnapshot};

/// Drives fetch + extract over every configured page index and reduces the
/// outcomes into a [`ResultSnapshot`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    scraper: WebScraper,
    config: ScrapeConfig,
}

impl Aggregator {
    pub fn new(scraper: WebScraper, config: ScrapeConfig) -> Self {
        Self { scraper, config }
    }

    pub async fn run(&self) -> ResultSnapshot {
        log::info!(
            "Fetching constituency pages {}..={} ({} at a time)...",
            self.config.first,
            self.config.last,
            self.config.concurrency
        );

        let outcomes = collect_outcomes(
            self.config.indices(),
            self.config.concurrency,
            |index| self.scraper.page_url(index),
            |index| self.scrape_page(index),
        )
        .await;

        reduce(outcomes, self.config.on_collision)
    }

    /// Fetch then extract a single page. Never fails; problems become a
    /// no-data outcome.
    pub async fn scrape_page(&self, index: u32) -> PageOutcome {
        let url = self.scraper.page_url(index);

        let Some(html) = self.scraper.fetch_page(index).await else {
            return PageOutcome::failed(index, url);
        };

        match parse_constituency_page(&html, &url, &self.config.name_suffix) {
            Ok(page) => {
                match &page.records {
                    Some(records) => log::debug!(
                        "{}: {} candidate(s) from {}",
                        page.name,
                        records.len(),
                        url
                    ),
                    None => log::warn!("Could not find results table in {}", url),
                }
                PageOutcome {
                    index,
                    url,
                    name: Some(page.name),
                    records: page.records,
                }
            }
            Err(e) => {
                log::warn!("{}", e);
                PageOutcome::failed(index, url)
            }
        }
    }
}

/// Runs `task` for every index with at most `concurrency` in flight and
/// waits for all of them. Outcomes are returned in completion order.
///
/// A panicking task is turned into a failed outcome carrying `page_url(index)`.
pub async fn collect_outcomes<I, U, F, Fut>(
    indices: I,
    concurrency: usize,
    page_url: U,
    task: F,
) -> Vec<PageOutcome>
where
    I: IntoIterator<Item = u32>,
    U: Fn(u32) -> String,
    F: Fn(u32) -> Fut,
    Fut: Future<Output = PageOutcome>,
{
    stream::iter(indices)
        .map(|index| {
            let url = page_url(index);
            let fut = AssertUnwindSafe(task(index)).catch_unwind();
            async move {
                fut.await.unwrap_or_else(|_| {
                    log::error!("Task for page {} ({}) panicked", index, url);
                    PageOutcome::failed(index, url)
                })
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

/// Folds outcomes, in completion order, into a snapshot.
///
/// Only outcomes with a name and at least one record are kept. Name
/// collisions are resolved by `policy`. The snapshot lists constituencies by
/// the page index of the outcome that was kept.
pub fn reduce<I>(outcomes: I, policy: CollisionPolicy) -> ResultSnapshot
where
    I: IntoIterator<Item = PageOutcome>,
{
    let mut kept: HashMap<String, (u32, ConstituencyResults)> = HashMap::new();
    let mut rejected: HashSet<String> = HashSet::new();
    let (mut total, mut failed, mut empty) = (0usize, 0usize, 0usize);

    for outcome in outcomes {
        total += 1;
        if outcome.name.is_none() {
            failed += 1;
        }

        let index = outcome.index;
        let Some((name, records)) = outcome.usable() else {
            empty += 1;
            continue;
        };

        if rejected.contains(&name) {
            log::error!("Dropping page {} for rejected constituency '{}'", index, name);
            continue;
        }

        if !kept.contains_key(&name) {
            kept.insert(name, (index, records));
            continue;
        }

        match policy {
            CollisionPolicy::Replace => {
                log::warn!(
                    "Constituency '{}' seen again at page {}; replacing earlier results",
                    name,
                    index
                );
                kept.insert(name, (index, records));
            }
            CollisionPolicy::KeepFirst => {
                log::warn!(
                    "Constituency '{}' seen again at page {}; keeping earlier results",
                    name,
                    index
                );
            }
            CollisionPolicy::Reject => {
                log::error!(
                    "Constituency '{}' seen again at page {}; dropping it from the snapshot",
                    name,
                    index
                );
                kept.remove(&name);
                rejected.insert(name);
            }
        }
    }

    // `empty` counts failed pages too.
    log::info!(
        "Processed {} page(s): {} constituencies kept, {} failed, {} without candidate rows",
        total,
        kept.len(),
        failed,
        empty - failed
    );

    let mut entries: Vec<(String, (u32, ConstituencyResults))> = kept.into_iter().collect();
    entries.sort_by_key(|(_, (index, _))| *index);
    entries
        .into_iter()
        .map(|(name, (_, records))| (name, records))
        .collect()
}
