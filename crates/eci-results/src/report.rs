use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Utc};
use minijinja::{Environment, context, path_loader};

use crate::config::ReportConfig;
use crate::types::{CandidateRecord, ResultSnapshot};

pub const INDEPENDENT_TEMPLATE: &str = "independent_template.html";
pub const ALL_CANDIDATES_TEMPLATE: &str = "all_candidates_template.html";

const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Indian Standard Time, UTC+05:30 all year.
static IST: LazyLock<FixedOffset> =
    LazyLock::new(|| FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("invalid offset: IST"));

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn last_updated_ist(now: DateTime<Utc>) -> String {
    now.with_timezone(&*IST)
        .format(LAST_UPDATED_FORMAT)
        .to_string()
}

/// The snapshot restricted to candidates whose party is `designation`.
///
/// Constituencies without such a candidate are left out.
pub fn independent_view(snapshot: &ResultSnapshot, designation: &str) -> ResultSnapshot {
    snapshot
        .iter()
        .filter_map(|(name, records)| {
            let independents: Vec<CandidateRecord> = records
                .iter()
                .filter(|r| r.party == designation)
                .cloned()
                .collect();
            (!independents.is_empty()).then(|| (name.clone(), independents))
        })
        .collect()
}

/// Renders the two HTML reports from a directory of Jinja templates.
pub struct ReportRenderer {
    env: Environment<'static>,
    templates_dir: PathBuf,
}

impl ReportRenderer {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        let templates_dir = templates_dir.into();
        let mut env = Environment::new();
        env.set_loader(path_loader(templates_dir.clone()));
        Self { env, templates_dir }
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    pub fn render_independent(
        &self,
        snapshot: &ResultSnapshot,
        designation: &str,
        last_updated: &str,
    ) -> Result<String, ReportError> {
        let template = self.env.get_template(INDEPENDENT_TEMPLATE)?;
        let candidates = independent_view(snapshot, designation);
        Ok(template.render(context! {
            candidates => candidates,
            last_updated => last_updated,
        })?)
    }

    pub fn render_all(
        &self,
        snapshot: &ResultSnapshot,
        last_updated: &str,
    ) -> Result<String, ReportError> {
        let template = self.env.get_template(ALL_CANDIDATES_TEMPLATE)?;
        Ok(template.render(context! {
            results => snapshot,
            last_updated => last_updated,
        })?)
    }
}

fn write_report(path: &Path, html: &str) -> Result<(), ReportError> {
    fs::write(path, html).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Renders and writes both reports. A failing report does not stop the other
/// one; the first error is returned.
pub fn write_reports(
    renderer: &ReportRenderer,
    snapshot: &ResultSnapshot,
    config: &ReportConfig,
    now: DateTime<Utc>,
) -> Result<(), ReportError> {
    if snapshot.is_empty() {
        log::warn!("Snapshot is empty; reports will list no candidates");
    }

    let last_updated = last_updated_ist(now);

    let independent = renderer
        .render_independent(snapshot, &config.independent_label, &last_updated)
        .and_then(|html| write_report(&config.independent_output, &html))
        .inspect(|_| {
            log::info!(
                "Independent candidates HTML generated: {}",
                config.independent_output.display()
            )
        })
        .inspect_err(|e| log::error!("Independent candidates report failed: {}", e));

    let all = renderer
        .render_all(snapshot, &last_updated)
        .and_then(|html| write_report(&config.all_output, &html))
        .inspect(|_| {
            log::info!(
                "All candidates HTML generated: {}",
                config.all_output.display()
            )
        })
        .inspect_err(|e| log::error!("All candidates report failed: {}", e));

    independent.and(all)
}
