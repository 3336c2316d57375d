use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::CandidateRecord;

/// Rows shorter than this are not candidate rows.
const MIN_COLUMNS: usize = 7;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Could not extract constituency name from {0}")]
    MissingName(String),
}

static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2").expect("invalid selector: heading"));
static HEADING_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span").expect("invalid selector: heading label"));
static RESULTS_TABLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table.table-striped").expect("invalid selector: results table")
});
static TABLE_BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody").expect("invalid selector: table body"));
static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: row"));
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("invalid selector: cell"));

/// A parsed constituency page.
///
/// `records` is `None` when the page has a heading but no results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstituencyPage {
    pub name: String,
    pub records: Option<Vec<CandidateRecord>>,
}

/// Text nodes trimmed individually and concatenated, skipping blank ones.
fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<String>()
}

fn parse_constituency_name(document: &Html, name_suffix: &str) -> Option<String> {
    let heading = document.select(&HEADING).next()?;
    let label = heading.select(&HEADING_LABEL).next()?;
    let text = stripped_text(label);

    let name = if name_suffix.is_empty() {
        text
    } else {
        text.replace(name_suffix, "")
    };
    let name = name.trim();

    (!name.is_empty()).then(|| name.to_string())
}

fn parse_candidate_row(row: ElementRef, constituency: &str, url: &str) -> Option<CandidateRecord> {
    let cells: Vec<String> = row.select(&CELL).map(stripped_text).collect();
    if cells.len() < MIN_COLUMNS {
        return None;
    }

    Some(CandidateRecord {
        constituency: constituency.to_string(),
        constituency_url: url.to_string(),
        candidate: cells[1].clone(),
        party: cells[2].clone(),
        evm_votes: cells[3].clone(),
        postal_votes: cells[4].clone(),
        total_votes: cells[5].clone(),
        vote_percentage: cells[6].clone(),
    })
}

/// Extracts the constituency name and candidate rows from a results page.
///
/// Fails only when the heading label is missing. A page without the
/// results table yields the name with `records: None`.
pub fn parse_constituency_page(
    html: &str,
    url: &str,
    name_suffix: &str,
) -> Result<ConstituencyPage, ParseError> {
    let document = Html::parse_document(html);

    let name = parse_constituency_name(&document, name_suffix)
        .ok_or_else(|| ParseError::MissingName(url.to_string()))?;

    let Some(table) = document.select(&RESULTS_TABLE).next() else {
        return Ok(ConstituencyPage {
            name,
            records: None,
        });
    };

    let records = table
        .select(&TABLE_BODY)
        .next()
        .map(|body| {
            body.select(&ROW)
                .filter_map(|row| parse_candidate_row(row, &name, url))
                .collect()
        })
        .unwrap_or_default();

    Ok(ConstituencyPage {
        name,
        records: Some(records),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const URL: &str = "https://results.eci.gov.in/ResultAcGenFeb2025/ConstituencywiseU051.htm";
    const SUFFIX: &str = "(NCT of Delhi)";

    #[test]
    fn test_parse_constituency_page_from_fixture() {
        let html = fs::read_to_string("fixtures/constituency_page.html")
            .expect("Failed to read fixture");

        let page = parse_constituency_page(&html, URL, SUFFIX).expect("Failed to parse page");

        assert_eq!(page.name, "Narela");
        let records = page.records.expect("Should find the results table");
        assert_eq!(records.len(), 4, "Total row has too few cells and is skipped");

        let first = &records[0];
        assert_eq!(first.constituency, "Narela");
        assert_eq!(first.constituency_url, URL);
        assert_eq!(first.candidate, "RAJ KARAN KHATRI");
        assert_eq!(first.party, "Bharatiya Janata Party");
        assert_eq!(first.evm_votes, "86874");
        assert_eq!(first.postal_votes, "546");
        assert_eq!(first.total_votes, "87420");
        assert_eq!(first.vote_percentage, "49.87");

        let candidates: Vec<&str> = records.iter().map(|r| r.candidate.as_str()).collect();
        assert_eq!(
            candidates,
            vec![
                "RAJ KARAN KHATRI",
                "DINESH BHARDWAJ",
                "ARUNA KUMARI",
                "NOTA",
            ]
        );
        assert_eq!(records[2].party, "Independent");
    }

    #[test]
    fn test_parse_trims_cell_text() {
        let html = r#"
            <h2>Assembly Constituency <span>
                7 - Alpha   (NCT of Delhi)
            </span></h2>
            <table class="table table-striped">
                <tbody>
                    <tr>
                        <td> 1 </td>
                        <td>
                            <span> X </span>
                        </td>
                        <td>  Independent </td>
                        <td> 90 </td>
                        <td> 10 </td>
                        <td> 100 </td>
                        <td> 33.3 </td>
                    </tr>
                </tbody>
            </table>
        "#;

        let page = parse_constituency_page(html, URL, SUFFIX).expect("Failed to parse");

        assert_eq!(page.name, "7 - Alpha");
        let records = page.records.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].candidate, "X");
        assert_eq!(records[0].party, "Independent");
        assert_eq!(records[0].total_votes, "100");
        assert_eq!(records[0].vote_percentage, "33.3");
    }

    #[test]
    fn test_parse_skips_short_rows() {
        let html = r#"
            <h2><span>Alpha</span></h2>
            <table class="table-striped">
                <tbody>
                    <tr><td>1</td><td>X</td><td>ABC</td><td>1</td><td>2</td><td>3</td><td>4</td></tr>
                    <tr><td colspan="5">Total</td><td>3</td></tr>
                    <tr><td>2</td><td>Y</td><td>DEF</td><td>5</td><td>6</td><td>11</td><td>96</td><td>extra</td></tr>
                </tbody>
            </table>
        "#;

        let records = parse_constituency_page(html, URL, SUFFIX)
            .unwrap()
            .records
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].candidate, "X");
        assert_eq!(records[1].candidate, "Y");
        assert_eq!(records[1].vote_percentage, "96");
    }

    #[test]
    fn test_parse_missing_heading() {
        let html = r#"<table class="table-striped"><tbody></tbody></table>"#;

        let result = parse_constituency_page(html, URL, SUFFIX);
        assert!(matches!(result, Err(ParseError::MissingName(url)) if url == URL));
    }

    #[test]
    fn test_parse_heading_without_label() {
        let html = r#"<h2>Assembly Constituency</h2>"#;

        assert!(parse_constituency_page(html, URL, SUFFIX).is_err());
    }

    #[test]
    fn test_parse_label_that_is_only_the_suffix() {
        let html = r#"<h2><span>(NCT of Delhi)</span></h2>"#;

        assert!(parse_constituency_page(html, URL, SUFFIX).is_err());
    }

    #[test]
    fn test_parse_missing_table() {
        let html = r#"
            <h2><span>Alpha(NCT of Delhi)</span></h2>
            <table class="table"><tbody><tr><td>not results</td></tr></tbody></table>
        "#;

        let page = parse_constituency_page(html, URL, SUFFIX).expect("Name should parse");
        assert_eq!(page.name, "Alpha");
        assert!(page.records.is_none());
    }

    #[test]
    fn test_parse_empty_suffix_keeps_label() {
        let html = r#"<h2><span>Alpha (NCT of Delhi)</span></h2>"#;

        let page = parse_constituency_page(html, URL, "").unwrap();
        assert_eq!(page.name, "Alpha (NCT of Delhi)");
    }
}
