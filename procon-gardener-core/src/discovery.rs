//! Submission discovery: walks the paginated submission listing of every
//! configured contest and turns accepted rows into [`Submission`] records.
//!
//! Parsing ([`parse_listing`], [`submission_from_row`]) is synchronous and
//! free of I/O so it can be tested against fixture HTML; [`discover`] drives
//! the paging through a [`JudgeClient`].

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::archive::is_safe_component;
use crate::contract::{JudgeClient, Pacing, Throttle};
use crate::submission::{Submission, ACCEPTED};

/// Rows with fewer cells are still pending judgement or malformed.
const MIN_CELLS: usize = 10;

/// `/contests/{contest}/tasks/{problem}` and `/contests/{contest}/submissions/{id}`:
/// the id is the fifth `/`-separated segment of the link path.
const ID_SEGMENT: usize = 4;

const TIME_FORMAT_WITH_OFFSET: &str = "%Y-%m-%d %H:%M:%S%z";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid")
});

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid selector `{css}`: {reason}")]
    Selector { css: &'static str, reason: String },
}

/// Raw named fields of one listing table row. Every field is `None` when the
/// row has too few cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingRow {
    pub submitted_at: Option<String>,
    pub problem_href: Option<String>,
    pub language: Option<String>,
    pub score: Option<String>,
    pub code_size: Option<String>,
    pub verdict: Option<String>,
    pub execution_time: Option<String>,
    pub detail_href: Option<String>,
}

pub(crate) fn selector(css: &'static str) -> Result<Selector, DiscoveryError> {
    Selector::parse(css).map_err(|e| DiscoveryError::Selector {
        css,
        reason: e.to_string(),
    })
}

fn text_of(element: ElementRef) -> String {
    element.text().map(str::trim).collect::<Vec<_>>().concat()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn first_text(cell: ElementRef, selector: &Selector) -> Option<String> {
    cell.select(selector).next().map(text_of).and_then(non_empty)
}

fn first_attr(cell: ElementRef, selector: &Selector, attr: &str) -> Option<String> {
    cell.select(selector)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(str::to_string)
}

/// Parses every `table tbody tr` of a listing page. An empty result means the
/// page is past the last one.
pub fn parse_listing(html: &str) -> Result<Vec<ListingRow>, DiscoveryError> {
    let document = Html::parse_document(html);
    let row_selector = selector("table tbody tr")?;
    let cell_selector = selector("td")?;
    let time_selector = selector("time")?;
    let link_selector = selector("a[href]")?;
    let anchor_selector = selector("a")?;
    let span_selector = selector("span")?;
    let detail_selector = selector("a.submission-details-link[href]")?;

    let rows = document
        .select(&row_selector)
        .map(|tr| {
            let cells: Vec<ElementRef> = tr.select(&cell_selector).collect();
            if cells.len() < MIN_CELLS {
                return ListingRow::default();
            }
            ListingRow {
                submitted_at: first_text(cells[0], &time_selector),
                problem_href: first_attr(cells[1], &link_selector, "href"),
                language: first_text(cells[3], &anchor_selector),
                score: non_empty(text_of(cells[4])),
                code_size: non_empty(text_of(cells[5])),
                verdict: first_text(cells[6], &span_selector),
                execution_time: non_empty(text_of(cells[7])),
                detail_href: first_attr(cells[9], &detail_selector, "href"),
            }
        })
        .collect();
    Ok(rows)
}

/// Returns the path segment at `index` of a link, ignoring scheme, host,
/// query and fragment.
fn link_segment(href: &str, index: usize) -> Option<&str> {
    let path = match href.find("://") {
        Some(scheme_end) => {
            let rest = &href[scheme_end + 3..];
            &rest[rest.find('/')?..]
        }
        None => href,
    };
    let path = path.split(['?', '#']).next()?;
    path.split('/')
        .nth(index)
        .filter(|segment| is_safe_component(segment))
}

/// Parses the listing timestamp. AtCoder renders `2020-05-09 13:53:20+0900`;
/// an offset-less value is taken as UTC.
pub fn parse_epoch(raw: &str) -> Option<i64> {
    DateTime::parse_from_str(raw, TIME_FORMAT_WITH_OFFSET)
        .map(|t| t.timestamp())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, TIME_FORMAT).map(|t| t.and_utc().timestamp())
        })
        .ok()
}

fn leading_number(raw: Option<&str>) -> Option<&str> {
    raw.and_then(|s| NUMBER.find(s)).map(|m| m.as_str())
}

/// Builds a submission from an accepted row; `None` for anything else.
pub fn submission_from_row(
    row: &ListingRow,
    contest_id: &str,
    user_id: &str,
) -> Option<Submission> {
    let verdict = row.verdict.as_deref()?;
    if verdict != ACCEPTED {
        return None;
    }
    let Some(detail_href) = row.detail_href.as_deref() else {
        debug!(contest = contest_id, "[DISCOVER] Skipping row without detail link");
        return None;
    };
    let Some(id) = link_segment(detail_href, ID_SEGMENT).and_then(|s| s.parse::<u64>().ok())
    else {
        debug!(
            contest = contest_id,
            href = detail_href,
            "[DISCOVER] Skipping row with unusable submission id"
        );
        return None;
    };
    let Some(problem_id) = row
        .problem_href
        .as_deref()
        .and_then(|href| link_segment(href, ID_SEGMENT))
    else {
        debug!(contest = contest_id, id, "[DISCOVER] Skipping row without problem link");
        return None;
    };
    let language = row.language.clone().unwrap_or_default();

    let epoch_second = match row.submitted_at.as_deref().and_then(parse_epoch) {
        Some(epoch) => epoch,
        None => {
            warn!(
                contest = contest_id,
                id,
                raw = row.submitted_at.as_deref().unwrap_or(""),
                "[DISCOVER] Unparsable submission time, using the current time instead"
            );
            Utc::now().timestamp()
        }
    };

    Some(Submission {
        id,
        epoch_second,
        problem_id: problem_id.to_string(),
        contest_id: contest_id.to_string(),
        user_id: user_id.to_string(),
        language,
        point: leading_number(row.score.as_deref())
            .and_then(|n| n.parse().ok())
            .unwrap_or_default(),
        length: leading_number(row.code_size.as_deref())
            .and_then(|n| n.parse().ok())
            .unwrap_or_default(),
        result: verdict.to_string(),
        execution_time: leading_number(row.execution_time.as_deref())
            .and_then(|n| n.parse().ok())
            .unwrap_or_default(),
    })
}

/// Collects every accepted submission of `user_id` across `contests`.
///
/// A failing page ends that contest only; the next contest is still walked.
/// Listing requests are spaced by `pacing.listing_delay`, across contest
/// boundaries too.
pub async fn discover<J>(
    judge: &J,
    user_id: &str,
    contests: &[String],
    pacing: Pacing,
) -> Vec<Submission>
where
    J: JudgeClient + ?Sized,
{
    let mut throttle = Throttle::new(pacing.listing_delay);
    let mut discovered = Vec::new();
    for contest_id in contests {
        let found = discover_contest(judge, contest_id, user_id, &mut throttle).await;
        info!(contest = %contest_id, accepted = found.len(), "[DISCOVER] Contest done");
        discovered.extend(found);
    }
    discovered
}

async fn discover_contest<J>(
    judge: &J,
    contest_id: &str,
    user_id: &str,
    throttle: &mut Throttle,
) -> Vec<Submission>
where
    J: JudgeClient + ?Sized,
{
    let mut found = Vec::new();
    let mut page = 1;
    loop {
        throttle.ready().await;
        let html = match judge.listing_page(contest_id, user_id, page).await {
            Ok(html) => html,
            Err(e) => {
                error!(
                    contest = contest_id,
                    page,
                    error = %e,
                    "[DISCOVER] Listing request failed, stopping this contest"
                );
                break;
            }
        };
        let rows = match parse_listing(&html) {
            Ok(rows) => rows,
            Err(e) => {
                error!(
                    contest = contest_id,
                    page,
                    error = %e,
                    "[DISCOVER] Listing parse failed, stopping this contest"
                );
                break;
            }
        };
        if rows.is_empty() {
            debug!(contest = contest_id, page, "[DISCOVER] Empty page, end of listing");
            break;
        }

        let before = found.len();
        found.extend(
            rows.iter()
                .filter_map(|row| submission_from_row(row, contest_id, user_id)),
        );
        debug!(
            contest = contest_id,
            page,
            rows = rows.len(),
            accepted = found.len() - before,
            "[DISCOVER] Parsed listing page"
        );

        page += 1;
    }
    found
}
