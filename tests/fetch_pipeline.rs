// tests/fetch_pipeline.rs
// Date resolution, fetcher errors and row validation through `fetch_with`.

use std::cell::RefCell;

use chrono::NaiveDate;

use chart_scrape::progress::{Progress, SkipReason};
use chart_scrape::{ChartData, ChartError, RequestDate, ResolvedDate, Result, SkipLog};

const HOT_100: &str = include_str!("fixtures/2015-11-28-hot-100.html");

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Minimal two-row page stamped with whatever edition was asked for.
fn stamped_page(date: ResolvedDate) -> String {
    let time = match date {
        ResolvedDate::Edition(d) => format!(r#"<time datetime="{d}">{d}</time>"#),
        ResolvedDate::Latest => String::new(),
    };
    format!(
        r#"<html><head><title>The Hot 100 Chart | Billboard</title></head><body>{time}
        <article class="chart-row"><span class="chart-row__current-week">1</span>
          <h2 class="chart-row__song">Poor Little Fool</h2><a class="chart-row__artist">Ricky Nelson</a></article>
        <article class="chart-row"><span class="chart-row__current-week">2</span>
          <h2 class="chart-row__song">Patricia</h2><a class="chart-row__artist">Perez Prado</a></article>
        </body></html>"#
    )
}

/// Fetcher that remembers every edition it was asked for.
struct Recorder {
    asked: RefCell<Vec<(String, ResolvedDate)>>,
}

impl Recorder {
    fn new() -> Self {
        Self { asked: RefCell::new(Vec::new()) }
    }

    fn last(&self) -> (String, ResolvedDate) {
        self.asked.borrow().last().cloned().unwrap()
    }
}

impl chart_scrape::PageFetcher for Recorder {
    fn fetch(&self, chart: &str, date: ResolvedDate) -> Result<String> {
        self.asked.borrow_mut().push((chart.to_string(), date));
        Ok(stamped_page(date))
    }
}

#[test]
fn dates_round_up_to_the_next_edition() {
    let rec = Recorder::new();
    for (asked, expected) in [
        ("2015-11-24", day(2015, 11, 28)),
        ("2015-11-28", day(2015, 11, 28)),
        ("2015-11-22", day(2015, 11, 28)),
        ("2016-07-08", day(2016, 7, 9)),
    ] {
        let chart = ChartData::fetch_with(&rec, "hot-100", asked, None).unwrap();
        assert_eq!(rec.last().1, ResolvedDate::Edition(expected), "{asked}");
        assert_eq!(chart.date(), Some(expected));
    }
}

#[test]
fn ancient_dates_clamp_to_first_hot_100() {
    let rec = Recorder::new();
    let chart = ChartData::fetch_with(&rec, "hot-100", "1000-10-10", None).unwrap();
    assert_eq!(chart.date(), Some(day(1958, 8, 4)));
    assert_eq!(chart[0].to_string(), "'Poor Little Fool' by Ricky Nelson");
}

#[test]
fn structured_dates_match_text_dates() {
    let rec = Recorder::new();
    let a = ChartData::fetch_with(&rec, "hot-100", day(2015, 11, 24), None).unwrap();
    let b = ChartData::fetch_with(&rec, "hot-100", "2015-11-24", None).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.date(), Some(day(2015, 11, 28)));
}

#[test]
fn no_date_asks_for_latest() {
    let rec = Recorder::new();
    ChartData::fetch_with(&rec, "hot-100", RequestDate::Latest, None).unwrap();
    assert_eq!(rec.last(), ("hot-100".to_string(), ResolvedDate::Latest));
    ChartData::fetch_with(&rec, " hot-100 ", None::<&str>, None).unwrap();
    assert_eq!(rec.last().0, "hot-100");
}

#[test]
fn bad_dates_fail_before_fetching() {
    let rec = Recorder::new();
    for bad in ["2015-13-40", "11/28/2015", "soon"] {
        let err = ChartData::fetch_with(&rec, "hot-100", bad, None).unwrap_err();
        assert!(matches!(err, ChartError::InvalidDateFormat(_)), "{bad}");
    }
    assert!(rec.asked.borrow().is_empty());
}

#[test]
fn fetcher_errors_propagate_unchanged() {
    let missing = |chart: &str, _: ResolvedDate| -> Result<String> { Err(ChartError::NotFound(chart.to_string())) };
    let err = ChartData::fetch_with(&missing, "no-such-chart", "2015-11-28", None).unwrap_err();
    assert!(matches!(err, ChartError::NotFound(ref n) if n == "no-such-chart"));

    let offline = |_: &str, _: ResolvedDate| -> Result<String> { Err(ChartError::Network("connection refused".into())) };
    let err = ChartData::fetch_with(&offline, "hot-100", None::<&str>, None).unwrap_err();
    assert!(err.is_transient());
}

#[test]
fn empty_name_is_not_found() {
    let rec = Recorder::new();
    let err = ChartData::fetch_with(&rec, "  ", None::<&str>, None).unwrap_err();
    assert!(matches!(err, ChartError::NotFound(_)));
}

#[test]
fn page_without_rows_is_empty_chart() {
    let blank = |_: &str, _: ResolvedDate| -> Result<String> { Ok("<html><body>Chart unavailable</body></html>".into()) };
    let err = ChartData::fetch_with(&blank, "hot-100", None::<&str>, None).unwrap_err();
    assert!(matches!(err, ChartError::EmptyChart { kept: 0, seen: 0, .. }));
}

#[test]
fn unreadable_rank_is_skipped_then_rejected_as_a_gap() {
    let broken = HOT_100.replace(
        r#"<span class="chart-row__current-week">50</span>"#,
        r#"<span class="chart-row__current-week">5O</span>"#,
    );
    let mut log = SkipLog::default();
    let err = ChartData::from_markup("hot-100", &broken, Some(&mut log)).unwrap_err();
    match err {
        ChartError::MalformedChart { ranks, .. } => {
            assert_eq!(ranks.len(), 99);
            assert!(!ranks.contains(&50));
        }
        other => panic!("expected MalformedChart, got {other}"),
    }
    assert_eq!(log.skipped, vec![(50, SkipReason::BadRank("5O".into()))]);
}

#[test]
fn duplicate_rank_is_malformed() {
    let dup = HOT_100.replace(
        r#"<span class="chart-row__current-week">51</span>"#,
        r#"<span class="chart-row__current-week">50</span>"#,
    );
    assert!(matches!(
        ChartData::from_markup("hot-100", &dup, None),
        Err(ChartError::MalformedChart { .. })
    ));
}

#[derive(Default)]
struct Counter {
    rows: usize,
    done: Vec<u32>,
    finished: Option<(usize, usize)>,
}

impl Progress for Counter {
    fn begin(&mut self, rows: usize) { self.rows = rows; }
    fn entry_done(&mut self, rank: u32) { self.done.push(rank); }
    fn finish(&mut self, kept: usize, skipped: usize) { self.finished = Some((kept, skipped)); }
}

#[test]
fn progress_sees_every_row() {
    let mut counter = Counter::default();
    let chart = ChartData::from_markup("hot-100", HOT_100, Some(&mut counter)).unwrap();
    assert_eq!(counter.rows, 100);
    assert_eq!(counter.done.len(), chart.len());
    assert_eq!(counter.done.first(), Some(&1));
    assert_eq!(counter.finished, Some((100, 0)));
}

#[test]
fn chart_data_is_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ChartData>();
    assert_send_sync::<chart_scrape::ChartEntry>();
    assert_send_sync::<chart_scrape::HttpFetcher>();
}

#[test]
fn skipped_rows_are_counted_without_a_progress_sink() {
    // one debut loses its artist: positional charts close the gap, the count remains
    let page = |_: &str, _: ResolvedDate| -> Result<String> {
        Ok(r#"<html><body>
            <article class="chart-row"><h2 class="chart-row__song">The Twist</h2><a class="chart-row__artist">Chubby Checker</a></article>
            <article class="chart-row"><h2 class="chart-row__song">Smooth</h2></article>
            <article class="chart-row"><h2 class="chart-row__song">Mack The Knife</h2><a class="chart-row__artist">Bobby Darin</a></article>
            </body></html>"#.into())
    };
    let chart = ChartData::fetch_with(&page, "greatest-hot-100-singles", None::<&str>, None).unwrap();
    assert_eq!(chart.len(), 2);
    assert_eq!(chart.skipped(), 1);
    assert_eq!(chart.entry_at_rank(2).unwrap().artist(), "Bobby Darin");

    let clean = ChartData::from_markup("hot-100", HOT_100, None).unwrap();
    assert_eq!(clean.skipped(), 0);
    // the count is not part of the chart's identity
    assert_eq!(ChartData::from_json(&chart.to_json().unwrap()).unwrap(), chart);
}

#[test]
fn corrupted_last_week_is_not_a_debut() {
    // rank 1's stats block opens with its last-week value
    let corrupted = HOT_100.replacen(
        r#"<span class="chart-row__value">1</span>"#,
        r#"<span class="chart-row__value">1O</span>"#,
        1,
    );
    let mut log = SkipLog::default();
    let err = ChartData::from_markup("hot-100", &corrupted, Some(&mut log)).unwrap_err();
    assert!(matches!(err, ChartError::MalformedChart { .. }), "{err}");
    assert_eq!(log.skipped, vec![(1, SkipReason::BadLast("1O".into()))]);
}
