//! Selection of the read strategy for `list`.
//!
//! Exactly one strategy is taken per call, in this order: full-text search,
//! status index, court type index, location index, full scan. Filters that the
//! chosen strategy cannot express are ignored, except `cost`, which is applied
//! to the returned page afterwards when no search ran.

use crate::models::{Cost, Court, ListCourtsArgs, Page};
use crate::schema::courts_search_index;
use crate::store::{CourtQuery, SearchQuery};

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub fn route(args: &ListCourtsArgs) -> CourtQuery {
    if let Some(text) = supplied(&args.search_query) {
        let index = courts_search_index();
        return CourtQuery::Search(SearchQuery {
            text: text.to_string(),
            status: args.status.filter(|_| index.is_filterable("status")),
            court_type: args.court_type.filter(|_| index.is_filterable("courtType")),
            cost: args.cost.filter(|_| index.is_filterable("cost")),
        });
    }

    if let Some(status) = args.status {
        return CourtQuery::ByStatus(status);
    }

    if let Some(court_type) = args.court_type {
        return CourtQuery::ByCourtType(court_type);
    }

    let state = supplied(&args.state);
    let city = supplied(&args.city);
    if state.is_some() || city.is_some() {
        return CourtQuery::ByLocation {
            state: state.map(str::to_string),
            city: city.map(str::to_string),
        };
    }

    CourtQuery::FullScan
}

/// The cost to filter the page by after pagination, if any.
pub fn cost_post_filter(args: &ListCourtsArgs, query: &CourtQuery) -> Option<Cost> {
    match query {
        CourtQuery::Search(_) => None,
        _ => args.cost,
    }
}

/// Drops records with a different cost. The continuation state is left as the
/// store returned it, so the page may be shorter than requested even when
/// more matching records follow.
pub fn filter_page_by_cost(page: Page<Court>, cost: Cost) -> Page<Court> {
    Page {
        page: page.page.into_iter().filter(|c| c.cost == cost).collect(),
        ..page
    }
}
