//! Row filters: inclusive ranges and loose genre matching, as polars
//! expressions over the cleaned frame.

use polars::prelude::*;

use super::frame::{GENRE, PAGES, RATING};
use crate::models::{FilterParams, Interval};

/// `lo <= column <= hi`. Null never matches.
pub fn in_range<T: Literal + Copy>(column: &str, interval: &Interval<T>) -> Expr {
    col(column).is_between(lit(interval.lo), lit(interval.hi), ClosedInterval::Both)
}

/// Any selected genre is a substring of the raw genre field.
///
/// Substring, not tag equality: "Fiction" matches "Science Fiction".
/// An empty selection matches everything.
pub fn matches_genres(selected: &[String]) -> Expr {
    selected
        .iter()
        .map(|g| col(GENRE).str().contains_literal(lit(g.as_str())))
        .reduce(|acc, e| acc.or(e))
        .unwrap_or_else(|| lit(true))
}

/// Rating, pages and genre conditions combined.
pub fn filter_expr(params: &FilterParams) -> Expr {
    in_range(RATING, &params.rating)
        .and(in_range(PAGES, &params.pages))
        .and(matches_genres(&params.genres))
}

/// Keep books passing every filter, in input order.
pub fn apply_filters(books: &DataFrame, params: &FilterParams) -> PolarsResult<DataFrame> {
    books.clone().lazy().filter(filter_expr(params)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookRecord;
    use crate::transform::frame::{records, to_frame};

    fn book(title: &str, rating: f64, pages: Option<u32>, genre: &str) -> BookRecord {
        BookRecord {
            title: title.into(),
            author: "Someone".into(),
            rating,
            reviews: Some(1),
            pages,
            genre: genre.into(),
            bookformat: Some("Paperback".into()),
        }
    }

    fn params(genres: &[&str], rating: (f64, f64), pages: (u32, u32)) -> FilterParams {
        FilterParams {
            genres: genres.iter().map(|g| g.to_string()).collect(),
            rating: Interval { lo: rating.0, hi: rating.1 },
            pages: Interval { lo: pages.0, hi: pages.1 },
        }
    }

    fn titles(books: &[BookRecord], params: &FilterParams) -> Vec<String> {
        let df = to_frame(books).unwrap();
        let kept = apply_filters(&df, params).unwrap();
        records(&kept).unwrap().into_iter().map(|b| b.title).collect()
    }

    #[test]
    fn test_range_and_semantics() {
        let books = vec![
            book("in", 4.0, Some(200), "Drama"),
            book("rating-out", 2.0, Some(200), "Drama"),
            book("pages-out", 4.0, Some(900), "Drama"),
            book("edge", 3.0, Some(500), "Drama"),
        ];
        assert_eq!(titles(&books, &params(&[], (3.0, 5.0), (50, 500))), vec!["in", "edge"]);
    }

    #[test]
    fn test_missing_pages_never_in_range() {
        let books = vec![book("no-pages", 4.0, None, "Drama")];
        assert!(titles(&books, &params(&[], (0.0, 5.0), (0, u32::MAX))).is_empty());
    }

    #[test]
    fn test_genre_substring_match() {
        let books = vec![
            book("historical", 4.0, Some(10), "Historical Fiction, Drama"),
            book("scifi", 4.0, Some(10), "Science Fiction"),
            book("romance", 4.0, Some(10), "Romance"),
        ];
        let p = params(&["Fiction", "Horror"], (0.0, 5.0), (0, 10));
        assert_eq!(titles(&books, &p), vec!["historical", "scifi"]);
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let books = vec![book("a", 4.0, Some(10), "X"), book("b", 4.5, Some(20), "Y")];
        let p = params(&[], (0.0, 5.0), (10, 20));
        assert_eq!(titles(&books, &p), vec!["a", "b"]);
    }

    #[test]
    fn test_filters_preserve_order() {
        let books = vec![
            book("c", 3.5, Some(10), "Fantasy"),
            book("a", 4.9, Some(10), "Fantasy"),
            book("b", 4.1, Some(10), "Fantasy"),
        ];
        let p = params(&["Fantasy"], (0.0, 5.0), (0, 10));
        assert_eq!(titles(&books, &p), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_no_match_yields_empty_frame() {
        let books = vec![book("a", 4.0, Some(10), "Drama")];
        let df = to_frame(&books).unwrap();
        let kept = apply_filters(&df, &params(&["Poetry"], (0.0, 5.0), (0, 10))).unwrap();
        assert_eq!(kept.height(), 0);
        assert_eq!(kept.width(), df.width());
    }
}
