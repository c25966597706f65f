//! Data cleaning for the raw books and users tables.
//!
//! Books: fill every missing author/publisher, repair the known rows whose
//! publisher landed in the year field, coerce years. Users: split the
//! location string, impute out-of-range ages.

use bookrec_core::{BookRecord, UserRecord};

use crate::ingest::{RawBookRow, RawUserRow};

const MISSING_PLACEHOLDER: &str = "Other";

const FALLBACK_YEAR: i32 = 2002;
const MAX_YEAR: i32 = 2022;

const MIN_VALID_AGE: f32 = 8.0;
const MAX_VALID_AGE: f32 = 98.0;

/// Rows in the historical dataset where the publisher name was misparsed
/// into the year field, keyed by ISBN: (isbn, corrected year, publisher).
const YEAR_FIELD_REPAIRS: [(&str, i32, &str); 3] = [
    ("078946697X", 2000, "DK Publishing Inc"),
    ("0789466953", 2000, "DK Publishing Inc"),
    ("2070426769", 2003, "Gallimard"),
];

/// Clean the raw book table. Only the medium-resolution cover URL survives.
pub fn clean_books(rows: Vec<RawBookRow>) -> Vec<BookRecord> {
    rows.into_iter().map(clean_book).collect()
}

fn clean_book(row: RawBookRow) -> BookRecord {
    let mut author = fill_missing(row.author);
    let mut publisher = fill_missing(row.publisher);

    let year = match YEAR_FIELD_REPAIRS
        .iter()
        .find(|(isbn, _, _)| *isbn == row.isbn)
    {
        Some((_, repaired_year, repaired_publisher)) => {
            author = MISSING_PLACEHOLDER.to_string();
            publisher = (*repaired_publisher).to_string();
            *repaired_year
        }
        None => coerce_year(&row.year_of_publication),
    };

    BookRecord {
        isbn: row.isbn,
        title: row.title,
        author,
        publisher,
        year_of_publication: year,
        cover_image_url: row.image_url_m,
    }
}

fn fill_missing(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => MISSING_PLACEHOLDER.to_string(),
    }
}

/// Years above 2022, equal to 0, or unparseable all collapse to the fixed
/// fallback of 2002.
fn coerce_year(raw: &str) -> i32 {
    match raw.trim().parse::<i32>() {
        Ok(year) if year != 0 && year <= MAX_YEAR => year,
        _ => FALLBACK_YEAR,
    }
}

/// Clean the raw user table: split "City, State, Country", normalize missing
/// segments, impute ages outside [8, 98] with the rounded mean of in-range
/// ages.
pub fn clean_users(rows: Vec<RawUserRow>) -> Vec<UserRecord> {
    let imputed_age = imputed_mean_age(&rows);
    rows.into_iter()
        .map(|row| {
            let (city, state, country) = split_location(&row.location);
            let age = match row.age {
                Some(age) if in_valid_age_range(age) => age.round() as u8,
                _ => imputed_age,
            };
            UserRecord {
                user_id: row.user_id,
                age,
                city,
                state,
                country,
            }
        })
        .collect()
}

fn in_valid_age_range(age: f32) -> bool {
    (MIN_VALID_AGE..=MAX_VALID_AGE).contains(&age)
}

fn imputed_mean_age(rows: &[RawUserRow]) -> u8 {
    let mut sum = 0.0_f64;
    let mut count = 0_u32;
    for row in rows {
        if let Some(age) = row.age {
            if in_valid_age_range(age) {
                sum += f64::from(age);
                count += 1;
            }
        }
    }
    if count == 0 {
        return ((MIN_VALID_AGE + MAX_VALID_AGE) / 2.0) as u8;
    }
    (sum / f64::from(count)).round() as u8
}

fn split_location(raw: &str) -> (String, String, String) {
    let mut parts = raw.splitn(3, ", ");
    let city = normalize_segment(parts.next());
    let state = normalize_segment(parts.next());
    let country = normalize_segment(parts.next());
    (city, state, country)
}

/// Missing, empty, "n/a" and ellipsis segments all become the lower-cased
/// placeholder.
fn normalize_segment(segment: Option<&str>) -> String {
    match segment {
        Some(s)
            if !s.trim().is_empty()
                && !s.eq_ignore_ascii_case("n/a")
                && !s.chars().all(|c| c == '.') =>
        {
            s.to_lowercase()
        }
        _ => MISSING_PLACEHOLDER.to_lowercase(),
    }
}
