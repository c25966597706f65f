//! The five recommendation strategies and the "by book" composite.
//!
//! Every strategy takes a free-text input and returns one labeled result
//! list. "Not found" is a normal outcome carried as an empty list with an
//! explanatory label; nothing here returns an error or panics on missing
//! data. All lookups run against the immutable snapshot loaded at startup.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bookrec_core::{
    AggregateEntry, BookRecord, MergedRow, RecommendationList, RecommendedBook, Snapshot,
};

const MAX_RECOMMENDATIONS: usize = 5;

const MIN_QUERY_YEAR: i32 = 1900;
const MAX_QUERY_YEAR: i32 = 2022;

/// Category column shared by the author and publisher strategies.
#[derive(Debug, Clone, Copy)]
enum SharedField {
    Author,
    Publisher,
}

impl SharedField {
    fn name(self) -> &'static str {
        match self {
            SharedField::Author => "author",
            SharedField::Publisher => "publisher",
        }
    }

    fn value(self, entry: &AggregateEntry) -> &str {
        match self {
            SharedField::Author => &entry.author,
            SharedField::Publisher => &entry.publisher,
        }
    }
}

/// A year query is either an integer year or a title to resolve one from.
enum YearQuery {
    Year(i32),
    Title(String),
}

impl YearQuery {
    fn parse(input: &str) -> Self {
        match input.trim().parse::<i32>() {
            Ok(year) => YearQuery::Year(year),
            Err(_) => YearQuery::Title(input.to_lowercase()),
        }
    }
}

/// Query-time engine over the precomputed snapshot.
///
/// Holds the snapshot behind an `Arc` plus a title lookup built once at
/// construction; request handlers share it read-only.
pub struct RecommendationEngine {
    snapshot: Arc<Snapshot>,
    /// First book-table index per exact title.
    book_by_title: HashMap<String, usize>,
}

impl RecommendationEngine {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        let mut book_by_title = HashMap::new();
        for (index, book) in snapshot.books.iter().enumerate() {
            book_by_title.entry(book.title.clone()).or_insert(index);
        }
        Self {
            snapshot,
            book_by_title,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn book_by_title(&self, title: &str) -> Option<&BookRecord> {
        self.book_by_title
            .get(title)
            .map(|&index| &self.snapshot.books[index])
    }

    /// Item-item similarity lookup: exact (case-sensitive) title match into
    /// the pivot index, then the best-scoring other rows of that title's
    /// similarity row.
    pub fn by_collaborative_similarity(&self, title: &str) -> RecommendationList {
        let Some(index) = self.snapshot.pivot.position(title) else {
            return RecommendationList::empty("oops! No trending recommendations for the input");
        };

        let mut scored: Vec<(usize, f32)> = self
            .snapshot
            .similarity
            .row(index)
            .iter()
            .copied()
            .enumerate()
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut books = Vec::new();
        // The best-scoring entry is the title itself (self-similarity 1.0).
        for (column, _) in scored.into_iter().skip(1).take(MAX_RECOMMENDATIONS) {
            let Some(similar_title) = self.snapshot.pivot.titles.get(column) else {
                continue;
            };
            // A pivot title with no book row is skipped, not an error.
            let Some(book) = self.book_by_title(similar_title) else {
                continue;
            };
            books.push(book_item(book));
        }
        RecommendationList::new("Top trending similar books", books)
    }

    /// Books sharing the seed book's author.
    pub fn by_author(&self, title: &str) -> RecommendationList {
        self.by_shared_field(title, SharedField::Author)
    }

    /// Books sharing the seed book's publisher.
    pub fn by_publisher(&self, title: &str) -> RecommendationList {
        self.by_shared_field(title, SharedField::Publisher)
    }

    fn by_shared_field(&self, title: &str, field: SharedField) -> RecommendationList {
        let needle = title.to_lowercase();
        let Some(seed) = self
            .snapshot
            .aggregate
            .iter()
            .find(|entry| entry.title.to_lowercase().contains(&needle))
        else {
            return RecommendationList::empty(format!(
                "Oops! No {} recommendations for the input",
                field.name()
            ));
        };

        let value = field.value(seed).to_string();
        // Cap to 5 BEFORE excluding the seed row, so 4-5 results survive.
        let books: Vec<RecommendedBook> = self
            .snapshot
            .aggregate
            .iter()
            .filter(|entry| field.value(entry) == value)
            .take(MAX_RECOMMENDATIONS)
            .filter(|entry| entry.title.to_lowercase() != needle)
            .map(aggregate_item)
            .collect();

        RecommendationList::new(format!("Top Books with same {}", field.name()), books)
    }

    /// Top books whose author name itself matches the input.
    pub fn by_given_author(&self, author_name: &str) -> RecommendationList {
        self.by_given_category(author_name, SharedField::Author)
    }

    /// Top books whose publisher name itself matches the input.
    pub fn by_given_publisher(&self, publisher_name: &str) -> RecommendationList {
        self.by_given_category(publisher_name, SharedField::Publisher)
    }

    fn by_given_category(&self, name: &str, field: SharedField) -> RecommendationList {
        let needle = name.to_lowercase();
        let books: Vec<RecommendedBook> = self
            .snapshot
            .aggregate
            .iter()
            .filter(|entry| field.value(entry).to_lowercase().contains(&needle))
            .take(MAX_RECOMMENDATIONS)
            .map(aggregate_item)
            .collect();

        if books.is_empty() {
            return RecommendationList::empty(format!(
                "Oops! No {} recommendations for the input",
                field.name()
            ));
        }
        RecommendationList::new(
            format!("Similar top Books by given {}", field.name()),
            books,
        )
    }

    /// Top-rated books published the same year. The input is either an
    /// integer year (validated against 1900-2022) or a title substring the
    /// year is resolved from.
    pub fn by_year(&self, input: &str) -> RecommendationList {
        let year = match YearQuery::parse(input) {
            YearQuery::Year(year) => {
                if !(MIN_QUERY_YEAR..=MAX_QUERY_YEAR).contains(&year) {
                    return RecommendationList::empty(
                        "oops! Please input the valid year between 1900 - 2022",
                    );
                }
                year
            }
            YearQuery::Title(needle) => {
                let Some(seed) = self
                    .snapshot
                    .merged
                    .iter()
                    .find(|row| row.title.to_lowercase().contains(&needle))
                else {
                    return RecommendationList::empty(
                        "oops! No yearly recommendations for the input",
                    );
                };
                seed.year_of_publication
            }
        };

        let rows: Vec<&MergedRow> = self
            .snapshot
            .merged
            .iter()
            .filter(|row| row.year_of_publication == year)
            .collect();
        if rows.is_empty() {
            return RecommendationList::empty("oops! No recommendations for year input");
        }
        RecommendationList::new("Trending books in the same year", top_rated(rows))
    }

    /// Top-rated books rated by users in the given place. The place matches
    /// city OR state OR country, exactly, case-insensitively.
    pub fn by_location(&self, place: &str) -> RecommendationList {
        let needle = place.to_lowercase();
        self.location_matches(&needle, &needle, &needle)
    }

    /// Like `by_location`, but the place comes from the seed book's own
    /// raters: books rated by people in the same place as raters of this
    /// book.
    pub fn by_book_location(&self, title: &str) -> RecommendationList {
        let needle = title.to_lowercase();
        let Some(seed) = self
            .snapshot
            .merged
            .iter()
            .find(|row| row.title.to_lowercase().contains(&needle))
        else {
            return RecommendationList::empty("oops! No recommendations for place input");
        };
        self.location_matches(
            &seed.city.to_lowercase(),
            &seed.state.to_lowercase(),
            &seed.country.to_lowercase(),
        )
    }

    fn location_matches(&self, city: &str, state: &str, country: &str) -> RecommendationList {
        let rows: Vec<&MergedRow> = self
            .snapshot
            .merged
            .iter()
            .filter(|row| {
                row.city.to_lowercase() == city
                    || row.state.to_lowercase() == state
                    || row.country.to_lowercase() == country
            })
            .collect();
        if rows.is_empty() {
            return RecommendationList::empty("oops! No recommendations for place input");
        }
        RecommendationList::new("Trending books at the same location", top_rated(rows))
    }

    /// The composite endpoint: every strategy once, in a fixed order,
    /// keeping only non-empty results.
    pub fn by_book(&self, title: &str) -> Vec<RecommendationList> {
        let results = [
            self.by_collaborative_similarity(title),
            self.by_author(title),
            self.by_publisher(title),
            self.by_year(title),
            self.by_book_location(title),
        ];

        let mut kept: Vec<RecommendationList> = results
            .into_iter()
            .filter(|result| !result.is_empty())
            .collect();
        if kept.is_empty() {
            kept.push(RecommendationList::empty("No books found!"));
        }
        kept
    }
}

fn book_item(book: &BookRecord) -> RecommendedBook {
    RecommendedBook {
        name: book.title.clone(),
        cover: book.cover_image_url.clone(),
        author: book.author.clone(),
    }
}

fn aggregate_item(entry: &AggregateEntry) -> RecommendedBook {
    RecommendedBook {
        name: entry.title.clone(),
        cover: entry.cover_image_url.clone(),
        author: entry.author.clone(),
    }
}

/// Descending by rating (stable), top 5 rows, then de-duplicate by title.
fn top_rated(mut rows: Vec<&MergedRow>) -> Vec<RecommendedBook> {
    rows.sort_by(|a, b| b.rating.cmp(&a.rating));
    rows.truncate(MAX_RECOMMENDATIONS);

    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.title.as_str()))
        .map(|row| RecommendedBook {
            name: row.title.clone(),
            cover: row.cover_image_url.clone(),
            author: row.author.clone(),
        })
        .collect()
}
