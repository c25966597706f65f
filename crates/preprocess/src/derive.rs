//! Artifact derivation over the cleaned tables.
//!
//! Builds, in dependency order: the merged dataset, the popularity table,
//! the aggregate-rating table, the title x user pivot matrix and the
//! item-item cosine similarity matrix.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use ndarray::Array2;
use tracing::info;

use bookrec_core::{
    AggregateEntry, BookRecord, MergedRow, PivotTable, PopularEntry, RatingEvent, Snapshot,
    UserRecord,
};

/// Minimum nonzero ratings for a title to reach the landing-page table.
const MIN_POPULAR_RATINGS: u32 = 200;
/// Minimum merged rows for a user to count as experienced.
const MIN_EXPERIENCED_USER_ROWS: usize = 200;
/// Minimum rows among experienced users for a title to count as well-known.
const MIN_WELL_KNOWN_TITLE_ROWS: usize = 50;

/// Everything the pipeline persists: the query snapshot plus the
/// landing-page popularity table.
pub struct DerivedArtifacts {
    pub snapshot: Snapshot,
    pub top_books: Vec<PopularEntry>,
}

/// Inner join of books x ratings on isbn, then x users on user id.
///
/// One row per rating event whose book and user both resolved; row order
/// follows the ratings table, which keeps every derived sort deterministic.
pub fn merge(
    books: &[BookRecord],
    ratings: &[RatingEvent],
    users: &[UserRecord],
) -> Vec<MergedRow> {
    let mut book_by_isbn: HashMap<&str, &BookRecord> = HashMap::new();
    for book in books {
        book_by_isbn.entry(book.isbn.as_str()).or_insert(book);
    }
    let mut user_by_id: HashMap<u32, &UserRecord> = HashMap::new();
    for user in users {
        user_by_id.entry(user.user_id).or_insert(user);
    }

    let mut merged = Vec::new();
    for rating in ratings {
        let Some(book) = book_by_isbn.get(rating.isbn.as_str()) else {
            continue;
        };
        let Some(user) = user_by_id.get(&rating.user_id) else {
            continue;
        };
        merged.push(MergedRow {
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            publisher: book.publisher.clone(),
            year_of_publication: book.year_of_publication,
            cover_image_url: book.cover_image_url.clone(),
            user_id: user.user_id,
            rating: rating.rating,
            age: user.age,
            city: user.city.clone(),
            state: user.state.clone(),
            country: user.country.clone(),
        });
    }
    merged
}

struct TitleStats {
    count: u32,
    sum: f64,
}

impl TitleStats {
    fn average(&self) -> f64 {
        self.sum / f64::from(self.count)
    }
}

fn title_stats<'a, I>(rows: I) -> (Vec<&'a str>, HashMap<&'a str, TitleStats>)
where
    I: IntoIterator<Item = &'a MergedRow>,
{
    let mut order: Vec<&'a str> = Vec::new();
    let mut stats: HashMap<&'a str, TitleStats> = HashMap::new();
    for row in rows {
        let entry = stats.entry(row.title.as_str()).or_insert_with(|| {
            order.push(row.title.as_str());
            TitleStats { count: 0, sum: 0.0 }
        });
        entry.count += 1;
        entry.sum += f64::from(row.rating);
    }
    (order, stats)
}

/// One representative book row per title: first occurrence in table order.
fn representative_books(books: &[BookRecord]) -> HashMap<&str, &BookRecord> {
    let mut map: HashMap<&str, &BookRecord> = HashMap::new();
    for book in books {
        map.entry(book.title.as_str()).or_insert(book);
    }
    map
}

/// Per-title popularity over nonzero ratings only, filtered to titles with
/// at least 200 of them, sorted descending by average rating.
pub fn popularity_table(merged: &[MergedRow], books: &[BookRecord]) -> Vec<PopularEntry> {
    let (order, stats) = title_stats(merged.iter().filter(|r| r.rating != 0));
    let representatives = representative_books(books);

    let mut entries = Vec::new();
    for title in order {
        let s = &stats[title];
        if s.count < MIN_POPULAR_RATINGS {
            continue;
        }
        let Some(book) = representatives.get(title) else {
            continue;
        };
        entries.push(PopularEntry {
            title: title.to_string(),
            author: book.author.clone(),
            cover_image_url: book.cover_image_url.clone(),
            rating_count: s.count,
            average_rating: s.average(),
        });
    }
    entries.sort_by(|a, b| {
        b.average_rating
            .partial_cmp(&a.average_rating)
            .unwrap_or(Ordering::Equal)
    });
    entries
}

/// Per-title aggregate over ALL ratings, zero ratings included, sorted
/// descending by count x average. Ties keep merge order (stable sort).
pub fn aggregate_table(merged: &[MergedRow], books: &[BookRecord]) -> Vec<AggregateEntry> {
    let (order, stats) = title_stats(merged.iter());
    let representatives = representative_books(books);

    let mut entries = Vec::new();
    for title in order {
        let s = &stats[title];
        let Some(book) = representatives.get(title) else {
            continue;
        };
        let average_rating = s.average();
        entries.push(AggregateEntry {
            title: title.to_string(),
            rating_count: s.count,
            average_rating,
            aggregated_rating: f64::from(s.count) * average_rating,
            author: book.author.clone(),
            publisher: book.publisher.clone(),
            cover_image_url: book.cover_image_url.clone(),
        });
    }
    entries.sort_by(|a, b| {
        b.aggregated_rating
            .partial_cmp(&a.aggregated_rating)
            .unwrap_or(Ordering::Equal)
    });
    entries
}

/// Title x user rating matrix over experienced users (>= 200 merged rows)
/// rating well-known titles (>= 50 rows among those users). Duplicate
/// (title, user) cells hold the mean of their ratings; absent cells 0.
pub fn pivot_table(merged: &[MergedRow]) -> PivotTable {
    let mut rows_per_user: HashMap<u32, usize> = HashMap::new();
    for row in merged {
        *rows_per_user.entry(row.user_id).or_default() += 1;
    }
    let experienced: HashSet<u32> = rows_per_user
        .into_iter()
        .filter(|(_, n)| *n >= MIN_EXPERIENCED_USER_ROWS)
        .map(|(user_id, _)| user_id)
        .collect();

    let experienced_rows: Vec<&MergedRow> = merged
        .iter()
        .filter(|r| experienced.contains(&r.user_id))
        .collect();

    let mut rows_per_title: HashMap<&str, usize> = HashMap::new();
    for row in &experienced_rows {
        *rows_per_title.entry(row.title.as_str()).or_default() += 1;
    }

    let mut titles: Vec<String> = rows_per_title
        .into_iter()
        .filter(|(_, n)| *n >= MIN_WELL_KNOWN_TITLE_ROWS)
        .map(|(title, _)| title.to_string())
        .collect();
    titles.sort();

    let title_index: HashMap<&str, usize> = titles
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let mut user_ids: Vec<u32> = experienced_rows
        .iter()
        .filter(|r| title_index.contains_key(r.title.as_str()))
        .map(|r| r.user_id)
        .collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let user_index: HashMap<u32, usize> = user_ids
        .iter()
        .enumerate()
        .map(|(i, u)| (*u, i))
        .collect();

    let mut matrix = Array2::<f32>::zeros((titles.len(), user_ids.len()));
    let mut counts = Array2::<u32>::zeros((titles.len(), user_ids.len()));
    for row in &experienced_rows {
        let Some(&i) = title_index.get(row.title.as_str()) else {
            continue;
        };
        let j = user_index[&row.user_id];
        matrix[[i, j]] += f32::from(row.rating);
        counts[[i, j]] += 1;
    }
    for ((i, j), &count) in counts.indexed_iter() {
        if count > 1 {
            matrix[[i, j]] /= count as f32;
        }
    }

    PivotTable { titles, matrix }
}

/// Row-wise cosine similarity of the pivot matrix: symmetric, diagonal 1.0
/// for every nonzero row.
pub fn similarity_matrix(pivot: &PivotTable) -> Array2<f32> {
    let mut normed = pivot.matrix.clone();
    for mut row in normed.rows_mut() {
        let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        }
    }
    normed.dot(&normed.t())
}

/// Build every artifact in dependency order.
pub fn derive(
    books: &[BookRecord],
    ratings: &[RatingEvent],
    users: &[UserRecord],
) -> DerivedArtifacts {
    let merged = merge(books, ratings, users);
    info!(rows = merged.len(), "merged ratings dataset");

    let top_books = popularity_table(&merged, books);
    let aggregate = aggregate_table(&merged, books);
    info!(
        popular = top_books.len(),
        aggregated = aggregate.len(),
        "derived rating tables"
    );

    let pivot = pivot_table(&merged);
    let similarity = similarity_matrix(&pivot);
    info!(titles = pivot.titles.len(), "computed item-item similarity");

    DerivedArtifacts {
        snapshot: Snapshot {
            merged,
            aggregate,
            books: books.to_vec(),
            pivot,
            similarity,
        },
        top_books,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(isbn: &str, title: &str, author: &str) -> BookRecord {
        BookRecord {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            publisher: "Ace".to_string(),
            year_of_publication: 1990,
            cover_image_url: format!("http://covers/{isbn}-m.jpg"),
        }
    }

    fn user(user_id: u32) -> UserRecord {
        UserRecord {
            user_id,
            age: 30,
            city: "portland".to_string(),
            state: "oregon".to_string(),
            country: "usa".to_string(),
        }
    }

    fn rating(user_id: u32, isbn: &str, rating: u8) -> RatingEvent {
        RatingEvent {
            user_id,
            isbn: isbn.to_string(),
            rating,
        }
    }

    fn merged_row(title: &str, user_id: u32, rating: u8) -> MergedRow {
        MergedRow {
            isbn: title.to_string(),
            title: title.to_string(),
            author: "a".to_string(),
            publisher: "p".to_string(),
            year_of_publication: 1990,
            cover_image_url: "c".to_string(),
            user_id,
            rating,
            age: 30,
            city: "portland".to_string(),
            state: "oregon".to_string(),
            country: "usa".to_string(),
        }
    }

    #[test]
    fn test_merge_is_an_inner_join() {
        let books = vec![book("1", "Dune", "Herbert")];
        let users = vec![user(10)];
        let ratings = vec![
            rating(10, "1", 9),
            rating(10, "unknown-isbn", 9),
            rating(99, "1", 9),
        ];

        let merged = merge(&books, &ratings, &users);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "Dune");
        assert_eq!(merged[0].user_id, 10);
    }

    #[test]
    fn test_popularity_excludes_zero_ratings_and_applies_threshold() {
        let books = vec![book("1", "Popular", "A"), book("2", "Obscure", "B")];
        let users: Vec<UserRecord> = (0..250).map(user).collect();
        let mut ratings = Vec::new();
        for user_id in 0..200 {
            ratings.push(rating(user_id, "1", 8));
        }
        // Zero ratings must not count toward the threshold.
        for user_id in 200..250 {
            ratings.push(rating(user_id, "1", 0));
        }
        for user_id in 0..5 {
            ratings.push(rating(user_id, "2", 10));
        }

        let merged = merge(&books, &ratings, &users);
        let top = popularity_table(&merged, &books);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].title, "Popular");
        assert_eq!(top[0].rating_count, 200);
        assert!((top[0].average_rating - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_includes_zero_ratings_and_sorts_by_aggregated() {
        let books = vec![book("1", "First", "A"), book("2", "Second", "B")];
        let users = vec![user(1), user(2), user(3)];
        // "First": ratings [10] -> aggregated 10. "Second": [6, 6, 0] ->
        // count 3, average 4, aggregated 12.
        let ratings = vec![
            rating(1, "1", 10),
            rating(1, "2", 6),
            rating(2, "2", 6),
            rating(3, "2", 0),
        ];

        let merged = merge(&books, &ratings, &users);
        let aggregate = aggregate_table(&merged, &books);
        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate[0].title, "Second");
        assert_eq!(aggregate[0].rating_count, 3);
        assert!((aggregate[0].average_rating - 4.0).abs() < 1e-9);
        assert!((aggregate[0].aggregated_rating - 12.0).abs() < 1e-9);
        assert_eq!(aggregate[1].title, "First");
    }

    #[test]
    fn test_aggregate_build_is_deterministic() {
        let books = vec![book("1", "First", "A"), book("2", "Second", "B")];
        let users = vec![user(1), user(2)];
        // Same aggregated rating for both titles: ties keep merge order.
        let ratings = vec![rating(1, "1", 8), rating(2, "2", 8)];

        let merged = merge(&books, &ratings, &users);
        let first = aggregate_table(&merged, &books);
        let second = aggregate_table(&merged, &books);
        assert_eq!(first, second);
        assert_eq!(first[0].title, "First");
        assert_eq!(first[1].title, "Second");
    }

    #[test]
    fn test_pivot_filters_to_experienced_users_and_well_known_titles() {
        let mut merged = Vec::new();
        // User 1 is experienced: 200 rows spread over "Known" and filler
        // titles. User 2 is not (a single row).
        for i in 0..150 {
            merged.push(merged_row("Known", 1, (i % 10) as u8));
        }
        for i in 0..50 {
            merged.push(merged_row(&format!("Filler {i}"), 1, 5));
        }
        merged.push(merged_row("Known", 2, 9));

        let pivot = pivot_table(&merged);
        assert_eq!(pivot.titles, vec!["Known".to_string()]);
        // Only the experienced user contributes a column.
        assert_eq!(pivot.matrix.ncols(), 1);
        assert_eq!(pivot.matrix.nrows(), 1);
    }

    #[test]
    fn test_pivot_duplicate_cells_hold_the_mean() {
        let mut merged = Vec::new();
        for _ in 0..100 {
            merged.push(merged_row("Twice Rated", 1, 4));
        }
        for _ in 0..100 {
            merged.push(merged_row("Twice Rated", 1, 8));
        }

        let pivot = pivot_table(&merged);
        assert_eq!(pivot.titles, vec!["Twice Rated".to_string()]);
        assert!((pivot.matrix[[0, 0]] - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_diagonal_and_symmetry() {
        let pivot = PivotTable {
            titles: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            matrix: ndarray::array![
                [5.0, 0.0, 3.0],
                [5.0, 0.0, 3.0],
                [0.0, 7.0, 0.0]
            ],
        };

        let similarity = similarity_matrix(&pivot);
        for i in 0..3 {
            assert!((similarity[[i, i]] - 1.0).abs() < 1e-5);
        }
        for i in 0..3 {
            for j in 0..3 {
                assert!((similarity[[i, j]] - similarity[[j, i]]).abs() < 1e-5);
            }
        }
        // Identical rows are fully similar, orthogonal rows are not at all.
        assert!((similarity[[0, 1]] - 1.0).abs() < 1e-5);
        assert!(similarity[[0, 2]].abs() < 1e-5);
    }
}
