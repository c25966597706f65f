//! End-to-end pipeline test: raw CSV tables in, loadable snapshot out.

use std::path::PathBuf;

use bookrec_core::snapshot::{self, Snapshot};
use bookrec_preprocess::config::{DatasetConfig, SnapshotConfig};
use bookrec_preprocess::PreprocessConfig;

fn setup_dataset(dir: &PathBuf) {
    std::fs::create_dir_all(dir).unwrap();

    let mut books = String::from(
        "ISBN,Book-Title,Book-Author,Year-Of-Publication,Publisher,Image-URL-S,Image-URL-M,Image-URL-L\n",
    );
    books.push_str("1111,Dune,Frank Herbert,1990,Ace,s1,m1,l1\n");
    books.push_str("2222,Hyperion,Dan Simmons,1989,Doubleday,s2,m2,l2\n");
    // Missing author, bad year: cleaning must repair both.
    books.push_str("3333,Mystery Book,,0,,s3,m3,l3\n");
    std::fs::write(dir.join("Books.csv"), books).unwrap();

    let mut ratings = String::from("User-ID,ISBN,Book-Rating\n");
    ratings.push_str("1,1111,9\n");
    ratings.push_str("1,2222,7\n");
    ratings.push_str("2,1111,0\n");
    ratings.push_str("2,3333,5\n");
    std::fs::write(dir.join("Ratings.csv"), ratings).unwrap();

    let mut users = String::from("User-ID,Location,Age\n");
    users.push_str("1,\"portland, oregon, usa\",30.0\n");
    users.push_str("2,\"toronto, ontario, canada\",\n");
    std::fs::write(dir.join("Users.csv"), users).unwrap();
}

fn pipeline_config(root: &PathBuf) -> PreprocessConfig {
    PreprocessConfig {
        dataset: DatasetConfig {
            books: root.join("dataset/Books.csv"),
            ratings: root.join("dataset/Ratings.csv"),
            users: root.join("dataset/Users.csv"),
        },
        snapshot: SnapshotConfig {
            dir: root.join("snapshot"),
        },
    }
}

#[test]
fn test_pipeline_produces_loadable_snapshot() {
    let root = std::env::temp_dir().join(format!("bookrec-pipeline-{}", std::process::id()));
    setup_dataset(&root.join("dataset"));

    let config = pipeline_config(&root);
    bookrec_preprocess::run(&config).unwrap();

    let loaded = Snapshot::load(&config.snapshot.dir).unwrap();
    assert_eq!(loaded.books.len(), 3);
    assert_eq!(loaded.merged.len(), 4);

    // Cleaning applied before merging.
    let mystery = loaded
        .books
        .iter()
        .find(|b| b.isbn == "3333")
        .expect("cleaned book present");
    assert_eq!(mystery.author, "Other");
    assert_eq!(mystery.publisher, "Other");
    assert_eq!(mystery.year_of_publication, 2002);

    // Missing age imputed from the only in-range age.
    assert!(loaded
        .merged
        .iter()
        .filter(|row| row.user_id == 2)
        .all(|row| row.age == 30 && row.country == "canada"));

    // Aggregate covers every rated title, zero ratings included.
    assert_eq!(loaded.aggregate.len(), 3);
    let dune = loaded
        .aggregate
        .iter()
        .find(|e| e.title == "Dune")
        .expect("aggregate entry");
    assert_eq!(dune.rating_count, 2);
    assert!((dune.average_rating - 4.5).abs() < 1e-9);

    // No user reaches the experienced threshold in this tiny dataset.
    assert!(loaded.pivot.titles.is_empty());

    // Top-books table persists beside the snapshot (empty here: no title
    // reaches 200 nonzero ratings).
    let top_books = snapshot::load_top_books(&config.snapshot.dir).unwrap();
    assert!(top_books.is_empty());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_pipeline_fails_fast_on_missing_table() {
    let root = std::env::temp_dir().join(format!("bookrec-pipeline-missing-{}", std::process::id()));
    std::fs::create_dir_all(&root).unwrap();

    let config = pipeline_config(&root);
    let err = bookrec_preprocess::run(&config).unwrap_err();
    assert!(err.to_string().contains("books"));

    // Nothing was derived or written.
    assert!(!config.snapshot.dir.exists());

    std::fs::remove_dir_all(&root).ok();
}
