use libsql::Connection;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A stored book: a title plus its full comment list, in insertion order.
///
/// The wire names (`_id`, `commentcount`) predate this service and are kept
/// for the clients that already consume them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: i64,
    pub title: String,
    pub comments: Vec<String>,
}

/// List-view projection. Comment bodies never appear in the list view,
/// only their count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSummary {
    #[serde(rename = "_id")]
    pub id: i64,
    pub title: String,
    #[serde(rename = "commentcount")]
    pub comment_count: i64,
}

/// Projection returned when a book is first created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedBook {
    #[serde(rename = "_id")]
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub comment: Option<String>,
}

pub struct Catalog<'a> {
    conn: &'a Connection,
}

impl<'a> Catalog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Checks the store's id syntax without touching the store. Row ids are
    /// decimal integers, so anything that does not parse as one is
    /// malformed. A run of zeros like `000000000000000000000000` parses to
    /// 0, which the store never assigns, so it falls through to the lookup
    /// as well-formed-but-absent.
    pub fn parse_id(raw: &str) -> Result<i64, CatalogError> {
        raw.parse::<i64>().map_err(|_| CatalogError::InvalidBookId)
    }

    pub async fn list_books(&self) -> Result<Vec<BookSummary>, CatalogError> {
        let query = r#"
            SELECT id, title, json_array_length(comments) AS commentcount
            FROM books
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut books = Vec::new();

        while let Some(row) = rows.next().await? {
            books.push(BookSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                comment_count: row.get(2)?,
            });
        }

        Ok(books)
    }

    pub async fn create_book(&self, title: &str) -> Result<Book, CatalogError> {
        let query = r#"
            INSERT INTO books (title, comments)
            VALUES (?, json_array())
            RETURNING id, title, comments
        "#;

        let mut rows = self.conn.query(query, libsql::params![title]).await?;

        if let Some(row) = rows.next().await? {
            self.row_to_book(&row)
        } else {
            Err(CatalogError::Store(libsql::Error::QueryReturnedNoRows))
        }
    }

    pub async fn get_book(&self, id: i64) -> Result<Option<Book>, CatalogError> {
        let query = r#"
            SELECT id, title, comments
            FROM books WHERE id = ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_book(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Locates the book and appends the comment in one store operation.
    /// Concurrent appends against the same book serialize inside the store,
    /// so neither can overwrite the other's entry.
    pub async fn append_comment(
        &self,
        id: i64,
        comment: &str,
    ) -> Result<Option<Book>, CatalogError> {
        let query = r#"
            UPDATE books
            SET comments = json_insert(comments, '$[#]', ?),
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            RETURNING id, title, comments
        "#;

        let mut rows = self.conn.query(query, libsql::params![comment, id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_book(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn delete_book(&self, id: i64) -> Result<bool, CatalogError> {
        let result = self
            .conn
            .execute("DELETE FROM books WHERE id = ?", libsql::params![id])
            .await?;
        Ok(result > 0)
    }

    pub async fn delete_all_books(&self) -> Result<u64, CatalogError> {
        let result = self.conn.execute("DELETE FROM books", ()).await?;
        Ok(result)
    }

    fn row_to_book(&self, row: &libsql::Row) -> Result<Book, CatalogError> {
        let comments_json: String = row.get(2)?;

        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            comments: serde_json::from_str(&comments_json)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::CatalogError;

    async fn test_db() -> Database {
        Database::in_memory().await.expect("in-memory database")
    }

    #[tokio::test]
    async fn create_then_get_roundtrip() {
        let db = test_db().await;
        let catalog = Catalog::new(db.connection());

        let created = catalog.create_book("Moby-Dick").await.unwrap();
        let fetched = catalog.get_book(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, "Moby-Dick");
        assert!(fetched.comments.is_empty());
    }

    #[tokio::test]
    async fn append_preserves_order_and_title() {
        let db = test_db().await;
        let catalog = Catalog::new(db.connection());

        let book = catalog.create_book("Annotated").await.unwrap();
        for comment in ["first", "second", "third"] {
            catalog
                .append_comment(book.id, comment)
                .await
                .unwrap()
                .unwrap();
        }

        let book = catalog.get_book(book.id).await.unwrap().unwrap();
        assert_eq!(book.comments, vec!["first", "second", "third"]);
        assert_eq!(book.title, "Annotated");
    }

    #[tokio::test]
    async fn append_survives_json_metacharacters() {
        let db = test_db().await;
        let catalog = Catalog::new(db.connection());

        let book = catalog.create_book("Quoted").await.unwrap();
        let comment = r#"she said "wow" and rated it 100% \o/"#;
        let book = catalog
            .append_comment(book.id, comment)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(book.comments, vec![comment]);
    }

    #[tokio::test]
    async fn concurrent_appends_both_land() {
        let db = test_db().await;
        let catalog = Catalog::new(db.connection());

        let book = catalog.create_book("Contended").await.unwrap();
        let (a, b) = tokio::join!(
            catalog.append_comment(book.id, "left"),
            catalog.append_comment(book.id, "right"),
        );
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let book = catalog.get_book(book.id).await.unwrap().unwrap();
        assert_eq!(book.comments.len(), 2);
        assert!(book.comments.contains(&"left".to_string()));
        assert!(book.comments.contains(&"right".to_string()));
    }

    #[tokio::test]
    async fn list_counts_match_detail_lengths() {
        let db = test_db().await;
        let catalog = Catalog::new(db.connection());

        let plain = catalog.create_book("Plain").await.unwrap();
        let commented = catalog.create_book("Commented").await.unwrap();
        catalog
            .append_comment(commented.id, "nice")
            .await
            .unwrap()
            .unwrap();

        let summaries = catalog.list_books().await.unwrap();
        assert_eq!(summaries.len(), 2);

        for summary in summaries {
            let detail = catalog.get_book(summary.id).await.unwrap().unwrap();
            assert_eq!(summary.comment_count as usize, detail.comments.len());
        }

        let plain = catalog.get_book(plain.id).await.unwrap().unwrap();
        assert!(plain.comments.is_empty());
    }

    #[tokio::test]
    async fn absent_book_is_an_explicit_miss() {
        let db = test_db().await;
        let catalog = Catalog::new(db.connection());

        assert!(catalog.get_book(0).await.unwrap().is_none());
        assert!(catalog.append_comment(0, "x").await.unwrap().is_none());
        assert!(!catalog.delete_book(0).await.unwrap());
    }

    #[tokio::test]
    async fn delete_is_idempotent_failure_not_error() {
        let db = test_db().await;
        let catalog = Catalog::new(db.connection());

        let book = catalog.create_book("Ephemeral").await.unwrap();
        assert!(catalog.delete_book(book.id).await.unwrap());
        assert!(!catalog.delete_book(book.id).await.unwrap());
        assert!(catalog.get_book(book.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let db = test_db().await;
        let catalog = Catalog::new(db.connection());

        let first = catalog.create_book("First").await.unwrap();
        assert!(catalog.delete_book(first.id).await.unwrap());

        let second = catalog.create_book("Second").await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn delete_all_empties_the_store() {
        let db = test_db().await;
        let catalog = Catalog::new(db.connection());

        for title in ["One", "Two", "Three"] {
            catalog.create_book(title).await.unwrap();
        }

        assert_eq!(catalog.delete_all_books().await.unwrap(), 3);
        assert!(catalog.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_title_is_rejected_by_the_store_too() {
        // The handler rejects an empty title before any persistence call;
        // the column CHECK is the backstop should anything bypass it.
        let db = test_db().await;
        let catalog = Catalog::new(db.connection());

        assert!(catalog.create_book("").await.is_err());
    }

    #[test]
    fn id_syntax_is_integer_only() {
        assert_eq!(Catalog::parse_id("42").unwrap(), 42);
        assert_eq!(Catalog::parse_id("000000000000000000000000").unwrap(), 0);
        assert!(matches!(
            Catalog::parse_id("not-an-id"),
            Err(CatalogError::InvalidBookId)
        ));
        assert!(matches!(
            Catalog::parse_id(""),
            Err(CatalogError::InvalidBookId)
        ));
    }
}
