use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookSort, BookWithAuthor, NewAuthor},
};

const BOOK_WITH_AUTHOR_COLUMNS: &str = r#"
    SELECT b.id, b.title, b.publication_year, b.isbn, b.rating, b.cover_url, b.author_id,
           a.name AS author_name
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

/// Validated book ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub title: String,
    pub publication_year: Option<i32>,
    pub isbn: Option<String>,
    pub rating: Option<f64>,
    pub cover_url: Option<String>,
    pub author_id: i64,
}

/// Outcome of deleting a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookDeletion {
    /// True when the book was its author's last one and the author went too
    pub author_removed: bool,
}

fn order_clause(sort: BookSort) -> &'static str {
    match sort {
        BookSort::Title => "ORDER BY b.title ASC",
        BookSort::Author => "ORDER BY a.name ASC, b.title ASC",
        BookSort::Year => "ORDER BY b.publication_year IS NULL, b.publication_year DESC",
        BookSort::Rating => "ORDER BY b.rating IS NULL, b.rating DESC",
    }
}

/// Lists books, optionally filtered by a title/author substring
pub async fn list_books(
    pool: &SqlitePool,
    query: Option<&str>,
    sort: BookSort,
) -> AppResult<Vec<BookWithAuthor>> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());

    let books = match query {
        Some(q) => {
            let sql = format!(
                "{} WHERE LOWER(b.title) LIKE LOWER(?1) OR LOWER(a.name) LIKE LOWER(?1) {}",
                BOOK_WITH_AUTHOR_COLUMNS,
                order_clause(sort)
            );
            sqlx::query_as::<_, BookWithAuthor>(&sql)
                .bind(format!("%{}%", q))
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{} {}", BOOK_WITH_AUTHOR_COLUMNS, order_clause(sort));
            sqlx::query_as::<_, BookWithAuthor>(&sql)
                .fetch_all(pool)
                .await?
        }
    };

    tracing::debug!(query = ?query, sort = ?sort, results = books.len(), "Listed books");

    Ok(books)
}

/// All books with their authors, in no particular order
pub async fn all_books(pool: &SqlitePool) -> AppResult<Vec<BookWithAuthor>> {
    let books = sqlx::query_as::<_, BookWithAuthor>(BOOK_WITH_AUTHOR_COLUMNS)
        .fetch_all(pool)
        .await?;
    Ok(books)
}

/// Lists authors ordered by name
pub async fn list_authors(pool: &SqlitePool) -> AppResult<Vec<Author>> {
    let authors = sqlx::query_as::<_, Author>(
        "SELECT id, name, birth_date, date_of_death FROM authors ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(authors)
}

pub async fn get_author(pool: &SqlitePool, id: i64) -> AppResult<Option<Author>> {
    let author = sqlx::query_as::<_, Author>(
        "SELECT id, name, birth_date, date_of_death FROM authors WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(author)
}

pub async fn find_author_by_name(pool: &SqlitePool, name: &str) -> AppResult<Option<Author>> {
    let author = sqlx::query_as::<_, Author>(
        "SELECT id, name, birth_date, date_of_death FROM authors WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(author)
}

/// Inserts an author whose name was already trimmed
///
/// A name that is already taken comes back as `AppError::Conflict`.
pub async fn insert_author(pool: &SqlitePool, author: &NewAuthor) -> AppResult<Author> {
    let inserted = sqlx::query_as::<_, Author>(
        r#"
        INSERT INTO authors (name, birth_date, date_of_death)
        VALUES (?, ?, ?)
        RETURNING id, name, birth_date, date_of_death
        "#,
    )
    .bind(&author.name)
    .bind(author.birth_date)
    .bind(author.date_of_death)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Author already exists.".to_string())
        }
        other => AppError::Database(other),
    })?;

    tracing::info!(author_id = inserted.id, name = %inserted.name, "Author added");

    Ok(inserted)
}

pub async fn insert_book(pool: &SqlitePool, book: &BookRecord) -> AppResult<Book> {
    let inserted = sqlx::query_as::<_, Book>(
        r#"
        INSERT INTO books (title, publication_year, isbn, rating, cover_url, author_id)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, title, publication_year, isbn, rating, cover_url, author_id
        "#,
    )
    .bind(&book.title)
    .bind(book.publication_year)
    .bind(&book.isbn)
    .bind(book.rating)
    .bind(&book.cover_url)
    .bind(book.author_id)
    .fetch_one(pool)
    .await?;

    tracing::info!(book_id = inserted.id, title = %inserted.title, "Book added");

    Ok(inserted)
}

/// Deletes a book, and its author too if no other books remain
pub async fn delete_book(pool: &SqlitePool, id: i64) -> AppResult<BookDeletion> {
    let mut tx = pool.begin().await?;

    let author_id: Option<i64> = sqlx::query_scalar("SELECT author_id FROM books WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let author_id = author_id.ok_or_else(|| AppError::NotFound(format!("Book {}", id)))?;

    sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await?;

    let author_removed = remaining == 0;
    if author_removed {
        sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(author_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(book_id = id, author_id, author_removed, "Book deleted");

    Ok(BookDeletion { author_removed })
}

/// Deletes an author together with all of their books
pub async fn delete_author(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM books WHERE author_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM authors WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Author {}", id)));
    }

    tx.commit().await?;

    tracing::info!(author_id = id, "Author deleted");

    Ok(())
}
