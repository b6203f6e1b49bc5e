use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

// ============================================================================
// Library Types
// ============================================================================

/// An author of one or more books
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let birth = self
            .birth_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".to_string());
        let death = self
            .date_of_death
            .map(|d| d.to_string())
            .unwrap_or_default();
        write!(f, "{} ({} – {})", self.name, birth, death)
    }
}

/// A book in the library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub publication_year: Option<i32>,
    pub isbn: Option<String>,
    pub rating: Option<f64>,
    pub cover_url: Option<String>,
    pub author_id: i64,
}

/// A book joined with its author's name, as listed to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct BookWithAuthor {
    pub id: i64,
    pub title: String,
    pub publication_year: Option<i32>,
    pub isbn: Option<String>,
    pub rating: Option<f64>,
    pub cover_url: Option<String>,
    pub author_id: i64,
    pub author_name: String,
}

/// Ordering for the book list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookSort {
    #[default]
    Title,
    Author,
    Year,
    Rating,
}

impl BookSort {
    /// Parses a `sort` query value; unknown values fall back to title order
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_lowercase).as_deref() {
            Some("author") => BookSort::Author,
            Some("year") => BookSort::Year,
            Some("rating") => BookSort::Rating,
            _ => BookSort::Title,
        }
    }
}

/// Request to add an author
#[derive(Debug, Clone, Deserialize)]
pub struct NewAuthor {
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

/// Request to add a book
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

// ============================================================================
// Recommendation Types
// ============================================================================

/// A suggested book, produced by the server and treated as opaque by the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    pub cover_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ============================================================================
// Open Library API Types
// ============================================================================

/// Entry of `/api/books?jscmd=data`
#[derive(Debug, Clone, Deserialize)]
pub struct OpenLibraryBook {
    #[serde(default)]
    pub subjects: Vec<OpenLibraryNamed>,
}

/// Anything Open Library describes with just a name (subjects, authors)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenLibraryNamed {
    pub name: String,
}

/// Response of `/subjects/{subject}.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenLibrarySubject {
    #[serde(default)]
    pub works: Vec<OpenLibraryWork>,
}

/// A work listed under a subject
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenLibraryWork {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<OpenLibraryNamed>,
    #[serde(default)]
    pub cover_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_display_with_dates() {
        let author = Author {
            id: 1,
            name: "Ursula K. Le Guin".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1929, 10, 21),
            date_of_death: NaiveDate::from_ymd_opt(2018, 1, 22),
        };
        assert_eq!(
            author.to_string(),
            "Ursula K. Le Guin (1929-10-21 – 2018-01-22)"
        );
    }

    #[test]
    fn test_author_display_without_dates() {
        let author = Author {
            id: 2,
            name: "Anonymous".to_string(),
            birth_date: None,
            date_of_death: None,
        };
        assert_eq!(author.to_string(), "Anonymous (? – )");
    }

    #[test]
    fn test_book_sort_parse() {
        assert_eq!(BookSort::parse(Some("author")), BookSort::Author);
        assert_eq!(BookSort::parse(Some("YEAR")), BookSort::Year);
        assert_eq!(BookSort::parse(Some("rating")), BookSort::Rating);
        assert_eq!(BookSort::parse(Some("pages")), BookSort::Title);
        assert_eq!(BookSort::parse(None), BookSort::Title);
    }

    #[test]
    fn test_recommendation_without_reason() {
        let json = r#"{"title":"Dune","author":"Frank Herbert","cover_url":"http://x/dune.jpg"}"#;
        let rec: Recommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.reason, None);
        assert_eq!(serde_json::to_string(&rec).unwrap(), json);
    }

    #[test]
    fn test_recommendation_missing_author_is_rejected() {
        let json = r#"{"title":"Dune","cover_url":"http://x/dune.jpg"}"#;
        assert!(serde_json::from_str::<Recommendation>(json).is_err());
    }

    #[test]
    fn test_open_library_work_defaults() {
        let work: OpenLibraryWork = serde_json::from_str("{}").unwrap();
        assert_eq!(work.title, None);
        assert!(work.authors.is_empty());
        assert_eq!(work.cover_id, None);
    }
}
