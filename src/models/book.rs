use std::fmt;

use serde::{Deserialize, Serialize};

use super::resource::{CommonRecord, ResourceInfo, ResourceKind};
use crate::domain::validation::{contains_ignore_case, is_positive_at_most, is_valid_isbn};
use crate::domain::{Normalized, ValidationWarning};

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";
pub const MAX_BOOK_PAGES: i32 = 10_000;

pub(crate) fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Raw input for a new book, as read by the shell
#[derive(Debug, Clone, Default)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub resource_id: String,
    pub category: String,
    pub publication_year: i32,
    pub publisher: String,
    pub number_of_pages: i32,
    pub isbn: String,
    pub edition: String,
}

/// Stored shape of a book (without the `type` discriminator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    #[serde(flatten)]
    pub common: CommonRecord,
    pub number_of_pages: i32,
    pub publisher: String,
    #[serde(default = "not_available")]
    pub isbn: String,
    #[serde(default = "not_available")]
    pub edition: String,
}

/// A book. Invalid fields are coerced to sentinels rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    info: ResourceInfo,
    number_of_pages: i32,
    publisher: String,
    isbn: String,
    edition: String,
}

impl Book {
    pub fn new(input: BookInput) -> Normalized<Book> {
        let Normalized {
            value: info,
            mut warnings,
        } = ResourceInfo::new(
            &input.title,
            &input.author,
            &input.resource_id,
            &input.category,
            input.publication_year,
        );

        let mut book = Book {
            info,
            number_of_pages: -1,
            publisher: String::new(),
            isbn: not_available(),
            edition: not_available(),
        };
        book.set_publisher(&input.publisher);
        book.set_edition(&input.edition);
        warnings.extend(book.set_number_of_pages(input.number_of_pages));
        warnings.extend(book.set_isbn(&input.isbn));

        Normalized::new(book, warnings)
    }

    pub(crate) fn from_record(record: BookRecord) -> Normalized<Book> {
        let available = record.common.available;
        let mut book = Book::new(BookInput {
            title: record.common.title,
            author: record.common.author,
            resource_id: record.common.resource_id,
            category: record.common.category,
            publication_year: record.common.publication_year,
            publisher: record.publisher,
            number_of_pages: record.number_of_pages,
            isbn: record.isbn,
            edition: record.edition,
        });
        book.value.info.set_available(available);
        book
    }

    pub(crate) fn to_record(&self) -> BookRecord {
        BookRecord {
            common: self.info.to_record(),
            number_of_pages: self.number_of_pages,
            publisher: self.publisher.clone(),
            isbn: self.isbn.clone(),
            edition: self.edition.clone(),
        }
    }

    pub fn info(&self) -> &ResourceInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut ResourceInfo {
        &mut self.info
    }

    pub fn number_of_pages(&self) -> i32 {
        self.number_of_pages
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn edition(&self) -> &str {
        &self.edition
    }

    /// Pages must be in `(0, 10000]`, otherwise `-1`
    pub fn set_number_of_pages(&mut self, pages: i32) -> Option<ValidationWarning> {
        if is_positive_at_most(pages, MAX_BOOK_PAGES) {
            self.number_of_pages = pages;
            None
        } else {
            self.number_of_pages = -1;
            Some(ValidationWarning::new(
                "numberOfPages",
                format!("{} pages out of range, using -1", pages),
            ))
        }
    }

    pub fn set_publisher(&mut self, publisher: &str) {
        self.publisher = if publisher.is_empty() {
            UNKNOWN_PUBLISHER.to_string()
        } else {
            publisher.to_string()
        };
    }

    pub fn set_isbn(&mut self, isbn: &str) -> Option<ValidationWarning> {
        if is_valid_isbn(isbn) {
            self.isbn = isbn.to_string();
            None
        } else {
            self.isbn = not_available();
            Some(ValidationWarning::new(
                "isbn",
                format!("invalid ISBN '{}', using '{}'", isbn, NOT_AVAILABLE),
            ))
        }
    }

    pub fn set_edition(&mut self, edition: &str) {
        self.edition = if edition.is_empty() {
            not_available()
        } else {
            edition.to_string()
        };
    }

    pub fn has_isbn(&self) -> bool {
        !self.isbn.is_empty() && self.isbn != NOT_AVAILABLE
    }

    /// "Title by Author (ISBN: ...)"
    pub fn formatted_info(&self) -> String {
        let mut info = format!("{} by {}", self.info.title(), self.info.author());
        if self.has_isbn() {
            info.push_str(&format!(" (ISBN: {})", self.isbn));
        }
        info
    }

    /// Common fields, then publisher and ISBN
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }
        self.info.matches_keyword(keyword)
            || contains_ignore_case(&self.publisher, keyword)
            || contains_ignore_case(&self.isbn, keyword)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.info.write_summary(f, ResourceKind::Book)?;
        writeln!(f, "Publisher:    {}", self.publisher)?;
        writeln!(f, "Pages:        {}", self.number_of_pages)?;
        if self.has_isbn() {
            writeln!(f, "ISBN:         {}", self.isbn)?;
        }
        if !self.edition.is_empty() && self.edition != NOT_AVAILABLE {
            writeln!(f, "Edition:      {}", self.edition)?;
        }
        write!(f, "----------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resource;
    use serde_json::json;

    fn input(pages: i32, isbn: &str) -> BookInput {
        BookInput {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            resource_id: "RES1001".into(),
            category: "Science Fiction".into(),
            publication_year: 1965,
            publisher: "Chilton Books".into(),
            number_of_pages: pages,
            isbn: isbn.into(),
            edition: "".into(),
        }
    }

    #[test]
    fn test_page_boundaries() {
        let accepted = Book::new(input(10_000, "N/A"));
        assert!(accepted.is_clean());
        assert_eq!(accepted.value.number_of_pages(), 10_000);

        let rejected = Book::new(input(10_001, "N/A"));
        assert_eq!(rejected.value.number_of_pages(), -1);
        assert_eq!(rejected.warnings[0].field, "numberOfPages");

        let zero = Book::new(input(0, "N/A"));
        assert_eq!(zero.value.number_of_pages(), -1);
    }

    #[test]
    fn test_isbn_normalization() {
        assert_eq!(Book::new(input(412, "0306406152")).value.isbn(), "0306406152");
        let bad = Book::new(input(412, "abc"));
        assert_eq!(bad.value.isbn(), "N/A");
        assert!(!bad.value.has_isbn());
    }

    #[test]
    fn test_defaults_for_empty_text() {
        let mut raw = input(412, "");
        raw.publisher = String::new();
        let book = Book::new(raw).value;
        assert_eq!(book.publisher(), UNKNOWN_PUBLISHER);
        assert_eq!(book.edition(), "N/A");
        assert_eq!(book.formatted_info(), "Dune by Frank Herbert");
    }

    #[test]
    fn test_keyword_covers_publisher_and_isbn() {
        let book = Book::new(input(412, "0306406152")).value;
        assert!(book.matches_keyword("chilton"));
        assert!(book.matches_keyword("030640"));
        assert!(!book.matches_keyword("penguin"));
    }

    #[test]
    fn test_round_trip_with_sentinels() {
        let mut book = Book::new(input(-5, "abc")).value;
        book.info_mut().set_available(false);
        let resource = Resource::Book(book.clone());

        let doc = resource.to_document().unwrap();
        match Resource::from_document(&doc).unwrap().value {
            Resource::Book(restored) => assert_eq!(restored, book),
            other => panic!("expected a book, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_optional_fields_fall_back() {
        let doc = json!({
            "type": "Book",
            "title": "Dune",
            "author": "Frank Herbert",
            "resourceId": "RES1001",
            "category": "Science Fiction",
            "publicationYear": 1965,
            "isAvailable": true,
            "numberOfPages": 412,
            "publisher": "Chilton Books"
        });
        let Resource::Book(book) = Resource::from_document(&doc).unwrap().value else {
            panic!("expected a book");
        };
        assert_eq!(book.isbn(), "N/A");
        assert_eq!(book.edition(), "N/A");
    }
}
