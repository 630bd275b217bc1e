//! Circulating resources
//!
//! A resource is one of three concrete variants sharing a block of common
//! fields. The stored record is flat and carries a `type` discriminator
//! naming the variant; decoding reads the discriminator first and then hands
//! the record to the matching variant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::article::{Article, ArticleRecord};
use super::book::{Book, BookRecord};
use super::decode_record;
use super::thesis::{Thesis, ThesisRecord};
use crate::domain::validation::{
    contains_ignore_case, is_valid_label, is_valid_publication_year, is_valid_resource_id,
};
use crate::domain::{Normalized, RecordError, ValidationWarning};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const INVALID_ID: &str = "INVALID_ID";
pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Book,
    Article,
    Thesis,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Book => "Book",
            ResourceKind::Article => "Article",
            ResourceKind::Thesis => "Thesis",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Book" => Ok(ResourceKind::Book),
            "Article" => Ok(ResourceKind::Article),
            "Thesis" => Ok(ResourceKind::Thesis),
            other => Err(RecordError::UnknownResourceType(other.to_string())),
        }
    }
}

/// Fields shared by every resource variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    title: String,
    author: String,
    resource_id: String,
    category: String,
    publication_year: i32,
    available: bool,
}

/// Stored shape of the common fields, flattened into each variant record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonRecord {
    pub title: String,
    pub author: String,
    pub resource_id: String,
    pub category: String,
    pub publication_year: i32,
    #[serde(rename = "isAvailable")]
    pub available: bool,
}

impl ResourceInfo {
    /// New resources start out available.
    pub fn new(
        title: &str,
        author: &str,
        resource_id: &str,
        category: &str,
        publication_year: i32,
    ) -> Normalized<ResourceInfo> {
        let mut info = ResourceInfo {
            title: String::new(),
            author: String::new(),
            resource_id: String::new(),
            category: String::new(),
            publication_year: -1,
            available: true,
        };
        let warnings = [
            info.set_title(title),
            info.set_author(author),
            info.set_resource_id(resource_id),
            info.set_publication_year(publication_year),
        ]
        .into_iter()
        .flatten()
        .collect();
        info.set_category(category);
        Normalized::new(info, warnings)
    }

    pub(crate) fn to_record(&self) -> CommonRecord {
        CommonRecord {
            title: self.title.clone(),
            author: self.author.clone(),
            resource_id: self.resource_id.clone(),
            category: self.category.clone(),
            publication_year: self.publication_year,
            available: self.available,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn publication_year(&self) -> i32 {
        self.publication_year
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn set_title(&mut self, title: &str) -> Option<ValidationWarning> {
        if is_valid_label(title) {
            self.title = title.to_string();
            None
        } else {
            self.title = UNKNOWN_TITLE.to_string();
            Some(ValidationWarning::new(
                "title",
                format!("invalid title, using '{}'", UNKNOWN_TITLE),
            ))
        }
    }

    pub fn set_author(&mut self, author: &str) -> Option<ValidationWarning> {
        if is_valid_label(author) {
            self.author = author.to_string();
            None
        } else {
            self.author = UNKNOWN_AUTHOR.to_string();
            Some(ValidationWarning::new(
                "author",
                format!("invalid author, using '{}'", UNKNOWN_AUTHOR),
            ))
        }
    }

    pub fn set_resource_id(&mut self, resource_id: &str) -> Option<ValidationWarning> {
        if is_valid_resource_id(resource_id) {
            self.resource_id = resource_id.to_string();
            None
        } else {
            self.resource_id = INVALID_ID.to_string();
            Some(ValidationWarning::new(
                "resourceId",
                format!("invalid resource ID '{}', using '{}'", resource_id, INVALID_ID),
            ))
        }
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = if category.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category.to_string()
        };
    }

    pub fn set_publication_year(&mut self, year: i32) -> Option<ValidationWarning> {
        if is_valid_publication_year(year) {
            self.publication_year = year;
            None
        } else {
            self.publication_year = -1;
            Some(ValidationWarning::new(
                "publicationYear",
                format!("year {} out of range, using -1", year),
            ))
        }
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Case-insensitive match against title, author and category
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }
        contains_ignore_case(&self.title, keyword)
            || contains_ignore_case(&self.author, keyword)
            || contains_ignore_case(&self.category, keyword)
    }

    /// An empty filter matches everything
    pub fn matches_category(&self, category: &str) -> bool {
        category.is_empty() || contains_ignore_case(&self.category, category)
    }

    pub fn matches_author(&self, author: &str) -> bool {
        author.is_empty() || contains_ignore_case(&self.author, author)
    }

    pub(crate) fn write_summary(
        &self,
        f: &mut fmt::Formatter<'_>,
        kind: ResourceKind,
    ) -> fmt::Result {
        writeln!(f, "----- {} -----", kind)?;
        writeln!(f, "ID:           {}", self.resource_id)?;
        writeln!(f, "Title:        {}", self.title)?;
        writeln!(f, "Author:       {}", self.author)?;
        writeln!(f, "Year:         {}", self.publication_year)?;
        writeln!(f, "Category:     {}", self.category)?;
        writeln!(f, "Available:    {}", if self.available { "Yes" } else { "No" })
    }
}

/// Flat, tagged stored form of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResourceRecord {
    Book(BookRecord),
    Article(ArticleRecord),
    Thesis(ThesisRecord),
}

/// A circulating resource. Equality is identity: two resources are equal when
/// their resource IDs are.
#[derive(Debug, Clone)]
pub enum Resource {
    Book(Book),
    Article(Article),
    Thesis(Thesis),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Book(_) => ResourceKind::Book,
            Resource::Article(_) => ResourceKind::Article,
            Resource::Thesis(_) => ResourceKind::Thesis,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn info(&self) -> &ResourceInfo {
        match self {
            Resource::Book(book) => book.info(),
            Resource::Article(article) => article.info(),
            Resource::Thesis(thesis) => thesis.info(),
        }
    }

    pub fn info_mut(&mut self) -> &mut ResourceInfo {
        match self {
            Resource::Book(book) => book.info_mut(),
            Resource::Article(article) => article.info_mut(),
            Resource::Thesis(thesis) => thesis.info_mut(),
        }
    }

    pub fn resource_id(&self) -> &str {
        self.info().resource_id()
    }

    pub fn title(&self) -> &str {
        self.info().title()
    }

    pub fn is_available(&self) -> bool {
        self.info().is_available()
    }

    pub fn set_available(&mut self, available: bool) {
        self.info_mut().set_available(available);
    }

    /// Multi-line description for display
    pub fn display_info(&self) -> String {
        self.to_string()
    }

    /// Common fields plus the variant's own searchable fields
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        match self {
            Resource::Book(book) => book.matches_keyword(keyword),
            Resource::Article(article) => article.matches_keyword(keyword),
            Resource::Thesis(thesis) => thesis.matches_keyword(keyword),
        }
    }

    pub fn matches_category(&self, category: &str) -> bool {
        self.info().matches_category(category)
    }

    pub fn matches_author(&self, author: &str) -> bool {
        self.info().matches_author(author)
    }

    pub fn to_record(&self) -> ResourceRecord {
        match self {
            Resource::Book(book) => ResourceRecord::Book(book.to_record()),
            Resource::Article(article) => ResourceRecord::Article(article.to_record()),
            Resource::Thesis(thesis) => ResourceRecord::Thesis(thesis.to_record()),
        }
    }

    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.to_record())
    }

    /// Rebuild a resource from its stored record.
    ///
    /// The `type` discriminator is read first; an unrecognised value fails with
    /// `UnknownResourceType`, a missing required field with `MalformedRecord`.
    /// Book and Article fields are re-normalized, Thesis fields re-checked strictly.
    pub fn from_document(value: &serde_json::Value) -> Result<Normalized<Resource>, RecordError> {
        let kind: ResourceKind = match value.get("type") {
            Some(serde_json::Value::String(tag)) => tag.parse()?,
            Some(_) => return Err(RecordError::malformed("resource", "'type' is not a string")),
            None => return Err(RecordError::malformed("resource", "missing field `type`")),
        };

        let resource = match kind {
            ResourceKind::Book => {
                let record: BookRecord = decode_record("Book", value)?;
                Book::from_record(record).map(Resource::Book)
            }
            ResourceKind::Article => {
                let record: ArticleRecord = decode_record("Article", value)?;
                Article::from_record(record).map(Resource::Article)
            }
            ResourceKind::Thesis => {
                let record: ThesisRecord = decode_record("Thesis", value)?;
                Thesis::from_record(record)?.map(Resource::Thesis)
            }
        };
        Ok(resource)
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.resource_id() == other.resource_id()
    }
}

impl Eq for Resource {}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Book(book) => fmt::Display::fmt(book, f),
            Resource::Article(article) => fmt::Display::fmt(article, f),
            Resource::Thesis(thesis) => fmt::Display::fmt(thesis, f),
        }
    }
}

impl From<Book> for Resource {
    fn from(book: Book) -> Self {
        Resource::Book(book)
    }
}

impl From<Article> for Resource {
    fn from(article: Article) -> Self {
        Resource::Article(article)
    }
}

impl From<Thesis> for Resource {
    fn from(thesis: Thesis) -> Self {
        Resource::Thesis(thesis)
    }
}
