use std::fmt;

use serde::{Deserialize, Serialize};

use super::book::{NOT_AVAILABLE, not_available};
use super::resource::{CommonRecord, ResourceInfo, ResourceKind};
use crate::domain::validation::{
    contains_ignore_case, is_positive_at_most, is_valid_doi, is_valid_page_range,
};
use crate::domain::{Normalized, ValidationWarning};

pub const UNKNOWN_MAGAZINE: &str = "Unknown Magazine";

fn no_page() -> i32 {
    -1
}

/// Raw input for a new article
#[derive(Debug, Clone, Default)]
pub struct ArticleInput {
    pub title: String,
    pub author: String,
    pub resource_id: String,
    pub category: String,
    pub publication_year: i32,
    pub magazine: String,
    pub volume: i32,
    pub issue: i32,
    pub doi: String,
    pub start_page: i32,
    pub end_page: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    #[serde(flatten)]
    pub common: CommonRecord,
    pub magazine: String,
    pub volume: i32,
    pub issue: i32,
    #[serde(default = "not_available")]
    pub doi: String,
    #[serde(default = "no_page")]
    pub start_page: i32,
    #[serde(default = "no_page")]
    pub end_page: i32,
}

/// A journal or magazine article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    info: ResourceInfo,
    magazine: String,
    volume: i32,
    issue: i32,
    doi: String,
    start_page: i32,
    end_page: i32,
}

impl Article {
    pub fn new(input: ArticleInput) -> Normalized<Article> {
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

        let mut article = Article {
            info,
            magazine: String::new(),
            volume: -1,
            issue: -1,
            doi: not_available(),
            start_page: -1,
            end_page: -1,
        };
        article.set_magazine(&input.magazine);
        warnings.extend(article.set_volume(input.volume));
        warnings.extend(article.set_issue(input.issue));
        warnings.extend(article.set_doi(&input.doi));
        warnings.extend(article.set_page_range(input.start_page, input.end_page));

        Normalized::new(article, warnings)
    }

    pub(crate) fn from_record(record: ArticleRecord) -> Normalized<Article> {
        let available = record.common.available;
        let mut article = Article::new(ArticleInput {
            title: record.common.title,
            author: record.common.author,
            resource_id: record.common.resource_id,
            category: record.common.category,
            publication_year: record.common.publication_year,
            magazine: record.magazine,
            volume: record.volume,
            issue: record.issue,
            doi: record.doi,
            start_page: record.start_page,
            end_page: record.end_page,
        });
        article.value.info.set_available(available);
        article
    }

    pub(crate) fn to_record(&self) -> ArticleRecord {
        ArticleRecord {
            common: self.info.to_record(),
            magazine: self.magazine.clone(),
            volume: self.volume,
            issue: self.issue,
            doi: self.doi.clone(),
            start_page: self.start_page,
            end_page: self.end_page,
        }
    }

    pub fn info(&self) -> &ResourceInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut ResourceInfo {
        &mut self.info
    }

    pub fn magazine(&self) -> &str {
        &self.magazine
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }

    pub fn issue(&self) -> i32 {
        self.issue
    }

    pub fn doi(&self) -> &str {
        &self.doi
    }

    pub fn start_page(&self) -> i32 {
        self.start_page
    }

    pub fn end_page(&self) -> i32 {
        self.end_page
    }

    pub fn set_magazine(&mut self, magazine: &str) {
        self.magazine = if magazine.is_empty() {
            UNKNOWN_MAGAZINE.to_string()
        } else {
            magazine.to_string()
        };
    }

    pub fn set_volume(&mut self, volume: i32) -> Option<ValidationWarning> {
        if is_positive_at_most(volume, 1000) {
            self.volume = volume;
            None
        } else {
            self.volume = -1;
            Some(ValidationWarning::new(
                "volume",
                format!("volume {} out of range, using -1", volume),
            ))
        }
    }

    pub fn set_issue(&mut self, issue: i32) -> Option<ValidationWarning> {
        if is_positive_at_most(issue, 100) {
            self.issue = issue;
            None
        } else {
            self.issue = -1;
            Some(ValidationWarning::new(
                "issue",
                format!("issue {} out of range, using -1", issue),
            ))
        }
    }

    pub fn set_doi(&mut self, doi: &str) -> Option<ValidationWarning> {
        if is_valid_doi(doi) {
            self.doi = doi.to_string();
            None
        } else {
            self.doi = not_available();
            Some(ValidationWarning::new(
                "doi",
                format!("invalid DOI '{}', using '{}'", doi, NOT_AVAILABLE),
            ))
        }
    }

    /// Both pages reset to `-1` when the range is invalid
    pub fn set_page_range(&mut self, start: i32, end: i32) -> Option<ValidationWarning> {
        if is_valid_page_range(start, end) {
            self.start_page = start;
            self.end_page = end;
            None
        } else {
            self.start_page = -1;
            self.end_page = -1;
            Some(ValidationWarning::new(
                "pageRange",
                format!("invalid page range {}-{}, using -1", start, end),
            ))
        }
    }

    pub fn has_doi(&self) -> bool {
        !self.doi.is_empty() && self.doi != NOT_AVAILABLE
    }

    pub fn has_page_range(&self) -> bool {
        self.start_page > 0 && self.end_page > 0
    }

    /// "Vol. 3, Issue 2", or "N/A" when neither is known
    pub fn volume_issue_info(&self) -> String {
        let parts: Vec<String> = [
            (self.volume > 0).then(|| format!("Vol. {}", self.volume)),
            (self.issue > 0).then(|| format!("Issue {}", self.issue)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn matches_keyword(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }
        self.info.matches_keyword(keyword)
            || contains_ignore_case(&self.magazine, keyword)
            || contains_ignore_case(&self.doi, keyword)
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.info.write_summary(f, ResourceKind::Article)?;
        writeln!(f, "Magazine:     {}", self.magazine)?;
        writeln!(f, "Volume:       {}", self.volume)?;
        writeln!(f, "Issue:        {}", self.issue)?;
        if self.has_page_range() {
            writeln!(f, "Pages:        {}-{}", self.start_page, self.end_page)?;
        }
        if self.has_doi() {
            writeln!(f, "DOI:          {}", self.doi)?;
        }
        write!(f, "----------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resource;

    fn input(doi: &str, start: i32, end: i32) -> ArticleInput {
        ArticleInput {
            title: "A Relational Model of Data".into(),
            author: "Edgar F. Codd".into(),
            resource_id: "RES1002".into(),
            category: "Databases".into(),
            publication_year: 1970,
            magazine: "Communications of the ACM".into(),
            volume: 13,
            issue: 6,
            doi: doi.into(),
            start_page: start,
            end_page: end,
        }
    }

    #[test]
    fn test_doi_normalization() {
        let good = Article::new(input("10.1000/xyz", 377, 387));
        assert!(good.is_clean());
        assert_eq!(good.value.doi(), "10.1000/xyz");

        let bad = Article::new(input("xyz", 377, 387));
        assert_eq!(bad.value.doi(), "N/A");
        assert_eq!(bad.warnings.len(), 1);
    }

    #[test]
    fn test_page_range_rules() {
        let open = Article::new(input("", -1, 20)).value;
        assert_eq!((open.start_page(), open.end_page()), (-1, 20));
        assert!(!open.has_page_range());

        let reversed = Article::new(input("", 50, 10)).value;
        assert_eq!((reversed.start_page(), reversed.end_page()), (-1, -1));

        let too_long = Article::new(input("", 1, 1001)).value;
        assert_eq!((too_long.start_page(), too_long.end_page()), (-1, -1));
    }

    #[test]
    fn test_volume_and_issue_bounds() {
        let mut raw = input("", 1, 2);
        raw.volume = 1001;
        raw.issue = 100;
        let article = Article::new(raw).value;
        assert_eq!(article.volume(), -1);
        assert_eq!(article.issue(), 100);
        assert_eq!(article.volume_issue_info(), "Issue 100");
    }

    #[test]
    fn test_keyword_covers_magazine_and_doi() {
        let article = Article::new(input("10.1145/362384.362685", 377, 387)).value;
        assert!(article.matches_keyword("communications"));
        assert!(article.matches_keyword("362384"));
        assert!(!article.matches_keyword("nature"));
    }

    #[test]
    fn test_round_trip() {
        let article = Article::new(input("10.1145/362384.362685", 377, 387)).value;
        let doc = Resource::Article(article.clone()).to_document().unwrap();
        assert_eq!(doc["type"], "Article");
        let Resource::Article(restored) = Resource::from_document(&doc).unwrap().value else {
            panic!("expected an article");
        };
        assert_eq!(restored, article);
    }
}
