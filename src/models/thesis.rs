use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::resource::{CommonRecord, ResourceInfo, ResourceKind};
use crate::domain::validation::{check_length, contains_ignore_case, is_positive_at_most};
use crate::domain::{Normalized, RecordError, ValidationError};

pub const MAX_THESIS_PAGES: i32 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ThesisType {
    #[default]
    Bachelor,
    Master,
    PhD,
    Research,
}

impl ThesisType {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Bachelor),
            1 => Some(Self::Master),
            2 => Some(Self::PhD),
            3 => Some(Self::Research),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bachelor => "Bachelor's Thesis",
            Self::Master => "Master's Thesis",
            Self::PhD => "PhD Dissertation",
            Self::Research => "Research Thesis",
        }
    }
}

impl FromStr for ThesisType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bachelor" => Ok(Self::Bachelor),
            "Master" => Ok(Self::Master),
            "PhD" => Ok(Self::PhD),
            "Research" => Ok(Self::Research),
            other => Err(format!("unknown thesis type '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for ThesisType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Index(i64),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Index(i) => ThesisType::from_index(i).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown thesis type index {}", i))
            }),
            Repr::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Raw input for a new thesis
#[derive(Debug, Clone, Default)]
pub struct ThesisInput {
    pub title: String,
    pub author: String,
    pub resource_id: String,
    pub category: String,
    pub publication_year: i32,
    pub university: String,
    pub department: String,
    pub supervisor: String,
    pub thesis_type: ThesisType,
    pub degree: String,
    pub page_count: i32,
    pub abstract_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThesisRecord {
    #[serde(flatten)]
    pub common: CommonRecord,
    pub university: String,
    pub department: String,
    pub supervisor: String,
    #[serde(default)]
    pub thesis_type: ThesisType,
    #[serde(default)]
    pub degree: String,
    pub page_count: i32,
    #[serde(default)]
    pub abstract_text: String,
}

/// An academic thesis.
///
/// Unlike books and articles, the thesis-specific fields are validated
/// strictly: an invalid university, department, supervisor or page count is
/// an error and nothing is constructed or changed. The common resource fields
/// are still normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thesis {
    info: ResourceInfo,
    university: String,
    department: String,
    supervisor: String,
    thesis_type: ThesisType,
    degree: String,
    page_count: i32,
    abstract_text: String,
}

impl Thesis {
    pub fn new(input: ThesisInput) -> Result<Normalized<Thesis>, ValidationError> {
        let info = ResourceInfo::new(
            &input.title,
            &input.author,
            &input.resource_id,
            &input.category,
            input.publication_year,
        );

        let mut thesis = Thesis {
            info: info.value,
            university: String::new(),
            department: String::new(),
            supervisor: String::new(),
            thesis_type: input.thesis_type,
            degree: input.degree,
            page_count: -1,
            abstract_text: input.abstract_text,
        };
        thesis.set_university(&input.university)?;
        thesis.set_department(&input.department)?;
        thesis.set_supervisor(&input.supervisor)?;
        thesis.set_page_count(input.page_count)?;

        Ok(Normalized::new(thesis, info.warnings))
    }

    pub(crate) fn from_record(record: ThesisRecord) -> Result<Normalized<Thesis>, RecordError> {
        let available = record.common.available;
        let mut thesis = Thesis::new(ThesisInput {
            title: record.common.title,
            author: record.common.author,
            resource_id: record.common.resource_id,
            category: record.common.category,
            publication_year: record.common.publication_year,
            university: record.university,
            department: record.department,
            supervisor: record.supervisor,
            thesis_type: record.thesis_type,
            degree: record.degree,
            page_count: record.page_count,
            abstract_text: record.abstract_text,
        })?;
        thesis.value.info.set_available(available);
        Ok(thesis)
    }

    pub(crate) fn to_record(&self) -> ThesisRecord {
        ThesisRecord {
            common: self.info.to_record(),
            university: self.university.clone(),
            department: self.department.clone(),
            supervisor: self.supervisor.clone(),
            thesis_type: self.thesis_type,
            degree: self.degree.clone(),
            page_count: self.page_count,
            abstract_text: self.abstract_text.clone(),
        }
    }

    pub fn info(&self) -> &ResourceInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut ResourceInfo {
        &mut self.info
    }

    pub fn university(&self) -> &str {
        &self.university
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn supervisor(&self) -> &str {
        &self.supervisor
    }

    pub fn thesis_type(&self) -> ThesisType {
        self.thesis_type
    }

    pub fn degree(&self) -> &str {
        &self.degree
    }

    pub fn page_count(&self) -> i32 {
        self.page_count
    }

    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    pub fn set_university(&mut self, university: &str) -> Result<(), ValidationError> {
        check_length("university", university, 2, 100)?;
        self.university = university.to_string();
        Ok(())
    }

    pub fn set_department(&mut self, department: &str) -> Result<(), ValidationError> {
        check_length("department", department, 2, 100)?;
        self.department = department.to_string();
        Ok(())
    }

    pub fn set_supervisor(&mut self, supervisor: &str) -> Result<(), ValidationError> {
        check_length("supervisor", supervisor, 2, 100)?;
        self.supervisor = supervisor.to_string();
        Ok(())
    }

    pub fn set_page_count(&mut self, pages: i32) -> Result<(), ValidationError> {
        if !is_positive_at_most(pages, MAX_THESIS_PAGES) {
            return Err(ValidationError::OutOfRange {
                field: "pageCount",
                value: i64::from(pages),
            });
        }
        self.page_count = pages;
        Ok(())
    }

    pub fn set_thesis_type(&mut self, thesis_type: ThesisType) {
        self.thesis_type = thesis_type;
    }

    pub fn set_degree(&mut self, degree: &str) {
        self.degree = degree.to_string();
    }

    pub fn set_abstract_text(&mut self, abstract_text: &str) {
        self.abstract_text = abstract_text.to_string();
    }

    pub fn has_abstract(&self) -> bool {
        !self.abstract_text.is_empty()
    }

    /// "Title by Author (PhD Dissertation, University)"
    pub fn formatted_info(&self) -> String {
        format!(
            "{} by {} ({}, {})",
            self.info.title(),
            self.info.author(),
            self.thesis_type.label(),
            self.university
        )
    }

    pub fn matches_keyword(&self, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }
        self.info.matches_keyword(keyword)
            || [
                &self.university,
                &self.department,
                &self.supervisor,
                &self.degree,
                &self.abstract_text,
            ]
            .iter()
            .any(|field| contains_ignore_case(field, keyword))
    }
}

impl fmt::Display for Thesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.info.write_summary(f, ResourceKind::Thesis)?;
        writeln!(f, "University:   {}", self.university)?;
        writeln!(f, "Department:   {}", self.department)?;
        writeln!(f, "Supervisor:   {}", self.supervisor)?;
        writeln!(f, "Type:         {}", self.thesis_type.label())?;
        writeln!(f, "Degree:       {}", self.degree)?;
        writeln!(f, "Pages:        {}", self.page_count)?;
        if self.has_abstract() {
            let excerpt: String = self.abstract_text.chars().take(100).collect();
            writeln!(f, "Abstract:     {}...", excerpt)?;
        }
        write!(f, "----------------------")
    }
}
