//! Resource Service - adding, removing and searching circulating resources

use super::{Catalog, ServiceError};
use crate::domain::{Normalized, ValidationWarning};
use crate::models::resource::INVALID_ID;
use crate::models::{Article, ArticleInput, Book, BookInput, Resource, Thesis, ThesisInput};

/// Add an already built resource to the catalog
pub fn add_resource(catalog: &mut Catalog, resource: Resource) -> Result<(), ServiceError> {
    let id = resource.resource_id();
    if id.is_empty() || id == INVALID_ID {
        return Err(ServiceError::InvalidInput("invalid resource ID".to_string()));
    }
    if catalog.find_resource(id).is_some() {
        return Err(ServiceError::duplicate("Resource", id));
    }

    tracing::info!("Added {} '{}' ({})", resource.type_name(), resource.title(), id);
    catalog.resources.push(resource);
    Ok(())
}

fn add_normalized(
    catalog: &mut Catalog,
    normalized: Normalized<Resource>,
) -> Result<Vec<ValidationWarning>, ServiceError> {
    add_resource(catalog, normalized.value)?;
    Ok(normalized.warnings)
}

pub fn add_book(
    catalog: &mut Catalog,
    input: BookInput,
) -> Result<Vec<ValidationWarning>, ServiceError> {
    add_normalized(catalog, Book::new(input).map(Resource::Book))
}

pub fn add_article(
    catalog: &mut Catalog,
    input: ArticleInput,
) -> Result<Vec<ValidationWarning>, ServiceError> {
    add_normalized(catalog, Article::new(input).map(Resource::Article))
}

/// Thesis fields are checked strictly, so this can fail before the id checks
pub fn add_thesis(
    catalog: &mut Catalog,
    input: ThesisInput,
) -> Result<Vec<ValidationWarning>, ServiceError> {
    let thesis = Thesis::new(input)?;
    add_normalized(catalog, thesis.map(Resource::Thesis))
}

pub fn get_resource<'a>(
    catalog: &'a Catalog,
    resource_id: &str,
) -> Result<&'a Resource, ServiceError> {
    catalog
        .find_resource(resource_id)
        .ok_or_else(|| ServiceError::not_found("Resource", resource_id))
}

/// Remove a resource that is not on loan. Its pending reservations are canceled.
pub fn remove_resource(catalog: &mut Catalog, resource_id: &str) -> Result<Resource, ServiceError> {
    let index = catalog
        .resources
        .iter()
        .position(|r| r.resource_id() == resource_id)
        .ok_or_else(|| ServiceError::not_found("Resource", resource_id))?;

    if catalog.has_active_loan_on(resource_id) {
        return Err(ServiceError::InvalidState(format!(
            "resource '{}' is currently on loan",
            resource_id
        )));
    }

    let canceled = catalog
        .reservations
        .iter_mut()
        .filter(|r| r.resource_id() == resource_id && r.is_pending())
        .map(|r| r.cancel())
        .filter(|outcome| outcome.is_applied())
        .count();
    if canceled > 0 {
        tracing::info!("Canceled {} pending reservation(s) for '{}'", canceled, resource_id);
    }

    let removed = catalog.resources.remove(index);
    tracing::info!("Removed {} '{}'", removed.type_name(), resource_id);
    Ok(removed)
}

pub fn search_resources<'a>(catalog: &'a Catalog, keyword: &str) -> Vec<&'a Resource> {
    catalog
        .resources
        .iter()
        .filter(|r| r.matches_keyword(keyword))
        .collect()
}

pub fn filter_by_category<'a>(catalog: &'a Catalog, category: &str) -> Vec<&'a Resource> {
    catalog
        .resources
        .iter()
        .filter(|r| r.matches_category(category))
        .collect()
}

pub fn filter_by_author<'a>(catalog: &'a Catalog, author: &str) -> Vec<&'a Resource> {
    catalog
        .resources
        .iter()
        .filter(|r| r.matches_author(author))
        .collect()
}

pub fn available_resources(catalog: &Catalog) -> Vec<&Resource> {
    catalog.resources.iter().filter(|r| r.is_available()).collect()
}
