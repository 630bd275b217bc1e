use crate::models::{ArticleInput, BookInput, ThesisInput, ThesisType, UserRole};
use crate::services::{Catalog, ServiceError, resource_service, user_service};

pub const DEFAULT_ADMIN_ID: &str = "admin001";

/// Create the default administrator when the catalog has no users.
/// Returns whether an account was created.
pub fn ensure_default_admin(catalog: &mut Catalog) -> Result<bool, ServiceError> {
    if !catalog.users.is_empty() {
        return Ok(false);
    }
    user_service::register_user(
        catalog,
        DEFAULT_ADMIN_ID,
        "System Administrator",
        "admin@library.com",
        UserRole::Admin,
    )?;
    tracing::info!("Created default admin account '{}'", DEFAULT_ADMIN_ID);
    Ok(true)
}

/// One resource of each kind, skipped when their ids are already present
pub fn seed_demo_data(catalog: &mut Catalog) -> Result<(), ServiceError> {
    if catalog.find_resource("DEMO-B1").is_none() {
        resource_service::add_book(
            catalog,
            BookInput {
                title: "Dune".to_owned(),
                author: "Frank Herbert".to_owned(),
                resource_id: "DEMO-B1".to_owned(),
                category: "Science Fiction".to_owned(),
                publication_year: 1965,
                publisher: "Chilton Books".to_owned(),
                number_of_pages: 412,
                isbn: "978-0441013593".to_owned(),
                edition: "1st".to_owned(),
            },
        )?;
    }

    if catalog.find_resource("DEMO-A1").is_none() {
        resource_service::add_article(
            catalog,
            ArticleInput {
                title: "A Relational Model of Data for Large Shared Data Banks".to_owned(),
                author: "Edgar Codd".to_owned(),
                resource_id: "DEMO-A1".to_owned(),
                category: "Databases".to_owned(),
                publication_year: 1970,
                magazine: "Communications of the ACM".to_owned(),
                volume: 13,
                issue: 6,
                doi: "10.1145/362384.362685".to_owned(),
                start_page: 377,
                end_page: 387,
            },
        )?;
    }

    if catalog.find_resource("DEMO-T1").is_none() {
        resource_service::add_thesis(
            catalog,
            ThesisInput {
                title: "A Symbolic Analysis of Relay and Switching Circuits".to_owned(),
                author: "Claude Shannon".to_owned(),
                resource_id: "DEMO-T1".to_owned(),
                category: "Electrical Engineering".to_owned(),
                publication_year: 1937,
                university: "Massachusetts Institute of Technology".to_owned(),
                department: "Electrical Engineering".to_owned(),
                supervisor: "Frank Hitchcock".to_owned(),
                thesis_type: ThesisType::Master,
                degree: "S.M.".to_owned(),
                page_count: 69,
                abstract_text: "Boolean algebra applied to the design of relay circuits."
                    .to_owned(),
            },
        )?;
    }

    tracing::info!("Demo data seeded ({})", catalog.summary());
    Ok(())
}
