use std::fs;

use bibliocatalog::infrastructure::persistence::{backup_path, preserve_unreadable};
use bibliocatalog::models::{
    ArticleInput, BookInput, LibraryEvent, Loan, LoanPolicy, Notification, Reservation, Resource,
    ThesisInput, ThesisType, User, UserRole, now,
};
use bibliocatalog::services::{loan_service, reservation_service, resource_service};
use bibliocatalog::{Catalog, PersistenceError, RecordError, load_catalog, save_catalog};
use serde_json::{Value, json};
use tempfile::TempDir;

const DAY: i64 = 86_400;

fn setup_catalog() -> Catalog {
    let policy = LoanPolicy::default().with_max_renewals(3).with_loan_period_days(21);
    let mut catalog = Catalog::new(policy);
    let at = now();

    catalog
        .users
        .push(User::new("USER1001", "Ada Lovelace", "ada@example.com", UserRole::Student).value);
    catalog.users.push(
        User::new("admin001", "System Administrator", "admin@library.com", UserRole::Admin).value,
    );

    resource_service::add_book(
        &mut catalog,
        BookInput {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            resource_id: "RES1001".into(),
            category: "Science Fiction".into(),
            publication_year: 1965,
            publisher: "".into(),
            number_of_pages: 20_000,
            isbn: "not-an-isbn".into(),
            edition: "".into(),
        },
    )
    .unwrap();
    resource_service::add_article(
        &mut catalog,
        ArticleInput {
            title: "Go To Statement Considered Harmful".into(),
            author: "Edsger Dijkstra".into(),
            resource_id: "RES1002".into(),
            category: "Programming".into(),
            publication_year: 1968,
            magazine: "Communications of the ACM".into(),
            volume: 11,
            issue: 3,
            doi: "10.1145/362929.362947".into(),
            start_page: 147,
            end_page: 148,
        },
    )
    .unwrap();
    resource_service::add_thesis(
        &mut catalog,
        ThesisInput {
            title: "Information Flow in Lattices".into(),
            author: "Dorothy Denning".into(),
            resource_id: "RES1003".into(),
            category: "Security".into(),
            publication_year: 1975,
            university: "Purdue University".into(),
            department: "Computer Science".into(),
            supervisor: "Peter Denning".into(),
            thesis_type: ThesisType::PhD,
            degree: "Ph.D.".into(),
            page_count: 180,
            abstract_text: "".into(),
        },
    )
    .unwrap();

    loan_service::borrow_resource(&mut catalog, "LOAN1001", "USER1001", "RES1001", at).unwrap();
    reservation_service::reserve_resource(&mut catalog, "RSV1001", "admin001", "RES1001", at)
        .unwrap();
    catalog
        .notifications
        .push(Notification::new("NOTIF1001", "USER1001", "Welcome to the library", at).unwrap());
    catalog.events.push(
        LibraryEvent::new("EVT1001", "Book Club", "Monthly meeting", at + DAY, "Room 1").unwrap(),
    );
    catalog
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_empty_catalog_round_trip_has_default_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.json");

    save_catalog(&path, &Catalog::default()).unwrap();
    let doc = read_json(&path);
    assert_eq!(doc["config"], json!({ "maxRenewals": 2, "loanPeriodDays": 14 }));
    assert_eq!(doc["users"], json!([]));
    assert_eq!(doc["events"], json!([]));

    let mut loaded = setup_catalog();
    let warnings = load_catalog(&path, &mut loaded).unwrap();
    assert!(warnings.is_empty());
    assert!(loaded.is_empty());
    assert_eq!(loaded.policy, LoanPolicy::default());
}

#[test]
fn test_full_round_trip_preserves_every_entity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.json");
    let catalog = setup_catalog();

    save_catalog(&path, &catalog).unwrap();
    let mut loaded = Catalog::default();
    load_catalog(&path, &mut loaded).unwrap();

    assert_eq!(loaded.policy.max_renewals(), 3);
    assert_eq!(loaded.policy.loan_period_days(), 21);
    assert_eq!(loaded.users, catalog.users);
    assert_eq!(loaded.loans, catalog.loans);
    assert_eq!(loaded.reservations, catalog.reservations);
    assert_eq!(loaded.notifications, catalog.notifications);
    assert_eq!(loaded.events, catalog.events);

    // resources compare by id, so check the variants field by field
    assert_eq!(loaded.resources.len(), 3);
    for (restored, original) in loaded.resources.iter().zip(&catalog.resources) {
        match (restored, original) {
            (Resource::Book(a), Resource::Book(b)) => assert_eq!(a, b),
            (Resource::Article(a), Resource::Article(b)) => assert_eq!(a, b),
            (Resource::Thesis(a), Resource::Thesis(b)) => assert_eq!(a, b),
            _ => panic!("variant changed for {}", original.resource_id()),
        }
    }
}

#[test]
fn test_document_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.json");
    save_catalog(&path, &setup_catalog()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.trim_start().starts_with("{\n  \"config\""));

    let doc = read_json(&path);
    let book = &doc["resources"][0];
    assert_eq!(book["type"], "Book");
    assert_eq!(book["numberOfPages"], -1);
    assert_eq!(book["isbn"], "N/A");
    assert_eq!(book["publisher"], "Unknown Publisher");
    assert_eq!(book["isAvailable"], false);
    assert_eq!(doc["resources"][2]["thesisType"], "PhD");
    assert_eq!(doc["users"][1]["role"], "Admin");
    assert_eq!(doc["loans"][0]["isReturned"], false);
    assert_eq!(doc["reservations"][0]["status"], "Pending");
    assert_eq!(doc["notifications"][0]["readFlag"], false);
}

#[test]
fn test_unknown_resource_type_fails_whole_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.json");
    save_catalog(&path, &setup_catalog()).unwrap();

    let mut doc = read_json(&path);
    doc["resources"][0]["type"] = json!("Magazine");
    fs::write(&path, doc.to_string()).unwrap();

    let mut catalog = Catalog::default();
    catalog
        .users
        .push(User::new("USER2002", "Grace Hopper", "grace@example.com", UserRole::Teacher).value);

    let err = load_catalog(&path, &mut catalog).unwrap_err();
    match err {
        PersistenceError::Record {
            collection,
            index,
            source: RecordError::UnknownResourceType(tag),
        } => {
            assert_eq!(collection, "resources");
            assert_eq!(index, 0);
            assert_eq!(tag, "Magazine");
        }
        other => panic!("unexpected error: {}", other),
    }
    // the previous in-memory state is kept
    assert_eq!(catalog.users.len(), 1);
    assert_eq!(catalog.users[0].user_id(), "USER2002");
}

#[test]
fn test_missing_required_field_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.json");
    save_catalog(&path, &setup_catalog()).unwrap();

    let mut doc = read_json(&path);
    doc["loans"][0].as_object_mut().unwrap().remove("dueDate");
    fs::write(&path, doc.to_string()).unwrap();

    let err = load_catalog(&path, &mut Catalog::default()).unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Record {
            collection: "loans",
            source: RecordError::MalformedRecord { .. },
            ..
        }
    ));
}

#[test]
fn test_missing_collections_load_as_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.JSON");
    fs::write(
        &path,
        json!({
            "config": { "maxRenewals": 99, "loanPeriodDays": 1000 },
            "users": [{
                "userId": "USER1001",
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "role": 3
            }],
            "events": null
        })
        .to_string(),
    )
    .unwrap();

    let mut catalog = Catalog::default();
    let warnings = load_catalog(&path, &mut catalog).unwrap();
    assert_eq!(warnings.len(), 2);
    assert_eq!(catalog.policy.max_renewals(), 10);
    assert_eq!(catalog.policy.loan_period_days(), 365);
    assert_eq!(catalog.users[0].role(), UserRole::Admin);
    assert!(catalog.resources.is_empty());
    assert!(catalog.events.is_empty());
}

#[test]
fn test_loaded_renewal_count_is_clamped_to_policy() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.json");
    let mut catalog = setup_catalog();
    let policy = catalog.policy;
    let loan = catalog.loans.iter_mut().next().unwrap();
    for _ in 0..3 {
        assert!(loan.renew(&policy).is_renewed());
    }
    save_catalog(&path, &catalog).unwrap();

    let mut doc = read_json(&path);
    doc["config"]["maxRenewals"] = json!(1);
    fs::write(&path, doc.to_string()).unwrap();

    let mut loaded = Catalog::default();
    load_catalog(&path, &mut loaded).unwrap();
    assert_eq!(loaded.loans[0].renewal_count(), 1);
}

#[test]
fn test_save_writes_backup_of_previous_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.json");

    save_catalog(&path, &Catalog::default()).unwrap();
    let first = fs::read_to_string(&path).unwrap();
    save_catalog(&path, &setup_catalog()).unwrap();

    assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), first);
    assert_ne!(fs::read_to_string(&path).unwrap(), first);
    assert!(!dir.path().join("library.json.tmp").exists());
}

#[test]
fn test_unreadable_file_survives_later_saves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.json");
    fs::write(&path, "{ not json").unwrap();

    let mut catalog = Catalog::default();
    assert!(matches!(load_catalog(&path, &mut catalog), Err(PersistenceError::Parse(_))));
    let kept = preserve_unreadable(&path).unwrap();

    save_catalog(&path, &catalog).unwrap();
    save_catalog(&path, &catalog).unwrap();
    assert_eq!(fs::read_to_string(&kept).unwrap(), "{ not json");
    assert_ne!(fs::read_to_string(backup_path(&path)).unwrap(), "{ not json");
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("library.json");
    save_catalog(&path, &setup_catalog()).unwrap();
    assert!(path.exists());
}

#[test]
fn test_file_boundary_errors() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::default();

    assert!(matches!(
        save_catalog(dir.path().join("library.txt"), &catalog),
        Err(PersistenceError::InvalidExtension(_))
    ));
    assert!(matches!(
        save_catalog("", &catalog),
        Err(PersistenceError::InvalidPath(_))
    ));
    assert!(matches!(
        load_catalog(dir.path().join("missing.json"), &mut Catalog::default()),
        Err(PersistenceError::NotFound(_))
    ));

    let garbage = dir.path().join("garbage.json");
    fs::write(&garbage, "{ not json").unwrap();
    assert!(matches!(
        load_catalog(&garbage, &mut Catalog::default()),
        Err(PersistenceError::Parse(_))
    ));
}

#[test]
fn test_sentinel_dates_round_trip() {
    let policy = LoanPolicy::default();
    let loan = Loan::new("LOAN1001", "USER1001", "RES1001", now(), 0, &policy).value;
    let doc = loan.to_document().unwrap();
    assert_eq!(Loan::from_document(&doc, &policy).unwrap().value, loan);

    let reservation = Reservation::new("RSV1001", "USER1001", "RES1001", 0).value;
    let doc = reservation.to_document().unwrap();
    assert_eq!(Reservation::from_document(&doc).unwrap().value, reservation);
}
