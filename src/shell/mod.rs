//! Interactive shell
//!
//! A line-oriented menu over any `BufRead`/`Write` pair. It reads primitive
//! values, hands them to the services and prints what comes back; all rules
//! live below it. End of input behaves like choosing "Exit".

pub mod ids;

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::domain::ValidationWarning;
use crate::infrastructure::persistence;
use crate::models::{
    ArticleInput, BookInput, RenewalOutcome, Resource, ThesisInput, ThesisType, UserRole,
    format_timestamp, now,
};
use crate::services::{
    Catalog, ServiceError, event_service, loan_service, notification_service, reservation_service,
    resource_service, user_service,
};
use ids::{IdGenerator, IdKind};

const EVENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn render(resources: Vec<&Resource>) -> Vec<String> {
    resources.iter().map(|r| r.display_info()).collect()
}

pub struct Shell<R, W> {
    catalog: Catalog,
    data_file: PathBuf,
    ids: IdGenerator,
    input: R,
    output: W,
    current_user: Option<String>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(catalog: Catalog, data_file: impl Into<PathBuf>, input: R, output: W) -> Self {
        Self {
            catalog,
            data_file: data_file.into(),
            ids: IdGenerator::default(),
            input,
            output,
            current_user: None,
        }
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Run the main menu until the user exits or input ends
    pub fn run(&mut self) -> io::Result<()> {
        match self.main_menu() {
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(()),
            other => other,
        }
    }

    // --- Input helpers ---

    fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    fn prompt(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).trim().to_string())
    }

    /// `None` (after telling the user) when the text is not a number
    fn prompt_number<T: FromStr>(&mut self, label: &str) -> io::Result<Option<T>> {
        let text = self.prompt(label)?;
        match text.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                self.say(format!("'{}' is not a valid number.", text))?;
                Ok(None)
            }
        }
    }

    /// Numbers that may be left blank, meaning "unknown" (-1)
    fn prompt_optional_number(&mut self, label: &str) -> io::Result<i32> {
        let text = self.prompt(label)?;
        Ok(text.parse().unwrap_or(-1))
    }

    fn report<T>(
        &mut self,
        result: Result<T, ServiceError>,
        success: &str,
    ) -> io::Result<Option<T>> {
        match result {
            Ok(value) => {
                self.say(success)?;
                Ok(Some(value))
            }
            Err(e) => {
                self.say(format!("Error: {}", e))?;
                Ok(None)
            }
        }
    }

    fn report_warnings(
        &mut self,
        result: Result<Vec<ValidationWarning>, ServiceError>,
        success: &str,
    ) -> io::Result<()> {
        if let Some(warnings) = self.report(result, success)? {
            for warning in warnings {
                self.say(format!("  note: {}", warning))?;
            }
        }
        Ok(())
    }

    fn list<T: Display>(&mut self, items: &[T], empty: &str) -> io::Result<()> {
        if items.is_empty() {
            return self.say(empty);
        }
        for item in items {
            writeln!(self.output, "{}", item)?;
        }
        Ok(())
    }

    fn user_id(&self) -> String {
        self.current_user.clone().unwrap_or_default()
    }

    // --- Main menu ---

    fn main_menu(&mut self) -> io::Result<()> {
        loop {
            self.say("\n=== Library Catalog ===")?;
            self.say("1. Login\n2. Register\n3. Upcoming events\n4. Save catalog\n0. Exit")?;
            match self.prompt("Choice")?.as_str() {
                "1" => self.login()?,
                "2" => self.register()?,
                "3" => self.show_events()?,
                "4" => self.save()?,
                "0" => {
                    self.say("Goodbye.")?;
                    return Ok(());
                }
                other => self.say(format!("Unknown option '{}'.", other))?,
            }
        }
    }

    fn login(&mut self) -> io::Result<()> {
        let user_id = self.prompt("User ID")?;
        let name = match user_service::get_user(&self.catalog, &user_id) {
            Ok(user) => user.name().to_string(),
            Err(e) => return self.say(format!("Error: {}", e)),
        };
        self.say(format!("Welcome, {}!", name))?;
        let unread = notification_service::unread_count(&self.catalog, &user_id);
        if unread > 0 {
            self.say(format!("You have {} unread notification(s).", unread))?;
        }
        self.current_user = Some(user_id);
        let result = self.user_menu();
        self.current_user = None;
        result
    }

    fn register(&mut self) -> io::Result<()> {
        let name = self.prompt("Full name")?;
        let email = self.prompt("Email")?;
        let role = match self.prompt("Role (1 Student, 2 Teacher)")?.as_str() {
            "2" => UserRole::Teacher,
            _ => UserRole::Student,
        };
        let user_id = self.ids.next_id(IdKind::User, &self.catalog);
        let result = user_service::register_user(&mut self.catalog, &user_id, &name, &email, role);
        self.report_warnings(result, &format!("Registered. Your user ID is {}", user_id))
    }

    fn show_events(&mut self) -> io::Result<()> {
        let events: Vec<String> = event_service::upcoming_events(&self.catalog, now())
            .iter()
            .map(|e| e.to_string())
            .collect();
        self.list(&events, "No upcoming events.")
    }

    fn save(&mut self) -> io::Result<()> {
        match persistence::save_catalog(&self.data_file, &self.catalog) {
            Ok(()) => self.say(format!("Catalog saved to {}.", self.data_file.display())),
            Err(e) => self.say(format!("Save failed: {}", e)),
        }
    }

    fn load(&mut self) -> io::Result<()> {
        match persistence::load_catalog(&self.data_file, &mut self.catalog) {
            Ok(warnings) => self.say(format!(
                "Catalog loaded from {} ({} warning(s)).",
                self.data_file.display(),
                warnings.len()
            )),
            Err(e) => self.say(format!("Load failed: {}", e)),
        }
    }

    // --- User menu ---

    fn user_menu(&mut self) -> io::Result<()> {
        loop {
            self.say("\n--- Menu ---")?;
            self.say(
                "1. Search by keyword\n2. Browse by category\n3. Browse by author\n\
                 4. Borrow\n5. Return\n6. Renew\n7. My loans\n\
                 8. Reserve\n9. Cancel reservation\n10. My reservations\n\
                 11. Notifications\n12. Mark notification read",
            )?;
            let staff = user_service::is_staff(&self.catalog, &self.user_id());
            if staff {
                self.say("13. Staff menu")?;
            }
            self.say("0. Logout")?;

            match self.prompt("Choice")?.as_str() {
                "1" => {
                    let keyword = self.prompt("Keyword")?;
                    let found = render(resource_service::search_resources(&self.catalog, &keyword));
                    self.list(&found, "No matching resources.")?;
                }
                "2" => {
                    let category = self.prompt("Category")?;
                    let found =
                        render(resource_service::filter_by_category(&self.catalog, &category));
                    self.list(&found, "No matching resources.")?;
                }
                "3" => {
                    let author = self.prompt("Author")?;
                    let found = render(resource_service::filter_by_author(&self.catalog, &author));
                    self.list(&found, "No matching resources.")?;
                }
                "4" => self.borrow()?,
                "5" => {
                    let resource_id = self.prompt("Resource ID")?;
                    let user_id = self.user_id();
                    let result = loan_service::return_resource(
                        &mut self.catalog,
                        &user_id,
                        &resource_id,
                        now(),
                    );
                    self.report(result, "Returned. Thank you!")?;
                }
                "6" => self.renew()?,
                "7" => self.my_loans()?,
                "8" => self.reserve()?,
                "9" => {
                    let reservation_id = self.prompt("Reservation ID")?;
                    let user_id = self.user_id();
                    let result = reservation_service::cancel_reservation(
                        &mut self.catalog,
                        &user_id,
                        &reservation_id,
                    );
                    self.report(result, "Reservation canceled.")?;
                }
                "10" => {
                    let user_id = self.user_id();
                    let pending: Vec<String> =
                        reservation_service::pending_reservations_for(&self.catalog, &user_id)
                            .iter()
                            .map(|r| {
                                format!(
                                    "{} -> {} (since {})",
                                    r.reservation_id(),
                                    r.resource_id(),
                                    format_timestamp(r.reservation_date())
                                )
                            })
                            .collect();
                    self.list(&pending, "No pending reservations.")?;
                }
                "11" => {
                    let user_id = self.user_id();
                    let inbox: Vec<String> = notification_service::inbox(&self.catalog, &user_id)
                        .iter()
                        .map(|n| n.to_string())
                        .collect();
                    self.list(&inbox, "No notifications.")?;
                }
                "12" => {
                    let notification_id = self.prompt("Notification ID")?;
                    let user_id = self.user_id();
                    let result = notification_service::mark_notification_read(
                        &mut self.catalog,
                        &user_id,
                        &notification_id,
                    );
                    self.report(result, "Marked as read.")?;
                }
                "13" if staff => self.staff_menu()?,
                "0" => return Ok(()),
                other => self.say(format!("Unknown option '{}'.", other))?,
            }
        }
    }

    fn borrow(&mut self) -> io::Result<()> {
        let resource_id = self.prompt("Resource ID")?;
        let loan_id = self.ids.next_id(IdKind::Loan, &self.catalog);
        let user_id = self.user_id();
        let result = loan_service::borrow_resource(
            &mut self.catalog,
            &loan_id,
            &user_id,
            &resource_id,
            now(),
        );
        if let Some(loan) = self.report(result, "Borrowed.")? {
            self.say(format!(
                "Loan {} is due {}.",
                loan.loan_id(),
                format_timestamp(loan.due_date())
            ))?;
        }
        Ok(())
    }

    fn renew(&mut self) -> io::Result<()> {
        let resource_id = self.prompt("Resource ID")?;
        let user_id = self.user_id();
        let result = loan_service::renew_loan(&mut self.catalog, &user_id, &resource_id, now());
        let message = match result {
            Ok(RenewalOutcome::Renewed { due_date }) => {
                format!("Renewed until {}.", format_timestamp(due_date))
            }
            Ok(RenewalOutcome::LimitReached) => "Renewal limit reached.".to_string(),
            Ok(RenewalOutcome::Overdue) => "Overdue loans cannot be renewed.".to_string(),
            Ok(refused) => format!("Cannot renew: {:?}.", refused),
            Err(e) => format!("Error: {}", e),
        };
        self.say(message)
    }

    fn my_loans(&mut self) -> io::Result<()> {
        let at = now();
        let loans: Vec<String> = loan_service::active_loans_for(&self.catalog, &self.user_id())
            .iter()
            .map(|l| {
                format!(
                    "{}: {} due {}{} (renewed {} time(s))",
                    l.loan_id(),
                    l.resource_id(),
                    format_timestamp(l.due_date()),
                    if l.is_overdue_at(at) { " OVERDUE" } else { "" },
                    l.renewal_count()
                )
            })
            .collect();
        self.list(&loans, "No active loans.")
    }

    fn reserve(&mut self) -> io::Result<()> {
        let resource_id = self.prompt("Resource ID")?;
        let reservation_id = self.ids.next_id(IdKind::Reservation, &self.catalog);
        let user_id = self.user_id();
        let result = reservation_service::reserve_resource(
            &mut self.catalog,
            &reservation_id,
            &user_id,
            &resource_id,
            now(),
        );
        self.report(result, &format!("Reserved. Reservation ID: {}", reservation_id))?;
        Ok(())
    }

    // --- Staff menu ---

    fn staff_menu(&mut self) -> io::Result<()> {
        loop {
            self.say("\n--- Staff ---")?;
            self.say(
                "1. Add book\n2. Add article\n3. Add thesis\n4. Remove resource\n\
                 5. All resources\n6. All users\n7. Change user role\n8. Overdue loans\n\
                 9. Pending reservations\n10. Fulfill reservation\n11. Send notification\n\
                 12. Create event\n13. Save catalog\n14. Reload catalog\n15. Loan history\n0. Back",
            )?;
            match self.prompt("Choice")?.as_str() {
                "1" => self.add_book()?,
                "2" => self.add_article()?,
                "3" => self.add_thesis()?,
                "4" => {
                    let resource_id = self.prompt("Resource ID")?;
                    let result = resource_service::remove_resource(&mut self.catalog, &resource_id);
                    self.report(result, "Resource removed.")?;
                }
                "5" => {
                    let all = render(self.catalog.resources.iter().collect());
                    self.list(&all, "The catalog has no resources.")?;
                }
                "6" => {
                    let users: Vec<String> =
                        self.catalog.users.iter().map(|u| u.to_string()).collect();
                    self.list(&users, "No users.")?;
                }
                "7" => self.change_role()?,
                "8" => {
                    let overdue: Vec<String> = loan_service::overdue_loans(&self.catalog, now())
                        .iter()
                        .map(|l| {
                            format!(
                                "{}: {} held by {} since {}",
                                l.loan_id(),
                                l.resource_id(),
                                l.user_id(),
                                format_timestamp(l.due_date())
                            )
                        })
                        .collect();
                    self.list(&overdue, "No overdue loans.")?;
                }
                "9" => {
                    let pending: Vec<String> =
                        reservation_service::pending_reservations(&self.catalog)
                            .iter()
                            .map(|r| {
                                let (id, resource) = (r.reservation_id(), r.resource_id());
                                format!("{}: {} for {}", id, resource, r.user_id())
                            })
                            .collect();
                    self.list(&pending, "No pending reservations.")?;
                }
                "10" => {
                    let reservation_id = self.prompt("Reservation ID")?;
                    let result = reservation_service::fulfill_reservation(
                        &mut self.catalog,
                        &reservation_id,
                        now(),
                    );
                    self.report(result, "Reservation fulfilled.")?;
                }
                "11" => self.send_notification()?,
                "12" => self.create_event()?,
                "13" => self.save()?,
                "14" => self.load()?,
                "15" => {
                    let user_id = self.prompt("User ID")?;
                    let history: Vec<String> = loan_service::loan_history(&self.catalog, &user_id)
                        .iter()
                        .map(|l| {
                            let state = if l.is_returned() {
                                format!("returned {}", format_timestamp(l.return_date()))
                            } else {
                                format!("due {}", format_timestamp(l.due_date()))
                            };
                            format!(
                                "{}: {} borrowed {}, {}",
                                l.loan_id(),
                                l.resource_id(),
                                format_timestamp(l.borrow_date()),
                                state
                            )
                        })
                        .collect();
                    self.list(&history, "No loans.")?;
                }
                "0" => return Ok(()),
                other => self.say(format!("Unknown option '{}'.", other))?,
            }
        }
    }

    fn prompt_common(&mut self) -> io::Result<Option<(String, String, String, i32)>> {
        let title = self.prompt("Title")?;
        let author = self.prompt("Author")?;
        let category = self.prompt("Category (blank for General)")?;
        let Some(year) = self.prompt_number("Publication year")? else {
            return Ok(None);
        };
        Ok(Some((title, author, category, year)))
    }

    fn add_book(&mut self) -> io::Result<()> {
        let Some((title, author, category, publication_year)) = self.prompt_common()? else {
            return Ok(());
        };
        let publisher = self.prompt("Publisher")?;
        let number_of_pages = self.prompt_optional_number("Pages")?;
        let isbn = self.prompt("ISBN (blank for none)")?;
        let edition = self.prompt("Edition")?;
        let resource_id = self.ids.next_id(IdKind::Resource, &self.catalog);
        let result = resource_service::add_book(
            &mut self.catalog,
            BookInput {
                title,
                author,
                resource_id: resource_id.clone(),
                category,
                publication_year,
                publisher,
                number_of_pages,
                isbn,
                edition,
            },
        );
        self.report_warnings(result, &format!("Book added as {}.", resource_id))
    }

    fn add_article(&mut self) -> io::Result<()> {
        let Some((title, author, category, publication_year)) = self.prompt_common()? else {
            return Ok(());
        };
        let magazine = self.prompt("Magazine")?;
        let volume = self.prompt_optional_number("Volume")?;
        let issue = self.prompt_optional_number("Issue")?;
        let doi = self.prompt("DOI (blank for none)")?;
        let start_page = self.prompt_optional_number("Start page")?;
        let end_page = self.prompt_optional_number("End page")?;
        let resource_id = self.ids.next_id(IdKind::Resource, &self.catalog);
        let result = resource_service::add_article(
            &mut self.catalog,
            ArticleInput {
                title,
                author,
                resource_id: resource_id.clone(),
                category,
                publication_year,
                magazine,
                volume,
                issue,
                doi,
                start_page,
                end_page,
            },
        );
        self.report_warnings(result, &format!("Article added as {}.", resource_id))
    }

    fn add_thesis(&mut self) -> io::Result<()> {
        let Some((title, author, category, publication_year)) = self.prompt_common()? else {
            return Ok(());
        };
        let university = self.prompt("University")?;
        let department = self.prompt("Department")?;
        let supervisor = self.prompt("Supervisor")?;
        let choice = self.prompt("Type (1 Bachelor, 2 Master, 3 PhD, 4 Research)")?;
        let thesis_type = match choice.as_str() {
            "2" => ThesisType::Master,
            "3" => ThesisType::PhD,
            "4" => ThesisType::Research,
            _ => ThesisType::Bachelor,
        };
        let degree = self.prompt("Degree")?;
        let page_count = self.prompt_optional_number("Pages")?;
        let abstract_text = self.prompt("Abstract")?;
        let resource_id = self.ids.next_id(IdKind::Resource, &self.catalog);
        let result = resource_service::add_thesis(
            &mut self.catalog,
            ThesisInput {
                title,
                author,
                resource_id: resource_id.clone(),
                category,
                publication_year,
                university,
                department,
                supervisor,
                thesis_type,
                degree,
                page_count,
                abstract_text,
            },
        );
        self.report_warnings(result, &format!("Thesis added as {}.", resource_id))
    }

    fn change_role(&mut self) -> io::Result<()> {
        let target = self.prompt("User ID")?;
        let answer = self.prompt("New role (Student, Teacher, Employee, Admin)")?;
        let role = match answer.parse::<UserRole>() {
            Ok(role) => role,
            Err(e) => return self.say(format!("Error: {}", e)),
        };
        let user_id = self.user_id();
        let result = user_service::set_role(&mut self.catalog, &user_id, &target, role);
        self.report(result, "Role updated.")?;
        Ok(())
    }

    fn send_notification(&mut self) -> io::Result<()> {
        let recipient = self.prompt("Recipient user ID")?;
        let message = self.prompt("Message")?;
        let notification_id = self.ids.next_id(IdKind::Notification, &self.catalog);
        let result = notification_service::send_notification(
            &mut self.catalog,
            &notification_id,
            &recipient,
            &message,
            now(),
        );
        self.report(result, "Notification sent.")?;
        Ok(())
    }

    fn create_event(&mut self) -> io::Result<()> {
        let title = self.prompt("Title")?;
        let description = self.prompt("Description")?;
        let location = self.prompt("Location")?;
        let when = self.prompt("Date (YYYY-MM-DD HH:MM, UTC)")?;
        let event_date = match NaiveDateTime::parse_from_str(&when, EVENT_DATE_FORMAT) {
            Ok(date) => date.and_utc().timestamp(),
            Err(e) => return self.say(format!("Invalid date '{}': {}", when, e)),
        };
        let event_id = self.ids.next_id(IdKind::Event, &self.catalog);
        let result = event_service::create_event(
            &mut self.catalog,
            &event_id,
            &title,
            &description,
            event_date,
            &location,
            now(),
        );
        self.report(result, &format!("Event {} created.", event_id))?;
        Ok(())
    }
}
