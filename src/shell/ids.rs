use crate::services::Catalog;

const FIRST_ID: u32 = 1001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    User,
    Resource,
    Loan,
    Reservation,
    Notification,
    Event,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::User => "USER",
            IdKind::Resource => "RES",
            IdKind::Loan => "LOAN",
            IdKind::Reservation => "RSV",
            IdKind::Notification => "NOTIF",
            IdKind::Event => "EVT",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

/// Prefix + counter identifiers, one counter per kind. Ids already present in
/// the catalog are skipped, so a generator started after a load never reuses one.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: [u32; 6],
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: [FIRST_ID; 6] }
    }
}

impl IdGenerator {
    pub fn next_id(&mut self, kind: IdKind, catalog: &Catalog) -> String {
        let counter = &mut self.next[kind.slot()];
        loop {
            let candidate = format!("{}{}", kind.prefix(), counter);
            *counter = counter.saturating_add(1);
            if !catalog.is_id_taken(&candidate) {
                return candidate;
            }
        }
    }
}
