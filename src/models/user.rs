use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::decode_record;
use crate::domain::validation::{is_valid_email, is_valid_identifier, is_valid_person_name};
use crate::domain::{Normalized, RecordError, ValidationWarning};

/// Role tag consulted by the shell; the core attaches no permissions to it
/// except the explicit admin role edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum UserRole {
    #[default]
    Student,
    Teacher,
    Employee,
    Admin,
}

impl UserRole {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Student),
            1 => Some(Self::Teacher),
            2 => Some(Self::Employee),
            3 => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Teacher => "Teacher",
            Self::Employee => "Employee",
            Self::Admin => "Admin",
        }
    }

    /// Employees and admins get the staff menu
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Employee | Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Student" => Ok(Self::Student),
            "Teacher" => Ok(Self::Teacher),
            "Employee" | "LibraryEmployee" => Ok(Self::Employee),
            "Admin" | "LibraryAdmin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

// Older catalogs stored the role as its integer index.
impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Index(i64),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Index(i) => UserRole::from_index(i)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown role index {}", i))),
            Repr::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Stored shape of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    user_id: String,
    name: String,
    email: String,
    role: UserRole,
}

fn is_valid_user_id(id: &str) -> bool {
    is_valid_identifier(id, 3, 20)
}

impl User {
    /// Build a user; invalid id, name or email are replaced by `""` with a warning.
    pub fn new(user_id: &str, name: &str, email: &str, role: UserRole) -> Normalized<User> {
        let mut warnings = Vec::new();

        let user_id = if user_id.is_empty() || is_valid_user_id(user_id) {
            user_id.to_string()
        } else {
            warnings.push(ValidationWarning::new("userId", "invalid user ID, using empty string"));
            String::new()
        };
        let name = if name.is_empty() || is_valid_person_name(name) {
            name.to_string()
        } else {
            warnings.push(ValidationWarning::new("name", "invalid name, using empty string"));
            String::new()
        };
        let email = if email.is_empty() || is_valid_email(email) {
            email.to_string()
        } else {
            warnings.push(ValidationWarning::new("email", "invalid email, using empty string"));
            String::new()
        };

        Normalized::new(
            User {
                user_id,
                name,
                email,
                role,
            },
            warnings,
        )
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Empty input clears the field; invalid input keeps the previous value.
    pub fn set_user_id(&mut self, user_id: &str) -> Option<ValidationWarning> {
        if !user_id.is_empty() && !is_valid_user_id(user_id) {
            return Some(ValidationWarning::new(
                "userId",
                "invalid user ID format, not updated",
            ));
        }
        self.user_id = user_id.to_string();
        None
    }

    pub fn set_name(&mut self, name: &str) -> Option<ValidationWarning> {
        if !name.is_empty() && !is_valid_person_name(name) {
            return Some(ValidationWarning::new("name", "invalid name format, not updated"));
        }
        self.name = name.to_string();
        None
    }

    pub fn set_email(&mut self, email: &str) -> Option<ValidationWarning> {
        if !email.is_empty() && !is_valid_email(email) {
            return Some(ValidationWarning::new("email", "invalid email format, not updated"));
        }
        self.email = email.to_string();
        None
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
    }

    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.to_record())
    }

    pub fn from_document(value: &serde_json::Value) -> Result<Normalized<User>, RecordError> {
        let record: UserRecord = decode_record("user", value)?;
        Ok(User::new(&record.user_id, &record.name, &record.email, record.role))
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) <{}> [{}]", self.name, self.user_id, self.email, self.role)
    }
}
