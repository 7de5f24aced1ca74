//! Customer model: the purchaser associated with an order.

use super::{require_text, ModelValidationError};
use serde::Serialize;
use std::fmt::{Display, Formatter};

pub type CustomerId = i64;

/// Loyalty tier. Persisted as a one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    #[default]
    Bronze,
    Silver,
    Gold,
}

impl Membership {
    pub const ALL: [Membership; 3] = [Self::Bronze, Self::Silver, Self::Gold];

    pub fn code(self) -> &'static str {
        match self {
            Self::Bronze => "B",
            Self::Silver => "S",
            Self::Gold => "G",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, ModelValidationError> {
        match code {
            "B" => Ok(Self::Bronze),
            "S" => Ok(Self::Silver),
            "G" => Ok(Self::Gold),
            other => Err(ModelValidationError::UnknownChoice {
                field: "membership",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// ISO `YYYY-MM-DD`, when known.
    pub birth_date: Option<String>,
    pub membership: Membership,
}

impl Customer {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_names(&self.first_name, &self.last_name, &self.email)
    }
}

impl Display for Customer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Insert payload for a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<String>,
    pub membership: Membership,
}

impl NewCustomer {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: String::new(),
            birth_date: None,
            membership: Membership::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_names(&self.first_name, &self.last_name, &self.email)
    }
}

fn validate_names(first: &str, last: &str, email: &str) -> Result<(), ModelValidationError> {
    require_text("customer", "first_name", first)?;
    require_text("customer", "last_name", last)?;
    require_text("customer", "email", email)
}
