//! Domain entities read from the case/document store.
//!
//! These mirror the rows owned by the case-management side of the system.
//! The query engine only ever reads them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a legal case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    Open,
    Closed,
    /// Any status value outside the two the workflow defines.
    Other(String),
}

impl CaseStatus {
    /// Stored representation (`ABIERTO`, `CERRADO`, or the raw value).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "ABIERTO",
            Self::Closed => "CERRADO",
            Self::Other(raw) => raw,
        }
    }

    pub fn from_stored(raw: &str) -> Self {
        match raw {
            "ABIERTO" => Self::Open,
            "CERRADO" => Self::Closed,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A legal matter with a unique case number (e.g. `CIV-2024-001`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: i64,
    pub number: String,
    pub case_type: String,
    pub description: String,
    pub status: CaseStatus,
    pub priority: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A filed document. Reaches its case through carpeta → expediente → caso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub type_id: i64,
    pub stage_id: Option<i64>,
    /// Free-text keyword field; empty when the clerk left it blank.
    pub keywords: String,
    pub folder_id: i64,
    pub date: Option<NaiveDate>,
    pub status: String,
}

/// Role tag stored on every actor row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    Lawyer,
    Client,
    Assistant,
}

impl ActorRole {
    /// Three-letter code used in storage.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Lawyer => "ABO",
            Self::Client => "CLI",
            Self::Assistant => "ASI",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ABO" => Some(Self::Lawyer),
            "CLI" => Some(Self::Client),
            "ASI" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// Display label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lawyer => "Abogado",
            Self::Client => "Cliente",
            Self::Assistant => "Asistente",
        }
    }
}

/// Whether a client is an individual or a legal entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientKind {
    Individual,
    Corporate,
}

impl ClientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "NATURAL",
            Self::Corporate => "JURIDICO",
        }
    }

    pub fn from_stored(raw: &str) -> Option<Self> {
        match raw {
            "NATURAL" => Some(Self::Individual),
            "JURIDICO" => Some(Self::Corporate),
            _ => None,
        }
    }
}

/// Subtype-specific attributes. Exactly one variant applies per actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActorProfile {
    Lawyer {
        license_number: String,
        speciality: String,
        license_status: String,
    },
    Client {
        kind: ClientKind,
    },
    Assistant {
        area: String,
        position: String,
    },
}

impl ActorProfile {
    /// Labelled attribute pairs for display, in a fixed order.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Lawyer {
                license_number,
                speciality,
                license_status,
            } => vec![
                ("Especialidad", speciality.clone()),
                ("Credencial", license_number.clone()),
                ("Estado licencia", license_status.clone()),
            ],
            Self::Client { kind } => vec![("Tipo cliente", kind.as_str().to_string())],
            Self::Assistant { area, position } => {
                vec![("Área", area.clone()), ("Cargo", position.clone())]
            }
        }
    }
}

/// A person record: lawyer, client, or assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub user_id: Option<i64>,
    pub role: ActorRole,
    pub given_names: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub national_id: String,
    pub phone: String,
    pub status: String,
    /// `None` when the subtype row has not been created yet.
    pub profile: Option<ActorProfile>,
}

impl Actor {
    pub fn full_name(&self) -> String {
        [
            self.given_names.as_str(),
            self.paternal_surname.as_str(),
            self.maternal_surname.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Login account. May be linked to at most one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_active: bool,
    pub role: Option<String>,
}

/// The authenticated identity a query runs under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}
