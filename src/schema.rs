//! Table definitions and column-level validation.
//!
//! Each entity declares a static [`Schema`] describing its table and columns.
//! Storage backends read the table/column names from it, and the write
//! pipeline validates payloads against its constraints before anything is
//! hashed or persisted.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Per-column value constraint checked before a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Value must be present (`NOT NULL`).
    Required,
    /// Value must look like an email address.
    Email,
    /// Value must have at least this many characters.
    MinLen(usize),
}

/// Foreign key target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct References {
    pub table: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub primary_key: bool,
    pub unique: bool,
    pub references: Option<References>,
    pub constraints: &'static [Constraint],
}

impl Column {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            primary_key: false,
            unique: false,
            references: None,
            constraints: &[],
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some(References { table, column });
        self
    }

    pub const fn constraints(mut self, constraints: &'static [Constraint]) -> Self {
        self.constraints = constraints;
        self
    }
}

#[derive(Debug)]
pub struct Schema {
    /// Frozen table name (never pluralised).
    pub table: &'static str,
    pub columns: &'static [Column],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{table}.{field} cannot be null")]
    Required {
        table: &'static str,
        field: &'static str,
    },

    #[error("{field} must be a valid email address")]
    InvalidEmail { field: &'static str },

    #[error("{field} must be at least {min} characters long")]
    TooShort { field: &'static str, min: usize },

    #[error("unknown column {table}.{field}")]
    UnknownColumn { table: &'static str, field: String },
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

impl Schema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Quoted table identifier, safe for reserved words such as `user`.
    pub fn ident(&self) -> String {
        format!("\"{}\"", self.table)
    }

    /// Comma separated column list in declaration order.
    pub fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Unwraps a value for a `Required` column, failing when it is absent.
    pub fn require<T>(&self, field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
        value.ok_or(ValidationError::Required {
            table: self.table,
            field,
        })
    }

    /// Validates a value destined for an insert. Missing values fail
    /// `Required` columns.
    pub fn check_insert(&self, field: &str, value: Option<&str>) -> Result<(), ValidationError> {
        self.check(field, value, true)
    }

    /// Validates a value destined for a partial update. Missing values mean
    /// "leave unchanged" and always pass.
    pub fn check_update(&self, field: &str, value: Option<&str>) -> Result<(), ValidationError> {
        self.check(field, value, false)
    }

    fn check(&self, field: &str, value: Option<&str>, insert: bool) -> Result<(), ValidationError> {
        let column = self
            .column(field)
            .ok_or_else(|| ValidationError::UnknownColumn {
                table: self.table,
                field: field.to_string(),
            })?;

        let Some(value) = value else {
            if insert && column.constraints.contains(&Constraint::Required) {
                return Err(ValidationError::Required {
                    table: self.table,
                    field: column.name,
                });
            }
            return Ok(());
        };

        for constraint in column.constraints {
            match *constraint {
                Constraint::Required => {}
                Constraint::Email => {
                    if !is_valid_email(value) {
                        return Err(ValidationError::InvalidEmail { field: column.name });
                    }
                }
                Constraint::MinLen(min) => {
                    if value.chars().count() < min {
                        return Err(ValidationError::TooShort {
                            field: column.name,
                            min,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
