//! Identifier validation for type and member names.
//!
//! Names flow into generated SQL, so anything that is not a plain
//! identifier is rejected at reflection time.

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::{Result, StoreError};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

const MAX_IDENTIFIER_LEN: usize = 64;

pub fn validate_type_name(name: &str) -> Result<()> {
    validate(name, "type name")
}

pub fn validate_member_name(name: &str) -> Result<()> {
    validate(name, "member name")
}

fn validate(name: &str, what: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::Schema(format!("{} must not be empty", what)));
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(StoreError::Schema(format!(
            "{} '{}' exceeds {} characters",
            what, name, MAX_IDENTIFIER_LEN
        )));
    }
    if !IDENTIFIER.is_match(name) {
        return Err(StoreError::Schema(format!(
            "{} '{}' is not a valid identifier",
            what, name
        )));
    }
    Ok(())
}
