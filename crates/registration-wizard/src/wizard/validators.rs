//! Pure field rules. Absent input always passes the format rules so that the separate
//! `Required` rule owns the "missing value" message.

use chrono::{Datelike, Local};
use serde::Serialize;

use super::domain::Salary;
use super::salary;

/// Named reason a field value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    #[error("campo obrigatório")]
    Required,
    #[error("deve ter pelo menos {min} caracteres")]
    MinLength { min: usize },
    #[error("data inválida")]
    InvalidDate,
    #[error("CPF inválido")]
    InvalidNationalId,
    #[error("telefone inválido")]
    InvalidPhone,
    #[error("CEP inválido")]
    InvalidPostalCode,
    #[error("salário deve ser maior que zero")]
    NonPositiveSalary,
}

pub type FieldCheck = Result<(), FieldError>;

/// Borrowed view of a draft field handed to the rules.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Salary(&'a Salary),
}

impl FieldValue<'_> {
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Salary(salary) => salary.is_empty(),
        }
    }
}

/// Validation rule attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    MinLength(usize),
    BirthDate,
    NationalId,
    Phone,
    PostalCode,
    Salary,
}

impl Rule {
    pub fn check(self, value: FieldValue<'_>) -> FieldCheck {
        match (self, value) {
            (Rule::Required, value) => {
                if value.is_blank() {
                    Err(FieldError::Required)
                } else {
                    Ok(())
                }
            }
            (Rule::MinLength(min), FieldValue::Text(text)) => min_length(Some(text), min),
            (Rule::BirthDate, FieldValue::Text(text)) => validate_birth_date(Some(text)),
            (Rule::NationalId, FieldValue::Text(text)) => validate_national_id(Some(text)),
            (Rule::Phone, FieldValue::Text(text)) => validate_phone(Some(text)),
            (Rule::PostalCode, FieldValue::Text(text)) => validate_postal_code(Some(text)),
            (Rule::Salary, FieldValue::Salary(value)) => validate_salary(Some(value)),
            (Rule::Salary, FieldValue::Text(text)) => {
                validate_salary(Some(&Salary::RawText(text.to_string())))
            }
            // Text rules never apply to a salary value.
            (_, FieldValue::Salary(_)) => Ok(()),
        }
    }
}

/// Run every rule in order and report the first failure.
pub fn first_failure(rules: &[Rule], value: FieldValue<'_>) -> Option<FieldError> {
    rules.iter().find_map(|rule| rule.check(value).err())
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.is_empty())
}

pub fn min_length(raw: Option<&str>, min: usize) -> FieldCheck {
    match present(raw) {
        Some(value) if value.chars().count() < min => Err(FieldError::MinLength { min }),
        _ => Ok(()),
    }
}

/// `DD/MM/YYYY` birth date, checked against the current calendar year.
pub fn validate_birth_date(raw: Option<&str>) -> FieldCheck {
    validate_birth_date_in(raw, Local::now().year())
}

pub fn validate_birth_date_in(raw: Option<&str>, current_year: i32) -> FieldCheck {
    let Some(value) = present(raw) else {
        return Ok(());
    };

    let digits = digits_only(value);
    if digits.len() != 8 {
        return Err(FieldError::InvalidDate);
    }

    let parse = |range: std::ops::Range<usize>| digits[range].parse::<i32>().unwrap_or(0);
    let day = parse(0..2);
    let month = parse(2..4);
    let year = parse(4..8);

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(FieldError::InvalidDate);
    }
    if year < 1900 || year > current_year {
        return Err(FieldError::InvalidDate);
    }
    Ok(())
}

/// Eleven-digit CPF, format only; repeated-digit sequences are rejected.
pub fn validate_national_id(raw: Option<&str>) -> FieldCheck {
    let Some(value) = present(raw) else {
        return Ok(());
    };

    let digits = digits_only(value);
    if digits.len() != 11 {
        return Err(FieldError::InvalidNationalId);
    }

    let first = digits.as_bytes()[0];
    if digits.bytes().all(|digit| digit == first) {
        return Err(FieldError::InvalidNationalId);
    }
    Ok(())
}

pub fn validate_phone(raw: Option<&str>) -> FieldCheck {
    let Some(value) = present(raw) else {
        return Ok(());
    };

    match digits_only(value).len() {
        10 | 11 => Ok(()),
        _ => Err(FieldError::InvalidPhone),
    }
}

pub fn validate_postal_code(raw: Option<&str>) -> FieldCheck {
    let Some(value) = present(raw) else {
        return Ok(());
    };

    if digits_only(value).len() == 8 {
        Ok(())
    } else {
        Err(FieldError::InvalidPostalCode)
    }
}

pub fn validate_salary(value: Option<&Salary>) -> FieldCheck {
    let Some(salary) = value.filter(|salary| !salary.is_empty()) else {
        return Ok(());
    };

    let amount = match salary {
        Salary::Number(amount) => Some(*amount),
        Salary::RawText(text) => salary::parse_amount(text),
    };

    match amount {
        Some(amount) if amount > 0.0 => Ok(()),
        _ => Err(FieldError::NonPositiveSalary),
    }
}
