//! Field-level rules shared by the create/update operations.
//!
//! Every function here is pure: it takes raw request input and returns the
//! normalized value or the first [`ValidationError`] encountered.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Currency applied to payments that do not name one.
pub const DEFAULT_CURRENCY: &str = "MXN";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("email is not a valid address")]
    InvalidEmail,
    #[error("monthlyPrice cannot be negative")]
    NegativePrice,
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("{field} is required")]
    MissingReference { field: &'static str },
    #[error("{field} does not reference an existing record")]
    UnknownReference { field: &'static str },
}

impl ValidationError {
    /// Request field the error refers to, in wire (camelCase) form.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::MissingReference { field }
            | Self::UnknownReference { field } => field,
            Self::InvalidEmail => "email",
            Self::NegativePrice => "monthlyPrice",
            Self::NonPositiveAmount => "amount",
        }
    }

    /// Machine-readable name of the violated rule.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::Required { .. } => "required",
            Self::InvalidEmail => "email_format",
            Self::NegativePrice => "non_negative",
            Self::NonPositiveAmount => "positive",
            Self::MissingReference { .. } => "missing_reference",
            Self::UnknownReference { .. } => "unknown_reference",
        }
    }
}

/// Trim a mandatory text field, rejecting blank input.
pub fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank collapses to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Trim and lowercase an email address after checking it is present and
/// contains `@`.
pub fn email(value: &str) -> Result<String, ValidationError> {
    let trimmed = required_text("email", value)?;
    if !trimmed.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(trimmed.to_lowercase())
}

pub fn monthly_price(value: Decimal) -> Result<Decimal, ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativePrice);
    }
    Ok(value)
}

pub fn payment_amount(value: Decimal) -> Result<Decimal, ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(value)
}

/// Upper-cased currency code, defaulting to [`DEFAULT_CURRENCY`].
pub fn currency(value: Option<&str>) -> String {
    optional_text(value)
        .map(|code| code.to_uppercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

/// Reject absent or nil reference ids.
pub fn reference(field: &'static str, value: Option<Uuid>) -> Result<Uuid, ValidationError> {
    match value {
        Some(id) if !id.is_nil() => Ok(id),
        _ => Err(ValidationError::MissingReference { field }),
    }
}

/// Normalized first/last name and email shared by students and teachers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl PersonFields {
    pub fn parse(first_name: &str, last_name: &str, email: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            first_name: required_text("firstName", first_name)?,
            last_name: required_text("lastName", last_name)?,
            email: self::email(email)?,
        })
    }
}

/// Normalized course fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFields {
    pub name: String,
    pub description: Option<String>,
    pub monthly_price: Decimal,
}

impl CourseFields {
    pub fn parse(
        name: &str,
        description: Option<&str>,
        monthly_price: Decimal,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("name", name)?,
            description: optional_text(description),
            monthly_price: self::monthly_price(monthly_price)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("name", "  B1 Evening  ").unwrap(), "B1 Evening");
        assert_eq!(
            required_text("name", "   "),
            Err(ValidationError::Required { field: "name" })
        );
        assert_eq!(
            required_text("name", ""),
            Err(ValidationError::Required { field: "name" })
        );
    }

    #[test]
    fn optional_text_collapses_blank_to_none() {
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" cash ")), Some("cash".to_string()));
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(email("  Ana@X.com ").unwrap(), "ana@x.com");
    }

    #[test]
    fn email_rules_are_checked_in_order() {
        assert_eq!(
            email("  "),
            Err(ValidationError::Required { field: "email" })
        );
        assert_eq!(email("ana.x.com"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn monthly_price_accepts_zero_and_rejects_negative() {
        assert_eq!(monthly_price(dec("0")).unwrap(), Decimal::ZERO);
        assert_eq!(monthly_price(dec("1200.50")).unwrap(), dec("1200.50"));
        assert_eq!(
            monthly_price(dec("-0.01")),
            Err(ValidationError::NegativePrice)
        );
    }

    #[test]
    fn payment_amount_must_be_positive() {
        assert_eq!(payment_amount(dec("0.01")).unwrap(), dec("0.01"));
        assert_eq!(
            payment_amount(Decimal::ZERO),
            Err(ValidationError::NonPositiveAmount)
        );
        assert_eq!(
            payment_amount(dec("-5")),
            Err(ValidationError::NonPositiveAmount)
        );
    }

    #[test]
    fn currency_defaults_and_uppercases() {
        assert_eq!(currency(None), "MXN");
        assert_eq!(currency(Some("   ")), "MXN");
        assert_eq!(currency(Some(" usd ")), "USD");
    }

    #[test]
    fn reference_rejects_nil_and_missing() {
        let id = Uuid::new_v4();
        assert_eq!(reference("studentId", Some(id)).unwrap(), id);
        assert_eq!(
            reference("studentId", Some(Uuid::nil())),
            Err(ValidationError::MissingReference { field: "studentId" })
        );
        assert_eq!(
            reference("courseId", None),
            Err(ValidationError::MissingReference { field: "courseId" })
        );
    }

    #[test]
    fn person_fields_report_first_failure() {
        assert_eq!(
            PersonFields::parse(" ", "Pérez", "ana@x.com"),
            Err(ValidationError::Required { field: "firstName" })
        );
        assert_eq!(
            PersonFields::parse("Ana", "", "ana@x.com"),
            Err(ValidationError::Required { field: "lastName" })
        );

        let fields = PersonFields::parse(" Ana ", " Pérez ", " ANA@X.COM ").unwrap();
        assert_eq!(fields.first_name, "Ana");
        assert_eq!(fields.last_name, "Pérez");
        assert_eq!(fields.email, "ana@x.com");
    }

    #[test]
    fn course_fields_normalize_description() {
        let fields = CourseFields::parse("B1", Some("  "), dec("1200.50")).unwrap();
        assert_eq!(fields.description, None);
        assert_eq!(fields.monthly_price, dec("1200.50"));

        assert_eq!(
            CourseFields::parse("B1", None, dec("-1")),
            Err(ValidationError::NegativePrice)
        );
    }
}
