// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::Customer;

/// Validates that a customer's identity fields are usable.
///
/// # Arguments
///
/// * `customer` - The customer to validate
///
/// # Errors
///
/// Returns an error if:
/// - The email does not contain exactly one `@`
/// - The local part or the domain of the email is empty
/// - The name is empty
pub fn validate_customer(customer: &Customer) -> Result<(), DomainError> {
    validate_email(&customer.email)?;

    // Rule: name must not be empty
    if customer.name.trim().is_empty() {
        return Err(DomainError::InvalidCustomerName(String::from(
            "Name cannot be empty",
        )));
    }

    Ok(())
}

/// Validates the shape of an email address.
///
/// This is a structural check only; deliverability is not verified.
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` if the address is malformed.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let trimmed: &str = email.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidEmail(String::from(
            "Email cannot be empty",
        )));
    }

    if trimmed.matches('@').count() != 1 {
        return Err(DomainError::InvalidEmail(format!(
            "'{trimmed}' must contain exactly one '@'"
        )));
    }

    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::InvalidEmail(format!(
            "'{trimmed}' must have a non-empty local part and domain"
        ))),
    }
}
