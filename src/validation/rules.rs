use validator::{Validate, ValidationError};

use crate::{domain::models::Attributes, services::errors::ResolverError};

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub fn check<T: Validate>(args: &T) -> Result<(), ResolverError> {
    args.validate()
        .map_err(|errors| ResolverError::Validation(errors.to_string()))
}

/// Attribute names become table attribute names, so they must be non-empty.
pub fn check_attribute_names(attributes: &Attributes) -> Result<(), ResolverError> {
    if attributes.keys().any(|name| name.trim().is_empty()) {
        return Err(ResolverError::Validation(
            "attribute names must not be empty".into(),
        ));
    }
    Ok(())
}
