//! Input checks shared by the deck and card input types.

use crate::{Error, Result};

/// Trim `value` and require its length (in characters) to lie in
/// `min..=max`.
pub fn trimmed(field: &'static str, value: &str, min: usize, max: usize) -> Result<String> {
  let trimmed = value.trim();
  let len = trimmed.chars().count();

  if len < min {
    return Err(if min == 1 {
      Error::validation(field, "cannot be empty")
    } else {
      Error::validation(field, format!("must be at least {min} characters long"))
    });
  }
  if len > max {
    return Err(Error::validation(
      field,
      format!("must be no more than {max} characters long"),
    ));
  }

  Ok(trimmed.to_owned())
}
