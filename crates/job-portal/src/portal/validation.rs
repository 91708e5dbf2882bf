use super::domain::{JobDraft, JobPatch};
use super::error::PortalError;

const TITLE: (usize, usize) = (2, 100);
const DESCRIPTION: (usize, usize) = (10, 2000);
const LOCATION: (usize, usize) = (2, 100);
const SALARY: (usize, usize) = (1, 50);
const COMPANY: (usize, usize) = (2, 100);
const NAME: (usize, usize) = (2, 50);
pub(crate) const MIN_PASSWORD_LEN: usize = 6;

/// Trim `value` and check its length in characters.
fn bounded(field: &str, value: &str, (min, max): (usize, usize)) -> Result<String, PortalError> {
    let trimmed = value.trim();
    let length = trimmed.chars().count();
    if length < min || length > max {
        return Err(PortalError::invalid_input(format!(
            "{field} must be {min}-{max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn bounded_opt(
    field: &str,
    value: Option<String>,
    limits: (usize, usize),
) -> Result<Option<String>, PortalError> {
    value
        .map(|value| bounded(field, &value, limits))
        .transpose()
}

impl JobDraft {
    pub(crate) fn validated(self) -> Result<Self, PortalError> {
        Ok(Self {
            title: bounded("title", &self.title, TITLE)?,
            description: bounded("description", &self.description, DESCRIPTION)?,
            location: bounded("location", &self.location, LOCATION)?,
            salary: bounded("salary", &self.salary, SALARY)?,
            company: bounded("company", &self.company, COMPANY)?,
        })
    }
}

impl JobPatch {
    pub(crate) fn validated(self) -> Result<Self, PortalError> {
        Ok(Self {
            title: bounded_opt("title", self.title, TITLE)?,
            description: bounded_opt("description", self.description, DESCRIPTION)?,
            location: bounded_opt("location", self.location, LOCATION)?,
            salary: bounded_opt("salary", self.salary, SALARY)?,
            company: bounded_opt("company", self.company, COMPANY)?,
        })
    }
}

pub(crate) fn name(value: &str) -> Result<String, PortalError> {
    bounded("name", value, NAME)
}

/// Lowercased, trimmed address of the form `local@domain.tld`.
pub(crate) fn email(value: &str) -> Result<String, PortalError> {
    let normalized = value.trim().to_lowercase();
    let valid = match normalized.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
                && !normalized.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(normalized)
    } else {
        Err(PortalError::invalid_input("please provide a valid email"))
    }
}

pub(crate) fn password(value: &str) -> Result<(), PortalError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(PortalError::invalid_input(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
