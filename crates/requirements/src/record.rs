use serde::{Deserialize, Serialize};

use mto_core::{DomainError, DomainResult};

/// A demand row: some quantity of a named thing that a discipline needs in a lab.
pub trait DemandLine {
    fn name(&self) -> &str;
    fn discipline(&self) -> Option<&str>;
    fn lab(&self) -> Option<&str>;
    fn required(&self) -> u64;
}

/// Equipment a discipline needs in a lab.
///
/// `discipline` and `lab` are optional in source data; absence is `None`,
/// never an empty or sentinel string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementRecord {
    pub discipline: Option<String>,
    pub lab: Option<String>,
    pub item_name: String,
    pub qty_required: u64,
}

impl RequirementRecord {
    pub fn new(
        discipline: Option<String>,
        lab: Option<String>,
        item_name: impl Into<String>,
        qty_required: u64,
    ) -> DomainResult<Self> {
        let item_name = item_name.into();
        if item_name.trim().is_empty() {
            return Err(DomainError::validation("item_name cannot be empty"));
        }
        Ok(Self {
            discipline: blank_to_none(discipline),
            lab: blank_to_none(lab),
            item_name,
            qty_required,
        })
    }
}

impl DemandLine for RequirementRecord {
    fn name(&self) -> &str {
        &self.item_name
    }

    fn discipline(&self) -> Option<&str> {
        self.discipline.as_deref()
    }

    fn lab(&self) -> Option<&str> {
        self.lab.as_deref()
    }

    fn required(&self) -> u64 {
        self.qty_required
    }
}

/// Software seats a discipline needs in a lab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareRequirementRecord {
    pub discipline: Option<String>,
    pub lab: Option<String>,
    pub software_name: String,
    pub seats_required: u64,
}

impl SoftwareRequirementRecord {
    pub fn new(
        discipline: Option<String>,
        lab: Option<String>,
        software_name: impl Into<String>,
        seats_required: u64,
    ) -> DomainResult<Self> {
        let software_name = software_name.into();
        if software_name.trim().is_empty() {
            return Err(DomainError::validation("software_name cannot be empty"));
        }
        Ok(Self {
            discipline: blank_to_none(discipline),
            lab: blank_to_none(lab),
            software_name,
            seats_required,
        })
    }
}

impl DemandLine for SoftwareRequirementRecord {
    fn name(&self) -> &str {
        &self.software_name
    }

    fn discipline(&self) -> Option<&str> {
        self.discipline.as_deref()
    }

    fn lab(&self) -> Option<&str> {
        self.lab.as_deref()
    }

    fn required(&self) -> u64 {
        self.seats_required
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_fields_become_none() {
        let r = RequirementRecord::new(Some(" ".into()), Some(String::new()), "ПК", 3).unwrap();
        assert_eq!(r.discipline, None);
        assert_eq!(r.lab, None);
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(RequirementRecord::new(None, None, "  ", 1).is_err());
        assert!(SoftwareRequirementRecord::new(None, None, "", 1).is_err());
    }
}
