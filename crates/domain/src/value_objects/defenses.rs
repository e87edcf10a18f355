//! Damage-type defenses (resistance, immunity, vulnerability)

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefenseCategory {
    Resistance,
    Immunity,
    Vulnerability,
}

impl fmt::Display for DefenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resistance => write!(f, "resistance"),
            Self::Immunity => write!(f, "immunity"),
            Self::Vulnerability => write!(f, "vulnerability"),
        }
    }
}

/// How a target reacts to one damage type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Susceptibility {
    pub immune: bool,
    pub resistant: bool,
    pub vulnerable: bool,
}

/// Per-category damage type lists, de-duplicated case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defenses {
    #[serde(default)]
    pub resistances: Vec<String>,
    #[serde(default)]
    pub immunities: Vec<String>,
    #[serde(default)]
    pub vulnerabilities: Vec<String>,
}

impl Defenses {
    fn list(&self, category: DefenseCategory) -> &Vec<String> {
        match category {
            DefenseCategory::Resistance => &self.resistances,
            DefenseCategory::Immunity => &self.immunities,
            DefenseCategory::Vulnerability => &self.vulnerabilities,
        }
    }

    fn list_mut(&mut self, category: DefenseCategory) -> &mut Vec<String> {
        match category {
            DefenseCategory::Resistance => &mut self.resistances,
            DefenseCategory::Immunity => &mut self.immunities,
            DefenseCategory::Vulnerability => &mut self.vulnerabilities,
        }
    }

    pub fn has(&self, category: DefenseCategory, damage_type: &str) -> bool {
        self.list(category)
            .iter()
            .any(|t| t.eq_ignore_ascii_case(damage_type))
    }

    /// Returns false when the type was already present.
    pub fn add(&mut self, category: DefenseCategory, damage_type: &str) -> bool {
        let damage_type = damage_type.trim().to_lowercase();
        if damage_type.is_empty() || self.has(category, &damage_type) {
            return false;
        }
        self.list_mut(category).push(damage_type);
        true
    }

    /// Returns false when the type was absent.
    pub fn remove(&mut self, category: DefenseCategory, damage_type: &str) -> bool {
        let list = self.list_mut(category);
        let before = list.len();
        list.retain(|t| !t.eq_ignore_ascii_case(damage_type.trim()));
        list.len() != before
    }

    pub fn susceptibility(&self, damage_type: &str) -> Susceptibility {
        Susceptibility {
            immune: self.has(DefenseCategory::Immunity, damage_type),
            resistant: self.has(DefenseCategory::Resistance, damage_type),
            vulnerable: self.has(DefenseCategory::Vulnerability, damage_type),
        }
    }
}
