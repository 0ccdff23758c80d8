//! Panelist schema - Arbiter profile and case load

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panelist {
    pub panelist_id: String,
    pub name: String,

    /// Maximum number of cases this panelist may be actively assigned to
    pub max_active_cases: usize,

    /// Non-closed cases the panelist is actively assigned to
    #[serde(default)]
    pub active_cases: BTreeSet<String>,
}

impl Panelist {
    pub fn new(panelist_id: String, name: String, max_active_cases: usize) -> Self {
        Panelist {
            panelist_id,
            name,
            max_active_cases,
            active_cases: BTreeSet::new(),
        }
    }

    pub fn load(&self) -> usize {
        self.active_cases.len()
    }

    pub fn has_capacity(&self) -> bool {
        self.load() < self.max_active_cases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity() {
        let mut panelist = Panelist::new("p1".into(), "Pat".into(), 1);
        assert!(panelist.has_capacity());
        panelist.active_cases.insert("case-1".into());
        assert_eq!(panelist.load(), 1);
        assert!(!panelist.has_capacity());
    }

    #[test]
    fn test_active_cases_default_on_deserialize() {
        let json = r#"{"panelist_id":"p1","name":"Pat","max_active_cases":3}"#;
        let panelist: Panelist = serde_json::from_str(json).unwrap();
        assert_eq!(panelist.load(), 0);
    }
}
