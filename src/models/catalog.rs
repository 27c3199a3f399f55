use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `GET /wards`: ward name to the conditions taught on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WardCatalog {
    #[serde(default)]
    pub wards: BTreeMap<String, Vec<String>>,
}

impl WardCatalog {
    pub fn ward_names(&self) -> impl Iterator<Item = &str> {
        self.wards.keys().map(String::as_str)
    }

    /// Conditions for a ward; unknown wards have none.
    pub fn conditions(&self, ward: &str) -> &[String] {
        self.wards.get(ward).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The ward a condition belongs to, if any.
    pub fn ward_of(&self, condition: &str) -> Option<&str> {
        self.wards
            .iter()
            .find(|(_, conditions)| conditions.iter().any(|c| c == condition))
            .map(|(ward, _)| ward.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let catalog: WardCatalog = serde_json::from_str(
            r#"{"wards":{"Cardiology":["Atrial Fibrillation","Heart Failure"],"Respiratory":["Asthma"]}}"#,
        )
        .unwrap();

        assert_eq!(
            catalog.ward_names().collect::<Vec<_>>(),
            vec!["Cardiology", "Respiratory"]
        );
        assert_eq!(catalog.conditions("Respiratory"), ["Asthma".to_string()]);
        assert!(catalog.conditions("Neurology").is_empty());
        assert_eq!(catalog.ward_of("Heart Failure"), Some("Cardiology"));
        assert_eq!(catalog.ward_of("Gout"), None);
    }
}
