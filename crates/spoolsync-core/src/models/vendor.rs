use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SpoolmanResult;
use crate::spoolman::Spoolman;

use super::{decode, required, EntityKind};

/// Wire shape of `/vendor` items
#[derive(Debug, Clone, Deserialize)]
pub struct VendorResponse {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl VendorResponse {
    pub fn to_vendor(&self) -> SpoolmanResult<Vendor> {
        let id = required(self.id, EntityKind::Vendor, None, "id")?;
        Ok(Vendor {
            id,
            name: required(self.name.clone(), EntityKind::Vendor, Some(id), "name")?,
        })
    }
}

/// Filament manufacturer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
}

impl Vendor {
    pub fn from_json(value: &Value) -> SpoolmanResult<Self> {
        decode::<VendorResponse>(EntityKind::Vendor, value)?.to_vendor()
    }

    /// Re-fetch this vendor and publish the new fields.
    pub async fn update_from_server(&self, spoolman: &Spoolman) -> SpoolmanResult<Vendor> {
        spoolman.refresh_vendor(self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpoolmanError;
    use serde_json::json;

    #[test]
    fn test_parse_vendor() {
        let json = r#"{"id": 1, "registered": "2024-01-01T00:00:00Z", "name": "Acme", "extra": {}}"#;
        let value: Value = serde_json::from_str(json).expect("valid test JSON");
        let vendor = Vendor::from_json(&value).expect("vendor parses");
        assert_eq!(vendor, Vendor { id: 1, name: "Acme".to_string() });
    }

    #[test]
    fn test_missing_name_names_the_field() {
        let err = Vendor::from_json(&json!({"id": 3})).unwrap_err();
        assert!(matches!(
            err,
            SpoolmanError::MissingField { entity: EntityKind::Vendor, id: Some(3), field: "name" }
        ));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let err = Vendor::from_json(&json!({"id": "one", "name": "Acme"})).unwrap_err();
        assert!(matches!(err, SpoolmanError::Parse { entity: EntityKind::Vendor, .. }));
    }
}
