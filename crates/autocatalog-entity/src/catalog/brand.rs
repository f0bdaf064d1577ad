//! Car brand catalog entity.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use autocatalog_core::result::AppResult;
use autocatalog_core::traits::Entity;
use autocatalog_core::types::{Column, ColumnKind, FieldValue, Record, TableSchema};

use crate::base::ModelBase;
use crate::record::RecordExt;

/// A car brand, stored in `MarcasAutos`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct Brand {
    /// Key and creation timestamp.
    #[serde(flatten)]
    pub base: ModelBase,
    /// Brand name.
    #[serde(rename = "descripcion", alias = "Descripcion", default)]
    #[validate(length(min = 1, message = "Descripcion is required"))]
    pub description: String,
}

impl Brand {
    /// Description column.
    pub const DESCRIPTION_COLUMN: &'static str = "Descripcion";

    /// A new, not yet persisted brand.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            base: ModelBase::default(),
            description: description.into(),
        }
    }

    /// The identity key.
    pub fn id(&self) -> i32 {
        self.base.id
    }
}

const BRAND_COLUMNS: &[Column] = &[
    ModelBase::COLUMNS[0],
    Column::required(Brand::DESCRIPTION_COLUMN, ColumnKind::Text),
    ModelBase::COLUMNS[1],
];

impl Entity for Brand {
    const NAME: &'static str = "Brand";

    const TABLE: TableSchema = TableSchema {
        name: "MarcasAutos",
        key: ModelBase::KEY_COLUMN,
        columns: BRAND_COLUMNS,
    };

    fn key(&self) -> i32 {
        self.base.id
    }

    fn set_key(&mut self, key: i32) {
        self.base.id = key;
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        self.base.write_record(&mut record);
        record.insert(
            Self::DESCRIPTION_COLUMN,
            FieldValue::Text(self.description.clone()),
        );
        record
    }

    fn from_record(mut record: Record) -> AppResult<Self> {
        let base = ModelBase::read_record(&mut record)?;
        let description = record.take_text(Self::DESCRIPTION_COLUMN)?;
        Ok(Self { base, description })
    }
}

/// Moment the catalog rows were first seeded (2024-12-29T09:53:21.944Z).
const SEEDED_AT_MILLIS: i64 = 1_735_466_001_944;

/// The fixed rows created together with the `MarcasAutos` table.
pub fn seed_brands() -> Vec<Brand> {
    let seeded_at: DateTime<Utc> =
        DateTime::UNIX_EPOCH + TimeDelta::milliseconds(SEEDED_AT_MILLIS);

    ["Toyota", "Nissan", "Hyundai", "Suzuki"]
        .iter()
        .zip(1..)
        .map(|(description, id)| Brand {
            base: ModelBase::with_id(id, seeded_at),
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let brand = seed_brands().remove(0);
        let json = serde_json::to_value(&brand).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["descripcion"], "Toyota");
        assert_eq!(json["fIngreso"], "2024-12-29T09:53:21.944Z");
    }

    #[test]
    fn test_json_roundtrip_keeps_fields() {
        let brand = Brand {
            base: ModelBase::with_id(9, Utc::now()),
            description: "Mazda".to_string(),
        };
        let json = serde_json::to_string(&brand).unwrap();
        let back: Brand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, brand);
    }

    #[test]
    fn test_accepts_pascal_case_and_defaults() {
        let brand: Brand = serde_json::from_str(r#"{"Descripcion":"Kia"}"#).unwrap();
        assert_eq!(brand.description, "Kia");
        assert_eq!(brand.id(), 0);
        assert!(brand.is_transient());
    }

    #[test]
    fn test_validation_requires_description() {
        let brand: Brand = serde_json::from_str(r#"{"id":0}"#).unwrap();
        let errors = brand.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
        assert!(Brand::new("Kia").validate().is_ok());
    }

    #[test]
    fn test_record_roundtrip() {
        let brand = seed_brands().remove(3);
        let record = brand.to_record();
        assert_eq!(record.len(), Brand::TABLE.columns.len());
        assert_eq!(Brand::from_record(record).unwrap(), brand);
    }

    #[test]
    fn test_seed_ids_are_sequential() {
        let ids: Vec<i32> = seed_brands().iter().map(Brand::id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
