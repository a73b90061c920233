use crate::omf::message::{Classification, OmfProperty, OmfType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OMF type id under which [`Measurement`] is registered with the service.
pub const DATA_POINT_TYPE_ID: &str = "DataPointType";

/// One sample of a single-variable time series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Measurement {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Measurement {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Measurement {
        Measurement { timestamp, value }
    }

    /// A measurement stamped with the current time.
    pub fn now(value: f64) -> Measurement {
        Measurement::new(Utc::now(), value)
    }

    /// The OMF type definition matching the serialized shape of a measurement.
    pub fn omf_type() -> OmfType {
        let mut properties = BTreeMap::new();
        properties.insert(
            "Timestamp".to_string(),
            OmfProperty {
                kind: "string".to_string(),
                format: Some("date-time".to_string()),
                is_index: Some(true),
            },
        );
        properties.insert(
            "Value".to_string(),
            OmfProperty {
                kind: "number".to_string(),
                format: Some("float64".to_string()),
                is_index: None,
            },
        );

        OmfType {
            id: DATA_POINT_TYPE_ID.to_string(),
            classification: Classification::Dynamic,
            kind: "object".to_string(),
            properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_pascal_case_keys() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_value(Measurement::new(ts, 0.25)).unwrap();
        assert_eq!(json["Timestamp"], "2024-03-01T12:00:00Z");
        assert_eq!(json["Value"], 0.25);
    }

    #[test]
    fn type_definition_indexes_on_timestamp() {
        let ty = Measurement::omf_type();
        assert_eq!(ty.id, DATA_POINT_TYPE_ID);
        assert_eq!(ty.properties["Timestamp"].is_index, Some(true));
        assert_eq!(ty.properties["Value"].format.as_deref(), Some("float64"));
    }
}
