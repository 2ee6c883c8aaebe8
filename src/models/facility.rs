// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Healthcare facility model and its map projection.

use crate::models::location::LngLat;
use geojson::{Feature, Geometry, JsonObject, Value};
use serde::{Deserialize, Deserializer, Serialize};

/// Facility identifier. The API emits either integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacilityId {
    Number(i64),
    Text(String),
}

impl From<FacilityId> for serde_json::Value {
    fn from(value: FacilityId) -> Self {
        match value {
            FacilityId::Number(n) => n.into(),
            FacilityId::Text(s) => s.into(),
        }
    }
}

/// Which endpoint a facility came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilitySource {
    #[default]
    Standard,
    Uploaded,
}

/// A point-located healthcare site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub facility_type: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub ownership: String,
    #[serde(deserialize_with = "deserialize_degrees")]
    pub latitude: f64,
    #[serde(deserialize_with = "deserialize_degrees")]
    pub longitude: f64,
    /// Not part of the wire format; set by whoever fetched the record.
    #[serde(skip_deserializing, default)]
    pub source: FacilitySource,
}

impl Facility {
    pub fn is_uploaded(&self) -> bool {
        self.source == FacilitySource::Uploaded
    }

    pub fn position(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }

    /// Tag this record as coming from the uploaded-facilities endpoint.
    pub fn into_uploaded(mut self) -> Self {
        self.source = FacilitySource::Uploaded;
        self
    }

    /// Project to a point feature carrying the properties used for styling and popups.
    pub fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("id".to_string(), self.id.clone().into());
        properties.insert("name".to_string(), self.name.clone().into());
        properties.insert("type".to_string(), self.facility_type.clone().into());
        properties.insert("ownership".to_string(), self.ownership.clone().into());
        properties.insert("isUploaded".to_string(), self.is_uploaded().into());

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::from(&geo::Point::from(
                self.position(),
            )))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Record shape returned by `GET /facility-types`.
#[derive(Debug, Clone, Deserialize)]
pub struct FacilityTypeRecord {
    pub facility_type: String,
}

/// Text attribute that may be `null` on the wire; `null` reads as empty.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept degrees as a JSON number or a numeric string (databases often emit DECIMAL as text).
pub(crate) fn deserialize_degrees<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Degrees {
        Number(f64),
        Text(String),
    }

    match Degrees::deserialize(deserializer)? {
        Degrees::Number(n) => Ok(n),
        Degrees::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate: {:?}", s))),
    }
}
