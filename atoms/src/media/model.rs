use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image domain model - one record in the image table
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Image {
    pub id: String,
    pub url: String,
    pub created_at: Option<Timestamp>,
}

/// Body of `POST /add_image`. A client-sent `id` is ignored; the store assigns one.
#[derive(Debug, Deserialize)]
pub struct CreateImagePayload {
    pub url: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// An ISO-8601 date-time, with or without a UTC offset.
///
/// The submitted text is kept verbatim, so what goes in is what is stored
/// and echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(String);

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl Timestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Timestamp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let zoned = DateTime::parse_from_rfc3339(s).is_ok();
        let naive = || {
            NAIVE_FORMATS
                .iter()
                .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
        };
        if zoned || naive() {
            Ok(Timestamp(s.to_string()))
        } else {
            Err(format!("invalid datetime {:?}", s))
        }
    }
}

impl TryFrom<String> for Timestamp {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
