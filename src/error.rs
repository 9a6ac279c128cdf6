use serde::{de, Deserialize, Serialize};
use serde_json;
use std::error;
use std::fmt;

/// Pipeline stage an error (or report) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Read,
    Merge,
    Serialize,
    Store,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Read => "read",
            Stage::Merge => "merge",
            Stage::Serialize => "serialize",
            Stage::Store => "store",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Stage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

struct StageVisitor;

impl<'de> de::Visitor<'de> for StageVisitor {
    type Value = Stage;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("Stage")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match v {
            "config" => Ok(Stage::Config),
            "read" => Ok(Stage::Read),
            "merge" => Ok(Stage::Merge),
            "serialize" => Ok(Stage::Serialize),
            "store" => Ok(Stage::Store),
            value => Err(de::Error::custom(value)),
        }
    }
}

impl<'de> de::Deserialize<'de> for Stage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(StageVisitor)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceError {
    pub msg: String,
    pub stage: Stage,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

impl error::Error for ServiceError {}

impl ServiceError {
    pub fn new<T: fmt::Display>(stage: Stage, msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            stage,
        }
    }

    pub fn config<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError::new(Stage::Config, msg)
    }

    pub fn read<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError::new(Stage::Read, msg)
    }

    pub fn serialize<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError::new(Stage::Serialize, msg)
    }

    pub fn store<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError::new(Stage::Store, msg)
    }
}
