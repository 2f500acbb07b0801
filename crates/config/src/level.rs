//! `Level` fields in TOML
//!
//! Levels are read as strings through [`Level`]'s `FromStr`, so the config
//! file accepts exactly what `--line-level` does (any case, `warning` alias).

use serde::{Deserialize, Deserializer, de};
use spool_sinks::Level;

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(de::Error::custom)
}
