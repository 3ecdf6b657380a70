#![deny(warnings)]

//! Persistence layer: the flat save record, its codecs, and the
//! preference file that outlives individual saves.
//!
//! A missing save is not an error: [`load_save`] returns `Ok(None)` and the
//! caller starts fresh. Corrupt files are reported.

use serde::{Deserialize, Serialize};
use sim_core::{Preferences, PropertyId};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Default save file name.
pub const SAVE_FILE: &str = "market_hustle_save.json";
/// Default preference file name.
pub const PREFS_FILE: &str = "preferences.json";

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

/// One placed piece of furniture. The core stores these opaquely for the
/// presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FurnitureRecord {
    pub prefab_name: String,
    pub position: [f32; 3],
    /// Quaternion `[x, y, z, w]`.
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    /// Property the item was placed in.
    #[serde(default)]
    pub parent_property_id: Option<PropertyId>,
}

/// Everything a save file holds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub cash: i64,
    #[serde(default)]
    pub owned_property_ids: Vec<PropertyId>,
    #[serde(default)]
    pub furniture: Vec<FurnitureRecord>,
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// On-disk encodings. The file extension picks one: `.bin` is bincode,
/// anything else JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Json,
    Bincode,
}

impl SaveFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") => SaveFormat::Bincode,
            _ => SaveFormat::Json,
        }
    }
}

pub fn encode(data: &SaveData, format: SaveFormat) -> Result<Vec<u8>, PersistError> {
    Ok(match format {
        SaveFormat::Json => serde_json::to_vec_pretty(data)?,
        SaveFormat::Bincode => bincode::serialize(data)?,
    })
}

pub fn decode(bytes: &[u8], format: SaveFormat) -> Result<SaveData, PersistError> {
    Ok(match format {
        SaveFormat::Json => serde_json::from_slice(bytes)?,
        SaveFormat::Bincode => bincode::deserialize(bytes)?,
    })
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a save. `Ok(None)` when no file exists.
pub fn load_save(path: &Path) -> Result<Option<SaveData>, PersistError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no save file found");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let data = decode(&bytes, SaveFormat::for_path(path))?;
    info!(path = %path.display(), cash = data.cash, owned = data.owned_property_ids.len(), "save loaded");
    Ok(Some(data))
}

pub fn write_save(path: &Path, data: &SaveData) -> Result<(), PersistError> {
    write_atomic(path, &encode(data, SaveFormat::for_path(path))?)?;
    info!(path = %path.display(), cash = data.cash, "game saved");
    Ok(())
}

/// Read preferences; a missing file yields empty preferences.
pub fn load_preferences(path: &Path) -> Result<Preferences, PersistError> {
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Preferences::default()),
        Err(e) => Err(e.into()),
    }
}

pub fn save_preferences(path: &Path, prefs: &Preferences) -> Result<(), PersistError> {
    write_atomic(path, &serde_json::to_vec_pretty(prefs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("market-hustle-{}", std::process::id()))
            .join(name)
    }

    fn sample() -> SaveData {
        SaveData {
            cash: 12_345,
            owned_property_ids: vec!["apt_01".into(), "villa_01".into()],
            furniture: vec![FurnitureRecord {
                prefab_name: "Sofa".into(),
                position: [1.0, 0.0, -2.5],
                rotation: identity_rotation(),
                scale: unit_scale(),
                parent_property_id: Some("apt_01".into()),
            }],
        }
    }

    #[test]
    fn missing_save_is_fresh_start() {
        assert_eq!(load_save(&scratch("nope.json")).unwrap(), None);
        assert!(load_preferences(&scratch("nope-prefs.json")).unwrap().is_empty());
    }

    #[test]
    fn json_and_bincode_files_round_trip() {
        for name in ["save.json", "save.bin"] {
            let path = scratch(name);
            write_save(&path, &sample()).unwrap();
            assert_eq!(load_save(&path).unwrap(), Some(sample()));
        }
    }

    #[test]
    fn furniture_defaults_fill_in() {
        let json = r#"{"cash":5,"furniture":[{"prefab_name":"Lamp","position":[0,1,0]}]}"#;
        let data = decode(json.as_bytes(), SaveFormat::Json).unwrap();
        assert!(data.owned_property_ids.is_empty());
        assert_eq!(data.furniture[0].scale, [1.0, 1.0, 1.0]);
        assert_eq!(data.furniture[0].parent_property_id, None);
    }

    #[test]
    fn corrupt_save_is_an_error() {
        let path = scratch("corrupt.json");
        write_atomic(&path, b"{ not json").unwrap();
        assert!(matches!(load_save(&path), Err(PersistError::Json(_))));
    }

    #[test]
    fn preferences_round_trip() {
        let path = scratch("prefs.json");
        let mut prefs = Preferences::default();
        prefs.set("prestige.capitalist.start_money", 50_000.0);
        save_preferences(&path, &prefs).unwrap();
        assert_eq!(load_preferences(&path).unwrap(), prefs);
    }

    proptest! {
        #[test]
        fn cash_and_owned_ids_survive_both_codecs(
            cash in 0i64..i64::MAX,
            ids in proptest::collection::vec("[a-z]{3,6}_[0-9]{2}", 0..6),
        ) {
            let data = SaveData {
                cash,
                owned_property_ids: ids.iter().map(|s| PropertyId(s.clone())).collect(),
                furniture: vec![],
            };
            for format in [SaveFormat::Json, SaveFormat::Bincode] {
                let back = decode(&encode(&data, format).unwrap(), format).unwrap();
                prop_assert_eq!(&back, &data);
            }
        }
    }
}
