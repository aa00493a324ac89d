//! Label coordinate registry
//!
//! Where each product's label is expected to sit on its photos. The server
//! receives a `LabelCoordinateSource` at startup; requests may still carry
//! explicit coordinates, which take precedence.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use parking_lot::RwLock;
use thiserror::Error;

use crate::logic::label::Region;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid registry file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub trait LabelCoordinateSource: Send + Sync {
    fn coordinates_for(&self, product_id: &str) -> Option<Region>;
}

/// In-memory product id → region map, optionally seeded from a JSON file
#[derive(Debug, Default)]
pub struct StaticRegistry {
    regions: RwLock<HashMap<String, Region>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// File format: `{"PROD0001": {"x": .., "y": .., "width": .., "height": ..}, ...}`
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path)?;
        let mut regions: HashMap<String, Region> = serde_json::from_str(&content)?;
        regions.retain(|product_id, region| {
            if region.is_empty() {
                log::warn!("Ignoring empty label region for {}", product_id);
            }
            !region.is_empty()
        });
        log::info!("Loaded label coordinates for {} products from {:?}", regions.len(), path);

        Ok(Self {
            regions: RwLock::new(regions),
        })
    }

    /// Seed from `(product_id, region)` pairs, e.g. synthetic label positions
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Region)>) -> Self {
        let registry = Self::new();
        for (product_id, region) in entries {
            registry.insert(product_id, region);
        }
        registry
    }

    pub fn insert(&self, product_id: impl Into<String>, region: Region) -> Option<Region> {
        self.regions.write().insert(product_id.into(), region)
    }

    pub fn len(&self) -> usize {
        self.regions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.read().is_empty()
    }
}

impl LabelCoordinateSource for StaticRegistry {
    fn coordinates_for(&self, product_id: &str) -> Option<Region> {
        self.regions.read().get(product_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let registry = StaticRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.coordinates_for("PROD0001").is_none());

        registry.insert("PROD0001", Region::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.coordinates_for("PROD0001"),
            Some(Region::new(10.0, 20.0, 30.0, 40.0))
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(
            &path,
            r#"{"A1": {"x": 1, "y": 2, "width": 3, "height": 4}, "B2": {"x": 0.5, "y": 0, "width": 10, "height": 10}}"#,
        )
        .unwrap();

        let registry = StaticRegistry::from_file(&path).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.coordinates_for("A1"), Some(Region::new(1.0, 2.0, 3.0, 4.0)));
    }

    #[test]
    fn test_from_file_drops_empty_regions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(
            &path,
            r#"{"A1": {"x": 1, "y": 2, "width": 3, "height": 4}, "Z0": {"x": 5, "y": 5, "width": 0, "height": 10}}"#,
        )
        .unwrap();

        let registry = StaticRegistry::from_file(&path).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.coordinates_for("Z0").is_none());
    }

    #[test]
    fn test_from_entries() {
        let registry = StaticRegistry::from_entries(vec![
            ("P1".to_string(), Region::new(0.0, 0.0, 5.0, 5.0)),
            ("P2".to_string(), Region::new(1.0, 1.0, 5.0, 5.0)),
        ]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.coordinates_for("P2"), Some(Region::new(1.0, 1.0, 5.0, 5.0)));
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            StaticRegistry::from_file(&dir.path().join("missing.json")),
            Err(RegistryError::Io(_))
        ));

        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(StaticRegistry::from_file(&path), Err(RegistryError::Parse(_))));
    }
}
