//! Arena of coverage models addressed by handle.

use crate::model::CoverageModel;
use crate::result::{CovError, CovResult};
use std::path::{Path, PathBuf};

/// Handle to a model in a [`CoverageRegistry`].
///
/// Handles are never reused, so two ids never alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u32);

impl ModelId {
    /// Create a model id
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owner of every coverage model in a test bench
#[derive(Debug, Default)]
pub struct CoverageRegistry {
    models: Vec<CoverageModel>,
}

impl CoverageRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model, named and seeded from `name` when given
    pub fn create(&mut self, name: Option<&str>) -> CovResult<ModelId> {
        let id = u32::try_from(self.models.len()).map_err(|_| CovError::InvalidModelId { id: u32::MAX })?;
        let model = name.map_or_else(CoverageModel::new, CoverageModel::named);
        tracing::debug!(id, name = model.display_name(), "coverage model created");
        self.models.push(model);
        Ok(ModelId(id))
    }

    /// First model with the given name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ModelId> {
        self.models
            .iter()
            .position(|m| m.name() == Some(name))
            .and_then(|i| u32::try_from(i).ok())
            .map(ModelId)
    }

    /// Borrow a model
    pub fn model(&self, id: ModelId) -> CovResult<&CoverageModel> {
        self.models.get(id.0 as usize).ok_or_else(|| invalid(id))
    }

    /// Borrow a model mutably
    pub fn model_mut(&mut self, id: ModelId) -> CovResult<&mut CoverageModel> {
        self.models.get_mut(id.0 as usize).ok_or_else(|| invalid(id))
    }

    /// Number of models
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if no model was created
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// All handles in creation order
    pub fn ids(&self) -> impl Iterator<Item = ModelId> + '_ {
        (0..self.models.len()).filter_map(|i| u32::try_from(i).ok().map(ModelId))
    }

    /// Merge a database file into the model
    pub fn merge_database(&mut self, id: ModelId, path: impl AsRef<Path>) -> CovResult<()> {
        self.model_mut(id)?.read_database(path, true)
    }

    /// Write every model with bins to `dir`, one file per model.
    ///
    /// Files are named after the model (`<name>.cov`, with characters
    /// outside `[A-Za-z0-9_.-]` replaced by `_`) and the model id for
    /// unnamed models. Returns the written paths.
    pub fn write_all(&mut self, dir: impl AsRef<Path>) -> CovResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut written = Vec::new();
        for (index, model) in self.models.iter_mut().enumerate() {
            if model.is_empty() {
                tracing::debug!(index, "skipping model without bins");
                continue;
            }
            let stem = model
                .name()
                .map_or_else(|| format!("model_{index}"), file_stem);
            let path = dir.join(format!("{stem}.cov"));
            model.write_database(&path)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn invalid(id: ModelId) -> CovError {
    tracing::error!(%id, "invalid coverage model id");
    CovError::InvalidModelId { id: id.0 }
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BinOptions;
    use crate::generate::gen_values;

    #[test]
    fn test_ids_do_not_alias() {
        let mut reg = CoverageRegistry::new();
        let a = reg.create(Some("a")).unwrap();
        let b = reg.create(Some("a")).unwrap();
        assert_ne!(a, b);
        reg.model_mut(a)
            .unwrap()
            .add_bins(&BinOptions::new(), gen_values(&[1]))
            .unwrap();
        assert_eq!(reg.model(a).unwrap().num_bins(), 1);
        assert!(reg.model(b).unwrap().is_empty());
        assert_eq!(reg.find("a"), Some(a));
        assert_eq!(reg.find("missing"), None);
    }

    #[test]
    fn test_invalid_id() {
        let reg = CoverageRegistry::new();
        assert!(matches!(
            reg.model(ModelId::new(3)),
            Err(CovError::InvalidModelId { id: 3 })
        ));
    }

    #[test]
    fn test_write_all_and_merge_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = CoverageRegistry::new();
        let named = reg.create(Some("alu ops")).unwrap();
        let _empty = reg.create(None).unwrap();
        let unnamed = reg.create(None).unwrap();
        for id in [named, unnamed] {
            let model = reg.model_mut(id).unwrap();
            model.add_bins(&BinOptions::new(), gen_values(&[1, 2])).unwrap();
            model.record(&[1]).unwrap();
        }

        let paths = reg.write_all(dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("alu_ops.cov"));
        assert!(paths[1].ends_with("model_2.cov"));

        reg.merge_database(named, &paths[1]).unwrap();
        let merged = reg.model(named).unwrap();
        assert_eq!(merged.num_bins(), 2);
        assert_eq!(merged.bin(0).unwrap().count(), 2);
    }

    #[test]
    fn test_ids_in_creation_order() {
        let mut reg = CoverageRegistry::new();
        reg.create(None).unwrap();
        reg.create(None).unwrap();
        let ids: Vec<u32> = reg.ids().map(ModelId::as_u32).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(reg.len(), 2);
    }
}
