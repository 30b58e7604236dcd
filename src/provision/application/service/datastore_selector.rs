use crate::core::domain::{
    error::{LookupError, VsphereResult},
    model::{ConfigTarget, DatastoreSummary, ManagedObjectReference},
};
use tracing::info;

/// The datastore a VM is placed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDatastore {
    /// Bracketed form used in file paths, e.g. `[ds1]`.
    pub path: String,
    pub name: String,
    pub reference: ManagedObjectReference,
}

impl From<&DatastoreSummary> for SelectedDatastore {
    fn from(summary: &DatastoreSummary) -> Self {
        Self {
            path: format!("[{}]", summary.name),
            name: summary.name.clone(),
            reference: summary.datastore.clone(),
        }
    }
}

/// Picks a datastore among the accessible candidates of a config target.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatastoreSelector;

impl DatastoreSelector {
    /// With a name, that datastore must be accessible. Without one, the
    /// datastore with the most free space wins; on a tie the first listed is
    /// kept.
    pub fn select(
        &self,
        target: &ConfigTarget,
        explicit_name: Option<&str>,
    ) -> VsphereResult<SelectedDatastore> {
        let candidates: Vec<&DatastoreSummary> = target
            .datastore
            .iter()
            .map(|info| &info.datastore)
            .filter(|summary| summary.accessible)
            .inspect(|summary| {
                info!(datastore = %summary.name, free = summary.free_space, "considering datastore");
            })
            .collect();

        if let Some(name) = explicit_name {
            let summary = candidates
                .into_iter()
                .find(|summary| summary.name == name)
                .ok_or_else(|| LookupError::DatastoreNotFound(name.to_string()))?;
            info!(datastore = %summary.name, "selected datastore (user provided)");
            return Ok(summary.into());
        }

        let mut best: Option<&DatastoreSummary> = None;
        for summary in candidates {
            if best.is_none_or(|current| summary.free_space > current.free_space) {
                best = Some(summary);
            }
        }
        let summary = best.ok_or_else(|| {
            LookupError::DatastoreNotFound("(no accessible datastore)".to_string())
        })?;
        info!(datastore = %summary.name, "selected datastore (max free)");
        Ok(summary.into())
    }
}
