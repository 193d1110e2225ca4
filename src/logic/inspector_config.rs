use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What to do when more than one swap continues an arbitrage path from the same pool and token.
#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AmbiguousPathPolicy {
    /// Stop detection for the transaction and report the competing swaps.
    #[default]
    Fail,
    /// Drop only the start that led to the ambiguity.
    SkipStart,
}

#[derive(Clone, Deserialize, Debug)]
pub struct InspectorConfigRoot {
    pub inspector: InspectorConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectorConfig {
    /// Inspect transactions on a rayon pool
    pub parallel: bool,
    /// Size of a dedicated rayon pool. `None` uses the global pool, sized to the available cores.
    pub worker_threads: Option<usize>,
    pub ambiguous_path_policy: AmbiguousPathPolicy,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self { parallel: true, worker_threads: None, ambiguous_path_policy: AmbiguousPathPolicy::Fail }
    }
}

impl InspectorConfig {
    pub fn sequential() -> Self {
        Self { parallel: false, ..Self::default() }
    }

    pub fn with_ambiguous_path_policy(&self, ambiguous_path_policy: AmbiguousPathPolicy) -> Self {
        Self { ambiguous_path_policy, ..self.clone() }
    }

    pub fn with_worker_threads(&self, worker_threads: usize) -> Self {
        Self { worker_threads: Some(worker_threads), ..self.clone() }
    }

    pub fn validate(&self) -> Result<(), LoadConfigError> {
        if self.worker_threads == Some(0) {
            return Err(LoadConfigError::ConfigError("worker_threads must be greater than zero".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigLoader for InspectorConfig {
    type SectionType = InspectorConfig;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: InspectorConfigRoot = load_from_file(file_name).await?;
        root.inspector.validate()?;
        Ok(root.inspector)
    }
}

impl ConfigLoaderSync for InspectorConfig {
    type SectionType = InspectorConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: InspectorConfigRoot = load_from_file_sync(file_name)?;
        root.inspector.validate()?;
        Ok(root.inspector)
    }
}
