//! Build orchestration.
//!
//! Runs the four stages left to right over one owned [`Site`]:
//!
//! ```text
//! scan ──► plugins ──► render ──► emit
//! Site     Site        &mut Site  &Site
//! ```
//!
//! Every stage is fail-fast. The first error aborts the build and comes back
//! as a [`BuildError`] naming the stage it came from.

use crate::config::{self, ConfigError, ProjectConfig};
use crate::emit::{self, EmitError, EmitReport};
use crate::plugins::{self, PluginError, PluginRegistry, Resolver};
use crate::render::{self, RenderError, TemplateEngine};
use crate::scan::{self, ScanError};
use crate::types::Site;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("config failed: {0}")]
    Config(#[from] ConfigError),
    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("plugin failed: {0}")]
    Plugin(#[from] PluginError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("emit failed: {0}")]
    Emit(#[from] EmitError),
}

/// Result of a full build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub site: Site,
    pub report: EmitReport,
}

/// One project, its configuration and the in-process plugins available to it.
#[derive(Debug)]
pub struct Pipeline {
    project_root: PathBuf,
    config: ProjectConfig,
    registry: PluginRegistry,
}

impl Pipeline {
    /// Read `config.toml` from `project_root` and use the bundled plugins.
    pub fn load(project_root: &Path) -> Result<Self, BuildError> {
        let config = config::load_config(project_root)?;
        Ok(Self::new(project_root, config))
    }

    pub fn new(project_root: &Path, config: ProjectConfig) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config,
            registry: PluginRegistry::new(),
        }
    }

    /// Replace the plugin registry, e.g. to add `core/` plugins of your own.
    pub fn with_registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry_mut(&mut self) -> &mut PluginRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Scan only.
    pub fn scan(&self) -> Result<Site, BuildError> {
        Ok(scan::scan(&self.project_root)?)
    }

    /// Scan, run the plugin chain and render, without touching the disk.
    pub fn transform(&self) -> Result<Site, BuildError> {
        let site = self.scan()?;
        let mut engine = TemplateEngine::new(&self.config.templates);

        let resolver = Resolver::new(&self.project_root, &self.config.plugin_dir, &self.registry);
        let mut site = plugins::run_chain(site, &self.config.plugins, &resolver, &mut engine)?;

        engine.load_templates(&site.templates)?;
        render::render(&mut site, &mut engine, &self.config.markdown)?;
        Ok(site)
    }

    /// The whole pipeline: transform, then write `site/`.
    pub fn build(&self) -> Result<BuildOutcome, BuildError> {
        let site = self.transform()?;
        let root = emit::output_root(&self.project_root);
        if self.config.build.clean {
            emit::clean_output(&root)?;
        }
        let report = emit::emit_to(&site, &root)?;
        Ok(BuildOutcome { site, report })
    }
}

/// Build the project at `project_root` with its own `config.toml`.
pub fn build(project_root: &Path) -> Result<BuildOutcome, BuildError> {
    Pipeline::load(project_root)?.build()
}
