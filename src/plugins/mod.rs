//! Plugin chain.
//!
//! Stage 2 of the build pipeline. The identifiers listed under `plugins` in
//! `config.toml` are resolved and folded over the [`Site`], left to right:
//!
//! ```text
//! site₁ = plugin₀(site₀, engine)
//! site₂ = plugin₁(site₁, engine)
//! ...
//! ```
//!
//! ## Namespaces
//!
//! An identifier is parsed into a [`PluginId`], checked in this order:
//!
//! | Identifier | Namespace | Resolves to |
//! |------------|-----------|-------------|
//! | `core/drafts` | [`PluginId::Core`] | a plugin in the [`PluginRegistry`] |
//! | `scripts/tags.py` | [`PluginId::LocalScript`] | an executable relative to the project root |
//! | `shout` | [`PluginId::ExternalPackage`] | an executable in `plugin_dir` |
//!
//! Scripts are recognized by extension ([`SCRIPT_EXTENSIONS`]). Both kinds of
//! executable speak the JSON protocol described on [`CommandPlugin`].
//!
//! Every identifier is resolved before the first plugin runs, so a typo in
//! the last entry fails the build without running the others. Once running,
//! the first failing plugin aborts the chain.

mod builtin;
mod command;

pub use builtin::{DraftsPlugin, SITEMAP_PATH, SitemapPlugin, TitlesPlugin};
pub use command::{CommandError, CommandPlugin};

use crate::render::TemplateEngine;
use crate::types::Site;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix marking a built-in plugin.
pub const CORE_PREFIX: &str = "core/";

/// Extensions that mark an identifier as a project-local script.
pub const SCRIPT_EXTENSIONS: &[&str] = &["sh", "py", "rb", "pl", "js"];

/// Error type plugin bodies return.
pub type PluginFailure = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("cannot resolve plugin '{id}': {reason}")]
    Resolution { id: String, reason: String },
    #[error("plugin '{id}' failed: {source}")]
    Execution {
        id: String,
        #[source]
        source: PluginFailure,
    },
}

/// A transform applied once to the whole site.
///
/// Implementations take the site by value and return it, usually the same
/// instance mutated. The engine handle is shared by every plugin and by the
/// render stage.
pub trait Plugin {
    fn apply(&self, site: Site, engine: &mut TemplateEngine) -> Result<Site, PluginFailure>;
}

impl<F> Plugin for F
where
    F: Fn(Site, &mut TemplateEngine) -> Result<Site, PluginFailure>,
{
    fn apply(&self, site: Site, engine: &mut TemplateEngine) -> Result<Site, PluginFailure> {
        self(site, engine)
    }
}

/// A parsed plugin identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginId {
    /// `core/<name>`; holds `<name>`.
    Core(String),
    /// A script path relative to the project root.
    LocalScript(PathBuf),
    /// A name looked up in the project's plugin directory.
    ExternalPackage(String),
}

impl PluginId {
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        if let Some(name) = id.strip_prefix(CORE_PREFIX) {
            return PluginId::Core(name.to_string());
        }
        let is_script = Path::new(id)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SCRIPT_EXTENSIONS.contains(&e));
        if is_script {
            PluginId::LocalScript(PathBuf::from(id))
        } else {
            PluginId::ExternalPackage(id.to_string())
        }
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginId::Core(name) => write!(f, "{CORE_PREFIX}{name}"),
            PluginId::LocalScript(path) => write!(f, "{}", path.display()),
            PluginId::ExternalPackage(name) => f.write_str(name),
        }
    }
}

/// In-process plugins available in the `core/` namespace.
///
/// [`PluginRegistry::new`] holds the bundled plugins; library users can
/// [`register`](PluginRegistry::register) more.
pub struct PluginRegistry {
    plugins: BTreeMap<String, Box<dyn Plugin>>,
}

impl PluginRegistry {
    /// A registry with the bundled plugins (`drafts`, `sitemap`, `titles`).
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("drafts", DraftsPlugin);
        registry.register("sitemap", SitemapPlugin);
        registry.register("titles", TitlesPlugin);
        registry
    }

    pub fn empty() -> Self {
        Self {
            plugins: BTreeMap::new(),
        }
    }

    /// Register a plugin as `core/<name>`, replacing any existing one.
    pub fn register(&mut self, name: impl Into<String>, plugin: impl Plugin + 'static) {
        self.plugins.insert(name.into(), Box::new(plugin));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// A plugin ready to run.
pub enum ResolvedPlugin<'a> {
    InProcess(&'a dyn Plugin),
    Command(CommandPlugin),
}

impl Plugin for ResolvedPlugin<'_> {
    fn apply(&self, site: Site, engine: &mut TemplateEngine) -> Result<Site, PluginFailure> {
        match self {
            ResolvedPlugin::InProcess(plugin) => plugin.apply(site, engine),
            ResolvedPlugin::Command(command) => command.apply(site, engine),
        }
    }
}

/// Maps identifiers to runnable plugins for one project.
#[derive(Debug)]
pub struct Resolver<'a> {
    project_root: &'a Path,
    plugin_dir: PathBuf,
    registry: &'a PluginRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(project_root: &'a Path, plugin_dir: &str, registry: &'a PluginRegistry) -> Self {
        Self {
            project_root,
            plugin_dir: project_root.join(plugin_dir),
            registry,
        }
    }

    pub fn resolve(&self, id: &PluginId) -> Result<ResolvedPlugin<'a>, PluginError> {
        match id {
            PluginId::Core(name) => self
                .registry
                .get(name)
                .map(ResolvedPlugin::InProcess)
                .ok_or_else(|| {
                    let known: Vec<&str> = self.registry.names().collect();
                    PluginError::Resolution {
                        id: id.to_string(),
                        reason: format!("no built-in plugin '{name}' (available: {})", known.join(", ")),
                    }
                }),
            PluginId::LocalScript(path) => self.command(id, self.project_root.join(path)),
            PluginId::ExternalPackage(name) => self.command(id, self.plugin_dir.join(name)),
        }
    }

    fn command(&self, id: &PluginId, program: PathBuf) -> Result<ResolvedPlugin<'a>, PluginError> {
        if !program.is_file() {
            return Err(PluginError::Resolution {
                id: id.to_string(),
                reason: format!("{} does not exist", program.display()),
            });
        }
        Ok(ResolvedPlugin::Command(CommandPlugin::new(
            program,
            self.project_root.to_path_buf(),
        )))
    }
}

/// Resolve every identifier, then fold the plugins over the site in order.
pub fn run_chain(
    site: Site,
    ids: &[String],
    resolver: &Resolver<'_>,
    engine: &mut TemplateEngine,
) -> Result<Site, PluginError> {
    let chain = ids
        .iter()
        .map(|raw| {
            let id = PluginId::parse(raw);
            resolver.resolve(&id).map(|plugin| (id, plugin))
        })
        .collect::<Result<Vec<_>, _>>()?;

    chain.iter().try_fold(site, |site, (id, plugin)| {
        tracing::info!(plugin = %id, "applying plugin");
        plugin
            .apply(site, engine)
            .map_err(|source| PluginError::Execution {
                id: id.to_string(),
                source,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemplatesConfig;
    use crate::test_helpers::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn engine() -> TemplateEngine {
        TemplateEngine::new(&TemplatesConfig::default())
    }

    fn marker(tag: &'static str) -> impl Plugin {
        move |mut site: Site, _: &mut TemplateEngine| -> Result<Site, PluginFailure> {
            let page = &mut site.pages[0];
            let trail = page
                .meta
                .extra
                .entry("trail")
                .or_insert_with(|| json!(""));
            *trail = json!(format!("{}{tag}", trail.as_str().unwrap_or("")));
            Ok(site)
        }
    }

    #[test]
    fn parse_core_identifier() {
        assert_eq!(PluginId::parse("core/drafts"), PluginId::Core("drafts".to_string()));
    }

    #[test]
    fn parse_script_identifier() {
        assert_eq!(
            PluginId::parse("scripts/tags.py"),
            PluginId::LocalScript(PathBuf::from("scripts/tags.py"))
        );
        assert_eq!(
            PluginId::parse("build.sh"),
            PluginId::LocalScript(PathBuf::from("build.sh"))
        );
    }

    #[test]
    fn parse_package_identifier() {
        assert_eq!(
            PluginId::parse("shout"),
            PluginId::ExternalPackage("shout".to_string())
        );
        // Unrecognized extensions are package names, not scripts
        assert_eq!(
            PluginId::parse("my.plugin"),
            PluginId::ExternalPackage("my.plugin".to_string())
        );
    }

    #[test]
    fn core_prefix_wins_over_script_extension() {
        assert_eq!(PluginId::parse("core/x.sh"), PluginId::Core("x.sh".to_string()));
    }

    #[test]
    fn display_round_trips_identifier() {
        for raw in ["core/drafts", "scripts/tags.py", "shout"] {
            assert_eq!(PluginId::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn chain_applies_plugins_in_order() {
        let tmp = TempDir::new().unwrap();
        let mut registry = PluginRegistry::empty();
        registry.register("a", marker("A"));
        registry.register("b", marker("B"));
        let resolver = Resolver::new(tmp.path(), "plugins", &registry);

        let site = site_with_pages(&[("index.md", "x")]);
        let ids = vec!["core/a".to_string(), "core/b".to_string(), "core/a".to_string()];
        let site = run_chain(site, &ids, &resolver, &mut engine()).unwrap();
        assert_eq!(site.pages[0].meta.get("trail"), Some(&json!("ABA")));
    }

    #[test]
    fn unknown_core_plugin_is_resolution_error() {
        let tmp = TempDir::new().unwrap();
        let registry = PluginRegistry::new();
        let resolver = Resolver::new(tmp.path(), "plugins", &registry);

        let err = resolver.resolve(&PluginId::parse("core/nope")).err().unwrap();
        match err {
            PluginError::Resolution { id, reason } => {
                assert_eq!(id, "core/nope");
                assert!(reason.contains("drafts, sitemap, titles"), "{reason}");
            }
            other => panic!("expected Resolution, got {other:?}"),
        }
    }

    #[test]
    fn missing_script_and_package_are_resolution_errors() {
        let tmp = TempDir::new().unwrap();
        let registry = PluginRegistry::new();
        let resolver = Resolver::new(tmp.path(), "plugins", &registry);

        for raw in ["scripts/missing.sh", "missing"] {
            let result = resolver.resolve(&PluginId::parse(raw));
            assert!(matches!(result, Err(PluginError::Resolution { .. })), "{raw}");
        }
    }

    #[test]
    fn package_resolves_inside_plugin_dir() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "ext/shout", "#!/bin/sh\ncat\n");
        let registry = PluginRegistry::new();
        let resolver = Resolver::new(tmp.path(), "ext", &registry);

        let resolved = resolver.resolve(&PluginId::parse("shout")).unwrap();
        match resolved {
            ResolvedPlugin::Command(command) => {
                assert_eq!(command.program(), tmp.path().join("ext/shout"));
            }
            ResolvedPlugin::InProcess(_) => panic!("expected a command plugin"),
        }
    }

    #[test]
    fn unresolvable_identifier_stops_chain_before_any_plugin_runs() {
        let tmp = TempDir::new().unwrap();
        let mut registry = PluginRegistry::empty();
        registry.register(
            "boom",
            |_: Site, _: &mut TemplateEngine| -> Result<Site, PluginFailure> {
                panic!("must not run")
            },
        );
        let resolver = Resolver::new(tmp.path(), "plugins", &registry);

        let ids = vec!["core/boom".to_string(), "core/missing".to_string()];
        let result = run_chain(Site::default(), &ids, &resolver, &mut engine());
        assert!(matches!(result, Err(PluginError::Resolution { .. })));
    }

    #[test]
    fn failing_plugin_aborts_chain() {
        let tmp = TempDir::new().unwrap();
        let mut registry = PluginRegistry::empty();
        registry.register(
            "fail",
            |_: Site, _: &mut TemplateEngine| -> Result<Site, PluginFailure> {
                Err("no good".into())
            },
        );
        registry.register("after", marker("X"));
        let resolver = Resolver::new(tmp.path(), "plugins", &registry);

        let site = site_with_pages(&[("index.md", "x")]);
        let ids = vec!["core/fail".to_string(), "core/after".to_string()];
        let err = run_chain(site, &ids, &resolver, &mut engine()).unwrap_err();
        match err {
            PluginError::Execution { id, source } => {
                assert_eq!(id, "core/fail");
                assert_eq!(source.to_string(), "no good");
            }
            other => panic!("expected Execution, got {other:?}"),
        }
    }

    #[test]
    fn plugin_can_register_template_filter() {
        let tmp = TempDir::new().unwrap();
        let mut registry = PluginRegistry::empty();
        registry.register(
            "shout",
            |site: Site, engine: &mut TemplateEngine| -> Result<Site, PluginFailure> {
                engine.tera_mut().register_filter(
                    "shout",
                    |value: &tera::Value, _: &std::collections::HashMap<String, tera::Value>| {
                        let text = tera::try_get_value!("shout", "value", String, value);
                        Ok(tera::Value::String(text.to_uppercase()))
                    },
                );
                Ok(site)
            },
        );
        let resolver = Resolver::new(tmp.path(), "plugins", &registry);

        let mut engine = engine();
        run_chain(Site::default(), &["core/shout".to_string()], &resolver, &mut engine).unwrap();
        let out = engine
            .tera_mut()
            .render_str("{{ 'hi' | shout }}", &tera::Context::new())
            .unwrap();
        assert_eq!(out, "HI");
    }
}
