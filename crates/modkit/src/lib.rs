#![deny(warnings)]

//! Content packs and Rhai predicates for Market Hustle.
//!
//! A pack is a directory under the packs root holding `metadata.yaml` and an
//! optional `catalog.yaml` with extra or replacement templates. Scripted
//! achievement requirements are evaluated by [`ScriptHost`].

use rhai::{Engine, Scope};
use serde::Deserialize;
use sim_core::{validate_catalog, Catalog, GameStats, PredicateHost, Requirement, SimError, SimResult, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{info, warn};

/// Highest pack schema this build understands.
pub const ENGINE_SCHEMA_VERSION: u32 = 1;

/// Metadata for a content pack.
#[derive(Debug, Clone, Deserialize)]
pub struct ModMeta {
    pub id: String,
    pub name: String,
    pub version: String,
    pub engine_schema_version: u32,
    pub compat: Option<String>,
    pub hooks: Option<Vec<String>>, // e.g., ["catalog", "predicates"]
}

#[derive(Debug, Error)]
pub enum ModError {
    #[error("invalid metadata: {0}")]
    InvalidMeta(String),
    #[error("invalid catalog in {pack}: {source}")]
    InvalidCatalog {
        pack: String,
        #[source]
        source: ValidationError,
    },
    #[error("io error: {0}")]
    Io(String),
    #[error("rhai error: {0}")]
    Rhai(String),
}

impl From<std::io::Error> for ModError {
    fn from(e: std::io::Error) -> Self {
        ModError::Io(e.to_string())
    }
}

impl From<Box<rhai::EvalAltResult>> for ModError {
    fn from(e: Box<rhai::EvalAltResult>) -> Self {
        ModError::Rhai(e.to_string())
    }
}

impl From<rhai::ParseError> for ModError {
    fn from(e: rhai::ParseError) -> Self {
        ModError::Rhai(e.to_string())
    }
}

/// Loaded pack with its parsed catalog overlay.
#[derive(Debug, Clone)]
pub struct LoadedPack {
    pub meta: ModMeta,
    pub dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub catalog_mtime: SystemTime,
    pub catalog: Catalog,
}

fn mtime(path: &Path) -> Result<SystemTime, ModError> {
    Ok(fs::metadata(path)?.modified().unwrap_or(SystemTime::UNIX_EPOCH))
}

fn read_catalog(path: &Path) -> Result<Catalog, ModError> {
    let text = fs::read_to_string(path)?;
    serde_yaml::from_str(&text).map_err(|e| ModError::InvalidMeta(format!("{}: {e}", path.display())))
}

/// Pack loader: discovers packs and merges them over the builtin catalog.
pub struct ModEngine {
    root: PathBuf,
    scripts: ScriptHost,
    packs: Vec<LoadedPack>,
}

impl ModEngine {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            scripts: ScriptHost::new(),
            packs: vec![],
        }
    }

    pub fn packs(&self) -> &[LoadedPack] {
        &self.packs
    }

    /// Scan the root for pack directories, in name order. Returns how many
    /// packs were loaded.
    pub fn load_all(&mut self) -> Result<usize, ModError> {
        let mut dirs = Vec::new();
        for ent in fs::read_dir(&self.root)? {
            let ent = ent?;
            if ent.file_type()?.is_dir() {
                dirs.push(ent.path());
            }
        }
        dirs.sort();
        self.packs.clear();
        for dir in dirs {
            let meta_path = dir.join("metadata.yaml");
            if !meta_path.exists() {
                continue;
            }
            let meta_text = fs::read_to_string(&meta_path)?;
            let meta: ModMeta =
                serde_yaml::from_str(&meta_text).map_err(|e| ModError::InvalidMeta(e.to_string()))?;
            if meta.engine_schema_version > ENGINE_SCHEMA_VERSION {
                return Err(ModError::InvalidMeta(format!(
                    "{} needs schema {}, engine supports {}",
                    meta.id, meta.engine_schema_version, ENGINE_SCHEMA_VERSION
                )));
            }
            let catalog_path = Some(dir.join("catalog.yaml")).filter(|p| p.exists());
            let (catalog, catalog_mtime) = match &catalog_path {
                Some(p) => (read_catalog(p)?, mtime(p)?),
                None => (Catalog::default(), SystemTime::UNIX_EPOCH),
            };
            self.check_scripts(&meta.id, &catalog)?;
            info!(pack = %meta.id, version = %meta.version, "content pack loaded");
            self.packs.push(LoadedPack {
                meta,
                dir,
                catalog_path,
                catalog_mtime,
                catalog,
            });
        }
        Ok(self.packs.len())
    }

    /// Re-read every pack catalog whose file changed on disk. Returns the
    /// ids of the reloaded packs.
    pub fn reload_if_changed(&mut self) -> Result<Vec<String>, ModError> {
        let mut reloaded = Vec::new();
        for i in 0..self.packs.len() {
            let Some(path) = self.packs[i].catalog_path.clone() else {
                continue;
            };
            let current = mtime(&path)?;
            if current <= self.packs[i].catalog_mtime {
                continue;
            }
            let catalog = read_catalog(&path)?;
            self.check_scripts(&self.packs[i].meta.id, &catalog)?;
            let pack = &mut self.packs[i];
            info!("Reloading pack: {}", pack.meta.id);
            pack.catalog = catalog;
            pack.catalog_mtime = current;
            reloaded.push(pack.meta.id.clone());
        }
        Ok(reloaded)
    }

    /// Builtin catalog with every pack overlaid in load order.
    pub fn merged_catalog(&self) -> Result<Catalog, ModError> {
        let mut catalog = Catalog::builtin();
        for pack in &self.packs {
            catalog.merge(pack.catalog.clone());
            validate_catalog(&catalog).map_err(|source| ModError::InvalidCatalog {
                pack: pack.meta.id.clone(),
                source,
            })?;
        }
        Ok(catalog)
    }

    fn check_scripts(&self, pack: &str, catalog: &Catalog) -> Result<(), ModError> {
        for a in &catalog.achievements {
            if let Requirement::Script { expr } = &a.requirement {
                self.scripts.compile(expr).map_err(|e| {
                    warn!(pack, achievement = %a.id, "script does not compile");
                    e
                })?;
            }
        }
        Ok(())
    }
}

/// Evaluates boolean Rhai expressions with the live [`GameStats`] bound
/// as constants (`cash`, `net_worth`, `reputation`, ...).
pub struct ScriptHost {
    engine: Engine,
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(10_000);
        engine.set_max_expr_depths(32, 32);
        Self { engine }
    }

    /// Parse `expr` without running it.
    pub fn compile(&self, expr: &str) -> Result<(), ModError> {
        self.engine.compile_expression(expr)?;
        Ok(())
    }

    fn scope(stats: &GameStats) -> Scope<'static> {
        let mut scope = Scope::new();
        scope.push_constant("cash", stats.cash);
        scope.push_constant("net_worth", stats.net_worth);
        scope.push_constant("property_value", stats.property_value);
        scope.push_constant("properties_owned", i64::from(stats.properties_owned));
        scope.push_constant("reputation", f64::from(stats.reputation));
        scope.push_constant("employees", i64::from(stats.employees));
        scope.push_constant("qualified_employees", i64::from(stats.qualified_employees));
        scope.push_constant("skill_total", i64::from(stats.skill_total));
        scope.push_constant("customers_served", stats.customers_served as i64);
        scope.push_constant("lifetime_income", stats.lifetime_income);
        scope.push_constant("day", i64::from(stats.day));
        scope.push_constant("aspirations_completed", i64::from(stats.aspirations_completed));
        scope.push_constant("prestige_level", i64::from(stats.prestige_level));
        scope
    }
}

impl PredicateHost for ScriptHost {
    fn check(&self, expr: &str, stats: &GameStats) -> SimResult<bool> {
        let mut scope = Self::scope(stats);
        self.engine
            .eval_expression_with_scope::<bool>(&mut scope, expr)
            .map_err(|e| SimError::Script(e.to_string()))
    }
}
