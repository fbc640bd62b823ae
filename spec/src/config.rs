//! Run defaults loaded from a TOML file and the environment.
//!
//! Code options still come first; `options()` is meant to be appended after
//! them so a file or `SPEC_SEED` can override a suite without editing it.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::options::Opt;
use crate::core::tree::{Nest, Order, Scope};

/// Environment variable overriding the run seed.
pub const SEED_ENV: &str = "SPEC_SEED";

/// Run-level defaults (TOML). Every field is optional.
///
/// ```toml
/// seed = 42
/// order = "random"
/// scope = "global"
/// nest = "nested"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunConfig {
    pub seed: Option<i64>,
    pub order: Option<Order>,
    pub scope: Option<Scope>,
    pub nest: Option<Nest>,
}

impl RunConfig {
    /// Apply the `SPEC_SEED` override, if set.
    pub fn with_env(self) -> Self {
        self.with_seed_var(env::var(SEED_ENV).ok().as_deref())
    }

    /// Apply a raw seed override. Unparseable values are ignored with a warning.
    pub fn with_seed_var(mut self, raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return self;
        };
        match raw.parse::<i64>() {
            Ok(seed) => self.seed = Some(seed),
            Err(err) => warn!(value = raw, error = %err, "ignoring invalid {SEED_ENV}"),
        }
        self
    }

    /// Options equivalent to this config, in a fixed order.
    pub fn options(&self) -> Vec<Opt> {
        let mut opts = Vec::new();
        if let Some(order) = self.order {
            opts.push(match order {
                Order::Sequential => Opt::Sequential,
                Order::Parallel => Opt::Parallel,
                Order::Random => Opt::Random,
                Order::Reverse => Opt::Reverse,
            });
        }
        if let Some(scope) = self.scope {
            opts.push(match scope {
                Scope::Local => Opt::Local,
                Scope::Global => Opt::Global,
            });
        }
        if let Some(nest) = self.nest {
            opts.push(match nest {
                Nest::Flat => Opt::Flat,
                Nest::Nested => Opt::Nested,
            });
        }
        if let Some(seed) = self.seed {
            opts.push(Opt::Seed(seed));
        }
        opts
    }
}

/// Load run defaults from a TOML file.
///
/// If the file is missing, returns `RunConfig::default()`.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    if !path.exists() {
        return Ok(RunConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::Config;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, RunConfig::default());
        assert!(cfg.options().is_empty());
    }

    #[test]
    fn load_reads_lowercase_settings() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("spec.toml");
        fs::write(&path, "seed = 42\norder = \"random\"\nscope = \"global\"\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(
            cfg,
            RunConfig {
                seed: Some(42),
                order: Some(Order::Random),
                scope: Some(Scope::Global),
                nest: None,
            }
        );
    }

    #[test]
    fn load_rejects_unknown_values() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("spec.toml");
        fs::write(&path, "order = \"sideways\"\n").expect("write");

        let err = load_config(&path).expect_err("invalid order");
        assert!(format!("{err:#}").contains("parse"));
    }

    #[test]
    fn options_override_code_options() {
        let file = RunConfig {
            seed: Some(7),
            order: Some(Order::Reverse),
            scope: None,
            nest: Some(Nest::Nested),
        };
        let mut opts = vec![Opt::Random, Opt::Seed(1), Opt::Global];
        opts.extend(file.options());

        let cfg = Config::resolve(&opts);
        assert_eq!(cfg.order, Some(Order::Reverse));
        assert_eq!(cfg.scope, Some(Scope::Global));
        assert_eq!(cfg.nest, Some(Nest::Nested));
        assert_eq!(cfg.seed, Some(7));
    }

    #[test]
    fn seed_var_overrides_file_seed() {
        let cfg = RunConfig {
            seed: Some(1),
            ..RunConfig::default()
        };
        assert_eq!(cfg.clone().with_seed_var(Some(" 99 ")).seed, Some(99));
        assert_eq!(cfg.clone().with_seed_var(Some("")).seed, Some(1));
        assert_eq!(cfg.clone().with_seed_var(Some("soon")).seed, Some(1));
        assert_eq!(cfg.with_seed_var(None).seed, Some(1));
    }
}
