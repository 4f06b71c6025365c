// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use gridbind_app::{
    ColumnKind, ColumnMetadata, DEFAULT_PAGE_SIZE, Grid, GroupingColumn, OperatorFamily,
    SortDirection,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_FILTER: &str = "warn";
const DEMO_TABLE: &str = "products";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub grid: GridSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            logging: Logging::default(),
            grid: GridSection::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub filter: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            filter: Some(DEFAULT_LOG_FILTER.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridSection {
    pub table: String,
    pub page_size: Option<i64>,
    pub paging: Option<bool>,
    pub default_sort: Option<String>,
    pub default_sort_direction: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub grouping: Vec<GroupingConfig>,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    pub caption: Option<String>,
    pub kind: Option<String>,
    pub binding: Option<String>,
    pub sort_expression: Option<String>,
    pub sortable: Option<bool>,
    pub search_expression: Option<String>,
    pub search: Option<String>,
    pub exportable: Option<bool>,
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupingConfig {
    pub name: String,
    pub caption: Option<String>,
    pub expression: Option<String>,
    pub direction: Option<String>,
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    pub caption: String,
    pub predicate: String,
}

impl ColumnConfig {
    fn new(name: &str, caption: &str, kind: &str) -> Self {
        Self {
            name: name.to_owned(),
            caption: Some(caption.to_owned()),
            kind: Some(kind.to_owned()),
            binding: None,
            sort_expression: None,
            sortable: None,
            search_expression: None,
            search: None,
            exportable: None,
            visible: None,
        }
    }

    fn searchable(mut self, expression: &str) -> Self {
        self.search_expression = Some(expression.to_owned());
        self
    }

    fn to_metadata(&self) -> Result<ColumnMetadata> {
        let kind = match self.kind.as_deref() {
            None => ColumnKind::Text,
            Some(raw) => ColumnKind::parse(raw).ok_or_else(|| {
                anyhow!(
                    "column {:?} has unknown kind {raw:?}; use {}",
                    self.name,
                    "text, number, money, date or command"
                )
            })?,
        };
        let caption = self.caption.as_deref().unwrap_or(&self.name);
        let mut column = ColumnMetadata::new(kind, &self.name, caption);
        if let Some(binding) = &self.binding {
            column = column.bind_to(binding);
        }
        if let Some(expression) = &self.sort_expression {
            column = column.sort_by(expression);
        }
        if self.sortable == Some(false) {
            column = column.unsortable();
        }

        let family = match self.search.as_deref() {
            None => None,
            Some(raw) => Some(OperatorFamily::parse(raw).ok_or_else(|| {
                anyhow!(
                    "column {:?} has unknown search family {raw:?}; use literal or logical",
                    self.name
                )
            })?),
        };
        let search_expression = self
            .search_expression
            .clone()
            .or_else(|| family.map(|_| column.binding.clone()));
        if let Some(expression) = search_expression {
            let family = family.unwrap_or_else(|| kind.default_family());
            column = column.searchable_with(&expression, family);
        }

        if self.exportable == Some(false) {
            column = column.not_exportable();
        }
        if self.visible == Some(false) {
            column = column.hidden();
        }
        Ok(column)
    }
}

impl GroupingConfig {
    fn to_grouping(&self) -> Result<GroupingColumn> {
        let direction = parse_direction(self.direction.as_deref(), &self.name)?;
        let caption = self.caption.as_deref().unwrap_or(&self.name);
        let mut column = GroupingColumn::new(&self.name, caption, direction);
        if let Some(expression) = &self.expression {
            column = column.order_by(expression);
        }
        if self.visible == Some(false) {
            column = column.hidden();
        }
        Ok(column)
    }
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            table: DEMO_TABLE.to_owned(),
            page_size: Some(10),
            paging: Some(true),
            default_sort: None,
            default_sort_direction: None,
            columns: vec![
                ColumnConfig {
                    exportable: Some(false),
                    ..ColumnConfig::new("id", "Id", "number")
                },
                ColumnConfig::new("name", "Name", "text").searchable("name"),
                ColumnConfig::new("category", "Category", "text").searchable("category"),
                ColumnConfig {
                    binding: Some("price_cents".to_owned()),
                    ..ColumnConfig::new("price", "Price", "money").searchable("price_cents")
                },
                ColumnConfig::new("quantity", "Qty", "number").searchable("quantity"),
                ColumnConfig::new("stocked_on", "Stocked", "date").searchable("stocked_on"),
            ],
            grouping: Vec::new(),
            filters: vec![
                FilterConfig {
                    caption: "In stock".to_owned(),
                    predicate: "quantity > 0".to_owned(),
                },
                FilterConfig {
                    caption: "Premium".to_owned(),
                    predicate: "price_cents >= 2500".to_owned(),
                },
            ],
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("GRIDBIND_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set GRIDBIND_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(gridbind_db::APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` at the top",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            gridbind_db::validate_db_path(db_path)?;
        }

        if !gridbind_db::is_safe_identifier(&self.grid.table) {
            bail!(
                "grid.table in {} must be a plain table name, got {:?}",
                path.display(),
                self.grid.table
            );
        }

        if let Some(page_size) = self.grid.page_size
            && page_size <= 0
        {
            bail!(
                "grid.page_size in {} must be positive, got {}",
                path.display(),
                page_size
            );
        }

        if self.grid.columns.is_empty() {
            bail!(
                "grid in {} has no columns; add at least one [[grid.columns]] entry",
                path.display()
            );
        }

        self.build_grid()
            .with_context(|| format!("invalid [grid] definition in {}", path.display()))?;
        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => gridbind_db::default_db_path(),
        }
    }

    pub fn log_filter(&self) -> &str {
        self.logging.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn table(&self) -> &str {
        &self.grid.table
    }

    pub fn build_grid(&self) -> Result<Grid> {
        let section = &self.grid;
        let mut builder = Grid::builder(&section.table)
            .page_size(section.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
            .paging(section.paging.unwrap_or(true));
        for column in &section.columns {
            builder = builder.column(column.to_metadata()?);
        }
        for column in &section.grouping {
            builder = builder.grouping(column.to_grouping()?);
        }
        for filter in &section.filters {
            builder = builder.filter(&filter.caption, &filter.predicate);
        }
        if let Some(name) = &section.default_sort {
            let direction = parse_direction(section.default_sort_direction.as_deref(), name)?;
            builder = builder.default_sort(name, direction);
        }
        Ok(builder.build()?)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# gridbind config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/gridbind/gridbind.db)\n# db_path = \"/absolute/path/to/gridbind.db\"\n\n[logging]\n# RUST_LOG overrides this when set\nfilter = \"{}\"\n\n[grid]\ntable = \"products\"\npage_size = 10\npaging = true\n# default_sort = \"name\"\n# default_sort_direction = \"ASC\"\n\n[[grid.columns]]\nname = \"name\"\ncaption = \"Name\"\nkind = \"text\"\nsearch_expression = \"name\"\n\n[[grid.columns]]\nname = \"price\"\ncaption = \"Price\"\nkind = \"money\"\nbinding = \"price_cents\"\nsearch_expression = \"price_cents\"\nsearch = \"logical\"\n\n[[grid.columns]]\nname = \"stocked_on\"\ncaption = \"Stocked\"\nkind = \"date\"\nsearch_expression = \"stocked_on\"\nexportable = true\nvisible = true\n\n[[grid.grouping]]\nname = \"group\"\ncaption = \"Category\"\nexpression = \"category\"\ndirection = \"ASC\"\nvisible = true\n\n[[grid.filters]]\ncaption = \"In stock\"\npredicate = \"quantity > 0\"\n",
            path.display(),
            DEFAULT_LOG_FILTER,
        )
    }
}

fn parse_direction(raw: Option<&str>, column: &str) -> Result<SortDirection> {
    match raw {
        None => Ok(SortDirection::Asc),
        Some(raw) => SortDirection::parse(raw)
            .ok_or_else(|| anyhow!("direction {raw:?} for {column:?} must be ASC or DESC")),
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use gridbind_app::{ColumnKind, OperatorFamily, SortDirection};
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_demo_grid() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.table(), "products");
        assert_eq!(config.log_filter(), "warn");
        let grid = config.build_grid()?;
        assert_eq!(grid.paging().page_size, 10);
        assert_eq!(grid.filters().len(), 2);
        assert_eq!(grid.column("price")?.binding, "price_cents");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[grid]\ntable = \"products\"\n")?;
        let error = Config::load(&path).expect_err("missing version should fail");
        assert!(error.to_string().contains("version = 1"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 7\n")?;
        let error = Config::load(&path).expect_err("v7 config should fail");
        assert!(error.to_string().contains("unsupported config version 7"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn full_grid_definition_parses() -> Result<()> {
        let (_temp, path) = write_config(
            r#"
version = 1

[logging]
filter = "gridbind_app=debug"

[grid]
table = "orders"
page_size = 25
default_sort = "placed_on"
default_sort_direction = "desc"

[[grid.columns]]
name = "customer"
caption = "Customer"
search = "logical"

[[grid.columns]]
name = "total"
kind = "money"
binding = "total_cents"
search_expression = "total_cents"
exportable = false

[[grid.columns]]
name = "placed_on"
kind = "date"
visible = false

[[grid.columns]]
name = "open"
kind = "command"

[[grid.grouping]]
name = "region"
expression = "region_code"
direction = "DESC"

[[grid.filters]]
caption = "Open"
predicate = "closed_on IS NULL"
"#,
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.log_filter(), "gridbind_app=debug");
        let grid = config.build_grid()?;
        assert_eq!(grid.paging().page_size, 25);
        assert_eq!(
            grid.default_sort(),
            Some(&("placed_on".to_owned(), SortDirection::Desc))
        );

        let customer = grid.column("customer")?;
        assert_eq!(customer.kind, ColumnKind::Text);
        assert_eq!(customer.search_expression, "customer");
        assert_eq!(
            customer.search.map(|spec| spec.family),
            Some(OperatorFamily::Logical)
        );

        let total = grid.column("total")?;
        assert_eq!(total.sort_expression, "total_cents");
        assert!(!total.is_exportable());
        assert!(!grid.column("placed_on")?.visible);
        assert!(!grid.column("open")?.is_sortable());
        assert_eq!(grid.grouping().order_terms()[0].expression, "region_code");
        Ok(())
    }

    #[test]
    fn unknown_kind_is_rejected() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[grid]\ntable = \"t\"\n[[grid.columns]]\nname = \"a\"\nkind = \"blob\"\n",
        )?;
        let error = Config::load(&path).expect_err("unknown kind should fail");
        assert!(format!("{error:#}").contains("unknown kind"));
        Ok(())
    }

    #[test]
    fn grid_errors_surface_at_load() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[grid]\ntable = \"t\"\ndefault_sort = \"ghost\"\n\
             [[grid.columns]]\nname = \"a\"\n",
        )?;
        let error = Config::load(&path).expect_err("unknown default sort should fail");
        let message = format!("{error:#}");
        assert!(message.contains("invalid [grid] definition"));
        assert!(message.contains("ghost"));
        Ok(())
    }

    #[test]
    fn table_and_page_size_are_validated() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[grid]\ntable = \"t; DROP\"\n[[grid.columns]]\nname = \"a\"\n",
        )?;
        assert!(Config::load(&path).is_err());

        let (_temp, path) = write_config(
            "version = 1\n[grid]\ntable = \"t\"\npage_size = 0\n[[grid.columns]]\nname = \"a\"\n",
        )?;
        let error = Config::load(&path).expect_err("zero page size should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn db_path_rejects_uri_style_storage_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"https://evil.example/g.db\"\n")?;
        let error = Config::load(&path).expect_err("URI db_path should fail validation");
        assert!(error.to_string().contains("looks like a URI"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("GRIDBIND_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("GRIDBIND_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn db_path_uses_env_override_when_storage_db_path_missing() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("GRIDBIND_DB_PATH", "/from/env-only.db");
        }
        let config = Config::load(&path)?;
        let resolved = config.db_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("GRIDBIND_DB_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/env-only.db"));
        Ok(())
    }

    #[test]
    fn example_config_loads() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        let grid = config.build_grid()?;
        assert_eq!(grid.columns().len(), 3);
        assert_eq!(grid.grouping().columns().len(), 1);
        Ok(())
    }
}
