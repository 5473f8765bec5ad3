// SPDX-License-Identifier: Apache-2.0

use millcert_core::{
    non_blank_env, resolve_config_path, ConfigPathScope, ENV_MILLCERT_ARTIFACT_PREFIX,
    ENV_MILLCERT_DEFAULT_COMPANY,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug)]
pub struct ConfigError(pub String);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Fixed page geometry in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Share of the body width given to the left region.
    pub column_split: f32,
    pub gutter: f32,
    /// Height reserved above the bottom margin for the signature blocks.
    pub footer_band: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 841.89,
            height: 595.28,
            margin: 24.0,
            column_split: 0.65,
            gutter: 10.0,
            footer_band: 56.0,
        }
    }
}

impl PageGeometry {
    #[must_use]
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest y (top-down) a body section may reach.
    #[must_use]
    pub fn body_limit(&self) -> f32 {
        self.height - self.margin - self.footer_band
    }

    #[must_use]
    pub fn left_width(&self) -> f32 {
        (self.content_width() - self.gutter) * self.column_split
    }

    #[must_use]
    pub fn right_width(&self) -> f32 {
        self.content_width() - self.gutter - self.left_width()
    }

    #[must_use]
    pub fn right_x(&self) -> f32 {
        self.margin + self.left_width() + self.gutter
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub page: PageGeometry,
    /// Item table is always exactly this many rows.
    pub item_rows: usize,
    pub font_size: f32,
    pub title_font_size: f32,
    pub subtitle_font_size: f32,
    pub row_height: f32,
    pub section_gap: f32,
    pub title: String,
    pub subtitle: String,
    pub checked_by_label: String,
    pub signatory_label: String,
    /// Footer company name per branch code; keys match case-insensitively.
    pub companies: BTreeMap<String, String>,
    pub default_company: String,
    pub artifact_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page: PageGeometry::default(),
            item_rows: 8,
            font_size: 7.5,
            title_font_size: 14.0,
            subtitle_font_size: 9.0,
            row_height: 12.0,
            section_gap: 8.0,
            title: "MILL TEST CERTIFICATE".to_string(),
            subtitle: "Inspection certificate 3.1 as per EN 10204".to_string(),
            checked_by_label: "Checked By".to_string(),
            signatory_label: "Authorized Signatory".to_string(),
            companies: BTreeMap::new(),
            default_company: String::new(),
            artifact_prefix: "MTC_".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| ConfigError(format!("invalid config toml: {e}")))?;
        validate_render_config(&config)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
            .map_err(|e| ConfigError(format!("{}: {}", path.display(), e.0)))
    }

    /// Applies `MILLCERT_DEFAULT_COMPANY` and `MILLCERT_ARTIFACT_PREFIX`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(company) = non_blank_env(ENV_MILLCERT_DEFAULT_COMPANY) {
            self.default_company = company;
        }
        if let Some(prefix) = non_blank_env(ENV_MILLCERT_ARTIFACT_PREFIX) {
            self.artifact_prefix = prefix;
        }
        self
    }

    /// Footer company for a branch selector, falling back to `default_company`.
    #[must_use]
    pub fn company_for_branch(&self, branch: Option<&str>) -> &str {
        let Some(branch) = branch.map(str::trim).filter(|b| !b.is_empty()) else {
            return &self.default_company;
        };
        self.companies
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(branch))
            .map_or(self.default_company.as_str(), |(_, name)| name.as_str())
    }
}

pub fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    let page = &config.page;
    if page.width <= 0.0 || page.height <= 0.0 {
        return Err(ConfigError("page dimensions must be > 0".to_string()));
    }
    if page.content_width() <= page.gutter || page.body_limit() <= page.margin {
        return Err(ConfigError("margins leave no printable area".to_string()));
    }
    if page.column_split <= 0.0 || page.column_split >= 1.0 {
        return Err(ConfigError("column_split must be within (0, 1)".to_string()));
    }
    if config.item_rows == 0 {
        return Err(ConfigError("item_rows must be > 0".to_string()));
    }
    if config.font_size <= 0.0 || config.row_height < config.font_size {
        return Err(ConfigError(
            "row_height must be >= font_size and font_size > 0".to_string(),
        ));
    }
    Ok(())
}

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Flag(PathBuf),
    Env(PathBuf),
    Workspace(PathBuf),
    Defaults,
}

/// Resolution order: explicit flag, `MILLCERT_CONFIG`, workspace file, defaults.
/// Env overrides are applied last in every case.
pub fn resolve_render_config(
    flag: Option<&Path>,
) -> Result<(RenderConfig, ConfigSource), ConfigError> {
    let (config, source) = if let Some(path) = flag {
        (RenderConfig::load(path)?, ConfigSource::Flag(path.to_path_buf()))
    } else if let Some(path) = resolve_config_path(ConfigPathScope::Explicit) {
        (RenderConfig::load(&path)?, ConfigSource::Env(path))
    } else {
        match resolve_config_path(ConfigPathScope::Workspace).filter(|p| p.is_file()) {
            Some(path) => (RenderConfig::load(&path)?, ConfigSource::Workspace(path)),
            None => (RenderConfig::default(), ConfigSource::Defaults),
        }
    };
    Ok((config.with_env_overrides(), source))
}
