use crate::core::filter::default_catalog;
use crate::core::sync::DEFAULT_ZOOM;
use crate::domain::model::FenceOption;
use crate::utils::error::{FenceError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub map: MapConfig,
    pub catalog: Option<Vec<FenceOption>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub pin: String,
    pub session_file: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            pin: "1234".to_string(),
            session_file: "./.fence-quote/session.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub country_codes: String,
    pub user_agent: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            country_codes: "gb".to_string(),
            user_agent: concat!("fence-quote/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: u8,
    pub tile_url: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FenceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FenceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NOMINATIM_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FenceError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 取得圍籬目錄，沒有覆寫時使用內建目錄
    pub fn catalog(&self) -> Vec<FenceOption> {
        self.catalog.clone().unwrap_or_else(default_catalog)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("geocoder.base_url", &self.geocoder.base_url)?;
        validation::validate_non_empty_string("geocoder.country_codes", &self.geocoder.country_codes)?;
        validation::validate_non_empty_string("geocoder.user_agent", &self.geocoder.user_agent)?;
        validation::validate_path("gate.session_file", &self.gate.session_file)?;
        validation::validate_range("map.zoom", self.map.zoom, 1, 19)?;

        if !self.gate.pin.chars().any(|c| c.is_ascii_digit()) {
            return Err(FenceError::InvalidConfigValueError {
                field: "gate.pin".to_string(),
                value: self.gate.pin.clone(),
                reason: "PIN must contain at least one digit".to_string(),
            });
        }

        if let Some(catalog) = &self.catalog {
            if catalog.is_empty() {
                return Err(FenceError::MissingConfigError {
                    field: "catalog".to_string(),
                });
            }
            if catalog.iter().any(|o| o.id.trim().is_empty()) {
                return Err(FenceError::MissingConfigError {
                    field: "catalog.id".to_string(),
                });
            }
            validation::validate_unique_ids("catalog.id", catalog.iter().map(|o| o.id.as_str()))?;
            for option in catalog {
                validation::validate_non_empty_string("catalog.name", &option.name)?;
                validation::validate_positive("catalog.capacity_kpa", option.capacity_kpa)?;
                validation::validate_positive("catalog.max_height_m", option.max_height_m)?;
            }
        }

        Ok(())
    }
}
