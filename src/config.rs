//! TOML-based dashboard configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::battery::BatteryParams;
use crate::profile::{Preset, ProfileEdit, ProfileKind, ProfileSnapshot};

/// Environment variable overriding `gateway.base_url`.
pub const GATEWAY_URL_ENV: &str = "DER_GATEWAY_URL";
/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "der-microgrid.toml";

/// Top-level configuration parsed from TOML.
///
/// Every section has defaults, so an empty file is valid. Load from TOML
/// with [`DashboardConfig::from_toml_file`] or start from
/// [`DashboardConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Where the remote functions live.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Initial battery scalars.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Initial profile overrides.
    #[serde(default)]
    pub profiles: ProfilesConfig,
    /// Log filter and format.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote function host.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Scheme, host, and port, e.g. `http://127.0.0.1:8888`.
    pub base_url: String,
    /// Path prefix under which functions are mounted.
    pub functions_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8888".to_string(),
            functions_path: "/.netlify/functions".to_string(),
        }
    }
}

/// Initial battery scalars. Ranges are not checked.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Capacity (kWh).
    pub capacity_kwh: f64,
    /// Initial state of charge.
    pub soc_initial: f64,
    /// Maximum power (kW).
    pub max_kw: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        let p = BatteryParams::default();
        Self {
            capacity_kwh: p.capacity_kwh,
            soc_initial: p.soc_initial,
            max_kw: p.max_kw,
        }
    }
}

/// Optional per-profile overrides: series text or a preset id, not both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfilesConfig {
    pub load: Option<String>,
    pub load_preset: Option<String>,
    pub solar: Option<String>,
    pub solar_preset: Option<String>,
    pub wind: Option<String>,
    pub wind_preset: Option<String>,
    pub prices: Option<String>,
    pub prices_preset: Option<String>,
}

impl ProfilesConfig {
    /// `(text, preset)` entries for `kind`.
    pub fn entry(&self, kind: ProfileKind) -> (Option<&str>, Option<&str>) {
        let (text, preset) = match kind {
            ProfileKind::Load => (&self.load, &self.load_preset),
            ProfileKind::Solar => (&self.solar, &self.solar_preset),
            ProfileKind::Wind => (&self.wind, &self.wind_preset),
            ProfileKind::Prices => (&self.prices, &self.prices_preset),
        };
        (text.as_deref(), preset.as_deref())
    }
}

/// Log filter and format.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"gateway.base_url"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl DashboardConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Loads `path` if given, else [`DEFAULT_CONFIG_FILE`] if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the chosen file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_toml_file(p),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Only [`GATEWAY_URL_ENV`] is honored here; `RUST_LOG` is read by the
    /// log filter itself.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(GATEWAY_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.gateway.base_url = url;
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. Battery values are
    /// deliberately not range-checked.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let g = &self.gateway;

        let url = g.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError {
                field: "gateway.base_url".into(),
                message: format!("must be an http:// or https:// URL, got \"{}\"", g.base_url),
            });
        } else if url.split_once("://").is_some_and(|(_, host)| host.is_empty()) {
            errors.push(ConfigError {
                field: "gateway.base_url".into(),
                message: "must include a host".into(),
            });
        }
        if !g.functions_path.is_empty() && !g.functions_path.starts_with('/') {
            errors.push(ConfigError {
                field: "gateway.functions_path".into(),
                message: "must be empty or start with \"/\"".into(),
            });
        }

        for kind in ProfileKind::ALL {
            if let (Some(_), Some(_)) = self.profiles.entry(kind) {
                errors.push(ConfigError {
                    field: format!("profiles.{kind}"),
                    message: format!("set either profiles.{kind} or profiles.{kind}_preset, not both"),
                });
            }
        }

        errors
    }

    /// Builds the initial snapshot: seeds, then battery values, then profile overrides.
    pub fn initial_snapshot(&self) -> ProfileSnapshot {
        let b = &self.battery;
        let mut snapshot = ProfileSnapshot {
            battery: BatteryParams {
                capacity_kwh: b.capacity_kwh,
                soc_initial: b.soc_initial,
                max_kw: b.max_kw,
            },
            ..ProfileSnapshot::default()
        };
        for kind in ProfileKind::ALL {
            let edit = match self.profiles.entry(kind) {
                (Some(text), _) => ProfileEdit::SetText {
                    kind,
                    text: text.to_string(),
                },
                (None, Some(id)) => ProfileEdit::ApplyPreset {
                    kind,
                    preset: Preset::from_id(id),
                },
                (None, None) => continue,
            };
            snapshot = snapshot.apply(edit);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        let cfg = DashboardConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg = DashboardConfig::from_toml_str("").expect("empty TOML should parse");
        assert_eq!(cfg.gateway.functions_path, "/.netlify/functions");
        assert_eq!(cfg.battery.capacity_kwh, 200.0);
    }

    #[test]
    fn full_toml_parses() {
        let toml = r#"
[gateway]
base_url = "https://functions.example.org"
functions_path = ""

[battery]
capacity_kwh = 120.0
soc_initial = 0.8
max_kw = 30.0

[profiles]
load = "10, 20, 30"
solar_preset = "peak"

[logging]
filter = "der_microgrid=debug"
json = true
"#;
        let cfg = DashboardConfig::from_toml_str(toml).expect("valid TOML should parse");
        assert_eq!(cfg.battery.max_kw, 30.0);
        assert!(cfg.logging.json);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[battery]
capacity_kwh = 100.0
bogus_field = true
"#;
        assert!(DashboardConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_bad_base_url() {
        let mut cfg = DashboardConfig::default();
        cfg.gateway.base_url = "ftp://host".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "gateway.base_url"));

        cfg.gateway.base_url = "http://".to_string();
        assert!(cfg.validate().iter().any(|e| e.message.contains("host")));
    }

    #[test]
    fn validation_catches_relative_functions_path() {
        let mut cfg = DashboardConfig::default();
        cfg.gateway.functions_path = "fn".to_string();
        assert!(cfg.validate().iter().any(|e| e.field == "gateway.functions_path"));
    }

    #[test]
    fn validation_rejects_text_and_preset_together() {
        let mut cfg = DashboardConfig::default();
        cfg.profiles.wind = Some("1,2".to_string());
        cfg.profiles.wind_preset = Some("flat".to_string());
        assert!(cfg.validate().iter().any(|e| e.field == "profiles.wind"));
    }

    #[test]
    fn validation_ignores_battery_ranges() {
        let mut cfg = DashboardConfig::default();
        cfg.battery.capacity_kwh = -5.0;
        cfg.battery.soc_initial = 3.0;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn env_overrides_base_url() {
        let mut cfg = DashboardConfig::default();
        cfg.apply_env(|k| (k == GATEWAY_URL_ENV).then(|| "http://other:9000".to_string()));
        assert_eq!(cfg.gateway.base_url, "http://other:9000");

        cfg.apply_env(|_| Some("  ".to_string()));
        assert_eq!(cfg.gateway.base_url, "http://other:9000");
    }

    #[test]
    fn initial_snapshot_applies_overrides() {
        let mut cfg = DashboardConfig::default();
        cfg.battery.capacity_kwh = 90.0;
        cfg.profiles.load = Some("1, x, 2".to_string());
        cfg.profiles.solar_preset = Some("flat".to_string());
        cfg.profiles.wind_preset = Some("nope".to_string());

        let snap = cfg.initial_snapshot();
        assert_eq!(snap.battery.capacity_kwh, 90.0);
        assert_eq!(snap.load.values(), &[1.0, 2.0]);
        assert!(snap.solar.values().iter().all(|&v| v == 50.0));
        assert!(snap.wind.values().iter().all(|&v| v == 0.0));
        assert_eq!(snap.prices, ProfileSnapshot::default().prices);
    }
}
