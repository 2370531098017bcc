use crate::core::entitlement::{PlanPolicy, default_plans};
use crate::core::tier::{Tier, TierStyle, default_tiers, default_unranked_style};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "rankgate.toml";
pub const DEFAULT_TOTAL_MARKERS: u32 = 8;

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub ladder: LadderConfig,
    pub plans: Vec<PlanPolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            ladder: LadderConfig::default(),
            plans: default_plans(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub json: bool,
    pub total_markers: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            json: false,
            total_markers: DEFAULT_TOTAL_MARKERS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    pub unranked: TierStyle,
    pub tiers: Vec<Tier>,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            unranked: default_unranked_style(),
            tiers: default_tiers(),
        }
    }
}

pub fn load_config(cli_config_path: Option<&Path>, cwd: &Path) -> Result<LoadedConfig> {
    if let Some(path) = cli_config_path {
        if !path.exists() {
            bail!(
                "config file not found at {} (passed with --config)",
                path.display()
            );
        }

        return Ok(LoadedConfig {
            config: read_config(path)?,
            source: Some(path.to_path_buf()),
        });
    }

    let local_path = cwd.join(CONFIG_FILE_NAME);
    if local_path.exists() {
        return Ok(LoadedConfig {
            config: read_config(&local_path)?,
            source: Some(local_path),
        });
    }

    tracing::debug!("no {} found, using built-in ladder and plans", CONFIG_FILE_NAME);
    Ok(LoadedConfig {
        config: Config::default(),
        source: None,
    })
}

pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "refusing to overwrite existing config file: {}",
            path.display()
        );
    }

    let content = default_config_toml()?;
    fs::write(path, content).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}

pub fn default_config_toml() -> Result<String> {
    toml::to_string_pretty(&Config::default()).context("failed to serialize default config")
}

fn read_config(path: &Path) -> Result<Config> {
    tracing::debug!(path = %path.display(), "reading config");
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed reading config file {}", path.display()))?;
    let config = toml::from_str::<Config>(&content)
        .with_context(|| format!("failed parsing config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entitlement::Quota;

    #[test]
    fn default_config_round_trips_through_toml() {
        let rendered = default_config_toml().expect("serializable default");
        let parsed = toml::from_str::<Config>(&rendered).expect("parseable default");
        assert_eq!(parsed.ladder.tiers, default_tiers());
        assert_eq!(parsed.plans, default_plans());
        assert_eq!(parsed.general.total_markers, DEFAULT_TOTAL_MARKERS);
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_sections() {
        let parsed = toml::from_str::<Config>(
            r#"
[general]
json = true

[[plans]]
id = "trial"
name = "Trial"
markers = 2
quota = { kind = "lifetime", scans = 3 }
"#,
        )
        .expect("valid config");

        assert!(parsed.general.json);
        assert_eq!(parsed.general.total_markers, DEFAULT_TOTAL_MARKERS);
        assert_eq!(parsed.ladder.tiers.len(), default_tiers().len());
        assert_eq!(parsed.plans.len(), 1);
        assert_eq!(parsed.plans[0].quota, Quota::Lifetime { scans: 3 });
    }

    #[test]
    fn parses_custom_ladder() {
        let parsed = toml::from_str::<Config>(
            r##"
[ladder.unranked]
color = "#333"
gradient = "none"
text_color = "#fff"

[[ladder.tiers]]
name = "TOP"
threshold = 8.0
style = { color = "#FF0000", gradient = "red", text_color = "#000", glow = "0 0 8px red" }

[[ladder.tiers]]
name = "MID"
threshold = 4.0
style = { color = "#00FF00", gradient = "green", text_color = "#000" }
"##,
        )
        .expect("valid config");

        assert_eq!(parsed.ladder.tiers.len(), 2);
        assert_eq!(parsed.ladder.tiers[0].style.glow.as_deref(), Some("0 0 8px red"));
        assert_eq!(parsed.ladder.tiers[1].style.glow, None);
        assert_eq!(parsed.ladder.unranked.color, "#333");
    }

    #[test]
    fn example_config_is_valid() {
        let parsed = toml::from_str::<Config>(include_str!("../rankgate.example.toml"))
            .expect("example config parses");
        let engine = crate::core::Engine::from_config(&parsed).expect("example config validates");
        assert_eq!(engine.ladder.classify(7.2).name, "STRONG");
        assert_eq!(engine.plans.plans().len(), 3);
    }

    #[test]
    fn write_default_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);

        write_default_config(&path).expect("first write succeeds");
        let written = fs::read_to_string(&path).expect("config written");
        assert!(toml::from_str::<Config>(&written).is_ok());

        let err = write_default_config(&path).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
    }

    #[test]
    fn picks_up_config_from_working_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[general]\njson = true\n")
            .expect("write config");

        let loaded = load_config(None, dir.path()).expect("loads config");
        assert!(loaded.config.general.json);
        assert_eq!(loaded.source, Some(dir.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn padded_config_values_still_resolve() {
        let mut cfg = Config::default();
        cfg.plans[2].id = " pro ".to_string();
        cfg.ladder.tiers[0].name = " LEGENDARY ".to_string();

        let engine = crate::core::Engine::from_config(&cfg).expect("valid config");
        let quota = engine.quota("pro", 5, 0);
        assert!(!quota.fell_back);
        assert_eq!(quota.remaining, crate::core::entitlement::Remaining::Unlimited);
        assert!(!engine.ladder.is_unranked(engine.ladder.tier_metadata("LEGENDARY")));
    }

    #[test]
    fn missing_cli_config_path_is_an_error() {
        let cwd = std::env::temp_dir();
        let missing = cwd.join("rankgate-definitely-missing.toml");
        let err = load_config(Some(&missing), &cwd).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
