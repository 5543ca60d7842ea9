use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CONFIG_PATH: &str = "workspace.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeMode {
    /// Standalone: no host application is attached.
    None,
    /// Host payloads are printed to stdout, one JSON document per line.
    Stdout,
}

impl std::str::FromStr for BridgeMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "standalone" => Ok(BridgeMode::None),
            "stdout" => Ok(BridgeMode::Stdout),
            other => bail!("unknown bridge mode '{other}' (expected none or stdout)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub public_url: Option<String>,
    pub bridge: BridgeMode,
    pub log_filter: String,
    pub default_project_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            public_url: None,
            bridge: BridgeMode::None,
            log_filter: "info".into(),
            default_project_name: client_core::session::DEFAULT_PROJECT_NAME.into(),
        }
    }
}

/// Defaults, then the optional TOML file, then environment overrides.
/// Command-line flags are applied by the caller on top of the result.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
        apply_file(&mut settings, &file_cfg)?;
    }

    apply_env(&mut settings, |name| std::env::var(name).ok())?;
    settings.server_url = normalize_server_url(&settings.server_url);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: &HashMap<String, String>) -> anyhow::Result<()> {
    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("public_url") {
        settings.public_url = non_blank(v);
    }
    if let Some(v) = file_cfg.get("bridge") {
        settings.bridge = v.parse()?;
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
    if let Some(v) = file_cfg.get("default_project_name") {
        settings.default_project_name = v.clone();
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = var("WORKSPACE_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("WORKSPACE_PUBLIC_URL") {
        settings.public_url = non_blank(&v);
    }
    if let Some(v) = var("APP__PUBLIC_URL") {
        settings.public_url = non_blank(&v);
    }

    if let Some(v) = var("APP__BRIDGE") {
        settings.bridge = v.parse()?;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    Ok(())
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn normalize_server_url(raw_server_url: &str) -> String {
    let trimmed = raw_server_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_SERVER_URL.to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn normalizes_trailing_slashes_and_blank_urls() {
        assert_eq!(
            normalize_server_url(" http://files.local:9000// "),
            "http://files.local:9000"
        );
        assert_eq!(normalize_server_url("   "), DEFAULT_SERVER_URL);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut settings = Settings::default();
        let file_cfg = HashMap::from([
            ("server_url".to_string(), "http://from-file:1".to_string()),
            ("bridge".to_string(), "stdout".to_string()),
            ("public_url".to_string(), "https://public.example".to_string()),
        ]);
        apply_file(&mut settings, &file_cfg).expect("file");
        assert_eq!(settings.bridge, BridgeMode::Stdout);

        let env_cfg = HashMap::from([
            ("WORKSPACE_SERVER_URL", "http://legacy:2"),
            ("APP__SERVER_URL", "http://app:3"),
            ("APP__PUBLIC_URL", "  "),
        ]);
        apply_env(&mut settings, |name| {
            env_cfg.get(name).map(|v| v.to_string())
        })
        .expect("env");
        assert_eq!(settings.server_url, "http://app:3");
        assert_eq!(settings.public_url, None);
        assert_eq!(settings.default_project_name, "My Project");
    }

    #[test]
    fn rejects_unknown_bridge_mode() {
        let mut settings = Settings::default();
        let err = apply_env(&mut settings, |name| {
            (name == "APP__BRIDGE").then(|| "carrier-pigeon".to_string())
        })
        .expect_err("bad bridge");
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn reads_settings_file_from_disk() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("workspace_shell_settings_{suffix}.toml"));
        fs::write(
            &path,
            "log_filter = \"debug\"\ndefault_project_name = \"Scratch\"\n",
        )
        .expect("write settings");

        let settings = load_settings(&path).expect("load");
        assert_eq!(settings.log_filter, "debug");
        assert_eq!(settings.default_project_name, "Scratch");

        fs::remove_file(path).expect("cleanup");
    }
}
