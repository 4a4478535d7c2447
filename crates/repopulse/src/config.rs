use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ============================================================================
// Repository identifier
// ============================================================================

/// A GitHub repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(RepoId {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(format!("invalid repository '{}', expected owner/repo", s)),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ============================================================================
// Run mode
// ============================================================================

/// Whether to run one cycle or loop on an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Single,
    Continuous,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single" => Ok(RunMode::Single),
            "continuous" => Ok(RunMode::Continuous),
            other => Err(format!(
                "invalid mode '{}', expected 'single' or 'continuous'",
                other
            )),
        }
    }
}

// ============================================================================
// Config file model
// ============================================================================

/// On-disk JSON configuration (`config.json` by default).
///
/// Every field is optional; missing sections fall back to defaults so a
/// partial file is still usable together with CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub github: GithubSection,
    pub automation: AutomationSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubSection {
    pub token: Option<String>,
    pub repo_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AutomationSection {
    pub continuous: bool,
    pub interval_minutes: Option<u64>,
    pub base_directory: Option<String>,
    pub default_branch: Option<String>,
    pub activities: ActivityToggles,
}

/// Per-activity enable switches. These filter the pool the cycle runner
/// samples from; an activity that is switched off is never selected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActivityToggles {
    pub create_issues: bool,
    pub create_prs: bool,
    pub create_content: bool,
}

impl Default for ActivityToggles {
    fn default() -> Self {
        ActivityToggles {
            create_issues: true,
            create_prs: true,
            create_content: true,
        }
    }
}

impl ConfigFile {
    /// Load and parse a JSON config file.
    pub fn load(path: &Path) -> Result<ConfigFile> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        let config: ConfigFile = serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in config file {:?}", path))?;
        Ok(config)
    }
}

// ============================================================================
// Resolved settings
// ============================================================================

/// CLI-provided values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub repo: Option<String>,
    pub mode: Option<RunMode>,
    pub interval_minutes: Option<u64>,
    pub base_dir: Option<PathBuf>,
}

/// The fully resolved runtime configuration.
///
/// Built once at startup from [`Overrides`] layered over an optional
/// [`ConfigFile`], then never mutated.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub repo: RepoId,
    pub mode: RunMode,
    pub interval_minutes: u64,
    pub base_dir: PathBuf,
    pub default_branch: String,
    pub activities: ActivityToggles,
}

impl Settings {
    /// Merge CLI overrides with an optional config file.
    ///
    /// Flags win over file values. A missing token or repository after the
    /// merge is a fatal configuration error.
    pub fn resolve(overrides: Overrides, file: Option<ConfigFile>) -> Result<Settings> {
        let file = file.unwrap_or_default();

        let token = match overrides.token.or(file.github.token) {
            Some(t) if !t.is_empty() => t,
            _ => bail!("GitHub token is required (set github.token in the config file or pass --token)"),
        };

        let repo_str = match overrides.repo.or(file.github.repo_name) {
            Some(r) if !r.is_empty() => r,
            _ => bail!("repository name is required (set github.repo_name in the config file or pass --repo)"),
        };
        let repo = RepoId::from_str(&repo_str).map_err(|e| anyhow::anyhow!(e))?;

        let mode = overrides.mode.unwrap_or(if file.automation.continuous {
            RunMode::Continuous
        } else {
            RunMode::Single
        });

        Ok(Settings {
            token,
            repo,
            mode,
            interval_minutes: overrides
                .interval_minutes
                .or(file.automation.interval_minutes)
                .unwrap_or(60),
            base_dir: overrides
                .base_dir
                .or(file.automation.base_directory.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(".")),
            default_branch: file
                .automation
                .default_branch
                .unwrap_or_else(|| "main".to_string()),
            activities: file.automation.activities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── RepoId ─────────────────────────────────────────────────────────

    #[test]
    fn test_repo_id_parse() {
        let repo: RepoId = "octocat/hello-world".parse().unwrap();
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.name, "hello-world");
        assert_eq!(repo.to_string(), "octocat/hello-world");
    }

    #[test]
    fn test_repo_id_rejects_missing_slash() {
        assert!("justaname".parse::<RepoId>().is_err());
    }

    #[test]
    fn test_repo_id_rejects_empty_parts() {
        assert!("/repo".parse::<RepoId>().is_err());
        assert!("owner/".parse::<RepoId>().is_err());
        assert!("a/b/c".parse::<RepoId>().is_err());
    }

    // ── RunMode ────────────────────────────────────────────────────────

    #[test]
    fn test_run_mode_parse() {
        assert_eq!("single".parse::<RunMode>().unwrap(), RunMode::Single);
        assert_eq!(
            "continuous".parse::<RunMode>().unwrap(),
            RunMode::Continuous
        );
        assert!("forever".parse::<RunMode>().is_err());
    }

    // ── ConfigFile ─────────────────────────────────────────────────────

    #[test]
    fn test_config_file_full() {
        let json = r#"{
            "github": {"token": "t0k3n", "repo_name": "acme/widgets"},
            "automation": {
                "continuous": true,
                "interval_minutes": 30,
                "base_directory": "/tmp/widgets",
                "activities": {"create_issues": false, "create_prs": true, "create_content": true}
            }
        }"#;
        let config: ConfigFile = serde_json::from_str(json).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("t0k3n"));
        assert!(config.automation.continuous);
        assert_eq!(config.automation.interval_minutes, Some(30));
        assert!(!config.automation.activities.create_issues);
        assert!(config.automation.activities.create_prs);
    }

    #[test]
    fn test_config_file_partial_defaults() {
        let config: ConfigFile = serde_json::from_str(r#"{"github": {"token": "x"}}"#).unwrap();
        assert!(config.github.repo_name.is_none());
        assert!(!config.automation.continuous);
        assert!(config.automation.activities.create_issues);
        assert!(config.automation.activities.create_prs);
        assert!(config.automation.activities.create_content);
    }

    #[test]
    fn test_config_file_load_missing() {
        assert!(ConfigFile::load(Path::new("/nonexistent/config.json")).is_err());
    }

    #[test]
    fn test_config_file_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(ConfigFile::load(&path).is_err());
    }

    // ── Settings::resolve ──────────────────────────────────────────────

    fn file_with_token_and_repo() -> ConfigFile {
        serde_json::from_str(
            r#"{"github": {"token": "file-token", "repo_name": "file/repo"},
                "automation": {"continuous": true, "interval_minutes": 15}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_flags_win_over_file() {
        let overrides = Overrides {
            token: Some("flag-token".to_string()),
            repo: Some("flag/repo".to_string()),
            mode: Some(RunMode::Single),
            interval_minutes: Some(5),
            base_dir: Some(PathBuf::from("/work")),
        };
        let settings = Settings::resolve(overrides, Some(file_with_token_and_repo())).unwrap();
        assert_eq!(settings.token, "flag-token");
        assert_eq!(settings.repo.to_string(), "flag/repo");
        assert_eq!(settings.mode, RunMode::Single);
        assert_eq!(settings.interval_minutes, 5);
        assert_eq!(settings.base_dir, PathBuf::from("/work"));
    }

    #[test]
    fn test_resolve_falls_back_to_file() {
        let settings =
            Settings::resolve(Overrides::default(), Some(file_with_token_and_repo())).unwrap();
        assert_eq!(settings.token, "file-token");
        assert_eq!(settings.repo.to_string(), "file/repo");
        assert_eq!(settings.mode, RunMode::Continuous);
        assert_eq!(settings.interval_minutes, 15);
        assert_eq!(settings.base_dir, PathBuf::from("."));
        assert_eq!(settings.default_branch, "main");
    }

    #[test]
    fn test_resolve_missing_token_is_fatal() {
        let overrides = Overrides {
            repo: Some("a/b".to_string()),
            ..Default::default()
        };
        let err = Settings::resolve(overrides, None).unwrap_err();
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn test_resolve_missing_repo_is_fatal() {
        let overrides = Overrides {
            token: Some("t".to_string()),
            ..Default::default()
        };
        let err = Settings::resolve(overrides, None).unwrap_err();
        assert!(err.to_string().contains("repository"));
    }

    #[test]
    fn test_resolve_empty_token_is_fatal() {
        let config: ConfigFile =
            serde_json::from_str(r#"{"github": {"token": "", "repo_name": "a/b"}}"#).unwrap();
        assert!(Settings::resolve(Overrides::default(), Some(config)).is_err());
    }

    #[test]
    fn test_resolve_defaults_without_file() {
        let overrides = Overrides {
            token: Some("t".to_string()),
            repo: Some("a/b".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(overrides, None).unwrap();
        assert_eq!(settings.mode, RunMode::Single);
        assert_eq!(settings.interval_minutes, 60);
        assert_eq!(settings.default_branch, "main");
        assert!(settings.activities.create_issues);
    }
}
