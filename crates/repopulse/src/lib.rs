#![doc = include_str!("../README.md")]

mod activity;
mod config;
mod content;

pub use activity::{Activity, select_activities};
pub use config::{
    ActivityToggles, AutomationSection, ConfigFile, GithubSection, Overrides, RepoId, RunMode,
    Settings,
};
pub use content::{ContentKind, GeneratedFile, generate_body, generate_file_name, write_generated};
