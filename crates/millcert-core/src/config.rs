use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigPathScope {
    /// `MILLCERT_CONFIG`, when set and non-blank.
    Explicit,
    User,
    Workspace,
}

#[must_use]
pub fn resolve_config_path(scope: ConfigPathScope) -> Option<PathBuf> {
    match scope {
        ConfigPathScope::Explicit => non_blank_env(crate::ENV_MILLCERT_CONFIG).map(PathBuf::from),
        ConfigPathScope::User => {
            if let Some(xdg_config_home) = non_blank_env("XDG_CONFIG_HOME") {
                return Some(
                    PathBuf::from(xdg_config_home)
                        .join("millcert")
                        .join("config.toml"),
                );
            }
            non_blank_env("HOME").map(|home| {
                PathBuf::from(home)
                    .join(".config")
                    .join("millcert")
                    .join("config.toml")
            })
        }
        ConfigPathScope::Workspace => Some(PathBuf::from(".millcert").join("config.toml")),
    }
}

#[must_use]
pub fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
