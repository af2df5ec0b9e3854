use crate::syntax::Theme;
use std::path::PathBuf;

pub fn get_config_dir() -> PathBuf {
    let config_home = dirs::config_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config")
    });
    config_home.join("codereel")
}

pub fn find_config_file() -> Option<PathBuf> {
    let config_dir = get_config_dir();
    let mut paths = vec![config_dir.join("config.toml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".codereel").join("config.toml"));
    }

    paths.into_iter().find(|p| p.exists())
}

/// The theme file used when the configuration names none.
pub fn find_user_theme() -> Option<PathBuf> {
    let config_dir = get_config_dir();
    let mut paths = vec![config_dir.join("theme.toml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".codereel").join("theme.toml"));
    }
    paths.push(PathBuf::from("./theme.toml"));

    paths.into_iter().find(|p| p.exists())
}

/// A theme file called `name`, from the themes directory of the config dir
/// or of the current directory.
pub fn find_named_theme(name: &str) -> Option<PathBuf> {
    let file = format!("{}.toml", name);
    let paths = vec![
        get_config_dir().join("themes").join(&file),
        PathBuf::from("./themes").join(&file),
    ];

    paths.into_iter().find(|p| p.exists())
}

/// Directory holding `queries/<language>/highlights.scm` overrides.
pub fn find_runtime_dir() -> Option<PathBuf> {
    let dir = get_config_dir().join("runtime");
    dir.is_dir().then_some(dir)
}

pub fn list_builtin_themes() -> Vec<String> {
    Theme::builtin_names().iter().map(|name| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_is_namespaced() {
        assert!(get_config_dir().ends_with("codereel"));
    }

    #[test]
    fn test_builtin_themes_listed() {
        let themes = list_builtin_themes();
        assert!(themes.iter().any(|name| name == "default"));
        assert!(themes.iter().all(|name| Theme::builtin(name).is_some()));
    }
}
