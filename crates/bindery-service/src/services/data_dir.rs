// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::PathBuf;

use bindery_core::error::Result;

/// Overrides every other location when set.
pub const DATA_DIR_ENV: &str = "BINDERY_DATA_DIR";

const APP_DIR_NAME: &str = "bindery";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> Result<PathBuf> {
    let dir = resolve_data_dir(|key| std::env::var(key).ok());
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Pick the data directory from the environment, read through `var`.
fn resolve_data_dir(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    let set = |key: &str| var(key).filter(|value| !value.is_empty());

    if let Some(dir) = set(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if let Some(xdg) = set("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join(APP_DIR_NAME);
    }
    if let Some(home) = set("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR_NAME);
    }
    // Last resort
    std::env::temp_dir().join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_override_wins() {
        let dir = resolve_data_dir(env(&[
            (DATA_DIR_ENV, "/srv/bindery"),
            ("XDG_DATA_HOME", "/xdg"),
            ("HOME", "/home/u"),
        ]));
        assert_eq!(dir, PathBuf::from("/srv/bindery"));
    }

    #[test]
    fn xdg_before_home() {
        let dir = resolve_data_dir(env(&[("XDG_DATA_HOME", "/xdg"), ("HOME", "/home/u")]));
        assert_eq!(dir, PathBuf::from("/xdg/bindery"));
    }

    #[test]
    fn home_fallback() {
        let dir = resolve_data_dir(env(&[("HOME", "/home/u"), ("XDG_DATA_HOME", "")]));
        assert_eq!(dir, PathBuf::from("/home/u/.local/share/bindery"));
    }

    #[test]
    fn temp_dir_when_nothing_is_set() {
        let dir = resolve_data_dir(env(&[]));
        assert_eq!(dir, std::env::temp_dir().join("bindery"));
    }
}
