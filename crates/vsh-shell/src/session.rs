//! Session state: working directory, environment, command history, and the
//! namespaced installed-package registries.
//!
//! The history list is append-only; the navigation cursor lives in
//! [`crate::Shell`] together with the input buffer it edits.

use std::collections::{BTreeMap, BTreeSet};

/// Mutable per-session shell state.
#[derive(Debug)]
pub struct SessionState {
    cwd: String,
    env: BTreeMap<String, String>,
    history: Vec<String>,
    packages: BTreeSet<String>,
}

impl SessionState {
    /// Fresh session at home with the default environment and the seed
    /// `base-system` package.
    pub fn new() -> Self {
        let mut env = BTreeMap::new();
        env.insert(
            "PATH".to_string(),
            "~/.local/bin:/usr/local/bin:/usr/bin:/bin".to_string(),
        );
        env.insert("USER".to_string(), "guest".to_string());
        env.insert("HOME".to_string(), "~".to_string());
        env.insert("SHELL".to_string(), "/bin/bash".to_string());

        let mut packages = BTreeSet::new();
        packages.insert("base-system".to_string());

        Self {
            cwd: "~".to_string(),
            env,
            history: Vec::new(),
            packages,
        }
    }

    /// Current working path (always canonical).
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn set_cwd(&mut self, cwd: String) {
        self.cwd = cwd;
    }

    // -- Environment --

    /// Value of an environment variable.
    pub fn env_get(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    pub fn env_set(&mut self, name: &str, value: &str) {
        self.env.insert(name.to_string(), value.to_string());
    }

    /// All variables, sorted by name.
    pub fn env_iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // -- History --

    pub fn push_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    // -- Installed packages --
    //
    // Identifiers are namespaced by manager prefix: `apt` packages are bare
    // names, the others use `npm:`, `pip:`, `winget:` prefixes, so the same
    // name installed by two managers stays distinct.

    pub fn is_installed(&self, id: &str) -> bool {
        self.packages.contains(id)
    }

    pub fn install(&mut self, id: &str) {
        self.packages.insert(id.to_string());
    }

    /// Remove a package id; `false` if it was not installed.
    pub fn uninstall(&mut self, id: &str) -> bool {
        self.packages.remove(id)
    }

    /// Installed ids with the given namespace prefix, sorted.
    pub fn installed_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.packages
            .iter()
            .filter(|p| p.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    /// Installed `apt` ids (the un-namespaced ones), sorted.
    pub fn installed_bare(&self) -> Vec<&str> {
        self.packages
            .iter()
            .filter(|p| !p.contains(':'))
            .map(String::as_str)
            .collect()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
