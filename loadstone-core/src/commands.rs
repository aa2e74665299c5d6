//! Textual command surface over the load manager
//!
//! Translates `Load` / `Reload` / `Status` command lines into manager
//! calls. Load and reload side effects (captured replays, notices)
//! stream through the manager's ambient channel; the lines returned by
//! [`dispatch`] are the command's own answer.

use thiserror::Error;

use crate::manager::{CallbackUpdate, LoadManager};

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load each listed path independently, with no callback
    Load(Vec<String>),
    /// Reload the listed paths, or every known path when empty
    Reload(Vec<String>),
    /// Status of one path, or a summary when none is given
    Status(Option<String>),
}

/// Errors from parsing a command line
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing to parse
    #[error("Empty command")]
    Empty,

    /// Unrecognized command word
    #[error("Unknown command: {0}")]
    Unknown(String),

    /// `Load` was given no module paths
    #[error("Load requires at least one module path")]
    MissingPaths,
}

impl Command {
    /// Parse one command line; the command word is case-insensitive
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let rest: Vec<String> = words.map(str::to_string).collect();

        if head.eq_ignore_ascii_case("load") {
            if rest.is_empty() {
                return Err(CommandError::MissingPaths);
            }
            Ok(Self::Load(rest))
        } else if head.eq_ignore_ascii_case("reload") {
            Ok(Self::Reload(rest))
        } else if head.eq_ignore_ascii_case("status") {
            Ok(Self::Status(rest.into_iter().next()))
        } else {
            Err(CommandError::Unknown(head.to_string()))
        }
    }
}

/// Apply a command to the manager, returning printable response lines
pub fn dispatch(manager: &mut LoadManager, command: Command) -> Vec<String> {
    match command {
        Command::Load(paths) => {
            for path in &paths {
                manager.load(path, None);
            }
            Vec::new()
        }
        Command::Reload(paths) => {
            let targets = if paths.is_empty() {
                manager.known_modules()
            } else {
                paths
            };
            for path in &targets {
                manager.reload(path, CallbackUpdate::Keep);
            }
            Vec::new()
        }
        Command::Status(Some(path)) => vec![status_line(manager, &path)],
        Command::Status(None) => summary(manager),
    }
}

fn status_line(manager: &LoadManager, path: &str) -> String {
    match manager.status(path) {
        Some(report) => format!(
            "{}: {{ imported={}, import_duration={}, imported_with={} }}",
            path,
            report.imported(),
            report.duration_millis(),
            report.co_loaded_with.join(",")
        ),
        None => format!("{path}: unknown module"),
    }
}

fn summary(manager: &LoadManager) -> Vec<String> {
    let settings = manager.settings();
    let success_icon = settings.success_icon.clone();
    let failed_icon = settings.failed_icon.clone();

    let mut lines = Vec::new();
    for path in manager.known_modules() {
        if let Some(report) = manager.status(&path) {
            let icon = if report.imported() {
                &success_icon
            } else {
                &failed_icon
            };
            lines.push(format!("{icon} {path}"));
        }
    }
    lines.push(format!(
        "{} loaded, {} failed",
        manager.success_count(),
        manager.failure_count()
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MockLoader;
    use crate::output::MemoryChannel;
    use serde_json::json;

    fn manager_with(loader: &MockLoader) -> LoadManager {
        let mut manager = LoadManager::new(Box::new(loader.clone()));
        manager.set_channel(Box::new(MemoryChannel::new()));
        manager
    }

    #[test]
    fn test_parse_load() {
        let cmd = Command::parse("Load mod.a mod.b").unwrap();
        assert_eq!(
            cmd,
            Command::Load(vec!["mod.a".to_string(), "mod.b".to_string()])
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            Command::parse("reload mod.a").unwrap(),
            Command::Reload(vec!["mod.a".to_string()])
        );
        assert_eq!(
            Command::parse("STATUS").unwrap(),
            Command::Status(None)
        );
    }

    #[test]
    fn test_parse_status_with_path() {
        assert_eq!(
            Command::parse("Status mod.a").unwrap(),
            Command::Status(Some("mod.a".to_string()))
        );
    }

    #[test]
    fn test_parse_reload_without_paths_means_all() {
        assert_eq!(Command::parse("Reload").unwrap(), Command::Reload(vec![]));
    }

    #[test]
    fn test_parse_rejects_empty_and_unknown() {
        assert_eq!(Command::parse("   ").unwrap_err(), CommandError::Empty);
        assert_eq!(
            Command::parse("Unload mod.a").unwrap_err(),
            CommandError::Unknown("Unload".to_string())
        );
        assert_eq!(Command::parse("Load").unwrap_err(), CommandError::MissingPaths);
    }

    #[test]
    fn test_load_command_loads_each_path_independently() {
        let loader = MockLoader::new();
        loader.succeed_with("mod.a", json!(1));
        loader.succeed_with("mod.b", json!(2));
        let mut manager = manager_with(&loader);

        dispatch(
            &mut manager,
            Command::Load(vec!["mod.a".to_string(), "mod.b".to_string()]),
        );

        // independent loads, not a batch: no co-load tracking
        assert!(manager.status("mod.a").unwrap().co_loaded_with.is_empty());
        assert!(manager.status("mod.b").unwrap().co_loaded_with.is_empty());
        assert_eq!(manager.success_count(), 2);
    }

    #[test]
    fn test_status_line_format_for_known_module() {
        let loader = MockLoader::new();
        loader.succeed_with("mod.a", json!(1));
        let mut manager = manager_with(&loader);
        manager.load("mod.a", None);

        let lines = dispatch(&mut manager, Command::Status(Some("mod.a".to_string())));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("mod.a: { imported=true, import_duration="));
        assert!(lines[0].ends_with(", imported_with= }"));
    }

    #[test]
    fn test_status_line_for_unknown_module() {
        let loader = MockLoader::new();
        let mut manager = manager_with(&loader);

        let lines = dispatch(
            &mut manager,
            Command::Status(Some("never-loaded".to_string())),
        );
        assert_eq!(lines, vec!["never-loaded: unknown module".to_string()]);
    }

    #[test]
    fn test_status_line_lists_co_loaded_paths() {
        let loader = MockLoader::new();
        loader.succeed_with("mod.a", json!(1));
        loader.succeed_with("mod.b", json!(2));
        let mut manager = manager_with(&loader);
        manager.load_batch(&["mod.a", "mod.b"], None);

        let lines = dispatch(&mut manager, Command::Status(Some("mod.a".to_string())));
        assert!(lines[0].contains("imported_with=mod.b"));
    }

    #[test]
    fn test_summary_lists_modules_with_icons_and_counts() {
        let loader = MockLoader::new();
        loader.succeed_with("mod.good", json!(1));
        loader.fail_with("mod.bad", "nope");
        let mut manager = manager_with(&loader);
        manager.load("mod.good", None);
        manager.load("mod.bad", None);

        let lines = dispatch(&mut manager, Command::Status(None));
        assert!(lines.contains(&"✗ mod.bad".to_string()));
        assert!(lines.contains(&"✓ mod.good".to_string()));
        assert_eq!(lines.last().unwrap(), "1 loaded, 1 failed");
    }

    #[test]
    fn test_reload_with_no_paths_reloads_all_known() {
        let loader = MockLoader::new();
        loader.succeed_with("mod.a", json!(1));
        loader.fail_with("mod.b", "flaky");
        let mut manager = manager_with(&loader);
        manager.load("mod.a", None);
        manager.load("mod.b", None);

        // mod.b recovers before the blanket reload
        loader.succeed_with("mod.b", json!(2));
        dispatch(&mut manager, Command::Reload(vec![]));

        assert_eq!(manager.success_count(), 2);
        assert_eq!(manager.failure_count(), 0);
        assert_eq!(loader.load_count("mod.a"), 2);
    }
}
