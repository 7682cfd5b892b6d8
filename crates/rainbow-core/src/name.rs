//! Logger display-name derivation.
//!
//! A logger called `net` inside `/opt/tools/sync` is displayed as
//! `tools.sync: net`, so output from several programs sharing a terminal
//! stays attributable.

use std::path::Path;

/// Longest display name kept intact when shortening is requested.
pub const MAX_NAME_LEN: usize = 40;

/// Display name of the invoking program, taken from `argv[0]`.
pub fn invoking_program() -> Option<String> {
    let arg0 = std::env::args_os().next()?;
    let arg0 = arg0.to_string_lossy();
    if arg0.is_empty() {
        return None;
    }
    Some(main_name(&arg0))
}

/// Strip the extension and keep at most the last two path components,
/// joined with `.`.
pub fn main_name(program: &str) -> String {
    let path = Path::new(program);
    let stripped = match path.extension() {
        Some(ext) => &program[..program.len() - ext.len() - 1],
        None => program,
    };
    if !stripped.contains('/') {
        return stripped.to_string();
    }
    let parts: Vec<&str> = stripped.split('/').collect();
    parts[parts.len().saturating_sub(2)..].join(".")
}

/// Prefix `name` with the program name and optionally shorten it.
pub fn modify_name(name: &str, program: Option<&str>, shorten: bool) -> String {
    let name = match program {
        Some(program) => format!("{program}: {name}"),
        None => name.to_string(),
    };
    if shorten && name.chars().count() > MAX_NAME_LEN {
        truncate_left(&name, MAX_NAME_LEN)
    } else {
        name
    }
}

/// `"..."` followed by the last `width - 1` characters minus their first
/// three. The result is `width - 1` characters long for inputs at least that
/// long.
pub fn truncate_left(name: &str, width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    let keep = width.saturating_sub(1);
    let tail: String = chars[chars.len().saturating_sub(keep)..].iter().skip(3).collect();
    format!("...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_name_variants() {
        assert_eq!(main_name("sync"), "sync");
        assert_eq!(main_name("sync.exe"), "sync");
        assert_eq!(main_name("/opt/tools/sync"), "tools.sync");
        assert_eq!(main_name("./target/debug/rainbow-demo"), "debug.rainbow-demo");
        assert_eq!(main_name("bin/job.py"), "bin.job");
    }

    #[test]
    fn dotted_directory_keeps_its_name() {
        assert_eq!(main_name("/srv/app.d/run"), "app.d.run");
    }

    #[test]
    fn modify_prefixes_program() {
        assert_eq!(modify_name("net", Some("tools.sync"), false), "tools.sync: net");
        assert_eq!(modify_name("net", None, false), "net");
    }

    #[test]
    fn shorten_only_long_names() {
        let long = "x".repeat(50);
        let short = modify_name(&long, None, true);
        assert_eq!(short.chars().count(), 39);
        assert!(short.starts_with("..."));

        assert_eq!(modify_name(&long, None, false), long);
        let exact = "y".repeat(MAX_NAME_LEN);
        assert_eq!(modify_name(&exact, None, true), exact);
    }

    #[test]
    fn truncate_short_input() {
        assert_eq!(truncate_left("abcdef", 40), "...def");
    }
}
