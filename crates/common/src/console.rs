//! Terminal output helpers: colors, command echo, launcher lookup

use std::env;
use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Width of the horizontal rules around reports
pub const RULE_WIDTH: usize = 79;

/// Heavy rule (`=`) framing a report
pub fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Light rule (`-`) separating sections
pub fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Wrap text in the ANSI red color
pub fn red(text: &str) -> String {
    format!("\x1b[0;31m{text}\x1b[0m")
}

/// Wrap text in the ANSI green color
pub fn green(text: &str) -> String {
    format!("\x1b[0;32m{text}\x1b[0m")
}

/// Quote one argument so it can be pasted back into a POSIX shell
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    let safe = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r#"'"'"'"#))
    }
}

/// Render a full argv as a shell-pasteable line
pub fn quote_command<S: AsRef<OsStr>>(argv: &[S]) -> String {
    argv.iter()
        .map(|arg| quote_arg(&arg.as_ref().to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Echo a command before it runs
pub fn print_command<S: AsRef<OsStr>>(argv: &[S]) {
    println!("{}", quote_command(argv));
}

/// Resolve a program the way a shell would.
///
/// Paths containing a separator are checked directly, bare names are
/// searched in `PATH`. Only executable regular files match.
pub fn which(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Print where the launcher resolves to, for environment diagnostics
pub fn show_launcher(launcher: &Path) {
    let resolved = which(launcher)
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "None".to_string());
    let name = launcher
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| launcher.display().to_string());
    println!("{name} = {resolved}");
}
