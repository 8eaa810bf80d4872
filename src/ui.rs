use colored::{ColoredString, Colorize};
use declarative::{ScopeStatus, TeardownResult};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Colored label for a scope status
pub fn scope_status(status: ScopeStatus) -> ColoredString {
    match status {
        ScopeStatus::Active => "active".green(),
        ScopeStatus::Destroying => "destroying".yellow(),
        ScopeStatus::Destroyed => "destroyed".dimmed(),
    }
}

/// One-line rendering of a teardown result
pub fn teardown_result(result: &TeardownResult) -> String {
    match result {
        TeardownResult::Destroyed => format!("{} destroyed", "✓".green()),
        TeardownResult::Skipped { reason } => format!("{} skipped ({})", "○".dimmed(), reason),
        TeardownResult::Failed { error } => format!("{} failed: {}", "✗".red(), error),
    }
}

/// Pluralize a noun for counts
pub fn plural(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}s", count, singular)
    }
}
