use owo_colors::OwoColorize;

/// Terminal printer shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&self, line: &str) {
        println!("{line}");
    }

    pub fn section(&self, title: &str) {
        println!();
        println!("{}", title.bold().bright_cyan());
        println!("{}", "─".repeat(title.chars().count()).dimmed());
    }

    pub fn info(&self, label: &str, value: &str) {
        println!("{} {}", label.bright_blue(), value);
    }

    pub fn kv(&self, key: &str, value: &str) {
        println!("{}: {}", key.dimmed(), value);
    }

    pub fn list_item(&self, item: &str) {
        println!("  {} {}", "•".dimmed(), item);
    }

    pub fn status(&self, message: &str) {
        println!("{}", message.dimmed());
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".bright_green(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message.yellow());
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".bright_red(), message.bright_red());
    }
}
