//! Build log sinks.
//!
//! The publisher narrates every decision to a [`BuildLog`]. Lines are plain
//! human-readable text; nothing parses them.

use console::style;

/// Append-only, line-oriented build log
pub trait BuildLog {
    /// Progress or informational line
    fn info(&mut self, line: &str);

    /// Error line
    fn error(&mut self, line: &str);
}

/// Writes the build log to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleLog;

impl BuildLog for ConsoleLog {
    fn info(&mut self, line: &str) {
        println!("{} {}", style("→").yellow(), line);
    }

    fn error(&mut self, line: &str) {
        eprintln!("{} {}", style("ERROR:").red(), line);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

/// Keeps every line in memory, mostly for assertions in tests
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Vec<(LogLevel, String)>,
}

impl MemoryLog {
    pub fn new() -> Self {
        MemoryLog::default()
    }

    pub fn lines(&self) -> &[(LogLevel, String)] {
        &self.lines
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|(level, _)| *level == LogLevel::Error)
            .map(|(_, line)| line.as_str())
    }

    /// True if any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|(_, line)| line.contains(needle))
    }
}

impl BuildLog for MemoryLog {
    fn info(&mut self, line: &str) {
        self.lines.push((LogLevel::Info, line.to_string()));
    }

    fn error(&mut self, line: &str) {
        self.lines.push((LogLevel::Error, line.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_log_keeps_order_and_level() {
        let mut log = MemoryLog::new();
        log.info("Pushing tag v1 to repo origin");
        log.error("Failed to push tag v2 to origin");

        assert_eq!(log.lines().len(), 2);
        assert_eq!(log.lines()[0].0, LogLevel::Info);
        assert!(log.contains("v2 to origin"));
        assert_eq!(log.errors().collect::<Vec<_>>(), vec!["Failed to push tag v2 to origin"]);
    }

    #[test]
    fn test_console_log() {
        // Visual verification test - output goes to stdout/stderr
        let mut log = ConsoleLog;
        log.info("test status");
        log.error("test error");
    }
}
