//! Terminal output for `aidctl`

use std::fmt::Display;

use colored::Colorize;
use euicc_aid::AidEntry;

/// Bold, underlined heading printed above a group of catalog lines
pub struct SectionTitle(pub &'static str);

impl Display for SectionTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\n{}", self.0.bold().underline())
    }
}

/// Heading for a block of command output
pub fn section_title(title: &'static str) -> SectionTitle {
    SectionTitle(title)
}

/// Line reporting that the card accepted an AID or a file was written
pub fn success(message: &str) -> String {
    format!("✅ {}", message.green().bold())
}

/// Line reporting a rejected AID or a catalog search of the card that found nothing
pub fn warning(message: &str) -> String {
    format!("⚠️  {}", message.yellow().bold())
}

/// Hint line, such as how to apply a working AID
pub fn info(message: &str) -> String {
    format!("ℹ️  {}", message.blue())
}

/// Format a titled block of aligned key-value rows
pub fn key_value_box(title: &str, rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut block = title.bold().underline().to_string();

    for (key, value) in rows {
        let label = format!("{key}:");
        block.push_str(&format!("\n  {:<pad$}  {value}", label.bold(), pad = width + 1));
    }

    block
}

/// Format one catalog entry, highlighting ISD-R identifiers
pub fn entry_line(entry: &AidEntry) -> String {
    let id = if entry.is_issuer_root() {
        entry.id().cyan().bold()
    } else {
        entry.id().normal()
    };
    format!("  {id}  {}", entry.description())
}

/// Print entries, or a note when there are none
pub fn print_entries(entries: &[AidEntry]) {
    if entries.is_empty() {
        println!("{}", info("No matching entries"));
        return;
    }
    for entry in entries {
        println!("{}", entry_line(entry));
    }
}
