//! Terminal reporter with colored output

use super::AssetEntry;
use crate::classify::AssetKind;
use colored::Colorize;
use std::collections::HashMap;

/// Unused assets grouped by kind, optionally followed by the used ones
pub struct TerminalReporter {
    show_used: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { show_used: false }
    }

    pub fn with_used_assets(mut self, show: bool) -> Self {
        self.show_used = show;
        self
    }

    pub fn report(&self, entries: &[AssetEntry]) {
        let unused: Vec<&AssetEntry> = entries.iter().filter(|e| !e.reachable).collect();

        if unused.is_empty() {
            println!("{}", "No unused assets found!".green().bold());
        } else {
            self.print_unused(&unused);
        }

        if self.show_used {
            self.print_used(entries);
        }

        self.print_summary(entries.len(), unused.len());
    }

    fn print_unused(&self, unused: &[&AssetEntry]) {
        let mut by_kind: HashMap<AssetKind, Vec<&AssetEntry>> = HashMap::new();
        for entry in unused {
            by_kind.entry(entry.kind).or_default().push(entry);
        }

        println!();
        println!(
            "Found {} unused asset(s):",
            unused.len().to_string().red().bold()
        );
        println!();

        let mut kinds: Vec<_> = by_kind.keys().copied().collect();
        kinds.sort_by_key(|kind| kind.display_name());

        for kind in kinds {
            let group = &by_kind[&kind];
            println!(
                "{} {}",
                kind.display_name().cyan().bold(),
                format!("({})", group.len()).dimmed()
            );

            let mut sorted: Vec<_> = group.iter().collect();
            sorted.sort_by(|a, b| a.path.cmp(&b.path));
            for entry in sorted {
                println!("  {}", entry.path.display());
            }
            println!();
        }
    }

    fn print_used(&self, entries: &[AssetEntry]) {
        println!("{}", "In use:".green().bold());
        for entry in entries.iter().filter(|e| e.reachable) {
            println!("  {}", entry.path.display());
            for source in &entry.referenced_by {
                println!("    {} {}", "referenced in".dimmed(), source.dimmed());
            }
        }
        println!();
    }

    fn print_summary(&self, total: usize, unused: usize) {
        let used = total - unused;
        println!(
            "{} {} asset(s) scanned, {} in use, {} unused",
            "Summary:".bold(),
            total,
            used.to_string().green(),
            if unused == 0 {
                unused.to_string().green().to_string()
            } else {
                unused.to_string().red().to_string()
            }
        );
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
