use colored::*;
use progwall_common::report::{LineStatus, ReportSink};

use crate::terminal::{colors, print};

/// Prints report lines to the terminal, coloured by status.
pub struct TerminalSink;

impl ReportSink for TerminalSink {
    fn emit(&mut self, status: LineStatus, line: &str) {
        let symbol: ColoredString = match status {
            LineStatus::Success => "[+]".bold().color(colors::SUCCESS),
            LineStatus::Skipped => "[=]".color(colors::SKIPPED),
            LineStatus::Failure => "[-]".bold().color(colors::FAILURE),
            LineStatus::Summary => "[#]".bold().color(colors::ACCENT),
        };

        let mut lines = line.lines();
        if let Some(first) = lines.next() {
            print::print(&format!("{} {}", symbol, first.color(colors::TEXT_DEFAULT)));
        }
        for rest in lines {
            print::print(&format!("    {}", rest.color(colors::PATH)));
        }
    }
}
