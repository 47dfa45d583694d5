//! Result rendering for every output format

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Display;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output (pretty-printed)
    Json,
    /// JSON output (compact)
    JsonCompact,
    /// CSV output
    Csv,
}

/// A command result that can be printed in any [`OutputFormat`]
pub trait Report: Serialize {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()>;

    fn csv_header(&self) -> &'static [&'static str];

    fn csv_records(&self) -> Vec<Vec<String>>;
}

/// Print a report to stdout
pub fn emit<R: Report>(report: &R, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(report, format, &mut out)
}

pub fn write_report<R: Report>(report: &R, format: OutputFormat, out: &mut dyn Write) -> io::Result<()> {
    match format {
        OutputFormat::Human => report.write_human(out),
        OutputFormat::Json => write_json(report, true, out),
        OutputFormat::JsonCompact => write_json(report, false, out),
        OutputFormat::Csv => write_csv(report, out),
    }
}

fn write_json<T: Serialize>(value: &T, pretty: bool, out: &mut dyn Write) -> io::Result<()> {
    if pretty {
        writeln!(out, "{}", serde_json::to_string_pretty(value)?)
    } else {
        writeln!(out, "{}", serde_json::to_string(value)?)
    }
}

fn write_csv<R: Report>(report: &R, out: &mut dyn Write) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(report.csv_header())?;
    for record in report.csv_records() {
        wtr.write_record(&record)?;
    }
    wtr.flush()
}

/// Section heading used by the human renderers
pub fn heading(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title.bold().cyan())?;
    writeln!(out, "{}", "─".repeat(50).dimmed())
}

/// One `label: value` line
pub fn field(out: &mut dyn Write, label: &str, value: impl Display) -> io::Result<()> {
    writeln!(out, "{:>15}: {}", label.bold(), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    impl Report for Sample {
        fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
            field(out, "Name", &self.name)?;
            field(out, "Count", self.count)
        }

        fn csv_header(&self) -> &'static [&'static str] {
            &["name", "count"]
        }

        fn csv_records(&self) -> Vec<Vec<String>> {
            vec![vec![self.name.clone(), self.count.to_string()]]
        }
    }

    fn render(format: OutputFormat) -> String {
        let sample = Sample {
            name: "core,sw1".to_string(),
            count: 3,
        };
        let mut buf = Vec::new();
        write_report(&sample, format, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_json_output() {
        let compact = render(OutputFormat::JsonCompact);
        assert_eq!(compact, "{\"name\":\"core,sw1\",\"count\":3}\n");

        let pretty = render(OutputFormat::Json);
        assert!(pretty.contains("\n  \"count\": 3"));
    }

    #[test]
    fn test_csv_output_quotes_fields() {
        assert_eq!(render(OutputFormat::Csv), "name,count\n\"core,sw1\",3\n");
    }

    #[test]
    fn test_human_output() {
        let human = render(OutputFormat::Human);
        assert!(human.contains("core,sw1"));
        assert!(human.contains("Count"));
        assert_eq!(human.lines().count(), 2);
    }
}
