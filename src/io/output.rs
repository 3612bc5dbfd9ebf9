use crate::core::Trend;
use crate::formatting::{format_pattern_summary, format_risk_summary, format_statistics_summary};
use crate::pipeline::PulseReport;
use crate::risk::{RiskAssessment, RiskLevel};
use colored::*;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &PulseReport) -> anyhow::Result<()>;

    fn write_risk(&mut self, risk: &RiskAssessment) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &PulseReport) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_risk(&mut self, risk: &RiskAssessment) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, risk)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Human-readable report. Coloring follows the global `colored` switch.
pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_header(&mut self, report: &PulseReport) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "Pulse Report".bold().blue())?;
        writeln!(self.writer, "{}", "============".blue())?;

        match (report.window.start, report.window.end) {
            (Some(start), Some(end)) => writeln!(
                self.writer,
                "{} of {} entries analyzed ({} to {})",
                report.window.entries, report.entry_count, start, end
            )?,
            _ => writeln!(self.writer, "No entries to analyze")?,
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_statistics(&mut self, report: &PulseReport) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "Statistics".bold())?;
        for summary in report.statistics.values() {
            for line in format_statistics_summary(summary).lines() {
                let line = match summary.trend {
                    Trend::Worsening => line.red(),
                    Trend::Improving => line.green(),
                    Trend::Stable => line.normal(),
                };
                writeln!(self.writer, "  {}", line)?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_patterns(&mut self, report: &PulseReport) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "Patterns".bold())?;
        for line in format_pattern_summary(&report.patterns).lines() {
            writeln!(self.writer, "  {}", line)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &PulseReport) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_statistics(report)?;
        self.write_patterns(report)?;
        self.write_risk(&report.risk)
    }

    fn write_risk(&mut self, risk: &RiskAssessment) -> anyhow::Result<()> {
        let summary = format_risk_summary(risk);
        let mut lines = summary.lines();

        if let Some(head) = lines.next() {
            let head = match risk.level {
                RiskLevel::High => head.red().bold(),
                RiskLevel::Moderate => head.yellow().bold(),
                RiskLevel::Low => head.green().bold(),
            };
            writeln!(self.writer, "{}", head)?;
        }
        for line in lines {
            writeln!(self.writer, "{}", line)?;
        }
        Ok(())
    }
}

pub fn create_writer<'a, W: Write + 'a>(format: OutputFormat, writer: W) -> Box<dyn OutputWriter + 'a> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PulsemapConfig;
    use crate::core::PulseEntry;
    use crate::pipeline::analyze_entries;
    use chrono::NaiveDate;

    fn report() -> PulseReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let entries: Vec<PulseEntry> = (0..8)
            .map(|i| {
                PulseEntry::new(start + chrono::Days::new(i))
                    .with_rest("Fragmented")
                    .with_climate(i as i32)
            })
            .collect();
        analyze_entries(&entries, &PulsemapConfig::default())
    }

    #[test]
    fn test_json_writer_round_trips() {
        let report = report();
        let mut buffer = Vec::new();
        JsonWriter::new(&mut buffer).write_report(&report).unwrap();

        let decoded: PulseReport = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(decoded.entry_count, report.entry_count);
        assert_eq!(decoded.risk, report.risk);
    }

    #[test]
    fn test_terminal_writer_sections() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        create_writer(OutputFormat::Terminal, &mut buffer)
            .write_report(&report())
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("Pulse Report\n"));
        assert!(text.contains("8 of 8 entries analyzed (2024-01-01 to 2024-01-08)"));
        assert!(text.contains("  climate (hot-flash intensity): mean 3.50 over 8 entries, worsening"));
        assert!(text.contains("\n    median "));
        assert!(text.contains("/day"));
        assert!(text.contains("Risk level: LOW"));
    }
}
