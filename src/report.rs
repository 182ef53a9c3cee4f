//! Rendering of an [`AnalysisReport`] for humans (sectioned text) or
//! machines (JSON). Nothing here influences the analysis.

use crate::authentication::AuthenticationStatus;
use crate::config::{AnalyzerConfig, OutputFormat};
use crate::verdict::{AnalysisReport, Verdict};
use std::fmt::Write;

pub struct ReportFormatter<'a> {
    config: &'a AnalyzerConfig,
}

impl<'a> ReportFormatter<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, report: &AnalysisReport) -> anyhow::Result<String> {
        match self.config.output_format {
            OutputFormat::Text => Ok(self.render_text(report)),
            OutputFormat::Json => render_json(report),
        }
    }

    pub fn render_text(&self, report: &AnalysisReport) -> String {
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out, report);
        out
    }

    fn write_text(&self, out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
        writeln!(out, "=== Email Header Analysis ===")?;

        writeln!(out)?;
        writeln!(out, "[Basic Information]")?;
        writeln!(out, "From: {}", format_values(&report.basic.from))?;
        writeln!(out, "To: {}", format_values(&report.basic.to))?;
        writeln!(out, "Subject: {}", format_values(&report.basic.subject))?;
        writeln!(out, "Date: {}", format_values(&report.basic.date))?;

        let auth = &report.authentication;
        writeln!(out)?;
        writeln!(out, "[Authentication Results]")?;
        writeln!(out, "SPF: {}", self.raw_or_not_found(&auth.spf))?;
        writeln!(
            out,
            "DKIM: {}",
            if auth.dkim.status.is_pass() { "Present" } else { "Not found" }
        )?;
        writeln!(out, "DMARC: {}", self.raw_or_not_found(&auth.dmarc))?;

        writeln!(out)?;
        writeln!(out, "[Routing Information]")?;
        if report.routing.has_routing_info() {
            writeln!(out, "Hop Count: {}", report.routing.hop_count())?;
            for hop in &report.routing.hops {
                writeln!(out)?;
                writeln!(out, "Hop #{}:", hop.index)?;
                if self.config.show_hop_headers {
                    writeln!(out, "{}", self.truncate(&hop.raw))?;
                }
                if let Some(ip) = &hop.ip {
                    writeln!(out, "Detected IP: {}", ip)?;
                }
            }
        } else {
            writeln!(out, "No routing information found")?;
        }

        writeln!(out)?;
        writeln!(out, "[Security Verdict]")?;
        for result in auth.iter() {
            writeln!(
                out,
                "{} Check: {}",
                result.mechanism,
                if result.status.is_pass() { "PASS" } else { "FAIL" }
            )?;
        }

        writeln!(out)?;
        match report.verdict {
            Verdict::Safe => writeln!(out, "Final Verdict: SAFE")?,
            Verdict::Unsafe => {
                writeln!(
                    out,
                    "Final Verdict: UNSAFE - Potential security risks detected"
                )?;
                let failed = report
                    .failed_checks()
                    .iter()
                    .map(|mechanism| mechanism.to_string())
                    .collect::<Vec<_>>();
                writeln!(out, "Failed checks: {}", failed.join(", "))?;
            }
        }

        Ok(())
    }

    fn raw_or_not_found(&self, result: &AuthenticationStatus) -> String {
        match &result.raw {
            Some(raw) => self.truncate(raw),
            None => "Not found".to_string(),
        }
    }

    fn truncate(&self, s: &str) -> String {
        truncate_string(s, self.config.max_header_width)
    }
}

pub fn render_json(report: &AnalysisReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn format_values(values: &[String]) -> String {
    format!("[{}]", values.join(", "))
}

/// Shorten to at most `max_len` characters, marking the cut with `...`.
/// A `max_len` of 0 leaves the string untouched.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if max_len == 0 || s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
