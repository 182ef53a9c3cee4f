//! Verdict Engine
//!
//! Ties the authentication and routing analyses together into a single
//! immutable [`AnalysisReport`].

use crate::authentication::{AuthStatus, AuthenticationAnalyzer, AuthenticationResults, Mechanism};
use crate::message::ParsedMessage;
use crate::routing::{analyze_message_routing, RoutingInfo};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Safe,
    Unsafe,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Safe => write!(f, "SAFE"),
            Verdict::Unsafe => write!(f, "UNSAFE"),
        }
    }
}

/// Safe only when every mechanism passed. Absent counts the same as Fail,
/// so mail without DMARC results is always Unsafe.
pub fn decide_verdict(spf: AuthStatus, dkim: AuthStatus, dmarc: AuthStatus) -> Verdict {
    if spf.is_pass() && dkim.is_pass() && dmarc.is_pass() {
        Verdict::Safe
    } else {
        Verdict::Unsafe
    }
}

/// Raw values of the informational headers, empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub subject: Vec<String>,
    pub date: Vec<String>,
}

impl BasicInfo {
    pub fn from_message(message: &ParsedMessage) -> Self {
        let collect = |name: &str| {
            message
                .get_all(name)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };

        Self {
            from: collect("From"),
            to: collect("To"),
            subject: collect("Subject"),
            date: collect("Date"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub basic: BasicInfo,
    pub authentication: AuthenticationResults,
    pub routing: RoutingInfo,
    pub verdict: Verdict,
}

impl AnalysisReport {
    pub fn is_safe(&self) -> bool {
        self.verdict == Verdict::Safe
    }

    /// Mechanisms that did not pass, whether failed or absent.
    pub fn failed_checks(&self) -> Vec<Mechanism> {
        self.authentication
            .iter()
            .filter(|result| !result.status.is_pass())
            .map(|result| result.mechanism)
            .collect()
    }
}

pub struct EmailAnalyzer {
    authentication: AuthenticationAnalyzer,
}

impl EmailAnalyzer {
    pub fn new() -> Self {
        Self::with_authentication(AuthenticationAnalyzer::new())
    }

    pub fn with_authentication(authentication: AuthenticationAnalyzer) -> Self {
        Self { authentication }
    }

    /// Single pass over one message. Never fails: missing headers flow
    /// through as `Absent` and an empty `Received` trail as zero hops.
    pub fn analyze(&self, message: &ParsedMessage) -> AnalysisReport {
        let basic = BasicInfo::from_message(message);
        let authentication = self.authentication.analyze_authentication(message);
        let routing = analyze_message_routing(message);

        let verdict = decide_verdict(
            authentication.spf.status,
            authentication.dkim.status,
            authentication.dmarc.status,
        );

        log::debug!(
            "Verdict {} (SPF {}, DKIM {}, DMARC {}, {} hops)",
            verdict,
            authentication.spf.status,
            authentication.dkim.status,
            authentication.dmarc.status,
            routing.hop_count()
        );

        AnalysisReport {
            basic,
            authentication,
            routing,
            verdict,
        }
    }
}

impl Default for EmailAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze with the default heuristic classifier.
pub fn analyze(message: &ParsedMessage) -> AnalysisReport {
    EmailAnalyzer::new().analyze(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_truth_table() {
        let statuses = [AuthStatus::Pass, AuthStatus::Fail, AuthStatus::Absent];

        for spf in statuses {
            for dkim in statuses {
                for dmarc in statuses {
                    let expected = if spf == AuthStatus::Pass
                        && dkim == AuthStatus::Pass
                        && dmarc == AuthStatus::Pass
                    {
                        Verdict::Safe
                    } else {
                        Verdict::Unsafe
                    };
                    assert_eq!(decide_verdict(spf, dkim, dmarc), expected);
                }
            }
        }
    }

    #[test]
    fn test_absent_dmarc_is_unsafe() {
        assert_eq!(
            decide_verdict(AuthStatus::Pass, AuthStatus::Pass, AuthStatus::Absent),
            Verdict::Unsafe
        );
    }

    #[test]
    fn test_all_passing_message_is_safe() {
        let raw = b"From: Alice <alice@example.com>\r\n\
To: bob@example.net\r\n\
Subject: Quarterly numbers\r\n\
Date: Mon, 5 Oct 2026 10:00:00 +0000\r\n\
Received: from mail.example.com (10.0.0.5) by mx.example.net with ESMTPS\r\n\
Received: from localhost by mail.example.com with LMTP\r\n\
Received-SPF: pass (mx.example.net: domain of alice@example.com designates 10.0.0.5)\r\n\
DKIM-Signature: v=1; a=rsa-sha256; d=example.com; s=s1; b=abc\r\n\
Authentication-Results: mx.example.net; dmarc=pass header.from=example.com\r\n\
\r\n\
Hello\r\n";
        let message = ParsedMessage::parse(raw).unwrap();
        let report = analyze(&message);

        assert_eq!(report.authentication.spf.status, AuthStatus::Pass);
        assert_eq!(report.authentication.dkim.status, AuthStatus::Pass);
        assert_eq!(report.authentication.dmarc.status, AuthStatus::Pass);
        assert_eq!(report.verdict, Verdict::Safe);
        assert!(report.is_safe());
        assert!(report.failed_checks().is_empty());
        assert_eq!(report.routing.hop_count(), 2);
        assert_eq!(report.routing.hops[0].ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(report.routing.hops[1].ip, None);
        assert_eq!(report.basic.subject, vec!["Quarterly numbers".to_string()]);
        assert_eq!(report.basic.to, vec!["bob@example.net".to_string()]);
    }

    #[test]
    fn test_unauthenticated_message_is_unsafe() {
        let raw = b"From: spoof@example.com\r\n\
Authentication-Results: mx.example.net; dmarc=fail\r\n\
\r\n\
Hi\r\n";
        let message = ParsedMessage::parse(raw).unwrap();
        let report = analyze(&message);

        assert_eq!(report.authentication.spf.status, AuthStatus::Absent);
        assert_eq!(report.authentication.dkim.status, AuthStatus::Absent);
        assert_eq!(report.authentication.dmarc.status, AuthStatus::Fail);
        assert_eq!(report.verdict, Verdict::Unsafe);
        assert_eq!(
            report.failed_checks(),
            vec![Mechanism::Spf, Mechanism::Dkim, Mechanism::Dmarc]
        );
        assert!(!report.routing.has_routing_info());
    }

    #[test]
    fn test_encoded_word_cannot_forge_dmarc_pass() {
        let raw = b"Received-SPF: pass\r\n\
DKIM-Signature: v=1; d=example.com\r\n\
Authentication-Results: mx; =?us-ascii?q?dmarc=3Dpass?=\r\n\
Received: from a =?utf-8?b?MTAuMC4wLjU=?= by b\r\n\
\r\n";
        let report = analyze(&ParsedMessage::parse(raw).unwrap());

        assert_eq!(report.authentication.dmarc.status, AuthStatus::Fail);
        assert_eq!(
            report.authentication.dmarc.raw.as_deref(),
            Some("mx; =?us-ascii?q?dmarc=3Dpass?=")
        );
        assert_eq!(report.verdict, Verdict::Unsafe);
        assert_eq!(report.routing.hops[0].ip, None);
    }

    #[test]
    fn test_empty_message_still_produces_report() {
        let report = analyze(&ParsedMessage::default());

        assert_eq!(report.verdict, Verdict::Unsafe);
        assert_eq!(report.routing.hop_count(), 0);
        assert!(report.basic.from.is_empty());
        assert!(report.basic.date.is_empty());
    }

    #[test]
    fn test_basic_info_keeps_every_value() {
        let message = ParsedMessage::from_headers(vec![
            ("To", "a@example.com"),
            ("to", "b@example.com"),
        ]);
        let basic = BasicInfo::from_message(&message);

        assert_eq!(basic.to, vec!["a@example.com", "b@example.com"]);
        assert!(basic.subject.is_empty());
    }
}
