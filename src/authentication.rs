//! Authentication Analyzer
//!
//! Classifies SPF, DKIM and DMARC from the headers a receiving server left on
//! the message. Nothing here verifies anything cryptographically or consults
//! DNS: the classification is a substring heuristic over header text and must
//! be treated as a weak signal.

use crate::message::ParsedMessage;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SPF_HEADER: &str = "Received-SPF";
pub const DKIM_HEADER: &str = "DKIM-Signature";
pub const DMARC_HEADER: &str = "Authentication-Results";

// Matching is case-sensitive.
const SPF_PASS_TOKEN: &str = "pass";
const DMARC_PASS_TOKEN: &str = "dmarc=pass";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    Pass,
    Fail,
    Absent,
}

impl AuthStatus {
    pub fn is_pass(self) -> bool {
        matches!(self, AuthStatus::Pass)
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::Pass => write!(f, "PASS"),
            AuthStatus::Fail => write!(f, "FAIL"),
            AuthStatus::Absent => write!(f, "ABSENT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mechanism {
    Spf,
    Dkim,
    Dmarc,
}

impl Mechanism {
    /// Header consulted for this mechanism.
    pub fn header_name(self) -> &'static str {
        match self {
            Mechanism::Spf => SPF_HEADER,
            Mechanism::Dkim => DKIM_HEADER,
            Mechanism::Dmarc => DMARC_HEADER,
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mechanism::Spf => write!(f, "SPF"),
            Mechanism::Dkim => write!(f, "DKIM"),
            Mechanism::Dmarc => write!(f, "DMARC"),
        }
    }
}

/// Classification of one mechanism plus the header value it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationStatus {
    pub mechanism: Mechanism,
    pub status: AuthStatus,
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationResults {
    pub spf: AuthenticationStatus,
    pub dkim: AuthenticationStatus,
    pub dmarc: AuthenticationStatus,
}

impl AuthenticationResults {
    pub fn iter(&self) -> impl Iterator<Item = &AuthenticationStatus> {
        [&self.spf, &self.dkim, &self.dmarc].into_iter()
    }

    pub fn all_pass(&self) -> bool {
        self.iter().all(|result| result.status.is_pass())
    }

    pub fn passing_count(&self) -> usize {
        self.iter().filter(|result| result.status.is_pass()).count()
    }
}

/// `Received-SPF` classification: absent, or Pass when the value contains
/// `pass` (case-sensitive), otherwise Fail. Note that values such as
/// `softfail` do not contain `pass` and so classify as Fail.
pub fn classify_spf(value: Option<&str>) -> AuthStatus {
    match value {
        None => AuthStatus::Absent,
        Some(value) if value.contains(SPF_PASS_TOKEN) => AuthStatus::Pass,
        Some(_) => AuthStatus::Fail,
    }
}

/// `DKIM-Signature` classification by presence only.
///
/// The signature is never validated, so a forged or broken signature still
/// classifies as Pass. An empty (or whitespace-only) value counts as absent.
pub fn classify_dkim(value: Option<&str>) -> AuthStatus {
    match value {
        Some(value) if !value.trim().is_empty() => AuthStatus::Pass,
        _ => AuthStatus::Absent,
    }
}

/// `Authentication-Results` classification: Pass when the value contains
/// `dmarc=pass` (case-sensitive), Fail when present without it.
pub fn classify_dmarc(value: Option<&str>) -> AuthStatus {
    match value {
        None => AuthStatus::Absent,
        Some(value) if value.contains(DMARC_PASS_TOKEN) => AuthStatus::Pass,
        Some(_) => AuthStatus::Fail,
    }
}

/// Policy used to turn header values into statuses.
pub trait AuthClassifier: Send + Sync {
    fn classify(&self, mechanism: Mechanism, value: Option<&str>) -> AuthStatus;
    fn name(&self) -> &str;
}

/// Substring heuristics over the first header value of each mechanism.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

impl AuthClassifier for HeuristicClassifier {
    fn classify(&self, mechanism: Mechanism, value: Option<&str>) -> AuthStatus {
        match mechanism {
            Mechanism::Spf => classify_spf(value),
            Mechanism::Dkim => classify_dkim(value),
            Mechanism::Dmarc => classify_dmarc(value),
        }
    }

    fn name(&self) -> &str {
        "HeuristicClassifier"
    }
}

pub struct AuthenticationAnalyzer {
    classifier: Box<dyn AuthClassifier>,
}

impl AuthenticationAnalyzer {
    pub fn new() -> Self {
        Self::with_classifier(Box::new(HeuristicClassifier))
    }

    pub fn with_classifier(classifier: Box<dyn AuthClassifier>) -> Self {
        Self { classifier }
    }

    /// Classify all three mechanisms. Only the first occurrence of each
    /// header (in document order) is consulted.
    pub fn analyze_authentication(&self, message: &ParsedMessage) -> AuthenticationResults {
        AuthenticationResults {
            spf: self.analyze_mechanism(message, Mechanism::Spf),
            dkim: self.analyze_mechanism(message, Mechanism::Dkim),
            dmarc: self.analyze_mechanism(message, Mechanism::Dmarc),
        }
    }

    fn analyze_mechanism(&self, message: &ParsedMessage, mechanism: Mechanism) -> AuthenticationStatus {
        let raw = message.get_first(mechanism.header_name());
        let status = self.classifier.classify(mechanism, raw);

        log::debug!(
            "{}: {} ({}, header {})",
            mechanism,
            status,
            self.classifier.name(),
            if raw.is_some() { "present" } else { "missing" }
        );

        AuthenticationStatus {
            mechanism,
            status,
            raw: raw.map(str::to_string),
        }
    }
}

impl Default for AuthenticationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spf_classification() {
        assert_eq!(classify_spf(None), AuthStatus::Absent);
        assert_eq!(
            classify_spf(Some("pass (example.com: domain of a@example.com designates 1.2.3.4)")),
            AuthStatus::Pass
        );
        assert_eq!(classify_spf(Some("fail (sender not permitted)")), AuthStatus::Fail);
        assert_eq!(classify_spf(Some("softfail")), AuthStatus::Fail);
        assert_eq!(classify_spf(Some("")), AuthStatus::Fail);
    }

    #[test]
    fn test_spf_is_case_sensitive() {
        assert_eq!(classify_spf(Some("Pass")), AuthStatus::Fail);
        assert_eq!(classify_spf(Some("PASS")), AuthStatus::Fail);
    }

    #[test]
    fn test_dkim_presence_only() {
        assert_eq!(classify_dkim(None), AuthStatus::Absent);
        assert_eq!(classify_dkim(Some("")), AuthStatus::Absent);
        assert_eq!(classify_dkim(Some("   ")), AuthStatus::Absent);
        assert_eq!(
            classify_dkim(Some("v=1; a=rsa-sha256; d=example.com; s=sel; b=garbage")),
            AuthStatus::Pass
        );
    }

    #[test]
    fn test_dmarc_classification() {
        assert_eq!(classify_dmarc(None), AuthStatus::Absent);
        assert_eq!(
            classify_dmarc(Some("mx.example.com; spf=pass; dkim=pass; dmarc=pass")),
            AuthStatus::Pass
        );
        assert_eq!(classify_dmarc(Some("mx.example.com; dmarc=fail")), AuthStatus::Fail);
        assert_eq!(classify_dmarc(Some("mx.example.com; spf=pass")), AuthStatus::Fail);
        assert_eq!(classify_dmarc(Some("mx.example.com; DMARC=PASS")), AuthStatus::Fail);
    }

    #[test]
    fn test_only_first_header_is_consulted() {
        let message = ParsedMessage::from_headers(vec![
            ("Authentication-Results", "mx.example.com; dmarc=fail"),
            ("Authentication-Results", "relay.example.com; dmarc=pass"),
            ("Received-SPF", "fail"),
            ("Received-SPF", "pass"),
        ]);
        let results = AuthenticationAnalyzer::new().analyze_authentication(&message);

        assert_eq!(results.dmarc.status, AuthStatus::Fail);
        assert_eq!(results.dmarc.raw.as_deref(), Some("mx.example.com; dmarc=fail"));
        assert_eq!(results.spf.status, AuthStatus::Fail);
    }

    #[test]
    fn test_analyze_authentication_records_raw_values() {
        let message = ParsedMessage::from_headers(vec![
            ("received-spf", "pass"),
            ("dkim-signature", "v=1; d=example.com"),
        ]);
        let results = AuthenticationAnalyzer::default().analyze_authentication(&message);

        assert_eq!(results.spf.mechanism, Mechanism::Spf);
        assert_eq!(results.spf.raw.as_deref(), Some("pass"));
        assert_eq!(results.dkim.status, AuthStatus::Pass);
        assert_eq!(results.dmarc.status, AuthStatus::Absent);
        assert_eq!(results.dmarc.raw, None);
        assert_eq!(results.passing_count(), 2);
        assert!(!results.all_pass());
    }

    struct AlwaysPass;

    impl AuthClassifier for AlwaysPass {
        fn classify(&self, _mechanism: Mechanism, _value: Option<&str>) -> AuthStatus {
            AuthStatus::Pass
        }

        fn name(&self) -> &str {
            "AlwaysPass"
        }
    }

    #[test]
    fn test_classifier_is_swappable() {
        let analyzer = AuthenticationAnalyzer::with_classifier(Box::new(AlwaysPass));
        let results = analyzer.analyze_authentication(&ParsedMessage::default());

        assert!(results.all_pass());
    }
}
