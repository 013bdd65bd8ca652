//! Heuristic diagnosis of captured service output
//!
//! A diagnosis is a pure function of log text: each rule is evaluated
//! independently against the text and contributes one finding when any of its
//! patterns match. Matching is case-sensitive.

use regex::Regex;
use serde::Serialize;
use std::fmt;

use super::config::RuleConfig;

/// Rule name of the port-conflict detection
pub const PORT_CONFLICT: &str = "port-conflict";
/// Rule name of the credential failure detection
pub const AUTH_FAILURE: &str = "auth-failure";
/// Rule name of the unreachable downstream detection
pub const DOWNSTREAM_UNREACHABLE: &str = "downstream-unreachable";
/// Rule name of the uncaught exception detection
pub const UNCAUGHT_EXCEPTION: &str = "uncaught-exception";

/// Text shown when no rule matched
pub const NO_MATCH_MESSAGE: &str = "no recognizable error pattern";

/// A named set of patterns with the advisory text they imply
#[derive(Debug, Clone)]
pub struct DiagnosisRule {
    name: String,
    message: String,
    patterns: Vec<Regex>,
}

impl DiagnosisRule {
    /// Build a rule from regular expressions
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        patterns: &[&str],
    ) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            message: message.into(),
            patterns,
        })
    }

    /// Build a rule whose patterns are plain substrings
    fn literal(name: &str, message: &str, needles: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            patterns: needles
                .iter()
                .filter_map(|n| Regex::new(&regex::escape(n)).ok())
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether any pattern of the rule occurs in `text`
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// One matched rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: String,
    pub message: String,
}

/// Findings for a piece of log text, in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub findings: Vec<Finding>,
}

impl Diagnosis {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Whether the rule called `rule` matched
    pub fn has(&self, rule: &str) -> bool {
        self.findings.iter().any(|f| f.rule == rule)
    }

    /// Advisory lines for display; never empty
    pub fn messages(&self) -> Vec<String> {
        if self.findings.is_empty() {
            return vec![NO_MATCH_MESSAGE.to_string()];
        }
        self.findings.iter().map(|f| f.message.clone()).collect()
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

/// Ordered rule set; the built-in rules always come first
#[derive(Debug, Clone)]
pub struct DiagnosisRules {
    rules: Vec<DiagnosisRule>,
}

impl Default for DiagnosisRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DiagnosisRules {
    /// The four built-in detections
    pub fn builtin() -> Self {
        let mut port_conflict = DiagnosisRule::literal(
            PORT_CONFLICT,
            "port already occupied by another process",
            &["Address already in use", "Failed to bind to"],
        );
        // Tomcat/Spring phrasing: "Port 8080 was already in use."
        if let Ok(port_in_use) = Regex::new(r"Port \d+ (?:was already )?in use") {
            port_conflict.patterns.insert(0, port_in_use);
        }

        Self {
            rules: vec![
                port_conflict,
                DiagnosisRule::literal(
                    AUTH_FAILURE,
                    "downstream credential/authentication failure",
                    &["Access denied for user", "Access denied", "permission denied"],
                ),
                DiagnosisRule::literal(
                    DOWNSTREAM_UNREACHABLE,
                    "downstream service unreachable (e.g., database down)",
                    &[
                        "Communications link failure",
                        "Could not open connection to the host",
                    ],
                ),
                DiagnosisRule::literal(
                    UNCAUGHT_EXCEPTION,
                    "uncaught application exception; inspect log tail",
                    &["Exception in thread \"main\"", "Caused by:"],
                ),
            ],
        }
    }

    /// Built-in rules followed by `extra`
    pub fn with_extra(extra: &[RuleConfig]) -> Result<Self, regex::Error> {
        let mut rules = Self::builtin();
        for rule in extra {
            let patterns: Vec<&str> = rule.patterns.iter().map(String::as_str).collect();
            rules.push(DiagnosisRule::new(&rule.name, &rule.message, &patterns)?);
        }
        Ok(rules)
    }

    pub fn push(&mut self, rule: DiagnosisRule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against `text`
    pub fn diagnose(&self, text: &str) -> Diagnosis {
        let findings = self
            .rules
            .iter()
            .filter(|rule| rule.matches(text))
            .map(|rule| Finding {
                rule: rule.name.clone(),
                message: rule.message.clone(),
            })
            .collect();
        Diagnosis { findings }
    }
}
