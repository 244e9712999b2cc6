//! Analysis findings behind a pluggable generator.

use rand::Rng;

use crate::models::{RiskLevel, Severity, Vulnerability};

/// Output of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Findings {
    pub vulnerabilities: Vec<Vulnerability>,
    pub suggestions: Vec<String>,
}

impl Findings {
    /// More than two findings is high, any finding is medium, none is low.
    pub fn risk_level(&self) -> RiskLevel {
        match self.vulnerabilities.len() {
            0 => RiskLevel::Low,
            1 | 2 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

/// Produces findings for a script. Implementations must be stateless per call.
pub trait FindingsGenerator: Send + Sync {
    fn generate(&self, file_name: &str, content: &str) -> Findings;
}

/// Placeholder generator. Ignores the script and reports two canned
/// findings at random line numbers in `0..100`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderFindings;

impl FindingsGenerator for PlaceholderFindings {
    fn generate(&self, _file_name: &str, _content: &str) -> Findings {
        let mut rng = rand::thread_rng();
        Findings {
            vulnerabilities: vec![
                Vulnerability {
                    kind: "SQL Injection".to_string(),
                    severity: Severity::High,
                    line: rng.gen_range(0..100),
                    description: "Potential SQL injection vulnerability detected".to_string(),
                },
                Vulnerability {
                    kind: "Hardcoded Credentials".to_string(),
                    severity: Severity::Medium,
                    line: rng.gen_range(0..100),
                    description: "Hardcoded credentials found in script".to_string(),
                },
            ],
            suggestions: vec![
                "Use parameterized queries to prevent SQL injection".to_string(),
                "Store credentials in environment variables".to_string(),
                "Add input validation for user data".to_string(),
                "Implement rate limiting".to_string(),
            ],
        }
    }
}
