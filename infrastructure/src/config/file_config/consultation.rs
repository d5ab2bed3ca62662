//! Project consultation rules from TOML (`[[consultation.rules]]`)

use conductor_domain::{
    ConfigIssue, ConfigIssueCode, ConsultationPolicy, ConsultationRule, PROCESSES_PER_SCHEDULE,
    ScheduleId, Severity,
};
use serde::{Deserialize, Serialize};

/// Raw consultation rule from TOML
///
/// # Example
///
/// ```toml
/// [[consultation.rules]]
/// schedule = 3
/// process = 2          # optional; whole schedule if omitted
/// question = "Apply changes to the working tree?"
/// mandatory = true
/// timeout_secs = 120   # optional
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsultationRule {
    /// Schedule ordinal, 1..=5
    pub schedule: u8,
    /// Process ordinal, 1..=3
    pub process: Option<u8>,
    pub question: String,
    pub mandatory: bool,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsultationConfig {
    pub rules: Vec<FileConsultationRule>,
}

fn constraint(field: String, reason: &str) -> ConfigIssue {
    ConfigIssue {
        severity: Severity::Error,
        message: format!("{}: {}, rule ignored", field, reason),
        code: ConfigIssueCode::InvalidConstraint {
            field,
            reason: reason.to_string(),
        },
    }
}

impl FileConsultationRule {
    fn parse(&self, index: usize) -> Result<ConsultationRule, ConfigIssue> {
        let prefix = format!("consultation.rules[{}]", index);
        let schedule = ScheduleId::try_from(self.schedule)
            .map_err(|_| constraint(format!("{}.schedule", prefix), "must be between 1 and 5"))?;
        if let Some(process) = self.process
            && !(1..=PROCESSES_PER_SCHEDULE).contains(&process)
        {
            return Err(constraint(
                format!("{}.process", prefix),
                "must be between 1 and 3",
            ));
        }
        if self.question.trim().is_empty() {
            return Err(constraint(
                format!("{}.question", prefix),
                "cannot be empty",
            ));
        }
        Ok(ConsultationRule {
            schedule,
            process: self.process,
            question: self.question.clone(),
            mandatory: self.mandatory,
            timeout_secs: self.timeout_secs,
        })
    }
}

impl FileConsultationConfig {
    /// Build the policy from valid rules; invalid ones are reported and skipped.
    pub fn to_policy(&self) -> (ConsultationPolicy, Vec<ConfigIssue>) {
        let mut rules = Vec::new();
        let mut issues = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            match rule.parse(index) {
                Ok(rule) => rules.push(rule),
                Err(issue) => issues.push(issue),
            }
        }
        (ConsultationPolicy::new(rules), issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_domain::Position;

    fn raw(schedule: u8, process: Option<u8>) -> FileConsultationRule {
        FileConsultationRule {
            schedule,
            process,
            question: "Proceed?".to_string(),
            mandatory: true,
            timeout_secs: None,
        }
    }

    #[test]
    fn test_valid_rules_become_policy() {
        let config = FileConsultationConfig {
            rules: vec![raw(3, Some(2)), raw(5, None)],
        };
        let (policy, issues) = config.to_policy();
        assert!(issues.is_empty());
        assert_eq!(policy.rules().len(), 2);
        assert!(policy.is_mandatory(Position::new(ScheduleId::Implement, 2)));
        assert!(!policy.is_mandatory(Position::new(ScheduleId::Implement, 1)));
        assert!(policy.is_mandatory(Position::new(ScheduleId::Deliver, 3)));
    }

    #[test]
    fn test_out_of_range_rules_are_skipped() {
        let config = FileConsultationConfig {
            rules: vec![raw(0, None), raw(6, None), raw(2, Some(4)), raw(2, Some(1))],
        };
        let (policy, issues) = config.to_policy();
        assert_eq!(policy.rules().len(), 1);
        assert_eq!(issues.len(), 3);
        assert!(ConfigIssue::has_errors(&issues));
        assert!(issues[2].message.starts_with("consultation.rules[2].process"));
    }

    #[test]
    fn test_empty_question_is_rejected() {
        let mut rule = raw(1, None);
        rule.question = String::new();
        let (policy, issues) = FileConsultationConfig { rules: vec![rule] }.to_policy();
        assert!(policy.is_empty());
        assert_eq!(issues.len(), 1);
    }
}
