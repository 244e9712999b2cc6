//! `analyze`: placeholder findings, record, bill, log.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{non_blank, CallerIdentity, OperationRun, OperationStage, Orchestrator};
use crate::entitlements::{authorize, expiration_for, Charge, OperationKind};
use crate::errors::{OperationError, OperationResult};
use crate::models::{
    new_id, ActivityAction, ActivityEntry, ActivityStatus, AnalysisRecord, ProcessStatus,
    Profile, RecordKind, RiskLevel, Vulnerability,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub file_content: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutcome {
    pub success: bool,
    pub analysis_log_id: String,
    pub risk_level: RiskLevel,
    pub vulnerabilities: Vec<Vulnerability>,
    pub suggestions: Vec<String>,
}

impl AnalyzeRequest {
    fn validate(self) -> OperationResult<(String, String)> {
        let content = self
            .file_content
            .ok_or_else(|| OperationError::bad_request("Missing required fields"))?;
        let file_name = non_blank(self.file_name.as_deref())
            .ok_or_else(|| OperationError::bad_request("Missing required fields"))?
            .to_string();
        Ok((content, file_name))
    }
}

impl Orchestrator {
    /// Run the findings generator over a script and record the result.
    pub fn analyze(
        &self,
        caller: Option<&CallerIdentity>,
        request: AnalyzeRequest,
    ) -> OperationResult<AnalyzeOutcome> {
        let mut run = OperationRun::new(OperationKind::Analyze);
        let (content, file_name) = request.validate()?;

        let caller = Self::require_caller(caller)?;
        run.advance(OperationStage::Authorized);

        let profile = self.load_profile(&caller.user_id)?;
        let charge = authorize(&profile, OperationKind::Analyze, None)?;
        run.advance(OperationStage::Validated);

        self.analyze_validated(&mut run, &profile, &file_name, &content, charge)
            .map_err(|err| {
                self.finish_failed(&run, &caller.user_id, ActivityAction::Analyze, &file_name, err)
            })
    }

    fn analyze_validated(
        &self,
        run: &mut OperationRun,
        profile: &Profile,
        file_name: &str,
        content: &str,
        charge: Charge,
    ) -> OperationResult<AnalyzeOutcome> {
        let now = self.now();
        let findings = self.findings.generate(file_name, content);
        let risk_level = findings.risk_level();

        let record = AnalysisRecord {
            id: new_id(),
            user_id: profile.id.clone(),
            file_name: file_name.to_string(),
            risk_level: Some(risk_level),
            vulnerabilities: findings.vulnerabilities,
            suggestions: findings.suggestions,
            credits_used: charge.cost,
            status: ProcessStatus::Completed,
            expiration_date: expiration_for(profile.plan, now),
            created_at: now,
            updated_at: now,
        };
        self.storage.insert_analysis_record(&record)?;
        run.record = Some((RecordKind::Analysis, record.id.clone()));
        run.advance(OperationStage::Persisted);

        self.bill(run, &profile.id, charge)?;
        run.advance(OperationStage::Billed);

        self.log_activity(ActivityEntry::new(
            &profile.id,
            ActivityAction::Analyze,
            file_name,
            ActivityStatus::Completed,
            charge.cost,
            Some(format!("Risk Level: {risk_level}")),
            now,
        ));
        run.advance(OperationStage::Logged);

        info!(
            user_id = %profile.id,
            record_id = %record.id,
            risk = %risk_level,
            findings = record.vulnerabilities.len(),
            cost = charge.cost,
            "script analyzed"
        );
        run.advance(OperationStage::Completed);

        Ok(AnalyzeOutcome {
            success: true,
            analysis_log_id: record.id,
            risk_level,
            vulnerabilities: record.vulnerabilities,
            suggestions: record.suggestions,
        })
    }
}
