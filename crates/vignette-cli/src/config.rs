//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use vignette_domain::{Scenario, ScenarioSet};
use vignette_submit::SubmitConfig;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Submission endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint_url: String,

    /// Default post-completion redirect URL
    #[serde(default = "default_redirect")]
    pub redirect_url: String,

    /// Completion code appended to the redirect URL
    #[serde(default = "default_completion_code")]
    pub completion_code: String,

    /// Directory for the durable local store (defaults to ~/.vignette)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Submission retry and timing settings
    #[serde(default)]
    pub submit: SubmitConfig,

    /// Scenario definitions, in presentation order
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<Scenario>,
}

impl StudyConfig {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".vignette").join("config.toml"))
    }

    /// Load configuration from the default path or create defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from an explicit path or create defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: StudyConfig = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint_url.trim().is_empty() {
            return Err(CliError::Config("endpoint_url must not be empty".into()));
        }
        self.submit.validate().map_err(CliError::Config)?;
        if self.scenarios.is_empty() {
            return Err(CliError::Config("at least one scenario is required".into()));
        }
        Ok(())
    }

    /// The scenario set this configuration defines.
    pub fn scenario_set(&self) -> Result<ScenarioSet> {
        ScenarioSet::new(self.scenarios.clone()).map_err(CliError::Config)
    }

    /// Path of the SQLite store backing queue and backups.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.join("vignette.db")),
            None => {
                let home = dirs::home_dir()
                    .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
                Ok(home.join(".vignette").join("vignette.db"))
            }
        }
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint(),
            redirect_url: default_redirect(),
            completion_code: default_completion_code(),
            data_dir: None,
            submit: SubmitConfig::default(),
            scenarios: default_scenarios(),
        }
    }
}

fn default_endpoint() -> String {
    "https://script.google.com/macros/s/REPLACE_WITH_DEPLOYMENT_ID/exec".to_string()
}

fn default_redirect() -> String {
    "https://app.prolific.com/submissions/complete".to_string()
}

fn default_completion_code() -> String {
    "VIGNETTE-DONE".to_string()
}

/// The built-in scenario set used when none is configured
fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "sepsis-alert".to_string(),
            title: "Sepsis risk alert".to_string(),
            patient_summary: "A 72-year-old admitted from the ED with fever, tachycardia, \
                              and borderline hypotension after a urinary tract infection."
                .to_string(),
            recommendation: "The decision-support system recommends starting the full sepsis \
                             bundle, including broad-spectrum antibiotics, within the hour."
                .to_string(),
            updated_evidence: "A repeat lactate returns at 4.1 mmol/L, up from 2.2 mmol/L on \
                               admission."
                .to_string(),
        },
        Scenario {
            id: "imaging-triage".to_string(),
            title: "Head CT after a minor fall".to_string(),
            patient_summary: "A 44-year-old presents after slipping on ice, with a scalp \
                              contusion, no loss of consciousness, and a normal neurological \
                              exam."
                .to_string(),
            recommendation: "The system classifies the injury as low risk and recommends \
                             against a head CT."
                .to_string(),
            updated_evidence: "The medication history shows the patient takes warfarin daily \
                               for atrial fibrillation."
                .to_string(),
        },
        Scenario {
            id: "discharge-risk".to_string(),
            title: "Early discharge recommendation".to_string(),
            patient_summary: "A 58-year-old recovering from community-acquired pneumonia, \
                              afebrile for 24 hours on oral antibiotics."
                .to_string(),
            recommendation: "The system scores the patient as low risk and recommends \
                             discharge today with outpatient follow-up."
                .to_string(),
            updated_evidence: "The oxygen saturation trend overnight shows three brief dips \
                               below 90% while asleep."
                .to_string(),
        },
    ]
}
