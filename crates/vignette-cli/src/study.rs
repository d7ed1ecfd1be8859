//! Interactive study runner and the flush/probe commands.

use crate::config::StudyConfig;
use crate::entry;
use crate::error::Result;
use colored::Colorize;
use rustyline::DefaultEditor;
use std::collections::BTreeMap;
use vignette_domain::{
    FollowChoice, RecordStore, SessionContext, TrustChange, TrustRating, DEMOGRAPHIC_FIELDS,
    QUEUED_KEY_PREFIX,
};
use vignette_flow::{
    ConsentForm, QuestionnaireInput, ScenarioInput, ScenarioPrompt, Step, StudyFlow, CONSENT_ITEMS,
};
use vignette_store::SqliteStore;
use vignette_submit::{HttpTransport, SubmissionClient, SubmitOutcome};

/// Suggested trust factors shown with the closing questionnaire
const TRUST_FACTOR_SUGGESTIONS: &[&str] = &[
    "accuracy",
    "transparency",
    "evidence",
    "clinical-experience",
    "explanations",
];

fn build_client(config: &StudyConfig) -> Result<SubmissionClient<HttpTransport, SqliteStore>> {
    let transport =
        HttpTransport::with_timeout(config.endpoint_url.as_str(), config.submit.request_timeout());
    let store = SqliteStore::new(config.db_path()?)?;
    Ok(SubmissionClient::new(transport, store, config.scenarios.len())
        .with_config(config.submit.clone()))
}

/// Run the study end to end: consent, demographics, scenarios,
/// questionnaire, submission, completion redirect.
pub async fn run_study(
    config: &StudyConfig,
    session: SessionContext,
    skip_probe: bool,
) -> Result<()> {
    let mut client = build_client(config)?;

    // Anything a previous session left queued gets one delivery attempt
    // before this session starts
    let queued = client.store().keys_with_prefix(QUEUED_KEY_PREFIX)?;
    if !queued.is_empty() {
        println!("{}", "Attempting delivery of previously saved data...".cyan());
        let report = client.flush_queued().await?;
        if report.delivered > 0 {
            println!(
                "{}",
                format!("Delivered {} previously saved submission(s).", report.delivered).green()
            );
        }
        if report.remaining > 0 {
            println!(
                "{}",
                format!("{} submission(s) still queued for a later attempt.", report.remaining)
                    .yellow()
            );
        }
    }

    let scenarios = config.scenario_set()?;
    let mut flow = StudyFlow::new(scenarios, session);
    let mut editor = DefaultEditor::new()?;

    println!();
    println!("{}", "Clinical Decision Support Study".bold());
    println!("You will review clinical scenarios in two stages and rate an");
    println!("automated recommendation each time. There are no right answers.");
    println!();

    loop {
        match flow.step() {
            Step::Consent => {
                let form = collect_consent(&mut editor)?;
                if let Err(e) = flow.record_consent(&form) {
                    println!("{}", e.to_string().red());
                }
            }
            Step::Demographics => {
                let answers = collect_demographics(&mut editor)?;
                if let Err(e) = flow.record_demographics(&answers) {
                    println!("{}", e.to_string().red());
                }
            }
            Step::Scenario { .. } => {
                let prompt = flow.present()?;
                render_scenario(&prompt);
                match read_scenario_input(&mut editor)? {
                    ScenarioAction::Answer(input) => {
                        if let Err(e) = flow.record_scenario_response(input) {
                            println!("{}", e.to_string().red());
                        }
                    }
                    ScenarioAction::Back => {
                        if !flow.retreat_scenario() {
                            println!("{}", "Already at the first scenario.".yellow());
                        }
                    }
                }
            }
            Step::Questionnaire => {
                let input = collect_questionnaire(&mut editor)?;
                if let Err(e) = flow.record_questionnaire(input) {
                    println!("{}", e.to_string().red());
                }
            }
            Step::Complete => break,
        }
    }

    let record = flow.into_record();

    if !skip_probe {
        println!("{}", "Testing connection...".cyan());
        let probe = client.test_connection().await;
        if probe.success {
            println!(
                "{}",
                format!("Endpoint reachable ({} ms).", probe.latency.as_millis()).green()
            );
        } else {
            // The probe is informational only; submission still attempts
            println!(
                "{}",
                format!(
                    "Connection test failed ({}); submitting anyway.",
                    probe.error.as_deref().unwrap_or("no detail")
                )
                .yellow()
            );
        }
    }

    println!("{}", "Submitting data...".cyan());
    match client.submit(&record).await? {
        SubmitOutcome::Delivered { rows_added } => {
            let detail = rows_added
                .map(|n| format!(" ({} rows added)", n))
                .unwrap_or_default();
            println!("{}", format!("Data saved remotely{}.", detail).green());
        }
        SubmitOutcome::Queued => {
            println!(
                "{}",
                "Data saved locally; it will be submitted when the connection is \
                 restored (or run `vignette flush`)."
                    .yellow()
            );
        }
    }

    let redirect = entry::completion_url(config, record.session())?;
    println!();
    println!("{}", "Thank you for participating!".bold().green());
    println!("Return to the study platform to register completion:");
    println!("  {}", redirect.underline());

    Ok(())
}

/// Attempt delivery of everything queued locally.
pub async fn flush(config: &StudyConfig) -> Result<()> {
    let mut client = build_client(config)?;
    let report = client.flush_queued().await?;

    if report.attempted == 0 && report.skipped_malformed == 0 {
        println!("Nothing is queued.");
        return Ok(());
    }

    println!(
        "Attempted {}, delivered {}, still queued {}, skipped {}.",
        report.attempted, report.delivered, report.remaining, report.skipped_malformed
    );
    if report.remaining > 0 {
        println!("{}", "Queued entries will be retried on the next flush.".yellow());
    }
    Ok(())
}

/// Probe the endpoint and report round-trip latency.
pub async fn probe(config: &StudyConfig) -> Result<()> {
    let client = build_client(config)?;
    let probe = client.test_connection().await;

    if probe.success {
        println!(
            "{}",
            format!("Endpoint reachable in {} ms.", probe.latency.as_millis()).green()
        );
    } else {
        let status = probe
            .http_status
            .map(|s| format!(" (HTTP {})", s))
            .unwrap_or_default();
        println!(
            "{}",
            format!(
                "Endpoint unreachable{}: {}",
                status,
                probe.error.as_deref().unwrap_or("no detail")
            )
            .red()
        );
    }
    Ok(())
}

fn ask(editor: &mut DefaultEditor, prompt: &str) -> Result<String> {
    Ok(editor.readline(prompt)?.trim().to_string())
}

fn ask_yes_no(editor: &mut DefaultEditor, prompt: &str) -> Result<bool> {
    loop {
        match ask(editor, prompt)?.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("{}", "Please answer y or n.".yellow()),
        }
    }
}

fn consent_text(item: &str) -> &str {
    match item {
        "voluntary-participation" => "I take part voluntarily and understand the study's purpose",
        "data-use" => "I agree to my anonymized responses being used for research",
        "withdrawal-right" => "I know I can stop at any time without giving a reason",
        "age-confirmation" => "I confirm I am 18 years or older",
        _ => item,
    }
}

fn collect_consent(editor: &mut DefaultEditor) -> Result<ConsentForm> {
    println!("{}", "Consent".bold());
    println!("Please confirm each statement:");

    let mut form = ConsentForm::new();
    for item in CONSENT_ITEMS {
        if ask_yes_no(editor, &format!("  {} (y/n): ", consent_text(item)))? {
            form.acknowledge(*item);
        }
    }
    Ok(form)
}

fn collect_demographics(editor: &mut DefaultEditor) -> Result<BTreeMap<String, String>> {
    println!();
    println!("{}", "About you".bold());

    let mut answers = BTreeMap::new();
    for field in DEMOGRAPHIC_FIELDS {
        let value = ask(editor, &format!("  {}: ", field))?;
        if !value.is_empty() {
            answers.insert(field.to_string(), value);
        }
    }
    Ok(answers)
}

fn render_scenario(prompt: &ScenarioPrompt<'_>) {
    println!();
    println!(
        "{}",
        format!(
            "Scenario {} of {} - {} [{}]",
            prompt.index + 1,
            prompt.total,
            prompt.scenario.title,
            prompt.phase.as_str()
        )
        .bold()
    );
    println!("  Patient: {}", prompt.scenario.patient_summary);
    println!("  Recommendation: {}", prompt.scenario.recommendation);
    if let Some(evidence) = prompt.evidence {
        println!("  {} {}", "New evidence:".bold(), evidence);
    }
}

enum ScenarioAction {
    Answer(ScenarioInput),
    Back,
}

fn read_scenario_input(editor: &mut DefaultEditor) -> Result<ScenarioAction> {
    let rating = loop {
        let raw = ask(
            editor,
            &format!("  Trust rating 0-100 [{}]: ", TrustRating::MIDPOINT),
        )?;
        if raw.is_empty() {
            break TrustRating::default();
        }
        match raw.parse::<u8>().map_err(|e| e.to_string()).and_then(TrustRating::new) {
            Ok(rating) => break rating,
            Err(_) => println!("{}", "Enter a whole number between 0 and 100.".yellow()),
        }
    };

    let choice = loop {
        let raw = ask(
            editor,
            "  Would you follow this recommendation? (f)ollow / (r)eject / (u)nsure, (b)ack: ",
        )?;
        match raw.to_lowercase().as_str() {
            "b" | "back" => return Ok(ScenarioAction::Back),
            "f" => break Some(FollowChoice::Follow),
            "r" => break Some(FollowChoice::Reject),
            "u" => break Some(FollowChoice::Unsure),
            other => match FollowChoice::parse(other) {
                Some(choice) => break Some(choice),
                None => println!("{}", "Please answer f, r, u, or b.".yellow()),
            },
        }
    };

    let rationale = ask(editor, "  Briefly, why? (optional): ")?;

    Ok(ScenarioAction::Answer(ScenarioInput {
        rating,
        choice,
        rationale: if rationale.is_empty() { None } else { Some(rationale) },
    }))
}

fn collect_questionnaire(editor: &mut DefaultEditor) -> Result<QuestionnaireInput> {
    println!();
    println!("{}", "Closing questions".bold());

    let trust_change = loop {
        let raw = ask(
            editor,
            "  Over the study, did your trust (i)ncrease, (d)ecrease, or stay (u)nchanged?: ",
        )?;
        match raw.to_lowercase().as_str() {
            "i" => break Some(TrustChange::Increased),
            "d" => break Some(TrustChange::Decreased),
            "u" => break Some(TrustChange::Unchanged),
            "" => break None, // Left unanswered; validation reports it
            other => match TrustChange::parse(other) {
                Some(tc) => break Some(tc),
                None => println!("{}", "Please answer i, d, or u.".yellow()),
            },
        }
    };

    println!(
        "  Which factors influenced your trust? e.g. {}",
        TRUST_FACTOR_SUGGESTIONS.join(", ")
    );
    let factors: Vec<String> = ask(editor, "  Factors (comma-separated): ")?
        .split(',')
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();

    let ai_opinion = ask(editor, "  Your opinion on AI in healthcare: ")?;
    let comments = ask(editor, "  Any other comments? (optional): ")?;

    Ok(QuestionnaireInput {
        trust_change,
        trust_factors: factors,
        ai_opinion,
        comments: if comments.is_empty() { None } else { Some(comments) },
    })
}
