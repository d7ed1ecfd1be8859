//! Entry-URL parsing and completion-redirect construction.

use crate::config::StudyConfig;
use crate::error::Result;
use url::Url;
use vignette_domain::SessionContext;

/// Parse platform identifiers out of an entry URL.
///
/// Recognized query parameters: `PROLIFIC_PID`, `STUDY_ID`, `SESSION_ID`,
/// and `redirect`. Absence of any of them is not an error; the study
/// simply runs without that piece of metadata.
pub fn parse_entry_url(entry_url: &str) -> Result<SessionContext> {
    let url = Url::parse(entry_url)?;
    let mut session = SessionContext::default();

    for (key, value) in url.query_pairs() {
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "PROLIFIC_PID" => session.platform_participant_id = Some(value.into_owned()),
            "STUDY_ID" => session.platform_study_id = Some(value.into_owned()),
            "SESSION_ID" => session.platform_session_id = Some(value.into_owned()),
            "redirect" => session.completion_redirect = Some(value.into_owned()),
            _ => {}
        }
    }

    Ok(session)
}

/// Build the post-completion redirect URL.
///
/// The platform-supplied redirect wins over the configured default; the
/// completion code is appended as the `cc` query parameter.
pub fn completion_url(config: &StudyConfig, session: &SessionContext) -> Result<String> {
    let base = session
        .completion_redirect
        .as_deref()
        .unwrap_or(&config.redirect_url);

    let mut url = Url::parse(base)?;
    if !config.completion_code.is_empty() {
        url.query_pairs_mut().append_pair("cc", &config.completion_code);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_platform_parameters() {
        let session = parse_entry_url(
            "https://study.example.org/?PROLIFIC_PID=p123&STUDY_ID=s456&SESSION_ID=x789",
        )
        .unwrap();

        assert_eq!(session.platform_participant_id.as_deref(), Some("p123"));
        assert_eq!(session.platform_study_id.as_deref(), Some("s456"));
        assert_eq!(session.platform_session_id.as_deref(), Some("x789"));
        assert!(session.completion_redirect.is_none());
    }

    #[test]
    fn test_absent_parameters_are_not_an_error() {
        let session = parse_entry_url("https://study.example.org/").unwrap();
        assert!(session.is_empty());
    }

    #[test]
    fn test_unknown_parameters_are_ignored() {
        let session =
            parse_entry_url("https://study.example.org/?utm_source=mail&PROLIFIC_PID=p1").unwrap();
        assert_eq!(session.platform_participant_id.as_deref(), Some("p1"));
        assert!(session.platform_study_id.is_none());
    }

    #[test]
    fn test_invalid_url_is_an_error() {
        assert!(parse_entry_url("not a url").is_err());
    }

    #[test]
    fn test_completion_url_appends_code_to_default() {
        let config = StudyConfig {
            redirect_url: "https://app.prolific.com/submissions/complete".to_string(),
            completion_code: "ABC123".to_string(),
            ..Default::default()
        };
        let url = completion_url(&config, &SessionContext::default()).unwrap();
        assert_eq!(url, "https://app.prolific.com/submissions/complete?cc=ABC123");
    }

    #[test]
    fn test_platform_redirect_wins_over_default() {
        let config = StudyConfig {
            completion_code: "ABC123".to_string(),
            ..Default::default()
        };
        let session = parse_entry_url(
            "https://study.example.org/?redirect=https%3A%2F%2Fpanel.example.org%2Fdone",
        )
        .unwrap();

        let url = completion_url(&config, &session).unwrap();
        assert_eq!(url, "https://panel.example.org/done?cc=ABC123");
    }
}
