use regex::Regex;
use std::sync::LazyLock;

/// Text between `ANALYSIS:` and the next `DECISION:` (or the end).
static ANALYSIS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)ANALYSIS:\s*(.*?)(?:DECISION:|\z)").unwrap());

/// `DECISION: STAR|SKIP: reason`, reason running to end of line.
static DECISION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DECISION:\s*(STAR|SKIP):\s*(.*)").unwrap());

const FALLBACK_STAR_MARKER: &str = "STAR:";

/// What the model asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Reason is absent when only the fallback marker matched.
    Star { reason: Option<String> },
    Skip { reason: String },
    Unparseable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Star,
    Skip,
    Unknown,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Star => write!(f, "STAR"),
            Action::Skip => write!(f, "SKIP"),
            Action::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl Verdict {
    pub fn action(&self) -> Action {
        match self {
            Verdict::Star { .. } => Action::Star,
            Verdict::Skip { .. } => Action::Skip,
            Verdict::Unparseable => Action::Unknown,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Star { reason } => reason.as_deref(),
            Verdict::Skip { reason } => Some(reason),
            Verdict::Unparseable => None,
        }
    }
}

/// Which rule produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseRule {
    /// The `DECISION:` line matched
    Primary,
    /// Only the bare `STAR:` marker was found
    Fallback,
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub analysis: Option<String>,
    pub verdict: Verdict,
    pub rule: ParseRule,
}

/// Parse a model response into a [`Decision`].
///
/// The `DECISION:` line is tried first. Only when it is missing or malformed
/// does the substring fallback run, and that can only ever yield STAR or
/// nothing: SKIP is never inferred.
pub fn parse_response(response: &str) -> Decision {
    let analysis = ANALYSIS_PATTERN
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|text| !text.is_empty());

    if let Some(caps) = DECISION_PATTERN.captures(response) {
        let reason = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
        let verdict = match &caps[1] {
            "STAR" => Verdict::Star {
                reason: Some(reason),
            },
            _ => Verdict::Skip { reason },
        };
        return Decision {
            analysis,
            verdict,
            rule: ParseRule::Primary,
        };
    }

    if response.contains(FALLBACK_STAR_MARKER) {
        Decision {
            analysis,
            verdict: Verdict::Star { reason: None },
            rule: ParseRule::Fallback,
        }
    } else {
        Decision {
            analysis,
            verdict: Verdict::Unparseable,
            rule: ParseRule::Unmatched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_star() {
        let decision = parse_response("ANALYSIS: seems useful\nDECISION: STAR: well documented");
        assert_eq!(decision.rule, ParseRule::Primary);
        assert_eq!(decision.analysis.as_deref(), Some("seems useful"));
        assert_eq!(
            decision.verdict,
            Verdict::Star {
                reason: Some("well documented".to_string())
            }
        );
        assert_eq!(decision.verdict.action(), Action::Star);
    }

    #[test]
    fn test_primary_skip_without_analysis() {
        let decision = parse_response("DECISION: SKIP: unmaintained");
        assert_eq!(decision.rule, ParseRule::Primary);
        assert!(decision.analysis.is_none());
        assert_eq!(
            decision.verdict,
            Verdict::Skip {
                reason: "unmaintained".to_string()
            }
        );
        assert_eq!(decision.verdict.reason(), Some("unmaintained"));
    }

    #[test]
    fn test_multiline_analysis() {
        let response = "ANALYSIS: Line one.\n- point a\n- point b\n\nDECISION:   SKIP:   too niche  \nThanks!";
        let decision = parse_response(response);
        assert_eq!(
            decision.analysis.as_deref(),
            Some("Line one.\n- point a\n- point b")
        );
        assert_eq!(decision.verdict.reason(), Some("too niche"));
    }

    #[test]
    fn test_analysis_runs_to_end_without_decision() {
        let decision = parse_response("ANALYSIS: thorough docs, active maintainers");
        assert_eq!(
            decision.analysis.as_deref(),
            Some("thorough docs, active maintainers")
        );
        assert_eq!(decision.verdict, Verdict::Unparseable);
    }

    #[test]
    fn test_fallback_finds_star_marker() {
        let decision = parse_response("I think STAR: it is great");
        assert_eq!(decision.rule, ParseRule::Fallback);
        assert_eq!(decision.verdict, Verdict::Star { reason: None });
        assert!(decision.verdict.reason().is_none());
    }

    #[test]
    fn test_malformed_decision_line_falls_through() {
        // Missing colon after the label: the primary rule rejects it.
        let decision = parse_response("ANALYSIS: ok\nDECISION STAR: nice");
        assert_eq!(decision.rule, ParseRule::Fallback);
        assert_eq!(decision.verdict.action(), Action::Star);
    }

    #[test]
    fn test_fallback_never_detects_skip() {
        let decision = parse_response("Verdict -> SKIP: stale");
        assert_eq!(decision.rule, ParseRule::Unmatched);
        assert_eq!(decision.verdict, Verdict::Unparseable);
        assert_eq!(decision.verdict.action(), Action::Unknown);
    }

    #[test]
    fn test_no_markers_is_unparseable() {
        let decision = parse_response("I would rather not say.");
        assert_eq!(decision.verdict, Verdict::Unparseable);
        assert!(decision.analysis.is_none());
    }

    #[test]
    fn test_lowercase_is_not_recognised() {
        let decision = parse_response("decision: star: sure");
        assert_eq!(decision.verdict, Verdict::Unparseable);
    }

    #[test]
    fn test_first_decision_line_wins() {
        let decision = parse_response("DECISION: SKIP: first\nDECISION: STAR: second");
        assert_eq!(decision.verdict.action(), Action::Skip);
        assert_eq!(decision.verdict.reason(), Some("first"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let response = "ANALYSIS: seems useful\nDECISION: STAR: well documented";
        assert_eq!(parse_response(response), parse_response(response));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Star.to_string(), "STAR");
        assert_eq!(Action::Skip.to_string(), "SKIP");
        assert_eq!(Action::Unknown.to_string(), "UNKNOWN");
    }
}
