//! Verdict coercion
//!
//! Chat models wrap JSON in markdown fences or prose more often than not.
//! Coercion strips the fences, trims to the outermost brace pair and parses
//! strictly into the fixed schema. Anything that still fails to parse is a
//! hard error for that channel.

use crate::domain::ChannelAssessment;

use super::error::AssessError;

/// Strip markdown fencing and trim to the outermost `{...}`
fn clean_json_response(text: &str) -> String {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(first), Some(last)) if first < last => cleaned[first..=last].to_string(),
        _ => cleaned.to_string(),
    }
}

/// Coerce raw completion text into the fixed assessment schema
pub fn parse_assessment(text: &str) -> Result<ChannelAssessment, AssessError> {
    let cleaned = clean_json_response(text);
    serde_json::from_str(&cleaned).map_err(|e| AssessError::MalformedVerdict(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rating;

    const VALID: &str = r#"{
        "profileCheck": {"bioConsistency":"clear","externalLinks":"official","ownerContact":"present","score":8},
        "contentCheck": {
            "relevance":"crypto-related","activityLevel":"active",
            "engagementMetrics":{"subscriberCount":1000,"avgViewsPerPost":250,"engagementRatio":"25.00%","avgCommentsPerPost":0,"avgReactionsPerPost":0},
            "scamIndicators":[],"score":7
        },
        "crossCheck": {"officialReferences":"yes","inconsistencies":[],"score":9},
        "verdict": {"trustScore":82,"rating":"Legit","explanation":"Consistent profile"}
    }"#;

    #[test]
    fn test_parse_bare_json() {
        let assessment = parse_assessment(VALID).unwrap();
        assert_eq!(assessment.verdict.trust_score, 82);
        assert_eq!(assessment.verdict.rating, Rating::Legit);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(parse_assessment(&fenced).is_ok());
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let wrapped = format!("Here is the analysis you asked for:\n{VALID}\nLet me know if you need more.");
        assert!(parse_assessment(&wrapped).is_ok());
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = parse_assessment("I could not analyze this channel.").unwrap_err();
        assert!(matches!(err, AssessError::MalformedVerdict(_)));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let err = parse_assessment(r#"{"verdict": {"trustScore": 10}}"#).unwrap_err();
        assert!(matches!(err, AssessError::MalformedVerdict(_)));
    }
}
