//! Assessment prompt construction

use std::fmt::Write;

use crate::domain::{ChannelInfo, ChannelMessage};

/// System prompt pinning the assessor to JSON-only output
pub const SYSTEM_PROMPT: &str = "You are a Telegram Channel Auditor AI. Analyze the given channel data \
                                 and return ONLY valid JSON without any additional text or formatting.";

/// Mean views across the recent posts, rounded to the nearest integer
pub fn average_views(messages: &[ChannelMessage]) -> u64 {
    if messages.is_empty() {
        return 0;
    }
    let sum: u64 = messages.iter().map(|m| m.views).sum();
    ((sum as f64) / (messages.len() as f64)).round() as u64
}

/// Average views as a percentage of subscribers, formatted to two decimals
///
/// Zero-subscriber channels report 0.00% rather than a division artifact.
pub fn engagement_ratio(avg_views: u64, subscribers: u64) -> String {
    if subscribers == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", (avg_views as f64 / subscribers as f64) * 100.0)
}

/// Build the user prompt describing the channel and the expected output shape
pub fn build_analysis_prompt(info: &ChannelInfo, messages: &[ChannelMessage]) -> String {
    let avg_views = average_views(messages);
    let ratio = engagement_ratio(avg_views, info.subscribers);

    let mut posts = String::new();
    for (i, msg) in messages.iter().enumerate() {
        let preview: String = msg.text.chars().take(200).collect();
        let _ = write!(
            posts,
            "\nPost {}:\n- Date: {}\n- Views: {}\n- Text: {}...\n- Has Video: {}\n- Has Photo: {}\n",
            i + 1,
            msg.date.to_rfc3339(),
            msg.views,
            preview,
            msg.has_video(),
            msg.has_photo(),
        );
    }

    format!(
        r#"Analyze this Telegram channel:

CHANNEL INFO:
- Name: {title}
- Description: {description}
- Subscribers: {subscribers}
- Verified: {verified}
- Type: {chat_type}

RECENT MESSAGES ({count} posts):
{posts}
METRICS:
- Average views per post: {avg_views}
- Engagement ratio: {ratio}

Return analysis in this EXACT JSON format:
{{
  "profileCheck": {{
    "bioConsistency": "clear/vague/misleading",
    "externalLinks": "official/suspicious/none",
    "ownerContact": "present/absent",
    "score": 0
  }},
  "contentCheck": {{
    "relevance": "crypto-related/general/spammy",
    "activityLevel": "active/inactive",
    "engagementMetrics": {{
      "subscriberCount": {subscribers},
      "avgViewsPerPost": {avg_views},
      "engagementRatio": "{ratio}",
      "avgCommentsPerPost": 0,
      "avgReactionsPerPost": 0
    }},
    "scamIndicators": [],
    "score": 0
  }},
  "crossCheck": {{
    "officialReferences": "yes/no",
    "inconsistencies": [],
    "score": 0
  }},
  "verdict": {{
    "trustScore": 0,
    "rating": "Legit/Doubtful/Scam Risk",
    "explanation": "Brief explanation"
  }}
}}"#,
        title = info.title,
        description = info.description,
        subscribers = info.subscribers,
        verified = info.verified,
        chat_type = info.chat_type,
        count = messages.len(),
        posts = posts,
        avg_views = avg_views,
        ratio = ratio,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(views: u64) -> ChannelMessage {
        ChannelMessage {
            id: 1,
            date: Utc::now(),
            text: "a post about markets".to_string(),
            views,
            video: None,
            photo: None,
        }
    }

    #[test]
    fn test_average_views() {
        assert_eq!(average_views(&[]), 0);
        assert_eq!(average_views(&[message(100), message(301)]), 201); // rounds 200.5 up
    }

    #[test]
    fn test_engagement_ratio_guards_zero_subscribers() {
        assert_eq!(engagement_ratio(500, 0), "0.00%");
        assert_eq!(engagement_ratio(250, 1000), "25.00%");
    }

    #[test]
    fn test_prompt_contains_channel_data_and_shape() {
        let info = ChannelInfo {
            title: "Crypto Signals".to_string(),
            description: "daily calls".to_string(),
            subscribers: 1_000,
            verified: true,
            chat_type: "channel".to_string(),
        };
        let prompt = build_analysis_prompt(&info, &[message(250), message(250)]);

        assert!(prompt.contains("Name: Crypto Signals"));
        assert!(prompt.contains("RECENT MESSAGES (2 posts)"));
        assert!(prompt.contains("Average views per post: 250"));
        assert!(prompt.contains("Engagement ratio: 25.00%"));
        assert!(prompt.contains("\"rating\": \"Legit/Doubtful/Scam Risk\""));
    }
}
