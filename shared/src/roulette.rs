use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub const RECENT_ONES_LIMIT: usize = 10;
pub const TOAST_LIFETIME_MS: i32 = 4500;
pub const WHEEL_SEGMENTS: u8 = 5;
const WHEEL_TURNS: f64 = 5.0;
const WHEEL_OFFSET_DEG: f64 = 20.0;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpinResponse {
    pub success: bool,
    #[serde(default)]
    pub rolled_number: Option<u8>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RecentOne {
    pub username: String,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RecentOnesResponse {
    #[serde(default)]
    pub recent_ones: Vec<RecentOne>,
}

/// A roll broadcast by the push channel. Extra fields (such as a channel
/// layer `type`) are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RollEvent {
    #[serde(default)]
    pub user_id: Option<u64>,
    pub username: String,
    pub rolled_number: u8,
    pub timestamp: String,
}

impl RollEvent {
    pub fn is_from(&self, user_id: Option<u64>) -> bool {
        user_id.is_some() && self.user_id == user_id
    }
}

pub fn parse_roll_event(text: &str) -> Result<RollEvent, serde_json::Error> {
    serde_json::from_str(text)
}

#[derive(Clone, Debug, PartialEq)]
pub enum RollReaction {
    RecordOne(RecentOne),
    Sticky(String),
    Toast(String),
}

pub fn reaction_for(event: &RollEvent) -> Option<RollReaction> {
    match event.rolled_number {
        1 => Some(RollReaction::RecordOne(RecentOne {
            username: event.username.clone(),
            timestamp: event.timestamp.clone(),
        })),
        2 => Some(RollReaction::Sticky(format!(
            "{} rolled a 2!",
            event.username
        ))),
        5 => Some(RollReaction::Toast(format!("{} rolled a 5!", event.username))),
        _ => None,
    }
}

/// Newest-first list of rolls of 1, capped at `RECENT_ONES_LIMIT`.
#[derive(Clone, Debug, Default)]
pub struct RecentOnes {
    entries: VecDeque<RecentOne>,
}

impl RecentOnes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, entries: Vec<RecentOne>) {
        self.entries = entries.into_iter().take(RECENT_ONES_LIMIT).collect();
    }

    pub fn push(&mut self, entry: RecentOne) {
        self.entries.push_front(entry);
        self.entries.truncate(RECENT_ONES_LIMIT);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentOne> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Final wheel rotation in degrees (applied counter-clockwise) landing on
/// `rolled_number`.
pub fn wheel_rotation(rolled_number: u8) -> Option<f64> {
    if !(1..=WHEEL_SEGMENTS).contains(&rolled_number) {
        return None;
    }
    let segment = 360.0 / WHEEL_SEGMENTS as f64;
    Some(360.0 * WHEEL_TURNS + WHEEL_OFFSET_DEG + (rolled_number - 1) as f64 * segment)
}

pub fn login_redirect(pathname: &str) -> String {
    format!("/accounts/login/?next={pathname}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(number: u8) -> RollEvent {
        RollEvent {
            user_id: Some(3),
            username: "kim".to_string(),
            rolled_number: number,
            timestamp: "2024-05-01T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn parses_channel_payload_with_extra_fields() {
        let text = r#"{"type":"roulette.message","user_id":3,"username":"kim","rolled_number":5,"timestamp":"2024-05-01T10:00:00Z"}"#;
        assert_eq!(parse_roll_event(text).unwrap(), event(5));
        assert!(parse_roll_event("{\"username\":1}").is_err());
    }

    #[test]
    fn reactions_by_number() {
        assert!(matches!(reaction_for(&event(1)), Some(RollReaction::RecordOne(_))));
        assert_eq!(
            reaction_for(&event(2)),
            Some(RollReaction::Sticky("kim rolled a 2!".to_string()))
        );
        assert_eq!(
            reaction_for(&event(5)),
            Some(RollReaction::Toast("kim rolled a 5!".to_string()))
        );
        assert_eq!(reaction_for(&event(3)), None);
        assert_eq!(reaction_for(&event(4)), None);
    }

    #[test]
    fn recent_ones_keep_ten_newest_first() {
        let mut recent = RecentOnes::new();
        for i in 0..12 {
            recent.push(RecentOne {
                username: format!("user{i}"),
                timestamp: String::new(),
            });
        }
        assert_eq!(recent.len(), RECENT_ONES_LIMIT);
        assert_eq!(recent.iter().next().unwrap().username, "user11");
        assert_eq!(recent.iter().last().unwrap().username, "user2");
    }

    #[test]
    fn seeded_list_is_capped_at_ten() {
        let entries: Vec<RecentOne> = (0..14)
            .map(|i| RecentOne {
                username: format!("user{i}"),
                timestamp: String::new(),
            })
            .collect();
        let mut recent = RecentOnes::new();
        recent.replace_all(entries);
        assert_eq!(recent.len(), RECENT_ONES_LIMIT);
        assert_eq!(recent.iter().next().unwrap().username, "user0");
        assert_eq!(recent.iter().last().unwrap().username, "user9");

        recent.replace_all(Vec::new());
        assert!(recent.is_empty());
    }

    #[test]
    fn recent_ones_response_tolerates_missing_list() {
        let response: RecentOnesResponse = serde_json::from_str("{}").unwrap();
        assert!(response.recent_ones.is_empty());
    }

    #[test]
    fn failed_spin_responses_decode() {
        let refused: SpinResponse =
            serde_json::from_str(r#"{"success":false,"message":"Not allowed"}"#).unwrap();
        assert!(!refused.success);
        assert_eq!(refused.rolled_number, None);
        assert_eq!(refused.message.as_deref(), Some("Not allowed"));

        let incomplete: SpinResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(incomplete.success);
        assert_eq!(incomplete.rolled_number, None);

        let rolled: SpinResponse =
            serde_json::from_str(r#"{"success":true,"rolled_number":4}"#).unwrap();
        assert_eq!(rolled.rolled_number, Some(4));
    }

    #[test]
    fn login_redirect_returns_to_current_page() {
        assert_eq!(login_redirect("/roulette/"), "/accounts/login/?next=/roulette/");
        assert_eq!(login_redirect("/"), "/accounts/login/?next=/");
    }

    #[test]
    fn wheel_lands_on_segment() {
        assert_eq!(wheel_rotation(1), Some(1820.0));
        assert_eq!(wheel_rotation(5), Some(1800.0 + 20.0 + 288.0));
        assert_eq!(wheel_rotation(0), None);
        assert_eq!(wheel_rotation(6), None);
    }

    #[test]
    fn own_events_need_a_known_user() {
        assert!(event(1).is_from(Some(3)));
        assert!(!event(1).is_from(Some(4)));
        assert!(!event(1).is_from(None));
    }
}
