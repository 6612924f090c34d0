use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator used when flattening participant names for storage.
pub const PEOPLE_SEPARATOR: &str = ", ";

/// A persisted calendar event.
///
/// `start_time` and `end_time` are date or date-time strings as produced by
/// the model; the store does not enforce `start_time <= end_time`. `prompt`
/// keeps the natural-language input that created the event, for audit.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    pub text: String,
    pub people: String,
    pub prompt: Option<String>,
}

/// An event that has not been persisted yet; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub start_time: String,
    pub end_time: String,
    pub text: String,
    pub people: String,
    pub prompt: Option<String>,
}

pub fn new_event_id() -> String {
    Uuid::new_v4().to_string()
}

/// Joins participant names in caller order into the stored form.
pub fn join_people(people: &[String]) -> String {
    people.join(PEOPLE_SEPARATOR)
}

/// Splits the stored form back into names. An empty string means no one.
pub fn split_people(people: &str) -> Vec<String> {
    if people.is_empty() {
        return Vec::new();
    }
    people
        .split(PEOPLE_SEPARATOR)
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn people_round_trip_preserves_order() {
        let people = vec!["mom".to_string(), "dad".to_string()];
        let joined = join_people(&people);
        assert_eq!(joined, "mom, dad");
        assert_eq!(split_people(&joined), people);
    }

    #[test]
    fn empty_people_is_empty_string() {
        assert_eq!(join_people(&[]), "");
        assert!(split_people("").is_empty());
    }
}
