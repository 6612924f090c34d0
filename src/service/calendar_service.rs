use log::warn;

use crate::db::DbResult;
use crate::models::event::{join_people, Event, NewEvent};
use crate::service::approval_prompt::ApprovalPromptService;
use crate::service::openai_service::OpenAIClient;
use crate::store::EventStore;

/// Which events a clear request covers. The dispatcher builds this from
/// the model's arguments; `All` is only reachable when both bounds were
/// omitted.
#[derive(Debug, Clone, PartialEq)]
pub enum ClearRange {
    All,
    Day(String),
    Span(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Deleted(usize),
    Declined,
}

pub struct CalendarService;

impl CalendarService {
    /// Adds one event. `end_time` falls back to `start_time`, `people` to
    /// empty; the originating prompt is kept for audit.
    pub fn add_entry(
        store: &dyn EventStore,
        start_time: &str,
        text: &str,
        end_time: Option<&str>,
        people: &[String],
        prompt: Option<&str>,
    ) -> DbResult<Event> {
        let end_time = end_time.unwrap_or(start_time);
        let people = join_people(people);
        let id = store.create(NewEvent {
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            text: text.to_string(),
            people: people.clone(),
            prompt: prompt.map(|p| p.to_string()),
        })?;
        Ok(Event {
            id,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            text: text.to_string(),
            people,
            prompt: prompt.map(|p| p.to_string()),
        })
    }

    /// Events with `start_time >= start_date`, optionally bounded above and
    /// filtered by participants, ascending.
    pub fn lookup_events(
        store: &dyn EventStore,
        start_date: &str,
        end_date: Option<&str>,
        people: Option<&[String]>,
    ) -> DbResult<Vec<Event>> {
        store.query(Some(start_date), end_date, people)
    }

    /// Deletes the covered range and returns the count. `ClearRange::All`
    /// goes through the approval gate first; declining (or failing to read
    /// an answer) deletes nothing.
    pub async fn clear_events(
        store: &dyn EventStore,
        approval: &dyn ApprovalPromptService,
        range: ClearRange,
    ) -> DbResult<ClearOutcome> {
        match range {
            ClearRange::Span(start, end) => {
                Ok(ClearOutcome::Deleted(store.delete_range(&start, &end)?))
            }
            ClearRange::Day(day) => Ok(ClearOutcome::Deleted(store.delete_range(&day, &day)?)),
            ClearRange::All => match approval.confirm_delete_all().await {
                Ok(true) => Ok(ClearOutcome::Deleted(store.delete_all()?)),
                Ok(false) => Ok(ClearOutcome::Declined),
                Err(err) => {
                    warn!("Treating unreadable confirmation as a decline: {}", err);
                    Ok(ClearOutcome::Declined)
                }
            },
        }
    }

    /// Best-effort narrated summary of lookup results. Returns `None` on
    /// bridge failure; the caller has already printed the structured list,
    /// so there is nothing to recover.
    pub async fn narrate_events<C: OpenAIClient + ?Sized>(
        events: &[Event],
        openai: &C,
    ) -> Option<String> {
        let structured: Vec<String> = events
            .iter()
            .map(|event| {
                format!(
                    "start: {}\nend: {}\ntext: {}\npeople: {}",
                    event.start_time, event.end_time, event.text, event.people
                )
            })
            .collect();

        match openai
            .generate_prompt(&structured.join("\n---\n"), "event_summary")
            .await
        {
            Ok(body) => Some(body.trim().to_string()),
            Err(err) => {
                eprintln!(
                    "Failed to generate event summary, showing the plain list only. Error: {}",
                    err
                );
                None
            }
        }
    }
}
