//! Maps a validated call onto the fixed operation registry.
//!
//! Binding applies each operation's defaults and tolerates the literal
//! shapes the model actually produces; anything that does not fit comes
//! back as a usage message, never a crash. Names outside the registry are
//! dropped without touching the store.

use log::warn;

use crate::command::{CommandCall, Literal};
use crate::db::DbResult;
use crate::models::event::Event;
use crate::service::approval_prompt::ApprovalPromptService;
use crate::service::calendar_service::{CalendarService, ClearOutcome, ClearRange};
use crate::store::EventStore;

pub struct DispatchContext<'a> {
    /// Original assembled prompt, kept on created events for audit.
    pub prompt: Option<&'a str>,
    /// Default start_date when a lookup omits one.
    pub today: String,
    /// Whether lookup results get a narrated summary unless the call says
    /// otherwise.
    pub fancy_default: bool,
}

#[derive(Debug)]
pub enum DispatchOutcome {
    Added { event: Event },
    Found { events: Vec<Event>, fancy: bool },
    Cleared { deleted: usize },
    ClearDeclined,
    Unknown { name: String },
    Usage { message: String },
}

pub async fn dispatch(
    call: CommandCall,
    store: &dyn EventStore,
    approval: &dyn ApprovalPromptService,
    ctx: &DispatchContext<'_>,
) -> DbResult<DispatchOutcome> {
    match call.name.as_str() {
        "add_entry" => add_entry(&call, store, ctx),
        "lookup_events" => lookup_events(&call, store, ctx),
        "clear_events" => clear_events(&call, store, approval).await,
        other => {
            // Fail closed: a hallucinated name does nothing observable.
            warn!("Ignoring unsupported command from model: {}", other);
            Ok(DispatchOutcome::Unknown {
                name: other.to_string(),
            })
        }
    }
}

fn add_entry(
    call: &CommandCall,
    store: &dyn EventStore,
    ctx: &DispatchContext<'_>,
) -> DbResult<DispatchOutcome> {
    let bound = bind(call, "add_entry", &["start_time", "text", "end_time", "people"])
        .and_then(|slots| {
            Ok((
                required_str(slots[0], "add_entry", "start_time")?,
                required_str(slots[1], "add_entry", "text")?,
                optional_str(slots[2], "add_entry", "end_time")?,
                people_list(slots[3], "add_entry")?,
            ))
        });
    let (start_time, text, end_time, people) = match bound {
        Ok(parts) => parts,
        Err(message) => return Ok(DispatchOutcome::Usage { message }),
    };

    let event = CalendarService::add_entry(
        store,
        &start_time,
        &text,
        end_time.as_deref(),
        &people,
        ctx.prompt,
    )?;
    Ok(DispatchOutcome::Added { event })
}

fn lookup_events(
    call: &CommandCall,
    store: &dyn EventStore,
    ctx: &DispatchContext<'_>,
) -> DbResult<DispatchOutcome> {
    let bound = bind(
        call,
        "lookup_events",
        &["start_date", "end_date", "people", "fancy"],
    )
    .and_then(|slots| {
        Ok((
            optional_str(slots[0], "lookup_events", "start_date")?,
            optional_str(slots[1], "lookup_events", "end_date")?,
            people_list(slots[2], "lookup_events")?,
            optional_bool(slots[3], "lookup_events", "fancy")?,
        ))
    });
    let (start_date, end_date, people, fancy) = match bound {
        Ok(parts) => parts,
        Err(message) => return Ok(DispatchOutcome::Usage { message }),
    };

    let start_date = start_date.unwrap_or_else(|| ctx.today.clone());
    let people_filter = if people.is_empty() {
        None
    } else {
        Some(people.as_slice())
    };

    let events =
        CalendarService::lookup_events(store, &start_date, end_date.as_deref(), people_filter)?;
    Ok(DispatchOutcome::Found {
        events,
        fancy: fancy.unwrap_or(ctx.fancy_default),
    })
}

async fn clear_events(
    call: &CommandCall,
    store: &dyn EventStore,
    approval: &dyn ApprovalPromptService,
) -> DbResult<DispatchOutcome> {
    let bound = bind(call, "clear_events", &["start_date", "end_date"]).and_then(|slots| {
        let start = optional_str(slots[0], "clear_events", "start_date")?;
        let end = optional_str(slots[1], "clear_events", "end_date")?;
        match (start, end) {
            (None, None) => Ok(ClearRange::All),
            (Some(start), None) => Ok(ClearRange::Day(start)),
            (Some(start), Some(end)) => Ok(ClearRange::Span(start, end)),
            // An open start would silently widen a deletion; refuse it.
            (None, Some(_)) => {
                Err("clear_events requires start_date when end_date is given".to_string())
            }
        }
    });
    let range = match bound {
        Ok(range) => range,
        Err(message) => return Ok(DispatchOutcome::Usage { message }),
    };

    match CalendarService::clear_events(store, approval, range).await? {
        ClearOutcome::Deleted(deleted) => Ok(DispatchOutcome::Cleared { deleted }),
        ClearOutcome::Declined => Ok(DispatchOutcome::ClearDeclined),
    }
}

/// Fills one slot per declared parameter from positionals then keywords.
fn bind<'a>(
    call: &'a CommandCall,
    op: &str,
    params: &[&str],
) -> Result<Vec<Option<&'a Literal>>, String> {
    if call.args.len() > params.len() {
        return Err(format!(
            "{} takes at most {} arguments, got {}",
            op,
            params.len(),
            call.args.len()
        ));
    }

    let mut slots: Vec<Option<&Literal>> = vec![None; params.len()];
    for (idx, arg) in call.args.iter().enumerate() {
        slots[idx] = Some(arg);
    }
    for (key, value) in &call.kwargs {
        let Some(idx) = params.iter().position(|param| *param == key.as_str()) else {
            return Err(format!("{} got an unexpected keyword argument '{}'", op, key));
        };
        if slots[idx].is_some() {
            return Err(format!("{} got multiple values for '{}'", op, key));
        }
        slots[idx] = Some(value);
    }
    Ok(slots)
}

fn required_str(slot: Option<&Literal>, op: &str, param: &str) -> Result<String, String> {
    match slot {
        Some(Literal::Str(value)) => Ok(value.clone()),
        Some(other) => Err(format!(
            "{}: '{}' must be a string, got {}",
            op,
            param,
            other.kind()
        )),
        None => Err(format!("{} missing required argument '{}'", op, param)),
    }
}

fn optional_str(slot: Option<&Literal>, op: &str, param: &str) -> Result<Option<String>, String> {
    match slot {
        None | Some(Literal::Null) => Ok(None),
        Some(Literal::Str(value)) => Ok(Some(value.clone())),
        Some(other) => Err(format!(
            "{}: '{}' must be a string, got {}",
            op,
            param,
            other.kind()
        )),
    }
}

// The model sometimes writes people="mom" instead of people=["mom"];
// a bare string is taken as a single name.
fn people_list(slot: Option<&Literal>, op: &str) -> Result<Vec<String>, String> {
    match slot {
        None | Some(Literal::Null) => Ok(Vec::new()),
        Some(Literal::Str(name)) => Ok(vec![name.clone()]),
        Some(Literal::List(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(|name| name.to_string()).ok_or_else(|| {
                    format!("{}: 'people' entries must be strings, got {}", op, item.kind())
                })
            })
            .collect(),
        Some(other) => Err(format!(
            "{}: 'people' must be a list of strings, got {}",
            op,
            other.kind()
        )),
    }
}

fn optional_bool(slot: Option<&Literal>, op: &str, param: &str) -> Result<Option<bool>, String> {
    match slot {
        None | Some(Literal::Null) => Ok(None),
        Some(Literal::Bool(value)) => Ok(Some(*value)),
        Some(other) => Err(format!(
            "{}: '{}' must be a boolean, got {}",
            op,
            param,
            other.kind()
        )),
    }
}
