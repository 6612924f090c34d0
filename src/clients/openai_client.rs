use reqwest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

pub async fn generate_openai_prompt(
    prompt: &str,
    prompt_type: &str,
    api_key: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let full_prompt = match prompt_type {
        "calendar_command" => format!(
            "Available tools:\n\
             - add_entry(start_time: str, text: str, end_time: str = None, people: List[str] = None)\n\
             - lookup_events(start_date: str = today, end_date: str = None, people: List[str] = None)\n\
             - clear_events(start_date: str = None, end_date: str = None)\n\
             \n\
             Any queries related to past or future events should be returned in the appropriate format.\n\
             clear_events with no arguments wipes the whole calendar; only use it when the user clearly asks for that.\n\
             \n\
             Example\n\
             query: Monday, 02 December 2024 12:30PM: my gf is visiting on Tuesday\n\
             answer: add_entry(\"2024-12-03\", \"gf is visiting\", None, [\"girlfriend\"])     # can guess the date of the next Tuesday based on the fact its Monday\n\
             query: Monday, 02 December 2024 12:30PM: my moms coming over next week for a couple of nights\n\
             answer: add_entry(\"2024-12-09\", \"moms coming over\", \"2024-12-11\", [\"moms\"])\n\
             query: Wednesday, 04 December 2024 12:30PM: dentist on 5th May\n\
             answer: add_entry(\"2025-05-05\", \"dentist\")   # since its after May 2024, it's assumed to be 2025\n\
             query: what events do I have coming up?\n\
             answer: lookup_events()\n\
             query: when is mom visiting?\n\
             answer: lookup_events(people=[\"mom\"])\n\
             query: what's happening next week?\n\
             answer: lookup_events(\"2024-01-15\", \"2024-01-21\")      # based on given date, guess dates for next Monday and Sunday\n\
             query: what's on the calendar after March?\n\
             answer: lookup_events(\"2024-03-01\")\n\
             query: clear my calendar for March\n\
             answer: clear_events(\"2024-03-01\", \"2024-03-31\")\n\
             \n\
             Return only the command to be executed as a raw string, no string\n\
             delimiters wrapping it, no yapping, no markdown, no fenced code\n\
             blocks; what you return will be validated and executed directly.\n\
             \n\
             query: {user_prompt}\n\
             answer:",
            user_prompt = prompt
        ),
        "event_summary" => format!(
            "You are a calendar assistant summarizing lookup results.\n\
             Task: Given the structured list of events below, write a short,\n\
             natural English summary to show the user.\n\
             Rules:\n\
             - Address the user in second person (\"you\").\n\
             - Mention event dates explicitly.\n\
             - Mention participants when the list includes them.\n\
             - Keep it to 1-3 sentences, no markdown, no lists, no JSON.\n\
             - Do NOT wrap the output in quotes.\n\
             Structured input:\n\
             {structured}",
            structured = prompt
        ),
        _ => return Err("Not a valid base prompt".to_string().into()),
    };

    query_openai(full_prompt, prompt_type, api_key).await
}

async fn query_openai(
    prompt: String,
    prompt_type: &str,
    api_key: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let system_message = match prompt_type {
        "calendar_command" => {
            "You are a strict calendar command generator. You read instructions and a dated user query and reply ONLY with a single tool call as a raw string, with no markdown, no backticks, and no extra text."
        }
        "event_summary" => {
            "You are a calendar assistant. Reply with plain text only (no JSON, no markdown, no quotes)."
        }
        _ => "You are a helpful assistant.",
    };

    let request: OpenAIRequest = OpenAIRequest {
        model: "gpt-4o-mini".to_string(),
        messages: vec![
            OpenAIMessage {
                role: "system".to_string(),
                content: system_message.to_string(),
            },
            OpenAIMessage {
                role: "user".to_string(),
                content: prompt,
            },
        ],
        max_tokens: 500,
        temperature: 0.2,
    };

    let client = reqwest::Client::new();
    let response = client
        .post("https://api.openai.com/v1/chat/completions")
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?; // read the body once

    if !status.is_success() {
        eprintln!("Error {}: {}", status, text);
        return Err(format!("Request failed with status {}", status).into());
    }

    let parsed: OpenAIResponse = serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse JSON: {}\nRaw body: {}", e, text))?;

    if let Some(choice) = parsed.choices.first() {
        Ok(choice.message.content.clone())
    } else {
        eprintln!("No choices found in response.\nRaw body:\n{}", text);
        Err("No response from OpenAI".to_string().into())
    }
}
