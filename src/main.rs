#![allow(non_snake_case)]

use std::env;

use calendarBot::cli;
use calendarBot::config::AppConfig;
use calendarBot::logging;

const DEFAULT_DB_PATH: &str = "./data/calendar.db";

#[tokio::main]
async fn main() {
    logging::init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let get_prop = |key: &str| -> Option<String> {
        config.get(key).or_else(|| env::var(key).ok())
    };

    let db_path = get_prop("CALENDAR_DB_PATH").unwrap_or(DEFAULT_DB_PATH.to_string());
    let openai_api_key = get_prop("OPENAI_API_KEY");

    cli::cli(db_path, openai_api_key).await;
}
