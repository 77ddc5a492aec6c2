#![allow(non_snake_case)]

use std::env;
use std::sync::Arc;

use tokio::sync::Mutex;
use yaksokBot::config::AppConfig;
use yaksokBot::models::appointment::{self, Appointment};
use yaksokBot::models::session::SessionStore;
use yaksokBot::storage::{DB, load_db};
use yaksokBot::{cli, runtime};

const DEFAULT_RUN_MODE: &str = "cli";

#[tokio::main]
async fn main() {
    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let db: DB<Appointment> =
        load_db(&appointment::get_db_location()).expect("Unable to load appointment snapshot.");
    let appointments = Arc::new(Mutex::new(db));
    let sessions = Arc::new(Mutex::new(SessionStore::new()));

    let openai_api_key = config.require("OPENAI_API_KEY");
    let naver_client_id = config.require("NAVER_CLIENT_ID");
    let naver_client_secret = config.require("NAVER_CLIENT_SECRET");

    let run_mode = config
        .lookup("RUN_MODE")
        .unwrap_or(DEFAULT_RUN_MODE.to_string());
    if run_mode == "api" {
        let discord_client_secret = config.require("DISCORD_CLIENT_SECRET");
        runtime::run_api(
            sessions,
            appointments,
            discord_client_secret,
            openai_api_key,
            naver_client_id,
            naver_client_secret,
        )
        .await;
    } else if run_mode == "cli" {
        cli::cli(
            sessions,
            appointments,
            openai_api_key,
            naver_client_id,
            naver_client_secret,
        )
        .await;
    } else {
        println!("Invalid run mode {}", run_mode);
    }
}
