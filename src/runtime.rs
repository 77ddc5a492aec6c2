use std::sync::Arc;

use serenity::model::gateway::GatewayIntents;
use tokio::sync::Mutex;

use crate::clients::naver_client::{NaverClient, PlaceSearch};
use crate::clients::openai_client::{DialogueAnalyzer, OpenAIAnalyzer};
use crate::handlers::discord::BotHandler;
use crate::models::appointment::Appointment;
use crate::models::session::SessionStore;
use crate::storage::DB;
use crate::tasks::reminder_loop;

pub async fn run_api(
    sessions: Arc<Mutex<SessionStore>>,
    appointments: Arc<Mutex<DB<Appointment>>>,
    discord_client_secret: String,
    openai_api_key: String,
    naver_client_id: String,
    naver_client_secret: String,
) {
    let discord_client_secret_arc = Arc::new(discord_client_secret.clone());
    tokio::spawn(reminder_loop::run_reminder_loop(
        appointments.clone(),
        discord_client_secret_arc,
    ));

    let analyzer: Arc<dyn DialogueAnalyzer> = Arc::new(OpenAIAnalyzer::new(openai_api_key));
    let places: Arc<dyn PlaceSearch> =
        Arc::new(NaverClient::new(naver_client_id, naver_client_secret));

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = serenity::Client::builder(discord_client_secret, intents)
        .event_handler(BotHandler::new(sessions, appointments, analyzer, places))
        .await
        .expect("Error creating Serenity client");

    if let Err(why) = client.start().await {
        eprintln!("Client error: {:?}", why);
    }
}
