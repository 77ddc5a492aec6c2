use clap::{Parser, Subcommand};
use inquire::Text;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::clients::naver_client::{NaverClient, PlaceSearch};
use crate::clients::openai_client::{DialogueAnalyzer, OpenAIAnalyzer};
use crate::handlers::discord::BotHandler;
use crate::models::appointment::Appointment;
use crate::models::session::SessionStore;
use crate::service::appointment_service::AppointmentService;
use crate::storage::DB;

/// Conversation id used by the local interactive session.
const CLI_CONVERSATION_ID: &str = "cli";
const CLI_AUTHOR: &str = "나";

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive local session: type chat messages and /commands.
    Chat {},
    /// Show the confirmed appointment for the local session.
    Reminders {},
}

pub async fn cli(
    sessions: Arc<Mutex<SessionStore>>,
    appointments: Arc<Mutex<DB<Appointment>>>,
    openai_api_key: String,
    naver_client_id: String,
    naver_client_secret: String,
) {
    // Fine to panic here
    let cli = Cli::parse();
    match &cli.command {
        Commands::Chat {} => {
            let analyzer: Arc<dyn DialogueAnalyzer> =
                Arc::new(OpenAIAnalyzer::new(openai_api_key));
            let places: Arc<dyn PlaceSearch> =
                Arc::new(NaverClient::new(naver_client_id, naver_client_secret));
            let handler = BotHandler::new(sessions, appointments, analyzer, places);

            println!("약속비서 로컬 세션입니다. /quit 으로 종료합니다.");
            loop {
                let line = match Text::new(">").prompt() {
                    Ok(line) => line,
                    Err(_) => break,
                };
                if line.trim() == "/quit" {
                    break;
                }
                let reply = handler
                    .handle_text(
                        CLI_CONVERSATION_ID,
                        CLI_AUTHOR,
                        &line,
                        BotHandler::today(),
                    )
                    .await;
                if let Some(reply) = reply {
                    println!("{}", reply);
                }
            }
        }
        Commands::Reminders {} => {
            let appointments = appointments.lock().await;
            match AppointmentService::get(&appointments, CLI_CONVERSATION_ID) {
                Some(appointment) => {
                    println!(
                        "확정된 약속: {} {} (리마인더 {})",
                        appointment.date,
                        appointment.time,
                        if appointment.reminder_enabled {
                            "켜짐"
                        } else {
                            "꺼짐"
                        }
                    );
                }
                None => println!("등록된 약속이 없습니다."),
            }
        }
    }
}
