use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Seoul;
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::clients::naver_client::PlaceSearch;
use crate::clients::openai_client::{DialogueAnalysis, DialogueAnalyzer};
use crate::models::appointment::Appointment;
use crate::models::session::SessionStore;
use crate::scheduling::consensus;
use crate::service::analyze_service::AnalyzeService;
use crate::service::appointment_service::{
    AppointmentService, ArmOutcome, DisarmOutcome, FinalizeError,
};
use crate::service::place_service::PlaceService;
use crate::storage::DB;

pub struct BotHandler {
    sessions: Arc<Mutex<SessionStore>>,
    appointments: Arc<Mutex<DB<Appointment>>>,
    analyzer: Arc<dyn DialogueAnalyzer>,
    places: Arc<dyn PlaceSearch>,
}

impl BotHandler {
    pub fn new(
        sessions: Arc<Mutex<SessionStore>>,
        appointments: Arc<Mutex<DB<Appointment>>>,
        analyzer: Arc<dyn DialogueAnalyzer>,
        places: Arc<dyn PlaceSearch>,
    ) -> Self {
        BotHandler {
            sessions,
            appointments,
            analyzer,
            places,
        }
    }

    /// Today in the bot's timezone, used as the reference for day tokens.
    pub fn today() -> NaiveDate {
        Utc::now().with_timezone(&Seoul).date_naive()
    }

    /// Transport-free entry point for one inbound chat message. Commands
    /// produce a reply; plain text is appended to the conversation with no
    /// reply.
    pub async fn handle_text(
        &self,
        conversation_id: &str,
        author: &str,
        text: &str,
        reference: NaiveDate,
    ) -> Option<String> {
        let text = text.trim();
        match text {
            "/start" => Some("✅ 약속비서 챗봇이 시작되었습니다!".to_string()),
            "/clear" => Some(self.handle_clear(conversation_id).await),
            "/analyze" => Some(self.handle_analyze(conversation_id, reference).await),
            "/finalize" => Some(self.handle_finalize(conversation_id, reference).await),
            "/remind" => Some(self.handle_remind(conversation_id).await),
            "/remind_off" => Some(self.handle_remind_off(conversation_id).await),
            "/reminders" => Some(self.handle_reminders(conversation_id).await),
            _ if text.starts_with('/') => None,
            "" => None,
            _ => {
                let mut sessions = self.sessions.lock().await;
                sessions.append_utterance(conversation_id, author, text);
                None
            }
        }
    }

    async fn handle_clear(&self, conversation_id: &str) -> String {
        {
            let mut sessions = self.sessions.lock().await;
            sessions.clear(conversation_id);
        }
        let mut appointments = self.appointments.lock().await;
        if let Err(err) = AppointmentService::remove(&mut appointments, conversation_id) {
            return format!("⚠️ 약속 저장소에 문제가 생겼어요: {}", err);
        }
        "🧹 대화 기록이 초기화되었습니다!".to_string()
    }

    async fn handle_analyze(&self, conversation_id: &str, reference: NaiveDate) -> String {
        let history = {
            let sessions = self.sessions.lock().await;
            sessions.transcript(conversation_id)
        };
        if history.is_empty() {
            return "❗ 분석할 대화가 없습니다.".to_string();
        }

        // Collaborator failures degrade to an empty analysis; the flow
        // continues.
        let analysis = match self.analyzer.analyze(&history).await {
            Ok(analysis) => analysis,
            Err(err) => {
                eprintln!("Dialogue analysis failed: {}", err);
                DialogueAnalysis::default()
            }
        };

        let report = AnalyzeService::build_report(&analysis, &history, reference);

        let mut sections: Vec<String> = Vec::new();
        if report.candidates.is_empty() {
            sections.push("❌ 공통 가능한 시간이 없습니다.".to_string());
        } else {
            let mut sessions = self.sessions.lock().await;
            sessions.set_candidates(conversation_id, report.candidates.clone());
            let lines: Vec<String> = report
                .normalized_times
                .iter()
                .map(|time| format!("- {}", time))
                .collect();
            sections.push(format!(
                "🧠 분석 완료!\n📅 후보 시간:\n{}\n\n최종 확정을 원하면 /finalize",
                lines.join("\n")
            ));
        }

        match &report.place_keyword {
            Some(keyword) => {
                let places = match self.places.search(keyword).await {
                    Ok(places) => places,
                    Err(err) => {
                        eprintln!("Place search failed: {}", err);
                        Vec::new()
                    }
                };
                if places.is_empty() {
                    sections.push(format!("🔍 '{}' 검색 결과가 없습니다.", keyword));
                } else {
                    sections.push(format!(
                        "📍 '{}' 추천 장소:\n\n{}",
                        keyword,
                        PlaceService::format_places_for_message(&places)
                    ));
                }
            }
            None => sections.push("❗ 장소 정보가 부족합니다.".to_string()),
        }

        sections.join("\n\n")
    }

    async fn handle_finalize(&self, conversation_id: &str, reference: NaiveDate) -> String {
        let (candidates, history) = {
            let sessions = self.sessions.lock().await;
            (
                sessions.candidates(conversation_id),
                sessions.transcript(conversation_id),
            )
        };
        let Some(winner) = consensus::select_final(&candidates, &history) else {
            return "❗ 먼저 /analyze 를 실행하세요.".to_string();
        };
        let winner = winner.to_string();

        let appointment = {
            let mut appointments = self.appointments.lock().await;
            AppointmentService::finalize(&mut appointments, conversation_id, &winner, reference)
        };
        match appointment {
            Ok(appointment) => {
                let mut sessions = self.sessions.lock().await;
                sessions.clear(conversation_id);
                format!(
                    "✅ 최종 약속 시간은 다음과 같습니다:\n🕒 {} {}\n\n리마인더를 원하면 /remind",
                    appointment.date, appointment.time
                )
            }
            Err(FinalizeError::Unparseable(value)) => format!(
                "❌ 확정 시간을 해석하지 못했어요: {}\n/analyze 를 다시 실행해 주세요.",
                value
            ),
            Err(FinalizeError::Store(err)) => {
                format!("⚠️ 약속을 저장하지 못했습니다: {}", err)
            }
        }
    }

    async fn handle_remind(&self, conversation_id: &str) -> String {
        let mut appointments = self.appointments.lock().await;
        match AppointmentService::arm(&mut appointments, conversation_id) {
            Ok(ArmOutcome::Armed) => {
                "🔔 리마인더를 설정했어요! 약속 전날과 당일 아침 9시에 알려드릴게요.".to_string()
            }
            Ok(ArmOutcome::AlreadyArmed) => "이미 리마인더가 켜져 있어요.".to_string(),
            Ok(ArmOutcome::NoAppointment) => {
                "❗ 확정된 약속이 없습니다. 먼저 /finalize 를 실행하세요.".to_string()
            }
            Err(err) => format!("⚠️ 리마인더 설정을 저장하지 못했습니다: {}", err),
        }
    }

    async fn handle_remind_off(&self, conversation_id: &str) -> String {
        let mut appointments = self.appointments.lock().await;
        match AppointmentService::disarm(&mut appointments, conversation_id) {
            Ok(DisarmOutcome::Disarmed) => "🔕 리마인더를 껐어요.".to_string(),
            Ok(DisarmOutcome::AlreadyDisarmed) => "리마인더가 이미 꺼져 있어요.".to_string(),
            Ok(DisarmOutcome::NoAppointment) => {
                "❗ 확정된 약속이 없습니다. 먼저 /finalize 를 실행하세요.".to_string()
            }
            Err(err) => format!("⚠️ 리마인더 설정을 저장하지 못했습니다: {}", err),
        }
    }

    async fn handle_reminders(&self, conversation_id: &str) -> String {
        let appointments = self.appointments.lock().await;
        match AppointmentService::get(&appointments, conversation_id) {
            Some(appointment) => {
                let state = if appointment.reminder_enabled {
                    "켜짐 🔔"
                } else {
                    "꺼짐 🔕"
                };
                format!(
                    "📋 확정된 약속: {} {}\n리마인더: {}",
                    appointment.date, appointment.time, state
                )
            }
            None => "등록된 약속이 없습니다.".to_string(),
        }
    }
}

#[async_trait]
impl EventHandler for BotHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        println!("{} is connected!", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let conversation_id = msg.channel_id.to_string();
        let reply = self
            .handle_text(
                &conversation_id,
                &msg.author.name,
                &msg.content,
                Self::today(),
            )
            .await;
        if let Some(reply) = reply {
            if let Err(why) = msg.channel_id.say(&ctx.http, reply).await {
                eprintln!("Error sending message: {:?}", why);
            }
        }
    }
}
