use std::collections::HashMap;
use std::env;
use std::sync::{Mutex, OnceLock};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex as TokioMutex;
use yaksokBot::clients::naver_client::{Place, PlaceSearch};
use yaksokBot::clients::openai_client::{
    DialogueAnalysis, DialogueAnalyzer, LocationMention, Sentiment,
};
use yaksokBot::handlers::discord::BotHandler;
use yaksokBot::models::appointment::Appointment;
use yaksokBot::models::session::SessionStore;
use yaksokBot::storage::DB;

struct FakeAnalyzer {
    analysis: Result<DialogueAnalysis, String>,
}

#[serenity::async_trait]
impl DialogueAnalyzer for FakeAnalyzer {
    async fn analyze(
        &self,
        _texts: &[String],
    ) -> Result<DialogueAnalysis, Box<dyn std::error::Error + Send + Sync>> {
        match &self.analysis {
            Ok(analysis) => Ok(analysis.clone()),
            Err(err) => Err(err.clone().into()),
        }
    }
}

struct FakePlaces {
    places: Vec<Place>,
}

#[serenity::async_trait]
impl PlaceSearch for FakePlaces {
    async fn search(
        &self,
        _keyword: &str,
    ) -> Result<Vec<Place>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.places.clone())
    }
}

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn with_temp_db_location() -> std::sync::MutexGuard<'static, ()> {
    let guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
    let temp_dir = env::temp_dir().join(format!("yaksokbot_e2e_{}", uuid::Uuid::new_v4()));
    unsafe {
        env::set_var("DB_LOCATION", &temp_dir);
    }
    guard
}

fn reference() -> NaiveDate {
    // A Tuesday; the following Thursday is 2025-07-03.
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

fn build_handler(
    analysis: Result<DialogueAnalysis, String>,
    places: Vec<Place>,
) -> (BotHandler, Arc<TokioMutex<DB<Appointment>>>, Arc<TokioMutex<SessionStore>>) {
    let sessions = Arc::new(TokioMutex::new(SessionStore::new()));
    let appointments = Arc::new(TokioMutex::new(HashMap::new()));
    let handler = BotHandler::new(
        sessions.clone(),
        appointments.clone(),
        Arc::new(FakeAnalyzer { analysis }),
        Arc::new(FakePlaces { places }),
    );
    (handler, appointments, sessions)
}

fn single_candidate_analysis() -> DialogueAnalysis {
    DialogueAnalysis {
        available_times: vec!["목요일 19:00".to_string()],
        locations: vec![],
    }
}

#[tokio::test]
async fn analyze_finalize_remind_round_trip() {
    let _guard = with_temp_db_location();
    let (handler, appointments, sessions) =
        build_handler(Ok(single_candidate_analysis()), Vec::new());

    for (author, text) in [
        ("민수", "목요일 괜찮아"),
        ("지연", "나도 목요일 7시 괜찮아"),
        ("현우", "그럼 목요일 19:00 콜"),
    ] {
        let reply = handler.handle_text("123", author, text, reference()).await;
        assert!(reply.is_none());
    }

    let analyze_reply = handler
        .handle_text("123", "민수", "/analyze", reference())
        .await
        .unwrap();
    assert!(analyze_reply.contains("🧠 분석 완료!"));
    assert!(analyze_reply.contains("- 2025년 7월 3일 목요일 19:00"));

    let finalize_reply = handler
        .handle_text("123", "민수", "/finalize", reference())
        .await
        .unwrap();
    assert!(finalize_reply.contains("✅ 최종 약속 시간"));

    {
        let appointments = appointments.lock().await;
        let appointment = appointments.get("123").unwrap();
        assert_eq!(appointment.date, "2025년 7월 3일 목요일");
        assert_eq!(appointment.time, "19:00");
        assert!(!appointment.reminder_enabled);
    }
    {
        // Finalize consumed the transcript and candidate cache.
        let sessions = sessions.lock().await;
        assert!(sessions.transcript("123").is_empty());
        assert!(sessions.candidates("123").is_empty());
    }

    let remind_reply = handler
        .handle_text("123", "민수", "/remind", reference())
        .await
        .unwrap();
    assert!(remind_reply.contains("🔔"));
    {
        let appointments = appointments.lock().await;
        assert!(appointments.get("123").unwrap().reminder_enabled);
    }

    let status_reply = handler
        .handle_text("123", "민수", "/reminders", reference())
        .await
        .unwrap();
    assert!(status_reply.contains("2025년 7월 3일 목요일 19:00"));
    assert!(status_reply.contains("켜짐"));
}

#[tokio::test]
async fn finalize_picks_most_recently_reconfirmed_candidate() {
    let _guard = with_temp_db_location();
    let analysis = DialogueAnalysis {
        available_times: vec!["목요일 17:00".to_string(), "금요일 18:30".to_string()],
        locations: vec![],
    };
    let (handler, appointments, _sessions) = build_handler(Ok(analysis), Vec::new());

    for (author, text) in [
        ("민수", "목요일 17:00 어때"),
        ("지연", "금요일 18:30 콜"),
    ] {
        handler.handle_text("123", author, text, reference()).await;
    }
    handler
        .handle_text("123", "민수", "/analyze", reference())
        .await
        .unwrap();
    handler
        .handle_text("123", "민수", "/finalize", reference())
        .await
        .unwrap();

    let appointments = appointments.lock().await;
    let appointment = appointments.get("123").unwrap();
    assert_eq!(appointment.date, "2025년 7월 4일 금요일");
    assert_eq!(appointment.time, "18:30");
}

#[tokio::test]
async fn analyzer_failure_degrades_to_no_results() {
    let _guard = with_temp_db_location();
    let (handler, appointments, _sessions) = build_handler(Err("boom".to_string()), Vec::new());

    handler
        .handle_text("123", "민수", "목요일 괜찮아", reference())
        .await;
    let reply = handler
        .handle_text("123", "민수", "/analyze", reference())
        .await
        .unwrap();

    assert!(reply.contains("❌ 공통 가능한 시간이 없습니다."));
    assert!(reply.contains("❗ 장소 정보가 부족합니다."));
    assert!(appointments.lock().await.is_empty());
}

#[tokio::test]
async fn analyze_recommends_places_for_agreeable_mentions() {
    let _guard = with_temp_db_location();
    let analysis = DialogueAnalysis {
        available_times: vec!["목요일 19:00".to_string()],
        locations: vec![LocationMention {
            sentence: "홍대 괜찮네".to_string(),
            location: "홍대역".to_string(),
            sentiment: Sentiment::Positive,
        }],
    };
    let places = vec![Place {
        title: "<b>카페</b> 온도".to_string(),
        address: "서울 마포구 어딘가 12".to_string(),
        link: "https://example.com/1".to_string(),
        telephone: None,
    }];
    let (handler, _appointments, _sessions) = build_handler(Ok(analysis), places);

    handler
        .handle_text("123", "민수", "목요일 홍대 괜찮네", reference())
        .await;
    let reply = handler
        .handle_text("123", "민수", "/analyze", reference())
        .await
        .unwrap();

    assert!(reply.contains("📍 '홍대 조용한 카페' 추천 장소:"));
    assert!(reply.contains("1. 카페 온도"));
}

#[tokio::test]
async fn commands_out_of_sequence_report_state() {
    let _guard = with_temp_db_location();
    let (handler, _appointments, _sessions) =
        build_handler(Ok(single_candidate_analysis()), Vec::new());

    let reply = handler
        .handle_text("123", "민수", "/analyze", reference())
        .await
        .unwrap();
    assert_eq!(reply, "❗ 분석할 대화가 없습니다.");

    let reply = handler
        .handle_text("123", "민수", "/finalize", reference())
        .await
        .unwrap();
    assert_eq!(reply, "❗ 먼저 /analyze 를 실행하세요.");

    let reply = handler
        .handle_text("123", "민수", "/remind", reference())
        .await
        .unwrap();
    assert_eq!(reply, "❗ 확정된 약속이 없습니다. 먼저 /finalize 를 실행하세요.");

    let reply = handler
        .handle_text("123", "민수", "/reminders", reference())
        .await
        .unwrap();
    assert_eq!(reply, "등록된 약속이 없습니다.");
}

#[tokio::test]
async fn clear_resets_conversation_and_appointment() {
    let _guard = with_temp_db_location();
    let (handler, appointments, _sessions) =
        build_handler(Ok(single_candidate_analysis()), Vec::new());

    handler
        .handle_text("123", "민수", "목요일 19:00 콜", reference())
        .await;
    handler
        .handle_text("123", "민수", "/analyze", reference())
        .await;
    handler
        .handle_text("123", "민수", "/finalize", reference())
        .await;
    assert_eq!(appointments.lock().await.len(), 1);

    let reply = handler
        .handle_text("123", "민수", "/clear", reference())
        .await
        .unwrap();
    assert_eq!(reply, "🧹 대화 기록이 초기화되었습니다!");
    assert!(appointments.lock().await.is_empty());

    let reply = handler
        .handle_text("123", "민수", "/reminders", reference())
        .await
        .unwrap();
    assert_eq!(reply, "등록된 약속이 없습니다.");
}

#[tokio::test]
async fn conversations_are_isolated_by_id() {
    let _guard = with_temp_db_location();
    let (handler, appointments, _sessions) =
        build_handler(Ok(single_candidate_analysis()), Vec::new());

    handler
        .handle_text("123", "민수", "목요일 19:00 콜", reference())
        .await;
    handler
        .handle_text("123", "민수", "/analyze", reference())
        .await;
    handler
        .handle_text("123", "민수", "/finalize", reference())
        .await;

    let reply = handler
        .handle_text("456", "지연", "/reminders", reference())
        .await
        .unwrap();
    assert_eq!(reply, "등록된 약속이 없습니다.");
    assert_eq!(appointments.lock().await.len(), 1);
}
