use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Asia::Seoul;
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::models::appointment::{Appointment, get_db_location};
use crate::storage::{DB, save_db};

pub const TICK_SECONDS: u64 = 60;

/// Both reminders fire at 09:00 local time, Asia/Seoul.
const REMINDER_HOUR: u32 = 9;

/// Appointments linger one hour past their scheduled instant before expiry.
const EXPIRY_GRACE_HOURS: i64 = 1;

#[async_trait]
pub trait ReminderSender: Send + Sync {
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), String>;
}

pub struct DiscordSender {
    token: String,
}

impl DiscordSender {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl ReminderSender for DiscordSender {
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), String> {
        let channel = channel_id
            .parse::<u64>()
            .map(ChannelId::new)
            .map_err(|_| "Failed to parse channel id".to_string())?;
        let http: Http = Http::new(&self.token);
        channel
            .say(&http, content)
            .await
            .map_err(|e| format!("Error sending message: {:?}", e))?;
        Ok(())
    }
}

pub async fn run_reminder_loop(db: Arc<Mutex<DB<Appointment>>>, client_secret: Arc<String>) {
    let sender = DiscordSender::new(client_secret.to_string());
    loop {
        sleep(std::time::Duration::from_secs(TICK_SECONDS)).await;
        let mut db = db.lock().await;
        if let Err(err) = reminder_tick(&mut db, &sender, Utc::now()).await {
            eprintln!("Reminder tick failed: {}", err);
        }
    }
}

fn nine_am(date: NaiveDate) -> Option<DateTime<Utc>> {
    let local = date.and_time(NaiveTime::from_hms_opt(REMINDER_HOUR, 0, 0)?);
    Some(Seoul.from_local_datetime(&local).single()?.with_timezone(&Utc))
}

/// One pass over every appointment: fire due reminders (each exactly once,
/// guarded by the sent-flags), then expire anything past its grace period,
/// armed or not. The snapshot is rewritten at the end of every tick.
///
/// A flag is only set after its message went out, so a failed send is
/// retried on the next tick.
pub async fn reminder_tick<S: ReminderSender + ?Sized>(
    db: &mut DB<Appointment>,
    sender: &S,
    now: DateTime<Utc>,
) -> Result<(), String> {
    let mut expired: Vec<String> = Vec::new();
    for (conversation_id, appointment) in db.iter_mut() {
        let Some(scheduled_at) = appointment.scheduled_at() else {
            eprintln!(
                "Appointment for {} has an unreadable date '{}', skipping.",
                conversation_id, appointment.date
            );
            continue;
        };
        if now > scheduled_at + Duration::hours(EXPIRY_GRACE_HOURS) {
            expired.push(conversation_id.clone());
            continue;
        }
        if !appointment.reminder_enabled {
            continue;
        }

        // scheduled_at above guarantees the date label parses.
        let Some(date) = appointment.scheduled_date() else {
            continue;
        };

        if !appointment.pre_day_reminder_sent {
            if let Some(trigger) = nine_am(date - Duration::days(1)) {
                if now >= trigger {
                    let body = format!(
                        "⏰ 리마인더: 내일 {} {} 약속이 있어요!",
                        appointment.date, appointment.time
                    );
                    sender.send_message(conversation_id, &body).await?;
                    appointment.pre_day_reminder_sent = true;
                }
            }
        }

        if !appointment.same_day_reminder_sent {
            if let Some(trigger) = nine_am(date) {
                if now >= trigger {
                    let body = format!(
                        "⏰ 리마인더: 오늘 {} {} 약속이 있습니다. 잊지 마세요!",
                        appointment.date, appointment.time
                    );
                    sender.send_message(conversation_id, &body).await?;
                    appointment.same_day_reminder_sent = true;
                }
            }
        }
    }

    for conversation_id in expired {
        println!("Appointment for {} has passed. expiring", conversation_id);
        db.remove(conversation_id.as_str());
    }

    save_db(&get_db_location(), db).map_err(|e| e.to_string())?;
    Ok(())
}
