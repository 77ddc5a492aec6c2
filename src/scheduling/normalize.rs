use chrono::NaiveDate;

use super::ScheduleError;
use super::calendar::{self, DAY_AFTER_TOMORROW, TODAY, TOMORROW, WEEKDAYS};

/// Used when a day-only candidate has no time expression anywhere in the
/// transcript.
pub const DEFAULT_TIME: &str = "17:00";

/// Normalizes one analyzer candidate into the canonical display time string.
///
/// Shapes are tried in a fixed priority order:
/// 1. "Y년 M월 D일 <token> HH:MM" passes through unchanged,
/// 2. "<dayToken> <time>" resolves the day and keeps the time,
/// 3. a bare day token resolves the day and pulls the time from the most
///    recent transcript message that mentions one, defaulting to 17:00.
///
/// `history` is the transcript in arrival order; the time search walks it
/// newest-first.
pub fn normalize_candidate(
    candidate: &str,
    history: &[String],
    reference: NaiveDate,
) -> Result<String, ScheduleError> {
    let candidate = candidate.trim();

    if is_fully_qualified(candidate) {
        return Ok(candidate.to_string());
    }

    if let Some((day_token, time_part)) = candidate.split_once(char::is_whitespace) {
        if let Ok(resolved) = calendar::resolve_day_token(day_token, reference) {
            if let Some(time) = parse_time_part(time_part) {
                return Ok(format!("{} {}", resolved.label, time));
            }
        }
    }

    let Some(day_token) = find_day_token(candidate) else {
        return Err(ScheduleError::InvalidWeekdayToken(candidate.to_string()));
    };
    let resolved = calendar::resolve_day_token(day_token, reference)?;
    let time = history
        .iter()
        .rev()
        .find_map(|message| find_time_in_text(message))
        .unwrap_or_else(|| DEFAULT_TIME.to_string());
    Ok(format!("{} {}", resolved.label, time))
}

/// "2025년 7월 3일 목요일 19:00" and friends. Five tokens, the first three
/// carrying 년/월/일 suffixes, the last a clock time.
pub fn is_fully_qualified(candidate: &str) -> bool {
    let tokens: Vec<&str> = candidate.split_whitespace().collect();
    if tokens.len() != 5 {
        return false;
    }
    numeric_prefix(tokens[0], '년').is_some()
        && numeric_prefix(tokens[1], '월').is_some()
        && numeric_prefix(tokens[2], '일').is_some()
        && parse_hhmm(tokens[4]).is_some()
}

fn numeric_prefix(token: &str, suffix: char) -> Option<u32> {
    token.strip_suffix(suffix)?.parse().ok()
}

/// First day token contained in the text: weekday literals in week order,
/// then 오늘/내일/모레. Multi-day candidates are not disambiguated beyond
/// the first match.
pub fn find_day_token(text: &str) -> Option<&'static str> {
    WEEKDAYS
        .iter()
        .chain([TODAY, TOMORROW, DAY_AFTER_TOMORROW].iter())
        .find(|token| text.contains(**token))
        .copied()
}

pub fn parse_hhmm(token: &str) -> Option<(u32, u32)> {
    let (hour, minute) = token.split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour < 24 && minute < 60 {
        Some((hour, minute))
    } else {
        None
    }
}

/// Time part of a "<dayToken> <time>" candidate: "19:00", a bare hour
/// number, "7시", or "7시 반".
fn parse_time_part(part: &str) -> Option<String> {
    let part = part.trim();
    if let Some((hour, minute)) = parse_hhmm(part) {
        return Some(format!("{:02}:{:02}", hour, minute));
    }
    if let Ok(hour) = part.parse::<u32>() {
        if hour < 24 {
            return Some(format!("{:02}:00", hour));
        }
    }
    find_time_in_text(part)
}

/// Earliest clock expression in a chat message: "N시 반" is half past,
/// "N시" is on the hour, "HH:MM" is taken as written.
pub fn find_time_in_text(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let digits: String = chars[start..i].iter().collect();
        let Ok(hour) = digits.parse::<u32>() else {
            continue;
        };
        if hour >= 24 {
            continue;
        }
        match chars.get(i) {
            Some(':') => {
                let minute_start = i + 1;
                let mut j = minute_start;
                while j < chars.len() && chars[j].is_ascii_digit() {
                    j += 1;
                }
                let minutes: String = chars[minute_start..j].iter().collect();
                if let Ok(minute) = minutes.parse::<u32>() {
                    if minute < 60 {
                        return Some(format!("{:02}:{:02}", hour, minute));
                    }
                }
                i = j;
            }
            Some('시') => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                let minute = if chars.get(j) == Some(&'반') { 30 } else { 0 };
                return Some(format!("{:02}:{:02}", hour, minute));
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDate {
        // A Tuesday.
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    #[test]
    fn fully_qualified_candidate_is_unchanged() {
        let canonical = "2025년 7월 3일 목요일 19:00";
        let normalized = normalize_candidate(canonical, &[], reference()).unwrap();
        assert_eq!(normalized, canonical);
    }

    #[test]
    fn day_and_clock_time() {
        let normalized = normalize_candidate("목요일 19:00", &[], reference()).unwrap();
        assert_eq!(normalized, "2025년 7월 3일 목요일 19:00");
    }

    #[test]
    fn day_and_bare_hour() {
        let normalized = normalize_candidate("금요일 18", &[], reference()).unwrap();
        assert_eq!(normalized, "2025년 7월 4일 금요일 18:00");
    }

    #[test]
    fn day_and_hour_marker() {
        let normalized = normalize_candidate("금요일 6시 반", &[], reference()).unwrap();
        assert_eq!(normalized, "2025년 7월 4일 금요일 06:30");
    }

    #[test]
    fn day_only_pulls_time_from_newest_message() {
        let history = vec![
            "목요일 7시 어때".to_string(),
            "아니 8시 반이 낫겠다".to_string(),
        ];
        let normalized = normalize_candidate("목요일", &history, reference()).unwrap();
        assert_eq!(normalized, "2025년 7월 3일 목요일 08:30");
    }

    #[test]
    fn day_only_defaults_without_time_mentions() {
        let history = vec!["목요일 괜찮아".to_string()];
        let normalized = normalize_candidate("목요일", &history, reference()).unwrap();
        assert_eq!(normalized, "2025년 7월 3일 목요일 17:00");
    }

    #[test]
    fn first_weekday_literal_wins() {
        let normalized = normalize_candidate("수요일이나 목요일", &[], reference()).unwrap();
        assert!(normalized.ends_with("수요일 17:00"));
    }

    #[test]
    fn tomorrow_token_resolves() {
        let normalized = normalize_candidate("내일 저녁", &[], reference()).unwrap();
        assert_eq!(normalized, "2025년 7월 2일 내일 17:00");
    }

    #[test]
    fn unrecognized_candidate_is_an_error() {
        let err = normalize_candidate("언젠가 한번", &[], reference()).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidWeekdayToken(_)));
    }

    #[test]
    fn clock_scan_prefers_earliest_expression() {
        assert_eq!(find_time_in_text("19:00 말고 7시"), Some("19:00".to_string()));
        assert_eq!(find_time_in_text("7시 말고 19:00"), Some("07:00".to_string()));
        assert_eq!(find_time_in_text("6시반 좋다"), Some("06:30".to_string()));
        assert_eq!(find_time_in_text("시간은 아직"), None);
    }
}
