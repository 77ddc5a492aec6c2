use chrono::NaiveDate;

use crate::clients::openai_client::{DialogueAnalysis, LocationMention, Sentiment};
use crate::models::session::MAX_CANDIDATES;
use crate::scheduling::normalize::normalize_candidate;

/// What one analysis pass produces for a conversation: the normalized echo
/// lines shown in chat, the raw candidate strings kept for finalize
/// matching, and an optional venue-search keyword.
#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub normalized_times: Vec<String>,
    pub candidates: Vec<String>,
    pub place_keyword: Option<String>,
}

pub struct AnalyzeService;

impl AnalyzeService {
    pub fn build_report(
        analysis: &DialogueAnalysis,
        history: &[String],
        reference: NaiveDate,
    ) -> AnalysisReport {
        let mut normalized_times = Vec::new();
        let mut candidates = Vec::new();
        for candidate in &analysis.available_times {
            if candidates.len() == MAX_CANDIDATES {
                break;
            }
            match normalize_candidate(candidate, history, reference) {
                Ok(normalized) => {
                    normalized_times.push(normalized);
                    candidates.push(candidate.clone());
                }
                Err(err) => eprintln!("Skipping candidate '{}': {}", candidate, err),
            }
        }

        AnalysisReport {
            normalized_times,
            candidates,
            place_keyword: place_keyword(&analysis.locations),
        }
    }
}

/// Venue keyword from the location mentions: positive and neutral mentions
/// only, 역/앞 suffixes dropped, the most frequent mention wins, and the
/// search always asks for a quiet cafe nearby.
fn place_keyword(locations: &[LocationMention]) -> Option<String> {
    let cleaned: Vec<String> = locations
        .iter()
        .filter(|mention| mention.sentiment != Sentiment::Negative)
        .map(|mention| {
            mention
                .location
                .replace('역', "")
                .replace('앞', "")
                .trim()
                .to_string()
        })
        .filter(|location| !location.is_empty())
        .collect();

    let mut best: Option<(&str, usize)> = None;
    for location in &cleaned {
        let count = cleaned.iter().filter(|other| *other == location).count();
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((location, count));
        }
    }
    best.map(|(location, _)| format!("{} 조용한 카페", location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::openai_client::Sentiment;

    fn reference() -> NaiveDate {
        // A Tuesday.
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    fn mention(location: &str, sentiment: Sentiment) -> LocationMention {
        LocationMention {
            sentence: format!("{} 어때", location),
            location: location.to_string(),
            sentiment,
        }
    }

    #[test]
    fn report_normalizes_and_caches_candidates() {
        let analysis = DialogueAnalysis {
            available_times: vec!["목요일 19:00".to_string(), "언젠가".to_string()],
            locations: vec![],
        };
        let report = AnalyzeService::build_report(&analysis, &[], reference());

        assert_eq!(
            report.normalized_times,
            vec!["2025년 7월 3일 목요일 19:00".to_string()]
        );
        // The cache keeps the analyzer's raw strings for chat matching.
        assert_eq!(report.candidates, vec!["목요일 19:00".to_string()]);
    }

    #[test]
    fn report_caps_candidates() {
        let analysis = DialogueAnalysis {
            available_times: (0..6).map(|i| format!("목요일 1{}:00", i)).collect(),
            locations: vec![],
        };
        let report = AnalyzeService::build_report(&analysis, &[], reference());
        assert_eq!(report.candidates.len(), MAX_CANDIDATES);
    }

    #[test]
    fn keyword_counts_agreeable_mentions() {
        let locations = vec![
            mention("홍대역", Sentiment::Positive),
            mention("혜화", Sentiment::Negative),
            mention("홍대", Sentiment::Neutral),
            mention("강남", Sentiment::Positive),
        ];
        assert_eq!(
            place_keyword(&locations),
            Some("홍대 조용한 카페".to_string())
        );
    }

    #[test]
    fn keyword_absent_without_usable_mentions() {
        let locations = vec![mention("혜화", Sentiment::Negative)];
        assert_eq!(place_keyword(&locations), None);
        assert_eq!(place_keyword(&[]), None);
    }
}
