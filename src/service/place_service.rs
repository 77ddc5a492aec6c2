use crate::clients::naver_client::Place;

pub struct PlaceService;

impl PlaceService {
    /// Numbered venue list for a chat reply. Titles from the search API can
    /// carry <b> highlight tags.
    pub fn format_places_for_message(places: &[Place]) -> String {
        let lines: Vec<String> = places
            .iter()
            .enumerate()
            .map(|(index, place)| {
                format!(
                    "{}. {}\n   - 📌 {}\n   - 🔗 {}",
                    index + 1,
                    strip_bold_tags(&place.title),
                    place.address,
                    place.link
                )
            })
            .collect();
        lines.join("\n")
    }
}

fn strip_bold_tags(title: &str) -> String {
    title.replace("<b>", "").replace("</b>", "")
}
