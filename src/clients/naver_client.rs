use serde::Deserialize;
use serenity::async_trait;

const LOCAL_SEARCH_URL: &str = "https://openapi.naver.com/v1/search/local.json";

/// How many venues a search asks for and the chat reply shows.
pub const PLACE_DISPLAY_COUNT: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub title: String,
    pub address: String,
    pub link: String,
    pub telephone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocalSearchItem {
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    address: String,
    #[serde(rename = "roadAddress", default)]
    road_address: String,
    #[serde(default)]
    telephone: String,
}

#[derive(Debug, Deserialize)]
struct LocalSearchResponse {
    #[serde(default)]
    items: Vec<LocalSearchItem>,
}

#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(
        &self,
        keyword: &str,
    ) -> Result<Vec<Place>, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct NaverClient {
    client_id: String,
    client_secret: String,
}

impl NaverClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl PlaceSearch for NaverClient {
    async fn search(
        &self,
        keyword: &str,
    ) -> Result<Vec<Place>, Box<dyn std::error::Error + Send + Sync>> {
        let client = reqwest::Client::new();
        let response = client
            .get(LOCAL_SEARCH_URL)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .query(&[
                ("query", keyword),
                ("display", &PLACE_DISPLAY_COUNT.to_string()),
                ("start", "1"),
                ("sort", "random"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Place search failed with status {}", status).into());
        }

        let parsed: LocalSearchResponse = response.json().await?;
        let places = parsed
            .items
            .into_iter()
            .map(|item| Place {
                title: item.title,
                // Road address is preferred when the API returns both.
                address: if item.road_address.is_empty() {
                    item.address
                } else {
                    item.road_address
                },
                link: item.link,
                telephone: if item.telephone.is_empty() {
                    None
                } else {
                    Some(item.telephone)
                },
            })
            .collect();
        Ok(places)
    }
}
