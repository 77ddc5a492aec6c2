use serde::{Deserialize, Serialize};
use serenity::async_trait;

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[serde(other)]
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationMention {
    pub sentence: String,
    pub location: String,
    pub sentiment: Sentiment,
}

/// Structured result of one dialogue analysis pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueAnalysis {
    #[serde(default)]
    pub available_times: Vec<String>,
    #[serde(default)]
    pub locations: Vec<LocationMention>,
}

#[async_trait]
pub trait DialogueAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        texts: &[String],
    ) -> Result<DialogueAnalysis, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct OpenAIAnalyzer {
    api_key: String,
}

impl OpenAIAnalyzer {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }

    fn build_prompt(texts: &[String]) -> String {
        let mut prompt = String::from(
            "다음은 사람들이 나눈 단체 대화입니다. 이 대화를 바탕으로 아래 두 가지 정보를 추출해 주세요:\n\n\
             1. 시간 (available_times): 대화에서 실제로 언급된 표현을 기반으로, \
             모든 참여자가 동의한 가능한 시간대가 여러 개 있다면 모두 추출해 주세요. \
             '오후', '6시 이후', '저녁쯤' 같은 추상적인 표현은 해석하여 포함해 주세요. \
             예: '목요일 오후' → '목요일 15:00', '금요일 6시 이후' → '금요일 18:00'.\n\n\
             2. 장소 (locations): 장소와 관련된 표현에서 장소 키워드(location)와 \
             감정(sentiment: positive, negative, neutral)을 추출해 주세요. \
             장소가 없는 문장은 제외하고, 가능한 간결한 장소명으로 정리해 주세요.\n\n\
             결과는 다음 JSON 형식으로만 반환해 주세요. 설명이나 코드 블록 없이 JSON 본문만 출력합니다:\n\
             {\n\
             \"available_times\": [\"수요일 18:00\", \"목요일 오후\"],\n\
             \"locations\": [\n\
             {\"sentence\": \"홍대 괜찮네\", \"location\": \"홍대\", \"sentiment\": \"positive\"}\n\
             ]\n\
             }\n\n\
             아래는 대화입니다:\n",
        );
        for (index, text) in texts.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", index + 1, text));
        }
        prompt
    }
}

#[async_trait]
impl DialogueAnalyzer for OpenAIAnalyzer {
    async fn analyze(
        &self,
        texts: &[String],
    ) -> Result<DialogueAnalysis, Box<dyn std::error::Error + Send + Sync>> {
        let request = OpenAIRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: "너는 단체 대화에서 약속 시간과 장소를 추출하는 전문가야. 항상 JSON 객체 하나만 출력해."
                        .to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(texts),
                },
            ],
            max_tokens: 1500,
            temperature: 0.2,
        };

        let client = reqwest::Client::new();
        let response = client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            println!("Error {}: {}", status, text);
            return Err(format!("Request failed with status {}", status).into());
        }

        let parsed: OpenAIResponse = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse JSON: {}\nRaw body: {}", e, text))?;
        let Some(choice) = parsed.choices.first() else {
            return Err("No response from OpenAI".to_string().into());
        };

        let analysis: DialogueAnalysis = serde_json::from_str(choice.message.content.trim())
            .map_err(|e| format!("Failed to parse analysis JSON: {}", e))?;
        Ok(analysis)
    }
}
