pub mod naver_client;
pub mod openai_client;
