use std::collections::HashMap;

/// Analysis keeps at most this many candidate times per conversation.
pub const MAX_CANDIDATES: usize = 4;

#[derive(Debug, Clone)]
pub struct Utterance {
    pub author: String,
    pub text: String,
}

/// Per-conversation transcripts and candidate caches, keyed by the opaque
/// conversation id. All access goes through this store; it lives behind one
/// mutex for the whole process (see runtime).
#[derive(Debug, Default)]
pub struct SessionStore {
    dialogues: HashMap<String, Vec<Utterance>>,
    candidates: HashMap<String, Vec<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_utterance(&mut self, conversation_id: &str, author: &str, text: &str) {
        self.dialogues
            .entry(conversation_id.to_string())
            .or_default()
            .push(Utterance {
                author: author.to_string(),
                text: text.to_string(),
            });
    }

    /// Message texts in arrival order.
    pub fn transcript(&self, conversation_id: &str) -> Vec<String> {
        self.dialogues
            .get(conversation_id)
            .map(|utterances| utterances.iter().map(|u| u.text.clone()).collect())
            .unwrap_or_default()
    }

    /// Replaces the candidate cache from the latest analysis pass.
    pub fn set_candidates(&mut self, conversation_id: &str, mut candidates: Vec<String>) {
        candidates.truncate(MAX_CANDIDATES);
        self.candidates
            .insert(conversation_id.to_string(), candidates);
    }

    pub fn candidates(&self, conversation_id: &str) -> Vec<String> {
        self.candidates
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Drops the transcript and candidate cache. Used both by an explicit
    /// reset and after a successful finalize.
    pub fn clear(&mut self, conversation_id: &str) {
        self.dialogues.remove(conversation_id);
        self.candidates.remove(conversation_id);
    }
}
