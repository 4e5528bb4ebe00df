use serde::{Deserialize, Serialize};

/// How long a generated summary should be.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    #[default]
    Short,
    Medium,
    Long,
}

impl SummaryLength {
    /// Instruction appended to the summarization prompt for this length.
    pub fn instruction(&self) -> &'static str {
        match self {
            SummaryLength::Short => {
                "State the core conclusion or most important insight in one or two sharp sentences. \
                 Describe the content itself rather than saying what the article is about."
            }
            SummaryLength::Medium => {
                "Extract the key points, the line of reasoning and any original perspective in three to five sentences, \
                 so that the essence of the article comes across rather than a mere outline."
            }
            SummaryLength::Long => {
                "Write a detailed summary covering the author's central claim, the main supporting arguments, \
                 concrete examples and the conclusion, so a reader understands the substance without reading the original."
            }
        }
    }
}

/// Request body for the `generateContent` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<GenerateContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContent {
    #[serde(default)]
    pub parts: Vec<GeneratePart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePart {
    #[serde(default)]
    pub text: String,
}

/// Response body of the `generateContent` endpoint; only the text path is read.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<GenerateCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCandidate {
    pub content: Option<GenerateContent>,
}
