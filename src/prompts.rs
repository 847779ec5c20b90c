//! The fixed analysis prompt sent to the model.
//!
//! Keeping the template here (rather than inline in the pipeline) lets tests
//! inspect it directly without a model behind it.

/// The five sections the model is asked to produce, in prompt order.
pub const SECTION_LABELS: [&str; 5] = [
    "Key Questions Identified",
    "Management Tone & Sentiment",
    "Critical Trends",
    "Actionable Investor Insights",
    "Forward-looking Growth Indicators",
];

const PROMPT_HEAD: &str = "Analyze this earnings call transcript professionally:\n\nTranscript: ";

const PROMPT_TAIL: &str = r#"

Provide a structured analysis with:
1. Key Questions Identified
2. Management Tone & Sentiment
3. Critical Trends
4. Actionable Investor Insights
5. Forward-looking Growth Indicators

Respond in a clear, concise JSON format with each section well-explained in short"#;

/// Embed `transcript` into the analysis template.
///
/// The transcript is inserted verbatim as one contiguous block; no escaping or
/// placeholder substitution is performed on it.
pub fn build_prompt(transcript: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_HEAD.len() + transcript.len() + PROMPT_TAIL.len());
    prompt.push_str(PROMPT_HEAD);
    prompt.push_str(transcript);
    prompt.push_str(PROMPT_TAIL);
    prompt
}
