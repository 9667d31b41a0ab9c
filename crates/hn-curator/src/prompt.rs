/// Build the relevance prompt for one post.
///
/// The worked example biases the model towards answering with a bare JSON object.
pub fn build_prompt(profile: &str, title: &str, url: &str) -> String {
    format!(
        r#"Based on the following user interest profile, evaluate the relevance of
the provided Hacker News article.

User Interest Profile:
{profile}

Hacker News Article:
Title: "{title}"
URL: "{url}"

Please provide your evaluation in a JSON format.
The JSON should contain:
1.  `relevance_score`: An integer from 1 (not relevant) to 10 (highly relevant).
2.  `summary`: A concise one-sentence summary of what the article is about, focusing on its relevance to the user's interests.
3.  `reasoning`: A very brief explanation for the score.

Example output format:
{{
    "relevance_score": 8,
    "summary": "This article discusses new advancements in LLM fine-tuning techniques relevant to AI engineers.",
    "reasoning": "Directly relates to LLMs and practical AI applications."
}}
"#
    )
}
