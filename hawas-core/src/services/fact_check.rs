//! Citation lookup for the results view.

use crate::question::{FactCheck, FactSource, Question};
use async_trait::async_trait;
use claude::Claude;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FactCheckError {
    #[error("Claude request failed: {0}")]
    Claude(#[from] claude::Error),

    #[error("no citation found in response")]
    NoCitation,

    #[error("citation is malformed: {0}")]
    Malformed(String),
}

/// Finds a source backing the explanation of a question.
///
/// `Ok(None)` means there is nothing to show; the results view then leaves
/// the fact-check area empty.
#[async_trait]
pub trait FactChecker: Send + Sync {
    async fn check(&self, question: &Question) -> Result<Option<FactCheck>, FactCheckError>;
}

/// Uses the source authored with the question, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFactChecker;

#[async_trait]
impl FactChecker for SourceFactChecker {
    async fn check(&self, question: &Question) -> Result<Option<FactCheck>, FactCheckError> {
        Ok(question.source.clone().map(FactCheck::from))
    }
}

const FACT_CHECK_SYSTEM_PROMPT: &str = "You verify trivia explanations. Reply with a single JSON \
object of the form {\"title\": \"...\", \"url\": \"https://...\"} naming one reputable public \
source that supports the explanation. Reply with nothing else.";

const FACT_CHECK_MAX_TOKENS: usize = 300;

/// Prefers the authored source, otherwise asks Claude for one.
#[derive(Clone)]
pub struct ClaudeFactChecker {
    client: Claude,
}

#[derive(Debug, Deserialize)]
struct Citation {
    title: String,
    url: String,
}

impl ClaudeFactChecker {
    pub fn new(client: Claude) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self, FactCheckError> {
        Ok(Self::new(Claude::from_env()?))
    }

    fn prompt(question: &Question) -> String {
        let statements = question
            .statements
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Statements:\n{statements}\n\nThe invented statement is number {}.\nExplanation: {}",
            question.correct_answer + 1,
            question.explanation
        )
    }
}

/// Pull a `{title, url}` citation out of free-form model output.
pub fn parse_citation(text: &str) -> Result<FactSource, FactCheckError> {
    let start = text.find('{').ok_or(FactCheckError::NoCitation)?;
    let end = text.rfind('}').ok_or(FactCheckError::NoCitation)?;
    if end < start {
        return Err(FactCheckError::NoCitation);
    }

    let citation: Citation = serde_json::from_str(&text[start..=end])
        .map_err(|e| FactCheckError::Malformed(e.to_string()))?;

    let title = citation.title.trim();
    let url = citation.url.trim();
    if title.is_empty() {
        return Err(FactCheckError::Malformed("empty title".to_string()));
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(FactCheckError::Malformed(format!("not a web link: {url}")));
    }

    Ok(FactSource {
        title: title.to_string(),
        url: url.to_string(),
    })
}

#[async_trait]
impl FactChecker for ClaudeFactChecker {
    async fn check(&self, question: &Question) -> Result<Option<FactCheck>, FactCheckError> {
        if let Some(source) = &question.source {
            return Ok(Some(FactCheck::from(source.clone())));
        }

        let text = self
            .client
            .ask(
                FACT_CHECK_SYSTEM_PROMPT,
                Self::prompt(question),
                FACT_CHECK_MAX_TOKENS,
            )
            .await?;
        let source = parse_citation(&text)?;
        tracing::debug!(url = %source.url, "fact check resolved");
        Ok(Some(source.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_citation_with_surrounding_text() {
        let source = parse_citation(
            "Here you go:\n{\"title\": \"Britannica: Papyrus\", \"url\": \"https://www.britannica.com/topic/papyrus\"}\nThanks",
        )
        .unwrap();
        assert_eq!(source.title, "Britannica: Papyrus");
        assert_eq!(source.url, "https://www.britannica.com/topic/papyrus");
    }

    #[test]
    fn test_parse_citation_rejects_bad_output() {
        assert!(matches!(
            parse_citation("no json here"),
            Err(FactCheckError::NoCitation)
        ));
        assert!(matches!(
            parse_citation("{\"title\": \"x\"}"),
            Err(FactCheckError::Malformed(_))
        ));
        assert!(matches!(
            parse_citation("{\"title\": \"x\", \"url\": \"javascript:alert(1)\"}"),
            Err(FactCheckError::Malformed(_))
        ));
        assert!(matches!(
            parse_citation("} backwards {"),
            Err(FactCheckError::NoCitation)
        ));
    }

    #[tokio::test]
    async fn test_source_checker_uses_authored_source() {
        let plain = Question::new(vec!["a".into(), "b".into()], 0, "e").unwrap();
        assert_eq!(SourceFactChecker.check(&plain).await.unwrap(), None);

        let sourced = plain.with_source("Title", "https://example.org");
        assert_eq!(
            SourceFactChecker.check(&sourced).await.unwrap(),
            Some(FactCheck::Resolved {
                title: "Title".into(),
                url: "https://example.org".into()
            })
        );
    }
}
