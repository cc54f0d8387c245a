//! Generate Content Use Case
//!
//! Asks the content-generation client for a block sequence and writes it to
//! the article. The answer must pass the content validator and the content
//! policy in full; nothing is written otherwise.

use std::sync::Arc;

use chrono::Utc;
use kernel::CurrentUser;
use kernel::id::ArticleId;
use serde::Deserialize;

use crate::application::access::load_for_caller;
use crate::application::config::ArticleConfig;
use crate::domain::ai::{AiClient, AiError};
use crate::domain::entity::{Article, ArticleStatus};
use crate::domain::repository::ArticleRepository;
use crate::domain::value_object::{ContentBlock, validate_content};
use crate::error::{ArticleError, ArticleResult};

const MAX_INSTRUCTIONS_LENGTH: usize = 2_000;

#[derive(Debug, Deserialize)]
struct GeneratedContent {
    blocks: Vec<ContentBlock>,
}

/// Generate Content Use Case
pub struct GenerateContentUseCase<A, I>
where
    A: ArticleRepository,
    I: AiClient,
{
    article_repo: Arc<A>,
    ai: Arc<I>,
    config: Arc<ArticleConfig>,
}

impl<A, I> GenerateContentUseCase<A, I>
where
    A: ArticleRepository,
    I: AiClient,
{
    pub fn new(article_repo: Arc<A>, ai: Arc<I>, config: Arc<ArticleConfig>) -> Self {
        Self {
            article_repo,
            ai,
            config,
        }
    }

    pub async fn execute(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
        instructions: &str,
    ) -> ArticleResult<Article> {
        let instructions = instructions.trim();
        if instructions.is_empty() {
            return Err(ArticleError::InvalidInput("instructions are required".into()));
        }
        if instructions.chars().count() > MAX_INSTRUCTIONS_LENGTH {
            return Err(ArticleError::InvalidInput(format!(
                "instructions must be at most {} characters",
                MAX_INSTRUCTIONS_LENGTH
            )));
        }

        let mut article = load_for_caller(self.article_repo.as_ref(), caller, article_id).await?;
        if article.status == ArticleStatus::Deleted {
            return Err(ArticleError::AlreadyDeleted);
        }

        let prompt = content_prompt(&article, instructions);
        let answer = tokio::time::timeout(self.config.ai_timeout, self.ai.complete(&prompt))
            .await
            .map_err(|_| AiError::Timeout)??;

        let blocks = parse_blocks(&answer)?;
        validate_content(&blocks)?;
        if let Err(violation) = self.config.policy.screen_blocks(&blocks) {
            tracing::warn!(
                article_id = %article_id,
                user_id = %caller.user_id,
                pattern = %violation.pattern,
                "Generated content rejected by policy"
            );
            return Err(ArticleError::ContentPolicyViolation);
        }

        let expected_version = article.version;
        article.content = blocks;
        article.updated_at = Utc::now();
        self.article_repo.update(&article, expected_version).await?;
        article.version = expected_version + 1;

        tracing::info!(
            article_id = %article_id,
            user_id = %caller.user_id,
            blocks = article.content.len(),
            "Article content generated"
        );
        Ok(article)
    }
}

fn content_prompt(article: &Article, instructions: &str) -> String {
    format!(
        "You write article bodies as JSON. Answer with one JSON object of the form \
         {{\"blocks\": [...]}} and nothing else. Each block has an integer \"order\" \
         (strictly increasing from 1), a \"type\" and a \"content\" object: \
         heading {{text, level 1-6}}, paragraph {{text}}, image {{url, alt}}, \
         code {{code, language}}, video_embed {{provider, url}}, list {{items}}, \
         divider {{style}}.\n\
         Title: {}\nExcerpt: {}\nLanguage: {}\nInstructions: {}",
        article.title, article.excerpt, article.language, instructions
    )
}

/// Blocks from the first JSON object in the answer, or the whole answer as
/// one paragraph when it carries no JSON. Prose or a code fence around the
/// object is ignored.
fn parse_blocks(answer: &str) -> ArticleResult<Vec<ContentBlock>> {
    let Some(start) = answer.find('{') else {
        let text = answer.trim();
        if text.is_empty() {
            return Err(AiError::EmptyResponse.into());
        }
        return Ok(vec![ContentBlock::paragraph(1, text)]);
    };

    let mut stream =
        serde_json::Deserializer::from_str(&answer[start..]).into_iter::<GeneratedContent>();
    match stream.next() {
        Some(Ok(generated)) => Ok(generated.blocks),
        Some(Err(e)) => Err(malformed(e)),
        None => Err(ArticleError::InvalidContent(
            "generated content is malformed".to_string(),
        )),
    }
}

fn malformed(e: serde_json::Error) -> ArticleError {
    ArticleError::InvalidContent(format!("generated content is malformed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::BlockBody;

    #[test]
    fn test_parse_blocks_skips_prose_and_braces_in_strings() {
        let answer = r#"Sure! Here you go: {"blocks": [{"order": 1, "type": "paragraph",
            "content": {"text": "a } brace \" quote"}}]} trailing {"x": 1}"#;
        let blocks = parse_blocks(answer).unwrap();
        assert_eq!(blocks, vec![ContentBlock::paragraph(1, "a } brace \" quote")]);

        assert!(matches!(
            parse_blocks("{ unbalanced"),
            Err(ArticleError::InvalidContent(_))
        ));
    }

    #[test]
    fn test_parse_blocks_from_fenced_json() {
        let answer = "```json\n{\"blocks\": [\
            {\"order\": 1, \"type\": \"heading\",\
             \"content\": {\"text\": \"Intro\", \"level\": 2}},\
            {\"order\": 2, \"type\": \"paragraph\", \"content\": {\"text\": \"Body\"}}]}\n```";
        let blocks = parse_blocks(answer).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0].body, BlockBody::Heading { level: 2, .. }));
    }

    #[test]
    fn test_plain_text_becomes_one_paragraph() {
        let blocks = parse_blocks("  Just some prose.  ").unwrap();
        assert_eq!(blocks, vec![ContentBlock::paragraph(1, "Just some prose.")]);
    }

    #[test]
    fn test_empty_and_malformed_answers() {
        assert!(matches!(parse_blocks("   "), Err(ArticleError::AiUnavailable(_))));
        assert!(matches!(
            parse_blocks(r#"{"blocks": [{"order": 1, "type": "poem"}]}"#),
            Err(ArticleError::InvalidContent(_))
        ));
    }
}
