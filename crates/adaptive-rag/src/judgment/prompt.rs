//! Prompt templates for the model-backed judge

use crate::types::Document;

/// Prompt builder for routing, grading, rewriting and generation
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn router_system(topics: &[String]) -> String {
        format!(
            r#"You are an expert at routing a user question to a vectorstore or web search.
The vectorstore contains documents about: {topics}.
Use the vectorstore for questions on these topics. Use web_search for anything else,
especially recent events, news, or anything that needs live information.
Use none only when the question needs no external evidence at all (greetings, chit-chat).

Respond with JSON only: {{"datasource": "vectorstore" | "web_search" | "none"}}"#,
            topics = topics.join(", ")
        )
    }

    pub fn grader_system() -> &'static str {
        r#"You are a grader assessing relevance of a retrieved document to a user question.
It does not need to be a stringent test. The goal is to filter out erroneous retrievals.
If the document contains keywords or meaning related to the question, grade it as relevant.

Respond with JSON only: {"binary_score": "yes" | "no"}"#
    }

    pub fn grader_prompt(question: &str, document: &Document) -> String {
        format!(
            "Retrieved document:\n\n{}\n\nUser question: {}",
            document.content(),
            question
        )
    }

    pub fn hallucination_system() -> &'static str {
        r#"You are a grader assessing whether an LLM generation is grounded in / supported by a set of retrieved facts.
"yes" means the answer is grounded in the facts. "no" means it contains unsupported claims.

Respond with JSON only: {"binary_score": "yes" | "no"}"#
    }

    pub fn hallucination_prompt(documents: &[Document], generation: &str) -> String {
        format!(
            "Set of facts:\n\n{}\n\nLLM generation: {}",
            Self::build_context(documents),
            generation
        )
    }

    pub fn answer_system() -> &'static str {
        r#"You are a grader assessing whether an answer addresses / resolves a question.
"yes" means the answer resolves the question. "no" means it does not fully answer it.

Respond with JSON only: {"binary_score": "yes" | "no"}"#
    }

    pub fn answer_prompt(question: &str, generation: &str) -> String {
        format!("User question:\n\n{}\n\nLLM generation: {}", question, generation)
    }

    pub fn rewriter_system() -> &'static str {
        r#"You are a question re-writer that converts an input question to a better version optimized for vectorstore retrieval.
Look at the input and reason about the underlying semantic intent:
1. Keep the core meaning of the question
2. Use more precise terminology
3. Add relevant context keywords
4. Make the question more specific and clear

Reply with the improved question only, on a single line."#
    }

    pub fn rewriter_prompt(question: &str) -> String {
        format!("Here is the initial question:\n\n{}\n\nFormulate an improved question.", question)
    }

    pub fn generator_system() -> &'static str {
        r#"You are an assistant for question-answering tasks. Use the following pieces of retrieved context to answer the question.
If you don't know the answer, just say that you don't know. Use three sentences maximum and keep the answer concise."#
    }

    pub fn generator_prompt(question: &str, documents: &[Document]) -> String {
        format!(
            "Question: {}\n\nContext:\n{}\n\nAnswer:",
            question,
            Self::build_context(documents)
        )
    }

    /// Documents joined in order, separated by blank lines
    pub fn build_context(documents: &[Document]) -> String {
        documents
            .iter()
            .map(Document::content)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_prompt_lists_topics() {
        let topics = vec!["agents".to_string(), "prompt engineering".to_string()];
        let system = PromptBuilder::router_system(&topics);
        assert!(system.contains("agents, prompt engineering"));
        assert!(system.contains(r#"{"datasource""#));
    }

    #[test]
    fn test_context_keeps_document_order() {
        let docs = vec![Document::new("first", "a"), Document::new("second", "b")];
        assert_eq!(PromptBuilder::build_context(&docs), "first\n\nsecond");
        assert!(PromptBuilder::generator_prompt("q?", &docs).starts_with("Question: q?"));
    }
}
