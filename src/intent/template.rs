//! Prompt templates with `{{text}}` and `{{fields}}` placeholders.

use crate::intent::schema::IntentSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    body: &'static str,
}

impl PromptTemplate {
    pub const fn new(body: &'static str) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &'static str {
        self.body
    }

    /// Substitute the user text and the schema's field list.
    pub fn render(&self, text: &str, schema: &IntentSchema) -> String {
        self.body
            .replace("{{fields}}", &schema.describe())
            .replace("{{text}}", text.trim())
    }
}
