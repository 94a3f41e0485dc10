//! Prompt composition for workflow generation.

use flowsmith_core::workflow::WorkflowRequest;
use flowsmith_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Token replaced by the request text when a prompt is rendered.
pub const USER_REQUEST_PLACEHOLDER: &str = "{USER_REQUEST}";

/// Instructions sent to the completion backend.
pub const WORKFLOW_PROMPT_TEMPLATE: &str = "\
You are an expert n8n workflow builder. Convert the user's natural language description into a complete n8n workflow JSON.

Requirements:
1. Generate a valid n8n workflow JSON structure
2. Include proper node connections and IDs
3. Use realistic configurations for common services
4. Include error handling where appropriate
5. Make it production-ready for testing

Available node types include:
- Webhook (for triggers)
- HTTP Request (for API calls)
- Code (for JavaScript logic)
- IF (for conditions)
- Set (for data transformation)
- Email Send (for notifications)
- Manual Trigger (for testing)

Return ONLY valid JSON with no additional text or formatting.

User request: {USER_REQUEST}";

/// A composed prompt: the instruction template plus the request text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPrompt {
    /// Instruction template containing [`USER_REQUEST_PLACEHOLDER`].
    pub system_instructions: String,
    /// The caller's description, verbatim.
    pub user_request: String,
}

impl GenerationPrompt {
    /// Renders the final prompt text.
    ///
    /// The template is split at the first placeholder and joined around the
    /// request, so placeholder tokens inside the request are left as-is.
    pub fn render(&self) -> String {
        match self.system_instructions.split_once(USER_REQUEST_PLACEHOLDER) {
            Some((head, tail)) => {
                let mut rendered =
                    String::with_capacity(head.len() + self.user_request.len() + tail.len());
                rendered.push_str(head);
                rendered.push_str(&self.user_request);
                rendered.push_str(tail);
                rendered
            }
            None => self.system_instructions.clone(),
        }
    }
}

/// Builds [`GenerationPrompt`]s from workflow requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptComposer {
    template: String,
}

impl PromptComposer {
    /// Creates a composer using [`WORKFLOW_PROMPT_TEMPLATE`].
    pub fn new() -> Self {
        Self {
            template: WORKFLOW_PROMPT_TEMPLATE.to_owned(),
        }
    }

    /// Creates a composer with a custom template.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless the template contains
    /// [`USER_REQUEST_PLACEHOLDER`] exactly once.
    pub fn with_template(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let occurrences = template.matches(USER_REQUEST_PLACEHOLDER).count();
        if occurrences != 1 {
            return Err(Error::configuration().with_message(format!(
                "prompt template must contain {USER_REQUEST_PLACEHOLDER} exactly once, found {occurrences}"
            )));
        }

        Ok(Self { template })
    }

    /// Returns the instruction template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Composes the prompt for `request`.
    pub fn compose(&self, request: &WorkflowRequest) -> GenerationPrompt {
        GenerationPrompt {
            system_instructions: self.template.clone(),
            user_request: request.description().to_owned(),
        }
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> WorkflowRequest {
        WorkflowRequest::new(text).unwrap()
    }

    #[test]
    fn composition_is_deterministic() {
        let composer = PromptComposer::new();
        let first = composer.compose(&request("Email me when a webhook fires"));
        let second = composer.compose(&request("Email me when a webhook fires"));

        assert_eq!(first, second);
        assert_eq!(first.render(), second.render());
    }

    #[test]
    fn render_places_request_at_the_end() {
        let prompt = PromptComposer::new().compose(&request("Ping a URL every hour"));
        let rendered = prompt.render();

        assert!(rendered.starts_with("You are an expert n8n workflow builder."));
        assert!(rendered.ends_with("User request: Ping a URL every hour"));
        assert!(!rendered.contains(USER_REQUEST_PLACEHOLDER));
    }

    #[test]
    fn template_names_the_node_vocabulary() {
        for node in [
            "Webhook",
            "HTTP Request",
            "Code",
            "IF",
            "Set",
            "Email Send",
            "Manual Trigger",
        ] {
            assert!(WORKFLOW_PROMPT_TEMPLATE.contains(node), "{node}");
        }
        assert!(WORKFLOW_PROMPT_TEMPLATE.contains("Return ONLY valid JSON"));
    }

    #[test]
    fn placeholder_in_request_is_not_substituted_again() {
        let prompt = PromptComposer::new().compose(&request("say {USER_REQUEST} twice"));
        let rendered = prompt.render();

        assert!(rendered.ends_with("User request: say {USER_REQUEST} twice"));
        assert_eq!(rendered.matches(USER_REQUEST_PLACEHOLDER).count(), 1);
    }

    #[test]
    fn request_text_is_verbatim() {
        let text = "  Line one\n\"quoted\" and ünïcode  ";
        let rendered = PromptComposer::new().compose(&request(text)).render();
        assert!(rendered.ends_with(text));
    }

    #[test]
    fn custom_template_requires_single_placeholder() {
        assert!(PromptComposer::with_template("no placeholder").is_err());
        assert!(PromptComposer::with_template("{USER_REQUEST} {USER_REQUEST}").is_err());

        let composer = PromptComposer::with_template("Build: {USER_REQUEST}!").unwrap();
        let rendered = composer.compose(&request("a cron job")).render();
        assert_eq!(rendered, "Build: a cron job!");
    }
}
