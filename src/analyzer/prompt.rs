use crate::extract::ExtractedContent;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{(webpage|policy)\}").expect("static regex");
}

pub const DEFAULT_PROMPT: &str = "You are a compliance reviewer. Compare the webpage content \
against the policy and list every statement on the webpage that deviates from the policy.\n\n\
Webpage:\n{webpage}\n\nPolicy:\n{policy}\n";

/// Prompt format with `{webpage}` and `{policy}` insertion points.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Substitutes both documents in one pass, so placeholder-looking text
    /// inside the documents is left untouched.
    pub fn render(&self, webpage: &ExtractedContent, policy: &ExtractedContent) -> String {
        let webpage = webpage.to_string();
        let policy = policy.to_string();
        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| match &caps[1] {
                "webpage" => webpage.clone(),
                _ => policy.clone(),
            })
            .into_owned()
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}
