// src/prompt.rs
//! Prompt construction for the model query service.

use crate::config::PlanConfig;
use crate::types::CATEGORY_LABELS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Both parts as one string, for providers without a system slot.
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

pub fn build_prompt(product: &str, competitor: Option<&str>, plan: &PlanConfig) -> Prompt {
    let categories = CATEGORY_LABELS.join(", ");
    let sources = plan.source_labels.join(", ");

    let system = format!(
        "Act as a product feedback investigator. Report only problems, never praise. \
         Answer with a JSON array and nothing else. Each element must be an object \
         {{\"description\": string, \"category\": string, \"sources\": [{{\"type\": string, \"url\": string, \"title\": string}}]}}. \
         \"category\" must be one of: {categories}. \
         Each source \"type\" must be one of: {sources}. \
         Merge complaints that describe the same problem into a single entry."
    );

    let mut user = format!(
        "List at most {} distinct, realistic complaints users have about the product \"{}\".",
        plan.max_issues,
        product.trim()
    );
    if let Some(c) = competitor.map(str::trim).filter(|c| !c.is_empty()) {
        user.push_str(&format!(
            " Prefer complaints that users of the competitor \"{c}\" do not report."
        ));
    }
    if !plan.instruction.trim().is_empty() {
        user.push(' ');
        user.push_str(plan.instruction.trim());
    }

    Prompt { system, user }
}
