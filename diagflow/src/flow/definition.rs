//! Problem definitions and guided steps.

use serde::{Deserialize, Serialize};

/// One stage of a guided diagnostic flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidedStep {
    /// Slug of the tool this step runs. Must resolve in the registry.
    pub tool_slug: String,
    /// Instruction shown to the user before the step.
    pub instruction: String,
    /// Whether a failure of this step still lets the flow continue.
    #[serde(default)]
    pub is_optional: bool,
}

impl GuidedStep {
    /// Creates a required step.
    #[must_use]
    pub fn required(tool_slug: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            tool_slug: tool_slug.into(),
            instruction: instruction.into(),
            is_optional: false,
        }
    }

    /// Creates an optional step.
    #[must_use]
    pub fn optional(tool_slug: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            is_optional: true,
            ..Self::required(tool_slug, instruction)
        }
    }
}

/// A diagnostic "problem" and the ordered flow of tools that addresses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDefinition {
    /// Unique problem slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Grouping category.
    #[serde(default)]
    pub category: String,
    /// Icon identifier.
    #[serde(default)]
    pub icon: String,
    /// Search keywords.
    #[serde(default)]
    pub seo_keywords: Vec<String>,
    /// Steps, executed in this order.
    #[serde(default)]
    pub flow: Vec<GuidedStep>,
}

impl ProblemDefinition {
    /// Creates a problem with no steps.
    #[must_use]
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            icon: String::new(),
            seo_keywords: Vec::new(),
            flow: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Sets the search keywords.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seo_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: GuidedStep) -> Self {
        self.flow.push(step);
        self
    }

    /// Returns the number of required steps.
    #[must_use]
    pub fn required_steps(&self) -> usize {
        self.flow.iter().filter(|s| !s.is_optional).count()
    }
}
