//! Registry and problem fixtures.

use std::sync::Arc;

use super::MockTool;
use crate::flow::{GuidedStep, ProblemDefinition};
use crate::tools::ToolRegistry;

/// Builds a registry with an echoing [`MockTool`] under each slug.
///
/// # Panics
///
/// Panics if a slug is malformed or repeated.
#[must_use]
pub fn registry_with(slugs: &[&str]) -> ToolRegistry {
    let mut builder = ToolRegistry::builder();
    for slug in slugs {
        if let Err(err) = builder.register(*slug, Arc::new(MockTool::default())) {
            panic!("fixture registration failed: {err}");
        }
    }
    builder.build()
}

/// Builds a problem whose steps run `tools` in order.
///
/// Each entry is `(tool_slug, is_optional)`.
#[must_use]
pub fn linear_problem(slug: &str, tools: &[(&str, bool)]) -> ProblemDefinition {
    tools
        .iter()
        .enumerate()
        .fold(ProblemDefinition::new(slug, slug), |problem, (i, (tool, optional))| {
            let instruction = format!("Step {}", i + 1);
            problem.step(if *optional {
                GuidedStep::optional(*tool, instruction)
            } else {
                GuidedStep::required(*tool, instruction)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_with() {
        let registry = registry_with(&["a", "b"]);
        assert_eq!(registry.list().to_vec(), vec!["a", "b"]);
    }

    #[test]
    fn test_linear_problem() {
        let problem = linear_problem("p", &[("a", false), ("b", true)]);

        assert_eq!(problem.flow.len(), 2);
        assert!(problem.flow[1].is_optional);
        assert_eq!(problem.flow[0].instruction, "Step 1");
        assert_eq!(problem.required_steps(), 1);
    }
}
