//! Problem catalog: the set of guided flows known at startup.

use super::ProblemDefinition;
use crate::errors::{ConfigurationError, DiagflowError, NotFoundError};
use crate::tools::{validate_slug, ToolRegistry};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Immutable, validated collection of problem definitions.
///
/// Every step of every problem is checked against the tool registry when the
/// catalog is built, so a flow can never reference an unknown tool at run
/// time unless the registry it runs against differs.
#[derive(Debug, Default)]
pub struct ProblemCatalog {
    problems: HashMap<String, Arc<ProblemDefinition>>,
    order: Vec<String>,
}

impl ProblemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a catalog, verifying slugs and tool references.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for malformed or duplicate problem
    /// slugs, and for steps naming a tool that is not registered.
    pub fn new(
        definitions: impl IntoIterator<Item = ProblemDefinition>,
        registry: &ToolRegistry,
    ) -> Result<Self, ConfigurationError> {
        let mut catalog = Self::default();

        for problem in definitions {
            validate_slug(&problem.slug)?;
            if catalog.problems.contains_key(&problem.slug) {
                return Err(ConfigurationError::DuplicateProblem { slug: problem.slug });
            }
            if let Some((index, step)) = problem
                .flow
                .iter()
                .enumerate()
                .find(|(_, step)| !registry.contains(&step.tool_slug))
            {
                return Err(ConfigurationError::MissingTool {
                    problem: problem.slug.clone(),
                    index,
                    tool: step.tool_slug.clone(),
                });
            }

            debug!(problem = %problem.slug, steps = problem.flow.len(), "Registered problem");
            catalog.order.push(problem.slug.clone());
            catalog.problems.insert(problem.slug.clone(), Arc::new(problem));
        }

        Ok(catalog)
    }

    /// Parses a JSON array of problem definitions and builds a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DiagflowError::Serialization`] for malformed JSON and
    /// [`DiagflowError::Configuration`] for invalid definitions.
    pub fn from_json_str(json: &str, registry: &ToolRegistry) -> Result<Self, DiagflowError> {
        let definitions: Vec<ProblemDefinition> = serde_json::from_str(json)?;
        Ok(Self::new(definitions, registry)?)
    }

    /// Reads a JSON catalog file.
    ///
    /// # Errors
    ///
    /// See [`ProblemCatalog::from_json_str`]; I/O failures are returned as
    /// [`DiagflowError::Io`].
    pub fn from_json_file(path: impl AsRef<Path>, registry: &ToolRegistry) -> Result<Self, DiagflowError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json, registry)?;
        info!(path = %path.display(), problems = catalog.len(), "Loaded problem catalog");
        Ok(catalog)
    }

    /// Looks up a problem by slug.
    ///
    /// # Errors
    ///
    /// Returns a [`NotFoundError`] for unknown slugs.
    pub fn get(&self, slug: &str) -> Result<&Arc<ProblemDefinition>, NotFoundError> {
        self.problems.get(slug).ok_or_else(|| NotFoundError::problem(slug))
    }

    /// Iterates problems in catalog order.
    pub fn list(&self) -> impl Iterator<Item = &Arc<ProblemDefinition>> + '_ {
        self.order.iter().filter_map(|slug| self.problems.get(slug))
    }

    /// Returns the problems in `category`, in catalog order.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&Arc<ProblemDefinition>> {
        self.list().filter(|p| p.category == category).collect()
    }

    /// Returns the number of problems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the catalog holds no problems.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
