//! Tool registry mapping slugs to capabilities.
//!
//! Registration happens on a [`ToolRegistryBuilder`] during startup; the
//! built [`ToolRegistry`] has no mutating methods, so lookups need no locks
//! and can be shared across tasks behind an `Arc`.

use super::ToolCapability;
use crate::errors::{ConfigurationError, NotFoundError};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

static SLUG_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$"));

/// Tool slugs taken by the HTTP discovery routes.
pub const RESERVED_TOOL_SLUGS: &[&str] = &["api"];

/// Checks that a slug is a lowercase, hyphen-separated path segment.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidSlug`] otherwise.
pub fn validate_slug(slug: &str) -> Result<(), ConfigurationError> {
    if slug.trim().is_empty() {
        return Err(ConfigurationError::invalid_slug(slug, "slug cannot be empty"));
    }
    let pattern = SLUG_PATTERN
        .as_ref()
        .map_err(|err| ConfigurationError::Invalid(format!("slug pattern: {err}")))?;
    if !pattern.is_match(slug) {
        return Err(ConfigurationError::invalid_slug(
            slug,
            "expected lowercase letters, digits and single hyphens",
        ));
    }
    Ok(())
}

/// Collects tool registrations during startup.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: HashMap<String, Arc<dyn ToolCapability>>,
    order: Vec<String>,
}

impl ToolRegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a capability under `slug`.
    ///
    /// The slug shape and the capability's config schema are verified here,
    /// so a bad registrant stops startup instead of failing at call time.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the slug is taken, reserved or
    /// malformed, or if the schema breaks one of its invariants.
    pub fn register(
        &mut self,
        slug: impl Into<String>,
        capability: Arc<dyn ToolCapability>,
    ) -> Result<&mut Self, ConfigurationError> {
        let slug = slug.into();
        validate_slug(&slug)?;
        if RESERVED_TOOL_SLUGS.contains(&slug.as_str()) {
            return Err(ConfigurationError::invalid_slug(
                slug,
                "reserved for the discovery routes",
            ));
        }

        if self.tools.contains_key(&slug) {
            return Err(ConfigurationError::DuplicateTool { slug });
        }
        if let Some(schema) = capability.config() {
            schema.check(&slug)?;
        }

        debug!(tool = %slug, "Registered tool");
        self.order.push(slug.clone());
        self.tools.insert(slug, capability);
        Ok(self)
    }

    /// Registers a capability, consuming and returning the builder.
    ///
    /// # Errors
    ///
    /// See [`ToolRegistryBuilder::register`].
    pub fn with_tool(
        mut self,
        slug: impl Into<String>,
        capability: Arc<dyn ToolCapability>,
    ) -> Result<Self, ConfigurationError> {
        self.register(slug, capability)?;
        Ok(self)
    }

    /// Freezes the registrations into an immutable registry.
    #[must_use]
    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            tools: self.tools,
            order: self.order,
        }
    }
}

impl std::fmt::Debug for ToolRegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistryBuilder")
            .field("tools", &self.order)
            .finish()
    }
}

/// Immutable mapping from slug to tool capability.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolCapability>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    /// Looks up the capability registered under `slug`.
    ///
    /// # Errors
    ///
    /// Returns a [`NotFoundError`] for unknown slugs.
    pub fn lookup(&self, slug: &str) -> Result<&Arc<dyn ToolCapability>, NotFoundError> {
        self.tools.get(slug).ok_or_else(|| NotFoundError::tool(slug))
    }

    /// Returns true if `slug` is registered.
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.tools.contains_key(slug)
    }

    /// Lists registered slugs in registration order.
    #[must_use]
    pub fn list(&self) -> &[String] {
        &self.order
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates `(slug, capability)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn ToolCapability>)> + '_ {
        self.order
            .iter()
            .filter_map(|slug| self.tools.get(slug).map(|tool| (slug.as_str(), tool)))
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tool_count", &self.order.len())
            .finish()
    }
}
