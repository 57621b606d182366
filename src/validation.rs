//! Build-time dependency-presence validation.

use std::fmt;

use crate::registry::RegistrySnapshot;
use crate::token::Token;

/// One missing-dependency edge found at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// Token of the descriptor declaring the dependency.
    pub dependent: Token,
    /// Key of the dependent descriptor, for keyed registrations.
    pub key: Option<&'static str>,
    /// The declared dependency token that has no registration.
    pub dependency: Token,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key {
            Some(key) => write!(
                f,
                "{} (key \"{}\") requires unregistered {}",
                self.dependent, key, self.dependency
            ),
            None => write!(f, "{} requires unregistered {}", self.dependent, self.dependency),
        }
    }
}

/// Aggregated build-time validation failure.
///
/// Collects every missing-dependency edge across the whole registry, keyed
/// descriptors included, rather than stopping at the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Every missing edge, in registry walk order.
    pub missing: Vec<MissingDependency>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "registry validation failed with {} missing dependencies: ",
            self.missing.len()
        )?;
        for (index, edge) in self.missing.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{edge}")?;
        }
        Ok(())
    }
}

/// Walks every descriptor's dependency list and every keyed descriptor's
/// dependency list, collecting every token that has no corresponding
/// registration.
pub(crate) fn validate_registry(registry: &RegistrySnapshot) -> Result<(), ValidationReport> {
    let mut missing = Vec::new();
    for &token in &registry.token_order {
        for descriptor in registry.all(token) {
            for &dep in descriptor.dependencies() {
                if !registry.contains(dep) {
                    missing.push(MissingDependency {
                        dependent: token,
                        key: None,
                        dependency: dep,
                    });
                }
            }
        }
    }
    for (&key, by_token) in &registry.keyed {
        for (&token, descriptor) in by_token {
            for &dep in descriptor.dependencies() {
                if !registry.contains(dep) {
                    missing.push(MissingDependency {
                        dependent: token,
                        key: Some(key),
                        dependency: dep,
                    });
                }
            }
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationReport { missing })
    }
}
