//! Frozen registry snapshot consumed by providers and the graph analyzer.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{DescriptorId, ServiceDescriptor};
use crate::token::Token;

/// Immutable snapshot of a [`ServiceCollection`](crate::ServiceCollection),
/// taken at build time and shared by every provider in one tree.
pub(crate) struct RegistrySnapshot {
    /// token -> descriptors in registration order
    pub(crate) by_token: HashMap<Token, Vec<Arc<ServiceDescriptor>>>,
    /// key -> token -> descriptor
    pub(crate) keyed: HashMap<&'static str, HashMap<Token, Arc<ServiceDescriptor>>>,
    /// descriptor identity -> descriptor, for disposal lookups
    pub(crate) by_id: HashMap<DescriptorId, Arc<ServiceDescriptor>>,
    /// first-registration order of tokens; a removed and re-registered token
    /// moves to the end
    pub(crate) token_order: Vec<Token>,
}

impl RegistrySnapshot {
    /// Last registered descriptor for the token: the single-result lookup.
    pub(crate) fn last(&self, token: Token) -> Option<&Arc<ServiceDescriptor>> {
        self.by_token.get(&token).and_then(|list| list.last())
    }

    /// Every descriptor registered under the token, in registration order.
    pub(crate) fn all(&self, token: Token) -> &[Arc<ServiceDescriptor>] {
        self.by_token.get(&token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keyed descriptor for `(key, token)`.
    pub(crate) fn keyed(&self, key: &str, token: Token) -> Option<&Arc<ServiceDescriptor>> {
        self.keyed.get(key).and_then(|by_token| by_token.get(&token))
    }

    /// Whether the token has any unkeyed registration.
    pub(crate) fn contains(&self, token: Token) -> bool {
        self.by_token.contains_key(&token)
    }

    /// Descriptor lookup by identity.
    pub(crate) fn descriptor(&self, id: DescriptorId) -> Option<&Arc<ServiceDescriptor>> {
        self.by_id.get(&id)
    }
}
