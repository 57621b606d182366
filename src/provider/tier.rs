//! Per-provider resolution state: instance cache, resolution stack, partials.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::descriptor::DescriptorId;
use crate::service_ref::ServiceRef;

/// Instance cache preserving insertion order so disposal can run LIFO.
#[derive(Default)]
struct InstanceCache {
    map: HashMap<DescriptorId, ServiceRef>,
    order: Vec<DescriptorId>,
}

/// State owned by exactly one provider: the root's singleton tier or a
/// scope's own tier. The resolution stack and partial-instance map are
/// ephemeral and torn down unconditionally when a construction finishes or
/// fails; the cache lives until the provider is disposed.
pub(crate) struct TierState {
    cache: Mutex<InstanceCache>,
    resolving: Mutex<HashSet<DescriptorId>>,
    partials: Mutex<HashMap<DescriptorId, ServiceRef>>,
    disposed: AtomicBool,
}

impl TierState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            cache: Mutex::new(InstanceCache::default()),
            resolving: Mutex::new(HashSet::new()),
            partials: Mutex::new(HashMap::new()),
            disposed: AtomicBool::new(false),
        })
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Marks the tier dead. Returns whether it was already disposed.
    pub(crate) fn mark_disposed(&self) -> bool {
        self.disposed.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn cached(&self, id: DescriptorId) -> Option<ServiceRef> {
        self.cache.lock().unwrap().map.get(&id).cloned()
    }

    pub(crate) fn insert_cached(&self, id: DescriptorId, reference: ServiceRef) {
        let mut cache = self.cache.lock().unwrap();
        if cache.map.insert(id, reference).is_none() {
            cache.order.push(id);
        }
    }

    /// Whether the identity is currently under construction on this tier.
    pub(crate) fn in_progress(&self, id: DescriptorId) -> bool {
        self.resolving.lock().unwrap().contains(&id)
    }

    pub(crate) fn partial(&self, id: DescriptorId) -> Option<ServiceRef> {
        self.partials.lock().unwrap().get(&id).cloned()
    }

    /// Empties the cache in reverse insertion order for disposal.
    pub(crate) fn drain_for_dispose(&self) -> Vec<(DescriptorId, ServiceRef)> {
        let mut cache = self.cache.lock().unwrap();
        let mut drained = Vec::with_capacity(cache.order.len());
        while let Some(id) = cache.order.pop() {
            if let Some(reference) = cache.map.remove(&id) {
                drained.push((id, reference));
            }
        }
        drained
    }
}

/// Guard holding a descriptor identity on a tier's resolution stack, with its
/// placeholder in the partial-instance map, for the duration of one
/// construction. The drop teardown runs whether construction succeeds or
/// fails, so no stack or partial entry can outlive its construction.
pub(crate) struct ResolutionGuard {
    tier: Arc<TierState>,
    id: DescriptorId,
}

impl ResolutionGuard {
    /// Commits the stack entry and placeholder synchronously, before the
    /// construction reaches its first suspension point.
    pub(crate) fn new(tier: Arc<TierState>, id: DescriptorId, placeholder: ServiceRef) -> Self {
        tier.resolving.lock().unwrap().insert(id);
        tier.partials.lock().unwrap().insert(id, placeholder);
        Self { tier, id }
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        self.tier.resolving.lock().unwrap().remove(&self.id);
        self.tier.partials.lock().unwrap().remove(&self.id);
    }
}
