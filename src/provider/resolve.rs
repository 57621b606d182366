//! The resolution engine: lifetime dispatch, the circular-construction
//! protocol, scope validation, and disposal.

use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture};

use crate::descriptor::{ServiceDescriptor, ServiceSource};
use crate::error::{DiError, DiResult};
use crate::lifetime::Lifetime;
use crate::service_ref::ServiceRef;
use crate::token::Token;

use super::tier::{ResolutionGuard, TierState};
use super::{ResolverContext, ServiceProvider};

pub(crate) async fn resolve_optional(
    provider: ServiceProvider,
    token: Token,
) -> DiResult<Option<ServiceRef>> {
    ensure_live(&provider)?;
    let Some(descriptor) = provider.inner.registry.last(token).cloned() else {
        return Ok(None);
    };
    resolve_descriptor(provider, descriptor).await.map(Some)
}

pub(crate) async fn resolve_required(
    provider: ServiceProvider,
    token: Token,
) -> DiResult<ServiceRef> {
    match resolve_optional(provider, token).await? {
        Some(reference) => Ok(reference),
        None => Err(DiError::NotRegistered(token.to_string())),
    }
}

/// Resolves every descriptor registered under the token, in registration order.
pub(crate) async fn resolve_all(
    provider: ServiceProvider,
    token: Token,
) -> DiResult<Vec<ServiceRef>> {
    ensure_live(&provider)?;
    let descriptors: Vec<_> = provider.inner.registry.all(token).to_vec();
    let mut resolved = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        resolved.push(resolve_descriptor(provider.clone(), descriptor).await?);
    }
    Ok(resolved)
}

pub(crate) async fn resolve_keyed(
    provider: ServiceProvider,
    key: &'static str,
    token: Token,
) -> DiResult<Option<ServiceRef>> {
    ensure_live(&provider)?;
    let Some(descriptor) = provider.inner.registry.keyed(key, token).cloned() else {
        return Ok(None);
    };
    resolve_descriptor(provider, descriptor).await.map(Some)
}

fn ensure_live(provider: &ServiceProvider) -> DiResult<()> {
    if provider.inner.tier.is_disposed() {
        Err(DiError::DisposedProviderUse)
    } else {
        Ok(())
    }
}

/// Dispatches one descriptor by lifetime.
///
/// Boxing breaks the otherwise-infinite future type of the recursive
/// dependency walk.
fn resolve_descriptor(
    provider: ServiceProvider,
    descriptor: Arc<ServiceDescriptor>,
) -> BoxFuture<'static, DiResult<ServiceRef>> {
    Box::pin(async move {
        match descriptor.lifetime {
            Lifetime::Singleton => {
                let root = provider.root_provider();
                let tier = root.inner.tier.clone();
                resolve_in_tier(provider, tier, descriptor, true).await
            }
            Lifetime::Scoped => {
                if provider.inner.options.validate_scopes && provider.is_root() {
                    return Err(DiError::ScopeViolation(format!(
                        "scoped service {} cannot be resolved from the root provider",
                        descriptor.token
                    )));
                }
                let tier = provider.inner.tier.clone();
                resolve_in_tier(provider, tier, descriptor, true).await
            }
            Lifetime::Transient => {
                let tier = provider.inner.tier.clone();
                resolve_in_tier(provider, tier, descriptor, false).await
            }
        }
    })
}

/// Runs the per-tier protocol: cache lookup, in-progress short-circuit,
/// scope-validation of declared dependencies, then construction.
async fn resolve_in_tier(
    provider: ServiceProvider,
    tier: Arc<TierState>,
    descriptor: Arc<ServiceDescriptor>,
    cache: bool,
) -> DiResult<ServiceRef> {
    if tier.is_disposed() {
        return Err(DiError::DisposedProviderUse);
    }
    if cache {
        if let Some(hit) = tier.cached(descriptor.id) {
            return Ok(hit);
        }
    }
    if tier.in_progress(descriptor.id) {
        // A correctly-detected cycle always finds its placeholder here.
        return tier
            .partial(descriptor.id)
            .ok_or_else(|| DiError::CircularStructural(descriptor.token.to_string()));
    }
    // Dependency lifetimes are checked before any stack or placeholder state
    // for this descriptor is committed.
    if provider.inner.options.validate_scopes && provider.is_root() {
        for dep in &descriptor.dependencies {
            if let Some(dep_descriptor) = provider.inner.registry.last(*dep) {
                if dep_descriptor.lifetime == Lifetime::Scoped {
                    return Err(DiError::ScopeViolation(format!(
                        "{} depends on scoped service {} and cannot be constructed on the root provider",
                        descriptor.token, dep
                    )));
                }
            }
        }
    }
    let resolved = construct(provider, &tier, &descriptor).await?;
    if cache {
        tier.insert_cached(descriptor.id, resolved.clone());
    }
    Ok(resolved)
}

/// Builds the instance behind a populated cell.
///
/// Implementation descriptors run the circular-construction protocol: an empty
/// placeholder cell and the stack entry are committed synchronously, the
/// declared dependencies resolve concurrently, the constructor runs, and the
/// cell is populated in place so circular dependents holding the placeholder
/// observe the finished instance. Factory and value descriptors have no
/// constructor step to defer and construct directly into a ready cell.
async fn construct(
    provider: ServiceProvider,
    tier: &Arc<TierState>,
    descriptor: &Arc<ServiceDescriptor>,
) -> DiResult<ServiceRef> {
    tracing::debug!(
        token = %descriptor.token,
        lifetime = ?descriptor.lifetime,
        kind = descriptor.kind(),
        "constructing service"
    );
    let reference = match &descriptor.source {
        ServiceSource::Implementation(ctor) => {
            let placeholder = ServiceRef::empty(descriptor.token.display_name());
            let _guard =
                ResolutionGuard::new(tier.clone(), descriptor.id, placeholder.clone());
            let dependencies = resolve_dependencies(&provider, descriptor).await?;
            let instance = ctor(&dependencies)?;
            placeholder.fill(instance);
            run_initializer(descriptor, &placeholder).await?;
            placeholder
        }
        ServiceSource::Factory(factory) => {
            let dependencies = resolve_dependencies(&provider, descriptor).await?;
            let context = ResolverContext::new(provider.clone());
            let instance = factory(context, dependencies).await?;
            let reference = ServiceRef::ready(descriptor.token.display_name(), instance);
            run_initializer(descriptor, &reference).await?;
            reference
        }
        ServiceSource::Value(value) => {
            let reference = ServiceRef::ready(descriptor.token.display_name(), value.clone());
            run_initializer(descriptor, &reference).await?;
            reference
        }
    };
    Ok(reference)
}

/// Resolves the declared dependency tokens concurrently. Completion order is
/// not guaranteed; any single failure aborts the whole construction.
async fn resolve_dependencies(
    provider: &ServiceProvider,
    descriptor: &ServiceDescriptor,
) -> DiResult<Vec<ServiceRef>> {
    let pending: Vec<_> = descriptor
        .dependencies
        .iter()
        .map(|dep| resolve_required(provider.clone(), *dep))
        .collect();
    try_join_all(pending).await
}

async fn run_initializer(descriptor: &ServiceDescriptor, reference: &ServiceRef) -> DiResult<()> {
    if let Some(initializer) = &descriptor.initializer {
        let instance = reference
            .instance()
            .ok_or(DiError::NotReady(descriptor.token.display_name()))?;
        initializer(instance).await?;
    }
    Ok(())
}

/// Disposes the provider's own tier: runs destroy hooks over the tier's cache
/// in reverse insertion order and marks the provider dead. Hook failures are
/// logged and do not stop the remaining instances from being disposed.
pub(crate) fn dispose(provider: &ServiceProvider) {
    let tier = &provider.inner.tier;
    if tier.mark_disposed() {
        return;
    }
    for (id, reference) in tier.drain_for_dispose() {
        let Some(descriptor) = provider.inner.registry.descriptor(id) else {
            continue;
        };
        let (Some(destroyer), Some(instance)) = (&descriptor.destroyer, reference.instance())
        else {
            continue;
        };
        if let Err(error) = destroyer(instance) {
            tracing::error!(
                token = %descriptor.token,
                %error,
                "destroy hook failed; continuing disposal"
            );
        }
    }
}
