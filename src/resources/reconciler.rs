// SPDX-License-Identifier: MIT OR Apache-2.0

//! Create/read/update/delete/import orchestration shared by every kind.

use async_trait::async_trait;
use std::marker::PhantomData;
use tracing::debug;

use super::ResourceKind;
use crate::client::StatusCakeClient;
use crate::codec::{self, ResourceCodec, Snapshot};
use crate::error::{ErrorContext, Result, StatusCakeError};

/// Identity and normalized snapshot of a remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    pub id: String,
    pub snapshot: Snapshot,
}

/// CRUD and import for one resource kind.
#[async_trait]
pub trait Reconciler: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Check that a snapshot expands to a valid payload, without any request.
    ///
    /// # Errors
    ///
    /// Returns `StatusCakeError::Validation` naming the invalid field
    fn validate(&self, desired: &Snapshot) -> Result<()>;

    /// Create the resource and return it as the API normalized it.
    ///
    /// If the resource was created but could not be read back, fails with
    /// `UnknownState` whose [`resource_id`](StatusCakeError::resource_id) is
    /// the new identity.
    async fn create(&self, desired: &Snapshot) -> Result<ResourceState>;

    /// Fetch the current state. `NotFound` means the resource is gone.
    async fn read(&self, id: &str) -> Result<Snapshot>;

    /// Apply `desired` in place and return the normalized state.
    ///
    /// Fails with `ReplacementRequired`, before any request, if an immutable
    /// field differs from `prior`.
    async fn update(&self, id: &str, prior: &Snapshot, desired: &Snapshot) -> Result<Snapshot>;

    /// Delete the resource. Deleting a missing resource succeeds.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Adopt an existing resource by identity.
    async fn import(&self, id: &str) -> Result<ResourceState> {
        let snapshot = self.read(id).await?;
        Ok(ResourceState {
            id: id.to_string(),
            snapshot,
        })
    }
}

/// [`Reconciler`] for any kind with a [`ResourceCodec`].
pub struct ResourceReconciler<C> {
    client: StatusCakeClient,
    codec: PhantomData<fn() -> C>,
}

impl<C: ResourceCodec> ResourceReconciler<C> {
    #[must_use]
    pub fn new(client: StatusCakeClient) -> Self {
        Self {
            client,
            codec: PhantomData,
        }
    }

    fn path(id: &str) -> String {
        format!("{}/{id}", C::PATH)
    }
}

impl<C> Clone for ResourceReconciler<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            codec: PhantomData,
        }
    }
}

impl<C> std::fmt::Debug for ResourceReconciler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceReconciler")
            .field("client", &self.client)
            .finish()
    }
}

#[async_trait]
impl<C: ResourceCodec> Reconciler for ResourceReconciler<C> {
    fn kind(&self) -> ResourceKind {
        C::KIND
    }

    fn validate(&self, desired: &Snapshot) -> Result<()> {
        codec::expand::<C>(desired).map(|_| ())
    }

    async fn create(&self, desired: &Snapshot) -> Result<ResourceState> {
        let payload = codec::expand::<C>(desired)?;

        debug!(kind = %C::KIND, "creating StatusCake resource");
        let id = self
            .client
            .create(C::PATH, &payload)
            .await
            .map_err(|e| e.in_resource(C::KIND, None))?;
        debug!(kind = %C::KIND, id = %id, "created StatusCake resource");

        match self.read(&id).await {
            Ok(snapshot) => Ok(ResourceState { id, snapshot }),
            Err(e) => Err(StatusCakeError::UnknownState {
                context: ErrorContext {
                    kind: Some(C::KIND),
                    id: Some(id),
                },
                message: format!("created, but reading it back failed: {e}"),
            }),
        }
    }

    async fn read(&self, id: &str) -> Result<Snapshot> {
        debug!(kind = %C::KIND, id = %id, "reading StatusCake resource");
        let payload: C::Payload = self
            .client
            .get(&Self::path(id))
            .await
            .map_err(|e| e.in_resource(C::KIND, Some(id)))?;
        Ok(C::flatten(payload))
    }

    async fn update(&self, id: &str, prior: &Snapshot, desired: &Snapshot) -> Result<Snapshot> {
        let mut payload = codec::expand::<C>(desired)?;

        let fields = C::replacement_fields(prior, desired);
        if !fields.is_empty() {
            return Err(StatusCakeError::ReplacementRequired {
                context: ErrorContext {
                    kind: Some(C::KIND),
                    id: Some(id.to_string()),
                },
                fields,
            });
        }
        C::strip_immutable(&mut payload);

        debug!(kind = %C::KIND, id = %id, "updating StatusCake resource");
        self.client
            .update(&Self::path(id), &payload)
            .await
            .map_err(|e| e.in_resource(C::KIND, Some(id)))?;

        self.read(id).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        debug!(kind = %C::KIND, id = %id, "deleting StatusCake resource");
        match self.client.delete(&Self::path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(kind = %C::KIND, id = %id, "StatusCake resource already deleted");
                Ok(())
            }
            Err(e) => Err(e.in_resource(C::KIND, Some(id))),
        }
    }
}
