use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    edits::{EditAction, EditError, EditSet},
    hierarchy::BaseGroup,
};

use super::{EditDispatch, OverlayGroup, OverlayNode};

/// An editing session over a base hierarchy.
///
/// The session owns the current [`EditSet`]. Each dispatched [`EditAction`] replaces it with a new edit set,
/// and a failed action leaves it unchanged.
/// Overlays hold a snapshot of the edit set, so derive a fresh overlay with [`EditSession::root`] to observe an edit.
#[derive(Clone)]
pub struct EditSession {
    base: BaseGroup,
    edits: Arc<RwLock<Arc<EditSet>>>,
}

impl core::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EditSession")
            .field("base", &self.base.path())
            .field("edits", &self.edits.read())
            .finish()
    }
}

impl EditSession {
    /// Create a session with no edits over the `base` group.
    #[must_use]
    pub fn new(base: BaseGroup) -> Self {
        Self::with_edits(base, EditSet::new())
    }

    /// Create a session over the `base` group, starting from existing `edits`.
    #[must_use]
    pub fn with_edits(base: BaseGroup, edits: EditSet) -> Self {
        Self {
            base,
            edits: Arc::new(RwLock::new(Arc::new(edits))),
        }
    }

    /// The overlay of the base group with the current edits.
    #[must_use]
    pub fn root(&self) -> OverlayGroup {
        OverlayGroup::new(
            OverlayNode::Materialized(self.base.clone()),
            self.edits(),
            self.dispatcher(),
        )
    }

    /// Apply `action` to the edit set.
    ///
    /// # Errors
    /// Returns an [`EditError`] if the action is rejected. The edit set is unchanged.
    pub fn dispatch(&self, action: EditAction) -> Result<(), EditError> {
        dispatch(&self.edits, &action)
    }

    /// A dispatch function that applies actions to the edit set of this session.
    #[must_use]
    pub fn dispatcher(&self) -> EditDispatch {
        let edits = self.edits.clone();
        Arc::new(move |action| dispatch(&edits, &action))
    }

    /// A snapshot of the current edit set.
    #[must_use]
    pub fn edits(&self) -> Arc<EditSet> {
        self.edits.read().clone()
    }

    /// Returns true if there are any edits.
    #[must_use]
    pub fn has_edits(&self) -> bool {
        !self.edits.read().is_empty()
    }

    /// Discard all edits, e.g. after they have been uploaded.
    pub fn clear_edits(&self) {
        *self.edits.write() = Arc::new(EditSet::new());
        tracing::debug!("cleared edits");
    }
}

fn dispatch(edits: &RwLock<Arc<EditSet>>, action: &EditAction) -> Result<(), EditError> {
    let mut edits = edits.write();
    match edits.apply(action) {
        Ok(next) => {
            tracing::debug!(
                "dispatched {} {}: {} edits",
                action.name(),
                action.path().map(ToString::to_string).unwrap_or_default(),
                next.len()
            );
            *edits = Arc::new(next);
            Ok(())
        }
        Err(err) => {
            tracing::debug!("rejected {}: {err}", action.name());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hierarchy::StoreGroup,
        metadata::{Attributes, ConsolidatedMetadata},
        node::NodePath,
        storage::store::MemoryStore,
    };

    fn session() -> EditSession {
        let base = StoreGroup::new_with_metadata(
            Arc::new(MemoryStore::new()),
            ConsolidatedMetadata::default(),
        );
        EditSession::new(Arc::new(base))
    }

    #[test]
    fn edit_session_dispatch() -> Result<(), Box<dyn std::error::Error>> {
        let session = session();
        assert!(!session.has_edits());
        let snapshot = session.edits();

        session.dispatch(EditAction::RemoveGroup {
            path: NodePath::new("/g")?,
        })?;
        assert!(session.has_edits());
        assert!(snapshot.is_empty());

        let before = session.edits();
        let result = session.dispatch(EditAction::CreateGroup {
            path: NodePath::new("/g")?,
            attrs: Attributes::new(),
        });
        assert!(matches!(result, Err(EditError::RecreateRemovedGroup(_))));
        assert_eq!(*session.edits(), *before);

        (session.dispatcher())(EditAction::ClearEdits)?;
        assert!(!session.has_edits());
        Ok(())
    }

    #[test]
    fn edit_session_clear() -> Result<(), Box<dyn std::error::Error>> {
        let session = session();
        session.dispatch(EditAction::SetAttrs {
            path: NodePath::root(),
            attrs: Attributes::new(),
        })?;
        let root = session.root();
        session.clear_edits();
        assert!(!session.has_edits());
        assert!(root.has_edits());
        assert!(!session.root().has_edits());
        Ok(())
    }
}
