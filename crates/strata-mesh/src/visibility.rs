//! The face-emission predicate: given a block and the block behind one of
//! its faces, decide whether the face is visible.
//!
//! The rule is transparency-driven, not type-driven. Opaque next to opaque
//! always culls, because the viewer can never see the shared plane through
//! either block, whatever their types. A face survives only when the
//! neighbor side lets light through: void, a transparent neighbor behind an
//! opaque block, or two transparent blocks of different types (same-type
//! transparent runs merge into one volume and hide their internal faces).

use strata_voxel::{BlockId, BlockRegistry};

/// Returns `true` if a face of `own` should be emitted against `neighbor`.
///
/// `own` must be non-void (the mesher never asks about void blocks).
/// `neighbor` is `None` when the neighbor chunk is not loaded, which is
/// treated as void space: the face is emitted now and re-culled when the
/// neighbor generates and marks this chunk's mesh stale.
pub fn face_visible(registry: &BlockRegistry, own: BlockId, neighbor: Option<BlockId>) -> bool {
    let Some(neighbor) = neighbor else {
        return true;
    };
    if registry.is_void(neighbor) {
        return true;
    }

    let own_transparent = registry.is_transparent(own);
    let neighbor_transparent = registry.is_transparent(neighbor);

    match (own_transparent, neighbor_transparent) {
        // Opaque against opaque is always hidden.
        (false, false) => false,
        // Same transparent type merges; different types show the boundary.
        (true, true) => own != neighbor,
        // Exactly one side transparent: the face is visible through it.
        _ => true,
    }
}
