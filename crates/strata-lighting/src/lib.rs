//! Shadow-casting point lights for light-emitting block faces.
//!
//! Every visible face of a light-emitting block is a candidate point
//! light. Lights live in a fixed pool of shadow slots; [`reconcile_slots`]
//! keeps a chunk's held slots in step with its meshed light faces, and
//! the pool degrades by skipping lights when full rather than failing.

pub mod light;
pub mod slot;

pub use light::{
    BoundLight, LIGHT_FOV, LIGHT_NEAR, LIGHT_RANGE, LightGpu, light_view_projection,
    reconcile_slots,
};
pub use slot::{ShadowSlot, ShadowSlotPool};
