//! Timeline domain models.
//!
//! | Type | Meaning |
//! |------|---------|
//! | `Event` | Reservation, cleaning, maintenance or block on one property |
//! | `EventPatch` | Partial update sent to the mutation sink |
//! | `BarLayout` | Pixel geometry of one event in the current buffer |
//! | `Property` | Registry record for a rentable unit |
//! | `ZoomLevel` / `DensityMode` | Horizontal and vertical view modes |

mod bar;
mod event;
mod property;
mod view;

pub use bar::BarLayout;
pub use event::{Event, EventKind, EventPatch, Layer};
pub use property::{Property, PropertyRegistry};
pub use view::{DensityMode, ZoomLevel};
