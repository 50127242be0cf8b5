//! Modal single-image viewer bound to the grid of the current page.
mod core;
mod debounce;
mod events;
mod state;

pub use core::{DispatchOutcome, Lightbox, LightboxSettings};
pub use debounce::{Debounced, Debouncer};
pub use events::{Action, EventKind, EventRegistry, LightboxEvent, ListenerId, Subscription, Target};
pub use state::{Direction, LightboxItem, LightboxSnapshot, LightboxView, Phase};

#[cfg(test)]
mod tests;
