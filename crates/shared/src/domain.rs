use serde::{Deserialize, Serialize};

/// Pixel dimensions of an ingested template, as reported by the render
/// service. Both sides are strictly positive for any template the service
/// accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Monotonic token identifying one issued preview request. Used to discard
/// responses that arrive after a newer request has been issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
