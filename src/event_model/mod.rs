mod event;

pub use event::{AuxButtonEvent, PenLocation, PenSample, TabletEvent};
