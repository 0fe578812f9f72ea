mod state;
mod store;

pub use {
    state::RecordingState,
    store::{SessionSnapshot, SessionStore},
};
