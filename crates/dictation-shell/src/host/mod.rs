//! Connection to the host process that embeds the backend and renders the
//! windows.

mod channel;
mod protocol;

pub(crate) use {
    channel::{COMMAND_TIMEOUT, HostChannel, HostTasks},
    protocol::{Inbound, Outbound},
};
