//! Subcommand implementations.
//!
//! `local` works on saved API responses and never touches the network;
//! `remote` talks to the backend through a [`gms_client::RoleDesk`].

pub(crate) mod local;
pub(crate) mod remote;
