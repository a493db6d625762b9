//! Flutter bridge for the PcbDesk core.

pub mod api;
