//! Flutter bridge for launcher disguise core.

pub mod api;
