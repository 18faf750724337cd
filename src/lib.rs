pub mod compare;
pub mod config;
pub mod cumulative;
pub mod fake_source;
pub mod flatten;
pub mod format;
pub mod heat;
pub mod logging;
pub mod pagination;
pub mod pipeline;
pub mod prime;
pub mod rankings;
pub mod registry;
pub mod row;
pub mod source;
pub mod state;
