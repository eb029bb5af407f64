//! Terminal dashboard for video game sales data.
//!
//! A sales file is loaded into a [`session::Session`]. Each of the four
//! [`navigation::Mode`]s derives its [`navigation::View`] from that session
//! on activation: the raw table echo, an exploratory overview, five key
//! indicators and three aggregate charts.

pub mod aggregate;
pub mod charts;
pub mod controller;
pub mod domain;
pub mod explorer;
pub mod indicators;
pub mod inputter;
pub mod model;
pub mod navigation;
pub mod session;
pub mod table;
pub mod ui;

pub use domain::{DashConfig, DashError, Result};
pub use navigation::{Mode, View, activate};
pub use session::Session;
pub use table::SalesTable;
