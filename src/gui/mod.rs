//! GUI module - User interface components

mod app;
mod control_panel;
mod results_view;

pub use app::TrackerApp;
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use results_view::{ResultsAction, ResultsView};
