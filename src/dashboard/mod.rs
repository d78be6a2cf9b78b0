pub mod console;
pub mod controller;
pub mod surface;

pub use console::ConsoleSurface;
pub use controller::DashboardController;
pub use surface::{ChartId, DashboardSurface};
