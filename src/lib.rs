pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod loader;
pub mod render;
pub mod schedule;
pub mod table;
pub mod task;
pub mod validation;

pub use config::ChartConfig;
pub use error::{Error, FormatError, MissingDependencyError, Result, ValidationError};
pub use layout::{Layout, compute_layout};
pub use loader::{InputFormat, SheetSelector, load_records};
pub use render::{DrawingSurface, ImageFormat, SvgSurface, draw_chart};
pub use schedule::Schedule;
pub use task::{Milestone, Task};
pub use validation::{ValidationReport, validate_records};
