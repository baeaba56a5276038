pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, header, info, muted, success, warn};
pub use table::{job_table, person_table, stats_table};
pub use theme::{theme, Theme};
