mod preset;
mod series;
mod snapshot;

pub use preset::{Preset, preset_series};
pub use series::{HOURS, TimeSeries, coerce_number, parse_series};
pub use snapshot::{ProfileEdit, ProfileKind, ProfileSnapshot};
