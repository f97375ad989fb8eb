mod file_time_ext;
mod path_ext;

pub use file_time_ext::FileTimeExt;
pub use path_ext::{BestEffortPathExt, absolute_location};
