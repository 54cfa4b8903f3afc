pub mod colors;
pub mod external;
pub mod fuzzy;
pub mod log;
pub mod task;
pub mod text;
