pub mod errors;

pub use errors::{ParseResult, RassiError, RassiErrorCategory, RassiResult, StoreResult};
