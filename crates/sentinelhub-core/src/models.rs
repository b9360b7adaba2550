pub mod bbox;
pub mod configuration;
pub mod crs;
pub mod response;

pub use bbox::BBox;
pub use configuration::{Configuration, DataSource, DataSourceKey, Layer};
pub use crs::Crs;
pub use response::HttpResponse;
