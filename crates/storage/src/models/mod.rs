pub mod driver;
pub mod event;
pub mod league;
pub mod points_scheme;
pub mod result;
pub mod season;

pub use driver::Driver;
pub use event::{Event, EventStatus};
pub use league::League;
pub use points_scheme::{PointsRule, PointsScheme};
pub use result::{RaceResult, ResultStatus};
pub use season::Season;
