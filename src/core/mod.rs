pub mod filter;
pub mod form;
pub mod gate;
pub mod quote;
pub mod sync;
pub mod wind;

pub use crate::domain::model::{FenceOption, GeoPoint, SelectionSet, WindEstimate};
pub use crate::domain::ports::{ForwardGeocoder, MapProvider, ReverseGeocoder, SessionStore};
pub use crate::utils::error::Result;
