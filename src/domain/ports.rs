use crate::domain::model::{GeoCandidate, LatLon, MapEvent, MarkerId, ReverseAddress};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

/// Map callbacks are delivered as events on a channel.
pub type MapHandler = UnboundedSender<MapEvent>;

#[async_trait]
pub trait ForwardGeocoder: Send + Sync {
    /// Candidates for a normalized postcode; empty when nothing matched.
    async fn search_postcode(&self, postcode: &str) -> Result<Vec<GeoCandidate>>;
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, at: LatLon) -> Result<ReverseAddress>;
}

pub trait MapProvider: Send {
    fn initialize(&mut self, center: LatLon, zoom: u8) -> Result<()>;
    fn set_view(&mut self, center: LatLon, zoom: u8);
    fn add_marker(&mut self, position: LatLon, draggable: bool, label: &str) -> MarkerId;
    fn remove_marker(&mut self, marker: MarkerId);
    fn on_map_click(&mut self, handler: MapHandler);
    fn on_marker_drag_end(&mut self, marker: MarkerId, handler: MapHandler);
    fn invalidate_size(&mut self);
}

/// 登入旗標的保存處，對應瀏覽器的 localStorage
pub trait SessionStore: Send + Sync {
    fn load_flag(&self) -> impl std::future::Future<Output = Result<bool>> + Send;
    fn store_flag(&self) -> impl std::future::Future<Output = Result<()>> + Send;
    fn clear_flag(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
