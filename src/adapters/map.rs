use crate::domain::model::{LatLon, MapEvent, MarkerId};
use crate::domain::ports::{MapHandler, MapProvider};
use crate::utils::error::{FenceError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    pub position: LatLon,
    pub draggable: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub initialized: bool,
    pub init_count: u32,
    pub center: Option<LatLon>,
    pub zoom: u8,
    pub marker: Option<MarkerView>,
    pub marker_count: usize,
    pub invalidations: u32,
    pub tile_url: String,
}

#[derive(Debug, Default)]
struct MapState {
    init_count: u32,
    center: Option<LatLon>,
    zoom: u8,
    markers: HashMap<MarkerId, MarkerView>,
    next_marker: u64,
    click_handlers: Vec<MapHandler>,
    drag_handlers: HashMap<MarkerId, MapHandler>,
    invalidations: u32,
    unavailable: Option<String>,
    tile_url: String,
}

/// Map provider without a screen. It keeps view and marker state, and
/// [`HeadlessMap::click`] / [`HeadlessMap::drag_marker`] stand in for the user.
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMap {
    inner: Arc<Mutex<MapState>>,
}

impl HeadlessMap {
    pub fn new(tile_url: impl Into<String>) -> Self {
        let map = Self::default();
        map.lock().tile_url = tile_url.into();
        map
    }

    /// A map whose library fails to load.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let map = Self::default();
        map.lock().unavailable = Some(reason.into());
        map
    }

    pub fn set_available(&self, available: bool) {
        let mut state = self.lock();
        state.unavailable = if available {
            None
        } else {
            Some("map library disabled".to_string())
        };
    }

    /// Sends a click to the bound handlers. False when nothing is listening.
    pub fn click(&self, at: LatLon) -> bool {
        let state = self.lock();
        let mut delivered = false;
        for handler in &state.click_handlers {
            delivered |= handler.send(MapEvent::Click(at)).is_ok();
        }
        delivered
    }

    /// Moves the current marker and reports the drag end.
    pub fn drag_marker(&self, to: LatLon) -> bool {
        let mut state = self.lock();
        let Some(id) = state.markers.keys().max_by_key(|id| id.0).copied() else {
            return false;
        };
        if let Some(marker) = state.markers.get_mut(&id) {
            if !marker.draggable {
                return false;
            }
            marker.position = to;
        }
        state
            .drag_handlers
            .get(&id)
            .is_some_and(|handler| handler.send(MapEvent::MarkerDragEnd(to)).is_ok())
    }

    pub fn snapshot(&self) -> MapView {
        let state = self.lock();
        let marker = state
            .markers
            .iter()
            .max_by_key(|(id, _)| id.0)
            .map(|(_, marker)| marker.clone());
        MapView {
            initialized: state.init_count > 0,
            init_count: state.init_count,
            center: state.center,
            zoom: state.zoom,
            marker,
            marker_count: state.markers.len(),
            invalidations: state.invalidations,
            tile_url: state.tile_url.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MapState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MapProvider for HeadlessMap {
    fn initialize(&mut self, center: LatLon, zoom: u8) -> Result<()> {
        let mut state = self.lock();
        if let Some(reason) = &state.unavailable {
            return Err(FenceError::MapUnavailable {
                message: reason.clone(),
            });
        }
        state.init_count += 1;
        state.center = Some(center);
        state.zoom = zoom;
        tracing::debug!("🗺️ Map initialised at {} (zoom {})", center, zoom);
        Ok(())
    }

    fn set_view(&mut self, center: LatLon, zoom: u8) {
        let mut state = self.lock();
        state.center = Some(center);
        state.zoom = zoom;
    }

    fn add_marker(&mut self, position: LatLon, draggable: bool, label: &str) -> MarkerId {
        let mut state = self.lock();
        state.next_marker += 1;
        let id = MarkerId(state.next_marker);
        state.markers.insert(
            id,
            MarkerView {
                position,
                draggable,
                label: label.to_string(),
            },
        );
        id
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        let mut state = self.lock();
        state.markers.remove(&marker);
        state.drag_handlers.remove(&marker);
    }

    fn on_map_click(&mut self, handler: MapHandler) {
        self.lock().click_handlers.push(handler);
    }

    fn on_marker_drag_end(&mut self, marker: MarkerId, handler: MapHandler) {
        self.lock().drag_handlers.insert(marker, handler);
    }

    fn invalidate_size(&mut self) {
        self.lock().invalidations += 1;
    }
}
