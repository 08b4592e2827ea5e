use std::collections::BTreeMap;

use crate::{
    foundation::error::{SketchError, SketchResult},
    map::record::{LatLng, LocationRecord},
};

/// Initial camera of the world map.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: LatLng { lat: 20.0, lng: 0.0 },
            zoom: 1,
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct MarkerId(pub u32);

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub position: LatLng,
    pub title: String,
}

/// What a click on a marker resolves to.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarkerTarget {
    pub title: String,
    pub link: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Popup {
    pub anchor: MarkerId,
    /// Visible link text.
    pub text: String,
    pub href: String,
}

impl Popup {
    /// Browsing context the link opens in.
    pub const TARGET: &'static str = "_blank";

    pub fn to_html(&self) -> String {
        format!(
            r#"<a href="{}" target="{}">{}</a>"#,
            escape_html(&self.href),
            Self::TARGET,
            escape_html(&self.text)
        )
    }
}

/// A world map with one marker per location and at most one open popup.
#[derive(Clone, Debug, Default)]
pub struct MapViewer {
    view: MapView,
    markers: Vec<Marker>,
    targets: BTreeMap<MarkerId, MarkerTarget>,
    popup: Option<Popup>,
}

impl MapViewer {
    pub fn new(view: MapView) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    /// Places one marker per record, in record order.
    pub fn with_records(
        view: MapView,
        records: impl IntoIterator<Item = LocationRecord>,
    ) -> SketchResult<Self> {
        let mut viewer = Self::new(view);
        for record in records {
            viewer.add_record(record)?;
        }
        tracing::info!(markers = viewer.markers.len(), "map initialized");
        Ok(viewer)
    }

    pub fn add_record(&mut self, record: LocationRecord) -> SketchResult<MarkerId> {
        record.validate()?;
        let id = MarkerId(
            u32::try_from(self.markers.len())
                .map_err(|_| SketchError::validation("too many markers"))?,
        );
        self.markers.push(Marker {
            id,
            position: record.position,
            title: record.label.clone(),
        });
        self.targets.insert(
            id,
            MarkerTarget {
                title: record.label,
                link: record.link,
            },
        );
        Ok(id)
    }

    pub fn view(&self) -> MapView {
        self.view
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.0 as usize)
    }

    pub fn target(&self, id: MarkerId) -> Option<&MarkerTarget> {
        self.targets.get(&id)
    }

    /// Opens the popup of `id`, replacing whichever popup was open.
    pub fn click(&mut self, id: MarkerId) -> SketchResult<&Popup> {
        let target = self
            .targets
            .get(&id)
            .ok_or_else(|| SketchError::validation(format!("no marker with id {}", id.0)))?;
        tracing::debug!(marker = id.0, link = %target.link, "marker clicked");
        let popup = self.popup.insert(Popup {
            anchor: id,
            text: target.title.clone(),
            href: target.link.clone(),
        });
        Ok(popup)
    }

    pub fn open_popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn close_popup(&mut self) -> Option<Popup> {
        self.popup.take()
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
