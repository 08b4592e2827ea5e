//! Location records and the list markup they are read from.
//!
//! The markup is one `<li>` per location:
//!
//! ```html
//! <li data-latlng="48.85,2.35"><abbr>PAR</abbr> <a href="/stations/par">Paris</a></li>
//! ```
//!
//! The `<abbr>` text becomes the marker label and the `<a href>` target the popup link.

use scraper::{Html, Selector};

use crate::foundation::error::{SketchError, SketchResult};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> SketchResult<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(SketchError::validation(format!(
                "latitude {lat} is outside [-90, 90]"
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(SketchError::validation(format!(
                "longitude {lng} is outside [-180, 180]"
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Parses `"lat,lng"`; whitespace around either number is ignored.
    pub fn parse(text: &str) -> SketchResult<Self> {
        let (lat, lng) = text
            .split_once(',')
            .ok_or_else(|| SketchError::markup(format!("coordinate '{text}' is not 'lat,lng'")))?;
        let num = |s: &str| {
            s.trim()
                .parse::<f64>()
                .map_err(|e| SketchError::markup(format!("coordinate '{text}': {e}")))
        };
        Self::new(num(lat)?, num(lng)?)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LocationRecord {
    pub position: LatLng,
    pub label: String,
    pub link: String,
}

impl LocationRecord {
    pub fn new(
        lat: f64,
        lng: f64,
        label: impl Into<String>,
        link: impl Into<String>,
    ) -> SketchResult<Self> {
        Ok(Self {
            position: LatLng::new(lat, lng)?,
            label: label.into(),
            link: link.into(),
        })
    }

    pub fn validate(&self) -> SketchResult<()> {
        LatLng::new(self.position.lat, self.position.lng)?;
        if self.link.trim().is_empty() {
            return Err(SketchError::validation(format!(
                "location '{}' has an empty link",
                self.label
            )));
        }
        Ok(())
    }
}

/// Reads records from a JSON array.
pub fn parse_records_json(json: &str) -> SketchResult<Vec<LocationRecord>> {
    let records: Vec<LocationRecord> = serde_json::from_str(json)?;
    for r in &records {
        r.validate()?;
    }
    Ok(records)
}

/// Reads one record per `<li data-latlng=..>` element, in document order.
///
/// List items without a `data-latlng` attribute are not locations and are skipped, as is
/// anything inside comments. A location item with a malformed coordinate or without its
/// `<abbr>` label or `<a href>` link fails the whole parse.
pub fn parse_location_list(markup: &str) -> SketchResult<Vec<LocationRecord>> {
    let doc = Html::parse_document(markup);
    let item_sel = selector("li[data-latlng]")?;
    let label_sel = selector("abbr")?;
    let link_sel = selector("a[href]")?;

    let mut records = Vec::new();
    for item in doc.select(&item_sel) {
        let coord = item.value().attr("data-latlng").unwrap_or_default();
        let position = LatLng::parse(coord)?;
        let label = item
            .select(&label_sel)
            .next()
            .map(|abbr| abbr.text().collect::<String>().trim().to_string())
            .ok_or_else(|| {
                SketchError::markup(format!("location '{coord}' has no <abbr> label"))
            })?;
        let link = item
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| {
                SketchError::markup(format!("location '{coord}' has no <a href> link"))
            })?;
        records.push(LocationRecord {
            position,
            label,
            link: link.to_string(),
        });
    }

    tracing::debug!(records = records.len(), "parsed location list");
    Ok(records)
}

fn selector(css: &str) -> SketchResult<Selector> {
    Selector::parse(css).map_err(|e| SketchError::markup(format!("selector '{css}': {e}")))
}
