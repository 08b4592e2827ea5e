use crate::{
    foundation::error::SketchResult,
    map::viewer::{MapViewer, Popup, escape_html},
};

#[derive(serde::Serialize)]
struct PageMarker<'a> {
    id: u32,
    lat: f64,
    lng: f64,
    title: &'a str,
    popup: String,
}

/// Standalone HTML page showing the viewer's markers on a Leaflet map. Clicking a marker
/// opens the same popup [`MapViewer::click`] produces.
pub fn render_leaflet_page(viewer: &MapViewer, title: &str) -> SketchResult<String> {
    let markers = viewer
        .markers()
        .iter()
        .filter_map(|m| {
            let target = viewer.target(m.id)?;
            let popup = Popup {
                anchor: m.id,
                text: target.title.clone(),
                href: target.link.clone(),
            };
            Some(PageMarker {
                id: m.id.0,
                lat: m.position.lat,
                lng: m.position.lng,
                title: &m.title,
                popup: popup.to_html(),
            })
        })
        .collect::<Vec<_>>();

    let view = viewer.view();
    let view_json = serde_json::to_string(&serde_json::json!({
        "center": [view.center.lat, view.center.lng],
        "zoom": view.zoom,
    }))?;
    let markers_json = serde_json::to_string(&markers)?;

    Ok(fill_template(
        MAP_HTML,
        &[
            ("TITLE", escape_html(title)),
            ("VIEW_JSON", script_safe(&view_json)),
            ("MARKERS_JSON", script_safe(&markers_json)),
        ],
    ))
}

/// Replaces `{{KEY}}` placeholders in one pass over `template`; substituted text is never
/// scanned again. Unknown placeholders are kept as written.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let value = after.find("}}").and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (v, close + 2))
        });
        match value {
            Some((v, len)) => {
                out.push_str(v);
                rest = &after[len..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Keeps embedded JSON from terminating the surrounding `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\!--")
}

const MAP_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{TITLE}}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <style>
        body { margin: 0; padding: 0; font-family: Arial, sans-serif; }
        #map { height: 100vh; width: 100%; }
    </style>
</head>
<body>
    <div id="map"></div>
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script>
        const VIEW = {{VIEW_JSON}};
        const MARKERS = {{MARKERS_JSON}};

        const map = L.map('map').setView(VIEW.center, VIEW.zoom);
        L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
            maxZoom: 18,
            attribution: '&copy; OpenStreetMap contributors'
        }).addTo(map);

        // Leaflet keeps a single popup open per map.
        for (const m of MARKERS) {
            L.marker([m.lat, m.lng], { title: m.title })
                .addTo(map)
                .bindPopup(m.popup);
        }
    </script>
</body>
</html>
"#;
