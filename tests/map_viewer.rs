use sketchbook::{
    LatLng, LocationRecord, MapView, MapViewer, MarkerId, Popup, parse_location_list,
    parse_records_json, render_leaflet_page,
};

const STATIONS: &str = r#"
<ul class="locations">
  <li data-latlng="20,0"><abbr>X</abbr> <a href="http://example.com">Example</a></li>
  <li data-latlng="51.47,-0.45"><abbr>LHR</abbr> <a href="https://example.org/lhr">Heathrow</a></li>
  <li class="note">not a location</li>
</ul>
"#;

#[test]
fn single_record_end_to_end() {
    let records = parse_location_list(STATIONS).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].position, LatLng { lat: 20.0, lng: 0.0 });
    assert_eq!(records[0].label, "X");
    assert_eq!(records[0].link, "http://example.com");

    let mut viewer = MapViewer::with_records(MapView::default(), records).unwrap();
    assert_eq!(viewer.markers().len(), 2);
    assert_eq!(viewer.markers()[0].title, "X");

    let popup = viewer.click(MarkerId(0)).unwrap().clone();
    assert_eq!(
        popup,
        Popup {
            anchor: MarkerId(0),
            text: "X".to_string(),
            href: "http://example.com".to_string(),
        }
    );
    assert_eq!(
        popup.to_html(),
        r#"<a href="http://example.com" target="_blank">X</a>"#
    );
}

#[test]
fn second_click_replaces_open_popup() {
    let records = parse_location_list(STATIONS).unwrap();
    let mut viewer = MapViewer::with_records(MapView::default(), records).unwrap();
    viewer.click(MarkerId(0)).unwrap();
    viewer.click(MarkerId(1)).unwrap();
    let open = viewer.open_popup().unwrap();
    assert_eq!(open.anchor, MarkerId(1));
    assert_eq!(open.href, "https://example.org/lhr");
}

#[test]
fn empty_list_yields_empty_map() {
    let records = parse_location_list("<ul></ul>").unwrap();
    let viewer = MapViewer::with_records(MapView::default(), records).unwrap();
    assert!(viewer.markers().is_empty());
    assert!(viewer.open_popup().is_none());

    let html = render_leaflet_page(&viewer, "Empty").unwrap();
    assert!(html.contains("const MARKERS = [];"));
}

#[test]
fn json_records_match_markup_records() {
    let json = r#"[
        {"position":{"lat":20.0,"lng":0.0},"label":"X","link":"http://example.com"}
    ]"#;
    let from_json = parse_records_json(json).unwrap();
    let expected = LocationRecord::new(20.0, 0.0, "X", "http://example.com").unwrap();
    assert_eq!(from_json, vec![expected.clone()]);
    assert_eq!(parse_location_list(STATIONS).unwrap()[0], expected);
}

#[test]
fn malformed_coordinates_fail_the_whole_list() {
    let markup = r#"<ul>
      <li data-latlng="1,2"><abbr>A</abbr><a href="a">a</a></li>
      <li data-latlng="1;2"><abbr>B</abbr><a href="b">b</a></li>
    </ul>"#;
    assert!(parse_location_list(markup).is_err());
}
