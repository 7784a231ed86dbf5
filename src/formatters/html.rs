use crate::itinerary::maps::{attach_maps, LeafletScript, DEFAULT_ZOOM};
use crate::itinerary::view_models::*;
use crate::utils::escape_html;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Page-level rendering options.
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    pub title: String,
    pub map_zoom: u8,
    /// Load Leaflet from the CDN and emit map init calls
    pub maps: bool,
    /// Base URL of the state endpoints (`/api`); `None` renders a static page
    pub persistence_base: Option<String>,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            title: "Itinerary".to_string(),
            map_zoom: DEFAULT_ZOOM,
            maps: true,
            persistence_base: None,
        }
    }
}

/// HTML formatter for itinerary trees
pub struct HtmlFormatter;

impl HtmlFormatter {
    /// Format the tree as a standalone page with embedded CSS and scripts
    pub fn format(tree: &DisclosureTree, options: &HtmlOptions) -> String {
        let mut html = String::with_capacity(8192);

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape_html(&options.title)));
        if options.maps {
            html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", LEAFLET_CSS));
        }
        html.push_str("<style>\n");
        html.push_str("body { font-family: system-ui, sans-serif; max-width: 860px; margin: 40px auto; padding: 20px; line-height: 1.5; }\n");
        html.push_str("h1 { color: #2c3e50; }\n");
        html.push_str("details.day { border: 1px solid #dfe4ea; border-radius: 6px; margin: 12px 0; }\n");
        html.push_str(".day-summary { display: flex; justify-content: space-between; padding: 12px; cursor: pointer; background: #f5f7fa; }\n");
        html.push_str(".day-left .date { font-weight: 600; margin-right: 8px; }\n");
        html.push_str(".day-right span { margin-left: 12px; color: #57606f; }\n");
        html.push_str(".day-body { padding: 8px 12px; }\n");
        html.push_str("details.stop { border-left: 3px solid #70a1ff; margin: 8px 0; padding-left: 8px; }\n");
        html.push_str(".stop-summary { display: flex; justify-content: space-between; cursor: pointer; padding: 6px 0; }\n");
        html.push_str(".stop-summary .idx { color: #747d8c; margin: 0 6px; }\n");
        html.push_str(".stop-summary .time { color: #57606f; }\n");
        html.push_str(".desc { color: #2f3542; }\n");
        html.push_str("details.stop-section { margin: 6px 0; }\n");
        html.push_str(".section-title { font-weight: 600; cursor: pointer; }\n");
        html.push_str(".stop-map { height: 240px; margin: 8px 0; border-radius: 4px; }\n");
        html.push_str(".back-to-day { margin: 8px 0; }\n");
        html.push_str("</style>\n</head>\n<body>\n");

        html.push_str(&format!("<h1>{}</h1>\n", escape_html(&options.title)));
        html.push_str("<div id=\"itinerary-container\">\n");
        for day in &tree.days {
            Self::format_day(&mut html, day);
        }
        html.push_str("</div>\n");

        html.push_str("<script>\n");
        html.push_str(&Self::interaction_script(options.persistence_base.as_deref()));
        html.push_str("</script>\n");

        if options.maps {
            let mut leaflet = LeafletScript::new(options.map_zoom);
            if attach_maps(tree, &mut leaflet) > 0 {
                html.push_str(&format!("<script src=\"{}\"></script>\n", LEAFLET_JS));
                html.push_str("<script>\n");
                html.push_str(&leaflet.script());
                html.push_str("</script>\n");
            }
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    fn format_day(html: &mut String, day: &DayNode) {
        html.push_str(&format!(
            "<details class=\"day\" data-key=\"{}\"{}>\n",
            escape_html(day.key.as_str()),
            open_attr(day.open)
        ));
        html.push_str("<summary class=\"day-summary\">\n");
        html.push_str(&format!(
            "<div class=\"day-left\"><span class=\"date\">{}</span><span class=\"title\">{}</span></div>\n",
            escape_html(&day.date),
            escape_html(day.title.as_deref().unwrap_or(""))
        ));
        html.push_str(&format!(
            "<div class=\"day-right\"><span class=\"range\">{}</span><span class=\"stops\">{} stops</span><span class=\"progress\">{}% done</span></div>\n",
            escape_html(&day.range_label()),
            day.progress.total,
            day.progress.percent
        ));
        html.push_str("</summary>\n");

        html.push_str("<div class=\"day-body\">\n");
        for stop in &day.stops {
            Self::format_stop(html, stop);
        }
        html.push_str("</div>\n</details>\n");
    }

    fn format_stop(html: &mut String, stop: &StopNode) {
        html.push_str(&format!(
            "<details class=\"stop\" data-key=\"{}\"{}>\n",
            escape_html(stop.key.as_str()),
            open_attr(stop.open)
        ));
        html.push_str("<summary class=\"stop-summary\">\n");
        html.push_str(&format!(
            "<label><input type=\"checkbox\" class=\"stop-checkbox\" data-id=\"{}\"{} /><span class=\"idx\">{}</span><span class=\"name\">{}</span></label>\n",
            escape_html(stop.persistence_id()),
            if stop.done { " checked" } else { "" },
            stop.position_label(),
            escape_html(&stop.name)
        ));
        html.push_str(&format!(
            "<span class=\"time\">{}</span>\n",
            escape_html(stop.time.as_deref().unwrap_or(""))
        ));
        html.push_str("</summary>\n");

        html.push_str("<div class=\"stop-body\">\n");
        for block in &stop.body {
            match block {
                StopBlock::Description { text } => {
                    html.push_str(&format!("<p class=\"desc\">{}</p>\n", escape_html(text)));
                }
                StopBlock::Section(section) => Self::format_section(html, section),
                StopBlock::Map(map) => {
                    html.push_str(&format!(
                        "<div id=\"{}\" class=\"stop-map\" data-coords=\"{}\"></div>\n",
                        escape_html(&map.id),
                        escape_html(&map.coordinates)
                    ));
                }
                StopBlock::BackToOverview => {
                    html.push_str("<button class=\"back-to-day\" type=\"button\">\u{2190} Back to overview</button>\n");
                }
            }
        }
        html.push_str("</div>\n</details>\n");
    }

    fn format_section(html: &mut String, section: &SectionNode) {
        html.push_str(&format!(
            "<details class=\"stop-section\" data-key=\"{}\"{}>\n",
            escape_html(section.key.as_str()),
            open_attr(section.open)
        ));
        html.push_str(&format!(
            "<summary class=\"section-title\">{}</summary>\n",
            escape_html(&section.title)
        ));
        html.push_str("<ul class=\"section-list\">\n");
        for item in &section.items {
            html.push_str(&format!("<li>{}</li>\n", escape_html(item)));
        }
        html.push_str("</ul>\n</details>\n");
    }

    /// Back-to-overview wiring plus, when a base URL is set, POSTs for
    /// checkbox and open/close changes.
    fn interaction_script(persistence_base: Option<&str>) -> String {
        let mut js = String::with_capacity(1024);
        js.push_str("(function() {\n");
        js.push_str("  var container = document.getElementById('itinerary-container');\n");
        js.push_str("  if (!container) return;\n");
        js.push_str("  container.addEventListener('click', function(e) {\n");
        js.push_str("    var btn = e.target.closest('.back-to-day');\n");
        js.push_str("    if (!btn) return;\n");
        js.push_str("    var stop = btn.closest('details.stop');\n");
        js.push_str("    if (stop) stop.open = false;\n");
        js.push_str("  });\n");

        if let Some(base) = persistence_base {
            let base = base.trim_end_matches('/').replace('\'', "\\'");
            js.push_str(&format!("  var base = '{}';\n", base));
            js.push_str("  function post(path, body) {\n");
            js.push_str("    fetch(base + path, { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(body) }).catch(function() {});\n");
            js.push_str("  }\n");
            js.push_str("  container.addEventListener('change', function(e) {\n");
            js.push_str("    if (!e.target.matches('.stop-checkbox')) return;\n");
            js.push_str("    post('/stops/' + encodeURIComponent(e.target.dataset.id) + '/done', { done: e.target.checked });\n");
            js.push_str("  });\n");
            // toggle does not bubble, so listen in the capture phase
            js.push_str("  container.addEventListener('toggle', function(e) {\n");
            js.push_str("    if (!e.target.matches('details[data-key]')) return;\n");
            js.push_str("    post('/nodes/' + encodeURIComponent(e.target.dataset.key) + '/open', { open: e.target.open });\n");
            js.push_str("  }, true);\n");
        }

        js.push_str("})();\n");
        js
    }
}

fn open_attr(open: bool) -> &'static str {
    if open {
        " open"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::types::Document;
    use crate::itinerary::view_builder::build;
    use serde_json::json;

    fn sample_tree() -> DisclosureTree {
        let document = Document::from_value(&json!({ "days": [{
            "date": "2024-05-01",
            "title": "Paris <Day 1>",
            "start": "09:00",
            "end": "18:00",
            "open": true,
            "stops": [
                {
                    "id": "louvre",
                    "name": "Louvre",
                    "scheduledTime": "09:30",
                    "description": "Art & antiquities",
                    "done": true,
                    "tips": ["Arrive early"],
                    "coordinates": "48.8606,2.3376"
                },
                { "name": "Seine walk" }
            ]
        }]}))
        .unwrap();
        build(&document)
    }

    #[test]
    fn test_format_html() {
        let html = HtmlFormatter::format(&sample_tree(), &HtmlOptions::default());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<details class=\"day\" data-key=\"day:2024-05-01\" open>"));
        assert!(html.contains("<span class=\"title\">Paris &lt;Day 1&gt;</span>"));
        assert!(html.contains("<span class=\"range\">09:00\u{2013}18:00</span>"));
        assert!(html.contains("<span class=\"stops\">2 stops</span>"));
        assert!(html.contains("<span class=\"progress\">50% done</span>"));
        assert!(html.contains("data-id=\"louvre\" checked"));
        assert!(html.contains("data-id=\"stop#1-2\" />"));
        assert!(html.contains("<span class=\"idx\">1/2</span>"));
        assert!(html.contains("<p class=\"desc\">Art &amp; antiquities</p>"));
        assert!(html.contains("<summary class=\"section-title\">Tips</summary>"));
        assert!(html.contains("<li>Arrive early</li>"));
        assert!(html.contains("<div id=\"map-louvre\" class=\"stop-map\" data-coords=\"48.8606,2.3376\"></div>"));
        assert_eq!(html.matches("class=\"back-to-day\"").count(), 2);
        assert!(html.contains("stopMap(\"map-louvre\", 48.8606, 2.3376, 13);"));
    }

    #[test]
    fn test_static_page_has_no_persistence_calls() {
        let html = HtmlFormatter::format(&sample_tree(), &HtmlOptions::default());
        assert!(!html.contains("fetch("));

        let options = HtmlOptions {
            persistence_base: Some("/api/".to_string()),
            ..HtmlOptions::default()
        };
        let html = HtmlFormatter::format(&sample_tree(), &options);
        assert!(html.contains("var base = '/api';"));
        assert!(html.contains("'/stops/'"));
        assert!(html.contains("'/nodes/'"));
    }

    #[test]
    fn test_maps_disabled() {
        let options = HtmlOptions {
            maps: false,
            ..HtmlOptions::default()
        };
        let html = HtmlFormatter::format(&sample_tree(), &options);
        assert!(!html.contains("leaflet"));
        assert!(html.contains("class=\"stop-map\""));
    }

    #[test]
    fn test_closed_nodes_have_no_open_attribute() {
        let html = HtmlFormatter::format(&sample_tree(), &HtmlOptions::default());
        assert!(html.contains("<details class=\"stop\" data-key=\"stop:louvre\">"));
        assert!(html.contains("<details class=\"stop-section\" data-key=\"stop:louvre:tips\">"));
    }
}
