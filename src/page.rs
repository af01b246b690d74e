use crate::assemble::MapDocument;
use crate::error::PageError;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.7.1/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.7.1/dist/leaflet.js";

static MAP_SCRIPT: &str = include_str!("../assets/map.js");

static STYLE: &str = r#"
        html, body { height: 100%; margin: 0; padding: 0; overflow: hidden; }
        #map-container { width: 100vw; height: 100vh; position: absolute; top: 0; left: 0; }
        .state-label {
            pointer-events: none;
            font-size: 12px;
            font-weight: bold;
            color: black;
            background: none;
            padding: 2px;
            border-radius: 3px;
            text-align: center;
        }
        .region-selected { filter: drop-shadow(0 0 10px rgba(0, 0, 0, 0.6)); }
        .leaflet-interactive { cursor: pointer; }
"#;

/// Render the complete page for one request.
pub fn render_page(doc: &MapDocument, viewport_meta: &str) -> Result<String, PageError> {
    let data = embed_json(&serde_json::to_string(doc)?);
    let title = escape_html(doc.title);
    let viewport = escape_html(viewport_meta);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="{viewport}">
    <title>{title}</title>
    <link rel="stylesheet" href="{LEAFLET_CSS}" />
    <script src="{LEAFLET_JS}"></script>
    <style>{STYLE}</style>
</head>
<body>
    <div id="map-container"></div>
    <script type="application/json" id="map-document">{data}</script>
    <script>
{MAP_SCRIPT}
    </script>
</body>
</html>
"#
    ))
}

/// JSON inside a `<script>` element must not be able to close it.
fn embed_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
