//! Interactive observation map as a Plotly `scattermapbox` figure.

use crate::config::MapConfig;
use crate::model::{EnrichedObservation, RenderError};
use crate::renderer::colors::Rgb;
use serde_json::{Value, json};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";
const MARKER_SIZE: u32 = 7;
const MARKER_OPACITY: f64 = 0.5;

/// Builds the Plotly figure: one marker per observation, hover text is the date.
pub fn build_figure(
    points: &[EnrichedObservation],
    token: &str,
    view: &MapConfig,
    title: &str,
    color: Rgb,
) -> Value {
    let lat: Vec<f64> = points.iter().map(|p| p.latitude).collect();
    let lon: Vec<f64> = points.iter().map(|p| p.longitude).collect();
    let text: Vec<String> = points
        .iter()
        .map(|p| p.observation_date.format("%Y-%m-%d").to_string())
        .collect();

    json!({
        "data": [{
            "type": "scattermapbox",
            "lat": lat,
            "lon": lon,
            "mode": "markers",
            "marker": {
                "size": MARKER_SIZE,
                "color": color.to_hex(),
                "opacity": MARKER_OPACITY,
            },
            "text": text,
        }],
        "layout": {
            "title": title,
            "autosize": true,
            "height": 900,
            "width": 700,
            "hovermode": "closest",
            "mapbox": {
                "style": view.style,
                "accesstoken": token,
                "bearing": 0,
                "center": { "lat": view.center_lat, "lon": view.center_lon },
                "pitch": 0,
                "zoom": view.zoom,
            },
        },
    })
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Wraps a figure in a standalone HTML page that loads plotly.js.
pub fn render_html(figure: &Value, title: &str) -> Result<String, RenderError> {
    // "</" inside a script block would end it early.
    let payload = serde_json::to_string(figure)?.replace("</", "<\\/");
    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <script src=\"{}\"></script>\n</head>\n<body>\n<div id=\"map\"></div>\n\
         <script>\nvar figure = {};\nPlotly.newPlot(\"map\", figure.data, figure.layout);\n</script>\n\
         </body>\n</html>\n",
        escape_html(title),
        PLOTLY_CDN,
        payload
    ))
}
