use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    pub selector: String,
    #[serde(default)]
    pub style: Map<String, Value>,
}

/// Selector/property style sheet handed to the rendering surface. Later rules
/// override earlier ones for the same selector and property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSheet {
    pub rules: Vec<StyleRule>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Default for StyleSheet {
    fn default() -> Self {
        let rules = json!([
            {
                "selector": "node",
                "style": {
                    "label": "data(label)",
                    "background-color": "#6FB1FC",
                    "width": "mapData(id.length, 4, 2, 20, 50)",
                    "height": "mapData(id.length, 4, 2, 20, 50)",
                    "font-size": "mapData(id.length, 4, 2, 8, 16)"
                }
            },
            {
                "selector": "edge",
                "style": {
                    "target-arrow-shape": "triangle",
                    "target-arrow-color": "#ccc",
                    "line-color": "#ccc",
                    "width": 1
                }
            },
            {
                "selector": "node:selected",
                "style": {
                    "background-color": "orange",
                    "border-width": 3,
                    "border-color": "black",
                    "z-index": 99
                }
            },
            {
                "selector": ".highlighted",
                "style": {
                    "background-color": "yellow",
                    "border-color": "#ffc107",
                    "border-width": 2,
                    "z-index": 98
                }
            }
        ]);

        serde_json::from_value(rules).unwrap_or(Self { rules: Vec::new() })
    }
}

impl StyleSheet {
    /// Falls back to the built-in sheet when a loaded sheet has no rules.
    pub fn or_default(self) -> Self {
        if self.rules.is_empty() {
            Self::default()
        } else {
            self
        }
    }

    pub fn property(&self, selector: &str, property: &str) -> Option<&Value> {
        self.rules
            .iter()
            .rev()
            .filter(|rule| rule.selector == selector)
            .find_map(|rule| rule.style.get(property))
    }

    pub fn color(&self, selector: &str, property: &str) -> Option<Rgb> {
        self.property(selector, property)
            .and_then(Value::as_str)
            .and_then(parse_color)
    }

    pub fn number(&self, selector: &str, property: &str) -> Option<f64> {
        self.property(selector, property).and_then(Value::as_f64)
    }
}

fn parse_color(value: &str) -> Option<Rgb> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return match hex.len() {
            3 => {
                let mut channels = hex.chars().map(|ch| ch.to_digit(16).map(|d| (d * 17) as u8));
                Some(Rgb(channels.next()??, channels.next()??, channels.next()??))
            }
            6 => {
                let channel = |range: std::ops::Range<usize>| {
                    hex.get(range)
                        .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                };
                Some(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
            }
            _ => None,
        };
    }

    match value.to_ascii_lowercase().as_str() {
        "black" => Some(Rgb(0, 0, 0)),
        "white" => Some(Rgb(255, 255, 255)),
        "gray" | "grey" => Some(Rgb(128, 128, 128)),
        "red" => Some(Rgb(255, 0, 0)),
        "green" => Some(Rgb(0, 128, 0)),
        "blue" => Some(Rgb(0, 0, 255)),
        "yellow" => Some(Rgb(255, 255, 0)),
        "orange" => Some(Rgb(255, 165, 0)),
        _ => None,
    }
}
