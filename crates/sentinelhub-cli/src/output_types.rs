//! Structured output rows for tables and JSON

use serde::Serialize;
use tabled::Tabled;

fn marker(selected: bool) -> &'static str {
    if selected {
        "*"
    } else {
        ""
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigurationRow {
    #[tabled(rename = "")]
    #[serde(skip)]
    pub marker: &'static str,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(skip)]
    pub selected: bool,
}

impl ConfigurationRow {
    pub fn new(id: String, name: String, selected: bool) -> Self {
        Self { marker: marker(selected), id, name, selected }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct LayerRow {
    #[tabled(rename = "")]
    #[serde(skip)]
    pub marker: &'static str,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Data source")]
    pub data_source: String,
    #[tabled(rename = "Type")]
    pub source_type: String,
    #[tabled(skip)]
    pub selected: bool,
}

impl LayerRow {
    pub fn new(id: String, name: String, data_source: String, source_type: String, selected: bool) -> Self {
        Self { marker: marker(selected), id, name, data_source, source_type, selected }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct CrsRow {
    #[tabled(rename = "")]
    #[serde(skip)]
    pub marker: &'static str,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(skip)]
    pub selected: bool,
}

impl CrsRow {
    pub fn new(id: String, name: String, description: String, selected: bool) -> Self {
        Self { marker: marker(selected), id, name, description, selected }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct SettingRow {
    #[tabled(rename = "Setting")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Saved")]
    pub saved: &'static str,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct CloudCoverRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Cloud cover (%)")]
    pub cloud_cover: f64,
}
