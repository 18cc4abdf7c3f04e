//! Built-in result builders.
//!
//! Handles JSON, YAML, XML, CSV and RSS output. The structured formats
//! serialize the result's JSON projection; RSS only accepts item lists.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use crate::render::{BuildError, Response, ResultBuilder};
use crate::result::ResultData;

/// Pretty or compact JSON. The standard default builder.
#[derive(Debug, Clone, Copy)]
pub struct JsonBuilder {
    pretty: bool,
}

impl JsonBuilder {
    /// Compact output.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonBuilder {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl ResultBuilder for JsonBuilder {
    fn format(&self) -> &'static str {
        "json"
    }

    fn build(&self, result: &dyn ResultData) -> Result<Response, BuildError> {
        let value = result.to_json()?;
        let body = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(Response::new("application/json", body))
    }
}

/// YAML output.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlBuilder;

impl ResultBuilder for YamlBuilder {
    fn format(&self) -> &'static str {
        "yaml"
    }

    fn build(&self, result: &dyn ResultData) -> Result<Response, BuildError> {
        let value = result.to_json()?;
        Ok(Response::new("application/yaml", serde_yaml::to_string(&value)?))
    }
}

/// XML output wrapped in a single root element.
#[derive(Debug, Clone)]
pub struct XmlBuilder {
    root: &'static str,
}

impl XmlBuilder {
    /// Uses `root` as the document element name.
    pub fn with_root(root: &'static str) -> Self {
        Self { root }
    }
}

impl Default for XmlBuilder {
    fn default() -> Self {
        Self { root: "result" }
    }
}

impl ResultBuilder for XmlBuilder {
    fn format(&self) -> &'static str {
        "xml"
    }

    fn build(&self, result: &dyn ResultData) -> Result<Response, BuildError> {
        let value = result.to_json()?;
        let body = quick_xml::se::to_string_with_root(self.root, &value)
            .map_err(|e| BuildError::Xml(e.to_string()))?;
        Ok(Response::new("application/xml", body))
    }
}

/// CSV output.
///
/// The JSON projection is flattened: arrays of objects become one row per
/// object, a single object becomes `key,value` rows, and item lists emit
/// their `items`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvBuilder;

impl ResultBuilder for CsvBuilder {
    fn format(&self) -> &'static str {
        "csv"
    }

    fn build(&self, result: &dyn ResultData) -> Result<Response, BuildError> {
        let mut value = result.to_json()?;
        if result.is_item_list() {
            value = value.get_mut("items").map(Value::take).unwrap_or(Value::Null);
        }
        Ok(Response::new("text/csv", flatten_json_to_csv(&value)?))
    }
}

/// Flattens JSON data to CSV format.
fn flatten_json_to_csv(value: &Value) -> Result<String, BuildError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let csv_err = |e: csv::Error| BuildError::Csv(e.to_string());

    match value {
        Value::Array(arr) if !arr.is_empty() => {
            // Get headers from first object
            if let Some(Value::Object(first)) = arr.first() {
                let headers: Vec<&str> = first.keys().map(|s| s.as_str()).collect();
                wtr.write_record(&headers).map_err(csv_err)?;

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| obj.get(*h).map(value_to_string).unwrap_or_default())
                            .collect();
                        wtr.write_record(&row).map_err(csv_err)?;
                    }
                }
            } else {
                wtr.write_record(["value"]).map_err(csv_err)?;
                for item in arr {
                    wtr.write_record([value_to_string(item)]).map_err(csv_err)?;
                }
            }
        }
        Value::Array(_) | Value::Null => {}
        Value::Object(obj) => {
            wtr.write_record(["key", "value"]).map_err(csv_err)?;
            for (k, v) in obj {
                wtr.write_record([k.as_str(), &value_to_string(v)])
                    .map_err(csv_err)?;
            }
        }
        _ => {
            wtr.write_record(["value"]).map_err(csv_err)?;
            wtr.write_record([value_to_string(value)]).map_err(csv_err)?;
        }
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| BuildError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| BuildError::Csv(e.to_string()))
}

/// Converts a JSON value to a string for CSV output.
fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// RSS 2.0 feed output for item lists.
///
/// Channel title and description come from the list. Each item's `title`,
/// `link` and `description` elements are taken from the first matching field
/// of the item object:
///
/// | Element | Fields tried |
/// |---------|--------------|
/// | `title` | `title`, `name` |
/// | `link` | `link`, `url` |
/// | `description` | `description`, `summary` |
///
/// Any other result shape is [`BuildError::Unsupported`].
#[derive(Debug, Clone)]
pub struct RssBuilder {
    link: String,
}

impl RssBuilder {
    /// Sets the channel link.
    pub fn with_link(link: impl Into<String>) -> Self {
        Self { link: link.into() }
    }
}

impl Default for RssBuilder {
    fn default() -> Self {
        Self {
            link: String::from("/"),
        }
    }
}

impl ResultBuilder for RssBuilder {
    fn format(&self) -> &'static str {
        "rss"
    }

    fn build(&self, result: &dyn ResultData) -> Result<Response, BuildError> {
        if !result.is_item_list() {
            return Err(BuildError::unsupported(self.format(), result));
        }
        let value = result.to_json()?;
        let body = write_feed(&value, &self.link).map_err(|e| BuildError::Xml(e.to_string()))?;
        Ok(Response::new("application/rss+xml", body))
    }
}

fn first_text(item: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|f| item.get(*f))
        .find(|v| !v.is_null())
        .map(value_to_string)
}

fn text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_feed(list: &Value, link: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("rss").with_attributes([("version", "2.0")]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    let field = |name: &str| list.get(name).and_then(Value::as_str).unwrap_or_default();
    text_element(&mut writer, "title", field("title"))?;
    text_element(&mut writer, "link", link)?;
    text_element(&mut writer, "description", field("description"))?;

    let items = list
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for item in items {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        match item {
            Value::Object(_) => {
                if let Some(title) = first_text(item, &["title", "name"]) {
                    text_element(&mut writer, "title", &title)?;
                }
                if let Some(url) = first_text(item, &["link", "url"]) {
                    text_element(&mut writer, "link", &url)?;
                }
                if let Some(desc) = first_text(item, &["description", "summary"]) {
                    text_element(&mut writer, "description", &desc)?;
                }
            }
            other => text_element(&mut writer, "title", &value_to_string(other))?,
        }
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Data, ItemList};
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Doc {
        title: String,
        url: String,
    }

    fn docs() -> ItemList<Doc> {
        ItemList::new(vec![
            Doc {
                title: "Rust & Go".into(),
                url: "https://example.org/1".into(),
            },
            Doc {
                title: "Zig".into(),
                url: "https://example.org/2".into(),
            },
        ])
        .title("Search results")
        .description("query: *")
        .total_count(2)
    }

    #[test]
    fn json_pretty_prints() {
        let response = JsonBuilder::default().build(&docs()).unwrap();
        assert_eq!(response.content_type, "application/json");
        assert!(response.body.contains("\"totalCount\": 2"));
    }

    #[test]
    fn json_compact() {
        let response = JsonBuilder::compact().build(&json!({"a": 1})).unwrap();
        assert_eq!(response.body, r#"{"a":1}"#);
    }

    #[test]
    fn yaml_output() {
        let data = Data::new("status", json!({"name": "test", "value": 42}));
        let body = YamlBuilder.build(&data).unwrap().body;
        assert!(body.contains("name: test"));
        assert!(body.contains("value: 42"));
    }

    #[test]
    fn xml_uses_result_root() {
        let data = Data::new("status", json!({"name": "test", "value": 42}));
        let body = XmlBuilder::default().build(&data).unwrap().body;
        assert!(body.starts_with("<result>"));
        assert!(body.contains("<name>test</name>"));
        assert!(body.contains("<value>42</value>"));
    }

    #[test]
    fn csv_array_of_objects() {
        let data = json!([
            {"name": "Alice", "age": 30},
            {"name": "Bob", "age": 25}
        ]);
        let body = CsvBuilder.build(&data).unwrap().body;
        assert!(body.contains("name"));
        assert!(body.contains("Alice"));
        assert!(body.contains("25"));
    }

    #[test]
    fn csv_single_object() {
        let body = CsvBuilder.build(&json!({"name": "Alice"})).unwrap().body;
        assert!(body.contains("key,value"));
        assert!(body.contains("name,Alice"));
    }

    #[test]
    fn csv_item_list_emits_items() {
        let body = CsvBuilder.build(&docs()).unwrap().body;
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some("title,url"));
        assert_eq!(lines.next(), Some("Rust & Go,https://example.org/1"));
    }

    #[test]
    fn rss_feed_from_item_list() {
        let body = RssBuilder::default().build(&docs()).unwrap().body;
        assert!(body.contains(r#"<rss version="2.0">"#));
        assert!(body.contains("<title>Search results</title>"));
        assert!(body.contains("<title>Rust &amp; Go</title>"));
        assert!(body.contains("<link>https://example.org/2</link>"));
    }

    #[test]
    fn rss_rejects_other_shapes() {
        let err = RssBuilder::default()
            .build(&String::from("plain"))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Unsupported {
                format: "rss",
                shape: "string"
            }
        ));
    }
}
