//! Result data contracts.
//!
//! Invoked methods return a value implementing [`ResultData`]. Builders only
//! see results through this trait, so a method can return anything from a
//! bare [`String`] to a full [`ItemList`].
//!
//! # Capabilities
//!
//! Beyond its JSON projection, a result may opt into two capabilities:
//!
//! - **Debug info**: [`attach_debug_info`](ResultData::attach_debug_info)
//!   accepts a [`DebugInfo`] payload when debugging is enabled for a request.
//! - **Item list**: [`is_item_list`](ResultData::is_item_list) marks results
//!   with `title`, `description` and `items` fields that feed builders such as
//!   RSS.

use std::any::Any;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;

/// Trace payload attached to results when debugging is enabled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    /// Component name.
    pub component: String,
    /// Method name.
    pub method: String,
    /// The selected overload, e.g. `Find(string, int)`.
    pub signature: String,
    /// Bound arguments as `name = value`, in formal order.
    pub arguments: Vec<String>,
    /// Requested format token, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// When dispatch began.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// Time spent in the invoked method, in microseconds.
    pub elapsed_micros: u64,
}

impl DebugInfo {
    /// Records the invocation duration.
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_micros = micros(elapsed);
    }
}

/// Whole microseconds in `elapsed`, saturating at `u64::MAX`.
pub(crate) fn micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

/// A value returned by an invoked method.
pub trait ResultData: Send + 'static {
    /// Short name of the result's shape, used in error messages.
    fn shape(&self) -> &'static str;

    /// JSON projection used by the structured builders.
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Attaches a debug payload.
    ///
    /// Returns false when this result has no room for one.
    fn attach_debug_info(&mut self, _info: DebugInfo) -> bool {
        false
    }

    /// The attached debug payload, if any.
    fn debug_info(&self) -> Option<&DebugInfo> {
        None
    }

    /// Returns true if the JSON projection is an item list object.
    fn is_item_list(&self) -> bool {
        false
    }

    /// Upcast for downcasting to the concrete result type.
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn ResultData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultData")
            .field("shape", &self.shape())
            .finish_non_exhaustive()
    }
}

impl ResultData for serde_json::Value {
    fn shape(&self) -> &'static str {
        "json"
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ResultData for String {
    fn shape(&self) -> &'static str {
        "string"
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(serde_json::Value::String(self.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Serialize + Send + 'static> ResultData for Vec<T> {
    fn shape(&self) -> &'static str {
        "list"
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wraps any serializable value as a result.
///
/// ```
/// use callsite_dispatch::{Data, ResultData};
///
/// #[derive(serde::Serialize)]
/// struct Health { ok: bool }
///
/// let result = Data::new("health", Health { ok: true });
/// assert_eq!(result.to_json().unwrap()["ok"], true);
/// ```
#[derive(Debug, Clone)]
pub struct Data<T> {
    shape: &'static str,
    value: T,
}

impl<T> Data<T> {
    /// Wraps `value`, reporting `shape` in error messages.
    pub fn new(shape: &'static str, value: T) -> Self {
        Self { shape, value }
    }

    /// The wrapped value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Unwraps the value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Serialize + Send + 'static> ResultData for Data<T> {
    fn shape(&self) -> &'static str {
        self.shape
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A titled list of items, optionally with the total number of matches.
///
/// Serializes as:
///
/// ```json
/// {
///   "title": "...",
///   "description": "...",
///   "totalCount": 120,
///   "items": [ ... ],
///   "debugInfo": { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemList<T> {
    /// Feed title.
    pub title: String,
    /// Feed description.
    pub description: String,
    /// Total number of matches, when the list is a page of a larger set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    /// The items.
    pub items: Vec<T>,
    /// Debug payload, attached by the dispatcher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl<T> ItemList<T> {
    /// Creates a list with an empty title and description.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            total_count: None,
            items,
            debug_info: None,
        }
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the total match count.
    pub fn total_count(mut self, total: u64) -> Self {
        self.total_count = Some(total);
        self
    }
}

impl<T: Serialize + Send + 'static> ResultData for ItemList<T> {
    fn shape(&self) -> &'static str {
        if self.total_count.is_some() {
            "item list with count"
        } else {
            "item list"
        }
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn attach_debug_info(&mut self, info: DebugInfo) -> bool {
        self.debug_info = Some(info);
        true
    }

    fn debug_info(&self) -> Option<&DebugInfo> {
        self.debug_info.as_ref()
    }

    fn is_item_list(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn debug_info() -> DebugInfo {
        DebugInfo {
            component: "Search".into(),
            method: "Find".into(),
            signature: "Find(string, int)".into(),
            arguments: vec!["query = \"*\"".into(), "limit = 10".into()],
            format: Some("json".into()),
            started_at: datetime!(2024-01-02 03:04:05 UTC),
            elapsed_micros: 0,
        }
    }

    #[test]
    fn item_list_serializes_camel_case() {
        let list = ItemList::new(vec![json!({"title": "a"})])
            .title("Results")
            .total_count(7);
        let value = list.to_json().unwrap();

        assert_eq!(value["title"], "Results");
        assert_eq!(value["totalCount"], 7);
        assert!(value.get("debugInfo").is_none());
        assert_eq!(list.shape(), "item list with count");
    }

    #[test]
    fn item_list_accepts_debug_info() {
        let mut list = ItemList::<String>::new(vec![]);
        assert!(list.attach_debug_info(debug_info()));

        let value = list.to_json().unwrap();
        assert_eq!(value["debugInfo"]["signature"], "Find(string, int)");
        assert_eq!(value["debugInfo"]["startedAt"], "2024-01-02T03:04:05Z");
    }

    #[test]
    fn plain_results_decline_debug_info() {
        let mut text = String::from("hello");
        assert!(!text.attach_debug_info(debug_info()));
        assert!(text.debug_info().is_none());
        assert!(!text.is_item_list());
    }

    #[test]
    fn elapsed_is_recorded_in_micros() {
        let mut info = debug_info();
        info.set_elapsed(Duration::from_millis(3));
        assert_eq!(info.elapsed_micros, 3000);

        info.set_elapsed(Duration::MAX);
        assert_eq!(info.elapsed_micros, u64::MAX);
        assert_eq!(micros(Duration::from_nanos(1_999)), 1);
    }

    #[test]
    fn results_downcast() {
        let result: Box<dyn ResultData> = Box::new(ItemList::new(vec![1u32, 2]));
        let list = result.as_any().downcast_ref::<ItemList<u32>>().unwrap();
        assert_eq!(list.items, vec![1, 2]);
    }
}
