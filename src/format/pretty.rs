//! Pretty-printing of nested data for diagnostics.
//!
//! Data is first condensed (long lists keep only their head and tail) and
//! then laid out within a maximum width, breaking containers across lines
//! only when they do not fit.

use serde_json::{Map, Value};

/// Placeholder inserted in place of the elided middle of a long list
pub const CONDENSED_MARKER: &str = "...";

/// Layout options for [`pformat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrettyOptions {
    /// Maximum line width
    pub width: usize,
    /// Containers nested deeper than this render as `[...]` / `{...}`
    pub depth: usize,
    /// Lists longer than this are condensed
    pub max_list_len: usize,
    /// Pack as many list items on a line as fit
    pub compact: bool,
    /// Indentation added per nesting level
    pub indent: usize,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            width: 80,
            depth: 10,
            max_list_len: 20,
            compact: true,
            indent: 1,
        }
    }
}

/// Condense every list longer than `max_list_len`.
///
/// A long list keeps its first `⌊max_list_len / 2⌋` and last
/// `⌈max_list_len / 2⌉` items with a single [`CONDENSED_MARKER`] between them.
/// Mappings are condensed recursively; items of a list are left untouched.
#[must_use]
pub fn condense_long_lists(value: &Value, max_list_len: usize) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), condense_long_lists(v, max_list_len)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) if items.len() > max_list_len => {
            let head = max_list_len / 2;
            let tail = max_list_len - head;
            let mut condensed = Vec::with_capacity(max_list_len + 1);
            condensed.extend_from_slice(&items[..head]);
            condensed.push(Value::String(CONDENSED_MARKER.to_string()));
            condensed.extend_from_slice(&items[items.len() - tail..]);
            Value::Array(condensed)
        }
        other => other.clone(),
    }
}

/// Lay out `value` within `options.width` columns. Does not condense.
#[must_use]
pub fn pformat(value: &Value, options: &PrettyOptions) -> String {
    let printer = Printer { options };
    printer.format(value, 0, 0, 1)
}

struct Printer<'a> {
    options: &'a PrettyOptions,
}

impl Printer<'_> {
    /// `column` is where the value starts; `allowance` is the room reserved
    /// after it for closing brackets and separators.
    fn format(&self, value: &Value, column: usize, allowance: usize, level: usize) -> String {
        let flat = self.one_line(value, level);
        if self.fits(&flat, column, allowance) {
            return flat;
        }
        match value {
            Value::Object(map) if level <= self.options.depth && !map.is_empty() => {
                self.format_object(map, column, allowance, level)
            }
            Value::Array(items) if level <= self.options.depth && !items.is_empty() => {
                self.format_array(items, column, allowance, level)
            }
            _ => flat,
        }
    }

    fn format_object(
        &self,
        map: &Map<String, Value>,
        column: usize,
        allowance: usize,
        level: usize,
    ) -> String {
        let item_column = column + self.options.indent;
        let mut out = String::from("{");
        out.push_str(&" ".repeat(self.options.indent.saturating_sub(1)));

        let last = map.len() - 1;
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                out.push_str(",\n");
                out.push_str(&" ".repeat(item_column));
            }
            let key_repr = format!("{}: ", scalar_repr(&Value::String(key.clone())));
            let item_allowance = if i == last { allowance + 1 } else { 1 };
            out.push_str(&key_repr);
            out.push_str(&self.format(
                value,
                item_column + key_repr.len(),
                item_allowance,
                level + 1,
            ));
        }
        out.push('}');
        out
    }

    fn format_array(&self, items: &[Value], column: usize, allowance: usize, level: usize) -> String {
        let item_column = column + self.options.indent;
        let separator = format!(",\n{}", " ".repeat(item_column));
        let mut out = String::from("[");
        out.push_str(&" ".repeat(self.options.indent.saturating_sub(1)));

        let last = items.len() - 1;
        let mut line = String::new();
        let mut wrote_any = false;
        for (i, item) in items.iter().enumerate() {
            let item_allowance = if i == last { allowance + 1 } else { 1 };
            let flat = self.one_line(item, level + 1);

            if self.options.compact && self.fits(&flat, item_column, item_allowance) {
                let flat_len = flat.chars().count();
                let candidate_len = if line.is_empty() {
                    flat_len
                } else {
                    line.chars().count() + 2 + flat_len
                };
                if !line.is_empty()
                    && item_column + candidate_len + item_allowance > self.options.width
                {
                    push_item(&mut out, &mut wrote_any, &separator, &line);
                    line.clear();
                }
                if !line.is_empty() {
                    line.push_str(", ");
                }
                line.push_str(&flat);
                continue;
            }

            if !line.is_empty() {
                push_item(&mut out, &mut wrote_any, &separator, &line);
                line.clear();
            }
            let rendered = self.format(item, item_column, item_allowance, level + 1);
            push_item(&mut out, &mut wrote_any, &separator, &rendered);
        }
        if !line.is_empty() {
            push_item(&mut out, &mut wrote_any, &separator, &line);
        }
        out.push(']');
        out
    }

    fn fits(&self, repr: &str, column: usize, allowance: usize) -> bool {
        column + repr.chars().count() + allowance <= self.options.width
    }

    fn one_line(&self, value: &Value, level: usize) -> String {
        match value {
            Value::Object(_) if level > self.options.depth => "{...}".to_string(),
            Value::Array(_) if level > self.options.depth => "[...]".to_string(),
            Value::Object(map) => {
                let entries: Vec<String> = map
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}: {}",
                            scalar_repr(&Value::String(k.clone())),
                            self.one_line(v, level + 1)
                        )
                    })
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Value::Array(items) => {
                let entries: Vec<String> =
                    items.iter().map(|v| self.one_line(v, level + 1)).collect();
                format!("[{}]", entries.join(", "))
            }
            scalar => scalar_repr(scalar),
        }
    }
}

fn push_item(out: &mut String, wrote_any: &mut bool, separator: &str, item: &str) {
    if *wrote_any {
        out.push_str(separator);
    }
    out.push_str(item);
    *wrote_any = true;
}

fn scalar_repr(value: &Value) -> String {
    match value {
        Value::String(s) if s == CONDENSED_MARKER => s.clone(),
        // serde_json's Display for scalars is already compact and quoted
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numbers(n: usize) -> Value {
        Value::Array((0..n).map(|i| json!(i)).collect())
    }

    #[test]
    fn test_condense_long_list_keeps_head_and_tail() {
        let condensed = condense_long_lists(&numbers(50), 20);
        let items = condensed.as_array().unwrap();
        assert_eq!(items.len(), 21);
        assert_eq!(items[0], json!(0));
        assert_eq!(items[9], json!(9));
        assert_eq!(items[10], json!(CONDENSED_MARKER));
        assert_eq!(items[11], json!(40));
        assert_eq!(items[20], json!(49));
    }

    #[test]
    fn test_condense_short_list_unchanged() {
        let list = numbers(10);
        assert_eq!(condense_long_lists(&list, 20), list);
    }

    #[test]
    fn test_condense_odd_limit_favours_tail() {
        let condensed = condense_long_lists(&numbers(30), 5);
        assert_eq!(condensed, json!([0, 1, "...", 27, 28, 29]));
    }

    #[test]
    fn test_condense_recurses_through_mappings() {
        let data = json!({"outer": {"inner": (0..30).collect::<Vec<_>>()}, "n": 1});
        let condensed = condense_long_lists(&data, 4);
        assert_eq!(condensed["outer"]["inner"], json!([0, 1, "...", 28, 29]));
        assert_eq!(condensed["n"], json!(1));
    }

    #[test]
    fn test_condense_does_not_recurse_into_list_items() {
        let data = json!([(0..30).collect::<Vec<_>>()]);
        assert_eq!(condense_long_lists(&data, 4), data);
    }

    #[test]
    fn test_condense_is_deterministic() {
        let data = json!({"a": (0..100).collect::<Vec<_>>(), "b": {"c": (0..7).collect::<Vec<_>>()}});
        assert_eq!(condense_long_lists(&data, 6), condense_long_lists(&data, 6));
    }

    #[test]
    fn test_short_value_on_one_line() {
        let out = pformat(&json!({"a": 1, "b": [1, 2]}), &PrettyOptions::default());
        assert_eq!(out, r#"{"a": 1, "b": [1, 2]}"#);
    }

    #[test]
    fn test_marker_is_unquoted() {
        let condensed = condense_long_lists(&numbers(30), 4);
        let out = pformat(&condensed, &PrettyOptions::default());
        assert_eq!(out, "[0, 1, ..., 28, 29]");
    }

    #[test]
    fn test_wide_object_breaks_per_key() {
        let data = json!({"alpha": "x".repeat(30), "beta": "y".repeat(30)});
        let out = pformat(&data, &PrettyOptions::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(r#"{"alpha": "#));
        assert!(lines[1].starts_with(r#" "beta": "#));
        assert!(lines[1].ends_with('}'));
    }

    #[test]
    fn test_compact_array_packs_items_within_width() {
        let options = PrettyOptions {
            width: 20,
            ..PrettyOptions::default()
        };
        let out = pformat(&numbers(12), &options);
        for line in out.lines() {
            assert!(line.chars().count() <= 20, "{line:?} too wide");
        }
        assert!(out.lines().count() > 1);
        assert!(out.lines().count() < 12);
    }

    #[test]
    fn test_compact_packing_measures_characters() {
        let options = PrettyOptions {
            width: 30,
            ..PrettyOptions::default()
        };
        let out = pformat(&json!(vec!["éééé"; 6]), &options);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2, "{out}");
        for line in lines {
            assert!(line.chars().count() <= 30, "{line:?} too wide");
        }
    }

    #[test]
    fn test_non_compact_array_one_item_per_line() {
        let options = PrettyOptions {
            width: 20,
            compact: false,
            ..PrettyOptions::default()
        };
        let out = pformat(&numbers(12), &options);
        assert_eq!(out.lines().count(), 12);
    }

    #[test]
    fn test_depth_elides_nested_containers() {
        let options = PrettyOptions {
            depth: 1,
            ..PrettyOptions::default()
        };
        assert_eq!(pformat(&json!([1, [2, 3]]), &options), "[1, [...]]");
        assert_eq!(pformat(&json!({"a": {"b": 1}}), &options), r#"{"a": {...}}"#);
    }

    #[test]
    fn test_indent_widens_continuation_lines() {
        let options = PrettyOptions {
            width: 10,
            compact: false,
            indent: 4,
            ..PrettyOptions::default()
        };
        let out = pformat(&json!([1000, 2000, 3000]), &options);
        assert_eq!(out, "[   1000,\n    2000,\n    3000]");
    }
}
