//! Content representations accepted by the renderer.

use serde_json::Value;

use crate::error::RenderError;

/// An article body as delivered by the CMS.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentDocument {
    /// Already-rendered HTML, emitted unchanged.
    PlainHtml(String),
    /// Markdown source.
    MarkdownText(String),
    /// Rich-text editor state: an object with a `root` node, or a bare node
    /// with `children`.
    StructuredTree(Value),
}

impl ContentDocument {
    /// Classify a raw field value.
    ///
    /// Strings become [`MarkdownText`](Self::MarkdownText) when `markdown` is
    /// set and [`PlainHtml`](Self::PlainHtml) otherwise; objects become
    /// [`StructuredTree`](Self::StructuredTree).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Unavailable`] for `null` and blank strings, and
    /// [`RenderError::InvalidShape`] for numbers, booleans and arrays.
    pub fn from_value(value: Value, markdown: bool) -> Result<Self, RenderError> {
        match value {
            Value::Null => Err(RenderError::Unavailable),
            Value::String(s) if s.trim().is_empty() => Err(RenderError::Unavailable),
            Value::String(s) if markdown => Ok(Self::MarkdownText(s)),
            Value::String(s) => Ok(Self::PlainHtml(s)),
            Value::Object(_) => Ok(Self::StructuredTree(value)),
            Value::Bool(_) | Value::Number(_) | Value::Array(_) => {
                Err(RenderError::InvalidShape("expected a string or an object"))
            }
        }
    }

    /// Whether the document carries no content at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::PlainHtml(s) | Self::MarkdownText(s) => s.trim().is_empty(),
            Self::StructuredTree(value) => value.is_null(),
        }
    }
}

/// Locate the top-level `children` array of an editor state.
///
/// Uses `root.children` when a `root` key exists, else the object's own
/// `children`.
pub(crate) fn tree_children(tree: &Value) -> Result<&Value, RenderError> {
    let object = tree
        .as_object()
        .ok_or(RenderError::InvalidShape("document is not an object"))?;
    let container = match object.get("root") {
        Some(root) => root
            .as_object()
            .ok_or(RenderError::InvalidShape("root is not an object"))?,
        None => object,
    };
    match container.get("children") {
        None | Some(Value::Null) => Err(RenderError::InvalidShape("missing children")),
        Some(children) => Ok(children),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_null_is_unavailable() {
        let result = ContentDocument::from_value(Value::Null, true);
        assert!(matches!(result, Err(RenderError::Unavailable)));
    }

    #[test]
    fn test_from_value_blank_string_is_unavailable() {
        let result = ContentDocument::from_value(json!("  \n"), true);
        assert!(matches!(result, Err(RenderError::Unavailable)));
    }

    #[test]
    fn test_from_value_string() {
        assert_eq!(
            ContentDocument::from_value(json!("# Hi"), true).unwrap(),
            ContentDocument::MarkdownText("# Hi".to_owned())
        );
        assert_eq!(
            ContentDocument::from_value(json!("<p>Hi</p>"), false).unwrap(),
            ContentDocument::PlainHtml("<p>Hi</p>".to_owned())
        );
    }

    #[test]
    fn test_from_value_object() {
        let value = json!({"root": {"children": []}});
        assert_eq!(
            ContentDocument::from_value(value.clone(), true).unwrap(),
            ContentDocument::StructuredTree(value)
        );
    }

    #[test]
    fn test_from_value_other_is_invalid() {
        for value in [json!(1), json!(true), json!([])] {
            let result = ContentDocument::from_value(value, true);
            assert!(matches!(result, Err(RenderError::InvalidShape(_))));
        }
    }

    #[test]
    fn test_is_empty() {
        assert!(ContentDocument::PlainHtml(String::new()).is_empty());
        assert!(ContentDocument::MarkdownText(" ".to_owned()).is_empty());
        assert!(ContentDocument::StructuredTree(Value::Null).is_empty());
        assert!(!ContentDocument::StructuredTree(json!({})).is_empty());
        assert!(!ContentDocument::PlainHtml("<p>x</p>".to_owned()).is_empty());
    }

    #[test]
    fn test_tree_children_from_root() {
        let tree = json!({"root": {"type": "root", "children": [1]}});
        assert_eq!(tree_children(&tree).unwrap(), &json!([1]));
    }

    #[test]
    fn test_tree_children_without_root() {
        let tree = json!({"children": []});
        assert_eq!(tree_children(&tree).unwrap(), &json!([]));
    }

    #[test]
    fn test_tree_children_missing() {
        for tree in [json!({"root": {}}), json!({}), json!({"root": {"children": null}})] {
            assert!(matches!(
                tree_children(&tree),
                Err(RenderError::InvalidShape("missing children"))
            ));
        }
    }

    #[test]
    fn test_tree_children_root_not_object() {
        let tree = json!({"root": "text"});
        assert!(matches!(
            tree_children(&tree),
            Err(RenderError::InvalidShape("root is not an object"))
        ));
    }

    #[test]
    fn test_tree_children_not_object() {
        assert!(matches!(
            tree_children(&json!("x")),
            Err(RenderError::InvalidShape(_))
        ));
    }
}
