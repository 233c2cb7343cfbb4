use tracing::debug;

use ctxcap_types::Document;

/// Printed in place of a document whose host event carried no data.
pub const NIL_DATA_PLACEHOLDER: &str = "Nil object. Invalid JSON data format; unable to print data.";

/// Printed in place of a document that cannot be serialized.
pub const UNPRINTABLE_PLACEHOLDER: &str = "Invalid JSON data format; unable to print data.";

/// Pretty-print a document for the report, substituting a placeholder
/// instead of failing.
pub fn pretty_document(document: Option<&Document>) -> String {
    let Some(document) = document else {
        return NIL_DATA_PLACEHOLDER.to_string();
    };
    match document.to_pretty_json() {
        Ok(text) => text,
        Err(e) => {
            debug!(error = %e, "document cannot be printed");
            UNPRINTABLE_PLACEHOLDER.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxcap_types::Value;
    use serde_json::json;

    #[test]
    fn prints_pretty_json() {
        let doc = Document::try_from(json!({"a": {"b": 1}})).unwrap();
        let text = pretty_document(Some(&doc));
        assert!(text.starts_with('{'));
        assert!(text.contains("\n  \"a\": {"));
    }

    #[test]
    fn missing_data_placeholder() {
        assert_eq!(pretty_document(None), NIL_DATA_PLACEHOLDER);
    }

    #[test]
    fn unprintable_placeholder() {
        let mut doc = Document::new();
        doc.insert("ok", Value::from(1));
        doc.insert("blob", Value::opaque("Data"));
        assert_eq!(pretty_document(Some(&doc)), UNPRINTABLE_PLACEHOLDER);
    }

    #[test]
    fn empty_document_prints() {
        assert_eq!(pretty_document(Some(&Document::new())), "{}");
    }
}
