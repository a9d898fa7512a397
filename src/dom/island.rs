//! Island discovery.
//!
//! Islands are placeholders rendered by the server as
//! `<div data-island="Counter" data-props="{...}"></div>` and hydrated by the
//! page runtime. After a patch the client reports what it handed over for
//! re-activation.

use serde_json::Value;

use super::{Document, Element};

const ISLAND_ATTR: &str = "data-island";
const PROPS_ATTR: &str = "data-props";

/// An island placeholder found in the body.
#[derive(Debug, Clone, PartialEq)]
pub struct Island {
    pub name: String,
    pub props: Value,
}

/// Result of scanning a document for islands.
#[derive(Debug, Default)]
pub struct IslandScan {
    pub islands: Vec<Island>,
    /// `(island name, parse error)` for placeholders whose props are not JSON
    pub invalid: Vec<(String, String)>,
}

impl IslandScan {
    pub fn names(&self) -> Vec<&str> {
        self.islands.iter().map(|i| i.name.as_str()).collect()
    }
}

/// Collect every island placeholder in the body, in document order.
///
/// Missing `data-props` means empty props (`{}`).
pub fn scan_islands(doc: &Document) -> IslandScan {
    let mut scan = IslandScan::default();
    visit(doc.body(), &mut scan);
    scan
}

fn visit(el: &Element, scan: &mut IslandScan) {
    if let Some(name) = el.attrs.get(ISLAND_ATTR) {
        let raw = el.attrs.get(PROPS_ATTR).unwrap_or("{}");
        match serde_json::from_str(raw) {
            Ok(props) => scan.islands.push(Island {
                name: name.to_string(),
                props,
            }),
            Err(e) => scan.invalid.push((name.to_string(), e.to_string())),
        }
    }
    for child in el.child_elements() {
        visit(child, scan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_islands() {
        let doc = Document::parse(
            r#"<body>
<h1>Counter demo</h1>
<div data-island="Counter" data-props="{&quot;initial&quot;:5}"></div>
<section><div data-island="FileTree"></div></section>
</body>"#,
        )
        .unwrap();

        let scan = scan_islands(&doc);
        assert_eq!(scan.names(), ["Counter", "FileTree"]);
        assert_eq!(scan.islands[0].props["initial"], 5);
        assert_eq!(scan.islands[1].props, serde_json::json!({}));
        assert!(scan.invalid.is_empty());
    }

    #[test]
    fn test_scan_reports_invalid_props() {
        let doc =
            Document::parse(r#"<body><div data-island="Toc" data-props="{oops"></div></body>"#)
                .unwrap();

        let scan = scan_islands(&doc);
        assert!(scan.islands.is_empty());
        assert_eq!(scan.invalid.len(), 1);
        assert_eq!(scan.invalid[0].0, "Toc");
    }
}
