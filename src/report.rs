//!
//! Fixed-structure text report helpers
//!
//! Every reported concept is wrapped in a typed `<result>` block.
//! The structure and the field order of the blocks are a compatibility
//! contract for downstream parsing and must not be reordered.
//!
use crate::prob::Prob;

///
/// `<result type="...">content</result>` block, on one content line.
///
pub fn xml_result(result_type: &str, content: &str) -> String {
    format!(
        "      <result type=\"{}\">{}</result>\n",
        result_type, content
    )
}

///
/// `<result>` block with extra attributes (e.g. `iteration`, `state`).
///
pub fn xml_result_with_attrs(result_type: &str, attrs: &[(&str, String)], content: &str) -> String {
    let mut header = format!("      <result type=\"{}\"", result_type);
    for (key, value) in attrs {
        header.push_str(&format!(" {}=\"{}\"", key, value));
    }
    format!("{}>{}</result>\n", header, content)
}

///
/// probability rendered the way all reports render it:
/// scientific notation with 4 fractional digits
///
pub fn prob_fmt(p: Prob) -> String {
    format!("{:.4e}", p.to_value())
}

//
// tests
//
