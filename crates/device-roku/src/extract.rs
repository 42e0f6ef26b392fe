//! Field extractor: projects an XML element onto bounded text fields.
//!
//! Every ECP document is decoded through [`fill_from_xml`] so the
//! "any field may be missing" policy lives in one place: destinations are
//! reset first, then filled from whatever the device actually sent.

use crate::xml::XmlElement;
use rokuecp_core::BoundedText;

/// Where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Attributes of the element itself
    Attributes,
    /// Text content of its child elements
    Children,
}

/// Scratch field for values that are compared or parsed rather than stored
///
/// Holds 32 bytes; longer values are cut, so sentinels and numbers read
/// through it must fit in that.
pub type Scratch = BoundedText<32>;

/// Destination of an extracted value
pub trait TextSink {
    fn clear(&mut self);
    /// Store `value`, truncated to the sink's capacity
    fn fill(&mut self, value: &str);
}

impl<const MAX: usize> TextSink for BoundedText<MAX> {
    fn clear(&mut self) {
        BoundedText::clear(self);
    }

    fn fill(&mut self, value: &str) {
        self.set(value);
    }
}

/// One mapping from a source name to a destination
pub struct FieldMap<'a> {
    source: &'static str,
    dest: &'a mut dyn TextSink,
}

impl<'a> FieldMap<'a> {
    pub fn new(source: &'static str, dest: &'a mut dyn TextSink) -> Self {
        Self { source, dest }
    }
}

/// Reset every destination in `map`, then fill the ones present in `element`
pub fn fill_from_xml(element: &XmlElement, mode: ExtractMode, map: &mut [FieldMap<'_>]) {
    for field in map.iter_mut() {
        field.dest.clear();
    }

    match mode {
        ExtractMode::Attributes => {
            for field in map.iter_mut() {
                if let Some(value) = element.attribute(field.source) {
                    field.dest.fill(value);
                }
            }
        }
        ExtractMode::Children => {
            for child in element.elements() {
                if let Some(field) = map.iter_mut().find(|f| f.source == child.name) {
                    field.dest.fill(&child.text_content());
                }
            }
        }
    }
}

/// Leading unsigned decimal digits of `value`, 0 when there are none
pub fn parse_unsigned(value: &str) -> u64 {
    let digits: &str = {
        let trimmed = value.trim_start();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };
    digits.parse().unwrap_or(0)
}

/// Leading signed decimal integer of `value`, 0 when there is none
pub fn parse_signed(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let magnitude: i64 = rest[..end].parse().unwrap_or(0);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    fn root(xml: &str) -> XmlElement {
        XmlDocument::parse_str(xml).unwrap().root.unwrap()
    }

    #[test]
    fn test_children_mode_fills_present_fields() {
        let element = root("<channel><channel-id>3.1</channel-id><name>WRAL-HD</name></channel>");
        let mut id: BoundedText<7> = BoundedText::empty();
        let mut name: BoundedText<7> = BoundedText::empty();
        let mut kind: BoundedText<13> = BoundedText::empty();

        fill_from_xml(
            &element,
            ExtractMode::Children,
            &mut [
                FieldMap::new("channel-id", &mut id),
                FieldMap::new("name", &mut name),
                FieldMap::new("type", &mut kind),
            ],
        );

        assert_eq!(id, "3.1");
        assert_eq!(name, "WRAL-HD");
        assert!(kind.is_empty());
    }

    #[test]
    fn test_missing_fields_never_keep_residue() {
        let element = root("<app/>");
        let mut id: BoundedText<13> = BoundedText::new("stale-id");
        let mut version: BoundedText<21> = BoundedText::new("9.9.9");

        fill_from_xml(
            &element,
            ExtractMode::Attributes,
            &mut [FieldMap::new("id", &mut id), FieldMap::new("version", &mut version)],
        );

        assert!(id.is_empty());
        assert!(version.is_empty());
    }

    #[test]
    fn test_values_are_truncated_to_capacity() {
        let element = root(r#"<app id="12345678901234567890" type="application"/>"#);
        let mut id: BoundedText<13> = BoundedText::empty();
        let mut kind: BoundedText<4> = BoundedText::empty();
        let mut one: BoundedText<1> = BoundedText::empty();

        fill_from_xml(
            &element,
            ExtractMode::Attributes,
            &mut [
                FieldMap::new("id", &mut id),
                FieldMap::new("type", &mut kind),
            ],
        );
        fill_from_xml(&element, ExtractMode::Attributes, &mut [FieldMap::new("type", &mut one)]);

        assert_eq!(id, "1234567890123");
        assert_eq!(kind, "appl");
        assert_eq!(one, "a");
    }

    #[test]
    fn test_scratch_holds_32_bytes() {
        let long = "x".repeat(40);
        let element = root(&format!("<device-info><power-mode>{}</power-mode></device-info>", long));
        let mut power_mode = Scratch::empty();

        fill_from_xml(
            &element,
            ExtractMode::Children,
            &mut [FieldMap::new("power-mode", &mut power_mode)],
        );

        assert_eq!(Scratch::CAPACITY, 32);
        assert_eq!(power_mode.len(), 32);
        // Every sentinel and number read through a scratch field fits
        for sentinel in ["PowerOn", "limited", "true", "none", "-2147483648"] {
            assert!(sentinel.len() <= Scratch::CAPACITY);
        }
    }

    #[test]
    fn test_attribute_mode_ignores_children() {
        let element = root(r#"<app id="12"><type>appl</type></app>"#);
        let mut id: BoundedText<13> = BoundedText::empty();
        let mut kind: BoundedText<4> = BoundedText::empty();

        fill_from_xml(
            &element,
            ExtractMode::Attributes,
            &mut [FieldMap::new("id", &mut id), FieldMap::new("type", &mut kind)],
        );

        assert_eq!(id, "12");
        assert!(kind.is_empty());
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_unsigned("609000"), 609000);
        assert_eq!(parse_unsigned("27 "), 27);
        assert_eq!(parse_unsigned("12abc"), 12);
        assert_eq!(parse_unsigned(""), 0);
        assert_eq!(parse_unsigned("n/a"), 0);

        assert_eq!(parse_signed("-47"), -47);
        assert_eq!(parse_signed("+3"), 3);
        assert_eq!(parse_signed("-"), 0);
        assert_eq!(parse_signed("15 dB"), 15);
    }
}
