//! Schema module rendering
//!
//! Walks the hierarchical model in order and opens a nested
//! `xsd:element`/`xsd:complexType`/`xsd:sequence` block for every class
//! node, closing blocks whenever the level drops. Attribute nodes
//! become leaf elements typed against the unqualified data types.

use chrono::Local;
use sem_lhm::{LhmNode, NodeKind};
use sem_model::Multiplicity;
use tracing::debug;

use crate::error::{XsdError, XsdResult};

const REMOVE_CHARS: [char; 5] = [' ', '-', '.', '_', '\''];

/// Settings for one schema module.
#[derive(Debug, Clone)]
pub struct XsdConfig {
    /// Root class term; the schema file and namespace derive from it
    pub root_term: String,
    /// Version token baked into the namespace URNs
    pub version_num: String,
    /// Timestamp written to the `version` attribute
    pub version_date: String,
    /// Emit bilingual `xsd:annotation` blocks
    pub annotation: bool,
}

impl XsdConfig {
    pub fn new(root_term: impl Into<String>) -> Self {
        Self {
            root_term: root_term.into(),
            version_num: "4p1".to_string(),
            version_date: Local::now().format("%Y%m%d%H%M%S").to_string(),
            annotation: false,
        }
    }

    pub fn with_annotation(mut self, annotation: bool) -> Self {
        self.annotation = annotation;
        self
    }

    pub fn with_version(mut self, num: impl Into<String>, date: impl Into<String>) -> Self {
        self.version_num = num.into();
        self.version_date = date.into();
        self
    }

    /// Root element token: the root term with separators removed.
    pub fn root_element(&self) -> String {
        let cleaned: String = self
            .root_term
            .chars()
            .filter(|c| !REMOVE_CHARS.contains(c))
            .collect();
        cleaned.trim().to_string()
    }

    /// Conventional file name for the module, stamped with a date.
    pub fn file_name(&self, date: &str) -> String {
        format!("{}_{}.xsd", self.root_element(), date)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn udt_type(datatype: &str) -> String {
    let datatype = if datatype == "Identifier" {
        "ID"
    } else {
        datatype
    };
    format!("udt:{}Type", datatype.replace(' ', ""))
}

fn occurrence_attributes(multiplicity: Multiplicity) -> String {
    let mut attributes = String::new();
    if !multiplicity.is_mandatory() {
        attributes.push_str(" minOccurs=\"0\"");
    }
    if multiplicity.is_unbounded() {
        attributes.push_str(" maxOccurs=\"unbounded\"");
    }
    attributes
}

/// Renders one schema module from a hierarchical model.
pub struct XsdEmitter {
    config: XsdConfig,
}

impl XsdEmitter {
    pub fn new(config: XsdConfig) -> Self {
        Self { config }
    }

    fn prologue(&self) -> Vec<String> {
        let root = self.config.root_element();
        let banner = format!("{} Schema Module ", root);
        vec![
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>".to_string(),
            "<!-- ====================================================================== -->".to_string(),
            format!(
                "<!-- ===== {}{}===== -->",
                banner,
                " ".repeat(59usize.saturating_sub(banner.len()))
            ),
            "<!-- ====================================================================== -->".to_string(),
            "<xsd:schema xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" ".to_string(),
            "xmlns:ccts=\"urn:un:unece:uncefact:documentation:standard:CoreComponentsTechnicalSpecification:2\" ".to_string(),
            format!(
                "xmlns:rsm=\"urn:un:unece:uncefact:3055:413:data:standard:{}:{}\" ",
                root, self.config.version_num
            ),
            "xmlns:udt=\"urn:un:unece:uncefact:data:standard:UnqualifiedDataType:33\" ".to_string(),
            format!(
                "targetNamespace=\"urn:un:unece:uncefact:3055:413:data:standard:{}:{}\" ",
                root, self.config.version_num
            ),
            "elementFormDefault=\"qualified\" ".to_string(),
            "attributeFormDefault=\"unqualified\" ".to_string(),
            format!("version=\"{}\">", self.config.version_date),
            "<!-- ======================================================================= -->".to_string(),
            "<!-- ===== Imports                                                     ===== -->".to_string(),
            "<!-- ======================================================================= -->".to_string(),
            "<!-- ===== Import of Unqualified Data Type Schema Module               ===== -->".to_string(),
            "<!-- ======================================================================= -->".to_string(),
            "  <xsd:import namespace=\"urn:un:unece:uncefact:data:standard:UnqualifiedDataType:33\" schemaLocation=\"UnqualifiedDataType_33p0.xsd\"/>".to_string(),
            "<!-- ======================================================================= -->".to_string(),
            "<!-- ===== Element Declarations                                        ===== -->".to_string(),
            "<!-- ======================================================================= -->".to_string(),
            "<!-- ===== Root Element Declarations                                   ===== -->".to_string(),
            "<!-- ======================================================================= -->".to_string(),
        ]
    }

    fn annotation(&self, node: &LhmNode, leading: &str) -> Vec<String> {
        let mut lines = vec![
            format!("{}    <xsd:annotation>", leading),
            format!("{}      <xsd:documentation xml:lang=\"en\">", leading),
        ];
        if !node.id.is_empty() {
            lines.push(format!(
                "{}        <ccts:UniqueID>{}</ccts:UniqueID>",
                leading,
                escape(&node.id)
            ));
        }
        if !node.name.is_empty() {
            lines.push(format!(
                "{}        <ccts:DictionaryEntryName>{}</ccts:DictionaryEntryName>",
                leading,
                escape(&node.name)
            ));
        }
        if !node.definition.is_empty() {
            lines.push(format!(
                "{}        <ccts:Definition>{}</ccts:Definition>",
                leading,
                escape(&node.definition)
            ));
        }
        if !node.multiplicity.is_empty() {
            lines.push(format!(
                "{}        <ccts:Cardinality>{}</ccts:Cardinality>",
                leading,
                escape(&node.multiplicity)
            ));
        }
        lines.push(format!("{}      </xsd:documentation>", leading));
        lines.push(format!(
            "{}      <xsd:documentation xml:lang=\"ja\">",
            leading
        ));
        if !node.label_local.is_empty() {
            lines.push(format!(
                "{}        <ccts:Name>{}</ccts:Name>",
                leading,
                escape(&node.label_local)
            ));
        }
        if !node.definition_local.is_empty() {
            let text: String = node
                .definition_local
                .replace('\n', "")
                .split([' ', '\u{3000}'])
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!(
                "{}        <ccts:Definition>{}</ccts:Definition>",
                leading,
                escape(&text)
            ));
        }
        lines.push(format!("{}      </xsd:documentation>", leading));
        lines.push(format!("{}    </xsd:annotation>", leading));
        lines
    }

    fn close_set(lines: &mut Vec<String>, level: usize) {
        let indent = "      ".repeat(level);
        lines.push(format!("{}      </xsd:sequence>", indent));
        lines.push(format!("{}    </xsd:complexType>", indent));
        lines.push(format!("{}  </xsd:element>", indent));
    }

    /// Render the schema module for `nodes`.
    pub fn emit(&self, nodes: &[LhmNode]) -> XsdResult<String> {
        let root = nodes.first().ok_or(XsdError::EmptyModel)?;
        if root.level != 1 || root.kind == NodeKind::Attribute {
            return Err(XsdError::MissingRoot { level: root.level });
        }

        let mut lines = self.prologue();
        // Levels of the complexType sets currently open, innermost last.
        let mut open: Vec<usize> = Vec::new();

        for node in nodes {
            let level = node.level as usize;
            while open.last().is_some_and(|&l| l >= level) {
                let closed = open.pop().unwrap_or_default();
                Self::close_set(&mut lines, closed);
            }
            let multiplicity: Multiplicity = node
                .multiplicity
                .parse()
                .unwrap_or_else(|_| Multiplicity::one());
            let leading = "      ".repeat(level);

            if node.kind == NodeKind::Attribute {
                let open_tag = format!(
                    "{}  <xsd:element name=\"{}\" type=\"{}\"{}",
                    leading,
                    node.element,
                    udt_type(&node.datatype),
                    occurrence_attributes(multiplicity)
                );
                if self.config.annotation {
                    lines.push(format!("{}>", open_tag));
                    lines.extend(self.annotation(node, &leading));
                    lines.push(format!("{}  </xsd:element>", leading));
                } else {
                    lines.push(format!("{}/>", open_tag));
                }
            } else {
                lines.push(format!(
                    "{}  <xsd:element name=\"{}\"{}>",
                    leading,
                    node.element,
                    occurrence_attributes(multiplicity)
                ));
                if self.config.annotation {
                    lines.extend(self.annotation(node, &leading));
                }
                lines.push(format!("{}    <xsd:complexType>", leading));
                lines.push(format!("{}      <xsd:sequence>", leading));
                open.push(level);
            }
        }

        while let Some(level) = open.pop() {
            Self::close_set(&mut lines, level);
        }
        lines.push("</xsd:schema>".to_string());

        debug!(
            node_count = nodes.len(),
            line_count = lines.len(),
            "rendered schema module"
        );
        let mut text = lines.join("\n");
        text.push('\n');
        Ok(text)
    }
}
