//! Schema validation of every XML part in a package
//!
//! Each part is checked against the schema for its root element's
//! namespace. Parts in namespaces with no loaded schema are only checked
//! for whitespace preservation. A part that is not well-formed yields one
//! finding and the remaining parts are still checked.
//!
//! Markup-compatibility content is skipped: the `mc:` namespace itself and
//! every namespace listed in an in-scope `mc:Ignorable` attribute.

use roxmltree::{Document, Node};
use slideforge_ooxml::xml::is_text_element;
use slideforge_ooxml::OoxmlArchive;
use tracing::debug;

use crate::content::{ContentMatch, ContentMatcher};
use crate::error::Result;
use crate::issue::ValidationIssue;
use crate::schema::{EffectiveType, QName, Resolved, SchemaSet};
use crate::whitespace::{needs_preserve, repair_part, unpreserved_message, XML_NS};
use crate::PackageValidator;

/// Markup Compatibility namespace
pub const MC_NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";

/// Validates parts against a [`SchemaSet`] and repairs whitespace
pub struct SchemaValidator {
    schemas: SchemaSet,
}

impl SchemaValidator {
    pub fn new(schemas: SchemaSet) -> Self {
        Self { schemas }
    }

    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Findings for a single part
    pub fn validate_part(&self, part: &str, bytes: &[u8]) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text),
            Err(e) => {
                issues.push(ValidationIssue::error(part, format!("part is not valid UTF-8: {}", e)));
                return issues;
            }
        };
        let doc = match Document::parse(text) {
            Ok(doc) => doc,
            Err(e) => {
                let pos = e.pos();
                issues.push(
                    ValidationIssue::error(part, format!("malformed XML: {}", e)).at(pos.row, pos.col),
                );
                return issues;
            }
        };

        let mut check = PartCheck {
            part,
            schemas: &self.schemas,
            matcher: ContentMatcher::new(&self.schemas),
            issues: &mut issues,
        };
        check.whitespace(&doc);

        let root = doc.root_element();
        let namespace = root.tag_name().namespace().unwrap_or("");
        if !self.schemas.has_namespace(namespace) {
            debug!(part, namespace, "no schema for part namespace");
            return issues;
        }

        let ignorable = ignorable_namespaces(&root, &[]);
        match self.schemas.element(&qname(&root)) {
            Some(decl) => {
                let resolved = self.schemas.resolve(decl.type_ref.as_ref());
                check.element(&root, &resolved, &ignorable);
            }
            None => {
                let message = format!("root element '{}' is not declared", display_name(&root));
                check.report(&root, message);
            }
        }
        issues
    }
}

impl PackageValidator for SchemaValidator {
    fn code(&self) -> &'static str {
        "XSD"
    }

    fn name(&self) -> &'static str {
        "schema"
    }

    fn validate(&self, package: &OoxmlArchive) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for name in package.xml_part_names() {
            if let Some(bytes) = package.get(&name) {
                issues.extend(self.validate_part(&name, bytes));
            }
        }
        issues
    }

    fn repair(&self, package: &mut OoxmlArchive) -> Result<usize> {
        let mut total = 0;
        for name in package.xml_part_names() {
            let Some(bytes) = package.get(&name) else {
                continue;
            };
            let (repaired, count) = repair_part(bytes, &name)?;
            if count > 0 {
                debug!(part = %name, count, "added xml:space=\"preserve\"");
                package.set(name, repaired);
                total += count;
            }
        }
        Ok(total)
    }
}

struct PartCheck<'a, 'i> {
    part: &'a str,
    schemas: &'a SchemaSet,
    matcher: ContentMatcher<'a>,
    issues: &'i mut Vec<ValidationIssue>,
}

impl PartCheck<'_, '_> {
    fn report(&mut self, node: &Node, message: String) {
        let pos = node.document().text_pos_at(node.range().start);
        self.issues
            .push(ValidationIssue::error(self.part, message).at(pos.row, pos.col));
    }

    fn whitespace(&mut self, doc: &Document) {
        for node in doc.descendants().filter(Node::is_element) {
            let name = display_name(&node);
            if !name.contains(':') || !is_text_element(name.as_bytes()) {
                continue;
            }
            let text = node.text().unwrap_or("");
            if needs_preserve(text) && node.attribute((XML_NS, "space")) != Some("preserve") {
                self.report(&node, unpreserved_message(&name));
            }
        }
    }

    fn element(&mut self, node: &Node, resolved: &Resolved, ignorable: &[String]) {
        let ignorable = ignorable_namespaces(node, ignorable);
        let children: Vec<Node> = node
            .children()
            .filter(|c| c.is_element() && !is_ignored(c, &ignorable))
            .collect();

        let ty = match resolved {
            Resolved::Unchecked => {
                for child in &children {
                    self.lax(child, &ignorable);
                }
                return;
            }
            Resolved::Simple => {
                self.attributes(node, &EffectiveType::default(), &ignorable);
                self.no_children(node, &children);
                return;
            }
            Resolved::Complex(ty) => ty,
        };

        self.attributes(node, ty, &ignorable);
        if ty.simple_content {
            self.no_children(node, &children);
            return;
        }

        let names: Vec<QName> = children.iter().map(qname).collect();
        match self.matcher.check(ty.particle.as_ref(), &names) {
            ContentMatch::Valid => {}
            ContentMatch::Unexpected(i) => {
                let message = format!(
                    "element '{}' is not expected in '{}'",
                    display_name(&children[i]),
                    display_name(node)
                );
                self.report(&children[i], message);
            }
            ContentMatch::Incomplete => {
                let message = format!("element '{}' is missing required child elements", display_name(node));
                self.report(node, message);
            }
        }

        for (child, name) in children.iter().zip(&names) {
            let decl = ty
                .particle
                .as_ref()
                .and_then(|p| self.matcher.declaration(p, name))
                .or_else(|| self.schemas.element(name).cloned());
            match decl {
                Some(decl) => {
                    let resolved = self.schemas.resolve(decl.type_ref.as_ref());
                    self.element(child, &resolved, &ignorable);
                }
                None => self.lax(child, &ignorable),
            }
        }
    }

    /// Content with no governing declaration: check globally declared
    /// elements, pass over the rest
    fn lax(&mut self, node: &Node, ignorable: &[String]) {
        match self.schemas.element(&qname(node)) {
            Some(decl) => {
                let resolved = self.schemas.resolve(decl.type_ref.as_ref());
                self.element(node, &resolved, ignorable);
            }
            None => {
                let ignorable = ignorable_namespaces(node, ignorable);
                for child in node.children().filter(|c| c.is_element() && !is_ignored(c, &ignorable)) {
                    self.lax(&child, &ignorable);
                }
            }
        }
    }

    fn no_children(&mut self, node: &Node, children: &[Node]) {
        if let Some(first) = children.first() {
            let message = format!(
                "element '{}' is not expected in '{}', which allows no child elements",
                display_name(first),
                display_name(node)
            );
            self.report(first, message);
        }
    }

    fn attributes(&mut self, node: &Node, ty: &EffectiveType, ignorable: &[String]) {
        for attr in node.attributes() {
            let namespace = attr.namespace().unwrap_or("");
            if namespace == XML_NS || namespace == MC_NS || ignorable.iter().any(|n| n == namespace) {
                continue;
            }
            let declared = ty
                .attributes
                .iter()
                .any(|a| a.name.namespace == namespace && a.name.local == attr.name());
            if !declared && !ty.any_attribute {
                let shown = match node.lookup_prefix(namespace) {
                    Some(prefix) if !namespace.is_empty() && !prefix.is_empty() => {
                        format!("{}:{}", prefix, attr.name())
                    }
                    _ => attr.name().to_string(),
                };
                let message = format!("attribute '{}' is not allowed on '{}'", shown, display_name(node));
                self.report(node, message);
            }
        }

        for required in ty.attributes.iter().filter(|a| a.required) {
            let present = if required.name.namespace.is_empty() {
                node.has_attribute(required.name.local.as_str())
            } else {
                node.has_attribute((required.name.namespace.as_str(), required.name.local.as_str()))
            };
            if !present {
                let message = format!(
                    "missing required attribute '{}' on '{}'",
                    required.name.local,
                    display_name(node)
                );
                self.report(node, message);
            }
        }
    }
}

fn qname(node: &Node) -> QName {
    let tag = node.tag_name();
    QName::new(tag.namespace().unwrap_or(""), tag.name())
}

/// `prefix:local` as written in the document
pub(crate) fn display_name(node: &Node) -> String {
    let tag = node.tag_name();
    match tag.namespace().and_then(|ns| node.lookup_prefix(ns)) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, tag.name()),
        _ => tag.name().to_string(),
    }
}

fn is_ignored(node: &Node, ignorable: &[String]) -> bool {
    let namespace = node.tag_name().namespace().unwrap_or("");
    namespace == MC_NS || ignorable.iter().any(|n| n == namespace)
}

/// Inherited ignorable namespaces plus those this element declares
fn ignorable_namespaces(node: &Node, inherited: &[String]) -> Vec<String> {
    let mut out = inherited.to_vec();
    if let Some(prefixes) = node.attribute((MC_NS, "Ignorable")) {
        for prefix in prefixes.split_whitespace() {
            if let Some(ns) = node.lookup_namespace_uri(Some(prefix)) {
                if !out.iter().any(|n| n == ns) {
                    out.push(ns.to_string());
                }
            }
        }
    }
    out
}
