//! XSD schema model
//!
//! Schemas are read with `roxmltree` into a set of global declarations keyed
//! by qualified name. Only the structural part of XSD is modeled: element
//! content (sequence, choice, all, groups, wildcards, occurrence bounds),
//! type derivation by extension and restriction, and attribute
//! declarations. Simple-type facets are not checked, so attribute values
//! and text content are accepted as written.
//!
//! `include` and `import` are not followed; a schema set is built from
//! every file handed to it, so cross-namespace references resolve once the
//! schemas for both namespaces are loaded.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use roxmltree::Node;
use tracing::{debug, info};

use crate::builtin;
use crate::error::{Result, ValidateError};

/// The XML Schema namespace
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Bound on nested type derivation
const MAX_DERIVATION_DEPTH: usize = 32;

/// Namespace-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub namespace: String,
    pub local: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// Upper occurrence bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: u32,
    pub max: MaxOccurs,
}

impl Occurs {
    pub const ONCE: Occurs = Occurs {
        min: 1,
        max: MaxOccurs::Bounded(1),
    };

    /// Whether `count` repetitions stay within the upper bound
    pub fn allows(&self, count: u32) -> bool {
        match self.max {
            MaxOccurs::Bounded(max) => count <= max,
            MaxOccurs::Unbounded => true,
        }
    }
}

/// Namespace constraint of an `xsd:any` wildcard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wildcard {
    /// `##any`
    Any,
    /// `##other`: any namespace except the target namespace (and no namespace)
    Other(String),
    /// Explicit list; the empty string stands for `##local`
    List(Vec<String>),
}

impl Wildcard {
    pub fn allows(&self, namespace: &str) -> bool {
        match self {
            Wildcard::Any => true,
            Wildcard::Other(target) => !namespace.is_empty() && namespace != target,
            Wildcard::List(list) => list.iter().any(|n| n == namespace),
        }
    }
}

/// Type of an element declaration
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// Named type, simple or complex
    Named(QName),
    /// Anonymous complex type
    Complex(Box<ComplexType>),
    /// Anonymous simple type
    Simple,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementDecl {
    pub name: QName,
    /// `None` is `xsd:anyType`
    pub type_ref: Option<TypeRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Local element declaration
    Element(ElementDecl),
    /// Reference to a global element
    ElementRef(QName),
    Sequence(Vec<Particle>),
    Choice(Vec<Particle>),
    All(Vec<Particle>),
    /// Reference to a model group
    Group(QName),
    Any(Wildcard),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub term: Term,
    pub occurs: Occurs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeUse {
    pub name: QName,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Derivation {
    #[default]
    None,
    Extension,
    Restriction,
}

/// Attributes declared directly or through groups
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeSet {
    pub attributes: Vec<AttributeUse>,
    pub groups: Vec<QName>,
    pub any_attribute: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexType {
    pub base: Option<QName>,
    pub derivation: Derivation,
    pub particle: Option<Particle>,
    pub attributes: AttributeSet,
    pub mixed: bool,
    pub simple_content: bool,
}

/// A complex type with its derivation chain and attribute groups flattened
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectiveType {
    pub particle: Option<Particle>,
    pub attributes: Vec<AttributeUse>,
    pub any_attribute: bool,
    pub simple_content: bool,
}

/// What an element's declared type resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// No element children allowed
    Simple,
    Complex(EffectiveType),
    /// `xsd:anyType`, or a type no loaded schema declares
    Unchecked,
}

/// Global declarations from one or more schema documents
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    elements: HashMap<QName, ElementDecl>,
    complex_types: HashMap<QName, ComplexType>,
    simple_types: HashSet<QName>,
    groups: HashMap<QName, Particle>,
    attribute_groups: HashMap<QName, AttributeSet>,
    namespaces: BTreeSet<String>,
    sources: Vec<String>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Package-level schemas (relationships, content types) compiled in
    pub fn builtin() -> Result<Self> {
        let mut set = Self::new();
        for (name, text) in builtin::SCHEMAS {
            set.add_schema(name, text)?;
        }
        Ok(set)
    }

    /// Built-in schemas plus every `*.xsd` below `dir`
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(ValidateError::SchemaDirNotFound(dir.to_path_buf()));
        }
        let mut set = Self::builtin()?;
        let mut files = Vec::new();
        collect_xsd_files(dir, &mut files)?;
        files.sort();
        for file in &files {
            let text = fs::read_to_string(file)?;
            set.add_schema(&file.display().to_string(), &text)?;
        }
        info!(
            dir = %dir.display(),
            files = files.len(),
            namespaces = set.namespaces.len(),
            "loaded schemas"
        );
        Ok(set)
    }

    /// Add one schema document; `source` names it in errors
    pub fn add_schema(&mut self, source: &str, text: &str) -> Result<()> {
        let doc = roxmltree::Document::parse(text).map_err(|e| ValidateError::SchemaXml {
            path: source.to_string(),
            source: e,
        })?;
        let root = doc.root_element();
        if !is_xsd(&root, "schema") {
            return Err(ValidateError::schema(source, "root element is not xsd:schema"));
        }

        let ctx = SchemaContext {
            source,
            target: root.attribute("targetNamespace").unwrap_or("").to_string(),
            qualified_elements: root.attribute("elementFormDefault") == Some("qualified"),
            qualified_attributes: root.attribute("attributeFormDefault") == Some("qualified"),
        };

        for node in root.children().filter(Node::is_element) {
            if node.tag_name().namespace() != Some(XSD_NS) {
                continue;
            }
            match node.tag_name().name() {
                "element" => {
                    let decl = ctx.element_decl(&node, true)?;
                    self.elements.insert(decl.name.clone(), decl);
                }
                "complexType" => {
                    let name = ctx.required_name(&node)?;
                    let ty = ctx.complex_type(&node)?;
                    self.complex_types.insert(name, ty);
                }
                "simpleType" => {
                    self.simple_types.insert(ctx.required_name(&node)?);
                }
                "group" => {
                    let name = ctx.required_name(&node)?;
                    let body = node
                        .children()
                        .filter(Node::is_element)
                        .find(|n| matches!(n.tag_name().name(), "sequence" | "choice" | "all"));
                    if let Some(body) = body {
                        if let Some(particle) = ctx.particle(&body)? {
                            self.groups.insert(name, particle);
                        }
                    }
                }
                "attributeGroup" => {
                    let name = ctx.required_name(&node)?;
                    let mut attrs = AttributeSet::default();
                    ctx.collect_attributes(&node, &mut attrs)?;
                    self.attribute_groups.insert(name, attrs);
                }
                // top-level attributes are only reachable through `ref`,
                // which carries the name already
                _ => {}
            }
        }

        debug!(source, namespace = %ctx.target, "added schema");
        self.namespaces.insert(ctx.target);
        self.sources.push(source.to_string());
        Ok(())
    }

    /// Whether some loaded schema targets `namespace`
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(String::as_str)
    }

    /// Schema documents loaded, in load order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn element(&self, name: &QName) -> Option<&ElementDecl> {
        self.elements.get(name)
    }

    pub fn group(&self, name: &QName) -> Option<&Particle> {
        self.groups.get(name)
    }

    /// Resolve an element's declared type
    pub fn resolve(&self, type_ref: Option<&TypeRef>) -> Resolved {
        match type_ref {
            None => Resolved::Unchecked,
            Some(TypeRef::Simple) => Resolved::Simple,
            Some(TypeRef::Complex(ty)) => self.effective(ty, 0),
            Some(TypeRef::Named(name)) => self.resolve_named(name, 0),
        }
    }

    fn resolve_named(&self, name: &QName, depth: usize) -> Resolved {
        if name.namespace == XSD_NS {
            return if name.local == "anyType" {
                Resolved::Unchecked
            } else {
                Resolved::Simple
            };
        }
        if self.simple_types.contains(name) {
            return Resolved::Simple;
        }
        match self.complex_types.get(name) {
            Some(ty) => self.effective(ty, depth),
            None => {
                debug!(%name, "type not declared by any loaded schema");
                Resolved::Unchecked
            }
        }
    }

    fn effective(&self, ty: &ComplexType, depth: usize) -> Resolved {
        if depth > MAX_DERIVATION_DEPTH {
            return Resolved::Unchecked;
        }

        let base = match &ty.base {
            Some(base) if base.namespace == XSD_NS && base.local == "anyType" => None,
            Some(base) => match self.resolve_named(base, depth + 1) {
                Resolved::Complex(effective) => Some(effective),
                Resolved::Simple => Some(EffectiveType {
                    simple_content: true,
                    ..EffectiveType::default()
                }),
                Resolved::Unchecked => return Resolved::Unchecked,
            },
            None => None,
        };

        let mut out = EffectiveType::default();
        if let Some(base) = &base {
            out.attributes = base.attributes.clone();
            out.any_attribute = base.any_attribute;
        }
        self.flatten_attributes(&ty.attributes, &mut out, 0);

        out.simple_content = ty.simple_content;
        out.particle = match (ty.derivation, base) {
            (Derivation::Extension, Some(base)) => {
                out.simple_content |= base.simple_content;
                match (base.particle, ty.particle.clone()) {
                    (Some(b), Some(own)) => Some(Particle {
                        term: Term::Sequence(vec![b, own]),
                        occurs: Occurs::ONCE,
                    }),
                    (b, own) => b.or(own),
                }
            }
            _ => ty.particle.clone(),
        };
        Resolved::Complex(out)
    }

    fn flatten_attributes(&self, set: &AttributeSet, out: &mut EffectiveType, depth: usize) {
        for attr in &set.attributes {
            match out.attributes.iter_mut().find(|a| a.name == attr.name) {
                Some(existing) => existing.required = attr.required,
                None => out.attributes.push(attr.clone()),
            }
        }
        out.any_attribute |= set.any_attribute;
        if depth > MAX_DERIVATION_DEPTH {
            return;
        }
        for group in &set.groups {
            match self.attribute_groups.get(group) {
                Some(inner) => self.flatten_attributes(inner, out, depth + 1),
                // unknown group: accept whatever it would have declared
                None => out.any_attribute = true,
            }
        }
    }
}

fn collect_xsd_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_xsd_files(&path, out)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xsd"))
        {
            out.push(path);
        }
    }
    Ok(())
}

fn is_xsd(node: &Node, name: &str) -> bool {
    node.tag_name().namespace() == Some(XSD_NS) && node.tag_name().name() == name
}

/// Per-document settings used while reading declarations
struct SchemaContext<'s> {
    source: &'s str,
    target: String,
    qualified_elements: bool,
    qualified_attributes: bool,
}

impl SchemaContext<'_> {
    fn error(&self, node: &Node, message: &str) -> ValidateError {
        let pos = node.document().text_pos_at(node.range().start);
        ValidateError::schema(
            self.source,
            format!("{} (line {}, column {})", message, pos.row, pos.col),
        )
    }

    fn required_name(&self, node: &Node) -> Result<QName> {
        let name = node
            .attribute("name")
            .ok_or_else(|| self.error(node, "declaration without a name"))?;
        Ok(QName::new(self.target.as_str(), name))
    }

    /// Resolve a `prefix:local` attribute value against the in-scope
    /// namespace declarations
    fn qname_value(&self, node: &Node, value: &str) -> Result<QName> {
        let (prefix, local) = match value.split_once(':') {
            Some((p, l)) => (Some(p), l),
            None => (None, value),
        };
        let namespace = match node.lookup_namespace_uri(prefix) {
            Some(ns) => ns,
            None if prefix.is_none() => "",
            None => return Err(self.error(node, &format!("undeclared prefix in '{}'", value))),
        };
        Ok(QName::new(namespace, local))
    }

    fn occurs(&self, node: &Node) -> Result<Occurs> {
        let min = match node.attribute("minOccurs") {
            Some(v) => v
                .parse()
                .map_err(|_| self.error(node, &format!("invalid minOccurs '{}'", v)))?,
            None => 1,
        };
        let max = match node.attribute("maxOccurs") {
            Some("unbounded") => MaxOccurs::Unbounded,
            Some(v) => MaxOccurs::Bounded(
                v.parse()
                    .map_err(|_| self.error(node, &format!("invalid maxOccurs '{}'", v)))?,
            ),
            None => MaxOccurs::Bounded(1),
        };
        Ok(Occurs { min, max })
    }

    fn element_decl(&self, node: &Node, global: bool) -> Result<ElementDecl> {
        let name = node
            .attribute("name")
            .ok_or_else(|| self.error(node, "element without a name"))?;
        let namespace = if global || self.qualified_elements || node.attribute("form") == Some("qualified") {
            self.target.as_str()
        } else {
            ""
        };

        let type_ref = match node.attribute("type") {
            Some(t) => Some(TypeRef::Named(self.qname_value(node, t)?)),
            None => {
                let inline = node.children().filter(Node::is_element).find(|n| {
                    is_xsd(n, "complexType") || is_xsd(n, "simpleType")
                });
                match inline {
                    Some(n) if is_xsd(&n, "complexType") => {
                        Some(TypeRef::Complex(Box::new(self.complex_type(&n)?)))
                    }
                    Some(_) => Some(TypeRef::Simple),
                    None => None,
                }
            }
        };

        Ok(ElementDecl {
            name: QName::new(namespace, name),
            type_ref,
        })
    }

    fn complex_type(&self, node: &Node) -> Result<ComplexType> {
        let mut ty = ComplexType {
            mixed: node.attribute("mixed") == Some("true"),
            ..ComplexType::default()
        };

        for child in node.children().filter(Node::is_element) {
            if child.tag_name().namespace() != Some(XSD_NS) {
                continue;
            }
            match child.tag_name().name() {
                "complexContent" | "simpleContent" => {
                    ty.simple_content = child.tag_name().name() == "simpleContent";
                    if child.attribute("mixed") == Some("true") {
                        ty.mixed = true;
                    }
                    let derivation = child
                        .children()
                        .filter(Node::is_element)
                        .find(|n| is_xsd(n, "extension") || is_xsd(n, "restriction"));
                    let Some(derivation) = derivation else {
                        return Err(self.error(&child, "content without extension or restriction"));
                    };
                    ty.derivation = if derivation.tag_name().name() == "extension" {
                        Derivation::Extension
                    } else {
                        Derivation::Restriction
                    };
                    if let Some(base) = derivation.attribute("base") {
                        ty.base = Some(self.qname_value(&derivation, base)?);
                    }
                    ty.particle = self.first_particle(&derivation)?;
                    self.collect_attributes(&derivation, &mut ty.attributes)?;
                }
                "sequence" | "choice" | "all" | "group" => {
                    ty.particle = self.particle(&child)?;
                }
                _ => {}
            }
        }
        self.collect_attributes(node, &mut ty.attributes)?;
        Ok(ty)
    }

    fn first_particle(&self, node: &Node) -> Result<Option<Particle>> {
        let body = node
            .children()
            .filter(Node::is_element)
            .find(|n| {
                n.tag_name().namespace() == Some(XSD_NS)
                    && matches!(n.tag_name().name(), "sequence" | "choice" | "all" | "group")
            });
        match body {
            Some(body) => self.particle(&body),
            None => Ok(None),
        }
    }

    fn particle(&self, node: &Node) -> Result<Option<Particle>> {
        if node.tag_name().namespace() != Some(XSD_NS) {
            return Ok(None);
        }
        let occurs = self.occurs(node)?;
        let term = match node.tag_name().name() {
            "element" => match node.attribute("ref") {
                Some(r) => Term::ElementRef(self.qname_value(node, r)?),
                None => Term::Element(self.element_decl(node, false)?),
            },
            "sequence" | "choice" | "all" => {
                let mut items = Vec::new();
                for child in node.children().filter(Node::is_element) {
                    if let Some(p) = self.particle(&child)? {
                        items.push(p);
                    }
                }
                match node.tag_name().name() {
                    "sequence" => Term::Sequence(items),
                    "choice" => Term::Choice(items),
                    _ => Term::All(items),
                }
            }
            "group" => {
                let r = node
                    .attribute("ref")
                    .ok_or_else(|| self.error(node, "group particle without ref"))?;
                Term::Group(self.qname_value(node, r)?)
            }
            "any" => Term::Any(self.wildcard(node)),
            _ => return Ok(None),
        };
        Ok(Some(Particle { term, occurs }))
    }

    fn wildcard(&self, node: &Node) -> Wildcard {
        match node.attribute("namespace").unwrap_or("##any") {
            "##any" => Wildcard::Any,
            "##other" => Wildcard::Other(self.target.clone()),
            list => Wildcard::List(
                list.split_whitespace()
                    .map(|n| match n {
                        "##local" => String::new(),
                        "##targetNamespace" => self.target.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
        }
    }

    fn collect_attributes(&self, node: &Node, out: &mut AttributeSet) -> Result<()> {
        for child in node.children().filter(Node::is_element) {
            if child.tag_name().namespace() != Some(XSD_NS) {
                continue;
            }
            match child.tag_name().name() {
                "attribute" => {
                    if child.attribute("use") == Some("prohibited") {
                        continue;
                    }
                    let required = child.attribute("use") == Some("required");
                    let name = match (child.attribute("ref"), child.attribute("name")) {
                        (Some(r), _) => self.qname_value(&child, r)?,
                        (None, Some(n)) => {
                            let qualified = self.qualified_attributes
                                || child.attribute("form") == Some("qualified");
                            QName::new(if qualified { self.target.as_str() } else { "" }, n)
                        }
                        (None, None) => {
                            return Err(self.error(&child, "attribute without name or ref"))
                        }
                    };
                    out.attributes.push(AttributeUse { name, required });
                }
                "attributeGroup" => {
                    if let Some(r) = child.attribute("ref") {
                        out.groups.push(self.qname_value(&child, r)?);
                    }
                }
                "anyAttribute" => out.any_attribute = true,
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_NS: &str = "urn:test:deck";

    /// A small schema in the shape of the presentation schemas
    pub(crate) const SAMPLE_XSD: &str = r###"<?xml version="1.0" encoding="UTF-8"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
            xmlns="urn:test:deck" targetNamespace="urn:test:deck"
            elementFormDefault="qualified">
  <xsd:complexType name="CT_Text">
    <xsd:simpleContent>
      <xsd:extension base="xsd:string"/>
    </xsd:simpleContent>
  </xsd:complexType>
  <xsd:complexType name="CT_Run">
    <xsd:sequence>
      <xsd:element name="t" type="CT_Text"/>
    </xsd:sequence>
    <xsd:attribute name="lang" type="xsd:string"/>
  </xsd:complexType>
  <xsd:attributeGroup name="AG_Id">
    <xsd:attribute name="id" type="xsd:unsignedInt" use="required"/>
  </xsd:attributeGroup>
  <xsd:group name="EG_Body">
    <xsd:choice>
      <xsd:element name="r" type="CT_Run"/>
      <xsd:element name="br" type="CT_Empty"/>
    </xsd:choice>
  </xsd:group>
  <xsd:complexType name="CT_Empty"/>
  <xsd:complexType name="CT_Shape">
    <xsd:sequence>
      <xsd:element name="name" type="xsd:string" minOccurs="0"/>
      <xsd:group ref="EG_Body" minOccurs="0" maxOccurs="unbounded"/>
      <xsd:element name="extLst" minOccurs="0">
        <xsd:complexType>
          <xsd:sequence>
            <xsd:any namespace="##any" processContents="lax" minOccurs="0" maxOccurs="unbounded"/>
          </xsd:sequence>
        </xsd:complexType>
      </xsd:element>
    </xsd:sequence>
    <xsd:attributeGroup ref="AG_Id"/>
  </xsd:complexType>
  <xsd:complexType name="CT_Picture">
    <xsd:complexContent>
      <xsd:extension base="CT_Shape">
        <xsd:sequence>
          <xsd:element name="blip" type="CT_Empty"/>
        </xsd:sequence>
        <xsd:attribute name="embed" type="xsd:string" use="required"/>
      </xsd:extension>
    </xsd:complexContent>
  </xsd:complexType>
  <xsd:complexType name="CT_Slide">
    <xsd:sequence>
      <xsd:element name="title" type="xsd:string"/>
      <xsd:choice minOccurs="0" maxOccurs="unbounded">
        <xsd:element name="sp" type="CT_Shape"/>
        <xsd:element name="pic" type="CT_Picture"/>
      </xsd:choice>
      <xsd:element name="notes" minOccurs="0" maxOccurs="2" type="xsd:string"/>
    </xsd:sequence>
    <xsd:attribute name="show" type="xsd:boolean"/>
    <xsd:anyAttribute namespace="##other"/>
  </xsd:complexType>
  <xsd:element name="slide" type="CT_Slide"/>
  <xsd:element name="meta">
    <xsd:complexType>
      <xsd:all>
        <xsd:element name="author" type="xsd:string"/>
        <xsd:element name="date" type="xsd:string" minOccurs="0"/>
      </xsd:all>
    </xsd:complexType>
  </xsd:element>
</xsd:schema>"###;

    pub(crate) fn sample_set() -> SchemaSet {
        let mut set = SchemaSet::builtin().unwrap();
        set.add_schema("deck.xsd", SAMPLE_XSD).unwrap();
        set
    }

    fn q(local: &str) -> QName {
        QName::new(SAMPLE_NS, local)
    }

    #[test]
    fn test_loads_globals_and_namespaces() {
        let set = sample_set();
        assert!(set.has_namespace(SAMPLE_NS));
        assert!(set.element(&q("slide")).is_some());
        assert!(set.element(&q("meta")).is_some());
        assert!(set.group(&q("EG_Body")).is_some());
        assert_eq!(set.sources().last().map(String::as_str), Some("deck.xsd"));
    }

    #[test]
    fn test_extension_prepends_base_content_and_attributes() {
        let set = sample_set();
        let Resolved::Complex(pic) = set.resolve(Some(&TypeRef::Named(q("CT_Picture")))) else {
            panic!("expected complex type");
        };
        let names: Vec<&str> = pic.attributes.iter().map(|a| a.name.local.as_str()).collect();
        assert_eq!(names, vec!["id", "embed"]);
        assert!(pic.attributes.iter().all(|a| a.required));

        let Some(Particle {
            term: Term::Sequence(parts),
            ..
        }) = pic.particle
        else {
            panic!("expected base then own sequence");
        };
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_simple_content_and_builtin_types() {
        let set = sample_set();
        let Resolved::Complex(text) = set.resolve(Some(&TypeRef::Named(q("CT_Text")))) else {
            panic!("expected complex type");
        };
        assert!(text.simple_content);
        assert_eq!(
            set.resolve(Some(&TypeRef::Named(QName::new(XSD_NS, "string")))),
            Resolved::Simple
        );
        assert_eq!(set.resolve(None), Resolved::Unchecked);
        assert_eq!(
            set.resolve(Some(&TypeRef::Named(q("CT_Missing")))),
            Resolved::Unchecked
        );
    }

    #[test]
    fn test_occurs_and_wildcards() {
        let set = sample_set();
        let Resolved::Complex(slide) = set.resolve(Some(&TypeRef::Named(q("CT_Slide")))) else {
            panic!("expected complex type");
        };
        assert!(slide.any_attribute);
        let Some(Particle {
            term: Term::Sequence(items),
            ..
        }) = slide.particle
        else {
            panic!("expected sequence");
        };
        assert_eq!(
            items[2].occurs,
            Occurs {
                min: 0,
                max: MaxOccurs::Bounded(2)
            }
        );

        assert!(Wildcard::Other(SAMPLE_NS.into()).allows("urn:other"));
        assert!(!Wildcard::Other(SAMPLE_NS.into()).allows(SAMPLE_NS));
        assert!(!Wildcard::Other(SAMPLE_NS.into()).allows(""));
        assert!(Wildcard::List(vec![String::new()]).allows(""));
    }

    #[test]
    fn test_rejects_bad_schemas() {
        let mut set = SchemaSet::new();
        let err = set.add_schema("x.xsd", "<schema/>").unwrap_err();
        assert!(err.to_string().contains("not xsd:schema"));

        let err = set
            .add_schema(
                "y.xsd",
                r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"><xsd:element type="xsd:string"/></xsd:schema>"#,
            )
            .unwrap_err();
        assert!(err.to_string().contains("element without a name"));

        assert!(matches!(
            set.add_schema("z.xsd", "<xsd:schema"),
            Err(ValidateError::SchemaXml { .. })
        ));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("pml");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("deck.xsd"), SAMPLE_XSD).unwrap();
        fs::write(dir.path().join("readme.txt"), "not a schema").unwrap();

        let set = SchemaSet::load_dir(dir.path()).unwrap();
        assert!(set.has_namespace(SAMPLE_NS));

        let missing = SchemaSet::load_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(missing, ValidateError::SchemaDirNotFound(_)));
    }
}
