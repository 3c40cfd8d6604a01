//! Package-level schemas compiled into the crate
//!
//! The Open Packaging Conventions schemas for relationship parts and
//! `[Content_Types].xml`. Markup schemas (PresentationML, DrawingML, ...)
//! are large and are loaded from a schema directory instead.

pub(crate) const OPC_RELATIONSHIPS: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<xsd:schema xmlns="http://schemas.openxmlformats.org/package/2006/relationships"
    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    targetNamespace="http://schemas.openxmlformats.org/package/2006/relationships"
    elementFormDefault="qualified" attributeFormDefault="unqualified" blockDefault="#all">
  <xsd:element name="Relationships" type="CT_Relationships"/>
  <xsd:element name="Relationship" type="CT_Relationship"/>
  <xsd:complexType name="CT_Relationships">
    <xsd:sequence>
      <xsd:element ref="Relationship" minOccurs="0" maxOccurs="unbounded"/>
    </xsd:sequence>
  </xsd:complexType>
  <xsd:complexType name="CT_Relationship">
    <xsd:simpleContent>
      <xsd:extension base="xsd:string">
        <xsd:attribute name="TargetMode" type="ST_TargetMode" use="optional"/>
        <xsd:attribute name="Target" type="xsd:anyURI" use="required"/>
        <xsd:attribute name="Type" type="xsd:anyURI" use="required"/>
        <xsd:attribute name="Id" type="xsd:ID" use="required"/>
      </xsd:extension>
    </xsd:simpleContent>
  </xsd:complexType>
  <xsd:simpleType name="ST_TargetMode">
    <xsd:restriction base="xsd:string">
      <xsd:enumeration value="External"/>
      <xsd:enumeration value="Internal"/>
    </xsd:restriction>
  </xsd:simpleType>
</xsd:schema>"##;

pub(crate) const OPC_CONTENT_TYPES: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns="http://schemas.openxmlformats.org/package/2006/content-types"
    xmlns:xs="http://www.w3.org/2001/XMLSchema"
    targetNamespace="http://schemas.openxmlformats.org/package/2006/content-types"
    elementFormDefault="qualified" attributeFormDefault="unqualified" blockDefault="#all">
  <xs:element name="Types" type="CT_Types"/>
  <xs:element name="Default" type="CT_Default"/>
  <xs:element name="Override" type="CT_Override"/>
  <xs:complexType name="CT_Types">
    <xs:choice minOccurs="0" maxOccurs="unbounded">
      <xs:element ref="Default"/>
      <xs:element ref="Override"/>
    </xs:choice>
  </xs:complexType>
  <xs:complexType name="CT_Default">
    <xs:attribute name="Extension" type="ST_Extension" use="required"/>
    <xs:attribute name="ContentType" type="ST_ContentType" use="required"/>
  </xs:complexType>
  <xs:complexType name="CT_Override">
    <xs:attribute name="ContentType" type="ST_ContentType" use="required"/>
    <xs:attribute name="PartName" type="xs:anyURI" use="required"/>
  </xs:complexType>
  <xs:simpleType name="ST_ContentType">
    <xs:restriction base="xs:string"/>
  </xs:simpleType>
  <xs:simpleType name="ST_Extension">
    <xs:restriction base="xs:string"/>
  </xs:simpleType>
</xs:schema>"##;

/// `(name, text)` of every built-in schema
pub(crate) const SCHEMAS: [(&str, &str); 2] = [
    ("opc-relationships.xsd", OPC_RELATIONSHIPS),
    ("opc-contentTypes.xsd", OPC_CONTENT_TYPES),
];
