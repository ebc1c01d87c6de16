//! AST node types for parsed protobuf schemas.
//!
//! Every node records the [`Position`] of its first significant token and the
//! comments that immediately preceded it. Bodies that mix element kinds keep a
//! single ordered list, so declaration order survives parsing.

pub use super::lexer::Position;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One `//` or `/* */` comment, text included verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstComment {
    pub raw: String,
    pub position: Position,
}

/// A parsed `.proto` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstFile {
    /// Top-level statements in declaration order.
    pub items: Vec<AstItem>,
}

impl AstFile {
    /// The version named by the `syntax` statement, if any.
    pub fn syntax(&self) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            AstItem::Syntax(s) => Some(s.version.as_str()),
            _ => None,
        })
    }

    /// The package name. A file declaring several packages reports the last.
    pub fn package(&self) -> Option<&str> {
        self.items.iter().rev().find_map(|item| match item {
            AstItem::Package(p) => Some(p.name.as_str()),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &AstImport> {
        self.items.iter().filter_map(|item| match item {
            AstItem::Import(i) => Some(i),
            _ => None,
        })
    }

    pub fn options(&self) -> impl Iterator<Item = &AstOption> {
        self.items.iter().filter_map(|item| match item {
            AstItem::Option(o) => Some(o),
            _ => None,
        })
    }

    pub fn messages(&self) -> impl Iterator<Item = &AstMessage> {
        self.items.iter().filter_map(|item| match item {
            AstItem::Message(m) => Some(m),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &AstEnum> {
        self.items.iter().filter_map(|item| match item {
            AstItem::Enum(e) => Some(e),
            _ => None,
        })
    }

    pub fn services(&self) -> impl Iterator<Item = &AstService> {
        self.items.iter().filter_map(|item| match item {
            AstItem::Service(s) => Some(s),
            _ => None,
        })
    }
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(tag = "kind"))]
pub enum AstItem {
    Syntax(AstSyntax),
    Package(AstPackage),
    Import(AstImport),
    Option(AstOption),
    Message(AstMessage),
    Enum(AstEnum),
    Service(AstService),
}

/// `syntax = "proto3";`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstSyntax {
    /// The version string without its quotes.
    pub version: String,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

/// `package foo.bar;`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstPackage {
    pub name: String,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ImportModifier {
    Public,
    Weak,
}

/// `import [public|weak] "path";`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstImport {
    pub modifier: Option<ImportModifier>,
    /// The imported path without its quotes.
    pub path: String,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

/// `option <name> = <constant>;`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstOption {
    /// The option name as written, e.g. `java_package` or `(my_option).a`.
    pub name: String,
    /// The constant as written: strings keep their quotes.
    pub constant: String,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

/// A message definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstMessage {
    pub name: String,
    pub body: Vec<AstMember>,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

/// An element of a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(tag = "kind"))]
pub enum AstMember {
    Option(AstOption),
    Field(AstField),
    MapField(AstMapField),
    Message(AstMessage),
    Enum(AstEnum),
    Oneof(AstOneof),
    Reserved(AstReserved),
}

impl AstMember {
    pub fn comments(&self) -> &[AstComment] {
        match self {
            AstMember::Option(o) => &o.comments,
            AstMember::Field(f) => &f.comments,
            AstMember::MapField(m) => &m.comments,
            AstMember::Message(m) => &m.comments,
            AstMember::Enum(e) => &e.comments,
            AstMember::Oneof(o) => &o.comments,
            AstMember::Reserved(r) => &r.comments,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            AstMember::Option(o) => o.position,
            AstMember::Field(f) => f.position,
            AstMember::MapField(m) => m.position,
            AstMember::Message(m) => m.position,
            AstMember::Enum(e) => e.position,
            AstMember::Oneof(o) => o.position,
            AstMember::Reserved(r) => r.position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FieldLabel {
    Repeated,
    Optional,
    Required,
}

/// A field definition within a message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstField {
    pub label: Option<FieldLabel>,
    /// Type name, possibly dotted (`Outer.Inner`, `.pkg.Type`).
    pub type_name: String,
    pub name: String,
    /// The field number as written.
    pub number: String,
    /// Text between the brackets of `[...]` field options, if present.
    pub options: Option<String>,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

impl AstField {
    pub fn is_repeated(&self) -> bool {
        self.label == Some(FieldLabel::Repeated)
    }
}

/// `map<key, value> name = number;`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstMapField {
    pub key_type: String,
    pub value_type: String,
    pub name: String,
    pub number: String,
    pub options: Option<String>,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstOneof {
    pub name: String,
    pub fields: Vec<AstOneofField>,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

/// A field inside a oneof: same shape as [`AstField`] without a label.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstOneofField {
    pub type_name: String,
    pub name: String,
    pub number: String,
    pub options: Option<String>,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstEnum {
    pub name: String,
    pub body: Vec<AstEnumMember>,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(tag = "kind"))]
pub enum AstEnumMember {
    Option(AstOption),
    Field(AstEnumField),
}

/// `NAME = value [options];`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstEnumField {
    pub name: String,
    /// The value as written, sign included.
    pub value: String,
    pub options: Option<String>,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstService {
    pub name: String,
    pub options: Vec<AstOption>,
    pub rpcs: Vec<AstRpc>,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

/// `rpc Name(Request) returns (Response);`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstRpc {
    pub name: String,
    pub request: AstRpcType,
    pub response: AstRpcType,
    /// Options declared in the method body.
    pub options: Vec<AstOption>,
    pub comments: Vec<AstComment>,
    pub position: Position,
}

/// The request or response side of an RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstRpcType {
    pub message_type: String,
    pub is_stream: bool,
}

/// `reserved 2, 9 to 11, "foo";`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstReserved {
    /// Each entry as written: quoted names, numbers, or ranges like `9 to 11`.
    pub entries: Vec<String>,
    pub comments: Vec<AstComment>,
    pub position: Position,
}
