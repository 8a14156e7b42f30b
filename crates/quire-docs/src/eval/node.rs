use serde::{Deserialize, Serialize};

/// Expression tree recovered from source code.
///
/// This is a closed subset of the JavaScript expression grammar; anything
/// outside it is carried as `Other` with the name of the original node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpressionNode {
    Literal(Literal),
    Array {
        elements: Vec<ExpressionNode>,
    },
    Object {
        entries: Vec<ObjectEntry>,
    },
    Binary {
        operator: String,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    Member {
        object: Box<ExpressionNode>,
        property: Box<ExpressionNode>,
        computed: bool,
    },
    Identifier {
        name: String,
    },
    This,
    Unary {
        operator: String,
        argument: Box<ExpressionNode>,
    },
    Logical {
        operator: String,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    Conditional {
        test: Box<ExpressionNode>,
        consequent: Box<ExpressionNode>,
        alternate: Box<ExpressionNode>,
    },
    Assignment {
        operator: String,
        target: Box<ExpressionNode>,
        value: Box<ExpressionNode>,
    },
    Other {
        node_type: String,
    },
}

/// Literal with its raw source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub raw: String,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    /// Pattern and flags; the raw text is the authoritative form.
    Regex(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: ExpressionNode,
    pub value: ExpressionNode,
}

impl ExpressionNode {
    pub fn string(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::Literal(Literal {
            raw: format!("'{}'", value.replace('\'', "\\'")),
            value: LiteralValue::String(value),
        })
    }

    pub fn number(value: f64) -> Self {
        Self::Literal(Literal {
            raw: super::value::format_number(value),
            value: LiteralValue::Number(value),
        })
    }

    pub fn boolean(value: bool) -> Self {
        Self::Literal(Literal {
            raw: value.to_string(),
            value: LiteralValue::Boolean(value),
        })
    }

    pub fn null() -> Self {
        Self::Literal(Literal {
            raw: "null".to_string(),
            value: LiteralValue::Null,
        })
    }

    /// Regex literal from its full source form, e.g. `/.*/g`.
    pub fn regex(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self::Literal(Literal {
            value: LiteralValue::Regex(raw.clone()),
            raw,
        })
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier { name: name.into() }
    }

    pub fn array(elements: Vec<ExpressionNode>) -> Self {
        Self::Array { elements }
    }

    pub fn object(entries: Vec<(ExpressionNode, ExpressionNode)>) -> Self {
        Self::Object {
            entries: entries
                .into_iter()
                .map(|(key, value)| ObjectEntry { key, value })
                .collect(),
        }
    }

    pub fn binary(operator: &str, left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::Binary {
            operator: operator.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logical(operator: &str, left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::Logical {
            operator: operator.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(operator: &str, argument: ExpressionNode) -> Self {
        Self::Unary {
            operator: operator.to_string(),
            argument: Box::new(argument),
        }
    }

    /// Non-computed `object.property` access.
    pub fn member(object: ExpressionNode, property: &str) -> Self {
        Self::Member {
            object: Box::new(object),
            property: Box::new(Self::ident(property)),
            computed: false,
        }
    }

    pub fn other(node_type: impl Into<String>) -> Self {
        Self::Other {
            node_type: node_type.into(),
        }
    }

    /// Short name of the node type, used in evaluation diagnostics.
    pub fn node_type(&self) -> &str {
        match self {
            Self::Literal(_) => "Literal",
            Self::Array { .. } => "ArrayExpression",
            Self::Object { .. } => "ObjectExpression",
            Self::Binary { .. } => "BinaryExpression",
            Self::Member { .. } => "MemberExpression",
            Self::Identifier { .. } => "Identifier",
            Self::This => "ThisExpression",
            Self::Unary { .. } => "UnaryExpression",
            Self::Logical { .. } => "LogicalExpression",
            Self::Conditional { .. } => "ConditionalExpression",
            Self::Assignment { .. } => "AssignmentExpression",
            Self::Other { node_type } => node_type,
        }
    }
}
