use super::{GraphContext, GraphPass};
use crate::error::Result;
use crate::eval::{ExpressionNode, TypeClass, classify_type};
use crate::model::{DeclarationRecord, ReturnDoc, TagName};
use crate::relations::RelationsGraph;

/// Fills in return types of methods.
///
/// Chainable methods return their owner. Methods without a declared return
/// type get one inferred from their `return` statements when all of them
/// agree.
pub struct ReturnValuesPass;

impl GraphPass for ReturnValuesPass {
    fn name(&self) -> &'static str {
        "return_values"
    }

    fn process(&self, graph: &mut RelationsGraph, _ctx: &mut GraphContext<'_>) -> Result<()> {
        for class in graph.iter_mut() {
            let owner = class.name.as_str();
            for member in class.members.iter_mut().filter(|m| m.tag == TagName::Method) {
                process_method(owner, member);
            }
        }
        Ok(())
    }
}

fn process_method(owner: &str, method: &mut DeclarationRecord) {
    let meta = &mut method.meta;
    let declared = meta.returns.as_ref().and_then(|r| r.type_name.as_ref()).is_some();

    if !meta.chainable && !declared {
        match infer(&meta.return_expressions) {
            Some(TypeClass::ThisRef) => meta.chainable = true,
            Some(class) => {
                if let Some(type_name) = type_name_of(class) {
                    meta.returns.get_or_insert_with(ReturnDoc::default).type_name = Some(type_name.to_string());
                }
                return;
            }
            None => return,
        }
    }

    if meta.chainable {
        let returns = meta.returns.get_or_insert_with(ReturnDoc::default);
        if returns.type_name.is_none() {
            returns.type_name = Some(owner.to_string());
        }
        if returns.doc.is_none() {
            returns.doc = Some("this".to_string());
        }
    }
}

/// Common type class of all return expressions.
fn infer(expressions: &[ExpressionNode]) -> Option<TypeClass> {
    let (first, rest) = expressions.split_first()?;
    let class = classify_type(first);
    rest.iter().all(|e| classify_type(e) == class).then_some(class)
}

fn type_name_of(class: TypeClass) -> Option<&'static str> {
    match class {
        TypeClass::Boolean => Some("Boolean"),
        TypeClass::String => Some("String"),
        TypeClass::Regexp => Some("RegExp"),
        TypeClass::ThisRef | TypeClass::Undefined | TypeClass::Other => None,
    }
}
