//! Static evaluation of expression trees.
//!
//! Two entry points: [`evaluate_value`] recovers concrete values (defaults,
//! class names, enum value sets) and [`classify_type`] tells the JavaScript
//! type of an expression without evaluating it. Both are pure functions and
//! may be called from any thread.

mod classify;
mod error;
mod evaluate;
mod node;
mod value;

pub use classify::classify_type;
pub use error::{EvalError, EvalResult};
pub use evaluate::evaluate_value;
pub use node::{ExpressionNode, Literal, LiteralValue, ObjectEntry};
pub use value::{TypeClass, TypedValue, Value, format_number};
