use super::Value;
use crate::driver::Dictionary;

use std::fmt::Write;

/// A SQL fragment contributed by a strategy: the right-hand side of a bulk
/// `SET` assignment or a class condition of a `WHERE` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a column of the statement's table
    Column(String),

    /// A literal value
    Value(Value),

    /// A binary operation
    BinaryOp(ExprBinaryOp),

    /// `expr IN (values...)`
    InList(ExprInList),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBinaryOp {
    pub lhs: Box<Expr>,
    pub op: BinaryOp,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Eq,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub expr: Box<Expr>,
    pub list: Vec<Value>,
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Expr {
        Expr::Column(name.into())
    }

    pub fn value(value: impl Into<Value>) -> Expr {
        Expr::Value(value.into())
    }

    pub fn binary_op(lhs: impl Into<Expr>, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        Expr::BinaryOp(ExprBinaryOp {
            lhs: Box::new(lhs.into()),
            op,
            rhs: Box::new(rhs.into()),
        })
    }

    /// `lhs + rhs`
    pub fn add(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::binary_op(lhs, BinaryOp::Add, rhs)
    }

    /// `lhs = rhs`
    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::binary_op(lhs, BinaryOp::Eq, rhs)
    }

    /// `expr IN (list)`. A single-item list collapses to `expr = item`.
    pub fn in_list(expr: impl Into<Expr>, mut list: Vec<Value>) -> Expr {
        if list.len() == 1 {
            if let Some(item) = list.pop() {
                return Expr::eq(expr, item);
            }
        }

        Expr::InList(ExprInList {
            expr: Box::new(expr.into()),
            list,
        })
    }

    /// Renders the expression as SQL, quoting identifiers per `dictionary`.
    pub fn to_sql(&self, dictionary: &Dictionary) -> String {
        let mut out = String::new();
        self.write_sql(dictionary, &mut out);
        out
    }

    fn write_sql(&self, dictionary: &Dictionary, out: &mut String) {
        match self {
            Expr::Column(name) => out.push_str(&dictionary.quote(name)),
            Expr::Value(value) => write_literal(value, out),
            Expr::BinaryOp(expr) => {
                expr.lhs.write_sql(dictionary, out);
                out.push_str(match expr.op {
                    BinaryOp::Add => " + ",
                    BinaryOp::Eq => " = ",
                });
                expr.rhs.write_sql(dictionary, out);
            }
            Expr::InList(expr) => {
                expr.expr.write_sql(dictionary, out);
                out.push_str(" IN (");
                for (i, value) in expr.list.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_literal(value, out);
                }
                out.push(')');
            }
        }
    }
}

fn write_literal(value: &Value, out: &mut String) {
    let _ = match value {
        Value::Null => write!(out, "NULL"),
        Value::Bool(true) => write!(out, "TRUE"),
        Value::Bool(false) => write!(out, "FALSE"),
        Value::I8(v) => write!(out, "{v}"),
        Value::I16(v) => write!(out, "{v}"),
        Value::I32(v) => write!(out, "{v}"),
        Value::I64(v) => write!(out, "{v}"),
        Value::U8(v) => write!(out, "{v}"),
        Value::F32(v) => write!(out, "{v}"),
        Value::F64(v) => write!(out, "{v}"),
        Value::BigInt(v) => write!(out, "{v}"),
        Value::String(v) | Value::Locale(v) => write!(out, "'{}'", v.replace('\'', "''")),
        Value::Char(v) => write!(out, "'{}'", v.to_string().replace('\'', "''")),
        Value::Timestamp(v) => write!(out, "'{v}'"),
        Value::Date(v) => write!(out, "'{v}'"),
        other => write!(out, "?{}", other.kind_name()),
    };
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Value(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Value(Value::I64(value))
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Value(Value::from(value))
    }
}
