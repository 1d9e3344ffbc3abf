use std::fmt::{Display, Formatter};
use crate::interpreter::lexer::escaped;

/// One target of an `INPUT` statement: either a prompt to show or a
/// variable to read into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputTarget {
    Prompt(String),
    Variable(String),
}

/// One item of an `OUTPUT` statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrintItem {
    String(String),
    Number(i32),
    Variable(String),
}

/// A parsed statement. Nodes are built whole by the parser and are
/// immutable afterwards; a loop body is interpreted repeatedly without
/// being re-parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    AssignNumber {
        variable: String,
        value: i32,
    },
    AssignPlus {
        variable: String,
        source: String,
    },
    AssignCall {
        variable: String,
        program: String,
        args: Vec<String>,
    },
    Input {
        targets: Vec<InputTarget>,
    },
    Print {
        items: Vec<PrintItem>,
    },
    Loop {
        variable: String,
        body: Vec<Node>,
    },
    Definition {
        name: String,
        params: Vec<String>,
        body: Vec<Node>,
    },
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::AssignNumber { variable, value } =>
                write!(f, "{} := {}", variable.to_lowercase(), value),

            Node::AssignPlus { variable, source } =>
                write!(f, "{} := {} + 1", variable.to_lowercase(), source.to_lowercase()),

            Node::AssignCall { variable, program, args } =>
                write!(f, "{} := {}({})", variable.to_lowercase(), program.to_uppercase(),
                       args.iter().map(|arg| arg.to_lowercase())
                           .collect::<Vec<String>>().join(", ")),

            Node::Input { targets } =>
                write!(f, "INPUT {}", targets.iter().map(|target| match target {
                    InputTarget::Prompt(prompt) => format!("\"{}\"", escaped(prompt)),
                    InputTarget::Variable(variable) => variable.to_lowercase(),
                }).collect::<Vec<String>>().join(", ")),

            Node::Print { items } =>
                write!(f, "OUTPUT {}", items.iter().map(|item| match item {
                    PrintItem::String(value) => format!("\"{}\"", escaped(value)),
                    PrintItem::Number(value) => value.to_string(),
                    PrintItem::Variable(variable) => variable.to_lowercase(),
                }).collect::<Vec<String>>().join(", ")),

            Node::Loop { variable, body } => {
                writeln!(f, "LOOP {} DO", variable.to_lowercase())?;
                write_body(f, body)?;
                write!(f, "END")
            },

            Node::Definition { name, params, body } => {
                writeln!(f, "PROGRAM {}({}) DO", name.to_uppercase(),
                         params.iter().map(|param| param.to_lowercase())
                             .collect::<Vec<String>>().join(", "))?;
                write_body(f, body)?;
                write!(f, "END")
            },
        }
    }
}

fn write_body(f: &mut Formatter<'_>, body: &[Node]) -> std::fmt::Result {
    for node in body {
        for line in node.to_string().lines() {
            writeln!(f, "  {}", line)?;
        }
    }

    Ok(())
}
