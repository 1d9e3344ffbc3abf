use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use crate::interpreter::ast::{InputTarget, Node, PrintItem};
use crate::interpreter::environment::{Context, RESULT_VARIABLE};

#[derive(Debug)]
pub enum RuntimeError {
    UndefinedVariable(String),
    UndefinedProgram(String),
    WrongArgumentCount {
        program: String,
        expected: usize,
        found: usize,
    },
    InvalidInput(String),
    Io(std::io::Error),
}

impl From<std::io::Error> for RuntimeError {
    fn from(error: std::io::Error) -> RuntimeError {
        RuntimeError::Io(error)
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::UndefinedVariable(name) => write!(f, "Error: undefined variable '{}'", name),
            RuntimeError::UndefinedProgram(name) => write!(f, "Error: undefined program '{}'", name),
            RuntimeError::WrongArgumentCount { program, expected, found } =>
                write!(f, "Error: program '{}' takes {} arguments, got {}", program, expected, found),
            RuntimeError::InvalidInput(input) => write!(f, "Error: expected a non-negative integer as input, got `{}`", input),
            RuntimeError::Io(error) => write!(f, "Error: {}", error),
        }
    }
}

type RuntimeResult<T> = Result<T, RuntimeError>;

/// Tree-walking statement executor. Holds only the line-based I/O handles;
/// all mutable program state lives in the `Context`.
pub struct Interpreter<'io> {
    input: &'io mut dyn BufRead,
    output: &'io mut dyn Write,
}

impl<'io> Interpreter<'io> {
    pub fn new(input: &'io mut dyn BufRead, output: &'io mut dyn Write) -> Interpreter<'io> {
        Interpreter { input, output }
    }

    /// Interprets the statements in order, stopping at the first failure.
    pub fn interpret(&mut self, nodes: &[Node], context: &mut Context) -> RuntimeResult<()> {
        for node in nodes {
            self.interpret_node(node, context)?;
        }

        Ok(())
    }

    fn interpret_node(&mut self, node: &Node, context: &mut Context) -> RuntimeResult<()> {
        match node {
            Node::AssignNumber { variable, value } => {
                context.set_variable(variable, *value);
                Ok(())
            },

            Node::AssignPlus { variable, source } => {
                let value = context.get_variable(source)?;
                context.set_variable(variable, value + 1);
                Ok(())
            },

            Node::AssignCall { variable, program, args } =>
                self.interpret_call(variable, program, args, context),

            Node::Input { targets } => self.interpret_input(targets, context),
            Node::Print { items } => self.interpret_print(items, context),

            Node::Loop { variable, body } => {
                // The trip count is captured once at entry; the body may
                // freely mutate the count variable.
                let count = context.get_variable(variable)?;

                for _ in 0..count {
                    self.interpret(body, context)?;
                }

                Ok(())
            },

            // Registration happened when the definition parsed; running the
            // node again does nothing.
            Node::Definition { .. } => Ok(()),
        }
    }

    fn interpret_call(&mut self, variable: &str, program: &str, args: &[String], context: &mut Context) -> RuntimeResult<()> {
        let mut call_context = context.program_context(program, args)?;
        let definition = context.program_body(program)?;

        self.interpret(definition.body(), &mut call_context)?;

        let result = call_context.get_variable(RESULT_VARIABLE)?;
        context.set_variable(variable, result);

        Ok(())
    }

    fn interpret_input(&mut self, targets: &[InputTarget], context: &mut Context) -> RuntimeResult<()> {
        for target in targets {
            match target {
                InputTarget::Prompt(prompt) => {
                    write!(self.output, "{}", prompt)?;
                    self.output.flush()?;
                },

                InputTarget::Variable(variable) => {
                    let mut line = String::new();

                    if self.input.read_line(&mut line)? == 0 {
                        return Err(RuntimeError::InvalidInput(String::from("end of input")));
                    }

                    let value: i32 = line.trim().parse()
                        .map_err(|_| RuntimeError::InvalidInput(line.trim().to_owned()))?;

                    if value < 0 {
                        return Err(RuntimeError::InvalidInput(line.trim().to_owned()));
                    }

                    context.set_variable(variable, value);
                },
            }
        }

        Ok(())
    }

    fn interpret_print(&mut self, items: &[PrintItem], context: &Context) -> RuntimeResult<()> {
        let mut line = String::new();
        let mut last_string = true;

        for item in items {
            match item {
                PrintItem::String(value) => {
                    line.push_str(value);
                    last_string = true;
                },

                PrintItem::Number(value) => {
                    if !last_string {
                        line.push(' ');
                    }

                    line.push_str(&value.to_string());
                    last_string = false;
                },

                PrintItem::Variable(variable) => {
                    if !last_string {
                        line.push(' ');
                    }

                    // Printing is deliberately lenient about unset variables.
                    match context.get_variable(variable) {
                        Ok(value) => line.push_str(&value.to_string()),
                        Err(_) => line.push_str("undefined"),
                    }

                    last_string = false;
                },
            }
        }

        writeln!(self.output, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
