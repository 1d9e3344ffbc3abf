use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use crate::interpreter::ast::Node;
use crate::interpreter::interpreter::RuntimeError;

/// Name of the variable whose final value in a call context becomes the
/// result of the call. Defaulted to zero when the call context is created.
pub const RESULT_VARIABLE: &str = "X0";

/// A fully-parsed program definition. Immutable once registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    params: Vec<String>,
    body: Vec<Node>,
}

impl Program {
    pub fn new(params: Vec<String>, body: Vec<Node>) -> Program {
        Program { params, body }
    }

    pub fn params(&self) -> &[String] { &self.params }
    pub fn body(&self) -> &[Node] { &self.body }
}

/// The append-only program registry. A program name is fully defined iff it
/// has an entry here; the parser adds entries as definitions close, and
/// every context of a run shares the same table.
#[derive(Debug, Default)]
pub struct Programs {
    definitions: HashMap<String, Rc<Program>>,
}

impl Programs {
    pub fn new() -> Programs {
        Programs { definitions: HashMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<Rc<Program>> {
        self.definitions.get(name).map(Rc::clone)
    }

    /// Registers a definition. Returns `false` without overwriting if the
    /// name is already taken.
    pub fn define(&mut self, name: &str, program: Program) -> bool {
        if self.definitions.contains_key(name) {
            return false;
        }

        self.definitions.insert(name.to_owned(), Rc::new(program)).is_none()
    }
}

/// A variable environment. The top-level run owns one; every program call
/// gets a fresh one with only its parameters bound.
pub struct Context {
    variables: HashMap<String, i32>,
    programs: Rc<RefCell<Programs>>,
}

impl Context {
    pub fn new(programs: Rc<RefCell<Programs>>) -> Context {
        Context {
            variables: HashMap::new(),
            programs,
        }
    }

    pub fn get_variable(&self, name: &str) -> Result<i32, RuntimeError> {
        self.variables.get(name).copied()
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_owned()))
    }

    pub fn set_variable(&mut self, name: &str, value: i32) {
        self.variables.insert(name.to_owned(), value);
    }

    /// Builds the call context for one invocation of `program`: a fresh
    /// variable map with each formal parameter bound to the current value of
    /// the corresponding actual argument in this context, and the result
    /// variable defaulted to zero unless a parameter already bound it.
    pub fn program_context(&self, program: &str, args: &[String]) -> Result<Context, RuntimeError> {
        let programs = self.programs.borrow();
        let definition = programs.definitions.get(program)
            .ok_or_else(|| RuntimeError::UndefinedProgram(program.to_owned()))?;

        if definition.params.len() != args.len() {
            return Err(RuntimeError::WrongArgumentCount {
                program: program.to_owned(),
                expected: definition.params.len(),
                found: args.len(),
            });
        }

        let mut context = Context::new(Rc::clone(&self.programs));

        for (param, arg) in definition.params.iter().zip(args) {
            let value = self.get_variable(arg)?;
            context.set_variable(param, value);
        }

        if !context.variables.contains_key(RESULT_VARIABLE) {
            context.set_variable(RESULT_VARIABLE, 0);
        }

        Ok(context)
    }

    pub fn program_body(&self, name: &str) -> Result<Rc<Program>, RuntimeError> {
        self.programs.borrow().get(name)
            .ok_or_else(|| RuntimeError::UndefinedProgram(name.to_owned()))
    }
}
