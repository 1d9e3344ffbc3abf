use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use lazy_static::lazy_static;
use crate::interpreter::ast::{InputTarget, Node, PrintItem};
use crate::interpreter::environment::{Program, Programs};
use crate::interpreter::lexer::{Lexer, LexerError, Token, TokenPos, TokenType};

lazy_static! {
    static ref PRINT_ITEM_TYPES: [TokenType; 3] = [
        TokenType::String, TokenType::Number, TokenType::Identifier,
    ];

    static ref INPUT_TARGET_TYPES: [TokenType; 2] = [
        TokenType::String, TokenType::Identifier,
    ];
}

#[derive(Debug)]
pub enum ParserError {
    Lexer(LexerError),

    UnexpectedToken {
        found: Token,
        message: String,
    },
    UndefinedProgram {
        name: String,
        pos: TokenPos,
    },
    DuplicateProgram {
        name: String,
        pos: TokenPos,
    },
    DuplicateParameter {
        name: String,
        pos: TokenPos,
    },
    InvalidIncrement {
        pos: TokenPos,
        value: i32,
    },
    WrongArgumentCount {
        program: String,
        expected: usize,
        found: usize,
        pos: TokenPos,
    },
}

impl From<LexerError> for ParserError {
    fn from(error: LexerError) -> ParserError {
        ParserError::Lexer(error)
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserError::Lexer(error) => write!(f, "{}", error),
            ParserError::UnexpectedToken { found, message } =>
                if found.token_type() == TokenType::Eof {
                    write!(f, "{} Error at EOF: {}", found.start(), message)
                } else {
                    write!(f, "{} Error at '{}': {}", found.start(), found.source(), message)
                },
            ParserError::UndefinedProgram { name, pos } =>
                write!(f, "{} Error: program '{}' is not fully defined before call to it", pos, name),
            ParserError::DuplicateProgram { name, pos } =>
                write!(f, "{} Error: program '{}' is already defined", pos, name),
            ParserError::DuplicateParameter { name, pos } =>
                write!(f, "{} Error: duplicate parameter '{}'", pos, name),
            ParserError::InvalidIncrement { pos, value } =>
                write!(f, "{} Error: increment must be 1, got {}", pos, value),
            ParserError::WrongArgumentCount { program, expected, found, pos } =>
                write!(f, "{} Error: program '{}' takes {} arguments, got {}", pos, program, expected, found),
        }
    }
}

type ParserResult<T> = Result<T, ParserError>;

pub struct Parser<'l, 'source> {
    lexer: &'l mut Lexer<'source>,
    terminator: TokenType,
    programs: Rc<RefCell<Programs>>,
}

impl<'l, 'source> Parser<'l, 'source> {
    pub fn new(lexer: &'l mut Lexer<'source>, terminator: TokenType, programs: Rc<RefCell<Programs>>) -> Parser<'l, 'source> {
        Parser {
            lexer,
            terminator,
            programs,
        }
    }

    /// Parses the next statement, or returns `None` once the terminator
    /// token has been consumed. Newlines, comments and semicolons between
    /// statements are skipped.
    pub fn next(&mut self) -> ParserResult<Option<Node>> {
        loop {
            let token = self.lexer.next()?;

            return match token.token_type() {
                t if t == self.terminator => Ok(None),
                TokenType::Newline | TokenType::Comment | TokenType::Semicolon => continue,
                TokenType::Eof => Err(ParserError::UnexpectedToken {
                    found: token,
                    message: String::from("Expected 'END' to close block"),
                }),

                TokenType::Identifier => {
                    self.lexer.pushback(token);
                    self.parse_assignment().map(Some)
                },
                TokenType::Input => self.parse_input().map(Some),
                TokenType::Output => self.parse_print().map(Some),
                TokenType::Loop => self.parse_loop().map(Some),
                TokenType::Program => self.parse_definition().map(Some),

                _ => Err(ParserError::UnexpectedToken {
                    found: token,
                    message: String::from("Expected statement"),
                }),
            };
        }
    }

    // Statement parsing

    fn parse_assignment(&mut self) -> ParserResult<Node> {
        let variable = self.expect(TokenType::Identifier, "Expected variable name")?;
        self.expect(TokenType::Assign, "Expected ':=' after variable name")?;

        let token = self.lexer.next()?;

        match token.token_type() {
            TokenType::Number => Ok(Node::AssignNumber {
                variable: variable.source().to_owned(),
                value: token.int_value()?,
            }),
            TokenType::Identifier => self.parse_assignment_rest(variable, token),
            _ => Err(ParserError::UnexpectedToken {
                found: token,
                message: String::from("Expected number or name after ':='"),
            }),
        }
    }

    fn parse_assignment_rest(&mut self, variable: Token, rhs: Token) -> ParserResult<Node> {
        let token = self.lexer.next()?;

        match token.token_type() {
            TokenType::Plus => {
                let literal = self.expect(TokenType::Number, "Expected number after '+'")?;
                let value = literal.int_value()?;

                if value != 1 {
                    return Err(ParserError::InvalidIncrement { pos: *literal.start(), value });
                }

                Ok(Node::AssignPlus {
                    variable: variable.source().to_owned(),
                    source: rhs.source().to_owned(),
                })
            },
            TokenType::ParenthesisLeft => self.parse_call(variable, rhs),
            _ => Err(ParserError::UnexpectedToken {
                found: token,
                message: String::from("Expected '+' or '(' after name in assignment"),
            }),
        }
    }

    fn parse_call(&mut self, variable: Token, program: Token) -> ParserResult<Node> {
        let args: Vec<String> = self.parse_name_list()?.iter()
            .map(|arg| arg.source().to_owned()).collect();

        let programs = self.programs.borrow();

        let definition = programs.get(program.source()).ok_or_else(|| ParserError::UndefinedProgram {
            name: program.source().to_owned(),
            pos: *program.start(),
        })?;

        if definition.params().len() != args.len() {
            return Err(ParserError::WrongArgumentCount {
                program: program.source().to_owned(),
                expected: definition.params().len(),
                found: args.len(),
                pos: *program.start(),
            });
        }

        Ok(Node::AssignCall {
            variable: variable.source().to_owned(),
            program: program.source().to_owned(),
            args,
        })
    }

    fn parse_input(&mut self) -> ParserResult<Node> {
        let mut targets = Vec::new();

        loop {
            let token = self.lexer.next()?;

            if !INPUT_TARGET_TYPES.contains(&token.token_type()) {
                if targets.is_empty() {
                    return Err(ParserError::UnexpectedToken {
                        found: token,
                        message: String::from("Expected string or variable name after 'INPUT'"),
                    });
                }

                self.lexer.pushback(token);
                break;
            }

            targets.push(match token.token_type() {
                TokenType::String => InputTarget::Prompt(token.source().to_owned()),
                _ => InputTarget::Variable(token.source().to_owned()),
            });

            if !self.matches(TokenType::Comma)? {
                break;
            }
        }

        Ok(Node::Input { targets })
    }

    fn parse_print(&mut self) -> ParserResult<Node> {
        let mut items = Vec::new();

        loop {
            let token = self.lexer.next()?;

            if !PRINT_ITEM_TYPES.contains(&token.token_type()) {
                if items.is_empty() {
                    return Err(ParserError::UnexpectedToken {
                        found: token,
                        message: String::from("Expected string, number or variable name after 'OUTPUT'"),
                    });
                }

                self.lexer.pushback(token);
                break;
            }

            items.push(match token.token_type() {
                TokenType::String => PrintItem::String(token.source().to_owned()),
                TokenType::Number => PrintItem::Number(token.int_value()?),
                _ => PrintItem::Variable(token.source().to_owned()),
            });

            if !self.matches(TokenType::Comma)? {
                break;
            }
        }

        Ok(Node::Print { items })
    }

    fn parse_loop(&mut self) -> ParserResult<Node> {
        let variable = self.expect(TokenType::Identifier, "Expected count variable after 'LOOP'")?;
        self.matches(TokenType::Do)?; // `DO` is optional
        let body = self.parse_block()?;

        Ok(Node::Loop {
            variable: variable.source().to_owned(),
            body,
        })
    }

    fn parse_definition(&mut self) -> ParserResult<Node> {
        let name = self.expect(TokenType::Identifier, "Expected program name after 'PROGRAM'")?;
        self.expect(TokenType::ParenthesisLeft, "Expected '(' after program name")?;
        let params = self.parse_name_list()?;

        for (i, param) in params.iter().enumerate() {
            if params[..i].iter().any(|other| other.source() == param.source()) {
                return Err(ParserError::DuplicateParameter {
                    name: param.source().to_owned(),
                    pos: *param.start(),
                });
            }
        }

        self.expect(TokenType::Do, "Expected 'DO' after program parameters")?;
        let body = self.parse_block()?;

        let params: Vec<String> = params.iter().map(|param| param.source().to_owned()).collect();

        // The name only becomes callable here, after the body has parsed, so
        // a program can never call itself.
        if !self.programs.borrow_mut().define(name.source(), Program::new(params.clone(), body.clone())) {
            return Err(ParserError::DuplicateProgram {
                name: name.source().to_owned(),
                pos: *name.start(),
            });
        }

        Ok(Node::Definition {
            name: name.source().to_owned(),
            params,
            body,
        })
    }

    /// Parses the statements of a `LOOP` or `PROGRAM` body up to the
    /// matching `END`, through a sub-parser over the same lexer and registry.
    fn parse_block(&mut self) -> ParserResult<Vec<Node>> {
        let mut parser = Parser::new(&mut *self.lexer, TokenType::End, Rc::clone(&self.programs));
        let mut body = Vec::new();

        while let Some(node) = parser.next()? {
            body.push(node);
        }

        Ok(body)
    }

    /// `[ IDENT { "," IDENT } ] ")"` — the shared tail of call argument and
    /// parameter lists. The opening parenthesis has already been consumed.
    fn parse_name_list(&mut self) -> ParserResult<Vec<Token>> {
        let mut names = Vec::new();

        if !self.matches(TokenType::ParenthesisRight)? {
            names.push(self.expect(TokenType::Identifier, "Expected variable name after '('")?);

            while self.matches(TokenType::Comma)? {
                names.push(self.expect(TokenType::Identifier, "Expected variable name after ','")?);
            }

            self.expect(TokenType::ParenthesisRight, "Expected ')' after names")?;
        }

        Ok(names)
    }

    fn expect(&mut self, token_type: TokenType, message: &str) -> ParserResult<Token> {
        let token = self.lexer.next()?;

        if token.token_type() == token_type {
            Ok(token)
        } else {
            Err(ParserError::UnexpectedToken { found: token, message: message.to_owned() })
        }
    }

    fn matches(&mut self, token_type: TokenType) -> ParserResult<bool> { // Should be called "match", but that's a keyword
        let token = self.lexer.next()?;

        if token.token_type() == token_type {
            Ok(true)
        } else {
            self.lexer.pushback(token);
            Ok(false)
        }
    }
}
