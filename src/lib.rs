pub mod util;
pub mod interpreter;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use clap::Parser as ClapParser;
use crate::interpreter::environment::{Context, Programs};
use crate::interpreter::interpreter::Interpreter;
use crate::interpreter::lexer::{Lexer, TokenType};
use crate::interpreter::parser::Parser;

#[derive(ClapParser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    #[clap(default_value = "main.loop", help = "Main input file")]
    pub input: PathBuf,

    #[clap(long, help = "Pretty-print the parsed program instead of running it")]
    pub print_ast: bool,
    #[clap(short, long, help = "Print verbose log output")]
    pub verbose: bool,
}

pub fn run() -> Result<(), std::io::Error> {
    let config: Config = Config::parse();

    let source = std::fs::read_to_string(config.input)?;

    let programs = Rc::new(RefCell::new(Programs::new()));
    let mut lexer = Lexer::new(&source);
    let mut parser = Parser::new(&mut lexer, TokenType::Eof, Rc::clone(&programs));

    let mut nodes = Vec::new();

    loop {
        match parser.next() {
            Ok(Some(node)) => nodes.push(node),
            Ok(None) => break,
            Err(err) => {
                eprintln!("{}", err);
                return Err(std::io::Error::from(std::io::ErrorKind::InvalidData));
            },
        }
    }

    if config.print_ast {
        println!("{}", nodes.iter().map(|node| node.to_string()).collect::<Vec<String>>().join("\n"));
        return Ok(());
    }

    if config.verbose {
        eprintln!("{}", nodes.iter().map(|node| node.to_string()).collect::<Vec<String>>().join("\n"));
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let stdout = std::io::stdout();
    let mut output = stdout.lock();

    let mut interpreter = Interpreter::new(&mut input, &mut output);
    let mut context = Context::new(programs);

    if let Err(err) = interpreter.interpret(&nodes, &mut context) {
        eprintln!("{}", err);
        return Err(std::io::Error::from(std::io::ErrorKind::InvalidData));
    }

    Ok(())
}
