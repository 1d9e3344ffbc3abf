use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;
use super::*;
use crate::interpreter::environment::Programs;
use crate::interpreter::lexer::{Lexer, TokenType};
use crate::interpreter::parser::Parser;

fn run_result(source: &str, input: &str) -> (Result<(), RuntimeError>, Context, String) {
    let programs = Rc::new(RefCell::new(Programs::new()));
    let mut lexer = Lexer::new(source);
    let mut parser = Parser::new(&mut lexer, TokenType::Eof, Rc::clone(&programs));
    let mut nodes = Vec::new();

    while let Some(node) = parser.next().unwrap() {
        nodes.push(node);
    }

    let mut input = Cursor::new(input.as_bytes().to_vec());
    let mut output = Vec::new();
    let mut context = Context::new(programs);

    let result = Interpreter::new(&mut input, &mut output).interpret(&nodes, &mut context);

    (result, context, String::from_utf8(output).unwrap())
}

fn run(source: &str) -> (Context, String) {
    let (result, context, output) = run_result(source, "");
    result.unwrap();

    (context, output)
}

fn run_with_input(source: &str, input: &str) -> (Context, String) {
    let (result, context, output) = run_result(source, input);
    result.unwrap();

    (context, output)
}

fn run_err(source: &str, input: &str) -> RuntimeError {
    run_result(source, input).0.unwrap_err()
}

mod statements {
    use super::*;

    #[test]
    fn output_follows_statement_order() {
        let (_, output) = run("x := 1\nOUTPUT x\ny := 2\nOUTPUT y");

        assert_eq!("1\n2\n", output);
    }

    #[test]
    fn assignment_overwrites() {
        let (context, _) = run("x := 1\nx := 2");

        assert_eq!(2, context.get_variable("x").unwrap());
    }

    #[test]
    fn increment() {
        let (_, output) = run("a := 5\nb := a + 1\nOUTPUT b");

        assert_eq!("6\n", output);
    }

    #[test]
    fn increment_of_undefined_variable_fails() {
        assert!(matches!(run_err("x := q + 1", ""),
            RuntimeError::UndefinedVariable(name) if name == "q"));
    }

    #[test]
    fn variable_names_are_case_sensitive() {
        let (context, _) = run("x := 1\nX := 2");

        assert_eq!(1, context.get_variable("x").unwrap());
        assert_eq!(2, context.get_variable("X").unwrap());
    }

    #[test]
    fn failure_aborts_the_rest_of_the_run() {
        let (result, _, output) = run_result("OUTPUT 1\nx := q + 1\nOUTPUT 2", "");

        assert!(result.is_err());
        assert_eq!("1\n", output);
    }
}

mod loops {
    use super::*;

    #[test]
    fn body_runs_count_times() {
        let (_, output) = run("x := 3; LOOP x DO OUTPUT \"hi\" END");

        assert_eq!("hi\nhi\nhi\n", output);
    }

    #[test]
    fn zero_count_skips_the_body() {
        let (context, output) = run("x := 0\ny := 5\nLOOP x DO y := y + 1\nOUTPUT \"never\" END\nOUTPUT y");

        assert_eq!("5\n", output);
        assert_eq!(5, context.get_variable("y").unwrap());
    }

    #[test]
    fn trip_count_is_captured_at_entry() {
        let (context, _) = run("x := 3\nLOOP x DO x := x + 1 END");

        assert_eq!(6, context.get_variable("x").unwrap());
    }

    #[test]
    fn undefined_count_variable_fails() {
        assert!(matches!(run_err("LOOP q DO x := 1 END", ""),
            RuntimeError::UndefinedVariable(name) if name == "q"));
    }
}

mod calls {
    use super::*;

    #[test]
    fn arguments_are_passed_by_value() {
        let (context, _) = run("PROGRAM ADD1(X1) DO\n  X0 := X1 + 1\nEND\na := 2\nr := ADD1(a)\na := 9");

        assert_eq!(3, context.get_variable("r").unwrap());
        assert_eq!(9, context.get_variable("a").unwrap());
    }

    #[test]
    fn result_defaults_to_zero() {
        let (context, _) = run("PROGRAM NOP() DO END\nr := NOP()");

        assert_eq!(0, context.get_variable("r").unwrap());
    }

    #[test]
    fn callee_variables_do_not_leak() {
        let (context, _) = run("PROGRAM F(X1) DO\n  y := 7\n  X0 := X1 + 1\nEND\ny := 1\nr := F(y)");

        assert_eq!(1, context.get_variable("y").unwrap());
        assert_eq!(2, context.get_variable("r").unwrap());
    }

    #[test]
    fn caller_variables_are_not_visible_in_the_callee() {
        // `secret` is bound in the caller only; the callee prints the
        // placeholder for it.
        let (_, output) = run("PROGRAM F() DO\n  OUTPUT secret\nEND\nsecret := 42\nr := F()");

        assert_eq!("undefined\n", output);
    }

    #[test]
    fn undefined_actual_argument_fails() {
        assert!(matches!(run_err("PROGRAM F(X1) DO END\nr := F(q)", ""),
            RuntimeError::UndefinedVariable(name) if name == "q"));
    }

    #[test]
    fn later_program_calls_earlier_one() {
        let (context, _) = run(
            "PROGRAM ADD1(X1) DO\n  X0 := X1 + 1\nEND\n\
             PROGRAM ADD2(X1) DO\n  X0 := ADD1(X1)\n  X0 := ADD1(X0)\nEND\n\
             a := 1\nr := ADD2(a)");

        assert_eq!(3, context.get_variable("r").unwrap());
    }

    #[test]
    fn definition_in_a_loop_body_is_interpreted_as_a_no_op() {
        let (context, _) = run("n := 2\nLOOP n DO\n  PROGRAM H() DO\n    X0 := 5\n  END\nEND\nr := H()");

        assert_eq!(5, context.get_variable("r").unwrap());
    }
}

mod input {
    use super::*;

    #[test]
    fn reads_one_line_per_variable() {
        let (context, _) = run_with_input("INPUT a, b", "3\n4\n");

        assert_eq!(3, context.get_variable("a").unwrap());
        assert_eq!(4, context.get_variable("b").unwrap());
    }

    #[test]
    fn prompts_are_written_without_a_newline() {
        let (_, output) = run_with_input("INPUT \"a? \", a, \"b? \", b\nOUTPUT a, b", "3\n4\n");

        assert_eq!("a? b? 3 4\n", output);
    }

    #[test]
    fn malformed_input_fails() {
        assert!(matches!(run_err("INPUT a", "abc\n"), RuntimeError::InvalidInput(_)));
    }

    #[test]
    fn negative_input_fails() {
        assert!(matches!(run_err("INPUT a", "-1\n"), RuntimeError::InvalidInput(_)));
    }

    #[test]
    fn end_of_input_fails() {
        assert!(matches!(run_err("INPUT a", ""), RuntimeError::InvalidInput(_)));
    }
}

mod print {
    use super::*;

    #[test]
    fn number_items_are_space_separated() {
        let (_, output) = run("OUTPUT 1, 2");

        assert_eq!("1 2\n", output);
    }

    #[test]
    fn number_literal_renders_digits_only() {
        let (_, output) = run("OUTPUT 5");

        assert_eq!("5\n", output);
    }

    #[test]
    fn string_items_abut_their_neighbors() {
        let (_, output) = run("x := 1\nOUTPUT \"x=\", x, 2, \"!\", 3");

        assert_eq!("x=1 2!3\n", output);
    }

    #[test]
    fn undefined_variable_renders_a_placeholder() {
        let (_, output) = run("OUTPUT v");

        assert_eq!("undefined\n", output);
    }
}
