use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use similar_asserts::assert_eq;

const PROMPT: &str = "Please type the expression in Infix Notation:\n";

struct TestPlan {
    args: Vec<String>,
    stdin_data: String,
    expected_out: String,
    /// Text the diagnostic on stderr must contain. Empty means stderr is not checked.
    expected_err_contains: String,
    expected_exit_code: i32,
}

fn run_calc(args: &[String], stdin_data: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_infix_calc"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn infix_calc");

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(stdin_data)
            .expect("failed to write to stdin");
    }

    child.wait_with_output().expect("failed to wait for infix_calc")
}

fn run_test(plan: TestPlan) {
    let output = run_calc(&plan.args, plan.stdin_data.as_bytes());

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    assert_eq!(stdout, plan.expected_out);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(&plan.expected_err_contains),
        "stderr did not contain {:?}:\n{stderr}",
        plan.expected_err_contains
    );

    assert_eq!(output.status.code(), Some(plan.expected_exit_code));
}

fn args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| String::from(*s)).collect()
}

fn calculation_out(postfix: &str, result: &str) -> String {
    format!("The Postfix notation:\n{postfix}\nThe Result:\n{result}\n")
}

fn expression_file(name: &str, contents: &str) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::write(&path, contents).expect("failed to write expression file");
    path
}

#[test]
fn repl_prompts_again_after_invalid_characters() {
    run_test(TestPlan {
        args: vec![],
        stdin_data: String::from("2a+3\n1+2*3\n"),
        expected_out: format!(
            "{PROMPT}Invalid input: Please use numbers and valid operators only.\n{PROMPT}{}",
            calculation_out("1 2 + 3 *", "9")
        ),
        expected_err_contains: String::from("this character"),
        expected_exit_code: 0,
    });
}

#[test]
fn repl_subcommand_is_the_default() {
    run_test(TestPlan {
        args: args(&["repl"]),
        stdin_data: String::from("(1+2)*3\n"),
        expected_out: format!("{PROMPT}{}", calculation_out("1 2 + 3 *", "9")),
        expected_err_contains: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn repl_exits_on_syntax_errors() {
    run_test(TestPlan {
        args: vec![],
        stdin_data: String::from("(1+2\n1+1\n"),
        expected_out: String::from(PROMPT),
        expected_err_contains: String::from("Syntax Error: Unmatched opening parenthesis."),
        expected_exit_code: 1,
    });
}

#[test]
fn repl_exits_quietly_at_end_of_input() {
    run_test(TestPlan {
        args: vec![],
        stdin_data: String::new(),
        expected_out: String::from(PROMPT),
        expected_err_contains: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn eval_prints_postfix_and_result() {
    run_test(TestPlan {
        args: args(&["eval", "2+3*4"]),
        stdin_data: String::new(),
        expected_out: calculation_out("2 3 + 4 *", "20"),
        expected_err_contains: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn eval_invalid_character_exits_65() {
    run_test(TestPlan {
        args: args(&["eval", "2a"]),
        stdin_data: String::new(),
        expected_out: String::new(),
        expected_err_contains: String::from(
            "Invalid input: Please use numbers and valid operators only.",
        ),
        expected_exit_code: 65,
    });
}

#[test]
fn eval_other_errors_exit_1() {
    run_test(TestPlan {
        args: args(&["eval", "5/0"]),
        stdin_data: String::new(),
        expected_out: String::new(),
        expected_err_contains: String::from("Error: Cannot divide by zero."),
        expected_exit_code: 1,
    });
    run_test(TestPlan {
        args: args(&["eval", "1 2"]),
        stdin_data: String::new(),
        expected_out: String::new(),
        expected_err_contains: String::from("found 2"),
        expected_exit_code: 1,
    });
}

#[test]
fn eval_reads_expression_files() {
    let unix = expression_file("unix.expr", "(1+2)*3\n");
    run_test(TestPlan {
        args: args(&["eval", "--file", &unix.to_string_lossy()]),
        stdin_data: String::new(),
        expected_out: calculation_out("1 2 + 3 *", "9"),
        expected_err_contains: String::new(),
        expected_exit_code: 0,
    });

    let dos = expression_file("dos.expr", "10/4\r\n");
    run_test(TestPlan {
        args: args(&["eval", "-f", &dos.to_string_lossy()]),
        stdin_data: String::new(),
        expected_out: calculation_out("10 4 /", "2.5"),
        expected_err_contains: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn missing_expression_file_is_reported() {
    let output = run_calc(&args(&["eval", "--file", "no/such/file.expr"]), b"");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("reading `no/such/file.expr` failed"));
}

#[test]
fn precision_applies_to_finite_results_only() {
    run_test(TestPlan {
        args: args(&["--precision", "2", "eval", "2/3"]),
        stdin_data: String::new(),
        expected_out: calculation_out("2 3 /", "0.67"),
        expected_err_contains: String::new(),
        expected_exit_code: 0,
    });
    run_test(TestPlan {
        args: args(&["-p", "2", "eval", "0/(1-1)"]),
        stdin_data: String::new(),
        expected_out: calculation_out("0 1 1 - /", "nan"),
        expected_err_contains: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn postfix_prints_only_the_sequence() {
    run_test(TestPlan {
        args: args(&["postfix", "2 * (3 + 4)"]),
        stdin_data: String::new(),
        expected_out: String::from("2 3 4 + *\n"),
        expected_err_contains: String::new(),
        expected_exit_code: 0,
    });
    run_test(TestPlan {
        args: args(&["postfix", "+5"]),
        stdin_data: String::new(),
        expected_out: String::new(),
        expected_err_contains: String::from("Operator without required operands."),
        expected_exit_code: 1,
    });
}

#[test]
fn tokenize_stops_at_invalid_characters() {
    run_test(TestPlan {
        args: args(&["tokenize", "(1.5+x"]),
        stdin_data: String::new(),
        expected_out: String::from("LEFT_PAREN (\nNUMBER 1.5\nPLUS +\n"),
        expected_err_contains: String::from("this character"),
        expected_exit_code: 65,
    });
}
