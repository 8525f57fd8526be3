use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use infix_calc::{CalcError, Calculation, Lexer};
use miette::IntoDiagnostic;
use miette::WrapErr;
use miette::miette;

#[derive(Parser, Debug)]
#[command(version, about = "Evaluates infix arithmetic by way of postfix notation")]
struct Args {
    /// Print the result with this many decimal places.
    #[arg(short, long, global = true)]
    precision: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prompt for an expression until one is accepted (the default).
    Repl,
    /// Print the postfix form and the result of an expression.
    Eval(Input),
    /// Print only the postfix form of an expression.
    Postfix(Input),
    /// Print the tokens of an expression, one per line.
    Tokenize(Input),
}

#[derive(Debug, clap::Args)]
struct Input {
    /// Read the expression from a file instead.
    #[arg(short, long, conflicts_with = "expression")]
    file: Option<PathBuf>,

    expression: Option<String>,
}

impl Input {
    fn read(self) -> miette::Result<String> {
        match (self.file, self.expression) {
            (Some(filename), _) => {
                let file_contents = fs::read_to_string(&filename)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("reading `{}` failed", filename.display()))?;
                Ok(file_contents.trim_end_matches(['\n', '\r']).to_string())
            }
            (None, Some(expression)) => Ok(expression),
            (None, None) => Err(miette!("no expression given, pass one or use `--file`")),
        }
    }
}

fn main() -> miette::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Repl) {
        Commands::Repl => repl(args.precision)?,
        Commands::Eval(input) => {
            let expression = input.read()?;
            match infix_calc::calculate(&expression) {
                Ok(calculation) => print_calculation(&calculation, args.precision),
                Err(e) => fail(e),
            }
        }
        Commands::Postfix(input) => {
            let expression = input.read()?;
            if let Err(e) = infix_calc::validate_characters(&expression) {
                fail(e.into());
            }
            if let Err(e) = infix_calc::check_syntax(&expression) {
                fail(e.into());
            }
            println!("{}", infix_calc::convert(&expression));
        }
        Commands::Tokenize(input) => {
            let expression = input.read()?;
            for token in Lexer::new(&expression) {
                match token {
                    Ok(token) => println!("{token}"),
                    Err(e) => fail(e.into()),
                }
            }
        }
    }
    Ok(())
}

fn repl(precision: Option<usize>) -> miette::Result<()> {
    let stdin = io::stdin();
    loop {
        println!("Please type the expression in Infix Notation:");
        io::stdout().flush().into_diagnostic()?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .into_diagnostic()
            .wrap_err("reading from stdin failed")?;
        if read == 0 {
            return Ok(());
        }

        match infix_calc::calculate(line.trim_end_matches(['\n', '\r'])) {
            Ok(calculation) => {
                print_calculation(&calculation, precision);
                return Ok(());
            }
            Err(CalcError::Lex(e)) => {
                // transcript line on stdout, full report on stderr
                println!("{e}");
                eprintln!("{:?}", miette::Report::new(e));
            }
            Err(e) => fail(e),
        }
    }
}

fn fail(error: CalcError) -> ! {
    let code = match error {
        CalcError::Lex(_) => 65,
        CalcError::Syntax(_) | CalcError::Eval(_) => 1,
    };
    eprintln!("{:?}", miette::Report::new(error));
    std::process::exit(code);
}

fn print_calculation(calculation: &Calculation<'_>, precision: Option<usize>) {
    println!("The Postfix notation:");
    println!("{}", calculation.postfix);
    println!("The Result:");
    println!("{}", format_value(calculation.value, precision));
}

/// Formats like a C++ stream does by default (six significant digits, `%g`
/// style) unless a fixed number of decimal places is asked for.
fn format_value(value: f64, precision: Option<usize>) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if let Some(places) = precision {
        return format!("{value:.places$}");
    }
    if value == 0.0 {
        return format!("{value}");
    }

    let scientific = format!("{value:.5e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exponent.abs())
    } else {
        let places = (5 - exponent) as usize;
        trim_zeros(&format!("{value:.places$}")).to_string()
    }
}

fn trim_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn fmt(value: f64) -> String {
        format_value(value, None)
    }

    #[test]
    fn whole_numbers_drop_the_fraction() {
        assert_eq!(fmt(20.0), "20".to_string());
        assert_eq!(fmt(-3.0), "-3".to_string());
        assert_eq!(fmt(0.0), "0".to_string());
    }

    #[test]
    fn six_significant_digits() {
        assert_eq!(fmt(0.75), "0.75".to_string());
        assert_eq!(fmt(1.0 / 3.0), "0.333333".to_string());
        assert_eq!(fmt(123456.7), "123457".to_string());
        assert_eq!(fmt(0.0001), "0.0001".to_string());
    }

    #[test]
    fn large_and_small_values_switch_to_exponents() {
        assert_eq!(fmt(1234567.0), "1.23457e+06".to_string());
        assert_eq!(fmt(999999.5), "1e+06".to_string());
        assert_eq!(fmt(0.00001), "1e-05".to_string());
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(fmt(f64::INFINITY), "inf".to_string());
        assert_eq!(fmt(f64::NEG_INFINITY), "-inf".to_string());
        assert_eq!(fmt(f64::NAN), "nan".to_string());
    }

    #[test]
    fn non_finite_values_ignore_precision() {
        assert_eq!(format_value(f64::NAN, Some(2)), "nan".to_string());
        assert_eq!(format_value(f64::INFINITY, Some(3)), "inf".to_string());
        assert_eq!(format_value(f64::NEG_INFINITY, Some(0)), "-inf".to_string());
    }

    #[test]
    fn fixed_precision() {
        assert_eq!(format_value(2.0 / 3.0, Some(2)), "0.67".to_string());
        assert_eq!(format_value(9.0, Some(0)), "9".to_string());
    }
}
