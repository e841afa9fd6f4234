use crate::domain::errors::{CliError, Warning};
use colored::Colorize;

/// Prefix of every diagnostic line
pub const PROGRAM: &str = "http CLI";

pub fn warning_line(warning: &Warning) -> String {
    format!("{}: warning: {}", PROGRAM, warning)
}

pub fn error_line(error: &CliError) -> String {
    format!("{}: error: {}", PROGRAM, error)
}

pub fn print_warning(warning: &Warning) {
    eprintln!("{}", warning_line(warning).yellow());
}

pub fn print_warnings<'a>(warnings: impl IntoIterator<Item = &'a Warning>) {
    for warning in warnings {
        print_warning(warning);
    }
}

pub fn print_error(error: &CliError) {
    eprintln!("{}", error_line(error).red());
}
