//! Command-line argument parsing for the case tutor binary.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// List wards and their conditions
    Wards,
    /// Show the learner's progress summary
    Progress,
    /// Play a case for a condition
    Play {
        condition: String,
        focus: Option<String>,
    },
}

pub const USAGE: &str = "\
usage: case-tutor [--focus <focus>] <condition...>
       case-tutor wards
       case-tutor progress
       case-tutor --version | --help";

/// Parse command-line arguments (typically `std::env::args()`).
///
/// Remaining words form the condition, so `case-tutor Heart Failure` needs
/// no quoting. With no condition the usage is shown.
///
/// ```
/// use case_tutor::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["case-tutor".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut focus = None;
    let mut words: Vec<String> = Vec::new();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--focus" | "-f" => match args.next() {
                Some(value) => focus = Some(value),
                None => return CliCommand::Help,
            },
            _ => words.push(arg),
        }
    }

    match words.as_slice() {
        [] => CliCommand::Help,
        [only] if only == "wards" => CliCommand::Wards,
        [only] if only == "progress" => CliCommand::Progress,
        _ => CliCommand::Play {
            condition: words.join(" "),
            focus,
        },
    }
}
