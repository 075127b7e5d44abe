//! JSON envelope printed on stdout at the end of a run.

use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use torchdock::error::Hint;
use torchdock::{Error, Result};

#[derive(Serialize)]
struct Envelope<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody<'a>>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: &'a str,
    details: &'a Value,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    hints: &'a [Hint],
}

impl<'a> Envelope<'a> {
    fn new(result: &'a Result<Value>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(err) => Self {
                success: false,
                data: None,
                error: Some(ErrorBody {
                    code: err.code.as_str(),
                    message: &err.message,
                    details: &err.details,
                    hints: &err.hints,
                }),
            },
        }
    }
}

fn render(result: &Result<Value>) -> Result<String> {
    serde_json::to_string_pretty(&Envelope::new(result))
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize response".to_string())))
}

/// Serialize a command's data and pick the exit code for the run.
pub fn map_cmd_result_to_json<T: Serialize>(result: Result<(T, i32)>) -> (Result<Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(e) => (
                Err(Error::internal_json(e.to_string(), Some("serialize response".to_string()))),
                1,
            ),
        },
        Err(err) => {
            let exit_code = err.code.exit_code();
            (Err(err), exit_code)
        }
    }
}

pub fn print_json_result(result: Result<Value>) -> Result<()> {
    let payload = render(&result)?;
    match writeln!(io::stdout().lock(), "{}", payload) {
        // Reader went away (`| head`): nothing left to report to.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(Error::internal_io(e.to_string(), Some("write stdout".to_string()))),
        Ok(()) => Ok(()),
    }
}
