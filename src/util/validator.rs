use error_stack::Report;
use thiserror::Error;
use validator::ValidateError;

#[derive(Debug, Error)]
#[error("Invalid given data occurred")]
pub struct Wrapper;

/// Flattens a [`ValidateError`] tree into printable attachments,
/// one per `field.path: message` pair.
pub trait IntoValidatorReport<T> {
    fn into_validator_report(self) -> error_stack::Result<T, Wrapper>;
}

impl<T> IntoValidatorReport<T> for Result<T, ValidateError> {
    fn into_validator_report(self) -> error_stack::Result<T, Wrapper> {
        self.map_err(|v| {
            fn read_errors(
                err: &ValidateError,
                fields_queue: &mut Vec<String>,
                mut report: Report<Wrapper>,
            ) -> Report<Wrapper> {
                match err {
                    ValidateError::Fields(fields) => {
                        for (field, data) in fields {
                            fields_queue.push(field.to_string());
                            report = read_errors(data, fields_queue, report);
                            fields_queue.pop();
                        }
                        report
                    }
                    ValidateError::Messages(messages) => {
                        let field_str = fields_queue.join(".");
                        for message in messages {
                            report = report.attach_printable(format!("{field_str}: {message}"));
                        }
                        report
                    }
                }
            }

            let mut queue = Vec::new();
            read_errors(&v, &mut queue, Report::new(Wrapper))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_every_message() {
        let mut error = ValidateError::field("portal", "Invalid portal url");
        error.merge(ValidateError::field("portal", "Invalid sender address"));

        let report = Err::<(), _>(error).into_validator_report().unwrap_err();
        let attachments = report
            .frames()
            .filter_map(|frame| frame.downcast_ref::<String>())
            .cloned()
            .collect::<Vec<_>>();

        assert!(attachments.contains(&"portal: Invalid portal url".to_string()));
        assert!(attachments.contains(&"portal: Invalid sender address".to_string()));
    }
}
