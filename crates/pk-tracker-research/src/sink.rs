//! Research sinks: where outbound requests are delivered.

use std::cell::RefCell;
use std::process::Command;

use crate::{ResearchError, ResearchRequest, ResearchResult};

/// Destination for research requests.
///
/// Delivery is fire-and-forget; results come back later as a curated
/// update.
pub trait ResearchSink {
    fn request_research(&self, request: &ResearchRequest) -> ResearchResult<()>;
}

impl<T: ResearchSink + ?Sized> ResearchSink for Box<T> {
    fn request_research(&self, request: &ResearchRequest) -> ResearchResult<()> {
        (**self).request_research(request)
    }
}

impl<T: ResearchSink + ?Sized> ResearchSink for &T {
    fn request_research(&self, request: &ResearchRequest) -> ResearchResult<()> {
        (**self).request_research(request)
    }
}

/// Runs an external program as `<program> <args…> <topic> <requirement…>`.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
}

impl CommandSink {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full argv; `None` when it is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ResearchSink for CommandSink {
    fn request_research(&self, request: &ResearchRequest) -> ResearchResult<()> {
        tracing::debug!(program = %self.program, request_id = %request.request_id, "running research command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&request.topic)
            .args(&request.requirements)
            .output()
            .map_err(|e| ResearchError::SinkUnavailable(format!("{}: {}", self.program, e)))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("{} exited with {}", self.program, output.status)
        } else {
            stderr
        };
        Err(ResearchError::SinkUnavailable(message))
    }
}

/// In-memory sink that keeps every request it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    requests: RefCell<Vec<ResearchRequest>>,
    failure: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every request with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            requests: RefCell::default(),
            failure: Some(message.into()),
        }
    }

    pub fn requests(&self) -> Vec<ResearchRequest> {
        self.requests.borrow().clone()
    }
}

impl ResearchSink for RecordingSink {
    fn request_research(&self, request: &ResearchRequest) -> ResearchResult<()> {
        if let Some(message) = &self.failure {
            return Err(ResearchError::SinkUnavailable(message.clone()));
        }
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request() -> ResearchRequest {
        ResearchRequest::new("Pharmacokinetic data for Cisplatin", vec!["Find Tmax".into()])
    }

    #[test]
    fn test_recording_sink_keeps_requests() {
        let sink = RecordingSink::new();
        let request = make_request();
        sink.request_research(&request).unwrap();

        assert_eq!(sink.requests(), vec![request]);
    }

    #[test]
    fn test_failing_sink() {
        let sink = RecordingSink::failing("bridge offline");
        let err = sink.request_research(&make_request()).unwrap_err();

        assert!(matches!(err, ResearchError::SinkUnavailable(ref m) if m == "bridge offline"));
        assert!(sink.requests().is_empty());
    }

    #[test]
    fn test_boxed_sink_delegates() {
        let sink: Box<dyn ResearchSink> = Box::new(RecordingSink::new());
        assert!(sink.request_research(&make_request()).is_ok());
    }

    #[test]
    fn test_from_argv() {
        assert!(CommandSink::from_argv(&[]).is_none());
        let sink = CommandSink::from_argv(&["notify".to_string(), "--new-chat".to_string()]).unwrap();
        assert_eq!(sink.program(), "notify");
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let sink = CommandSink::new("pk-tracker-no-such-program", Vec::new());
        let err = sink.request_research(&make_request()).unwrap_err();
        assert!(matches!(err, ResearchError::SinkUnavailable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exit_status() {
        assert!(CommandSink::new("true", Vec::new())
            .request_research(&make_request())
            .is_ok());

        let err = CommandSink::new("false", Vec::new())
            .request_research(&make_request())
            .unwrap_err();
        assert!(matches!(err, ResearchError::SinkUnavailable(_)));
    }
}
