/// How a reported line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Success,
    /// Nothing to do, state already matched.
    Skipped,
    Failure,
    Summary,
}

/// Receives one human readable line per discrete outcome.
pub trait ReportSink {
    fn emit(&mut self, status: LineStatus, line: &str);
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub lines: Vec<(LineStatus, String)>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|(_, line)| line.as_str()).collect()
    }
}

impl ReportSink for VecSink {
    fn emit(&mut self, status: LineStatus, line: &str) {
        self.lines.push((status, line.to_string()));
    }
}
