//! Incremental extraction of diagram text from a chunked stream.
//!
//! [`StreamParser`] is a plain state machine: every call to
//! [`StreamParser::append`] or [`StreamParser::finish`] returns the events
//! produced by that transition and performs no I/O. [`StreamSession`] wraps
//! it for callers that prefer callbacks.
//!
//! ```text
//!              start fence / keyword            end fence / finish()
//!  Scanning ─────────────────────────▶ InCode ─────────────────────▶ Finished
//!     │                                                                 ▲
//!     └──────────────────────────── finish() ───────────────────────────┘
//! ```

use log::{debug, trace};

use crate::{
    fence::{DIAGRAM_FENCE, FENCE},
    keywords::first_keyword_span,
};

/// Number of characters kept while scanning for a start signal.
pub const SCAN_WINDOW: usize = 2048;

/// Current phase of a [`StreamParser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamState {
    /// Looking for a start fence or a diagram keyword.
    #[default]
    Scanning,
    /// Accumulating diagram text until the end fence.
    InCode,
    /// Terminated; further input is ignored.
    Finished,
}

/// Output of a single state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Everything accumulated so far, untrimmed.
    Partial(String),
    /// The final diagram text, trimmed. Emitted exactly once.
    Done(String),
}

/// Streaming diagram extractor.
///
/// # Examples
///
/// ```
/// use flowgraph_parser::{StreamEvent, StreamParser};
///
/// let mut parser = StreamParser::new();
/// parser.append("Sure:\n```mermaid\ngraph TD\n");
/// let events = parser.append("A-->B\n```\n");
/// assert_eq!(
///     events.last(),
///     Some(&StreamEvent::Done("graph TD\nA-->B".to_string()))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamParser {
    state: StreamState,
    buffer: String,
    accumulated: String,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == StreamState::Finished
    }

    /// Diagram text accumulated so far.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Unprocessed input. After termination this holds whatever followed
    /// the end fence.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Feed the next chunk. Chunk boundaries may fall anywhere, including
    /// inside a fence marker or a keyword.
    pub fn append(&mut self, chunk: &str) -> Vec<StreamEvent> {
        if self.is_finished() {
            return Vec::new();
        }

        self.buffer.push_str(chunk);
        let mut events = Vec::new();

        loop {
            let progressed = match self.state {
                StreamState::Scanning => self.scan(),
                StreamState::InCode => self.consume_code(&mut events),
                StreamState::Finished => false,
            };
            if !progressed {
                break;
            }
        }

        events
    }

    /// Terminate the stream without an end fence.
    ///
    /// When no start signal was seen yet, one last keyword search runs over
    /// the remaining buffer with end-of-input accepted as a word boundary.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        match self.state {
            StreamState::Finished => return Vec::new(),
            StreamState::Scanning => {
                if let Some(span) = first_keyword_span(&self.buffer) {
                    self.accumulated = self.buffer.split_off(span.start);
                    self.buffer.clear();
                }
            }
            StreamState::InCode => {
                let rest = std::mem::take(&mut self.buffer);
                self.push_code(&rest);
            }
        }

        self.state = StreamState::Finished;
        let done = self.accumulated.trim().to_string();
        debug!(len = done.len(); "Stream finished without end fence");
        vec![StreamEvent::Done(done)]
    }

    /// One scanning step. Returns true if the parser entered the code region.
    fn scan(&mut self) -> bool {
        if let Some(pos) = self.buffer.find(DIAGRAM_FENCE) {
            let mut start = pos + DIAGRAM_FENCE.len();
            if self.buffer[start..].starts_with("\r\n") {
                start += 2;
            } else if self.buffer[start..].starts_with('\n') {
                start += 1;
            }
            self.buffer.drain(..start);
            self.state = StreamState::InCode;
            debug!("Stream entered code region at start fence");
            return true;
        }

        // Until something other than blanks follows a keyword, it may still
        // be the prefix of a longer word or a node id followed by an edge;
        // wait for the next chunk to decide.
        let keyword = first_keyword_span(&self.buffer).filter(|span| {
            self.buffer[span.end..].contains(|c: char| !matches!(c, ' ' | '\t'))
        });
        if let Some(span) = keyword {
            self.buffer.drain(..span.start);
            self.state = StreamState::InCode;
            debug!("Stream entered code region at diagram keyword");
            return true;
        }

        self.trim_window();
        false
    }

    /// One code-region step. Returns true if the state changed.
    fn consume_code(&mut self, events: &mut Vec<StreamEvent>) -> bool {
        if let Some(pos) = self.buffer.find(FENCE) {
            let trailing = self.buffer.split_off(pos + FENCE.len());
            self.buffer.truncate(pos);
            let code = std::mem::replace(&mut self.buffer, trailing);
            self.push_code(&code);

            self.state = StreamState::Finished;
            let done = self.accumulated.trim().to_string();
            debug!(len = done.len(); "Stream reached end fence");
            events.push(StreamEvent::Done(done));
            return true;
        }

        // Hold back backticks that might open the end fence in the next chunk.
        let held = self
            .buffer
            .bytes()
            .rev()
            .take(FENCE.len() - 1)
            .take_while(|&b| b == b'`')
            .count();
        let split = self.buffer.len() - held;
        let held_back = self.buffer.split_off(split);
        let code = std::mem::replace(&mut self.buffer, held_back);

        if self.push_code(&code) {
            trace!(len = self.accumulated.len(); "Stream partial update");
            events.push(StreamEvent::Partial(self.accumulated.clone()));
        }
        false
    }

    /// Append code text, dropping line breaks that would lead the diagram.
    fn push_code(&mut self, code: &str) -> bool {
        let code = if self.accumulated.is_empty() {
            code.trim_start_matches(['\r', '\n'])
        } else {
            code
        };
        if code.is_empty() {
            return false;
        }
        self.accumulated.push_str(code);
        true
    }

    /// Keep only the last [`SCAN_WINDOW`] characters of the scan buffer.
    fn trim_window(&mut self) {
        let excess = self.buffer.chars().count().saturating_sub(SCAN_WINDOW);
        if excess == 0 {
            return;
        }
        if let Some((cut, _)) = self.buffer.char_indices().nth(excess) {
            self.buffer.drain(..cut);
            trace!(dropped = excess; "Stream scan window trimmed");
        }
    }
}

/// Callback adapter around [`StreamParser`].
pub struct StreamSession<P, D>
where
    P: FnMut(&str),
    D: FnMut(&str),
{
    parser: StreamParser,
    on_partial: P,
    on_done: D,
}

impl<P, D> StreamSession<P, D>
where
    P: FnMut(&str),
    D: FnMut(&str),
{
    pub fn append(&mut self, chunk: &str) {
        let events = self.parser.append(chunk);
        self.dispatch(events);
    }

    pub fn finish(&mut self) {
        let events = self.parser.finish();
        self.dispatch(events);
    }

    pub fn is_finished(&self) -> bool {
        self.parser.is_finished()
    }

    pub fn parser(&self) -> &StreamParser {
        &self.parser
    }

    fn dispatch(&mut self, events: Vec<StreamEvent>) {
        for event in events {
            match event {
                StreamEvent::Partial(text) => (self.on_partial)(&text),
                StreamEvent::Done(text) => (self.on_done)(&text),
            }
        }
    }
}

/// Create a streaming session that reports progress through callbacks.
///
/// `on_partial` receives the growing diagram text; `on_done` fires once with
/// the final trimmed text.
pub fn stream_parse<P, D>(on_partial: P, on_done: D) -> StreamSession<P, D>
where
    P: FnMut(&str),
    D: FnMut(&str),
{
    StreamSession {
        parser: StreamParser::new(),
        on_partial,
        on_done,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done_text(events: &[StreamEvent]) -> Option<&str> {
        events.iter().find_map(|event| match event {
            StreamEvent::Done(text) => Some(text.as_str()),
            StreamEvent::Partial(_) => None,
        })
    }

    #[test]
    fn test_fenced_extraction() {
        let mut parser = StreamParser::new();
        assert!(parser.append("preamble\n```mermaid\n").is_empty());
        assert_eq!(parser.state(), StreamState::InCode);

        let events = parser.append("graph TD\nA-->B\n");
        assert_eq!(
            events,
            vec![StreamEvent::Partial("graph TD\nA-->B\n".to_string())]
        );

        let events = parser.append("B-->C\n```\ntrailing");
        assert_eq!(done_text(&events), Some("graph TD\nA-->B\nB-->C"));
        assert!(parser.is_finished());
        assert_eq!(parser.buffer(), "\ntrailing");
    }

    #[test]
    fn test_raw_keyword_start() {
        let mut parser = StreamParser::new();
        let events = parser.append("Hello\nflowchart LR\nX-->Y");
        assert!(matches!(events.as_slice(), [StreamEvent::Partial(_)]));

        let events = parser.finish();
        let done = done_text(&events).unwrap();
        assert!(done.starts_with("flowchart LR"));
        assert!(done.contains("X-->Y"));
    }

    #[test]
    fn test_split_start_fence() {
        let mut parser = StreamParser::new();
        parser.append("text ``");
        parser.append("`merm");
        assert_eq!(parser.state(), StreamState::Scanning);
        parser.append("aid\ngraph LR\nA-->B\n");
        assert_eq!(parser.accumulated(), "graph LR\nA-->B\n");
    }

    #[test]
    fn test_split_end_fence_is_held_back() {
        let mut parser = StreamParser::new();
        parser.append("```mermaid\ngraph TD\nA-->B\n``");
        assert_eq!(parser.accumulated(), "graph TD\nA-->B\n");

        let events = parser.append("`");
        assert_eq!(done_text(&events), Some("graph TD\nA-->B"));
    }

    #[test]
    fn test_held_backticks_released_when_not_a_fence() {
        let mut parser = StreamParser::new();
        parser.append("```mermaid\ngraph TD\nA[`x`");
        assert_eq!(parser.accumulated(), "graph TD\nA[`x");
        parser.append("]\n");
        assert_eq!(parser.accumulated(), "graph TD\nA[`x`]\n");
    }

    #[test]
    fn test_keyword_at_buffer_end_waits() {
        let mut parser = StreamParser::new();
        parser.append("intro\ngraph");
        assert_eq!(parser.state(), StreamState::Scanning);
        parser.append("ql is a query language\n");
        assert_eq!(parser.state(), StreamState::Scanning);

        let mut parser = StreamParser::new();
        parser.append("intro\ngraph");
        parser.append(" TD\nA-->B");
        assert_eq!(parser.state(), StreamState::InCode);
        assert_eq!(parser.accumulated(), "graph TD\nA-->B");
    }

    #[test]
    fn test_keyword_used_as_node_id_does_not_start_code() {
        let mut parser = StreamParser::new();
        parser.append("intro\ntimeline");
        parser.append(" ");
        assert_eq!(parser.state(), StreamState::Scanning);
        parser.append("--> C\n");
        assert_eq!(parser.state(), StreamState::Scanning);
        parser.append("timeline\n  2020 : launch");
        assert_eq!(parser.state(), StreamState::InCode);
    }

    #[test]
    fn test_finish_accepts_keyword_at_end() {
        let mut parser = StreamParser::new();
        parser.append("intro\npie");
        let events = parser.finish();
        assert_eq!(done_text(&events), Some("pie"));
    }

    #[test]
    fn test_finish_without_signal_is_empty() {
        let mut parser = StreamParser::new();
        parser.append("no diagram in here");
        assert_eq!(parser.finish(), vec![StreamEvent::Done(String::new())]);
    }

    #[test]
    fn test_appends_after_finish_are_ignored() {
        let mut parser = StreamParser::new();
        parser.append("```mermaid\ngraph TD\nA\n```");
        assert!(parser.is_finished());
        assert!(parser.append("graph LR\nB-->C").is_empty());
        assert!(parser.finish().is_empty());
        assert_eq!(parser.accumulated(), "graph TD\nA\n");
    }

    #[test]
    fn test_scan_window_is_bounded() {
        let mut parser = StreamParser::new();
        let noise = "é".repeat(SCAN_WINDOW * 2);
        parser.append(&noise);
        assert_eq!(parser.buffer().chars().count(), SCAN_WINDOW);

        parser.append("\ngraph TD\nA-->B\n");
        assert_eq!(parser.accumulated(), "graph TD\nA-->B\n");
    }

    #[test]
    fn test_session_callbacks() {
        let mut partials = Vec::new();
        let mut done = None;
        {
            let mut session = stream_parse(
                |text: &str| partials.push(text.to_string()),
                |text: &str| done = Some(text.to_string()),
            );
            session.append("```mermaid\ngraph TD\n");
            session.append("A-->B\n");
            session.append("```");
            assert!(session.is_finished());
        }
        assert_eq!(partials, vec!["graph TD\n", "graph TD\nA-->B\n"]);
        assert_eq!(done.as_deref(), Some("graph TD\nA-->B"));
    }
}
